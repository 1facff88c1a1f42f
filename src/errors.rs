//! Errors specific to loading configuration, assembling resources or writing output files.

use std::{io::Error as IOError, path::PathBuf};

use serde_json::Error as JsonError;

/// Error that can occur when reading and parsing bytes.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ReadError(pub String);

/// Errors that can occur when loading a version document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid json: {0}")]
    Json(JsonError),
    #[error("io error: {0}")]
    IOError(IOError),
}
impl From<JsonError> for ConfigError {
    fn from(error: JsonError) -> Self { ConfigError::Json(error) }
}
impl From<IOError> for ConfigError {
    fn from(error: IOError) -> Self { ConfigError::IOError(error) }
}

/// Errors that can occur when building or assembling resource data.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("resource id {0} is already in use")]
    DuplicateId(u16),
    #[error("resource container is frozen")]
    Frozen,
    #[error("resource container is not frozen")]
    NotFrozen,
    #[error("resource ids exhausted")]
    IdsExhausted,
    #[error("resource payload too large: {0} bytes")]
    PayloadTooLarge(u64),
    #[error("version info node too large: {0} bytes")]
    VersionInfoTooLarge(usize),
    #[error("invalid icon: {0}")]
    InvalidIcon(String),
    #[error("could not open {path}: {1}", path = .0.display())]
    OpenFile(PathBuf, IOError),
    #[error("invalid bytes: {0}")]
    InvalidBytes(ReadError),
    #[error("io error: {0}")]
    IOError(IOError),
}
impl From<ReadError> for ResourceError {
    fn from(error: ReadError) -> Self { ResourceError::InvalidBytes(error) }
}
impl From<IOError> for ResourceError {
    fn from(error: IOError) -> Self { ResourceError::IOError(error) }
}

/// Errors that can occur when writing output files.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("resource error: {0}")]
    Resource(ResourceError),
    #[error("invalid json: {0}")]
    Json(JsonError),
    #[error("io error: {0}")]
    IOError(IOError),
}
impl From<ResourceError> for WriteError {
    fn from(error: ResourceError) -> Self { WriteError::Resource(error) }
}
impl From<JsonError> for WriteError {
    fn from(error: JsonError) -> Self { WriteError::Json(error) }
}
impl From<IOError> for WriteError {
    fn from(error: IOError) -> Self { WriteError::IOError(error) }
}
