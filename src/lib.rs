//! Compiler for Windows **ver**sion **info**rmation resources.
//!
//! Supports:
//! * Building `VS_VERSIONINFO` resources from a JSON document
//! * Icon and manifest resources
//! * Linkable COFF objects for `386`, `amd64`, `arm` and `arm64`
//!
//! See [`VersionInfo`] for the main entry point for building version information and writing object files.
//!
//! # Examples
//!
//! ### Object file
//! ```
//! use verinfo::{Architecture, VersionDocument, VersionInfo};
//!
//! // parse the version document
//! let document = VersionDocument::from_file("versioninfo.json")?;
//!
//! // build the version information structure
//! let info = VersionInfo::build(document)?;
//!
//! // write an object file for 64-bit targets
//! info.write_object("resource.syso", Architecture::Amd64)?;
//! ```
//!
//! ### Custom resources
//! ```
//! use verinfo::{add_icon, Architecture, ResourceContainer};
//!
//! let mut container = ResourceContainer::new();
//!
//! // add the icon images and the icon group
//! add_icon(&mut container, ICON_PATH)?;
//!
//! // fix the resource directory layout
//! container.freeze();
//!
//! // build an object file with all resources
//! let object = container.serialize(Architecture::Arm64)?;
//! ```

pub(crate) mod builder;
pub(crate) mod config;
pub(crate) mod encode;
pub(crate) mod errors;
pub(crate) mod icon;
pub(crate) mod object;
pub(crate) mod resource;
pub(crate) mod util;
pub(crate) mod version;
pub(crate) mod walk;

pub mod constants;
pub mod types;

pub use crate::{
    builder::*, config::*, encode::*, errors::*, icon::*, object::*, resource::*, version::*,
    walk::*,
};
