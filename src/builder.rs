//! Build orchestration.
//!
//! [`VersionInfo`] builds and serializes the version information of a document once, and assembles
//! resource containers and output files from it.

use std::{fs, path::Path};

use debug_ignore::DebugIgnore;
use log::{debug, info};

use crate::{
    config::*,
    constants::*,
    errors::*,
    icon::*,
    object::*,
    resource::*,
    version::*,
    walk::{walk, Structure},
};

/// Serialized version information of a document.
#[derive(Debug, Clone)]
pub struct VersionInfo {
    document:  VersionDocument,
    structure: VsVersionInfo,
    buffer:    DebugIgnore<Vec<u8>>,
}
impl VersionInfo {
    /// Build and serialize the version information structure of a document.
    ///
    /// # Returns
    /// Returns an error if the structure does not fit into the 16 bit length fields.
    pub fn build(document: VersionDocument) -> Result<Self, ResourceError> {
        let structure = VsVersionInfo::build(&document)?;
        let mut buffer = Vec::with_capacity(structure.size() as usize);
        walk(&structure, &mut buffer)?;
        debug!("version info buffer: {} bytes", buffer.len());

        Ok(Self {
            document,
            structure,
            buffer: DebugIgnore(buffer),
        })
    }

    /// Returns the document the version information was built from.
    pub fn document(&self) -> &VersionDocument { &self.document }

    /// Returns the version information structure.
    pub fn structure(&self) -> &VsVersionInfo { &self.structure }

    /// Returns the serialized version information.
    pub fn buffer(&self) -> &[u8] { &self.buffer }

    /// Assemble a frozen resource container with the version information and,
    /// if set in the document, the manifest and icon resources.
    ///
    /// # Returns
    /// Returns an error if the manifest or icon file could not be read.
    pub fn resources(&self) -> Result<ResourceContainer, ResourceError> {
        self.resources_with(true)
    }

    /// Assemble a frozen resource container, optionally leaving out the version information.
    pub fn resources_with(&self, include_version: bool) -> Result<ResourceContainer, ResourceError> {
        let mut container = ResourceContainer::new();
        if include_version {
            let id = container.next_id()?;
            container.add_resource(RT_VERSION, id, Buffer::new(self.buffer.to_vec()))?;
        }
        if let Some(path) = &self.document.manifest_path {
            let id = add_manifest(&mut container, path)?;
            debug!("manifest {} added as resource {}", path.display(), id);
        }
        if let Some(path) = &self.document.icon_path {
            add_icon(&mut container, path)?;
        }
        container.freeze();
        Ok(container)
    }

    /// Serialize the resources into an object file for the given architecture.
    pub fn object(&self, architecture: Architecture) -> Result<Vec<u8>, ResourceError> {
        self.resources()?.serialize(architecture)
    }

    /// Write an object file for the given architecture.
    ///
    /// The object is serialized completely before the file is created.
    pub fn write_object<P: AsRef<Path>>(
        &self, path: P, architecture: Architecture,
    ) -> Result<(), WriteError> {
        let data = self.object(architecture)?;
        fs::write(path.as_ref(), data)?;
        info!("wrote {} object to {}", architecture, path.as_ref().display());
        Ok(())
    }

    /// Write the raw serialized version information.
    pub fn write_hex<P: AsRef<Path>>(&self, path: P) -> Result<(), WriteError> {
        fs::write(path.as_ref(), self.buffer())?;
        info!("wrote version info to {}", path.as_ref().display());
        Ok(())
    }

    /// Write a Rust source file embedding the document as JSON.
    pub fn write_source<P: AsRef<Path>>(&self, path: P) -> Result<(), WriteError> {
        fs::write(path.as_ref(), self.source()?)?;
        info!("wrote source to {}", path.as_ref().display());
        Ok(())
    }

    /// Returns the Rust source embedding the document as JSON.
    pub fn source(&self) -> Result<String, WriteError> {
        let json = self.document.to_json()?;
        let hashes = "#".repeat(raw_string_hashes(&json));
        Ok(format!(
            "// Code generated by verinfo. DO NOT EDIT.\n\npub const VERSION_INFO_JSON: &str = r{hashes}\"{json}\"{hashes};\n"
        ))
    }
}

// one more than the longest run of hashes following a quote
fn raw_string_hashes(text: &str) -> usize {
    let mut longest = 0;
    for (index, _) in text.match_indices('"') {
        let run = text[index + 1..].bytes().take_while(|&c| c == b'#').count();
        longest = longest.max(run);
    }
    longest + 1
}
