//! Version document configuration.
//!
//! The document is read from JSON. Unknown fields are ignored and missing fields default to zero or empty values.

use std::{fmt, io::Read, path::PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{constants::*, encode::*, errors::*};

/// Version information document.
#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct VersionDocument {
    pub fixed_file_info:  FixedFileInfo,
    pub string_file_info: StringFileInfo,
    pub var_file_info:    VarFileInfo,
    /// Accepted for compatibility. File dates are always written as zero.
    pub timestamp:        bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_path:        Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path:    Option<PathBuf>,
}
impl VersionDocument {
    /// Parse a version document from JSON bytes.
    ///
    /// # Returns
    /// Returns the document, or an error if the bytes are not a valid JSON document.
    pub fn from_json<B: AsRef<[u8]>>(json: B) -> Result<Self, ConfigError> {
        let document: Self = serde_json::from_slice(json.as_ref())?;
        debug!("{:#?}", document);
        Ok(document)
    }

    /// Parse a version document from a reader.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, ConfigError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_json(data)
    }

    /// Parse a version document from a file.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read(path)?;
        Self::from_json(data)
    }

    /// Serialize the document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> { serde_json::to_string_pretty(self) }
}

/// Numeric version information.
/// Flag, OS and type fields are hexadecimal strings.
#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct FixedFileInfo {
    pub file_version:    FileVersion,
    pub product_version: FileVersion,
    pub file_flags_mask: String,
    pub file_flags:      String,
    #[serde(rename = "FileOS")]
    pub file_os:         String,
    pub file_type:       String,
    pub file_sub_type:   String,
}

/// Version quad.
/// Each part is 16 bit; larger values are rejected when the document is parsed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct FileVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub build: u16,
}
impl FileVersion {
    pub const fn new(major: u16, minor: u16, patch: u16, build: u16) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// Returns the most significant DWORD of the version.
    pub fn high(&self) -> u32 { hex_to_u32(&version_high(self.major, self.minor)) }

    /// Returns the least significant DWORD of the version.
    pub fn low(&self) -> u32 { hex_to_u32(&version_low(self.patch, self.build)) }

    /// Returns the version formatted as `major.minor.patch.build`.
    pub fn version_string(&self) -> String { version_string(self.high(), self.low()) }
}
impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.version_string()) }
}

/// Descriptive version strings. Empty strings are omitted from the string table.
#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct StringFileInfo {
    pub comments:          String,
    pub company_name:      String,
    pub file_description:  String,
    pub file_version:      String,
    pub internal_name:     String,
    pub legal_copyright:   String,
    pub legal_trademarks:  String,
    pub original_filename: String,
    pub private_build:     String,
    pub product_name:      String,
    pub product_version:   String,
    pub special_build:     String,
}
impl StringFileInfo {
    /// Returns all string fields with their names, in string table order.
    pub fn entries(&self) -> [(&'static str, &str); 12] {
        [
            (VS_COMMENTS, &self.comments),
            (VS_COMPANY_NAME, &self.company_name),
            (VS_FILE_DESCRIPTION, &self.file_description),
            (VS_FILE_VERSION, &self.file_version),
            (VS_INTERNAL_NAME, &self.internal_name),
            (VS_LEGAL_COPYRIGHT, &self.legal_copyright),
            (VS_LEGAL_TRADEMARKS, &self.legal_trademarks),
            (VS_ORIGINAL_FILENAME, &self.original_filename),
            (VS_PRIVATE_BUILD, &self.private_build),
            (VS_PRODUCT_NAME, &self.product_name),
            (VS_PRODUCT_VERSION, &self.product_version),
            (VS_SPECIAL_BUILD, &self.special_build),
        ]
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct VarFileInfo {
    pub translation: Translation,
}

/// Language and codepage of the string table.
/// Both identifiers are read from JSON integers or hexadecimal strings.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Translation {
    #[serde(rename = "LangID", deserialize_with = "deserialize_id")]
    pub lang_id:    u16,
    #[serde(rename = "CharsetID", deserialize_with = "deserialize_id")]
    pub charset_id: u16,
}
impl Translation {
    pub const fn new(lang_id: u16, charset_id: u16) -> Self {
        Self {
            lang_id,
            charset_id,
        }
    }

    /// Returns the string table key.
    pub fn translation_string(&self) -> String { translation_string(self.lang_id, self.charset_id) }

    /// Returns the packed translation value.
    pub fn translation(&self) -> u32 { hex_to_u32(&translation(self.lang_id, self.charset_id)) }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntegerOrHex {
    Integer(u16),
    Hex(String),
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    Ok(match IntegerOrHex::deserialize(deserializer)? {
        IntegerOrHex::Integer(id) => id,
        IntegerOrHex::Hex(hex) => u16::try_from(hex_to_u32(&hex)).unwrap_or_else(|_| {
            warn!("identifier {:?} does not fit into 16 bits, using 0", hex);
            0
        }),
    })
}
