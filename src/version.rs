//! Version information resource structure.
//!
//! Builds the nested `VS_VERSIONINFO` record from a [`VersionDocument`].
//! See <https://learn.microsoft.com/en-us/windows/win32/menurc/vs-versioninfo> for the layout.
//!
//! Lengths are computed bottom-up. A node's `length` never includes the padding that follows it;
//! that padding is returned to the parent and added to the parent's total instead.

use log::{debug, trace};

use crate::{
    config::*,
    constants::*,
    encode::*,
    errors::*,
    types::*,
    util::*,
    walk::{Field, Structure},
};

// length, value length and type
const HEADER_SIZE: usize = 6;

fn to_length(length: usize) -> Result<u16, ResourceError> {
    u16::try_from(length).map_err(|_| ResourceError::VersionInfoTooLarge(length))
}

/// Root `VS_VERSIONINFO` node.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VsVersionInfo {
    pub header:           VersionHeader,
    pub key:              Vec<u8>,
    pub padding1:         Vec<u8>,
    pub value:            VsFixedFileInfo,
    pub padding2:         Vec<u8>,
    pub string_file_info: VsStringFileInfo,
    pub var_file_info:    VsVarFileInfo,
}
impl VsVersionInfo {
    /// Build the version information structure for the document.
    ///
    /// # Returns
    /// Returns an error if a node would be larger than the 16 bit length fields allow.
    pub fn build(document: &VersionDocument) -> Result<Self, ResourceError> {
        let key = string_to_u16(VS_VERSION_INFO_KEY, false);
        let so_far = key.len() + HEADER_SIZE;
        let padding1 = vec![0; key_padding(so_far)];

        let value = build_fixed_file_info(document);
        let (string_file_info, table_padding) = VsStringFileInfo::build(document)?;
        let var_file_info = VsVarFileInfo::build(&document.var_file_info.translation)?;

        let length = so_far
            + padding1.len()
            + VS_FIXEDFILEINFO_SIZE as usize
            + string_file_info.header.length as usize
            + var_file_info.header.length as usize
            + table_padding;
        debug!("version info length: {:#x?}", length);

        Ok(Self {
            header: VersionHeader {
                length:       to_length(length)?,
                value_length: VS_FIXEDFILEINFO_SIZE,
                type_:        VS_TYPE_BINARY,
            },
            key,
            padding1,
            value,
            padding2: Vec::new(),
            string_file_info,
            var_file_info,
        })
    }
}
impl Structure for VsVersionInfo {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Nested(&self.header),
            Field::Bytes(&self.key),
            Field::Bytes(&self.padding1),
            Field::Nested(&self.value),
            Field::Bytes(&self.padding2),
            Field::Nested(&self.string_file_info),
            Field::Nested(&self.var_file_info),
        ]
    }
}

fn build_fixed_file_info(document: &VersionDocument) -> VsFixedFileInfo {
    let info = &document.fixed_file_info;
    if document.timestamp {
        debug!("timestamp requested, file date is left empty");
    }
    VsFixedFileInfo {
        file_version_ms: info.file_version.high(),
        file_version_ls: info.file_version.low(),
        product_version_ms: info.product_version.high(),
        product_version_ls: info.product_version.low(),
        file_flags_mask: hex_to_u32(&info.file_flags_mask),
        file_flags: hex_to_u32(&info.file_flags),
        file_os: hex_to_u32(&info.file_os),
        file_type: hex_to_u32(&info.file_type),
        file_subtype: hex_to_u32(&info.file_sub_type),
        ..Default::default()
    }
}

/// `StringFileInfo` node holding a single string table.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VsStringFileInfo {
    pub header:  VersionHeader,
    pub key:     Vec<u8>,
    pub padding: Vec<u8>,
    pub table:   VsStringTable,
}
impl VsStringFileInfo {
    /// Returns the node and the padding of the string table, which the root has to account for.
    fn build(document: &VersionDocument) -> Result<(Self, usize), ResourceError> {
        let key = string_to_u16(VS_STRING_FILE_INFO_KEY, false);
        let so_far = key.len() + HEADER_SIZE;
        let padding = vec![0; key_padding(so_far)];

        let table = VsStringTable::build(document)?;
        let table_padding = table.padding.len();
        let length = so_far + padding.len() + table.header.length as usize;

        Ok((
            Self {
                header: VersionHeader {
                    length:       to_length(length)?,
                    value_length: 0,
                    type_:        VS_TYPE_TEXT,
                },
                key,
                padding,
                table,
            },
            table_padding,
        ))
    }
}
impl Structure for VsStringFileInfo {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Nested(&self.header),
            Field::Bytes(&self.key),
            Field::Bytes(&self.padding),
            Field::Nested(&self.table),
        ]
    }
}

/// String table keyed by language and codepage.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VsStringTable {
    pub header:  VersionHeader,
    pub key:     Vec<u8>,
    pub padding: Vec<u8>,
    pub strings: Vec<VsString>,
}
impl VsStringTable {
    fn build(document: &VersionDocument) -> Result<Self, ResourceError> {
        let key = string_to_u16(document.var_file_info.translation.translation_string(), false);
        let so_far = key.len() + HEADER_SIZE;
        let padding = vec![0; key_padding(so_far)];

        let mut length = so_far;
        let mut strings = Vec::new();
        for (name, value) in document.string_file_info.entries() {
            if let Some(string) = VsString::build(name, value)? {
                // the trailing padding belongs to the table
                length += string.header.length as usize + string.padding2.len();
                strings.push(string);
            }
        }
        trace!("string table with {} strings: {:#x?}", strings.len(), length);

        Ok(Self {
            header: VersionHeader {
                length:       to_length(length)?,
                value_length: 0,
                type_:        VS_TYPE_TEXT,
            },
            key,
            padding,
            strings,
        })
    }
}
impl Structure for VsStringTable {
    fn fields(&self) -> Vec<Field<'_>> {
        let mut fields = vec![
            Field::Nested(&self.header),
            Field::Bytes(&self.key),
            Field::Bytes(&self.padding),
        ];
        fields.extend(self.strings.iter().map(|string| Field::Nested(string)));
        fields
    }
}

/// Single string table entry.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VsString {
    pub header:   VersionHeader,
    pub key:      Vec<u8>,
    pub padding1: Vec<u8>,
    pub value:    Vec<u8>,
    pub padding2: Vec<u8>,
}
impl VsString {
    /// Returns `None` for empty values.
    fn build(name: &str, value: &str) -> Result<Option<Self>, ResourceError> {
        if value.is_empty() {
            return Ok(None);
        }

        let key = string_to_u16(name, false);
        let mut so_far = key.len() + HEADER_SIZE;
        let padding1 = vec![0; key_padding(so_far)];

        let value = string_to_u16(value, true);
        so_far += value.len() + padding1.len();
        let padding2 = vec![0; value_padding(so_far)];

        Ok(Some(Self {
            header: VersionHeader {
                length:       to_length(so_far)?,
                // in 16 bit words
                value_length: to_length(value.len() / 2)?,
                type_:        VS_TYPE_TEXT,
            },
            key,
            padding1,
            value,
            padding2,
        }))
    }
}
impl Structure for VsString {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Nested(&self.header),
            Field::Bytes(&self.key),
            Field::Bytes(&self.padding1),
            Field::Bytes(&self.value),
            Field::Bytes(&self.padding2),
        ]
    }
}

/// `VarFileInfo` node holding the translation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VsVarFileInfo {
    pub header:  VersionHeader,
    pub key:     Vec<u8>,
    pub padding: Vec<u8>,
    pub value:   VsVar,
}
impl VsVarFileInfo {
    fn build(translation: &Translation) -> Result<Self, ResourceError> {
        let key = string_to_u16(VS_VAR_FILE_INFO_KEY, false);
        let so_far = key.len() + HEADER_SIZE;
        let padding = vec![0; key_padding(so_far)];

        let value = VsVar::build(translation)?;
        let length = so_far + padding.len() + value.header.length as usize;

        Ok(Self {
            header: VersionHeader {
                length:       to_length(length)?,
                value_length: 0,
                type_:        VS_TYPE_TEXT,
            },
            key,
            padding,
            value,
        })
    }
}
impl Structure for VsVarFileInfo {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Nested(&self.header),
            Field::Bytes(&self.key),
            Field::Bytes(&self.padding),
            Field::Nested(&self.value),
        ]
    }
}

/// `Translation` variable.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VsVar {
    pub header:  VersionHeader,
    pub key:     Vec<u8>,
    pub padding: Vec<u8>,
    pub value:   u32,
}
impl VsVar {
    fn build(translation: &Translation) -> Result<Self, ResourceError> {
        let key = string_to_u16(VS_TRANSLATION_KEY, false);
        let mut so_far = key.len() + HEADER_SIZE;
        let padding = vec![0; key_padding(so_far)];

        let value = translation.translation();
        so_far += 4 + padding.len();

        Ok(Self {
            header: VersionHeader {
                length:       to_length(so_far)?,
                value_length: 4,
                type_:        VS_TYPE_BINARY,
            },
            key,
            padding,
            value,
        })
    }
}
impl Structure for VsVar {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Nested(&self.header),
            Field::Bytes(&self.key),
            Field::Bytes(&self.padding),
            Field::U32(self.value),
        ]
    }
}
