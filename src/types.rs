//! Fixed-size binary records.
//!
//! These types are a one-to-one mapping of the data described in <https://learn.microsoft.com/en-us/windows/win32/debug/pe-format>,
//! <https://learn.microsoft.com/en-us/windows/win32/menurc/version-information-structures> and
//! <https://learn.microsoft.com/en-us/previous-versions/ms997538(v=msdn.10)>.

use zerocopy::{FromBytes, Immutable, IntoBytes};

use crate::{
    constants::*,
    walk::{Field, Structure},
};

#[repr(C, packed(2))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct VersionU16 {
    pub major: u16,
    pub minor: u16,
}

#[repr(C, packed(2))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct CoffHeader {
    pub machine:                 u16,
    pub number_of_sections:      u16,
    pub time_date_stamp:         u32,
    pub pointer_to_symbol_table: u32,
    pub number_of_symbols:       u32,
    pub size_of_optional_header: u16,
    pub characteristics:         u16,
}
impl Structure for CoffHeader {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::U16(self.machine),
            Field::U16(self.number_of_sections),
            Field::U32(self.time_date_stamp),
            Field::U32(self.pointer_to_symbol_table),
            Field::U32(self.number_of_symbols),
            Field::U16(self.size_of_optional_header),
            Field::U16(self.characteristics),
        ]
    }
}

#[repr(C, packed(4))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct SectionHeader {
    pub name:                   [u8; 8],
    pub virtual_size:           u32,
    pub virtual_address:        u32,
    pub size_of_raw_data:       u32,
    pub pointer_to_raw_data:    u32,
    pub pointer_to_relocations: u32,
    pub pointer_to_linenumbers: u32,
    pub number_of_relocations:  u16,
    pub number_of_linenumbers:  u16,
    pub characteristics:        u32,
}
impl SectionHeader {
    pub fn name(&self) -> Option<String> {
        let name = self.name;
        let name = core::str::from_utf8(
            &name[0..name.iter().position(|&c| c == b'\0').unwrap_or(name.len())],
        )
        .ok();
        name.map(|name| name.to_string())
    }
}
impl Structure for SectionHeader {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Bytes(&self.name),
            Field::U32(self.virtual_size),
            Field::U32(self.virtual_address),
            Field::U32(self.size_of_raw_data),
            Field::U32(self.pointer_to_raw_data),
            Field::U32(self.pointer_to_relocations),
            Field::U32(self.pointer_to_linenumbers),
            Field::U16(self.number_of_relocations),
            Field::U16(self.number_of_linenumbers),
            Field::U32(self.characteristics),
        ]
    }
}

#[repr(C, packed(2))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct CoffRelocation {
    pub virtual_address:    u32,
    pub symbol_table_index: u32,
    pub type_:              u16,
}
impl Structure for CoffRelocation {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::U32(self.virtual_address),
            Field::U32(self.symbol_table_index),
            Field::U16(self.type_),
        ]
    }
}

#[repr(C, packed(2))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct CoffSymbol {
    pub name:                  [u8; 8],
    pub value:                 u32,
    pub section_number:        u16,
    pub type_:                 u16,
    pub storage_class:         u8,
    pub number_of_aux_symbols: u8,
}
impl Structure for CoffSymbol {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Bytes(&self.name),
            Field::U32(self.value),
            Field::U16(self.section_number),
            Field::U16(self.type_),
            Field::U8(self.storage_class),
            Field::U8(self.number_of_aux_symbols),
        ]
    }
}

#[repr(C, packed(2))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct ResourceDirectoryTable {
    pub characteristics:        u32,
    pub time_date_stamp:        u32,
    pub version:                VersionU16,
    pub number_of_name_entries: u16,
    pub number_of_id_entries:   u16,
}
impl Structure for ResourceDirectoryTable {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::U32(self.characteristics),
            Field::U32(self.time_date_stamp),
            Field::U16(self.version.major),
            Field::U16(self.version.minor),
            Field::U16(self.number_of_name_entries),
            Field::U16(self.number_of_id_entries),
        ]
    }
}

#[repr(C, packed(4))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct ResourceDirectoryEntry {
    pub name_offset_or_integer_id:         u32,
    pub data_entry_or_subdirectory_offset: u32,
}
impl Structure for ResourceDirectoryEntry {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::U32(self.name_offset_or_integer_id),
            Field::U32(self.data_entry_or_subdirectory_offset),
        ]
    }
}

#[repr(C, packed(4))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct ResourceDataEntry {
    pub data_rva: u32,
    pub size:     u32,
    pub codepage: u32,
    pub reserved: u32,
}
impl Structure for ResourceDataEntry {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::U32(self.data_rva),
            Field::U32(self.size),
            Field::U32(self.codepage),
            Field::U32(self.reserved),
        ]
    }
}

/// Header of an icon file and of an icon group resource.
#[repr(C, packed(2))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct IconDirectory {
    pub reserved: u16,
    pub type_:    u16,
    pub count:    u16,
}
impl Structure for IconDirectory {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::U16(self.reserved), Field::U16(self.type_), Field::U16(self.count)]
    }
}

/// Icon group resource entry, referring to an icon resource by id.
#[repr(C, packed(1))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct IconDirectoryEntry {
    pub width:       u8,
    pub height:      u8,
    pub color_count: u8,
    pub reserved:    u8,
    pub planes:      u16,
    pub bit_count:   u16,
    pub bytes:       u32,
    pub id:          u16,
}
impl Structure for IconDirectoryEntry {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::U8(self.width),
            Field::U8(self.height),
            Field::U8(self.color_count),
            Field::U8(self.reserved),
            Field::U16(self.planes),
            Field::U16(self.bit_count),
            Field::U32(self.bytes),
            Field::U16(self.id),
        ]
    }
}

/// Icon file entry, referring to the image data by file offset.
#[repr(C, packed(1))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct IconFileEntry {
    pub width:        u8,
    pub height:       u8,
    pub color_count:  u8,
    pub reserved:     u8,
    pub planes:       u16,
    pub bit_count:    u16,
    pub bytes:        u32,
    pub image_offset: u32,
}
impl IconFileEntry {
    /// Returns the icon group entry for this image stored under the given resource id.
    pub fn group_entry(&self, id: u16) -> IconDirectoryEntry {
        IconDirectoryEntry {
            width: self.width,
            height: self.height,
            color_count: self.color_count,
            reserved: self.reserved,
            planes: self.planes,
            bit_count: self.bit_count,
            bytes: self.bytes,
            id,
        }
    }
}

#[repr(C, packed(4))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable)]
pub struct VsFixedFileInfo {
    pub signature:          u32,
    pub struct_version:     u32,
    pub file_version_ms:    u32,
    pub file_version_ls:    u32,
    pub product_version_ms: u32,
    pub product_version_ls: u32,
    pub file_flags_mask:    u32,
    pub file_flags:         u32,
    pub file_os:            u32,
    pub file_type:          u32,
    pub file_subtype:       u32,
    pub file_date_ms:       u32,
    pub file_date_ls:       u32,
}
impl Default for VsFixedFileInfo {
    fn default() -> Self {
        Self {
            signature:          VS_FIXEDFILEINFO_SIGNATURE,
            struct_version:     VS_FIXEDFILEINFO_VERSION,
            file_version_ms:    0x00000000,
            file_version_ls:    0x00000000,
            product_version_ms: 0x00000000,
            product_version_ls: 0x00000000,
            file_flags_mask:    0x00000000,
            file_flags:         0x00000000,
            file_os:            0x00000000,
            file_type:          0x00000000,
            file_subtype:       0x00000000,
            file_date_ms:       0x00000000,
            file_date_ls:       0x00000000,
        }
    }
}
impl Structure for VsFixedFileInfo {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::U32(self.signature),
            Field::U32(self.struct_version),
            Field::U32(self.file_version_ms),
            Field::U32(self.file_version_ls),
            Field::U32(self.product_version_ms),
            Field::U32(self.product_version_ls),
            Field::U32(self.file_flags_mask),
            Field::U32(self.file_flags),
            Field::U32(self.file_os),
            Field::U32(self.file_type),
            Field::U32(self.file_subtype),
            Field::U32(self.file_date_ms),
            Field::U32(self.file_date_ls),
        ]
    }
}

#[repr(C, packed(2))]
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, FromBytes, IntoBytes, Immutable, Default,
)]
pub struct VersionHeader {
    pub length:       u16,
    pub value_length: u16,
    pub type_:        u16,
}
impl Structure for VersionHeader {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::U16(self.length), Field::U16(self.value_length), Field::U16(self.type_)]
    }
}
