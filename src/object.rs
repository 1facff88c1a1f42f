//! Relocatable COFF object holding a single resource section.
//!
//! See <https://learn.microsoft.com/en-us/windows/win32/debug/pe-format#coff-file-header-object-and-image> for more information.

use core::fmt;

use crate::{
    constants::*,
    resource::ResourceSection,
    types::*,
    walk::{Field, Structure},
};

const COFF_HEADER_SIZE: u32 = 20;
const SECTION_HEADER_SIZE: u32 = 40;
const RELOCATION_SIZE: u32 = 10;
// the string table only consists of its own length
const STRING_TABLE_SIZE: u32 = 4;

/// Target machine of an object file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Architecture {
    I386,
    Amd64,
    Arm,
    Arm64,
}
impl Architecture {
    /// All supported architectures.
    pub const ALL: [Architecture; 4] =
        [Architecture::I386, Architecture::Amd64, Architecture::Arm, Architecture::Arm64];

    /// Returns the short name used in output file names.
    pub const fn name(&self) -> &'static str {
        match self {
            Architecture::I386 => "386",
            Architecture::Amd64 => "amd64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Returns the COFF machine type.
    pub const fn machine(&self) -> WORD {
        match self {
            Architecture::I386 => IMAGE_FILE_MACHINE_I386,
            Architecture::Amd64 => IMAGE_FILE_MACHINE_AMD64,
            Architecture::Arm => IMAGE_FILE_MACHINE_ARMNT,
            Architecture::Arm64 => IMAGE_FILE_MACHINE_ARM64,
        }
    }

    /// Returns the COFF file header characteristics.
    pub const fn characteristics(&self) -> WORD {
        match self {
            Architecture::I386 | Architecture::Arm => {
                IMAGE_FILE_32BIT_MACHINE | IMAGE_FILE_LINE_NUMS_STRIPPED
            }
            Architecture::Amd64 | Architecture::Arm64 => IMAGE_FILE_LINE_NUMS_STRIPPED,
        }
    }

    /// Returns the relocation type for image-relative addresses.
    pub const fn relocation_type(&self) -> WORD {
        match self {
            Architecture::I386 => IMAGE_REL_I386_DIR32NB,
            Architecture::Amd64 => IMAGE_REL_AMD64_ADDR32NB,
            Architecture::Arm => IMAGE_REL_ARM_ADDR32NB,
            Architecture::Arm64 => IMAGE_REL_ARM64_ADDR32NB,
        }
    }

    /// Returns the architecture for a short name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|architecture| architecture.name() == name)
    }
}
impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// Object file layout: file header, section header, section data, relocations, symbol table and string table.
pub(crate) struct ObjectFile<'a> {
    coff_header:    CoffHeader,
    section_header: SectionHeader,
    section:        &'a ResourceSection<'a>,
    relocations:    Vec<CoffRelocation>,
    symbol:         CoffSymbol,
}
impl<'a> ObjectFile<'a> {
    pub(crate) fn new(
        architecture: Architecture, section: &'a ResourceSection<'a>, relocations: &[u32],
    ) -> Self {
        let section_offset = COFF_HEADER_SIZE + SECTION_HEADER_SIZE;
        let relocations_offset = section_offset + section.size();
        let symbols_offset = relocations_offset + relocations.len() as u32 * RELOCATION_SIZE;

        let relocations = relocations
            .iter()
            .map(|&virtual_address| CoffRelocation {
                virtual_address,
                symbol_table_index: 0,
                type_: architecture.relocation_type(),
            })
            .collect::<Vec<_>>();

        Self {
            coff_header: CoffHeader {
                machine: architecture.machine(),
                number_of_sections: 1,
                time_date_stamp: 0,
                pointer_to_symbol_table: symbols_offset,
                number_of_symbols: 1,
                size_of_optional_header: 0,
                characteristics: architecture.characteristics(),
            },
            section_header: SectionHeader {
                name: RESOURCE_SECTION_NAME,
                size_of_raw_data: section.size(),
                pointer_to_raw_data: section_offset,
                pointer_to_relocations: if relocations.is_empty() { 0 } else { relocations_offset },
                number_of_relocations: relocations.len() as u16,
                characteristics: IMAGE_SCN_CNT_INITIALIZED_DATA | IMAGE_SCN_MEM_READ,
                ..Default::default()
            },
            section,
            relocations,
            symbol: CoffSymbol {
                name:                  RESOURCE_SECTION_NAME,
                value:                 0,
                section_number:        1,
                type_:                 0,
                storage_class:         IMAGE_SYM_CLASS_STATIC,
                number_of_aux_symbols: 0,
            },
        }
    }
}
impl Structure for ObjectFile<'_> {
    fn fields(&self) -> Vec<Field<'_>> {
        let mut fields = vec![
            Field::Nested(&self.coff_header),
            Field::Nested(&self.section_header),
            Field::Nested(self.section),
        ];
        fields.extend(self.relocations.iter().map(|relocation| Field::Nested(relocation)));
        fields.push(Field::Nested(&self.symbol));
        fields.push(Field::U32(STRING_TABLE_SIZE));
        fields
    }
}
