//! Resource container and payloads.
//! The container collects numbered resources and lays them out as a resource directory.
//! See <https://learn.microsoft.com/en-us/windows/win32/debug/pe-format#the-rsrc-section> for more information.

use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom, Write},
    path::Path,
    rc::Rc,
};

use ahash::RandomState;
use debug_ignore::DebugIgnore;
use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    constants::*,
    errors::*,
    object::*,
    types::*,
    util::*,
    walk::{walk, Field, Payload, Structure},
};

// directory entries and tables, data entry and relocation of a single resource
const RESOURCE_OVERHEAD: u64 = 8 + 16 + 8 + 24 + 16 + 10;
// root table, file header, section header, symbol and string table
const OBJECT_OVERHEAD: u64 = 16 + 20 + 40 + 18 + 4;

static ZEROES: [u8; RESOURCE_DATA_ALIGNMENT as usize] = [0; RESOURCE_DATA_ALIGNMENT as usize];


/// In-memory resource payload.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Buffer(DebugIgnore<Vec<u8>>);
impl Buffer {
    pub fn new(data: Vec<u8>) -> Self { Self(DebugIgnore(data)) }

    /// Returns the raw data.
    pub fn data(&self) -> &[u8] { &self.0 }
}
impl Payload for Buffer {
    fn size(&self) -> u64 { self.0.len() as u64 }

    fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> { writer.write_all(&self.0) }
}

/// Byte range of an open file, read when the payload is written.
///
/// The file handle is shared between ranges and stays open as long as any range referring to it exists.
#[derive(Debug, Clone)]
pub struct FileRange {
    file:   Rc<File>,
    offset: u64,
    length: u64,
}
impl FileRange {
    pub fn new(file: Rc<File>, offset: u64, length: u64) -> Self {
        Self {
            file,
            offset,
            length,
        }
    }

    /// Open a file and refer to its complete contents.
    ///
    /// # Returns
    /// Returns an error if the file could not be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ResourceError> {
        let file = open_file(path.as_ref())?;
        let length = file.metadata()?.len();
        Ok(Self::new(Rc::new(file), 0, length))
    }

    /// Returns the offset of the range in the file.
    pub fn offset(&self) -> u64 { self.offset }
}
impl Payload for FileRange {
    fn size(&self) -> u64 { self.length }

    fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
        let mut file = &*self.file;
        file.seek(SeekFrom::Start(self.offset))?;
        io::copy(&mut file.take(self.length), writer)?;
        Ok(())
    }
}


/// Resource registered in a container.
#[derive(Debug)]
pub struct Resource {
    type_id: WORD,
    id:      WORD,
    size:    u32,
    payload: Box<dyn Payload>,
}
impl Resource {
    /// Returns the resource type id.
    pub fn type_id(&self) -> WORD { self.type_id }

    /// Returns the resource id.
    pub fn id(&self) -> WORD { self.id }

    /// Returns the size of the payload in bytes.
    pub fn size(&self) -> u32 { self.size }

    /// Returns the payload.
    pub fn payload(&self) -> &dyn Payload { &*self.payload }
}

/// Collection of numbered resources to be serialized into an object file.
///
/// Resource ids are unique within the container. After [`ResourceContainer::freeze`] no more resources can be added.
#[derive(Debug)]
pub struct ResourceContainer {
    resources: Vec<Resource>,
    next_id:       WORD,
    // upper bound of the object size
    reserved_size: u64,
    layout:        Option<ResourceLayout>,
}
impl Default for ResourceContainer {
    fn default() -> Self { Self::new() }
}
impl ResourceContainer {
    pub fn new() -> Self {
        Self {
            resources:     Vec::new(),
            next_id:       1,
            reserved_size: OBJECT_OVERHEAD,
            layout:        None,
        }
    }

    /// Allocate the next resource id, starting at 1.
    ///
    /// # Returns
    /// Returns an error if all ids have been allocated.
    pub fn next_id(&mut self) -> Result<WORD, ResourceError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(ResourceError::IdsExhausted)?;
        Ok(id)
    }

    /// Add a resource to the container.
    ///
    /// # Returns
    /// Returns an error if the container is frozen, the id is already in use or the object would grow larger than 4 GiB.
    pub fn add_resource<P: Payload + 'static>(
        &mut self, type_id: WORD, id: WORD, payload: P,
    ) -> Result<(), ResourceError> {
        if self.is_frozen() {
            return Err(ResourceError::Frozen);
        }
        if self.resources.iter().any(|resource| resource.id == id) {
            return Err(ResourceError::DuplicateId(id));
        }
        let size = u32::try_from(payload.size())
            .map_err(|_| ResourceError::PayloadTooLarge(payload.size()))?;
        let reserved_size = self.reserved_size
            + aligned_to(size as u64, RESOURCE_DATA_ALIGNMENT as u64)
            + RESOURCE_OVERHEAD;
        if reserved_size > u32::MAX as u64 {
            return Err(ResourceError::PayloadTooLarge(payload.size()));
        }
        self.reserved_size = reserved_size;
        trace!("adding resource {:#x?}/{} ({} bytes)", type_id, id, size);
        self.resources.push(Resource {
            type_id,
            id,
            size,
            payload: Box::new(payload),
        });
        Ok(())
    }

    /// Fix the resource directory layout. Subsequent calls have no effect.
    pub fn freeze(&mut self) {
        if self.layout.is_none() {
            self.layout = Some(ResourceLayout::new(&self.resources));
        }
    }

    /// Returns whether the container is frozen.
    pub fn is_frozen(&self) -> bool { self.layout.is_some() }

    /// Returns the resources in the order they were added.
    pub fn resources(&self) -> &[Resource] { &self.resources }

    /// Returns the resources of the given type in the order they were added.
    pub fn resources_of_type(&self, type_id: WORD) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(move |resource| resource.type_id == type_id)
    }

    /// Returns the size of the resource section in bytes, or `None` if the container is not frozen.
    pub fn section_size(&self) -> Option<u32> { self.layout.as_ref().map(|layout| layout.size) }

    /// Serialize the resources into an object file for the given architecture.
    ///
    /// File-backed payloads are read at this point.
    ///
    /// # Returns
    /// Returns an error if the container is not frozen or a payload could not be read.
    pub fn serialize(&self, architecture: Architecture) -> Result<Vec<u8>, ResourceError> {
        let layout = self.layout.as_ref().ok_or(ResourceError::NotFrozen)?;
        let section = ResourceSection {
            resources: &self.resources,
            layout,
        };
        let object = ObjectFile::new(architecture, &section, &layout.relocations);

        let mut data = Vec::with_capacity(object.size() as usize);
        walk(&object, &mut data)?;
        debug!("serialized {} resources for {}: {} bytes", self.resources.len(), architecture, data.len());
        Ok(data)
    }

    /// Serialize the resources into an object file for the given architecture and write it to the writer.
    pub fn write_writer<W: Write>(
        &self, architecture: Architecture, writer: &mut W,
    ) -> Result<(), ResourceError> {
        let data = self.serialize(architecture)?;
        writer.write_all(&data)?;
        Ok(())
    }
}


/// Resource directory table data.
#[derive(Debug, Clone)]
enum TableData {
    Table(ResourceDirectoryTable),
    Entry(ResourceDirectoryEntry),
}

/// Frozen resource directory.
///
/// The directory has three levels: type, id and language. All tables come first, followed by the data
/// descriptions and the data itself, each data item aligned to 8 bytes.
#[derive(Debug, Clone)]
struct ResourceLayout {
    tables:       Vec<TableData>,
    descriptions: Vec<ResourceDataEntry>,
    // resource index and trailing padding, in description order
    data:         Vec<(usize, usize)>,
    // section offsets of the description rvas
    relocations:  Vec<u32>,
    size:         u32,
}
impl ResourceLayout {
    fn new(resources: &[Resource]) -> Self {
        let mut order = (0..resources.len()).collect::<Vec<_>>();
        order.sort_by_key(|&index| (resources[index].type_id, resources[index].id));

        let mut types = IndexMap::<WORD, Vec<usize>, _>::with_hasher(RandomState::new());
        for index in order {
            types.entry(resources[index].type_id).or_default().push(index);
        }

        let types_offset = 16 + types.len() as u32 * 8;
        let languages_offset =
            types_offset + types.values().map(|ids| 16 + ids.len() as u32 * 8).sum::<u32>();
        let descriptions_offset = languages_offset + resources.len() as u32 * 24;
        let data_offset = descriptions_offset + resources.len() as u32 * 16;

        let mut tables = Vec::new();
        tables.push(TableData::Table(table(types.len())));

        let mut next_table_offset = types_offset;
        for (&type_id, ids) in &types {
            tables.push(TableData::Entry(ResourceDirectoryEntry {
                name_offset_or_integer_id:         type_id as u32,
                data_entry_or_subdirectory_offset: next_table_offset | RESOURCE_SUBDIRECTORY_FLAG,
            }));
            next_table_offset += 16 + ids.len() as u32 * 8;
        }

        let mut next_table_offset = languages_offset;
        for ids in types.values() {
            tables.push(TableData::Table(table(ids.len())));
            for &index in ids {
                tables.push(TableData::Entry(ResourceDirectoryEntry {
                    name_offset_or_integer_id:         resources[index].id as u32,
                    data_entry_or_subdirectory_offset: next_table_offset
                        | RESOURCE_SUBDIRECTORY_FLAG,
                }));
                next_table_offset += 24;
            }
        }

        let mut descriptions = Vec::new();
        let mut data = Vec::new();
        let mut relocations = Vec::new();
        let mut next_description_offset = descriptions_offset;
        let mut next_data_offset = data_offset;
        for &index in types.values().flatten() {
            tables.push(TableData::Table(table(1)));
            tables.push(TableData::Entry(ResourceDirectoryEntry {
                name_offset_or_integer_id:         LANGUAGE_ID_EN_US as u32,
                data_entry_or_subdirectory_offset: next_description_offset,
            }));

            let size = resources[index].size;
            descriptions.push(ResourceDataEntry {
                data_rva: next_data_offset,
                size,
                codepage: 0,
                reserved: 0,
            });
            relocations.push(next_description_offset);
            next_description_offset += 16;

            let aligned_size = aligned_to(size, RESOURCE_DATA_ALIGNMENT);
            data.push((index, (aligned_size - size) as usize));
            next_data_offset += aligned_size;
        }
        trace!("resource directory: {:#x?}", tables);

        Self {
            tables,
            descriptions,
            data,
            relocations,
            size: next_data_offset,
        }
    }
}

fn table(number_of_id_entries: usize) -> ResourceDirectoryTable {
    ResourceDirectoryTable {
        number_of_id_entries: number_of_id_entries as u16,
        ..Default::default()
    }
}

/// Resource section data of a frozen container.
pub(crate) struct ResourceSection<'a> {
    resources: &'a [Resource],
    layout:    &'a ResourceLayout,
}
impl ResourceSection<'_> {
    pub(crate) fn size(&self) -> u32 { self.layout.size }
}
impl Structure for ResourceSection<'_> {
    fn fields(&self) -> Vec<Field<'_>> {
        let mut fields = Vec::new();
        fields.extend(self.layout.tables.iter().map(|data| match data {
            TableData::Table(table) => Field::Nested(table),
            TableData::Entry(entry) => Field::Nested(entry),
        }));
        fields.extend(self.layout.descriptions.iter().map(|description| Field::Nested(description)));
        for &(index, padding) in &self.layout.data {
            fields.push(Field::Sized(self.resources[index].payload()));
            fields.push(Field::Bytes(&ZEROES[..padding]));
        }
        fields
    }

    fn size(&self) -> u64 { self.layout.size as u64 }
}
