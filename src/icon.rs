//! Icon and manifest resources.
//!
//! Icon images are stored as individual `RT_ICON` resources and referenced by an `RT_GROUP_ICON` resource.
//! See <https://devblogs.microsoft.com/oldnewthing/20120720-00/?p=7083> for the layout.

use std::{
    io::{self, Read, Write},
    mem::size_of,
    path::Path,
    rc::Rc,
};

use log::{debug, warn};

use crate::{
    constants::*,
    errors::*,
    resource::*,
    types::*,
    util::*,
    walk::{walk, Field, Payload, Structure},
};

/// Decoded icon file directory.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct IconHeader {
    pub directory: IconDirectory,
    pub entries:   Vec<IconFileEntry>,
}
impl IconHeader {
    /// Decode the directory of an icon file.
    ///
    /// Only the directory is read; image data is not decoded.
    ///
    /// # Returns
    /// Returns an error if the data is not an icon file or an image lies outside of the file.
    pub fn parse<R: Read>(reader: &mut R, file_size: u64) -> Result<Self, ResourceError> {
        let mut data = vec![0; size_of::<IconDirectory>()];
        read_icon_data(reader, &mut data)?;
        let directory = read::<IconDirectory>(&data)?;
        debug!("{:#x?}", directory);
        if directory.reserved != 0 || directory.type_ != 1 {
            return Err(ResourceError::InvalidIcon("invalid icon header".into()));
        }

        let mut data = vec![0; directory.count as usize * size_of::<IconFileEntry>()];
        read_icon_data(reader, &mut data)?;
        let entries = data
            .chunks_exact(size_of::<IconFileEntry>())
            .map(read::<IconFileEntry>)
            .collect::<Result<Vec<_>, _>>()?;

        for entry in &entries {
            debug!("{:#x?}", entry);
            let end = entry.image_offset as u64 + entry.bytes as u64;
            if end > file_size {
                return Err(ResourceError::InvalidIcon(format!(
                    "image data {:#x?}..{:#x?} outside of file ({:#x?})",
                    { entry.image_offset },
                    end,
                    file_size
                )));
            }
        }

        Ok(Self {
            directory,
            entries,
        })
    }

    /// Decode the directory of an icon file on disk.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ResourceError> {
        let mut file = open_file(path.as_ref())?;
        let file_size = file.metadata()?.len();
        Self::parse(&mut file, file_size)
    }
}

fn read_icon_data<R: Read>(reader: &mut R, data: &mut [u8]) -> Result<(), ResourceError> {
    reader.read_exact(data).map_err(|error| match error.kind() {
        io::ErrorKind::UnexpectedEof => ResourceError::InvalidIcon("truncated icon header".into()),
        _ => error.into(),
    })
}

/// Icon group resource payload.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct IconGroup {
    pub directory: IconDirectory,
    pub entries:   Vec<IconDirectoryEntry>,
}
impl Structure for IconGroup {
    fn fields(&self) -> Vec<Field<'_>> {
        let mut fields = vec![Field::Nested(&self.directory)];
        fields.extend(self.entries.iter().map(|entry| Field::Nested(entry)));
        fields
    }
}
impl Payload for IconGroup {
    fn size(&self) -> u64 { Structure::size(self) }

    fn write_to(&self, mut writer: &mut dyn Write) -> io::Result<()> {
        walk(self, &mut writer)?;
        Ok(())
    }
}

/// Add all images of an icon file and an icon group referring to them to the container.
///
/// The images are registered as ranges of the opened file and read when the container is serialized.
///
/// # Returns
/// Returns the id of the icon group resource, or `None` if the icon file contains no images.
/// Returns an error if the file could not be opened or is not a valid icon file.
pub fn add_icon<P: AsRef<Path>>(
    container: &mut ResourceContainer, path: P,
) -> Result<Option<WORD>, ResourceError> {
    let path = path.as_ref();
    let mut file = open_file(path)?;
    let file_size = file.metadata()?.len();
    let header = IconHeader::parse(&mut file, file_size)?;
    if header.entries.is_empty() {
        warn!("icon file {} contains no images", path.display());
        return Ok(None);
    }

    let file = Rc::new(file);
    let mut group = IconGroup {
        directory: IconDirectory {
            reserved: 0,
            type_:    1,
            count:    header.entries.len() as u16,
        },
        entries:   Vec::with_capacity(header.entries.len()),
    };
    for entry in &header.entries {
        let id = container.next_id()?;
        let range = FileRange::new(file.clone(), entry.image_offset as u64, entry.bytes as u64);
        container.add_resource(RT_ICON, id, range)?;
        group.entries.push(entry.group_entry(id));
    }

    let id = container.next_id()?;
    debug!("icon group {} with {} images", id, group.entries.len());
    container.add_resource(RT_GROUP_ICON, id, group)?;
    Ok(Some(id))
}

/// Add the contents of a manifest file to the container.
///
/// # Returns
/// Returns the id of the manifest resource, or an error if the file could not be opened.
pub fn add_manifest<P: AsRef<Path>>(
    container: &mut ResourceContainer, path: P,
) -> Result<WORD, ResourceError> {
    let manifest = FileRange::open(path)?;
    let id = container.next_id()?;
    container.add_resource(RT_MANIFEST, id, manifest)?;
    Ok(id)
}
