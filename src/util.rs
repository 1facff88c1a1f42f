use std::{
    any::type_name,
    fs::File,
    ops::{Add, Rem, Sub},
    path::Path,
};

use zerocopy::FromBytes;

use crate::{ReadError, ResourceError};

pub fn read<T: FromBytes + Copy>(resource: &[u8]) -> Result<T, ReadError> {
    T::read_from_prefix(resource)
        .map_err(|_| ReadError(type_name::<T>().to_string()))
        .map(|(value, _)| value)
}

pub fn open_file(path: &Path) -> Result<File, ResourceError> {
    File::open(path).map_err(|error| ResourceError::OpenFile(path.to_path_buf(), error))
}

pub fn aligned_to<T: Add<Output = T> + Sub<Output = T> + Rem<Output = T> + Eq + Copy + Default>(
    value: T, alignment: T,
) -> T {
    if value % alignment == T::default() {
        return value;
    }
    value + alignment - (value % alignment)
}

/// Padding after a version info key: between 1 and 4 bytes, a full 4 when already aligned.
pub fn key_padding(so_far: usize) -> usize { 4 - so_far % 4 }

/// Padding after a version info string value: between 0 and 3 bytes.
pub fn value_padding(so_far: usize) -> usize { aligned_to(so_far, 4) - so_far }

pub fn string_to_u16<S: AsRef<str>>(string: S, zero_terminate: bool) -> Vec<u8> {
    let string = string.as_ref();
    let mut data = Vec::with_capacity(string.len() * 2 + 2);
    data.extend(string.encode_utf16().flat_map(|c| c.to_le_bytes()));
    if zero_terminate {
        data.extend([0, 0]);
    }
    data
}
