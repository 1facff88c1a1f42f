//! Depth-first serialization of binary structures.
//!
//! A [`Structure`] describes itself as an ordered list of [`Field`]s. Scalars are written
//! little-endian, byte fields are copied verbatim, [`Payload`]s are copied as opaque blobs
//! and nested structures are walked recursively in declaration order.

use std::{
    fmt::Debug,
    io::{self, Write},
};

/// Opaque, sized blob of data that is copied into the output without being descended into.
pub trait Payload: Debug {
    /// Returns the number of bytes [`Payload::write_to`] writes.
    fn size(&self) -> u64;

    /// Write the payload data.
    fn write_to(&self, writer: &mut dyn Write) -> io::Result<()>;
}

/// Field of a binary structure.
pub enum Field<'a> {
    U8(u8),
    U16(u16),
    U32(u32),
    Bytes(&'a [u8]),
    Sized(&'a dyn Payload),
    Nested(&'a dyn Structure),
}
impl Field<'_> {
    /// Returns the serialized size of the field in bytes.
    pub fn size(&self) -> u64 {
        match self {
            Field::U8(_) => 1,
            Field::U16(_) => 2,
            Field::U32(_) => 4,
            Field::Bytes(bytes) => bytes.len() as u64,
            Field::Sized(payload) => payload.size(),
            Field::Nested(structure) => structure.size(),
        }
    }
}

/// Binary structure made up of fields in serialization order.
pub trait Structure {
    fn fields(&self) -> Vec<Field<'_>>;

    /// Returns the serialized size of the structure in bytes.
    fn size(&self) -> u64 { self.fields().iter().map(Field::size).sum() }

    /// Serialize the structure into a new buffer.
    fn to_bytes(&self) -> io::Result<Vec<u8>>
    where
        Self: Sized,
    {
        let mut data = Vec::with_capacity(self.size() as usize);
        walk(self, &mut data)?;
        Ok(data)
    }
}

/// Write the structure and all of its children to the writer.
///
/// # Returns
/// Returns the number of bytes written, or an error if the writer failed or a payload wrote a different number of bytes than it declared.
pub fn walk<W: Write>(structure: &dyn Structure, writer: &mut W) -> io::Result<u64> {
    let mut written = 0;
    for field in structure.fields() {
        written += write_field(&field, writer)?;
    }
    Ok(written)
}

fn write_field<W: Write>(field: &Field<'_>, writer: &mut W) -> io::Result<u64> {
    match field {
        Field::U8(value) => writer.write_all(&value.to_le_bytes())?,
        Field::U16(value) => writer.write_all(&value.to_le_bytes())?,
        Field::U32(value) => writer.write_all(&value.to_le_bytes())?,
        Field::Bytes(bytes) => writer.write_all(bytes)?,
        Field::Sized(payload) => {
            let mut counter = CountingWriter {
                inner:   writer,
                written: 0,
            };
            payload.write_to(&mut counter)?;
            if counter.written != payload.size() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "payload wrote {} bytes, expected {}",
                        counter.written,
                        payload.size()
                    ),
                ));
            }
            return Ok(counter.written);
        }
        Field::Nested(structure) => return walk(*structure, writer),
    }
    Ok(field.size())
}

struct CountingWriter<'a, W: Write> {
    inner:   &'a mut W,
    written: u64,
}
impl<W: Write> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> { self.inner.flush() }
}
