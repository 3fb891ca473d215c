//! Serializing tables to big-endian bytes

use sfnt_types::{F2Dot14, Fixed, GlyphId, LongDateTime, NameId, Tag, Version16Dot16};

use crate::validate::{Validate, ValidationReport};

/// A type that that can be written out as part of a font file.
pub trait FontWrite {
    /// Write our data into this [TableWriter].
    fn write_into(&self, writer: &mut TableWriter);

    /// The exact number of bytes [`write_into`][Self::write_into] will produce.
    ///
    /// This is computed from the structured fields and is never stored.
    fn compute_length(&self) -> usize;
}

/// A growable buffer of big-endian bytes.
#[derive(Debug, Default)]
pub struct TableWriter {
    data: Vec<u8>,
}

/// Attempt to serialize a table.
///
/// If the table is malformed, this will return an Err([`ValidationReport`]),
/// otherwise it will return the bytes encoding the table.
pub fn dump_table<T: FontWrite + Validate + ?Sized>(
    table: &T,
) -> Result<Vec<u8>, ValidationReport> {
    table.validate()?;
    let mut writer = TableWriter::with_capacity(table.compute_length());
    table.write_into(&mut writer);
    debug_assert_eq!(writer.len(), table.compute_length());
    Ok(writer.into_data())
}

impl TableWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        TableWriter {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Write raw bytes into this table.
    ///
    /// The caller is responsible for ensuring bytes are in big-endian order.
    #[inline]
    pub fn write_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes)
    }

    /// The number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pad with zeros to an even length.
    pub fn pad_to_2byte_aligned(&mut self) {
        if self.data.len() % 2 != 0 {
            self.data.push(0);
        }
    }

    /// Pad with zeros to a multiple of four bytes.
    pub fn pad_to_4byte_aligned(&mut self) {
        let padded = self.data.len().next_multiple_of(4);
        self.data.resize(padded, 0);
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

macro_rules! write_be_bytes {
    ($ty:ty) => {
        impl FontWrite for $ty {
            #[inline]
            fn write_into(&self, writer: &mut TableWriter) {
                writer.write_slice(sfnt_types::Scalar::to_raw(*self).as_ref())
            }

            #[inline]
            fn compute_length(&self) -> usize {
                <$ty as sfnt_types::Scalar>::RAW_BYTE_LEN
            }
        }
    };
}

write_be_bytes!(u8);
write_be_bytes!(i8);
write_be_bytes!(u16);
write_be_bytes!(i16);
write_be_bytes!(u32);
write_be_bytes!(i32);
write_be_bytes!(i64);
write_be_bytes!(F2Dot14);
write_be_bytes!(Fixed);
write_be_bytes!(LongDateTime);
write_be_bytes!(Tag);
write_be_bytes!(Version16Dot16);
write_be_bytes!(GlyphId);
write_be_bytes!(NameId);

impl<T: FontWrite> FontWrite for [T] {
    fn write_into(&self, writer: &mut TableWriter) {
        self.iter().for_each(|item| item.write_into(writer))
    }

    fn compute_length(&self) -> usize {
        self.iter().map(FontWrite::compute_length).sum()
    }
}

impl<T: FontWrite> FontWrite for Vec<T> {
    fn write_into(&self, writer: &mut TableWriter) {
        self.as_slice().write_into(writer)
    }

    fn compute_length(&self) -> usize {
        self.as_slice().compute_length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_big_endian() {
        let mut writer = TableWriter::default();
        0x0102_u16.write_into(&mut writer);
        (-2_i16).write_into(&mut writer);
        Tag::new(b"maxp").write_into(&mut writer);
        vec![1u8, 2, 3].write_into(&mut writer);
        assert_eq!(writer.len(), 11);
        writer.pad_to_4byte_aligned();
        assert_eq!(
            writer.into_data(),
            [1, 2, 0xff, 0xfe, b'm', b'a', b'x', b'p', 1, 2, 3, 0]
        );
    }

    #[test]
    fn padding() {
        let mut writer = TableWriter::default();
        writer.pad_to_2byte_aligned();
        writer.pad_to_4byte_aligned();
        assert!(writer.is_empty());
        writer.write_slice(&[1]);
        writer.pad_to_2byte_aligned();
        assert_eq!(writer.len(), 2);
    }
}
