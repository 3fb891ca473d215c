//! raw font bytes

use std::ops::RangeBounds;

use sfnt_types::Scalar;

use crate::read::{FontRead, FontReadWithArgs, ReadError};

/// A reference to raw binary font data.
///
/// This is a wrapper around a byte slice, that provides bounds-checked
/// big-endian reads. Every out-of-bounds access is a
/// [`ReadError::TruncatedData`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FontData<'a> {
    bytes: &'a [u8],
}

/// A cursor for reading sequential fields.
///
/// The position may run past the end of the data; it is only an error to
/// read there.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    pos: usize,
    data: FontData<'a>,
}

impl<'a> FontData<'a> {
    /// Create a new `FontData` with these bytes.
    pub const fn new(bytes: &'a [u8]) -> Self {
        FontData { bytes }
    }

    /// The length of the data, in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if the data has a length of zero bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn split_off(&self, pos: usize) -> Option<FontData<'a>> {
        self.bytes.get(pos..).map(FontData::new)
    }

    pub fn slice(&self, range: impl RangeBounds<usize>) -> Option<FontData<'a>> {
        let bounds = (range.start_bound().cloned(), range.end_bound().cloned());
        self.bytes.get(bounds).map(FontData::new)
    }

    pub fn read_at<T: Scalar>(&self, offset: usize) -> Result<T, ReadError> {
        self.bytes
            .get(offset..)
            .and_then(T::read)
            .ok_or(ReadError::TruncatedData)
    }

    /// Read `count` consecutive scalars starting at `offset`.
    pub fn read_array<T: Scalar>(&self, offset: usize, count: usize) -> Result<Vec<T>, ReadError> {
        let bytes = count
            .checked_mul(T::RAW_BYTE_LEN)
            .and_then(|len| self.bytes.get(offset..)?.get(..len))
            .ok_or(ReadError::TruncatedData)?;
        Ok(bytes
            .chunks_exact(T::RAW_BYTE_LEN)
            .filter_map(T::read)
            .collect())
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], ReadError> {
        self.bytes
            .get(offset..)
            .and_then(|bytes| bytes.get(..len))
            .ok_or(ReadError::TruncatedData)
    }

    /// Read a table from the subrange `range` of this data.
    pub fn read_table<T: FontRead>(&self, range: impl RangeBounds<usize>) -> Result<T, ReadError> {
        self.slice(range)
            .ok_or(ReadError::TruncatedData)
            .and_then(T::read)
    }

    pub fn read_with_args<T: FontReadWithArgs>(&self, args: &T::Args) -> Result<T, ReadError> {
        T::read_with_args(*self, args)
    }

    pub fn cursor(&self) -> Cursor<'a> {
        Cursor {
            pos: 0,
            data: *self,
        }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> Cursor<'a> {
    pub fn advance<T: Scalar>(&mut self) {
        self.pos += T::RAW_BYTE_LEN
    }

    pub fn advance_by(&mut self, n_bytes: usize) {
        self.pos += n_bytes;
    }

    pub fn read<T: Scalar>(&mut self) -> Result<T, ReadError> {
        let temp = self.data.read_at(self.pos);
        self.pos += T::RAW_BYTE_LEN;
        temp
    }

    pub fn read_array<T: Scalar>(&mut self, count: usize) -> Result<Vec<T>, ReadError> {
        let temp = self.data.read_array(self.pos, count);
        self.pos += count * T::RAW_BYTE_LEN;
        temp
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        let temp = self.data.read_bytes(self.pos, len);
        self.pos += len;
        temp
    }

    /// The current position, relative to the start of the underlying data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The number of bytes left to read.
    pub fn remaining_bytes(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// `true` if at least one more `T` can be read.
    pub fn has_room_for<T: Scalar>(&self) -> bool {
        self.remaining_bytes() >= T::RAW_BYTE_LEN
    }

    /// The unread remainder of the data.
    pub fn remaining(&self) -> FontData<'a> {
        self.data.split_off(self.pos).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_is_truncated() {
        let data = FontData::new(&[0, 1, 2, 3, 4]);
        assert_eq!(data.read_at::<u32>(0), Ok(0x00010203));
        assert_eq!(data.read_at::<u32>(2), Err(ReadError::TruncatedData));
        assert_eq!(data.read_at::<u8>(usize::MAX), Err(ReadError::TruncatedData));
        assert_eq!(data.read_array::<u16>(1, 2), Ok(vec![0x0102, 0x0304]));
        assert_eq!(data.read_array::<u16>(1, 3), Err(ReadError::TruncatedData));
        assert_eq!(
            data.read_array::<u16>(0, usize::MAX),
            Err(ReadError::TruncatedData)
        );
    }

    #[test]
    fn cursor_tracks_position() {
        let data = FontData::new(&[0, 1, 0xff, 0xfe, 9]);
        let mut cursor = data.cursor();
        assert_eq!(cursor.read::<u16>(), Ok(1));
        assert_eq!(cursor.read::<i16>(), Ok(-2));
        assert_eq!(cursor.position(), 4);
        assert!(cursor.has_room_for::<u8>());
        assert!(!cursor.has_room_for::<u16>());
        assert_eq!(cursor.remaining().as_bytes(), &[9]);
        assert_eq!(cursor.read::<u16>(), Err(ReadError::TruncatedData));
        assert_eq!(cursor.remaining_bytes(), 0);
    }
}
