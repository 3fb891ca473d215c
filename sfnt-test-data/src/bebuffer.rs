//! A small builder for big-endian byte fixtures

use sfnt_types::Scalar;

/// A convenience type for generating a buffer of big-endian bytes.
///
/// Methods take and return `self` so fixtures can be written as a single
/// expression:
///
/// ```
/// # use sfnt_test_data::BeBuffer;
/// let buf = BeBuffer::new().push(1u16).extend([2i16, -3]);
/// assert_eq!(&*buf, &[0, 1, 0, 2, 0xff, 0xfd]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeBuffer {
    data: Vec<u8>,
}

impl BeBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// The number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write any scalar to this buffer.
    pub fn push(mut self, item: impl Scalar) -> Self {
        self.data.extend(item.to_raw().as_ref());
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: Scalar>(mut self, iter: impl IntoIterator<Item = T>) -> Self {
        for item in iter {
            self.data.extend(item.to_raw().as_ref());
        }
        self
    }

    /// Write raw bytes, such as string data, into the buffer.
    pub fn extend_bytes(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Append zero bytes until the length is a multiple of `align`.
    pub fn align_to(mut self, align: usize) -> Self {
        let padded = self.data.len().next_multiple_of(align);
        self.data.resize(padded, 0);
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl std::ops::Deref for BeBuffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl AsRef<[u8]> for BeBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Build a [`BeBuffer`] from a comma separated list of scalars.
///
/// Literals need a type suffix (`1u16`); other expressions are passed
/// through as is.
///
/// ```
/// # use sfnt_test_data::be_buffer;
/// # use sfnt_types::Tag;
/// let buf = be_buffer! {
///     1u16, // format
///     (Tag::new(b"test")),
///     -1i8,
/// };
/// assert_eq!(buf.len(), 7);
/// ```
#[macro_export]
macro_rules! be_buffer {
    ( $( $x:expr ),* $(,)? ) => {
        $crate::BeBuffer::new() $( .push($x) )*
    };
}

#[cfg(test)]
mod tests {
    use sfnt_types::Tag;

    #[test]
    fn macro_matches_builder() {
        let from_macro = be_buffer! { 4u16, 0xdeadbeef_u32, (Tag::new(b"glyf")) };
        let from_builder = super::BeBuffer::new()
            .push(4u16)
            .push(0xdeadbeef_u32)
            .push(Tag::new(b"glyf"));
        assert_eq!(from_macro, from_builder);
        assert_eq!(from_macro.align_to(4).len(), 12);
    }
}
