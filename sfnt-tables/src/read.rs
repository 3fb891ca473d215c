//! Traits for interpreting font data

use sfnt_types::{InvalidTag, Tag};

use crate::font_data::FontData;

/// A type that can be read from raw table data.
///
/// This is implemented for tables that are self-describing: tables that do
/// not need any external state in order to interpret their bytes. Tables that
/// need values from sibling tables implement [`FontReadWithArgs`] instead.
pub trait FontRead: Sized {
    /// Read an instance of `Self` from the provided data, performing validation.
    fn read(data: FontData) -> Result<Self, ReadError>;
}

/// A trait for a type that needs additional arguments to be read.
pub trait ReadArgs {
    type Args: Copy;
}

/// A trait for types that require external data in order to be constructed.
///
/// Any type that implements this also has an inherent `read` constructor
/// that takes the sibling tables the arguments are derived from.
pub trait FontReadWithArgs: Sized + ReadArgs {
    /// read an item, using the provided args.
    ///
    /// If a type requires multiple arguments, they will be passed as a tuple.
    fn read_with_args(data: FontData, args: &Self::Args) -> Result<Self, ReadError>;
}

/// A table that is addressed by a tag in the table directory.
pub trait TopLevelTable {
    /// The table's tag.
    const TAG: Tag;
}

/// An error that occurs when reading font data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// Fewer bytes were available than the structure being read requires.
    TruncatedData,
    /// A fixed-size table had the wrong length.
    MalformedTable {
        tag: Tag,
        expected: usize,
        actual: usize,
    },
    InvalidTag(InvalidTag),
    /// A glyph header had a contour count other than -1, 0 or a positive number.
    UnknownGlyphVariant(i16),
    // i64 is flexible enough to store any value we might encounter
    InvalidFormat(i64),
    InvalidSfnt(u32),
    TableIsMissing(Tag),
    MalformedData(&'static str),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::TruncatedData => write!(f, "Unexpected end of data"),
            ReadError::MalformedTable {
                tag,
                expected,
                actual,
            } => write!(
                f,
                "Malformed '{tag}' table: expected {expected} bytes, found {actual}"
            ),
            ReadError::InvalidTag(err) => write!(f, "Invalid tag: {err}"),
            ReadError::UnknownGlyphVariant(n) => {
                write!(f, "Unknown glyph variant (number of contours {n})")
            }
            ReadError::InvalidFormat(x) => write!(f, "Invalid format '{x}'"),
            ReadError::InvalidSfnt(ver) => write!(f, "Invalid sfnt version 0x{ver:08X}"),
            ReadError::TableIsMissing(tag) => write!(f, "the {tag} table is missing"),
            ReadError::MalformedData(msg) => write!(f, "Malformed data: '{msg}'"),
        }
    }
}

impl std::error::Error for ReadError {}

impl From<InvalidTag> for ReadError {
    fn from(src: InvalidTag) -> ReadError {
        ReadError::InvalidTag(src)
    }
}

/// Fail with [`ReadError::MalformedTable`] unless `data` is exactly `expected` bytes.
pub(crate) fn expect_exact_len(
    tag: Tag,
    data: &FontData,
    expected: usize,
) -> Result<(), ReadError> {
    if data.len() != expected {
        return Err(ReadError::MalformedTable {
            tag,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}
