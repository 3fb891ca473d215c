//! Errors for whole-font operations

use sfnt_types::Tag;

use crate::{read::ReadError, validate::ValidationReport};

/// An error that occurs while reading or writing a [`Font`](crate::Font).
#[derive(Debug, Clone)]
pub enum Error {
    /// A table could not be parsed.
    Read(ReadError),
    /// A table could not be written because it failed validation.
    ValidationFailed { tag: Tag, report: ValidationReport },
    /// The font has more tables than fit in the table directory.
    TooManyTables(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Read(err) => write!(f, "Failed to read font: {err}"),
            Error::ValidationFailed { tag, report } => {
                write!(f, "Table '{tag}' failed validation: {report}")
            }
            Error::TooManyTables(n) => write!(f, "Too many tables ({n}) for one font"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read(err) => Some(err),
            Error::ValidationFailed { report, .. } => Some(report),
            Error::TooManyTables(_) => None,
        }
    }
}

impl From<ReadError> for Error {
    fn from(src: ReadError) -> Error {
        Error::Read(src)
    }
}
