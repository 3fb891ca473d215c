//! Common scalar data types used in sfnt (TrueType) font tables.
//!
//! Every multi-byte value in an sfnt file is stored big-endian; the
//! [`Scalar`] trait describes how each type moves to and from those bytes.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod fixed;
mod glyph_id;
mod longdatetime;
mod name_id;
mod raw;
mod tag;
mod version;

#[cfg(all(test, feature = "serde"))]
mod serde_test;

pub use fixed::{F2Dot14, Fixed};
pub use glyph_id::GlyphId;
pub use longdatetime::LongDateTime;
pub use name_id::NameId;
pub use raw::Scalar;
pub use tag::{InvalidTag, Tag};
pub use version::Version16Dot16;

/// The sfnt version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: u32 = 0x00010000;

/// The sfnt version used by some legacy Apple fonts ('true').
pub const APPLE_SFNT_VERSION: u32 = 0x74727565;

/// The sfnt version for fonts containing CFF outlines ('OTTO').
pub const CFF_SFNT_VERSION: u32 = 0x4F54544F;
