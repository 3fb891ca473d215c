//! The tables supported by this crate.
//!
//! Each table is an owned structure that parses from a [`FontData`] and
//! serializes through [`FontWrite`].
//!
//! [`FontData`]: crate::FontData
//! [`FontWrite`]: crate::FontWrite

pub mod cmap;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod loca;
pub mod maxp;
pub mod name;
pub mod post;
pub mod raw;

/// Platform identifiers, shared by `cmap` encoding records and `name` records.
pub mod platform_id {
    pub const UNICODE: u16 = 0;
    pub const MACINTOSH: u16 = 1;
    /// Deprecated.
    pub const ISO: u16 = 2;
    pub const WINDOWS: u16 = 3;
    pub const CUSTOM: u16 = 4;
}
