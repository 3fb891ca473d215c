//! Reading and writing sfnt (TrueType) font tables
//!
//! Each supported table is an owned, mutable structure that is parsed from
//! big-endian bytes and serialized back to them. Parsing is defensive: the
//! irregularities left by real-world subsetting tools are tolerated and
//! logged, and anything outside the structure being read is an error rather
//! than a panic. Serialization is exact: a table that was read and not
//! modified is written back byte for byte.
//!
//! The [`tables`] module contains a submodule per table. Tables whose layout
//! depends on other tables (`loca`, `hmtx` and `glyf`) take those tables as
//! arguments when they are read. The [`Font`] type holds a whole font file,
//! parses its tables on first use and writes them back with a fresh table
//! directory and checksums.
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use sfnt_tables::{tables::maxp::Maxp, Font};
//! let font_bytes = std::fs::read(path_to_my_font_file).unwrap();
//! let mut font = Font::read(&font_bytes).expect("failed to read font data");
//! let maxp = font.table_mut::<Maxp>().unwrap().expect("missing 'maxp' table");
//! maxp.max_zones = 1;
//! let new_bytes = font.to_bytes().expect("failed to write font");
//! ```
//!
//! # Features
//!
//! - `kurbo` (default): outline extraction from glyphs into [`kurbo::BezPath`]
//! - `serde`: `Serialize` and `Deserialize` for the tables

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod agl;
mod error;
mod font;
mod font_data;
pub mod read;
mod registry;
pub mod tables;
pub mod util;
pub mod validate;
pub mod write;

#[cfg(all(test, feature = "serde"))]
mod serde_test;

pub use error::Error;
pub use font::Font;
pub use font_data::{Cursor, FontData};
pub use read::{FontRead, FontReadWithArgs, ReadError, TopLevelTable};
pub use registry::{create_table, string_to_tag, tag_to_string, KnownTable, Table, TableContext};
pub use write::{dump_table, FontWrite, TableWriter};

/// Public re-export of the sfnt-types crate.
pub extern crate sfnt_types as types;

#[cfg(feature = "kurbo")]
pub extern crate kurbo;
