//! test data shared between the sfnt crates.
//!
//! Fixtures are hand-assembled big-endian byte arrays, annotated field by
//! field, so that tests do not depend on binary font files.

mod bebuffer;

pub mod cmap;
pub mod glyf;
pub mod name;
pub mod post;

pub use bebuffer::BeBuffer;
