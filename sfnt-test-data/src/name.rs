//! name fixtures

use crate::{be_buffer, BeBuffer};

/// Three records: a Macintosh family name, and a Windows family and
/// subfamily name, in key order.
pub fn name_table() -> BeBuffer {
    be_buffer! {
        0u16,  // format
        3u16,  // count
        42u16, // storageOffset
        // platform, encoding, language, name id, length, offset
        1u16, 0u16, 0u16, 1u16, 4u16, 0u16,
        3u16, 1u16, 0x409u16, 1u16, 8u16, 4u16,
        3u16, 1u16, 0x409u16, 2u16, 8u16, 12u16
    }
    .extend_bytes(b"Demo")
    .extend("Demo".encode_utf16())
    .extend("Bold".encode_utf16())
}

/// A format 1 table with one record and one language-tag record.
pub fn name_table_format_1() -> BeBuffer {
    be_buffer! {
        1u16,  // format
        1u16,  // count
        24u16, // storageOffset
        3u16, 1u16, 0x8000u16, 1u16, 4u16, 0u16,
        1u16,  // langTagCount
        10u16, 4u16 // length, offset
    }
    .extend("Ab".encode_utf16())
    .extend("en-US".encode_utf16())
}
