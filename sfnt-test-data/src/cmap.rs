//! cmap fixtures

use crate::{be_buffer, BeBuffer};

/// A format 4 subtable with three segments.
///
/// - `[0x20, 0x22]` maps through `idDelta` -29, to glyphs 3, 4 and 5
/// - `[0x41, 0x43]` maps through the glyph array to 10, 0 and 12
/// - the `0xFFFF` sentinel, with `idDelta` 1
pub fn cmap4_subtable() -> BeBuffer {
    be_buffer! {
        4u16,  // format
        46u16, // length
        0u16,  // language
        6u16,  // segCountX2
        4u16,  // searchRange
        1u16,  // entrySelector
        2u16,  // rangeShift
        // endCode
        0x22u16, 0x43u16, 0xFFFFu16,
        0u16, // reservedPad
        // startCode
        0x20u16, 0x41u16, 0xFFFFu16,
        // idDelta
        -29i16, 0i16, 1i16,
        // idRangeOffset; the second points 4 bytes ahead, at the glyph array
        0u16, 4u16, 0u16,
        // glyphIdArray
        10u16, 0u16, 12u16
    }
}

/// A format 6 subtable covering `0x30..0x34`, where glyph 5 appears twice.
pub fn cmap6_subtable() -> BeBuffer {
    be_buffer! {
        6u16,  // format
        18u16, // length
        0u16,  // language
        0x30u16, // firstCode
        4u16,    // entryCount
        5u16, 6u16, 5u16, 0u16
    }
}

/// A format 14 (Unicode variation sequences) subtable with no records.
pub fn cmap14_subtable() -> BeBuffer {
    be_buffer! {
        14u16, // format
        10u32, // length
        0u32   // numVarSelectorRecords
    }
}

/// A cmap with four encoding records, where (0, 3) and (3, 1) share the
/// format 4 subtable and (0, 5) points at a format 14 subtable.
///
/// Subtables are laid out in the order of their first reference.
pub fn cmap_table() -> BeBuffer {
    be_buffer! {
        0u16, // version
        4u16, // numTables
        0u16, 3u16, 36u32,
        0u16, 5u16, 82u32,
        1u16, 0u16, 92u32,
        3u16, 1u16, 36u32
    }
    .extend_bytes(&cmap4_subtable())
    .extend_bytes(&cmap14_subtable())
    .extend_bytes(&cmap6_subtable())
}
