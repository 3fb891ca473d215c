//! post fixtures

use sfnt_types::{Fixed, Version16Dot16};

use crate::{be_buffer, BeBuffer};

/// The 32-byte header, for the given version.
pub fn post_header(version: Version16Dot16) -> BeBuffer {
    be_buffer! {
        version,
        (Fixed::from_f64(-12.5)), // italicAngle
        -100i16, // underlinePosition
        50i16,   // underlineThickness
        1u32,    // isFixedPitch
        0u32, 0u32, 0u32, 0u32 // memory usage
    }
}

/// A version 2.0 table naming four glyphs: `.notdef`, `A`, and two
/// custom names.
pub fn post_v2() -> BeBuffer {
    post_header(Version16Dot16::VERSION_2_0)
        .push(4u16) // numGlyphs
        .extend([0u16, 36, 258, 259]) // glyphNameIndex
        .push(7u8)
        .extend_bytes(b"uni0100")
        .push(2u8)
        .extend_bytes(b"ka")
}
