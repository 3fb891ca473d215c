//! glyph fixtures

use sfnt_types::F2Dot14;

use crate::{be_buffer, BeBuffer};

/// One contour of two on-curve points, (0, 0) and (0, 100).
///
/// The flags are `[0x31, 0x11]`: the first point omits both deltas, the
/// second omits x and stores y as a 16-bit delta.
pub fn two_point_glyph() -> BeBuffer {
    be_buffer! {
        1i16, // number of contours
        0i16, 0i16, 0i16, 100i16, // bbox
        1u16, // end points of contours
        0u16, // instruction length
        0x31u8, 0x11u8, // flags
        100i16 // y coordinates
    }
}

/// One contour of four on-curve points along the x axis, with a repeated
/// flag and two instruction bytes.
pub fn repeated_flags_glyph() -> BeBuffer {
    be_buffer! {
        1i16,
        10i16, 0i16, 40i16, 0i16,
        3u16,
        2u16, 0xb0u8, 0x01u8, // instructions
        0x3bu8, 3u8, // flag 0x33, repeated three more times
        10u8, 10u8, 10u8, 10u8 // x deltas; y deltas are all omitted
    }
}

/// A composite glyph with two components and trailing instructions.
///
/// The first component uses word offsets (300, -20) and a uniform 0.5
/// scale; the second byte offsets (5, -3), a 2x2 transform and
/// `USE_MY_METRICS`.
pub fn composite_glyph() -> BeBuffer {
    be_buffer! {
        -1i16,
        -10i16, -20i16, 600i16, 700i16,
        // ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES | WE_HAVE_A_SCALE | MORE_COMPONENTS
        0x002bu16, 1u16, 300i16, -20i16,
        (F2Dot14::from_f32(0.5)),
        // ARGS_ARE_XY_VALUES | WE_HAVE_A_TWO_BY_TWO | WE_HAVE_INSTRUCTIONS | USE_MY_METRICS
        0x0382u16, 2u16, 5i8, -3i8,
        (F2Dot14::from_f32(1.0)),
        (F2Dot14::from_f32(0.25)),
        (F2Dot14::from_f32(-0.25)),
        (F2Dot14::from_f32(1.0)),
        3u16, 1u8, 2u8, 3u8
    }
    .align_to(2)
}
