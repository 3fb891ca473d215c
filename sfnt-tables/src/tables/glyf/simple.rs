//! Simple glyphs (glyphs which do not contain components)

use crate::{
    read::{FontRead, ReadError},
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

use super::Bbox;

bitflags::bitflags! {
    /// Flags used in [`SimpleGlyph`]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SimpleGlyphFlags: u8 {
        /// Bit 0: If set, the point is on the curve; otherwise, it is off
        /// the curve.
        const ON_CURVE_POINT = 0x01;
        /// Bit 1: If set, the corresponding x-coordinate is 1 byte long,
        /// and the sign is given by
        /// X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR.
        const X_SHORT_VECTOR = 0x02;
        /// Bit 2: If set, the corresponding y-coordinate is 1 byte long.
        const Y_SHORT_VECTOR = 0x04;
        /// Bit 3: If set, the next byte specifies the number of additional
        /// times this flag byte is to be repeated.
        const REPEAT_FLAG = 0x08;
        /// Bit 4: With X_SHORT_VECTOR, the sign of the x delta; without it,
        /// the x delta is omitted (zero).
        const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 0x10;
        /// Bit 5: the y counterpart of bit 4.
        const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 0x20;
        /// Bit 6: If set, contours in the glyph description may overlap.
        const OVERLAP_SIMPLE = 0x40;
        /// Bit 7: reserved.
        const RESERVED = 0x80;
    }
}

/// A point in a glyph outline, in font units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurvePoint {
    pub x: i16,
    pub y: i16,
    pub on_curve: bool,
}

/// A simple (without components) glyph
///
/// Equality compares the outline and instructions, not how the points
/// happened to be encoded.
#[derive(Clone, Debug, Default)]
pub struct SimpleGlyph {
    pub bbox: Bbox,
    pub contours: Vec<Contour>,
    pub instructions: Vec<u8>,
    // per-point flags as read, without the repeat bit. These are reused when
    // writing if they still describe the deltas, so unmodified glyphs
    // reproduce their input bytes.
    stored_flags: Vec<SimpleGlyphFlags>,
}

/// A single contour, comprising only line and quadratic bezier segments
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Contour(Vec<CurvePoint>);

impl PartialEq for SimpleGlyph {
    fn eq(&self, other: &Self) -> bool {
        self.bbox == other.bbox
            && self.contours == other.contours
            && self.instructions == other.instructions
    }
}

impl Eq for SimpleGlyph {}

impl CurvePoint {
    pub fn new(x: i16, y: i16, on_curve: bool) -> Self {
        Self { x, y, on_curve }
    }

    pub fn on_curve(x: i16, y: i16) -> Self {
        Self::new(x, y, true)
    }

    pub fn off_curve(x: i16, y: i16) -> Self {
        Self::new(x, y, false)
    }
}

impl SimpleGlyph {
    /// Create a glyph from contours, computing the bounding box.
    pub fn from_contours(contours: Vec<Contour>) -> Self {
        let mut glyph = SimpleGlyph {
            contours,
            ..Default::default()
        };
        glyph.recompute_bounding_box();
        glyph
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// The total number of points in all contours.
    pub fn num_points(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    /// All points, in order, with absolute coordinates.
    pub fn points(&self) -> impl Iterator<Item = CurvePoint> + '_ {
        self.contours.iter().flat_map(|c| c.iter().copied())
    }

    /// The index of the last point of each contour.
    pub fn end_pts_of_contours(&self) -> Vec<u16> {
        self.contours
            .iter()
            .scan(0usize, |cur, contour| {
                *cur += contour.len();
                Some(cur.saturating_sub(1) as u16)
            })
            .collect()
    }

    /// The flag byte that will be written for each point (before run-length
    /// packing).
    pub fn flags(&self) -> Vec<SimpleGlyphFlags> {
        self.compute_point_deltas().map(|(flag, _, _)| flag).collect()
    }

    /// Compute the flags and deltas for this glyph's points.
    ///
    /// This does not do the final binary encoding, and it also does not handle
    /// repeating flags.
    fn compute_point_deltas(
        &self,
    ) -> impl Iterator<Item = (SimpleGlyphFlags, CoordDelta, CoordDelta)> + '_ {
        const KEPT_BITS: SimpleGlyphFlags =
            SimpleGlyphFlags::OVERLAP_SIMPLE.union(SimpleGlyphFlags::RESERVED);

        let (mut last_x, mut last_y) = (0i16, 0i16);
        self.points().enumerate().map(move |(i, point)| {
            let stored = self.stored_flags.get(i).copied();
            let d_x = point.x.wrapping_sub(last_x);
            let d_y = point.y.wrapping_sub(last_y);
            last_x = point.x;
            last_y = point.y;

            let mut flag = stored.map(|f| f & KEPT_BITS).unwrap_or_default();
            if point.on_curve {
                flag |= SimpleGlyphFlags::ON_CURVE_POINT;
            }
            let (x_flag, x_data) = coord_flag_and_delta(
                d_x,
                stored,
                SimpleGlyphFlags::X_SHORT_VECTOR,
                SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
            );
            let (y_flag, y_data) = coord_flag_and_delta(
                d_y,
                stored,
                SimpleGlyphFlags::Y_SHORT_VECTOR,
                SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
            );
            (flag | x_flag | y_flag, x_data, y_data)
        })
    }

    /// Recompute the Glyph's bounding box based on the current contours
    pub fn recompute_bounding_box(&mut self) {
        let mut points = self.points().map(|p| (p.x, p.y));

        if let Some((mut x_min, mut y_min)) = points.next() {
            let mut x_max = x_min;
            let mut y_max = y_min;
            for (x, y) in points {
                x_min = x_min.min(x);
                y_min = y_min.min(y);
                x_max = x_max.max(x);
                y_max = y_max.max(y);
            }
            self.bbox = Bbox {
                x_min,
                y_min,
                x_max,
                y_max,
            };
        }
    }
}

/// Choose the flag bits and encoding for one coordinate delta.
///
/// The stored flag is honored when its bits can express `value`.
fn coord_flag_and_delta(
    value: i16,
    stored: Option<SimpleGlyphFlags>,
    short_flag: SimpleGlyphFlags,
    same_or_pos: SimpleGlyphFlags,
) -> (SimpleGlyphFlags, CoordDelta) {
    const SHORT_MAX: i16 = u8::MAX as i16;
    const SHORT_MIN: i16 = -SHORT_MAX;

    if let Some(stored) = stored {
        let bits = stored & (short_flag | same_or_pos);
        match (bits.contains(short_flag), bits.contains(same_or_pos)) {
            (true, true) if (0..=SHORT_MAX).contains(&value) => {
                return (bits, CoordDelta::Short(value as u8))
            }
            (true, false) if (SHORT_MIN..=0).contains(&value) => {
                return (bits, CoordDelta::Short(value.unsigned_abs() as u8))
            }
            (false, true) if value == 0 => return (bits, CoordDelta::Skip),
            (false, false) => return (bits, CoordDelta::Long(value)),
            _ => (),
        }
    }

    match value {
        0 => (same_or_pos, CoordDelta::Skip),
        SHORT_MIN..=-1 => (short_flag, CoordDelta::Short(value.unsigned_abs() as u8)),
        1..=SHORT_MAX => (short_flag | same_or_pos, CoordDelta::Short(value as _)),
        _other => (SimpleGlyphFlags::empty(), CoordDelta::Long(value)),
    }
}

impl Contour {
    /// The total number of points in this contour
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if this contour is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurvePoint> {
        self.0.iter()
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.0
    }
}

impl From<Vec<CurvePoint>> for Contour {
    fn from(points: Vec<CurvePoint>) -> Self {
        Self(points)
    }
}

impl From<Contour> for Vec<CurvePoint> {
    fn from(contour: Contour) -> Self {
        contour.0
    }
}

/// A little helper for managing how we're representing a given delta
#[derive(Clone, Copy, Debug)]
enum CoordDelta {
    // this is a repeat (set in the flag) and so we write nothing
    Skip,
    Short(u8),
    Long(i16),
}

impl FontWrite for CoordDelta {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            CoordDelta::Skip => (),
            CoordDelta::Short(val) => val.write_into(writer),
            CoordDelta::Long(val) => val.write_into(writer),
        }
    }

    fn compute_length(&self) -> usize {
        match self {
            CoordDelta::Skip => 0,
            CoordDelta::Short(_) => 1,
            CoordDelta::Long(_) => 2,
        }
    }
}

// read one coordinate delta, as selected by the flag bits
fn read_delta(
    cursor: &mut crate::Cursor,
    flags: SimpleGlyphFlags,
    short_flag: SimpleGlyphFlags,
    same_or_pos: SimpleGlyphFlags,
) -> Result<i16, ReadError> {
    Ok(
        match (flags.contains(short_flag), flags.contains(same_or_pos)) {
            (true, false) => -(cursor.read::<u8>()? as i16),
            (true, true) => cursor.read::<u8>()? as i16,
            (false, false) => cursor.read::<i16>()?,
            (false, true) => 0,
        },
    )
}

impl FontRead for SimpleGlyph {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let num_contours: i16 = cursor.read()?;
        if num_contours < 1 {
            return Err(ReadError::InvalidFormat(num_contours.into()));
        }
        let bbox = Bbox::read(&mut cursor)?;
        let end_pts: Vec<u16> = cursor.read_array(num_contours as usize)?;
        if end_pts.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ReadError::MalformedData("glyf contour end points out of order"));
        }
        let num_points = end_pts.last().map(|last| *last as usize + 1).unwrap_or(0);
        let instruction_len: u16 = cursor.read()?;
        let instructions = cursor.read_bytes(instruction_len as usize)?.to_vec();

        let mut flags = Vec::with_capacity(num_points);
        while flags.len() < num_points {
            let flag = SimpleGlyphFlags::from_bits_retain(cursor.read()?);
            let repeats = if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
                cursor.read::<u8>()? as usize + 1
            } else {
                1
            };
            if flags.len() + repeats > num_points {
                return Err(ReadError::MalformedData("repeat count too large in glyf"));
            }
            let flag = flag - SimpleGlyphFlags::REPEAT_FLAG;
            flags.extend(std::iter::repeat_n(flag, repeats));
        }

        let mut x_coords = Vec::with_capacity(num_points);
        let mut cur_x = 0i16;
        for flag in &flags {
            cur_x = cur_x.wrapping_add(read_delta(
                &mut cursor,
                *flag,
                SimpleGlyphFlags::X_SHORT_VECTOR,
                SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
            )?);
            x_coords.push(cur_x);
        }
        let mut cur_y = 0i16;
        let mut points = Vec::with_capacity(num_points);
        for (flag, x) in flags.iter().zip(x_coords) {
            cur_y = cur_y.wrapping_add(read_delta(
                &mut cursor,
                *flag,
                SimpleGlyphFlags::Y_SHORT_VECTOR,
                SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
            )?);
            points.push(CurvePoint::new(
                x,
                cur_y,
                flag.contains(SimpleGlyphFlags::ON_CURVE_POINT),
            ));
        }

        let mut points = points.into_iter();
        let mut last_end = 0;
        let contours = end_pts
            .iter()
            .map(|end_pt| {
                let end = *end_pt as usize + 1;
                let count = end - last_end;
                last_end = end;
                Contour(points.by_ref().take(count).collect())
            })
            .collect();

        Ok(SimpleGlyph {
            bbox,
            contours,
            instructions,
            stored_flags: flags,
        })
    }
}

impl FontWrite for SimpleGlyph {
    fn write_into(&self, writer: &mut TableWriter) {
        let n_contours = self.contours.len() as i16;
        if n_contours == 0 {
            // we don't bother writing empty glyphs
            return;
        }
        n_contours.write_into(writer);
        self.bbox.write_into(writer);
        self.end_pts_of_contours().write_into(writer);
        (self.instructions.len() as u16).write_into(writer);
        self.instructions.write_into(writer);

        let deltas = self.compute_point_deltas().collect::<Vec<_>>();
        RepeatableFlag::iter_from_flags(deltas.iter().map(|(flag, _, _)| *flag))
            .for_each(|flag| flag.write_into(writer));
        deltas.iter().for_each(|(_, x, _)| x.write_into(writer));
        deltas.iter().for_each(|(_, _, y)| y.write_into(writer));
        writer.pad_to_2byte_aligned();
    }

    fn compute_length(&self) -> usize {
        if self.contours.is_empty() {
            return 0;
        }
        let deltas = self.compute_point_deltas().collect::<Vec<_>>();
        let flags_len: usize =
            RepeatableFlag::iter_from_flags(deltas.iter().map(|(flag, _, _)| *flag))
                .map(|flag| flag.compute_length())
                .sum();
        let coords_len: usize = deltas
            .iter()
            .map(|(_, x, y)| x.compute_length() + y.compute_length())
            .sum();
        let len = 10 + self.contours.len() * 2 + 2 + self.instructions.len() + flags_len + coords_len;
        len.next_multiple_of(2)
    }
}

/// A little helper for writing flags that may have a 'repeat' byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RepeatableFlag {
    flag: SimpleGlyphFlags,
    repeat: u8,
}

impl FontWrite for RepeatableFlag {
    fn write_into(&self, writer: &mut TableWriter) {
        debug_assert_eq!(
            self.flag.contains(SimpleGlyphFlags::REPEAT_FLAG),
            self.repeat > 0
        );

        self.flag.bits().write_into(writer);
        if self.flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
            self.repeat.write_into(writer);
        }
    }

    fn compute_length(&self) -> usize {
        1 + self.flag.contains(SimpleGlyphFlags::REPEAT_FLAG) as usize
    }
}

impl RepeatableFlag {
    /// given an iterator over raw flags, return an iterator over flags + repeat values
    fn iter_from_flags(
        flags: impl IntoIterator<Item = SimpleGlyphFlags>,
    ) -> impl Iterator<Item = RepeatableFlag> {
        let mut iter = flags.into_iter();
        let mut prev = None;
        // a flag that repeats exactly once costs the same either way; like
        // fontmake, we write it twice rather than using a repeat count of 1.
        let mut decompose_single_repeat = None;

        std::iter::from_fn(move || loop {
            if let Some(repeat) = decompose_single_repeat.take() {
                return Some(repeat);
            }

            match (iter.next(), prev.take()) {
                (None, Some(RepeatableFlag { flag, repeat: 1 })) => {
                    let flag = flag & !SimpleGlyphFlags::REPEAT_FLAG;
                    decompose_single_repeat = Some(RepeatableFlag { flag, repeat: 0 });
                    return decompose_single_repeat;
                }
                (None, prev) => return prev,
                (Some(flag), None) => prev = Some(RepeatableFlag { flag, repeat: 0 }),
                (Some(flag), Some(mut last)) => {
                    if (last.flag & !SimpleGlyphFlags::REPEAT_FLAG) == flag && last.repeat < u8::MAX
                    {
                        last.repeat += 1;
                        last.flag |= SimpleGlyphFlags::REPEAT_FLAG;
                        prev = Some(last);
                    } else {
                        if last.repeat == 1 {
                            last.flag &= !SimpleGlyphFlags::REPEAT_FLAG;
                            last.repeat = 0;
                            // stash the extra flag for the next pass of the loop
                            decompose_single_repeat = Some(last);
                        }
                        prev = Some(RepeatableFlag { flag, repeat: 0 });
                        return Some(last);
                    }
                }
            }
        })
    }
}

impl Validate for SimpleGlyph {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("SimpleGlyph", |ctx| {
            if self.contours.len() > i16::MAX as usize {
                ctx.in_field("contours", |ctx| ctx.report("too many contours"));
            }
            if self.num_points() > u16::MAX as usize + 1 {
                ctx.in_field("contours", |ctx| ctx.report("too many points"));
            }
            for (i, contour) in self.contours.iter().enumerate() {
                if contour.is_empty() {
                    ctx.in_field("contours", |ctx| {
                        ctx.in_item(i, |ctx| ctx.report("contours must not be empty"))
                    });
                }
            }
            if self.instructions.len() > u16::MAX as usize {
                ctx.in_field("instructions", |ctx| ctx.report("instructions len overflows"));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn flag_bits(glyph: &SimpleGlyph) -> Vec<u8> {
        glyph.flags().iter().map(|flag| flag.bits()).collect()
    }

    #[test]
    fn decode_two_point_contour() {
        let data = sfnt_test_data::glyf::two_point_glyph();
        let glyph = SimpleGlyph::read(FontData::new(&data)).unwrap();
        // 0x31: on curve, both deltas omitted; 0x11: x omitted, y a long delta
        assert_eq!(
            glyph.points().collect::<Vec<_>>(),
            vec![CurvePoint::on_curve(0, 0), CurvePoint::on_curve(0, 100)]
        );
        assert_eq!(glyph.end_pts_of_contours(), vec![1]);
        assert_eq!(flag_bits(&glyph), vec![0x31, 0x11]);
        assert_eq!(dump_table(&glyph).unwrap(), data.data());
        assert_eq!(glyph.compute_length(), data.len());
    }

    #[test]
    fn decode_repeated_flags() {
        let data = sfnt_test_data::glyf::repeated_flags_glyph();
        let glyph = SimpleGlyph::read(FontData::new(&data)).unwrap();
        let xs = glyph.points().map(|p| p.x).collect::<Vec<_>>();
        assert_eq!(xs, vec![10, 20, 30, 40]);
        assert!(glyph.points().all(|p| p.y == 0 && p.on_curve));
        assert_eq!(glyph.instructions, vec![0xb0, 0x01]);
        assert_eq!(dump_table(&glyph).unwrap(), data.data());
    }

    #[test]
    fn too_many_repeats() {
        let data = sfnt_test_data::be_buffer! {
            1i16, 0i16, 0i16, 0i16, 0i16,
            1u16, // one contour of two points
            0u16, // no instructions
            0x39u8, 5u8 // repeat flag, six times
        };
        assert_eq!(
            SimpleGlyph::read(FontData::new(&data)),
            Err(ReadError::MalformedData("repeat count too large in glyf"))
        );
    }

    #[test]
    fn truncated_coordinates() {
        let data = sfnt_test_data::glyf::two_point_glyph();
        assert_eq!(
            SimpleGlyph::read(FontData::new(&data[..data.len() - 1])),
            Err(ReadError::TruncatedData)
        );
    }

    #[test]
    fn writes_deltas_not_absolute_values() {
        let glyph = SimpleGlyph::from_contours(vec![Contour::from(vec![
            CurvePoint::on_curve(20, -100),
            CurvePoint::on_curve(25, -90),
            CurvePoint::off_curve(-300, 1000),
            CurvePoint::on_curve(80, -20),
        ])]);
        assert_eq!(
            glyph.bbox,
            Bbox {
                x_min: -300,
                y_min: -100,
                x_max: 80,
                y_max: 1000
            }
        );
        let bytes = dump_table(&glyph).unwrap();
        assert_eq!(bytes.len(), glyph.compute_length());
        let read = SimpleGlyph::read(FontData::new(&bytes)).unwrap();
        assert_eq!(
            read.points().collect::<Vec<_>>(),
            glyph.points().collect::<Vec<_>>()
        );
    }

    #[test]
    fn stale_stored_flags_are_recomputed() {
        let data = sfnt_test_data::glyf::two_point_glyph();
        let mut glyph = SimpleGlyph::read(FontData::new(&data)).unwrap();
        // the stored 0x11 said "x unchanged", which is no longer true
        glyph.contours[0] = Contour::from(vec![
            CurvePoint::on_curve(0, 0),
            CurvePoint::on_curve(-5, 100),
        ]);
        assert_eq!(flag_bits(&glyph), vec![0x31, 0x03]);
        let bytes = dump_table(&glyph).unwrap();
        let read = SimpleGlyph::read(FontData::new(&bytes)).unwrap();
        assert_eq!(read.contours, glyph.contours);
    }

    #[rstest]
    #[case::all_same(&[0x33, 0x33, 0x33, 0x33], 1)]
    #[case::single_repeat_is_split(&[0x33, 0x33, 0x01], 3)]
    #[case::no_repeats(&[0x01, 0x33, 0x01], 3)]
    fn compile_repeatable_flags(#[case] flags: &[u8], #[case] expected_len: usize) {
        let r_flags = RepeatableFlag::iter_from_flags(
            flags.iter().map(|bits| SimpleGlyphFlags::from_bits_retain(*bits)),
        )
        .collect::<Vec<_>>();
        assert_eq!(r_flags.len(), expected_len, "{r_flags:?}");
        let total: usize = r_flags.iter().map(|f| f.repeat as usize + 1).sum();
        assert_eq!(total, flags.len());
    }

    #[test]
    fn empty_contour_fails_validation() {
        let glyph = SimpleGlyph {
            contours: vec![Contour::default(), Contour::from(vec![CurvePoint::on_curve(1, 1)])],
            ..Default::default()
        };
        assert!(dump_table(&glyph).is_err());
    }
}
