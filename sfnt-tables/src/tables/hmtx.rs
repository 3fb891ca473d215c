//! The [hmtx (Horizontal Metrics)](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table

use sfnt_types::{GlyphId, Tag};

use crate::{
    read::{FontReadWithArgs, ReadArgs, ReadError, TopLevelTable},
    tables::{hhea::Hhea, maxp::Maxp},
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

/// The horizontal metrics table.
///
/// The first `h_metrics.len()` glyphs have a full metric record; the
/// remaining glyphs only store a side bearing and share the last advance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hmtx {
    pub h_metrics: Vec<LongMetric>,
    /// Side bearings for glyphs `h_metrics.len()..num_glyphs`.
    pub left_side_bearings: Vec<i16>,
}

/// An advance width and left side bearing for one glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongMetric {
    pub advance: u16,
    pub side_bearing: i16,
}

impl LongMetric {
    pub fn new(advance: u16, side_bearing: i16) -> Self {
        LongMetric {
            advance,
            side_bearing,
        }
    }
}

impl TopLevelTable for Hmtx {
    const TAG: Tag = Tag::new(b"hmtx");
}

impl Hmtx {
    pub fn new(h_metrics: Vec<LongMetric>, left_side_bearings: Vec<i16>) -> Self {
        Hmtx {
            h_metrics,
            left_side_bearings,
        }
    }

    /// Read the table, sized by `hhea` and `maxp`.
    pub fn read(data: FontData, hhea: &Hhea, maxp: &Maxp) -> Result<Self, ReadError> {
        Self::read_with_args(data, &(hhea.number_of_h_metrics, maxp.num_glyphs))
    }

    /// The value for `hhea.number_of_h_metrics`.
    pub fn number_of_h_metrics(&self) -> u16 {
        self.h_metrics.len().try_into().unwrap_or(u16::MAX)
    }

    pub fn num_glyphs(&self) -> usize {
        self.h_metrics.len() + self.left_side_bearings.len()
    }

    /// The advance width of this glyph.
    ///
    /// Glyphs past the end of `h_metrics` use the last advance; a table
    /// with no metrics at all reports zero.
    pub fn advance(&self, gid: GlyphId) -> u16 {
        let idx = usize::from(gid);
        self.h_metrics
            .get(idx)
            .or_else(|| self.h_metrics.last())
            .map(|metric| metric.advance)
            .unwrap_or_default()
    }

    /// The left side bearing of this glyph, if it is in the table.
    pub fn side_bearing(&self, gid: GlyphId) -> Option<i16> {
        let idx = usize::from(gid);
        match self.h_metrics.get(idx) {
            Some(metric) => Some(metric.side_bearing),
            None => self
                .left_side_bearings
                .get(idx - self.h_metrics.len())
                .copied(),
        }
    }

    /// Set the metrics of an existing glyph.
    ///
    /// Giving a glyph in the side-bearing-only tail its own advance turns
    /// the whole tail into full records.
    /// Returns `false` if the glyph is not in the table.
    pub fn set_metric(&mut self, gid: GlyphId, advance: u16, side_bearing: i16) -> bool {
        let idx = usize::from(gid);
        if idx >= self.num_glyphs() {
            return false;
        }
        if idx < self.h_metrics.len() {
            self.h_metrics[idx] = LongMetric::new(advance, side_bearing);
            return true;
        }
        let tail_idx = idx - self.h_metrics.len();
        if advance == self.advance(gid) && !self.h_metrics.is_empty() {
            self.left_side_bearings[tail_idx] = side_bearing;
            return true;
        }
        // glyphs after this one must keep the old shared advance, so they
        // are promoted as well
        let shared = self.advance(gid);
        self.h_metrics.extend(
            self.left_side_bearings
                .drain(..)
                .map(|lsb| LongMetric::new(shared, lsb)),
        );
        self.h_metrics[idx] = LongMetric::new(advance, side_bearing);
        true
    }
}

impl ReadArgs for Hmtx {
    /// `number_of_h_metrics` and `num_glyphs`.
    type Args = (u16, u16);
}

impl FontReadWithArgs for Hmtx {
    /// Subsetting tools sometimes leave `maxp.num_glyphs` larger than the
    /// data; missing entries are read as zero.
    fn read_with_args(data: FontData, args: &Self::Args) -> Result<Self, ReadError> {
        let (number_of_h_metrics, num_glyphs) = *args;
        let n_long = number_of_h_metrics as usize;
        let n_short = (num_glyphs as usize).saturating_sub(n_long);
        let mut cursor = data.cursor();
        // once an entry is cut short, it and everything after it is zero
        let mut truncated = false;
        let mut missing = 0;
        let mut h_metrics = Vec::with_capacity(n_long);
        for _ in 0..n_long {
            if !truncated && cursor.has_room_for::<u32>() {
                h_metrics.push(LongMetric::new(cursor.read()?, cursor.read()?));
            } else {
                truncated = true;
                missing += 1;
                h_metrics.push(LongMetric::default());
            }
        }
        let mut left_side_bearings = Vec::with_capacity(n_short);
        for _ in 0..n_short {
            if !truncated && cursor.has_room_for::<i16>() {
                left_side_bearings.push(cursor.read()?);
            } else {
                truncated = true;
                missing += 1;
                left_side_bearings.push(0);
            }
        }
        if missing > 0 {
            log::warn!("hmtx is missing {missing} of {} entries, using zero", n_long + n_short);
        }
        Ok(Hmtx {
            h_metrics,
            left_side_bearings,
        })
    }
}

impl FontWrite for LongMetric {
    fn write_into(&self, writer: &mut TableWriter) {
        self.advance.write_into(writer);
        self.side_bearing.write_into(writer);
    }

    fn compute_length(&self) -> usize {
        4
    }
}

impl FontWrite for Hmtx {
    fn write_into(&self, writer: &mut TableWriter) {
        self.h_metrics.write_into(writer);
        self.left_side_bearings.write_into(writer);
    }

    fn compute_length(&self) -> usize {
        self.h_metrics.len() * 4 + self.left_side_bearings.len() * 2
    }
}

impl Validate for Hmtx {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("hmtx", |ctx| {
            if self.h_metrics.len() > u16::MAX as usize {
                ctx.in_field("h_metrics", |ctx| ctx.report("too many metrics"));
            }
            if self.num_glyphs() > u16::MAX as usize {
                ctx.in_field("left_side_bearings", |ctx| ctx.report("too many glyphs"));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;
    use pretty_assertions::assert_eq;
    use sfnt_test_data::BeBuffer;

    fn two_long_five_glyphs() -> BeBuffer {
        BeBuffer::new()
            .extend([500u16, 10, 600, 20])
            .extend([-5i16, 30, 40])
    }

    #[test]
    fn advance_repeats_last_entry() {
        let buf = two_long_five_glyphs();
        let hmtx = Hmtx::read_with_args(FontData::new(&buf), &(2, 5)).unwrap();
        assert_eq!(hmtx.advance(GlyphId::new(0)), 500);
        assert_eq!(hmtx.advance(GlyphId::new(1)), 600);
        assert_eq!(hmtx.advance(GlyphId::new(4)), 600);
        assert_eq!(hmtx.side_bearing(GlyphId::new(2)), Some(-5));
        assert_eq!(hmtx.side_bearing(GlyphId::new(4)), Some(40));
        assert_eq!(hmtx.side_bearing(GlyphId::new(5)), None);
        assert_eq!(dump_table(&hmtx).unwrap(), buf.data());
    }

    #[test]
    fn read_with_sibling_tables() {
        let hhea = Hhea {
            number_of_h_metrics: 2,
            ..Default::default()
        };
        let maxp = Maxp {
            num_glyphs: 5,
            ..Default::default()
        };
        let buf = two_long_five_glyphs();
        let hmtx = Hmtx::read(FontData::new(&buf), &hhea, &maxp).unwrap();
        assert_eq!(hmtx.number_of_h_metrics(), 2);
        assert_eq!(hmtx.num_glyphs(), 5);
    }

    #[test]
    fn short_data_is_zero_filled() {
        let _ = env_logger::builder().is_test(true).try_init();
        let buf = BeBuffer::new().extend([500u16, 10]).push(7i16);
        let hmtx = Hmtx::read_with_args(FontData::new(&buf), &(2, 4)).unwrap();
        assert_eq!(
            hmtx.h_metrics,
            vec![LongMetric::new(500, 10), LongMetric::default()]
        );
        assert_eq!(hmtx.left_side_bearings, vec![0, 0]);
    }

    #[test]
    fn partial_long_metric_is_not_read_as_side_bearing() {
        // one full metric, then a lone advance for the second
        let buf = BeBuffer::new().extend([500u16, 10, 600]);
        let hmtx = Hmtx::read_with_args(FontData::new(&buf), &(2, 3)).unwrap();
        assert_eq!(hmtx.h_metrics[1], LongMetric::default());
        assert_eq!(hmtx.left_side_bearings, vec![0]);
    }

    #[test]
    fn short_tail_is_zero_filled() {
        let buf = BeBuffer::new().extend([500u16, 10]).push(7i16);
        let hmtx = Hmtx::read_with_args(FontData::new(&buf), &(1, 4)).unwrap();
        assert_eq!(hmtx.left_side_bearings, vec![7, 0, 0]);
    }

    #[test]
    fn empty_table_has_zero_advance() {
        let hmtx = Hmtx::default();
        assert_eq!(hmtx.advance(GlyphId::new(3)), 0);
        assert_eq!(hmtx.compute_length(), 0);
    }

    #[test]
    fn set_metric_promotes_tail() {
        let buf = two_long_five_glyphs();
        let mut hmtx = Hmtx::read_with_args(FontData::new(&buf), &(2, 5)).unwrap();
        assert!(hmtx.set_metric(GlyphId::new(2), 600, 1));
        assert_eq!(hmtx.number_of_h_metrics(), 2);
        assert_eq!(hmtx.left_side_bearings, vec![1, 30, 40]);
        assert!(hmtx.set_metric(GlyphId::new(3), 700, 2));
        assert_eq!(hmtx.number_of_h_metrics(), 5);
        assert_eq!(hmtx.h_metrics[2], LongMetric::new(600, 1));
        assert_eq!(hmtx.h_metrics[3], LongMetric::new(700, 2));
        assert!(hmtx.left_side_bearings.is_empty());
        assert_eq!(hmtx.advance(GlyphId::new(4)), 600);
        assert_eq!(hmtx.side_bearing(GlyphId::new(4)), Some(40));
        assert!(!hmtx.set_metric(GlyphId::new(5), 0, 0));
    }
}
