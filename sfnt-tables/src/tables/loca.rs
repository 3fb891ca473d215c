//! The [loca (Index to Location)][loca] table
//!
//! [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use sfnt_types::{GlyphId, Tag};

use crate::{
    read::{FontReadWithArgs, ReadArgs, ReadError, TopLevelTable},
    tables::{head::Head, maxp::Maxp},
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

/// The [loca] table.
///
/// Holds `num_glyphs + 1` offsets into the `glyf` table; glyph `i` occupies
/// `offsets[i]..offsets[i + 1]`.
///
/// [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loca {
    // we just store u32, and then convert to u16 if needed in the `FontWrite` impl
    offsets: Vec<u32>,
    format: LocaFormat,
}

/// Whether or not the 'loca' table uses short or long offsets.
///
/// This flag is stored in the 'head' table's [indexToLocFormat][locformat] field.
///
/// [locformat]: super::head::Head::index_to_loc_format
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocaFormat {
    /// Offsets divided by two, stored as u16.
    #[default]
    Short = 0,
    Long = 1,
}

impl TopLevelTable for Loca {
    const TAG: Tag = Tag::new(b"loca");
}

impl LocaFormat {
    // the largest offset a short loca can hold
    const MAX_SHORT_LOCA_VALUE: u32 = 0x1FFFE;

    /// The smallest format that can represent these offsets exactly.
    pub fn for_offsets(offsets: &[u32]) -> LocaFormat {
        if offsets.last().copied().unwrap_or_default() <= Self::MAX_SHORT_LOCA_VALUE
            && offsets.iter().all(|offset| offset % 2 == 0)
        {
            LocaFormat::Short
        } else {
            LocaFormat::Long
        }
    }

    /// The value of `head.index_to_loc_format` for this format.
    pub fn to_index_to_loc_format(self) -> i16 {
        self as u8 as i16
    }

    fn entry_len(self) -> usize {
        match self {
            LocaFormat::Short => 2,
            LocaFormat::Long => 4,
        }
    }
}

impl Loca {
    /// Create a new loca table from offsets and an explicit format.
    ///
    /// In the short format odd offsets are rounded down when written.
    pub fn new(format: LocaFormat, offsets: Vec<u32>) -> Self {
        Loca { offsets, format }
    }

    /// Create a new loca table, choosing the format from the offsets.
    ///
    /// You generally do not construct this directly; it is built alongside
    /// the corresponding 'glyf' table by the
    /// [GlyfLocaBuilder](super::glyf::GlyfLocaBuilder).
    pub fn from_offsets(offsets: Vec<u32>) -> Self {
        let format = LocaFormat::for_offsets(&offsets);
        Loca { offsets, format }
    }

    /// Read the table, sized by `maxp` and formatted as described by `head`.
    pub fn read(data: FontData, head: &Head, maxp: &Maxp) -> Result<Self, ReadError> {
        Self::read_with_args(data, &(head.loca_format(), maxp.num_glyphs))
    }

    pub fn format(&self) -> LocaFormat {
        self.format
    }

    /// The number of glyphs described by this table.
    pub fn num_glyphs(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// The start of this glyph's data in the `glyf` table.
    pub fn offset(&self, gid: GlyphId) -> Option<u32> {
        self.offsets.get(usize::from(gid)).copied()
    }

    /// The length of this glyph's data.
    ///
    /// Zero means the glyph has no outline. Out of order offsets also report
    /// zero rather than wrapping.
    pub fn size(&self, gid: GlyphId) -> Option<u32> {
        let idx = usize::from(gid);
        let start = self.offsets.get(idx)?;
        let end = self.offsets.get(idx + 1)?;
        Some(end.saturating_sub(*start))
    }

    /// The byte range of this glyph in the `glyf` table, if it is non-empty.
    pub fn glyph_range(&self, gid: GlyphId) -> Option<std::ops::Range<usize>> {
        let start = self.offset(gid)? as usize;
        let len = self.size(gid)? as usize;
        (len > 0).then_some(start..start + len)
    }

    /// Replace the offset at `idx` (which may be `num_glyphs`, the end offset).
    ///
    /// Returns `false` if the index is out of range.
    pub fn set_offset(&mut self, idx: usize, offset: u32) -> bool {
        match self.offsets.get_mut(idx) {
            Some(slot) => {
                *slot = offset;
                true
            }
            None => false,
        }
    }
}

impl Default for Loca {
    /// A table for zero glyphs.
    fn default() -> Self {
        Loca::from_offsets(vec![0])
    }
}

impl ReadArgs for Loca {
    /// The format and the number of glyphs.
    type Args = (LocaFormat, u16);
}

impl FontReadWithArgs for Loca {
    fn read_with_args(data: FontData, args: &Self::Args) -> Result<Self, ReadError> {
        let (format, num_glyphs) = *args;
        let n_offsets = num_glyphs as usize + 1;
        let offsets = match format {
            LocaFormat::Short => data
                .read_array::<u16>(0, n_offsets)?
                .into_iter()
                .map(|off| off as u32 * 2)
                .collect(),
            LocaFormat::Long => data.read_array::<u32>(0, n_offsets)?,
        };
        Ok(Loca { offsets, format })
    }
}

impl FontWrite for Loca {
    fn write_into(&self, writer: &mut TableWriter) {
        match self.format {
            LocaFormat::Long => self.offsets.write_into(writer),
            LocaFormat::Short => self
                .offsets
                .iter()
                .for_each(|off| ((off >> 1) as u16).write_into(writer)),
        }
    }

    fn compute_length(&self) -> usize {
        self.offsets.len() * self.format.entry_len()
    }
}

impl Validate for Loca {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("loca", |ctx| {
            ctx.in_field("offsets", |ctx| {
                if self.offsets.windows(2).any(|pair| pair[0] > pair[1]) {
                    ctx.report("offsets must be non-decreasing");
                }
                if self.format == LocaFormat::Short
                    && self.offsets.last().copied().unwrap_or_default()
                        > LocaFormat::MAX_SHORT_LOCA_VALUE
                {
                    ctx.report("offsets too large for the short format");
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;
    use sfnt_test_data::BeBuffer;

    #[test]
    fn zero_length_glyph_is_absent() {
        let buf = BeBuffer::new().extend([0u16, 5, 5, 15]);
        let loca = Loca::read_with_args(FontData::new(&buf), &(LocaFormat::Short, 3)).unwrap();
        assert_eq!(loca.offsets(), &[0, 10, 10, 30]);
        assert_eq!(loca.num_glyphs(), 3);
        assert_eq!(loca.size(GlyphId::new(0)), Some(10));
        assert_eq!(loca.size(GlyphId::new(1)), Some(0));
        assert_eq!(loca.size(GlyphId::new(2)), Some(20));
        assert_eq!(loca.size(GlyphId::new(3)), None);
        assert_eq!(loca.glyph_range(GlyphId::new(1)), None);
        assert_eq!(loca.glyph_range(GlyphId::new(2)), Some(10..30));
    }

    #[test]
    fn read_uses_head_and_maxp() {
        let head = Head {
            index_to_loc_format: 1,
            ..Default::default()
        };
        let maxp = Maxp {
            num_glyphs: 2,
            ..Default::default()
        };
        let buf = BeBuffer::new().extend([0u32, 7, 0x30000]);
        let loca = Loca::read(FontData::new(&buf), &head, &maxp).unwrap();
        assert_eq!(loca.format(), LocaFormat::Long);
        assert_eq!(loca.offsets(), &[0, 7, 0x30000]);
        assert_eq!(dump_table(&loca).unwrap(), buf.data());
    }

    #[test]
    fn too_short_is_truncated() {
        let buf = BeBuffer::new().extend([0u16, 5]);
        assert_eq!(
            Loca::read_with_args(FontData::new(&buf), &(LocaFormat::Short, 2)),
            Err(ReadError::TruncatedData)
        );
    }

    #[test]
    fn short_format_halves_and_truncates() {
        let loca = Loca::new(LocaFormat::Short, vec![0, 10, 21]);
        let bytes = dump_table(&loca).unwrap();
        assert_eq!(bytes, [0, 0, 0, 5, 0, 10]);
        let reread = Loca::read_with_args(FontData::new(&bytes), &(LocaFormat::Short, 2)).unwrap();
        assert_eq!(reread.offsets(), &[0, 10, 20]);
    }

    #[test]
    fn choose_format() {
        assert_eq!(LocaFormat::for_offsets(&[0, 4, 0x1FFFE]), LocaFormat::Short);
        assert_eq!(LocaFormat::for_offsets(&[0, 4, 0x20000]), LocaFormat::Long);
        assert_eq!(LocaFormat::for_offsets(&[0, 3, 4]), LocaFormat::Long);
        assert_eq!(Loca::from_offsets(vec![0, 2]).format(), LocaFormat::Short);
    }

    #[test]
    fn invalid_tables_are_rejected() {
        assert!(dump_table(&Loca::new(LocaFormat::Long, vec![0, 10, 4])).is_err());
        assert!(dump_table(&Loca::new(LocaFormat::Short, vec![0, 0x20000])).is_err());
    }
}
