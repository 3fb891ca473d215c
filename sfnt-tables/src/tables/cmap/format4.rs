//! [Format 4](https://learn.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values):
//! segment mapping to delta values

use sfnt_types::{GlyphId, Scalar};

use crate::{
    read::{FontRead, ReadError},
    util::SearchRange,
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

const HEADER_LEN: usize = 16;
const SENTINEL_CODE: u16 = 0xFFFF;

/// A contiguous range of character codes and how they map to glyphs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub start_code: u16,
    pub end_code: u16,
    pub mapping: SegmentMapping,
}

/// The two mutually exclusive encodings of a segment.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentMapping {
    /// Each code maps to `code + delta`, modulo 65536.
    Delta(i16),
    /// One glyph per code in the segment, stored in the glyph id array.
    Glyphs(Vec<u16>),
}

/// An explicit glyph array whose length does not match its code range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidSegment {
    pub start_code: u16,
    pub end_code: u16,
    pub n_glyphs: usize,
}

/// A format 4 subtable.
///
/// Segments are kept sorted by end code and never overlap: adding a segment
/// removes every existing segment whose range intersects it. A sentinel
/// segment ending at `0xFFFF` is always present, so every 16-bit code maps
/// to something.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cmap4 {
    pub language: u16,
    segments: Vec<Segment>,
}

impl Segment {
    fn sentinel() -> Self {
        Segment {
            start_code: SENTINEL_CODE,
            end_code: SENTINEL_CODE,
            mapping: SegmentMapping::Delta(1),
        }
    }

    /// The number of codes covered by this segment.
    pub fn len(&self) -> usize {
        (self.end_code as usize + 1).saturating_sub(self.start_code as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, code: u16) -> bool {
        (self.start_code..=self.end_code).contains(&code)
    }

    fn overlaps(&self, start_code: u16, end_code: u16) -> bool {
        self.start_code <= end_code && start_code <= self.end_code
    }

    fn map(&self, code: u16) -> u16 {
        match &self.mapping {
            SegmentMapping::Delta(delta) => code.wrapping_add(*delta as u16),
            SegmentMapping::Glyphs(glyphs) => glyphs
                .get(code.wrapping_sub(self.start_code) as usize)
                .copied()
                .unwrap_or(0),
        }
    }

    fn reverse_map(&self, gid: u16) -> Option<u16> {
        match &self.mapping {
            SegmentMapping::Delta(delta) => {
                let code = gid.wrapping_sub(*delta as u16);
                self.contains(code).then_some(code)
            }
            SegmentMapping::Glyphs(glyphs) => glyphs
                .iter()
                .position(|g| *g == gid)
                .map(|idx| self.start_code + idx as u16),
        }
    }

    fn n_glyphs(&self) -> usize {
        match &self.mapping {
            SegmentMapping::Delta(_) => 0,
            SegmentMapping::Glyphs(glyphs) => glyphs.len(),
        }
    }
}

impl Cmap4 {
    /// Create an empty subtable, containing only the sentinel segment.
    pub fn new(language: u16) -> Self {
        Cmap4 {
            language,
            segments: vec![Segment::sentinel()],
        }
    }

    /// The segments, in ascending code order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn seg_count(&self) -> usize {
        self.segments.len()
    }

    /// The binary search fields for the current segment count.
    pub fn search_range(&self) -> SearchRange {
        SearchRange::compute(self.segments.len(), u16::RAW_BYTE_LEN)
    }

    /// Map `start_code..=end_code` to `code + delta`.
    pub fn add_delta_segment(&mut self, start_code: u16, end_code: u16, delta: i16) {
        self.insert(Segment {
            start_code,
            end_code,
            mapping: SegmentMapping::Delta(delta),
        });
    }

    /// Map `start_code..=end_code` to the glyphs in `glyphs`, one per code.
    pub fn add_mapped_segment(
        &mut self,
        start_code: u16,
        end_code: u16,
        glyphs: Vec<u16>,
    ) -> Result<(), InvalidSegment> {
        let segment = Segment {
            start_code,
            end_code,
            mapping: SegmentMapping::Glyphs(glyphs),
        };
        if segment.is_empty() || segment.n_glyphs() != segment.len() {
            return Err(InvalidSegment {
                start_code,
                end_code,
                n_glyphs: segment.n_glyphs(),
            });
        }
        self.insert(segment);
        Ok(())
    }

    /// Remove every segment intersecting `start_code..=end_code`.
    pub fn remove_segment(&mut self, start_code: u16, end_code: u16) {
        self.segments
            .retain(|seg| !seg.overlaps(start_code, end_code));
        self.ensure_sentinel();
    }

    /// Map a character code to a glyph; unmapped codes map to glyph 0.
    pub fn map(&self, code: u16) -> GlyphId {
        let idx = self.segments.partition_point(|seg| seg.end_code < code);
        match self.segments.get(idx) {
            Some(seg) if seg.start_code <= code => GlyphId::new(seg.map(code)),
            _ => GlyphId::NOTDEF,
        }
    }

    /// Return some code that maps to `gid`.
    ///
    /// When more than one code maps to the glyph, the lowest segment wins.
    /// Glyph 0 is never reverse mapped.
    pub fn reverse_map(&self, gid: GlyphId) -> Option<u16> {
        if gid == GlyphId::NOTDEF {
            return None;
        }
        self.segments
            .iter()
            .find_map(|seg| seg.reverse_map(gid.to_u16()))
    }

    // removes overlapping segments, then inserts ordered by end code
    fn insert(&mut self, segment: Segment) {
        self.segments
            .retain(|seg| !seg.overlaps(segment.start_code, segment.end_code));
        let idx = self
            .segments
            .partition_point(|seg| seg.end_code < segment.end_code);
        self.segments.insert(idx, segment);
        self.ensure_sentinel();
    }

    fn ensure_sentinel(&mut self) {
        if self.segments.last().map(|seg| seg.end_code) != Some(SENTINEL_CODE) {
            self.segments.push(Segment::sentinel());
        }
    }

    fn n_glyphs(&self) -> usize {
        self.segments.iter().map(Segment::n_glyphs).sum()
    }
}

impl Default for Cmap4 {
    fn default() -> Self {
        Cmap4::new(0)
    }
}

impl FontRead for Cmap4 {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 4 {
            return Err(ReadError::InvalidFormat(format.into()));
        }
        cursor.advance::<u16>(); // length
        let language = cursor.read()?;
        let seg_count = cursor.read::<u16>()? as usize / 2;
        // search fields are recomputed on write
        cursor.advance_by(3 * u16::RAW_BYTE_LEN);
        let end_codes: Vec<u16> = cursor.read_array(seg_count)?;
        cursor.advance::<u16>(); // reservedPad
        let start_codes: Vec<u16> = cursor.read_array(seg_count)?;
        let id_deltas: Vec<i16> = cursor.read_array(seg_count)?;
        let range_offsets_start = cursor.position();
        // read as signed: some fonts mark delta segments with a negative offset
        let id_range_offsets: Vec<i16> = cursor.read_array(seg_count)?;

        let mut table = Cmap4::new(language);
        for (i, (&start_code, &end_code)) in start_codes.iter().zip(&end_codes).enumerate() {
            if start_code > end_code {
                log::warn!("cmap4 segment {i} is inverted ({start_code} > {end_code}), skipping");
                continue;
            }
            let delta = id_deltas[i];
            let range_offset = id_range_offsets[i];
            if range_offset <= 0 {
                if range_offset < 0 {
                    log::debug!("cmap4 segment {i} has idRangeOffset {range_offset}, using delta");
                }
                table.add_delta_segment(start_code, end_code, delta);
                continue;
            }
            let range_offset = range_offset as usize;
            // the offset is relative to the idRangeOffset entry itself
            let glyph_pos = range_offsets_start + i * u16::RAW_BYTE_LEN + range_offset;
            let n_codes = (end_code - start_code) as usize + 1;
            let glyphs = data
                .read_array::<u16>(glyph_pos, n_codes)?
                .into_iter()
                .map(|gid| match gid {
                    0 => 0,
                    gid => gid.wrapping_add(delta as u16),
                })
                .collect();
            table
                .add_mapped_segment(start_code, end_code, glyphs)
                .map_err(|_| ReadError::MalformedData("bad cmap4 segment"))?;
        }
        Ok(table)
    }
}

impl FontWrite for Cmap4 {
    fn write_into(&self, writer: &mut TableWriter) {
        let seg_count = self.segments.len();
        let search = self.search_range();
        4u16.write_into(writer);
        (self.compute_length() as u16).write_into(writer);
        self.language.write_into(writer);
        ((seg_count * 2) as u16).write_into(writer);
        search.search_range.write_into(writer);
        search.entry_selector.write_into(writer);
        search.range_shift.write_into(writer);
        for seg in &self.segments {
            seg.end_code.write_into(writer);
        }
        0u16.write_into(writer);
        for seg in &self.segments {
            seg.start_code.write_into(writer);
        }
        for seg in &self.segments {
            match seg.mapping {
                SegmentMapping::Delta(delta) => delta.write_into(writer),
                SegmentMapping::Glyphs(_) => 0i16.write_into(writer),
            }
        }

        let range_offsets_start = HEADER_LEN + 6 * seg_count;
        let mut glyph_pos = HEADER_LEN + 8 * seg_count;
        for (i, seg) in self.segments.iter().enumerate() {
            match &seg.mapping {
                SegmentMapping::Delta(_) => 0u16.write_into(writer),
                SegmentMapping::Glyphs(glyphs) => {
                    let entry_pos = range_offsets_start + i * u16::RAW_BYTE_LEN;
                    ((glyph_pos - entry_pos) as u16).write_into(writer);
                    glyph_pos += glyphs.len() * u16::RAW_BYTE_LEN;
                }
            }
        }
        for seg in &self.segments {
            if let SegmentMapping::Glyphs(glyphs) = &seg.mapping {
                glyphs.write_into(writer);
            }
        }
    }

    fn compute_length(&self) -> usize {
        HEADER_LEN + 8 * self.segments.len() + u16::RAW_BYTE_LEN * self.n_glyphs()
    }
}

impl Validate for Cmap4 {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("Cmap4", |ctx| {
            if self.compute_length() > u16::MAX as usize {
                ctx.report("subtable is too large for its 16-bit length field");
            }
            ctx.in_field("segments", |ctx| {
                if self.segments.last().map(|seg| seg.end_code) != Some(SENTINEL_CODE) {
                    ctx.report("last segment must end at 0xFFFF");
                }
                for (i, seg) in self.segments.iter().enumerate() {
                    ctx.in_item(i, |ctx| {
                        if seg.is_empty() {
                            ctx.report("start code is greater than end code");
                        }
                        if matches!(seg.mapping, SegmentMapping::Glyphs(_))
                            && seg.n_glyphs() != seg.len()
                        {
                            ctx.report(format!(
                                "{} glyphs for {} codes",
                                seg.n_glyphs(),
                                seg.len()
                            ));
                        }
                    })
                }
                if self
                    .segments
                    .windows(2)
                    .any(|pair| pair[0].end_code >= pair[1].start_code)
                {
                    ctx.report("segments must be sorted and must not overlap");
                }
            })
        })
    }
}

impl std::fmt::Display for InvalidSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Segment [{}, {}] needs one glyph per code, found {}",
            self.start_code, self.end_code, self.n_glyphs
        )
    }
}

impl std::error::Error for InvalidSegment {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;
    use pretty_assertions::assert_eq;

    fn fixture() -> Cmap4 {
        let buf = sfnt_test_data::cmap::cmap4_subtable();
        Cmap4::read(FontData::new(&buf)).unwrap()
    }

    #[test]
    fn read_segments() {
        let table = fixture();
        assert_eq!(
            table.segments(),
            &[
                Segment {
                    start_code: 0x20,
                    end_code: 0x22,
                    mapping: SegmentMapping::Delta(-29),
                },
                Segment {
                    start_code: 0x41,
                    end_code: 0x43,
                    mapping: SegmentMapping::Glyphs(vec![10, 0, 12]),
                },
                Segment::sentinel(),
            ]
        );
        assert_eq!(table.map(0x20), GlyphId::new(3));
        assert_eq!(table.map(0x22), GlyphId::new(5));
        assert_eq!(table.map(0x41), GlyphId::new(10));
        assert_eq!(table.map(0x42), GlyphId::NOTDEF);
        assert_eq!(table.map(0x43), GlyphId::new(12));
        assert_eq!(table.map(0x30), GlyphId::NOTDEF);
        assert_eq!(table.map(0xFFFF), GlyphId::NOTDEF);
    }

    #[test]
    fn roundtrip_is_byte_exact() {
        let buf = sfnt_test_data::cmap::cmap4_subtable();
        let table = Cmap4::read(FontData::new(&buf)).unwrap();
        assert_eq!(dump_table(&table).unwrap(), buf.data());
    }

    #[test]
    fn negative_range_offset_uses_delta() {
        let _ = env_logger::builder().is_test(true).try_init();
        let buf = sfnt_test_data::BeBuffer::new()
            .extend([4u16, 32, 0, 4, 4, 1, 0])
            .extend([0x22u16, 0xFFFF]) // end codes
            .push(0u16)
            .extend([0x20u16, 0xFFFF]) // start codes
            .extend([-29i16, 1]) // deltas
            .extend([0xFFFFu16, 0]); // range offsets
        let table = Cmap4::read(FontData::new(&buf)).unwrap();
        assert_eq!(table.segments()[0].mapping, SegmentMapping::Delta(-29));
        assert_eq!(table.map(0x21), GlyphId::new(4));
    }

    #[test]
    fn reverse_map() {
        let table = fixture();
        assert_eq!(table.reverse_map(GlyphId::new(4)), Some(0x21));
        assert_eq!(table.reverse_map(GlyphId::new(12)), Some(0x43));
        assert_eq!(table.reverse_map(GlyphId::new(11)), None);
        assert_eq!(table.reverse_map(GlyphId::NOTDEF), None);
    }

    #[test]
    fn every_code_maps() {
        let mut table = fixture();
        table.add_delta_segment(0x1000, 0x1FFF, 100);
        for code in 0..=u16::MAX {
            let expected = match code {
                0x20..=0x22 => code - 29,
                0x41 => 10,
                0x43 => 12,
                0x1000..=0x1FFF => code + 100,
                _ => 0,
            };
            assert_eq!(table.map(code), GlyphId::new(expected), "code {code:#06X}");
        }
    }

    // adding a segment replaces every segment it intersects, even when
    // the two only partially overlap
    #[test]
    fn overlapping_segment_replaces_existing() {
        let mut table = Cmap4::default();
        table.add_delta_segment(10, 20, 1);
        table.add_delta_segment(15, 25, 2);
        assert_eq!(table.seg_count(), 2);
        assert_eq!(
            table.segments()[0],
            Segment {
                start_code: 15,
                end_code: 25,
                mapping: SegmentMapping::Delta(2),
            }
        );
        assert_eq!(table.map(12), GlyphId::NOTDEF);
        assert_eq!(table.map(15), GlyphId::new(17));
    }

    #[test]
    fn sentinel_is_restored() {
        let mut table = Cmap4::new(0);
        table.remove_segment(0xFFFF, 0xFFFF);
        assert_eq!(table.segments(), &[Segment::sentinel()]);

        table.add_delta_segment(0xFFF0, 0xFFFF, 5);
        assert_eq!(table.seg_count(), 1);
        table.add_delta_segment(0xFFF0, 0xFFF2, 5);
        assert_eq!(table.segments().last(), Some(&Segment::sentinel()));
    }

    #[test]
    fn segments_are_sorted() {
        let mut table = Cmap4::default();
        table.add_delta_segment(300, 310, 1);
        table.add_mapped_segment(5, 6, vec![1, 2]).unwrap();
        table.add_delta_segment(100, 100, -50);
        let starts: Vec<_> = table.segments().iter().map(|s| s.start_code).collect();
        assert_eq!(starts, [5, 100, 300, 0xFFFF]);
    }

    #[test]
    fn mapped_segment_needs_one_glyph_per_code() {
        let mut table = Cmap4::default();
        assert_eq!(
            table.add_mapped_segment(5, 7, vec![1, 2]),
            Err(InvalidSegment {
                start_code: 5,
                end_code: 7,
                n_glyphs: 2
            })
        );
        assert_eq!(table.seg_count(), 1);
    }

    #[test]
    fn search_fields_follow_segment_count() {
        let mut table = Cmap4::default();
        for i in 0..38u16 {
            table.add_delta_segment(i * 10, i * 10 + 5, 1);
        }
        assert_eq!(table.seg_count(), 39);
        let bytes = dump_table(&table).unwrap();
        let fields: Vec<u16> = FontData::new(&bytes).read_array(6, 4).unwrap();
        assert_eq!(fields, [78, 64, 5, 14]);
        assert_eq!(bytes.len(), table.compute_length());
    }

    #[test]
    fn write_then_read() {
        let mut table = Cmap4::new(3);
        table.add_mapped_segment(0x61, 0x63, vec![7, 8, 9]).unwrap();
        table.add_delta_segment(0x30, 0x39, 20);
        table.add_mapped_segment(0x100, 0x100, vec![1]).unwrap();
        let bytes = dump_table(&table).unwrap();
        assert_eq!(bytes.len(), 16 + 8 * 4 + 2 * 4);
        let read_back = Cmap4::read(FontData::new(&bytes)).unwrap();
        assert_eq!(read_back, table);
    }

    #[test]
    fn truncated_glyph_array() {
        let buf = sfnt_test_data::cmap::cmap4_subtable();
        assert_eq!(
            Cmap4::read(FontData::new(&buf[..44])),
            Err(ReadError::TruncatedData)
        );
    }
}
