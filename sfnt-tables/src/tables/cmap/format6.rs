//! [Format 6](https://learn.microsoft.com/en-us/typography/opentype/spec/cmap#format-6-trimmed-table-mapping):
//! trimmed table mapping

use std::collections::HashMap;

use sfnt_types::GlyphId;

use crate::{
    read::{FontRead, ReadError},
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

const HEADER_LEN: usize = 10;

/// A format 6 subtable: a dense glyph array for one contiguous code range.
///
/// Codes outside `first_code..first_code + entry_count` map to glyph 0.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Cmap6Fields", into = "Cmap6Fields")
)]
pub struct Cmap6 {
    pub language: u16,
    first_code: u16,
    glyph_ids: Vec<u16>,
    // glyph -> index of its first code
    reverse: HashMap<u16, u16>,
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct Cmap6Fields {
    language: u16,
    first_code: u16,
    glyph_ids: Vec<u16>,
}

impl Cmap6 {
    pub fn new(language: u16, first_code: u16, glyph_ids: Vec<u16>) -> Self {
        let mut reverse = HashMap::with_capacity(glyph_ids.len());
        for (idx, gid) in glyph_ids.iter().enumerate() {
            reverse.entry(*gid).or_insert(idx as u16);
        }
        Cmap6 {
            language,
            first_code,
            glyph_ids,
            reverse,
        }
    }

    pub fn first_code(&self) -> u16 {
        self.first_code
    }

    pub fn entry_count(&self) -> usize {
        self.glyph_ids.len()
    }

    pub fn glyph_ids(&self) -> &[u16] {
        &self.glyph_ids
    }

    pub fn map(&self, code: u16) -> GlyphId {
        code.checked_sub(self.first_code)
            .and_then(|idx| self.glyph_ids.get(idx as usize))
            .map(|gid| GlyphId::new(*gid))
            .unwrap_or(GlyphId::NOTDEF)
    }

    /// Return the lowest code that maps to `gid`.
    pub fn reverse_map(&self, gid: GlyphId) -> Option<u16> {
        if gid == GlyphId::NOTDEF {
            return None;
        }
        self.reverse
            .get(&gid.to_u16())
            .map(|idx| self.first_code.wrapping_add(*idx))
    }
}

impl Default for Cmap6 {
    fn default() -> Self {
        Cmap6::new(0, 0, Vec::new())
    }
}

impl FontRead for Cmap6 {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 6 {
            return Err(ReadError::InvalidFormat(format.into()));
        }
        cursor.advance::<u16>();
        let language = cursor.read()?;
        let first_code: u16 = cursor.read()?;
        let entry_count: u16 = cursor.read()?;
        if first_code as usize + entry_count as usize > 0x10000 {
            return Err(ReadError::MalformedData("cmap6 range exceeds 0xFFFF"));
        }
        let glyph_ids = cursor.read_array(entry_count as usize)?;
        Ok(Cmap6::new(language, first_code, glyph_ids))
    }
}

impl FontWrite for Cmap6 {
    fn write_into(&self, writer: &mut TableWriter) {
        6u16.write_into(writer);
        (self.compute_length() as u16).write_into(writer);
        self.language.write_into(writer);
        self.first_code.write_into(writer);
        (self.glyph_ids.len() as u16).write_into(writer);
        self.glyph_ids.write_into(writer);
    }

    fn compute_length(&self) -> usize {
        HEADER_LEN + 2 * self.glyph_ids.len()
    }
}

impl Validate for Cmap6 {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("Cmap6", |ctx| {
            ctx.in_field("glyph_ids", |ctx| {
                if self.first_code as usize + self.glyph_ids.len() > 0x10000 {
                    ctx.report("code range extends past 0xFFFF");
                }
                if self.compute_length() > u16::MAX as usize {
                    ctx.report("subtable is too large for its 16-bit length field");
                }
            })
        })
    }
}

#[cfg(feature = "serde")]
impl From<Cmap6Fields> for Cmap6 {
    fn from(src: Cmap6Fields) -> Self {
        Cmap6::new(src.language, src.first_code, src.glyph_ids)
    }
}

#[cfg(feature = "serde")]
impl From<Cmap6> for Cmap6Fields {
    fn from(src: Cmap6) -> Self {
        Cmap6Fields {
            language: src.language,
            first_code: src.first_code,
            glyph_ids: src.glyph_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;

    #[test]
    fn read_and_map() {
        let buf = sfnt_test_data::cmap::cmap6_subtable();
        let table = Cmap6::read(FontData::new(&buf)).unwrap();
        assert_eq!(table.first_code(), 0x30);
        assert_eq!(table.entry_count(), 4);
        assert_eq!(table.map(0x2F), GlyphId::NOTDEF);
        assert_eq!(table.map(0x30), GlyphId::new(5));
        assert_eq!(table.map(0x31), GlyphId::new(6));
        assert_eq!(table.map(0x34), GlyphId::NOTDEF);
        assert_eq!(dump_table(&table).unwrap(), buf.data());
    }

    #[test]
    fn reverse_map_prefers_first_code() {
        let buf = sfnt_test_data::cmap::cmap6_subtable();
        let table = Cmap6::read(FontData::new(&buf)).unwrap();
        assert_eq!(table.reverse_map(GlyphId::new(5)), Some(0x30));
        assert_eq!(table.reverse_map(GlyphId::new(6)), Some(0x31));
        assert_eq!(table.reverse_map(GlyphId::new(7)), None);
        assert_eq!(table.reverse_map(GlyphId::NOTDEF), None);
    }

    #[test]
    fn range_past_end_of_code_space() {
        let buf = sfnt_test_data::be_buffer! { 6u16, 14u16, 0u16, 0xFFFEu16, 3u16, 1u16, 2u16, 3u16 };
        assert!(matches!(
            Cmap6::read(FontData::new(&buf)),
            Err(ReadError::MalformedData(_))
        ));
        let table = Cmap6::new(0, 0xFFFE, vec![1, 2, 3]);
        assert!(dump_table(&table).is_err());
    }
}
