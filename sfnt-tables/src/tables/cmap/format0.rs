//! [Format 0](https://learn.microsoft.com/en-us/typography/opentype/spec/cmap#format-0-byte-encoding-table):
//! byte encoding table

use sfnt_types::GlyphId;

use crate::{
    read::{FontRead, ReadError},
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

const N_CODES: usize = 256;

/// A format 0 subtable: one glyph byte for each of the 256 single-byte codes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cmap0 {
    pub language: u16,
    glyph_ids: Vec<u8>,
}

impl Cmap0 {
    /// The serialized size of the subtable.
    pub const LEN: usize = 6 + N_CODES;

    /// Create a subtable mapping every code to glyph 0.
    pub fn new(language: u16) -> Self {
        Cmap0 {
            language,
            glyph_ids: vec![0; N_CODES],
        }
    }

    /// The glyph for each code, indexed by code.
    pub fn glyph_ids(&self) -> &[u8] {
        &self.glyph_ids
    }

    pub fn set(&mut self, code: u8, gid: u8) {
        if let Some(slot) = self.glyph_ids.get_mut(code as usize) {
            *slot = gid;
        }
    }

    /// Map a code to a glyph. Codes above 255 map to glyph 0.
    pub fn map(&self, code: u16) -> GlyphId {
        self.glyph_ids
            .get(code as usize)
            .map(|gid| GlyphId::new(*gid as u16))
            .unwrap_or(GlyphId::NOTDEF)
    }

    /// Return the lowest code that maps to `gid`.
    pub fn reverse_map(&self, gid: GlyphId) -> Option<u16> {
        let gid = u8::try_from(gid.to_u16()).ok().filter(|gid| *gid != 0)?;
        self.glyph_ids
            .iter()
            .position(|g| *g == gid)
            .map(|code| code as u16)
    }
}

impl Default for Cmap0 {
    fn default() -> Self {
        Cmap0::new(0)
    }
}

impl FontRead for Cmap0 {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 0 {
            return Err(ReadError::InvalidFormat(format.into()));
        }
        cursor.advance::<u16>();
        let language = cursor.read()?;
        let glyph_ids = cursor.read_bytes(N_CODES)?.to_vec();
        Ok(Cmap0 {
            language,
            glyph_ids,
        })
    }
}

impl FontWrite for Cmap0 {
    fn write_into(&self, writer: &mut TableWriter) {
        0u16.write_into(writer);
        (Self::LEN as u16).write_into(writer);
        self.language.write_into(writer);
        writer.write_slice(&self.glyph_ids);
    }

    fn compute_length(&self) -> usize {
        6 + self.glyph_ids.len()
    }
}

impl Validate for Cmap0 {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("Cmap0", |ctx| {
            ctx.in_field("glyph_ids", |ctx| {
                if self.glyph_ids.len() != N_CODES {
                    ctx.report(format!(
                        "expected {N_CODES} entries, found {}",
                        self.glyph_ids.len()
                    ));
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
    fn map_single_bytes() {
        let mut table = Cmap0::new(7);
        table.set(b'A', 36);
        table.set(b'B', 37);
        table.set(b'a', 36);
        assert_eq!(table.map(b'A' as u16), GlyphId::new(36));
        assert_eq!(table.map(b'C' as u16), GlyphId::NOTDEF);
        assert_eq!(table.map(0x141), GlyphId::NOTDEF);
        assert_eq!(table.reverse_map(GlyphId::new(36)), Some(b'A' as u16));
        assert_eq!(table.reverse_map(GlyphId::new(300)), None);
        assert_eq!(table.reverse_map(GlyphId::NOTDEF), None);
    }

    #[test]
    fn roundtrip() {
        let mut table = Cmap0::new(7);
        table.set(0xff, 9);
        let bytes = dump_table(&table).unwrap();
        assert_eq!(bytes.len(), 262);
        assert_eq!(&bytes[..6], &[0, 0, 1, 6, 0, 7]);
        assert_eq!(Cmap0::read(FontData::new(&bytes)).unwrap(), table);
    }

    #[test]
    fn truncated() {
        let buf = BeBuffer::new()
            .extend([0u16, 262, 0])
            .extend_bytes(&[0; 200]);
        assert_eq!(
            Cmap0::read(FontData::new(&buf)),
            Err(ReadError::TruncatedData)
        );
    }
}
