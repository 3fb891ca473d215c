//! The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use sfnt_types::{Fixed, LongDateTime, Tag, Version16Dot16};

use crate::{
    read::{FontRead, ReadError, TopLevelTable},
    tables::loca::LocaFormat,
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

/// The font header table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Head {
    pub version: Version16Dot16,
    /// Set by font manufacturer.
    pub font_revision: Fixed,
    /// `0xB1B0AFBA` minus the checksum of the whole font.
    ///
    /// This is recomputed when a [`Font`](crate::Font) is written.
    pub checksum_adjustment: u32,
    pub magic_number: u32,
    pub flags: u16,
    pub units_per_em: u16,
    pub created: LongDateTime,
    pub modified: LongDateTime,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    /// Smallest readable size in pixels.
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    /// 0 for short loca offsets, 1 for long.
    pub index_to_loc_format: i16,
    pub glyph_data_format: i16,
}

impl Head {
    /// The serialized size of the table.
    pub const LEN: usize = 54;

    pub const MAGIC_NUMBER: u32 = 0x5F0F3CF5;

    /// Byte position of `checksum_adjustment` within the table.
    pub const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

    /// The format of the `loca` table described by this header.
    pub fn loca_format(&self) -> LocaFormat {
        if self.index_to_loc_format == 0 {
            LocaFormat::Short
        } else {
            LocaFormat::Long
        }
    }
}

impl Default for Head {
    fn default() -> Self {
        Head {
            version: Version16Dot16::VERSION_1_0,
            font_revision: Fixed::ONE,
            checksum_adjustment: 0,
            magic_number: Self::MAGIC_NUMBER,
            flags: 0,
            units_per_em: 64,
            created: LongDateTime::default(),
            modified: LongDateTime::default(),
            x_min: 0,
            y_min: 0,
            x_max: i16::MAX,
            y_max: i16::MAX,
            mac_style: 0,
            lowest_rec_ppem: 0,
            font_direction_hint: 2,
            index_to_loc_format: 0,
            glyph_data_format: 0,
        }
    }
}

impl TopLevelTable for Head {
    const TAG: Tag = Tag::new(b"head");
}

impl FontRead for Head {
    fn read(data: FontData) -> Result<Self, ReadError> {
        // longer tables are tolerated; the tail is not part of any version
        if data.len() < Self::LEN {
            return Err(ReadError::MalformedTable {
                tag: Self::TAG,
                expected: Self::LEN,
                actual: data.len(),
            });
        }
        let mut cursor = data.cursor();
        Ok(Head {
            version: cursor.read()?,
            font_revision: cursor.read()?,
            checksum_adjustment: cursor.read()?,
            magic_number: cursor.read()?,
            flags: cursor.read()?,
            units_per_em: cursor.read()?,
            created: cursor.read()?,
            modified: cursor.read()?,
            x_min: cursor.read()?,
            y_min: cursor.read()?,
            x_max: cursor.read()?,
            y_max: cursor.read()?,
            mac_style: cursor.read()?,
            lowest_rec_ppem: cursor.read()?,
            font_direction_hint: cursor.read()?,
            index_to_loc_format: cursor.read()?,
            glyph_data_format: cursor.read()?,
        })
    }
}

impl FontWrite for Head {
    fn write_into(&self, writer: &mut TableWriter) {
        self.version.write_into(writer);
        self.font_revision.write_into(writer);
        self.checksum_adjustment.write_into(writer);
        self.magic_number.write_into(writer);
        self.flags.write_into(writer);
        self.units_per_em.write_into(writer);
        self.created.write_into(writer);
        self.modified.write_into(writer);
        self.x_min.write_into(writer);
        self.y_min.write_into(writer);
        self.x_max.write_into(writer);
        self.y_max.write_into(writer);
        self.mac_style.write_into(writer);
        self.lowest_rec_ppem.write_into(writer);
        self.font_direction_hint.write_into(writer);
        self.index_to_loc_format.write_into(writer);
        self.glyph_data_format.write_into(writer);
    }

    fn compute_length(&self) -> usize {
        Self::LEN
    }
}

impl Validate for Head {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("head", |ctx| {
            if self.magic_number != Self::MAGIC_NUMBER {
                ctx.in_field("magic_number", |ctx| {
                    ctx.report(format!("expected 0x5F0F3CF5, found 0x{:08X}", self.magic_number))
                });
            }
            if !matches!(self.index_to_loc_format, 0 | 1) {
                ctx.in_field("index_to_loc_format", |ctx| {
                    ctx.report("must be 0 (short) or 1 (long)")
                });
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;
    use sfnt_test_data::BeBuffer;

    fn head_bytes() -> BeBuffer {
        BeBuffer::new()
            .push(Version16Dot16::VERSION_1_0)
            .push(Fixed::from_f64(2.8))
            .extend([42u32, 0x5f0f3cf5])
            .extend([16u16, 2048]) // flags, upm
            .extend([LongDateTime::new(-500), LongDateTime::new(101)])
            .extend([-100i16, -50, 400, 711]) // xMin, yMin, xMax, yMax
            .extend([0u16, 12]) // mac_style / ppem
            .extend([2i16, 1, 0])
    }

    #[test]
    fn smoke_test() {
        let buf = head_bytes();
        let head = Head::read(FontData::new(&buf)).unwrap();
        assert_eq!(head.version, Version16Dot16::VERSION_1_0);
        assert_eq!(head.font_revision, Fixed::from_f64(2.8));
        assert_eq!(head.units_per_em, 2048);
        assert_eq!(head.created.as_secs(), -500);
        assert_eq!((head.x_min, head.y_min, head.x_max, head.y_max), (-100, -50, 400, 711));
        assert_eq!(head.loca_format(), LocaFormat::Long);
        assert_eq!(dump_table(&head).unwrap(), buf.data());
    }

    #[test]
    fn short_head_is_malformed() {
        let buf = head_bytes();
        let err = Head::read(FontData::new(&buf[..40])).unwrap_err();
        assert_eq!(
            err,
            ReadError::MalformedTable {
                tag: Head::TAG,
                expected: 54,
                actual: 40
            }
        );
    }

    #[test]
    fn default_roundtrips() {
        let head = Head::default();
        let bytes = dump_table(&head).unwrap();
        assert_eq!(bytes.len(), Head::LEN);
        assert_eq!(Head::read(FontData::new(&bytes)).unwrap(), head);
        assert_eq!(head.loca_format(), LocaFormat::Short);
    }

    #[test]
    fn bad_magic_fails_validation() {
        let head = Head {
            magic_number: 0,
            ..Default::default()
        };
        assert!(dump_table(&head).is_err());
    }
}
