//! The [hhea (Horizontal Header)](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table

use sfnt_types::{Tag, Version16Dot16};

use crate::{
    read::{expect_exact_len, FontRead, ReadError, TopLevelTable},
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

/// The horizontal header table.
///
/// The four reserved words between `caret_offset` and `metric_data_format`
/// are always written as zero.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hhea {
    pub version: Version16Dot16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
    pub caret_slope_rise: i16,
    pub caret_slope_run: i16,
    pub caret_offset: i16,
    /// 0 for the current format.
    pub metric_data_format: i16,
    /// Number of (advance, lsb) pairs at the start of `hmtx`.
    pub number_of_h_metrics: u16,
}

impl Hhea {
    /// The serialized size of the table.
    pub const LEN: usize = 36;
}

impl Default for Hhea {
    fn default() -> Self {
        Hhea {
            version: Version16Dot16::VERSION_1_0,
            ascender: 0,
            descender: 0,
            line_gap: 0,
            advance_width_max: 0,
            min_left_side_bearing: 0,
            min_right_side_bearing: 0,
            x_max_extent: 0,
            caret_slope_rise: 0,
            caret_slope_run: 0,
            caret_offset: 0,
            metric_data_format: 0,
            number_of_h_metrics: 0,
        }
    }
}

impl TopLevelTable for Hhea {
    const TAG: Tag = Tag::new(b"hhea");
}

impl FontRead for Hhea {
    fn read(data: FontData) -> Result<Self, ReadError> {
        expect_exact_len(Self::TAG, &data, Self::LEN)?;
        let mut cursor = data.cursor();
        let version = cursor.read()?;
        let ascender = cursor.read()?;
        let descender = cursor.read()?;
        let line_gap = cursor.read()?;
        let advance_width_max = cursor.read()?;
        let min_left_side_bearing = cursor.read()?;
        let min_right_side_bearing = cursor.read()?;
        let x_max_extent = cursor.read()?;
        let caret_slope_rise = cursor.read()?;
        let caret_slope_run = cursor.read()?;
        let caret_offset = cursor.read()?;
        cursor.advance_by(4 * std::mem::size_of::<i16>());
        Ok(Hhea {
            version,
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            metric_data_format: cursor.read()?,
            number_of_h_metrics: cursor.read()?,
        })
    }
}

impl FontWrite for Hhea {
    fn write_into(&self, writer: &mut TableWriter) {
        self.version.write_into(writer);
        self.ascender.write_into(writer);
        self.descender.write_into(writer);
        self.line_gap.write_into(writer);
        self.advance_width_max.write_into(writer);
        [
            self.min_left_side_bearing,
            self.min_right_side_bearing,
            self.x_max_extent,
            self.caret_slope_rise,
            self.caret_slope_run,
            self.caret_offset,
            0,
            0,
            0,
            0,
            self.metric_data_format,
        ]
        .write_into(writer);
        self.number_of_h_metrics.write_into(writer);
    }

    fn compute_length(&self) -> usize {
        Self::LEN
    }
}

impl Validate for Hhea {
    fn validate_impl(&self, _ctx: &mut ValidationCtx) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;
    use sfnt_test_data::BeBuffer;

    #[test]
    fn smoke_test() {
        let buf = BeBuffer::new()
            .push(Version16Dot16::VERSION_1_0)
            .extend([800i16, -200, 90])
            .push(1200u16)
            .extend([-30i16, -12, 1180, 1, 0, 0])
            .extend([0i16; 4])
            .push(0i16)
            .push(3u16);
        let hhea = Hhea::read(FontData::new(&buf)).unwrap();
        assert_eq!(hhea.ascender, 800);
        assert_eq!(hhea.descender, -200);
        assert_eq!(hhea.advance_width_max, 1200);
        assert_eq!(hhea.caret_slope_rise, 1);
        assert_eq!(hhea.number_of_h_metrics, 3);
        assert_eq!(dump_table(&hhea).unwrap(), buf.data());
    }

    #[test]
    fn must_be_exactly_36_bytes() {
        let bytes = dump_table(&Hhea::default()).unwrap();
        assert_eq!(bytes.len(), 36);
        assert!(Hhea::read(FontData::new(&bytes[..35])).is_err());
        let mut long = bytes.clone();
        long.extend([0, 0]);
        assert!(matches!(
            Hhea::read(FontData::new(&long)),
            Err(ReadError::MalformedTable { actual: 38, .. })
        ));
    }
}
