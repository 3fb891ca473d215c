//! The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table

use sfnt_types::{Tag, Version16Dot16};

use crate::{
    read::{expect_exact_len, FontRead, ReadError, TopLevelTable},
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

/// The maximum profile table: font-wide limits, and the glyph count every
/// per-glyph table is sized by.
///
/// Only the 32-byte version 1.0 layout used by TrueType outlines is
/// supported.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Maxp {
    pub version: Version16Dot16,
    pub num_glyphs: u16,
    pub max_points: u16,
    pub max_contours: u16,
    pub max_component_points: u16,
    pub max_component_contours: u16,
    /// 1 if instructions do not use the twilight zone, 2 otherwise.
    pub max_zones: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

impl Maxp {
    /// The serialized size of the table.
    pub const LEN: usize = 32;
}

impl Default for Maxp {
    fn default() -> Self {
        Maxp {
            version: Version16Dot16::VERSION_1_0,
            num_glyphs: 0,
            max_points: 0,
            max_contours: 0,
            max_component_points: 0,
            max_component_contours: 0,
            max_zones: 2,
            max_twilight_points: 0,
            max_storage: 0,
            max_function_defs: 0,
            max_instruction_defs: 0,
            max_stack_elements: 0,
            max_size_of_instructions: 0,
            max_component_elements: 0,
            max_component_depth: 0,
        }
    }
}

impl TopLevelTable for Maxp {
    const TAG: Tag = Tag::new(b"maxp");
}

impl FontRead for Maxp {
    fn read(data: FontData) -> Result<Self, ReadError> {
        expect_exact_len(Self::TAG, &data, Self::LEN)?;
        let mut cursor = data.cursor();
        Ok(Maxp {
            version: cursor.read()?,
            num_glyphs: cursor.read()?,
            max_points: cursor.read()?,
            max_contours: cursor.read()?,
            max_component_points: cursor.read()?,
            max_component_contours: cursor.read()?,
            max_zones: cursor.read()?,
            max_twilight_points: cursor.read()?,
            max_storage: cursor.read()?,
            max_function_defs: cursor.read()?,
            max_instruction_defs: cursor.read()?,
            max_stack_elements: cursor.read()?,
            max_size_of_instructions: cursor.read()?,
            max_component_elements: cursor.read()?,
            max_component_depth: cursor.read()?,
        })
    }
}

impl FontWrite for Maxp {
    fn write_into(&self, writer: &mut TableWriter) {
        self.version.write_into(writer);
        [
            self.num_glyphs,
            self.max_points,
            self.max_contours,
            self.max_component_points,
            self.max_component_contours,
            self.max_zones,
            self.max_twilight_points,
            self.max_storage,
            self.max_function_defs,
            self.max_instruction_defs,
            self.max_stack_elements,
            self.max_size_of_instructions,
            self.max_component_elements,
            self.max_component_depth,
        ]
        .write_into(writer);
    }

    fn compute_length(&self) -> usize {
        Self::LEN
    }
}

impl Validate for Maxp {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("maxp", |ctx| {
            if self.version != Version16Dot16::VERSION_1_0 {
                ctx.in_field("version", |ctx| {
                    ctx.report(format!("only version 1.0 can be written, found {}", self.version))
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

    #[test]
    fn maxp_10() {
        let buf = BeBuffer::new()
            .push(Version16Dot16::VERSION_1_0)
            .extend([5u16, 40, 4, 80, 6, 2, 0, 64, 10, 0, 256, 1024, 3, 1]);
        assert_eq!(buf.len(), 32);
        let maxp = Maxp::read(FontData::new(&buf)).unwrap();
        assert_eq!(maxp.num_glyphs, 5);
        assert_eq!(maxp.max_component_points, 80);
        assert_eq!(maxp.max_size_of_instructions, 1024);
        assert_eq!(maxp.max_component_depth, 1);
        assert_eq!(dump_table(&maxp).unwrap(), buf.data());
    }

    #[test]
    fn wrong_length_is_malformed() {
        // a version 0.5 table, as found in CFF fonts
        let buf = BeBuffer::new().push(Version16Dot16::VERSION_0_5).push(5u16);
        assert!(matches!(
            Maxp::read(FontData::new(&buf)),
            Err(ReadError::MalformedTable {
                expected: 32,
                actual: 6,
                ..
            })
        ));
        let long = vec![0u8; 33];
        assert!(Maxp::read(FontData::new(&long)).is_err());
    }

    #[test]
    fn large_values_stay_unsigned() {
        let maxp = Maxp {
            num_glyphs: 0xFFFE,
            max_points: 40000,
            ..Default::default()
        };
        let bytes = dump_table(&maxp).unwrap();
        let loaded = Maxp::read(FontData::new(&bytes)).unwrap();
        assert_eq!(loaded.num_glyphs, 0xFFFE);
        assert_eq!(loaded.max_points, 40000);
        assert_eq!(loaded.max_zones, 2);
    }
}
