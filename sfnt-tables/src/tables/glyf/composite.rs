//! Composite glyphs (containing other glyphs as components)

use sfnt_types::{F2Dot14, GlyphId};

use crate::{
    read::{FontRead, ReadError},
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    Cursor, FontData,
};

use super::Bbox;

bitflags::bitflags! {
    /// [Composite Glyph Flags](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf#composite-glyph-description)
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CompositeGlyphFlags: u16 {
        /// The arguments are 16-bit; otherwise they are 8-bit.
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        /// The arguments are signed x and y offsets; otherwise they are
        /// unsigned point numbers.
        const ARGS_ARE_XY_VALUES = 0x0002;
        /// For the xy values if the preceding is true.
        const ROUND_XY_TO_GRID = 0x0004;
        /// There is a simple scale for the component.
        const WE_HAVE_A_SCALE = 0x0008;
        /// At least one more glyph after this one.
        const MORE_COMPONENTS = 0x0020;
        /// The x direction will use a different scale from the y direction.
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        /// There is a 2 by 2 transformation.
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        /// Following the last component are instructions for the composite
        /// character.
        const WE_HAVE_INSTRUCTIONS = 0x0100;
        /// Use metrics from this component for the composite glyph.
        const USE_MY_METRICS = 0x0200;
        /// The components of the compound glyph overlap.
        const OVERLAP_COMPOUND = 0x0400;
        /// The composite is designed to have the component offset scaled.
        const SCALED_COMPONENT_OFFSET = 0x0800;
        /// The composite is designed not to have the component offset scaled.
        const UNSCALED_COMPONENT_OFFSET = 0x1000;
    }
}

/// A glyph consisting of multiple component sub-glyphs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeGlyph {
    pub bbox: Bbox,
    components: Vec<Component>,
    pub instructions: Vec<u8>,
}

/// A single component glyph (part of a [`CompositeGlyph`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    pub glyph: GlyphId,
    pub anchor: Anchor,
    pub transform: Transform,
    /// Flags for this component.
    ///
    /// Bits that describe the layout of the record (argument and transform
    /// kinds, `MORE_COMPONENTS`) are adjusted on write to match `anchor` and
    /// `transform`; the rest are written as they are.
    pub flags: CompositeGlyphFlags,
}

/// Anchor position for a composite component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Offset { x: i16, y: i16 },
    Point { base: u16, component: u16 },
}

/// Transform for a composite component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    /// X scale factor.
    pub xx: F2Dot14,
    /// YX skew factor.
    pub yx: F2Dot14,
    /// XY skew factor.
    pub xy: F2Dot14,
    /// Y scale factor.
    pub yy: F2Dot14,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            xx: F2Dot14::ONE,
            yx: F2Dot14::ZERO,
            xy: F2Dot14::ZERO,
            yy: F2Dot14::ONE,
        }
    }
}

const TRANSFORM_FLAGS: CompositeGlyphFlags = CompositeGlyphFlags::WE_HAVE_A_SCALE
    .union(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE)
    .union(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO);

impl Transform {
    /// The smallest transform record that can hold this transform.
    fn compute_flags(&self) -> CompositeGlyphFlags {
        if self.yx != F2Dot14::ZERO || self.xy != F2Dot14::ZERO {
            CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO
        } else if self.xx != self.yy {
            CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE
        } else if self.xx != F2Dot14::ONE {
            CompositeGlyphFlags::WE_HAVE_A_SCALE
        } else {
            CompositeGlyphFlags::empty()
        }
    }

    /// Keep the requested record kind if it can hold this transform.
    fn flags_for(&self, requested: CompositeGlyphFlags) -> CompositeGlyphFlags {
        let requested = requested & TRANSFORM_FLAGS;
        let no_skew = self.yx == F2Dot14::ZERO && self.xy == F2Dot14::ZERO;
        let fits = if requested.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            true
        } else if requested.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            no_skew
        } else if requested.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            no_skew && self.xx == self.yy
        } else {
            false
        };
        if fits {
            requested
        } else {
            self.compute_flags()
        }
    }

    fn read(cursor: &mut Cursor, flags: CompositeGlyphFlags) -> Result<Self, ReadError> {
        let mut transform = Transform::default();
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            transform.xx = cursor.read()?;
            transform.yy = transform.xx;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            transform.xx = cursor.read()?;
            transform.yy = cursor.read()?;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            transform.xx = cursor.read()?;
            transform.yx = cursor.read()?;
            transform.xy = cursor.read()?;
            transform.yy = cursor.read()?;
        }
        Ok(transform)
    }

    fn write_with_flags(&self, writer: &mut TableWriter, flags: CompositeGlyphFlags) {
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            [self.xx, self.yx, self.xy, self.yy].write_into(writer);
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            [self.xx, self.yy].write_into(writer);
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            self.xx.write_into(writer)
        }
    }

    fn len_for_flags(flags: CompositeGlyphFlags) -> usize {
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            8
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            4
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            2
        } else {
            0
        }
    }
}

impl Anchor {
    /// `true` if both arguments fit in a byte.
    fn fits_in_bytes(&self) -> bool {
        match *self {
            Anchor::Offset { x, y } => i8::try_from(x).is_ok() && i8::try_from(y).is_ok(),
            Anchor::Point { base, component } => base <= u8::MAX as u16 && component <= u8::MAX as u16,
        }
    }

    fn read(cursor: &mut Cursor, flags: CompositeGlyphFlags) -> Result<Self, ReadError> {
        let args_are_words = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
        let args_are_xy_values = flags.contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES);
        Ok(match (args_are_xy_values, args_are_words) {
            (true, true) => Anchor::Offset {
                x: cursor.read()?,
                y: cursor.read()?,
            },
            (true, false) => Anchor::Offset {
                x: cursor.read::<i8>()? as _,
                y: cursor.read::<i8>()? as _,
            },
            (false, true) => Anchor::Point {
                base: cursor.read()?,
                component: cursor.read()?,
            },
            (false, false) => Anchor::Point {
                base: cursor.read::<u8>()? as _,
                component: cursor.read::<u8>()? as _,
            },
        })
    }

    fn write_with_flags(&self, writer: &mut TableWriter, flags: CompositeGlyphFlags) {
        let two_bytes = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
        match *self {
            Anchor::Offset { x, y } if !two_bytes => [x as i8, y as i8].write_into(writer),
            Anchor::Offset { x, y } => [x, y].write_into(writer),
            Anchor::Point { base, component } if !two_bytes => {
                [base as u8, component as u8].write_into(writer)
            }
            Anchor::Point { base, component } => [base, component].write_into(writer),
        }
    }
}

impl Component {
    /// Create a new component.
    ///
    /// Only the flags that are not implied by the anchor and transform
    /// (such as `USE_MY_METRICS` or `ROUND_XY_TO_GRID`) need to be passed;
    /// the rest are filled in.
    pub fn new(
        glyph: GlyphId,
        anchor: Anchor,
        transform: Transform,
        flags: CompositeGlyphFlags,
    ) -> Self {
        let mut component = Component {
            glyph,
            anchor,
            transform,
            flags,
        };
        component.flags = component.compute_flags();
        component
    }

    /// Compute the flags for this component as written, except for
    /// `MORE_COMPONENTS` and `WE_HAVE_INSTRUCTIONS`.
    fn compute_flags(&self) -> CompositeGlyphFlags {
        let mut flags = self.flags
            - (CompositeGlyphFlags::MORE_COMPONENTS
                | CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS
                | CompositeGlyphFlags::ARGS_ARE_XY_VALUES
                | TRANSFORM_FLAGS);
        if matches!(self.anchor, Anchor::Offset { .. }) {
            flags |= CompositeGlyphFlags::ARGS_ARE_XY_VALUES;
        }
        // widen, but never narrow, the arguments
        if !self.anchor.fits_in_bytes() {
            flags |= CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS;
        }
        flags | self.transform.flags_for(self.flags)
    }

    /// like `FontWrite` but lets us pass in the flags that must be determined
    /// externally (WE_HAVE_INSTRUCTIONS and MORE_COMPONENTS)
    fn write_into(&self, writer: &mut TableWriter, extra_flags: CompositeGlyphFlags) {
        let flags = self.compute_flags() | extra_flags;
        flags.bits().write_into(writer);
        self.glyph.write_into(writer);
        self.anchor.write_with_flags(writer, flags);
        self.transform.write_with_flags(writer, flags);
    }

    fn compute_length(&self) -> usize {
        let flags = self.compute_flags();
        let args_len = if flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS) {
            4
        } else {
            2
        };
        4 + args_len + Transform::len_for_flags(flags)
    }
}

/// An error that occurs if a `CompositeGlyph` is constructed with no components.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct NoComponents;

impl std::fmt::Display for NoComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A composite glyph must contain at least one component")
    }
}

impl std::error::Error for NoComponents {}

impl CompositeGlyph {
    /// Create a new composite glyph, with the provided component.
    ///
    /// The 'bbox' argument is the bounding box of the glyph after the transform
    /// has been applied.
    ///
    /// Additional components can be added with [`add_component`][Self::add_component]
    pub fn new(component: Component, bbox: impl Into<Bbox>) -> Self {
        Self {
            bbox: bbox.into(),
            components: vec![component],
            instructions: Default::default(),
        }
    }

    /// Add a new component to this glyph
    ///
    /// The 'bbox' argument is the bounding box of the glyph after the transform
    /// has been applied.
    pub fn add_component(&mut self, component: Component, bbox: impl Into<Bbox>) {
        self.components.push(component);
        self.bbox = self.bbox.union(bbox.into());
    }

    /// Construct a `CompositeGlyph` from an iterator of `Component` and `Bbox`es.
    ///
    /// This returns an error if the iterator is empty; a CompositeGlyph must always
    /// contain at least one component.
    pub fn try_from_iter(
        source: impl IntoIterator<Item = (Component, Bbox)>,
    ) -> Result<Self, NoComponents> {
        let mut components = Vec::new();
        let mut union_box: Option<Bbox> = None;

        for (component, bbox) in source {
            components.push(component);
            union_box = Some(union_box.map_or(bbox, |prev| prev.union(bbox)));
        }

        match union_box {
            Some(bbox) => Ok(CompositeGlyph {
                bbox,
                components,
                instructions: Default::default(),
            }),
            None => Err(NoComponents),
        }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut [Component] {
        &mut self.components
    }

    fn has_instructions(&self) -> bool {
        !self.instructions.is_empty()
            || self.components.last().is_some_and(|comp| {
                comp.flags
                    .contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS)
            })
    }
}

impl FontRead for CompositeGlyph {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let num_contours: i16 = cursor.read()?;
        if num_contours != -1 {
            return Err(ReadError::InvalidFormat(num_contours.into()));
        }
        let bbox = Bbox::read(&mut cursor)?;
        let mut components = Vec::new();
        let mut flags = CompositeGlyphFlags::MORE_COMPONENTS;
        while flags.contains(CompositeGlyphFlags::MORE_COMPONENTS) {
            flags = CompositeGlyphFlags::from_bits_retain(cursor.read()?);
            let glyph = cursor.read::<GlyphId>()?;
            let anchor = Anchor::read(&mut cursor, flags)?;
            let transform = Transform::read(&mut cursor, flags)?;
            components.push(Component {
                glyph,
                anchor,
                transform,
                flags: flags - CompositeGlyphFlags::MORE_COMPONENTS,
            });
        }
        let instructions = if flags.contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS) {
            let len = cursor.read::<u16>()? as usize;
            cursor.read_bytes(len)?.to_vec()
        } else {
            Vec::new()
        };
        Ok(CompositeGlyph {
            bbox,
            components,
            instructions,
        })
    }
}

impl FontWrite for CompositeGlyph {
    fn write_into(&self, writer: &mut TableWriter) {
        const N_CONTOURS: i16 = -1;
        let Some((last, rest)) = self.components.split_last() else {
            // empty composites are rejected by validation
            return;
        };
        N_CONTOURS.write_into(writer);
        self.bbox.write_into(writer);
        for comp in rest {
            comp.write_into(writer, CompositeGlyphFlags::MORE_COMPONENTS);
        }
        let has_instructions = self.has_instructions();
        let last_flags = if has_instructions {
            CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS
        } else {
            CompositeGlyphFlags::empty()
        };
        last.write_into(writer, last_flags);

        if has_instructions {
            (self.instructions.len() as u16).write_into(writer);
            self.instructions.write_into(writer);
        }
        writer.pad_to_2byte_aligned();
    }

    fn compute_length(&self) -> usize {
        if self.components.is_empty() {
            return 0;
        }
        let components: usize = self.components.iter().map(Component::compute_length).sum();
        let instructions = if self.has_instructions() {
            2 + self.instructions.len()
        } else {
            0
        };
        (10 + components + instructions).next_multiple_of(2)
    }
}

impl Validate for CompositeGlyph {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("CompositeGlyph", |ctx| {
            if self.components.is_empty() {
                ctx.report("composite glyph must have components");
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

    #[test]
    fn roundtrip_composite() {
        let data = sfnt_test_data::glyf::composite_glyph();
        let glyph = CompositeGlyph::read(FontData::new(&data)).unwrap();
        assert_eq!(glyph.components().len(), 2);

        let first = &glyph.components()[0];
        assert_eq!(first.glyph, GlyphId::new(1));
        assert_eq!(first.anchor, Anchor::Offset { x: 300, y: -20 });
        assert_eq!(first.transform.xx, F2Dot14::from_f32(0.5));
        assert_eq!(first.transform.yy, F2Dot14::from_f32(0.5));

        let second = &glyph.components()[1];
        assert_eq!(second.glyph, GlyphId::new(2));
        assert_eq!(second.anchor, Anchor::Offset { x: 5, y: -3 });
        assert_eq!(
            second.transform,
            Transform {
                xx: F2Dot14::ONE,
                yx: F2Dot14::from_f32(0.25),
                xy: F2Dot14::from_f32(-0.25),
                yy: F2Dot14::ONE,
            }
        );
        assert!(second.flags.contains(CompositeGlyphFlags::USE_MY_METRICS));
        assert_eq!(glyph.instructions, vec![1, 2, 3]);

        let bytes = dump_table(&glyph).unwrap();
        assert_eq!(bytes, data.data());
        assert_eq!(glyph.compute_length(), bytes.len());
        assert_eq!(CompositeGlyph::read(FontData::new(&bytes)).unwrap(), glyph);
    }

    #[test]
    fn arguments_widen_when_needed() {
        let data = sfnt_test_data::glyf::composite_glyph();
        let mut glyph = CompositeGlyph::read(FontData::new(&data)).unwrap();
        glyph.components_mut()[1].anchor = Anchor::Offset { x: 500, y: 0 };
        let bytes = dump_table(&glyph).unwrap();
        assert_eq!(bytes.len(), data.len() + 2);
        let reread = CompositeGlyph::read(FontData::new(&bytes)).unwrap();
        let flags = reread.components()[1].flags;
        assert!(flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS));
        assert_eq!(reread.components()[1].anchor, Anchor::Offset { x: 500, y: 0 });
    }

    #[test]
    fn build_composite() {
        let bbox = Bbox {
            x_min: 0,
            y_min: 0,
            x_max: 10,
            y_max: 10,
        };
        let mut glyph = CompositeGlyph::new(
            Component::new(
                GlyphId::new(4),
                Anchor::Point {
                    base: 2,
                    component: 300,
                },
                Transform::default(),
                CompositeGlyphFlags::empty(),
            ),
            bbox,
        );
        glyph.add_component(
            Component::new(
                GlyphId::new(5),
                Anchor::Offset { x: -1, y: 1 },
                Transform {
                    xx: F2Dot14::from_f32(1.5),
                    yy: F2Dot14::from_f32(-1.0),
                    ..Default::default()
                },
                CompositeGlyphFlags::ROUND_XY_TO_GRID,
            ),
            Bbox {
                x_min: -5,
                ..bbox
            },
        );
        assert_eq!(glyph.bbox.x_min, -5);
        let bytes = dump_table(&glyph).unwrap();
        // header + (flags, gid, word args) + (flags, gid, byte args, x and y scale)
        assert_eq!(bytes.len(), 10 + 8 + 10);
        let reread = CompositeGlyph::read(FontData::new(&bytes)).unwrap();
        assert_eq!(reread.components()[0].anchor, glyph.components()[0].anchor);
        assert_eq!(reread.components()[1].transform, glyph.components()[1].transform);
        assert!(reread.components()[1]
            .flags
            .contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE));
        assert!(reread.instructions.is_empty());
    }

    #[test]
    fn no_components() {
        assert!(CompositeGlyph::try_from_iter(std::iter::empty()).is_err());
        let glyph = CompositeGlyph {
            bbox: Bbox::default(),
            components: Vec::new(),
            instructions: Vec::new(),
        };
        assert!(dump_table(&glyph).is_err());
    }
}
