//! The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table

use sfnt_types::{GlyphId, Tag};

use crate::{
    read::{FontRead, ReadError, TopLevelTable},
    tables::{loca::Loca, maxp::Maxp},
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

mod composite;
mod glyf_loca_builder;
#[cfg(feature = "kurbo")]
mod outline;
mod simple;

pub use composite::{Anchor, Component, CompositeGlyph, CompositeGlyphFlags, Transform};
pub use glyf_loca_builder::GlyfLocaBuilder;
#[cfg(feature = "kurbo")]
pub use outline::OutlineError;
pub use simple::{Contour, CurvePoint, SimpleGlyph, SimpleGlyphFlags};

/// A Bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bbox {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

/// The [glyf] table.
///
/// Each glyph is kept as raw bytes until it is first requested, then parsed
/// and cached in place.
///
/// [glyf]: https://docs.microsoft.com/en-us/typography/opentype/spec/glyf
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Glyf {
    glyphs: Vec<GlyphSlot>,
}

/// Storage for a single glyph in [`Glyf`].
#[derive(Clone, Debug, PartialEq)]
enum GlyphSlot {
    /// A zero-length loca entry: the glyph has no outline.
    Empty,
    Unparsed(Vec<u8>),
    Parsed(Glyph),
}

/// A glyph, either simple (contours) or composite (components).
#[derive(Clone, Debug, PartialEq)]
pub enum Glyph {
    /// A glyph header with no contours.
    Empty(Bbox),
    Simple(SimpleGlyph),
    Composite(CompositeGlyph),
}

impl Bbox {
    pub fn union(self, other: Bbox) -> Bbox {
        Bbox {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    fn read(cursor: &mut crate::Cursor) -> Result<Self, ReadError> {
        Ok(Bbox {
            x_min: cursor.read()?,
            y_min: cursor.read()?,
            x_max: cursor.read()?,
            y_max: cursor.read()?,
        })
    }
}

#[cfg(feature = "kurbo")]
impl From<kurbo::Rect> for Bbox {
    fn from(value: kurbo::Rect) -> Self {
        fn ot_round(val: f64) -> i16 {
            (val + 0.5).floor() as i16
        }
        Bbox {
            x_min: ot_round(value.min_x()),
            y_min: ot_round(value.min_y()),
            x_max: ot_round(value.max_x()),
            y_max: ot_round(value.max_y()),
        }
    }
}

impl FontWrite for Bbox {
    fn write_into(&self, writer: &mut TableWriter) {
        let Bbox {
            x_min,
            y_min,
            x_max,
            y_max,
        } = *self;
        [x_min, y_min, x_max, y_max].write_into(writer)
    }

    fn compute_length(&self) -> usize {
        8
    }
}

impl TopLevelTable for Glyf {
    const TAG: Tag = Tag::new(b"glyf");
}

impl Glyf {
    /// Read the table, locating glyphs with `loca`.
    ///
    /// Only the first `maxp.num_glyphs` glyphs are addressed. No glyph is
    /// parsed until it is requested.
    pub fn read(data: FontData, loca: &Loca, maxp: &Maxp) -> Result<Self, ReadError> {
        let num_glyphs = maxp.num_glyphs as usize;
        if loca.num_glyphs() != num_glyphs {
            log::warn!(
                "loca has {} glyphs but maxp has {num_glyphs}",
                loca.num_glyphs()
            );
        }
        let glyphs = (0..num_glyphs.min(loca.num_glyphs()))
            .map(|gid| {
                let gid = GlyphId::new(gid as u16);
                match loca.glyph_range(gid) {
                    Some(range) => data
                        .slice(range)
                        .map(|bytes| GlyphSlot::Unparsed(bytes.as_bytes().to_vec()))
                        .ok_or(ReadError::TruncatedData),
                    None => Ok(GlyphSlot::Empty),
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Glyf { glyphs })
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    /// Return the glyph with this id, parsing it if needed.
    ///
    /// Glyphs without data, and ids outside the table, are `None`.
    pub fn get_glyph(&mut self, gid: GlyphId) -> Result<Option<&Glyph>, ReadError> {
        let Some(slot) = self.glyphs.get_mut(usize::from(gid)) else {
            return Ok(None);
        };
        if let GlyphSlot::Unparsed(bytes) = slot {
            let glyph = Glyph::read(FontData::new(bytes))?;
            *slot = GlyphSlot::Parsed(glyph);
        }
        match slot {
            GlyphSlot::Parsed(glyph) => Ok(Some(glyph)),
            _ => Ok(None),
        }
    }

    /// Return this glyph only if it has already been parsed.
    pub fn parsed_glyph(&self, gid: GlyphId) -> Option<&Glyph> {
        match self.glyphs.get(usize::from(gid))? {
            GlyphSlot::Parsed(glyph) => Some(glyph),
            _ => None,
        }
    }

    /// `true` if this glyph has data that has not been parsed yet.
    pub fn is_parsed(&self, gid: GlyphId) -> bool {
        !matches!(
            self.glyphs.get(usize::from(gid)),
            Some(GlyphSlot::Unparsed(_))
        )
    }

    /// Parse every remaining glyph.
    pub fn parse_all(&mut self) -> Result<(), ReadError> {
        for gid in 0..self.glyphs.len() {
            self.get_glyph(GlyphId::new(gid as u16))?;
        }
        Ok(())
    }

    /// Replace a glyph; `None` removes its outline.
    ///
    /// Setting the glyph one past the end appends it. Returns `false` if the
    /// id is further out of range.
    pub fn set_glyph(&mut self, gid: GlyphId, glyph: Option<Glyph>) -> bool {
        let slot = match glyph {
            Some(glyph) if !glyph.is_empty() => GlyphSlot::Parsed(glyph),
            _ => GlyphSlot::Empty,
        };
        let idx = usize::from(gid);
        match idx.cmp(&self.glyphs.len()) {
            std::cmp::Ordering::Less => self.glyphs[idx] = slot,
            std::cmp::Ordering::Equal => self.glyphs.push(slot),
            std::cmp::Ordering::Greater => return false,
        }
        true
    }

    /// Compute the loca table that matches this table's current contents.
    pub fn compute_loca(&self) -> Loca {
        let mut offsets = Vec::with_capacity(self.glyphs.len() + 1);
        let mut pos = 0u32;
        offsets.push(pos);
        for slot in &self.glyphs {
            pos += slot.compute_length() as u32;
            offsets.push(pos);
        }
        Loca::from_offsets(offsets)
    }

    fn from_slots(glyphs: Vec<GlyphSlot>) -> Self {
        Glyf { glyphs }
    }
}

impl GlyphSlot {
    fn compute_length(&self) -> usize {
        match self {
            GlyphSlot::Empty => 0,
            GlyphSlot::Unparsed(bytes) => bytes.len(),
            GlyphSlot::Parsed(glyph) => glyph.compute_length(),
        }
    }
}

impl Glyph {
    /// The bounding box of the glyph
    pub fn bbox(&self) -> Bbox {
        match self {
            Glyph::Empty(bbox) => *bbox,
            Glyph::Simple(glyph) => glyph.bbox,
            Glyph::Composite(glyph) => glyph.bbox,
        }
    }

    /// 'true' if the glyph contains no contours or components.
    pub fn is_empty(&self) -> bool {
        match self {
            Glyph::Empty(_) => true,
            Glyph::Simple(glyph) => glyph.contours().is_empty(),
            Glyph::Composite(glyph) => glyph.components().is_empty(),
        }
    }
}

impl FontRead for Glyph {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let num_contours: i16 = data.read_at(0)?;
        match num_contours {
            0 => {
                let mut cursor = data.cursor();
                cursor.advance::<i16>();
                Bbox::read(&mut cursor).map(Glyph::Empty)
            }
            1..=i16::MAX => SimpleGlyph::read(data).map(Glyph::Simple),
            -1 => CompositeGlyph::read(data).map(Glyph::Composite),
            other => Err(ReadError::UnknownGlyphVariant(other)),
        }
    }
}

impl From<SimpleGlyph> for Glyph {
    fn from(value: SimpleGlyph) -> Self {
        Glyph::Simple(value)
    }
}

impl From<CompositeGlyph> for Glyph {
    fn from(value: CompositeGlyph) -> Self {
        Glyph::Composite(value)
    }
}

impl FontWrite for Glyph {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            Glyph::Empty(bbox) => {
                0i16.write_into(writer);
                bbox.write_into(writer);
            }
            Glyph::Simple(glyph) => glyph.write_into(writer),
            Glyph::Composite(glyph) => glyph.write_into(writer),
        }
    }

    fn compute_length(&self) -> usize {
        match self {
            Glyph::Empty(bbox) => 2 + bbox.compute_length(),
            Glyph::Simple(glyph) => glyph.compute_length(),
            Glyph::Composite(glyph) => glyph.compute_length(),
        }
    }
}

impl Validate for Glyph {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        match self {
            Glyph::Empty(_) => (),
            Glyph::Simple(glyph) => glyph.validate_impl(ctx),
            Glyph::Composite(glyph) => glyph.validate_impl(ctx),
        }
    }
}

impl FontWrite for Glyf {
    fn write_into(&self, writer: &mut TableWriter) {
        for slot in &self.glyphs {
            match slot {
                GlyphSlot::Empty => (),
                GlyphSlot::Unparsed(bytes) => writer.write_slice(bytes),
                GlyphSlot::Parsed(glyph) => glyph.write_into(writer),
            }
        }
    }

    fn compute_length(&self) -> usize {
        self.glyphs.iter().map(GlyphSlot::compute_length).sum()
    }
}

impl Validate for Glyf {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("glyf", |ctx| {
            if self.glyphs.len() > u16::MAX as usize {
                ctx.report("too many glyphs");
            }
            for (i, slot) in self.glyphs.iter().enumerate() {
                if let GlyphSlot::Parsed(glyph) = slot {
                    ctx.in_item(i, |ctx| glyph.validate_impl(ctx));
                }
            }
        })
    }
}
