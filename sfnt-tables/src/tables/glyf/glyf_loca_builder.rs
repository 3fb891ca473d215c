//! A builder for the 'glyf' and 'loca' tables

use crate::{
    tables::loca::{Loca, LocaFormat},
    validate::{Validate, ValidationReport},
    write::FontWrite,
};

use super::{Glyf, Glyph, GlyphSlot};

/// A builder for constructing the 'glyf' & 'loca' tables.
///
/// These two tables are tightly coupled, and are necessarily constructed
/// together.
///
/// # Example
///
/// ```
/// use sfnt_tables::tables::glyf::{Glyph, GlyfLocaBuilder};
/// # fn get_glyphs() -> Vec<(String, Glyph)> { Vec::new() }
///
/// let names_and_glyphs: Vec<(String, Glyph)> = get_glyphs();
/// let mut builder = GlyfLocaBuilder::new();
///
/// for (name, glyph) in names_and_glyphs {
///     // your error handling goes here
///     if let Err(e) = builder.add_glyph(glyph) {
///         panic!("error compiling glyph '{name}': '{e}'");
///     }
/// }
///
/// let (_glyf, _loca, _loca_format) = builder.build();
/// // store the results somewhere
/// ```
#[derive(Debug)]
pub struct GlyfLocaBuilder {
    glyphs: Vec<GlyphSlot>,
    raw_loca: Vec<u32>,
}

impl GlyfLocaBuilder {
    /// Construct a new builder for the 'glyf' and 'loca' tables.
    pub fn new() -> Self {
        Self {
            glyphs: Vec::new(),
            raw_loca: vec![0],
        }
    }

    /// Add a glyph to the table.
    ///
    /// The argument can be any of [`Glyph`], [`SimpleGlyph`](super::SimpleGlyph)
    /// or [`CompositeGlyph`](super::CompositeGlyph).
    ///
    /// The glyph is validated immediately, so that the caller can associate
    /// any errors with a particular glyph.
    pub fn add_glyph(&mut self, glyph: impl Into<Glyph>) -> Result<&mut Self, ValidationReport> {
        let glyph = glyph.into();
        let slot = if glyph.is_empty() {
            // empty glyphs have no data, only a repeated loca offset
            GlyphSlot::Empty
        } else {
            glyph.validate()?;
            GlyphSlot::Parsed(glyph)
        };
        let pos = self.raw_loca.last().copied().unwrap_or_default() + slot.compute_length() as u32;
        self.glyphs.push(slot);
        self.raw_loca.push(pos);
        Ok(self)
    }

    /// Construct the final glyf and loca tables.
    ///
    /// This method also returns the loca format; the caller is responsible for
    /// setting this field in the [`head`] table.
    ///
    /// [`head`]: crate::tables::head::Head::index_to_loc_format
    #[must_use]
    pub fn build(self) -> (Glyf, Loca, LocaFormat) {
        let loca = Loca::from_offsets(self.raw_loca);
        let format = loca.format();
        (Glyf::from_slots(self.glyphs), loca, format)
    }
}

impl Default for GlyfLocaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
