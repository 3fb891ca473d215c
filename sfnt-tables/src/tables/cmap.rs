//! The [cmap](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap) table

use std::collections::{BTreeMap, HashMap};

use sfnt_types::{GlyphId, Tag};

use crate::{
    read::{FontRead, ReadError, TopLevelTable},
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

mod format0;
mod format4;
mod format6;

pub use format0::Cmap0;
pub use format4::{Cmap4, InvalidSegment, Segment, SegmentMapping};
pub use format6::Cmap6;

/// Unicode BMP encoding on the Unicode platform.
pub const UNICODE_BMP_ENCODING: u16 = 3;
/// Unicode BMP encoding on the Windows platform.
pub const WINDOWS_BMP_ENCODING: u16 = 1;

const HEADER_LEN: usize = 4;
const ENCODING_RECORD_LEN: usize = 8;

/// The [cmap] table: a set of subtables keyed by (platform, encoding).
///
/// Records that point at identical subtables are written with a single
/// copy of that subtable.
///
/// [cmap]: https://docs.microsoft.com/en-us/typography/opentype/spec/cmap
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cmap {
    pub version: u16,
    #[cfg_attr(feature = "serde", serde(with = "subtable_map"))]
    subtables: BTreeMap<(u16, u16), CmapSubtable>,
}

/// A character to glyph mapping subtable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CmapSubtable {
    Format0(Cmap0),
    Format4(Cmap4),
    Format6(Cmap6),
    /// A subtable in a format this crate does not interpret, kept verbatim.
    Unsupported { format: u16, data: Vec<u8> },
}

impl Cmap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subtable(&self, platform_id: u16, encoding_id: u16) -> Option<&CmapSubtable> {
        self.subtables.get(&(platform_id, encoding_id))
    }

    pub fn subtable_mut(
        &mut self,
        platform_id: u16,
        encoding_id: u16,
    ) -> Option<&mut CmapSubtable> {
        self.subtables.get_mut(&(platform_id, encoding_id))
    }

    /// Add a subtable, returning the one it replaces.
    pub fn add_subtable(
        &mut self,
        platform_id: u16,
        encoding_id: u16,
        subtable: impl Into<CmapSubtable>,
    ) -> Option<CmapSubtable> {
        self.subtables
            .insert((platform_id, encoding_id), subtable.into())
    }

    pub fn remove_subtable(&mut self, platform_id: u16, encoding_id: u16) -> Option<CmapSubtable> {
        self.subtables.remove(&(platform_id, encoding_id))
    }

    /// Iterate over `((platform, encoding), subtable)`, in record order.
    pub fn subtables(&self) -> impl Iterator<Item = ((u16, u16), &CmapSubtable)> + '_ {
        self.subtables.iter().map(|(key, sub)| (*key, sub))
    }

    pub fn num_subtables(&self) -> usize {
        self.subtables.len()
    }

    /// Map `code` through the subtable for (platform, encoding).
    ///
    /// Glyph 0 is returned if there is no such subtable.
    pub fn map(&self, platform_id: u16, encoding_id: u16, code: u16) -> GlyphId {
        self.subtable(platform_id, encoding_id)
            .map(|sub| sub.map(code))
            .unwrap_or(GlyphId::NOTDEF)
    }

    /// Map `code` through the first subtable, in record order, that maps it.
    pub fn map_codepoint(&self, code: u16) -> Option<GlyphId> {
        self.subtables
            .values()
            .map(|sub| sub.map(code))
            .find(|gid| *gid != GlyphId::NOTDEF)
    }

    // the distinct subtables in order of first reference, and for each
    // record the index of its subtable
    fn shared_layout(&self) -> (Vec<&CmapSubtable>, Vec<usize>) {
        let mut unique: Vec<&CmapSubtable> = Vec::new();
        let indices = self
            .subtables
            .values()
            .map(|sub| match unique.iter().position(|seen| *seen == sub) {
                Some(idx) => idx,
                None => {
                    unique.push(sub);
                    unique.len() - 1
                }
            })
            .collect();
        (unique, indices)
    }
}

impl CmapSubtable {
    pub fn format(&self) -> u16 {
        match self {
            CmapSubtable::Format0(_) => 0,
            CmapSubtable::Format4(_) => 4,
            CmapSubtable::Format6(_) => 6,
            CmapSubtable::Unsupported { format, .. } => *format,
        }
    }

    /// The subtable's language, or `None` for unsupported formats.
    pub fn language(&self) -> Option<u16> {
        match self {
            CmapSubtable::Format0(table) => Some(table.language),
            CmapSubtable::Format4(table) => Some(table.language),
            CmapSubtable::Format6(table) => Some(table.language),
            CmapSubtable::Unsupported { .. } => None,
        }
    }

    /// Map a character code to a glyph. Unsupported formats map nothing.
    pub fn map(&self, code: u16) -> GlyphId {
        match self {
            CmapSubtable::Format0(table) => table.map(code),
            CmapSubtable::Format4(table) => table.map(code),
            CmapSubtable::Format6(table) => table.map(code),
            CmapSubtable::Unsupported { .. } => GlyphId::NOTDEF,
        }
    }

    pub fn reverse_map(&self, gid: GlyphId) -> Option<u16> {
        match self {
            CmapSubtable::Format0(table) => table.reverse_map(gid),
            CmapSubtable::Format4(table) => table.reverse_map(gid),
            CmapSubtable::Format6(table) => table.reverse_map(gid),
            CmapSubtable::Unsupported { .. } => None,
        }
    }

    fn read_unsupported(data: FontData, format: u16) -> Result<Self, ReadError> {
        let len = match format {
            2 => data.read_at::<u16>(2)? as usize,
            8 | 10 | 12 | 13 => data.read_at::<u32>(4)? as usize,
            14 => data.read_at::<u32>(2)? as usize,
            other => return Err(ReadError::InvalidFormat(other.into())),
        };
        let data = data.read_bytes(0, len)?.to_vec();
        log::debug!("keeping cmap format {format} subtable ({len} bytes) unparsed");
        Ok(CmapSubtable::Unsupported { format, data })
    }
}

impl TopLevelTable for Cmap {
    const TAG: Tag = Tag::new(b"cmap");
}

impl FontRead for CmapSubtable {
    fn read(data: FontData) -> Result<Self, ReadError> {
        match data.read_at::<u16>(0)? {
            0 => Cmap0::read(data).map(Self::Format0),
            4 => Cmap4::read(data).map(Self::Format4),
            6 => Cmap6::read(data).map(Self::Format6),
            other => Self::read_unsupported(data, other),
        }
    }
}

impl FontRead for Cmap {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version = cursor.read()?;
        let num_tables: u16 = cursor.read()?;
        // shared subtables are parsed once
        let mut by_offset: HashMap<u32, CmapSubtable> = HashMap::new();
        let mut subtables = BTreeMap::new();
        for _ in 0..num_tables {
            let platform_id: u16 = cursor.read()?;
            let encoding_id: u16 = cursor.read()?;
            let offset: u32 = cursor.read()?;
            let subtable = match by_offset.get(&offset) {
                Some(subtable) => subtable.clone(),
                None => {
                    let subtable = data
                        .split_off(offset as usize)
                        .ok_or(ReadError::TruncatedData)
                        .and_then(CmapSubtable::read)?;
                    by_offset.insert(offset, subtable.clone());
                    subtable
                }
            };
            if subtables
                .insert((platform_id, encoding_id), subtable)
                .is_some()
            {
                log::warn!("duplicate cmap record ({platform_id}, {encoding_id}), keeping the last");
            }
        }
        Ok(Cmap { version, subtables })
    }
}

impl FontWrite for CmapSubtable {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            CmapSubtable::Format0(table) => table.write_into(writer),
            CmapSubtable::Format4(table) => table.write_into(writer),
            CmapSubtable::Format6(table) => table.write_into(writer),
            CmapSubtable::Unsupported { data, .. } => writer.write_slice(data),
        }
    }

    fn compute_length(&self) -> usize {
        match self {
            CmapSubtable::Format0(table) => table.compute_length(),
            CmapSubtable::Format4(table) => table.compute_length(),
            CmapSubtable::Format6(table) => table.compute_length(),
            CmapSubtable::Unsupported { data, .. } => data.len(),
        }
    }
}

impl FontWrite for Cmap {
    fn write_into(&self, writer: &mut TableWriter) {
        let (unique, indices) = self.shared_layout();
        let mut offsets = Vec::with_capacity(unique.len());
        let mut pos = HEADER_LEN + ENCODING_RECORD_LEN * self.subtables.len();
        for subtable in &unique {
            offsets.push(pos as u32);
            pos += subtable.compute_length();
        }

        self.version.write_into(writer);
        (self.subtables.len() as u16).write_into(writer);
        for (&(platform_id, encoding_id), idx) in self.subtables.keys().zip(indices) {
            platform_id.write_into(writer);
            encoding_id.write_into(writer);
            offsets[idx].write_into(writer);
        }
        for subtable in unique {
            subtable.write_into(writer);
        }
    }

    fn compute_length(&self) -> usize {
        let (unique, _) = self.shared_layout();
        HEADER_LEN
            + ENCODING_RECORD_LEN * self.subtables.len()
            + unique
                .iter()
                .map(|sub| sub.compute_length())
                .sum::<usize>()
    }
}

impl Validate for CmapSubtable {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        match self {
            CmapSubtable::Format0(table) => table.validate_impl(ctx),
            CmapSubtable::Format4(table) => table.validate_impl(ctx),
            CmapSubtable::Format6(table) => table.validate_impl(ctx),
            CmapSubtable::Unsupported { .. } => (),
        }
    }
}

impl Validate for Cmap {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("cmap", |ctx| {
            ctx.in_field("encoding_records", |ctx| {
                if self.subtables.len() > u16::MAX as usize {
                    ctx.report("too many subtables");
                }
                for (i, subtable) in self.subtables.values().enumerate() {
                    ctx.in_item(i, |ctx| subtable.validate_impl(ctx));
                }
            })
        })
    }
}

impl From<Cmap0> for CmapSubtable {
    fn from(src: Cmap0) -> Self {
        CmapSubtable::Format0(src)
    }
}

impl From<Cmap4> for CmapSubtable {
    fn from(src: Cmap4) -> Self {
        CmapSubtable::Format4(src)
    }
}

impl From<Cmap6> for CmapSubtable {
    fn from(src: Cmap6) -> Self {
        CmapSubtable::Format6(src)
    }
}

// tuple keys are not valid map keys in most human-readable formats
#[cfg(feature = "serde")]
mod subtable_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::CmapSubtable;

    #[derive(Serialize, Deserialize)]
    struct Record {
        platform_id: u16,
        encoding_id: u16,
        subtable: CmapSubtable,
    }

    pub(super) fn serialize<S: Serializer>(
        map: &BTreeMap<(u16, u16), CmapSubtable>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        map.iter()
            .map(|(&(platform_id, encoding_id), subtable)| Record {
                platform_id,
                encoding_id,
                subtable: subtable.clone(),
            })
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(u16, u16), CmapSubtable>, D::Error> {
        Ok(Vec::<Record>::deserialize(deserializer)?
            .into_iter()
            .map(|rec| ((rec.platform_id, rec.encoding_id), rec.subtable))
            .collect())
    }
}
