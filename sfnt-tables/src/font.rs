//! The sfnt container: a table directory and the tables it points to

use std::{cell::OnceCell, collections::BTreeMap};

use sfnt_types::{Tag, APPLE_SFNT_VERSION, CFF_SFNT_VERSION, TT_SFNT_VERSION};

use crate::{
    error::Error,
    read::{ReadError, TopLevelTable},
    registry::{KnownTable, Table, TableContext},
    tables::{glyf::Glyf, head::Head, hhea::Hhea, hmtx::Hmtx, maxp::Maxp, name::Name},
    util::{checksum, SearchRange},
    write::{dump_table, FontWrite, TableWriter},
    FontData,
};

const TABLE_RECORD_LEN: usize = 16;
const HEADER_LEN: usize = 12;

/// The whole-file checksum of every well-formed font.
const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

/// A font file: an ordered set of tables, keyed by tag.
///
/// Tables read from a file are kept as bytes until they are first requested
/// through [`Font::table`] or [`Font::table_mut`]. Once parsed (or added
/// with [`Font::add_table`]) the typed table is what gets written.
#[derive(Clone, Debug)]
pub struct Font {
    sfnt_version: u32,
    tables: BTreeMap<Tag, TableEntry>,
}

#[derive(Clone, Debug, Default)]
struct TableEntry {
    data: Vec<u8>,
    parsed: OnceCell<Table>,
}

impl TableEntry {
    fn raw(data: Vec<u8>) -> Self {
        TableEntry {
            data,
            parsed: OnceCell::new(),
        }
    }

    fn parsed(table: Table) -> Self {
        TableEntry {
            data: Vec::new(),
            parsed: OnceCell::from(table),
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::new()
    }
}

impl Font {
    /// An empty font with TrueType outlines.
    pub fn new() -> Self {
        Font {
            sfnt_version: TT_SFNT_VERSION,
            tables: BTreeMap::new(),
        }
    }

    /// Read the table directory of a font file.
    ///
    /// No table is parsed here; a table's checksum is checked and a mismatch
    /// is logged.
    pub fn read(bytes: &[u8]) -> Result<Font, ReadError> {
        let data = FontData::new(bytes);
        let mut cursor = data.cursor();
        let sfnt_version: u32 = cursor.read()?;
        if ![TT_SFNT_VERSION, APPLE_SFNT_VERSION, CFF_SFNT_VERSION].contains(&sfnt_version) {
            return Err(ReadError::InvalidSfnt(sfnt_version));
        }
        let num_tables: u16 = cursor.read()?;
        // searchRange, entrySelector and rangeShift are recomputed on write
        cursor.advance_by(6);

        let mut tables = BTreeMap::new();
        for _ in 0..num_tables {
            let tag: Tag = cursor.read()?;
            let expected_checksum: u32 = cursor.read()?;
            let offset = cursor.read::<u32>()? as usize;
            let length = cursor.read::<u32>()? as usize;
            let table = offset
                .checked_add(length)
                .and_then(|end| data.slice(offset..end))
                .ok_or(ReadError::TruncatedData)?;
            let actual_checksum = table_checksum(tag, table.as_bytes());
            if actual_checksum != expected_checksum {
                log::warn!(
                    "checksum mismatch in '{tag}': expected {expected_checksum:#010X}, found {actual_checksum:#010X}"
                );
            }
            if tables
                .insert(tag, TableEntry::raw(table.as_bytes().to_vec()))
                .is_some()
            {
                log::warn!("duplicate table record for '{tag}', keeping the last");
            }
        }
        Ok(Font {
            sfnt_version,
            tables,
        })
    }

    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    /// The tags of every table, in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.tables.keys().copied()
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.tables.contains_key(&tag)
    }

    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    /// The bytes this table was read from.
    ///
    /// This is `None` for tables added in typed form. After
    /// [`Font::table_mut`] the bytes may no longer match the table.
    pub fn data_for_tag(&self, tag: Tag) -> Option<&[u8]> {
        self.tables
            .get(&tag)
            .filter(|entry| entry.parsed.get().is_none() || !entry.data.is_empty())
            .map(|entry| entry.data.as_slice())
    }

    /// The table with this tag, parsing it (and any table it depends on)
    /// if needed.
    pub fn get(&self, tag: Tag) -> Result<Option<&Table>, ReadError> {
        let Some(entry) = self.tables.get(&tag) else {
            return Ok(None);
        };
        if let Some(table) = entry.parsed.get() {
            return Ok(Some(table));
        }
        let ctx = self.context_for(tag)?;
        let table = Table::read(tag, FontData::new(&entry.data), &ctx)?;
        Ok(Some(entry.parsed.get_or_init(|| table)))
    }

    /// The typed table `T`, parsing it on first use.
    pub fn table<T: KnownTable>(&self) -> Result<Option<&T>, ReadError> {
        Ok(self.get(T::TAG)?.and_then(T::from_table))
    }

    /// Mutable access to the typed table `T`, parsing it on first use.
    pub fn table_mut<T: KnownTable>(&mut self) -> Result<Option<&mut T>, ReadError> {
        self.get(T::TAG)?;
        Ok(self
            .tables
            .get_mut(&T::TAG)
            .and_then(|entry| entry.parsed.get_mut())
            .and_then(T::from_table_mut))
    }

    /// Add a typed table, replacing any table with the same tag.
    pub fn add_table(&mut self, table: impl Into<Table>) -> &mut Self {
        let table = table.into();
        self.tables.insert(table.tag(), TableEntry::parsed(table));
        self
    }

    /// Add the bytes of a table, replacing any table with the same tag.
    ///
    /// The bytes are parsed lazily if the tag is one this crate knows.
    pub fn add_raw(&mut self, tag: Tag, data: impl Into<Vec<u8>>) -> &mut Self {
        self.tables.insert(tag, TableEntry::raw(data.into()));
        self
    }

    /// Remove a table; returns `false` if there was no table with this tag.
    pub fn remove_table(&mut self, tag: Tag) -> bool {
        self.tables.remove(&tag).is_some()
    }

    /// Every string in the `name` table.
    pub fn names(&self) -> Result<Vec<&str>, ReadError> {
        Ok(self
            .table::<Name>()?
            .map(|name| name.names().collect())
            .unwrap_or_default())
    }

    /// Serialize the font.
    ///
    /// If `glyf` has been parsed, `loca` and the head's `index_to_loc_format`
    /// are regenerated from it first, and `maxp.num_glyphs` and
    /// `hhea.number_of_h_metrics` follow the parsed `glyf` and `hmtx`. The
    /// head's `checksum_adjustment` is updated to the value written.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, Error> {
        if self.tables.len() > u16::MAX as usize {
            return Err(Error::TooManyTables(self.tables.len()));
        }
        self.sync_loca()?;
        self.sync_counts()?;

        let mut compiled = Vec::with_capacity(self.tables.len());
        for (tag, entry) in &self.tables {
            let mut bytes = match entry.parsed.get() {
                Some(table) => dump_table(table).map_err(|report| Error::ValidationFailed {
                    tag: *tag,
                    report,
                })?,
                None => entry.data.clone(),
            };
            if *tag == Head::TAG {
                zero_checksum_adjustment(&mut bytes);
            }
            compiled.push((*tag, bytes));
        }

        let computed = SearchRange::compute(compiled.len(), TABLE_RECORD_LEN);
        let total_len = HEADER_LEN
            + compiled.len() * TABLE_RECORD_LEN
            + compiled
                .iter()
                .map(|(_, bytes)| bytes.len().next_multiple_of(4))
                .sum::<usize>();
        let mut writer = TableWriter::with_capacity(total_len);
        self.sfnt_version.write_into(&mut writer);
        (compiled.len() as u16).write_into(&mut writer);
        computed.search_range.write_into(&mut writer);
        computed.entry_selector.write_into(&mut writer);
        computed.range_shift.write_into(&mut writer);

        let mut offset = HEADER_LEN + compiled.len() * TABLE_RECORD_LEN;
        for (tag, bytes) in &compiled {
            tag.write_into(&mut writer);
            checksum(bytes).write_into(&mut writer);
            (offset as u32).write_into(&mut writer);
            (bytes.len() as u32).write_into(&mut writer);
            offset += bytes.len().next_multiple_of(4);
        }

        let mut head_pos = None;
        for (tag, bytes) in &compiled {
            if *tag == Head::TAG && bytes.len() >= Head::CHECKSUM_ADJUSTMENT_OFFSET + 4 {
                head_pos = Some(writer.len() + Head::CHECKSUM_ADJUSTMENT_OFFSET);
            }
            writer.write_slice(bytes);
            writer.pad_to_4byte_aligned();
        }
        let mut data = writer.into_data();

        if let Some(pos) = head_pos {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&data));
            data[pos..pos + 4].copy_from_slice(&adjustment.to_be_bytes());
            if let Some(head) = self
                .tables
                .get_mut(&Head::TAG)
                .and_then(|entry| entry.parsed.get_mut())
                .and_then(Head::from_table_mut)
            {
                head.checksum_adjustment = adjustment;
            }
        }
        Ok(data)
    }

    fn context_for(&self, tag: Tag) -> Result<TableContext<'_>, ReadError> {
        let mut ctx = TableContext::default();
        for dep in Table::dependencies(tag) {
            match self.get(*dep)? {
                Some(Table::Head(head)) => ctx.head = Some(head),
                Some(Table::Maxp(maxp)) => ctx.maxp = Some(maxp),
                Some(Table::Hhea(hhea)) => ctx.hhea = Some(hhea),
                Some(Table::Loca(loca)) => ctx.loca = Some(loca),
                _ => return Err(ReadError::TableIsMissing(*dep)),
            }
        }
        Ok(ctx)
    }

    /// `T`, only if it has already been parsed.
    fn parsed<T: KnownTable>(&self) -> Option<&T> {
        self.tables
            .get(&T::TAG)
            .and_then(|entry| entry.parsed.get())
            .and_then(T::from_table)
    }

    fn sync_loca(&mut self) -> Result<(), ReadError> {
        let Some(glyf) = self.parsed::<Glyf>() else {
            return Ok(());
        };
        let loca = glyf.compute_loca();
        let format = loca.format().to_index_to_loc_format();
        self.add_table(loca);
        match self.table_mut::<Head>()? {
            Some(head) => head.index_to_loc_format = format,
            None => log::warn!("font has glyf but no head, loca format is not recorded"),
        }
        Ok(())
    }

    /// Copy glyph and metric counts from parsed `glyf` and `hmtx` into
    /// `maxp` and `hhea`.
    fn sync_counts(&mut self) -> Result<(), ReadError> {
        if let Some(count) = self.parsed::<Glyf>().map(Glyf::num_glyphs) {
            let count = u16::try_from(count).unwrap_or(u16::MAX);
            match self.table_mut::<Maxp>()? {
                Some(maxp) => maxp.num_glyphs = count,
                None => log::warn!("font has glyf but no maxp, glyph count is not recorded"),
            }
        }
        let Some((n_metrics, n_glyphs)) = self
            .parsed::<Hmtx>()
            .map(|hmtx| (hmtx.number_of_h_metrics(), hmtx.num_glyphs()))
        else {
            return Ok(());
        };
        match self.table_mut::<Hhea>()? {
            Some(hhea) => hhea.number_of_h_metrics = n_metrics,
            None => log::warn!("font has hmtx but no hhea, metric count is not recorded"),
        }
        if let Some(maxp) = self.table::<Maxp>()? {
            if usize::from(maxp.num_glyphs) != n_glyphs {
                log::warn!(
                    "hmtx has {n_glyphs} entries but maxp has {} glyphs",
                    maxp.num_glyphs
                );
            }
        }
        Ok(())
    }
}

fn zero_checksum_adjustment(head: &mut [u8]) {
    let pos = Head::CHECKSUM_ADJUSTMENT_OFFSET;
    if let Some(field) = head.get_mut(pos..pos + 4) {
        field.fill(0);
    }
}

/// The checksum of a table as stored in the directory.
///
/// The head's checksum adjustment is counted as zero.
fn table_checksum(tag: Tag, bytes: &[u8]) -> u32 {
    if tag == Head::TAG {
        let mut bytes = bytes.to_vec();
        zero_checksum_adjustment(&mut bytes);
        checksum(&bytes)
    } else {
        checksum(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        read::FontRead,
        tables::{
            cmap::Cmap,
            glyf::{Bbox, GlyfLocaBuilder, Glyph},
            hhea::Hhea,
            hmtx::{Hmtx, LongMetric},
            loca::{Loca, LocaFormat},
            maxp::Maxp,
            post::Post,
        },
    };
    use pretty_assertions::assert_eq;
    use sfnt_types::GlyphId;

    fn test_font() -> Font {
        let glyph = Glyph::read(FontData::new(&sfnt_test_data::glyf::two_point_glyph())).unwrap();
        let mut builder = GlyfLocaBuilder::new();
        builder.add_glyph(Glyph::Empty(Bbox::default())).unwrap();
        builder.add_glyph(glyph).unwrap();
        let (glyf, _loca, _format) = builder.build();

        let mut font = Font::new();
        font.add_table(Head::default())
            .add_table(Maxp {
                num_glyphs: 2,
                ..Default::default()
            })
            .add_table(Hhea {
                number_of_h_metrics: 2,
                ..Default::default()
            })
            .add_table(Hmtx::new(
                vec![LongMetric::new(500, 0), LongMetric::new(600, 10)],
                Vec::new(),
            ))
            .add_table(glyf)
            .add_table(Name::read(FontData::new(&sfnt_test_data::name::name_table())).unwrap())
            .add_table(Post::default())
            .add_raw(Cmap::TAG, sfnt_test_data::cmap::cmap_table().into_vec());
        font
    }

    #[test]
    fn directory_search_fields() {
        let mut font = Font::new();
        for i in 0..22 {
            let tag: Tag = format!("t{i:03}").parse().unwrap();
            font.add_raw(tag, b"doesn't matter".to_vec());
        }
        let bytes = font.to_bytes().unwrap();
        let data = FontData::new(&bytes);
        assert_eq!(data.read_at::<u16>(4).unwrap(), 22);
        assert_eq!(
            (
                data.read_at::<u16>(6).unwrap(),
                data.read_at::<u16>(8).unwrap(),
                data.read_at::<u16>(10).unwrap()
            ),
            (256, 4, 96)
        );
    }

    #[test]
    fn no_tables() {
        let bytes = Font::new().to_bytes().unwrap();
        assert_eq!(bytes, [0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(Font::read(&bytes).unwrap().num_tables(), 0);
    }

    #[test]
    fn tables_are_padded_and_sorted() {
        let mut font = Font::new();
        font.add_raw(Tag::new(b"zzzz"), [1u8])
            .add_raw(Tag::new(b"aaaa"), [2u8, 3, 4, 5, 6]);
        let bytes = font.to_bytes().unwrap();
        // header, two records, then 8 + 4 bytes of tables
        assert_eq!(bytes.len(), 12 + 32 + 12);
        let data = FontData::new(&bytes);
        assert_eq!(data.read_at::<Tag>(12).unwrap(), Tag::new(b"aaaa"));
        assert_eq!(data.read_at::<u32>(20).unwrap(), 44);
        assert_eq!(data.read_at::<u32>(24).unwrap(), 5);
        assert_eq!(data.read_at::<u32>(36).unwrap(), 52);
        assert_eq!(&bytes[44..], &[2, 3, 4, 5, 6, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn whole_file_checksum() {
        let mut font = test_font();
        let bytes = font.to_bytes().unwrap();
        assert_eq!(checksum(&bytes), CHECKSUM_MAGIC);

        let reread = Font::read(&bytes).unwrap();
        let head = reread.table::<Head>().unwrap().unwrap();
        assert_ne!(head.checksum_adjustment, 0);
        assert_eq!(
            head.checksum_adjustment,
            font.table::<Head>().unwrap().unwrap().checksum_adjustment
        );
    }

    #[test]
    fn round_trip() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut font = test_font();
        let bytes = font.to_bytes().unwrap();
        let mut reread = Font::read(&bytes).unwrap();

        assert_eq!(reread.tags().collect::<Vec<_>>(), font.tags().collect::<Vec<_>>());
        for tag in ["head", "hhea", "hmtx", "loca", "maxp", "name", "post"] {
            let tag = Tag::new(tag.as_bytes().try_into().unwrap());
            assert_eq!(reread.get(tag).unwrap(), font.get(tag).unwrap(), "{tag}");
        }
        let cmap = reread.table::<Cmap>().unwrap().unwrap();
        assert_eq!(cmap.map_codepoint(0x41), Some(GlyphId::new(10)));

        reread.table_mut::<Glyf>().unwrap().unwrap().parse_all().unwrap();
        assert_eq!(reread.table::<Glyf>().unwrap(), font.table::<Glyf>().unwrap());
        // the second write of an unchanged font is identical
        assert_eq!(reread.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn loca_is_regenerated_from_glyf() {
        let mut font = test_font();
        assert!(!font.contains(Loca::TAG));
        font.to_bytes().unwrap();
        let loca = font.table::<Loca>().unwrap().unwrap();
        assert_eq!(loca.format(), LocaFormat::Short);
        assert_eq!(loca.offsets(), &[0, 0, 18]);
        assert_eq!(font.table::<Head>().unwrap().unwrap().index_to_loc_format, 0);
    }

    #[test]
    fn metric_count_follows_hmtx() {
        let mut font = Font::new();
        font.add_table(Maxp {
            num_glyphs: 5,
            ..Default::default()
        })
        .add_table(Hhea {
            number_of_h_metrics: 2,
            ..Default::default()
        })
        .add_table(Hmtx::new(
            vec![LongMetric::new(500, 10), LongMetric::new(600, 20)],
            vec![-5, 30, 40],
        ));
        let hmtx = font.table_mut::<Hmtx>().unwrap().unwrap();
        assert!(hmtx.set_metric(GlyphId::new(3), 700, 2));

        let bytes = font.to_bytes().unwrap();
        assert_eq!(
            font.table::<Hhea>().unwrap().unwrap().number_of_h_metrics,
            5
        );
        let reread = Font::read(&bytes).unwrap();
        assert_eq!(
            reread.table::<Hhea>().unwrap().unwrap().number_of_h_metrics,
            5
        );
        let hmtx = reread.table::<Hmtx>().unwrap().unwrap();
        assert_eq!(hmtx.advance(GlyphId::new(3)), 700);
        assert_eq!(Some(hmtx), font.table::<Hmtx>().unwrap());
    }

    #[test]
    fn glyph_count_follows_glyf() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut font = test_font();
        let glyph = Glyph::read(FontData::new(&sfnt_test_data::glyf::two_point_glyph())).unwrap();
        let glyf = font.table_mut::<Glyf>().unwrap().unwrap();
        assert!(glyf.set_glyph(GlyphId::new(2), Some(glyph)));

        let bytes = font.to_bytes().unwrap();
        let reread = Font::read(&bytes).unwrap();
        assert_eq!(reread.table::<Maxp>().unwrap().unwrap().num_glyphs, 3);
        assert_eq!(reread.table::<Loca>().unwrap().unwrap().offsets(), &[0, 0, 18, 36]);
        assert_eq!(reread.table::<Glyf>().unwrap().unwrap().num_glyphs(), 3);
    }

    #[test]
    fn lazy_access_resolves_dependencies() {
        let bytes = test_font().to_bytes().unwrap();
        let font = Font::read(&bytes).unwrap();
        let glyf = font.table::<Glyf>().unwrap().unwrap();
        assert_eq!(glyf.num_glyphs(), 2);
        assert!(!glyf.is_parsed(GlyphId::new(1)));
        // parsing glyf parsed loca, and loca parsed head and maxp
        assert!(font.tables[&Loca::TAG].parsed.get().is_some());
        assert!(font.tables[&Head::TAG].parsed.get().is_some());
        assert!(font.tables[&Hhea::TAG].parsed.get().is_none());

        let hmtx = font.table::<Hmtx>().unwrap().unwrap();
        assert_eq!(hmtx.advance(GlyphId::new(1)), 600);
        assert_eq!(hmtx.side_bearing(GlyphId::new(1)), Some(10));
    }

    #[test]
    fn missing_dependency() {
        let mut font = Font::new();
        font.add_table(Maxp::default()).add_raw(Loca::TAG, [0u8, 0]);
        assert_eq!(
            font.table::<Loca>(),
            Err(ReadError::TableIsMissing(Head::TAG))
        );
    }

    #[test]
    fn names() {
        let font = test_font();
        let mut names = font.names().unwrap();
        names.sort();
        names.dedup();
        assert_eq!(names, ["Bold", "Demo"]);
        assert!(Font::new().names().unwrap().is_empty());
    }

    #[test]
    fn add_and_remove() {
        let mut font = test_font();
        assert!(font.remove_table(Post::TAG));
        assert!(!font.remove_table(Post::TAG));
        assert!(font.table::<Post>().unwrap().is_none());
        font.add_raw(Tag::new(b"DSIG"), [0u8, 0, 0, 1]);
        assert_eq!(font.data_for_tag(Tag::new(b"DSIG")), Some([0u8, 0, 0, 1].as_slice()));
        assert_eq!(font.data_for_tag(Head::TAG), None);
    }

    #[test]
    fn invalid_tables_are_not_written() {
        let mut font = Font::new();
        let mut post = Post::default();
        let long_name = "a".repeat(300);
        post.set_glyph_names([long_name.as_str()]);
        font.add_table(post);
        assert!(matches!(
            font.to_bytes(),
            Err(Error::ValidationFailed { tag, .. }) if tag == Post::TAG
        ));
    }

    #[test]
    fn bad_directory() {
        assert_eq!(
            Font::read(b"wOFF\0\0\0\0\0\0\0\0").unwrap_err(),
            ReadError::InvalidSfnt(0x774F4646)
        );
        let mut font = Font::new();
        font.add_raw(Tag::new(b"abcd"), [1u8, 2, 3, 4]);
        let bytes = font.to_bytes().unwrap();
        assert_eq!(
            Font::read(&bytes[..bytes.len() - 1]).unwrap_err(),
            ReadError::TruncatedData
        );
    }

    #[test]
    fn checksum_mismatch_is_not_fatal() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut font = Font::new();
        font.add_raw(Tag::new(b"abcd"), [1u8, 2, 3, 4]);
        let mut bytes = font.to_bytes().unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 0xff;
        let font = Font::read(&bytes).unwrap();
        assert_eq!(font.data_for_tag(Tag::new(b"abcd")), Some([1u8, 2, 3, 0xff].as_slice()));
    }
}
