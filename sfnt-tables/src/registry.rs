//! Dispatch from table tags to table types

use sfnt_types::{InvalidTag, Tag};

use crate::{
    read::{FontRead, ReadError, TopLevelTable},
    tables::{
        cmap::Cmap, glyf::Glyf, head::Head, hhea::Hhea, hmtx::Hmtx, loca::Loca, maxp::Maxp,
        name::Name, post::Post, raw::RawTable,
    },
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

/// Any table, typed when its tag is known to this crate.
#[derive(Clone, Debug, PartialEq)]
pub enum Table {
    Cmap(Cmap),
    Glyf(Glyf),
    Head(Head),
    Hhea(Hhea),
    Hmtx(Hmtx),
    Loca(Loca),
    Maxp(Maxp),
    Name(Name),
    Post(Post),
    Raw(RawTable),
}

/// Already-parsed sibling tables, for tables whose layout depends on them.
///
/// `loca` needs `head` and `maxp`, `hmtx` needs `hhea` and `maxp`, and
/// `glyf` needs `loca` and `maxp`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TableContext<'a> {
    pub head: Option<&'a Head>,
    pub maxp: Option<&'a Maxp>,
    pub hhea: Option<&'a Hhea>,
    pub loca: Option<&'a Loca>,
}

/// A table type that can be stored in a [`Table`].
pub trait KnownTable: TopLevelTable + Into<Table> + Sized {
    /// The tags of the tables that must be parsed before this one.
    const DEPENDENCIES: &'static [Tag];

    fn read_in_context(data: FontData, ctx: &TableContext) -> Result<Self, ReadError>;

    fn from_table(table: &Table) -> Option<&Self>;

    fn from_table_mut(table: &mut Table) -> Option<&mut Self>;
}

impl<'a> TableContext<'a> {
    fn head(&self) -> Result<&'a Head, ReadError> {
        self.head.ok_or(ReadError::TableIsMissing(Head::TAG))
    }

    fn maxp(&self) -> Result<&'a Maxp, ReadError> {
        self.maxp.ok_or(ReadError::TableIsMissing(Maxp::TAG))
    }

    fn hhea(&self) -> Result<&'a Hhea, ReadError> {
        self.hhea.ok_or(ReadError::TableIsMissing(Hhea::TAG))
    }

    fn loca(&self) -> Result<&'a Loca, ReadError> {
        self.loca.ok_or(ReadError::TableIsMissing(Loca::TAG))
    }
}

macro_rules! known_table {
    ($variant:ident, $deps:expr, |$data:ident, $ctx:ident| $read:expr) => {
        impl KnownTable for $variant {
            const DEPENDENCIES: &'static [Tag] = $deps;

            fn read_in_context($data: FontData, $ctx: &TableContext) -> Result<Self, ReadError> {
                $read
            }

            fn from_table(table: &Table) -> Option<&Self> {
                match table {
                    Table::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_table_mut(table: &mut Table) -> Option<&mut Self> {
                match table {
                    Table::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$variant> for Table {
            fn from(src: $variant) -> Table {
                Table::$variant(src)
            }
        }
    };
}

known_table!(Cmap, &[], |data, _ctx| Cmap::read(data));
known_table!(Head, &[], |data, _ctx| Head::read(data));
known_table!(Hhea, &[], |data, _ctx| Hhea::read(data));
known_table!(Maxp, &[], |data, _ctx| Maxp::read(data));
known_table!(Name, &[], |data, _ctx| Name::read(data));
known_table!(Post, &[], |data, _ctx| Post::read(data));
known_table!(Loca, &[Head::TAG, Maxp::TAG], |data, ctx| {
    Loca::read(data, ctx.head()?, ctx.maxp()?)
});
known_table!(Hmtx, &[Hhea::TAG, Maxp::TAG], |data, ctx| {
    Hmtx::read(data, ctx.hhea()?, ctx.maxp()?)
});
known_table!(Glyf, &[Loca::TAG, Maxp::TAG], |data, ctx| {
    Glyf::read(data, ctx.loca()?, ctx.maxp()?)
});

impl From<RawTable> for Table {
    fn from(src: RawTable) -> Table {
        Table::Raw(src)
    }
}

impl Table {
    pub fn tag(&self) -> Tag {
        match self {
            Table::Cmap(_) => Cmap::TAG,
            Table::Glyf(_) => Glyf::TAG,
            Table::Head(_) => Head::TAG,
            Table::Hhea(_) => Hhea::TAG,
            Table::Hmtx(_) => Hmtx::TAG,
            Table::Loca(_) => Loca::TAG,
            Table::Maxp(_) => Maxp::TAG,
            Table::Name(_) => Name::TAG,
            Table::Post(_) => Post::TAG,
            Table::Raw(raw) => raw.tag(),
        }
    }

    /// The tables that must be parsed before a table with this tag.
    pub fn dependencies(tag: Tag) -> &'static [Tag] {
        if tag == Loca::TAG {
            Loca::DEPENDENCIES
        } else if tag == Hmtx::TAG {
            Hmtx::DEPENDENCIES
        } else if tag == Glyf::TAG {
            Glyf::DEPENDENCIES
        } else {
            &[]
        }
    }

    /// Parse the table with this tag; unknown tags become [`Table::Raw`].
    pub fn read(tag: Tag, data: FontData, ctx: &TableContext) -> Result<Table, ReadError> {
        Ok(match tag {
            tag if tag == Cmap::TAG => Cmap::read_in_context(data, ctx)?.into(),
            tag if tag == Glyf::TAG => Glyf::read_in_context(data, ctx)?.into(),
            tag if tag == Head::TAG => Head::read_in_context(data, ctx)?.into(),
            tag if tag == Hhea::TAG => Hhea::read_in_context(data, ctx)?.into(),
            tag if tag == Hmtx::TAG => Hmtx::read_in_context(data, ctx)?.into(),
            tag if tag == Loca::TAG => Loca::read_in_context(data, ctx)?.into(),
            tag if tag == Maxp::TAG => Maxp::read_in_context(data, ctx)?.into(),
            tag if tag == Name::TAG => Name::read_in_context(data, ctx)?.into(),
            tag if tag == Post::TAG => Post::read_in_context(data, ctx)?.into(),
            tag => RawTable::new(tag, data.as_bytes()).into(),
        })
    }

    /// A default-constructed table for this tag.
    pub fn empty(tag: Tag) -> Table {
        match tag {
            tag if tag == Cmap::TAG => Cmap::default().into(),
            tag if tag == Glyf::TAG => Glyf::default().into(),
            tag if tag == Head::TAG => Head::default().into(),
            tag if tag == Hhea::TAG => Hhea::default().into(),
            tag if tag == Hmtx::TAG => Hmtx::default().into(),
            tag if tag == Loca::TAG => Loca::default().into(),
            tag if tag == Maxp::TAG => Maxp::default().into(),
            tag if tag == Name::TAG => Name::default().into(),
            tag if tag == Post::TAG => Post::default().into(),
            tag => RawTable::new(tag, Vec::new()).into(),
        }
    }

    fn as_dyn(&self) -> &dyn WritableTable {
        match self {
            Table::Cmap(table) => table,
            Table::Glyf(table) => table,
            Table::Head(table) => table,
            Table::Hhea(table) => table,
            Table::Hmtx(table) => table,
            Table::Loca(table) => table,
            Table::Maxp(table) => table,
            Table::Name(table) => table,
            Table::Post(table) => table,
            Table::Raw(table) => table,
        }
    }
}

trait WritableTable: FontWrite + Validate {}

impl<T: FontWrite + Validate> WritableTable for T {}

impl FontWrite for Table {
    fn write_into(&self, writer: &mut TableWriter) {
        self.as_dyn().write_into(writer)
    }

    fn compute_length(&self) -> usize {
        self.as_dyn().compute_length()
    }
}

impl Validate for Table {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        self.as_dyn().validate_impl(ctx)
    }
}

/// Construct the table for `tag`, parsing `data` if it is provided.
///
/// Tables this crate does not know are kept as [`RawTable`]s. Without data,
/// the table is default-constructed.
pub fn create_table(
    ctx: &TableContext,
    tag: &str,
    data: Option<&[u8]>,
) -> Result<Table, ReadError> {
    let tag: Tag = tag.parse()?;
    match data {
        Some(bytes) => Table::read(tag, FontData::new(bytes), ctx),
        None => Ok(Table::empty(tag)),
    }
}

/// The four characters of a packed tag.
///
/// Bytes outside printable ASCII are shown escaped, as `{0xNN}`.
pub fn tag_to_string(tag: u32) -> String {
    Tag::from_u32(tag).to_string()
}

/// Pack a four character tag into a big-endian `u32`.
pub fn string_to_tag(tag: &str) -> Result<u32, InvalidTag> {
    tag.parse::<Tag>().map(Tag::to_u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;
    use pretty_assertions::assert_eq;
    use sfnt_types::GlyphId;

    #[test]
    fn tag_strings() {
        assert_eq!(string_to_tag("cmap"), Ok(0x636d6170));
        assert_eq!(tag_to_string(0x636d6170), "cmap");
        for tag in ["glyf", "OS/2", "cvt ", "hmtx"] {
            assert_eq!(tag_to_string(string_to_tag(tag).unwrap()), tag);
        }
        assert_eq!(string_to_tag("cvt"), Err(InvalidTag::InvalidLength(3)));
        assert_eq!(string_to_tag("glyph"), Err(InvalidTag::InvalidLength(5)));
    }

    #[test]
    fn create_without_data() {
        let ctx = TableContext::default();
        let table = create_table(&ctx, "maxp", None).unwrap();
        assert_eq!(table, Table::Maxp(Maxp::default()));
        let table = create_table(&ctx, "loca", None).unwrap();
        assert_eq!(table.tag(), Loca::TAG);
        assert!(matches!(
            create_table(&ctx, "max", None),
            Err(ReadError::InvalidTag(_))
        ));
    }

    #[test]
    fn unknown_tags_are_raw() {
        let data = [1u8, 2, 3];
        let table = create_table(&TableContext::default(), "DSIG", Some(&data[..])).unwrap();
        assert_eq!(table, Table::Raw(RawTable::new(Tag::new(b"DSIG"), [1u8, 2, 3])));
        assert_eq!(dump_table(&table).unwrap(), [1, 2, 3]);
    }

    #[test]
    fn dependent_tables_need_their_siblings() {
        let maxp = Maxp {
            num_glyphs: 3,
            ..Default::default()
        };
        let head = Head::default();
        let loca_bytes = [0u8, 0, 0, 5, 0, 5, 0, 15];

        let ctx = TableContext {
            maxp: Some(&maxp),
            ..Default::default()
        };
        assert_eq!(
            create_table(&ctx, "loca", Some(loca_bytes.as_slice())),
            Err(ReadError::TableIsMissing(Head::TAG))
        );

        let ctx = TableContext {
            head: Some(&head),
            maxp: Some(&maxp),
            ..Default::default()
        };
        let table = create_table(&ctx, "loca", Some(loca_bytes.as_slice())).unwrap();
        let loca = Loca::from_table(&table).unwrap();
        assert_eq!(loca.offsets(), &[0, 10, 10, 30]);
        assert_eq!(loca.size(GlyphId::new(1)), Some(0));
        assert_eq!(loca.size(GlyphId::new(2)), Some(20));
        assert!(Maxp::from_table(&table).is_none());
    }

    #[test]
    fn dependencies() {
        assert_eq!(Table::dependencies(Glyf::TAG), &[Loca::TAG, Maxp::TAG]);
        assert_eq!(Table::dependencies(Loca::TAG), &[Head::TAG, Maxp::TAG]);
        assert!(Table::dependencies(Name::TAG).is_empty());
    }
}
