//! The [name (Naming)](https://docs.microsoft.com/en-us/typography/opentype/spec/name) table

use std::collections::BTreeMap;

use sfnt_types::{NameId, Tag};

use crate::{
    read::{FontRead, ReadError, TopLevelTable},
    tables::platform_id,
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

const HEADER_LEN: usize = 6;
const NAME_RECORD_LEN: usize = 12;

/// The [name] table.
///
/// Strings are stored decoded, keyed by [`NameKey`]. Records are written in
/// key order, and the table is always written as format 0.
///
/// [name]: https://docs.microsoft.com/en-us/typography/opentype/spec/name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name {
    #[cfg_attr(feature = "serde", serde(with = "record_list"))]
    records: BTreeMap<NameKey, String>,
}

/// The identifying fields of a name record.
///
/// The derived ordering (platform, then encoding, then language, then name
/// id) is the order records must appear in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameKey {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: NameId,
}

/// The on-disk encoding of a record's string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Utf16Be,
    Ascii,
}

impl NameKey {
    pub fn new(platform_id: u16, encoding_id: u16, language_id: u16, name_id: NameId) -> Self {
        NameKey {
            platform_id,
            encoding_id,
            language_id,
            name_id,
        }
    }

    pub fn encoding(&self) -> Encoding {
        Encoding::new(self.platform_id, self.encoding_id)
    }
}

impl Encoding {
    /// The encoding used for strings on this platform.
    ///
    /// Unicode and Windows strings are UTF-16BE; every other platform is
    /// treated as ASCII.
    pub fn new(platform_id: u16, _encoding_id: u16) -> Self {
        match platform_id {
            platform_id::UNICODE | platform_id::WINDOWS => Encoding::Utf16Be,
            _ => Encoding::Ascii,
        }
    }

    /// Decode string data.
    ///
    /// Invalid input becomes U+FFFD; a trailing odd byte in UTF-16 data is
    /// dropped.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    log::warn!("odd length ({}) for UTF-16 name string", bytes.len());
                }
                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            }
            Encoding::Ascii => bytes
                .iter()
                .map(|b| match b {
                    0..=0x7F => *b as char,
                    _ => char::REPLACEMENT_CHARACTER,
                })
                .collect(),
        }
    }

    /// The number of bytes `s` occupies in this encoding.
    pub fn encoded_len(self, s: &str) -> usize {
        match self {
            Encoding::Utf16Be => s.chars().map(|c| c.len_utf16() * 2).sum(),
            Encoding::Ascii => s.chars().count(),
        }
    }

    /// Encode `s`; characters outside ASCII are written as `?` in ASCII data.
    pub fn encode(self, s: &str, writer: &mut TableWriter) {
        match self {
            Encoding::Utf16Be => {
                for unit in s.encode_utf16() {
                    unit.write_into(writer);
                }
            }
            Encoding::Ascii => {
                if !s.is_ascii() {
                    log::warn!("replacing non-ASCII characters in '{s}'");
                }
                for c in s.chars() {
                    let byte = if c.is_ascii() { c as u8 } else { b'?' };
                    byte.write_into(writer);
                }
            }
        }
    }
}

impl Name {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, returning the string it replaces.
    pub fn add_record(&mut self, key: NameKey, value: impl Into<String>) -> Option<String> {
        self.records.insert(key, value.into())
    }

    pub fn get_record(&self, key: NameKey) -> Option<&str> {
        self.records.get(&key).map(String::as_str)
    }

    pub fn remove_record(&mut self, key: NameKey) -> Option<String> {
        self.records.remove(&key)
    }

    /// `true` if any record is for this platform.
    pub fn has_records(&self, platform_id: u16) -> bool {
        self.records.keys().any(|key| key.platform_id == platform_id)
    }

    /// `true` if any record is for this platform and encoding.
    pub fn has_records_for_encoding(&self, platform_id: u16, encoding_id: u16) -> bool {
        self.records
            .keys()
            .any(|key| key.platform_id == platform_id && key.encoding_id == encoding_id)
    }

    /// All strings, in record order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.values().map(String::as_str)
    }

    /// All records, in key order.
    pub fn records(&self) -> impl Iterator<Item = (NameKey, &str)> + '_ {
        self.records.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn storage_offset(&self) -> usize {
        HEADER_LEN + NAME_RECORD_LEN * self.records.len()
    }
}

impl TopLevelTable for Name {
    const TAG: Tag = Tag::new(b"name");
}

impl FontRead for Name {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format > 1 {
            return Err(ReadError::InvalidFormat(format.into()));
        }
        let count: u16 = cursor.read()?;
        let storage_offset = cursor.read::<u16>()? as usize;
        let mut records = BTreeMap::new();
        for _ in 0..count {
            let key = NameKey {
                platform_id: cursor.read()?,
                encoding_id: cursor.read()?,
                language_id: cursor.read()?,
                name_id: cursor.read()?,
            };
            let length = cursor.read::<u16>()? as usize;
            let offset = cursor.read::<u16>()? as usize;
            let bytes = data.read_bytes(storage_offset + offset, length)?;
            if records.insert(key, key.encoding().decode(bytes)).is_some() {
                log::warn!("duplicate name record {key:?}, keeping the last");
            }
        }
        // format 1 language-tag records follow; their strings are dropped,
        // and records that refer to them keep their raw language ids
        Ok(Name { records })
    }
}

impl FontWrite for Name {
    fn write_into(&self, writer: &mut TableWriter) {
        0u16.write_into(writer);
        (self.records.len() as u16).write_into(writer);
        (self.storage_offset() as u16).write_into(writer);
        let mut offset = 0;
        for (key, value) in &self.records {
            let len = key.encoding().encoded_len(value);
            key.platform_id.write_into(writer);
            key.encoding_id.write_into(writer);
            key.language_id.write_into(writer);
            key.name_id.write_into(writer);
            (len as u16).write_into(writer);
            (offset as u16).write_into(writer);
            offset += len;
        }
        for (key, value) in &self.records {
            key.encoding().encode(value, writer);
        }
    }

    fn compute_length(&self) -> usize {
        self.storage_offset()
            + self
                .records
                .iter()
                .map(|(key, value)| key.encoding().encoded_len(value))
                .sum::<usize>()
    }
}

impl Validate for Name {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("name", |ctx| {
            ctx.in_field("name_record", |ctx| {
                if self.records.len() > u16::MAX as usize {
                    ctx.report("too many name records");
                }
                let mut offset = 0;
                for (i, (key, value)) in self.records.iter().enumerate() {
                    let len = key.encoding().encoded_len(value);
                    ctx.in_item(i, |ctx| {
                        if offset > u16::MAX as usize || len > u16::MAX as usize {
                            ctx.report(format!(
                                "string for {key:?} does not fit in 16-bit string storage"
                            ));
                        }
                    });
                    offset += len;
                }
            });
            if self.storage_offset() > u16::MAX as usize {
                ctx.report("storage offset overflows");
            }
        })
    }
}

// struct keys are not valid map keys in most human-readable formats
#[cfg(feature = "serde")]
mod record_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::NameKey;

    #[derive(Serialize, Deserialize)]
    struct Record {
        #[serde(flatten)]
        key: NameKey,
        string: String,
    }

    pub(super) fn serialize<S: Serializer>(
        map: &BTreeMap<NameKey, String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        map.iter()
            .map(|(key, string)| Record {
                key: *key,
                string: string.clone(),
            })
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<NameKey, String>, D::Error> {
        Ok(Vec::<Record>::deserialize(deserializer)?
            .into_iter()
            .map(|rec| (rec.key, rec.string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::dump_table;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const WIN_FAMILY: NameKey = NameKey {
        platform_id: platform_id::WINDOWS,
        encoding_id: 1,
        language_id: 0x409,
        name_id: NameId::FAMILY_NAME,
    };
    const MAC_FAMILY: NameKey = NameKey {
        platform_id: platform_id::MACINTOSH,
        encoding_id: 0,
        language_id: 0,
        name_id: NameId::FAMILY_NAME,
    };

    #[test]
    fn read_records() {
        let buf = sfnt_test_data::name::name_table();
        let name = Name::read(FontData::new(&buf)).unwrap();
        assert_eq!(name.len(), 3);
        assert_eq!(name.get_record(MAC_FAMILY), Some("Demo"));
        assert_eq!(name.get_record(WIN_FAMILY), Some("Demo"));
        assert_eq!(
            name.get_record(NameKey {
                name_id: NameId::SUBFAMILY_NAME,
                ..WIN_FAMILY
            }),
            Some("Bold")
        );
        assert_eq!(name.names().collect::<Vec<_>>(), ["Demo", "Demo", "Bold"]);
    }

    #[test]
    fn roundtrip_is_byte_exact() {
        let buf = sfnt_test_data::name::name_table();
        let name = Name::read(FontData::new(&buf)).unwrap();
        assert_eq!(dump_table(&name).unwrap(), buf.data());
    }

    #[rstest]
    #[case::windows(platform_id::WINDOWS, Encoding::Utf16Be, 14)]
    #[case::unicode(platform_id::UNICODE, Encoding::Utf16Be, 14)]
    #[case::mac(platform_id::MACINTOSH, Encoding::Ascii, 7)]
    #[case::custom(platform_id::CUSTOM, Encoding::Ascii, 7)]
    fn charset_follows_platform(
        #[case] platform: u16,
        #[case] encoding: Encoding,
        #[case] len: usize,
    ) {
        let key = NameKey::new(platform, 1, 0, NameId::FULL_NAME);
        assert_eq!(key.encoding(), encoding);

        let mut name = Name::new();
        name.add_record(key, "Regular");
        let bytes = dump_table(&name).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + NAME_RECORD_LEN + len);
        let read_back = Name::read(FontData::new(&bytes)).unwrap();
        assert_eq!(read_back.get_record(key), Some("Regular"));
    }

    #[test]
    fn non_ascii_in_ascii_record() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut name = Name::new();
        name.add_record(MAC_FAMILY, "Café");
        name.add_record(WIN_FAMILY, "Café");
        let bytes = dump_table(&name).unwrap();
        let read_back = Name::read(FontData::new(&bytes)).unwrap();
        assert_eq!(read_back.get_record(MAC_FAMILY), Some("Caf?"));
        assert_eq!(read_back.get_record(WIN_FAMILY), Some("Café"));

        assert_eq!(Encoding::Ascii.decode(&[b'a', 0xE9]), "a\u{FFFD}");
    }

    #[test]
    fn utf16_surrogates() {
        let mut name = Name::new();
        name.add_record(WIN_FAMILY, "a𝄞");
        assert_eq!(name.compute_length(), HEADER_LEN + NAME_RECORD_LEN + 6);
        let bytes = dump_table(&name).unwrap();
        assert_eq!(&bytes[18..], &[0, b'a', 0xD8, 0x34, 0xDD, 0x1E]);
        let read_back = Name::read(FontData::new(&bytes)).unwrap();
        assert_eq!(read_back, name);
    }

    #[test]
    fn format_1_is_written_as_format_0() {
        let buf = sfnt_test_data::name::name_table_format_1();
        let name = Name::read(FontData::new(&buf)).unwrap();
        let key = NameKey::new(3, 1, 0x8000, NameId::FAMILY_NAME);
        assert_eq!(name.records().collect::<Vec<_>>(), [(key, "Ab")]);
        let bytes = dump_table(&name).unwrap();
        assert_eq!(&bytes[..6], &[0, 0, 0, 1, 0, 18]);
        assert_eq!(Name::read(FontData::new(&bytes)).unwrap(), name);
    }

    #[test]
    fn record_queries() {
        let mut name = Name::new();
        assert!(!name.has_records(platform_id::WINDOWS));
        name.add_record(WIN_FAMILY, "One");
        assert_eq!(name.add_record(WIN_FAMILY, "Two"), Some("One".to_string()));
        assert!(name.has_records(platform_id::WINDOWS));
        assert!(name.has_records_for_encoding(platform_id::WINDOWS, 1));
        assert!(!name.has_records_for_encoding(platform_id::WINDOWS, 10));
        assert!(!name.has_records(platform_id::MACINTOSH));
        assert_eq!(name.remove_record(WIN_FAMILY), Some("Two".to_string()));
        assert!(name.is_empty());
    }

    #[test]
    fn string_out_of_bounds() {
        let buf = sfnt_test_data::name::name_table();
        assert_eq!(
            Name::read(FontData::new(&buf[..50])),
            Err(ReadError::TruncatedData)
        );
    }

    #[test]
    fn bad_format() {
        let buf = sfnt_test_data::be_buffer! { 2u16, 0u16, 6u16 };
        assert_eq!(
            Name::read(FontData::new(&buf)),
            Err(ReadError::InvalidFormat(2))
        );
    }
}
