//! Lookups in the [Adobe Glyph List][agl]
//!
//! The list is parsed once per process on a background thread, started by
//! [`preload`] or by the first lookup. Lookups made while it is loading wait
//! for it to finish.
//!
//! Names the list does not contain can still be decoded with
//! [`glyph_name_to_unicode`], which understands ligatures, suffixes and the
//! `uniXXXX` and `uXXXX` forms.
//!
//! [agl]: https://github.com/adobe-type-tools/agl-aglfn

use std::{
    collections::HashMap,
    sync::{Once, OnceLock},
    thread,
};

static GLYPH_LIST_TEXT: &str = include_str!("../resources/glyphlist.txt");

/// A parsed glyph list: glyph names and the codepoints they stand for.
#[derive(Clone, Debug, Default)]
pub struct GlyphList<'a> {
    by_name: HashMap<&'a str, Vec<char>>,
    by_char: HashMap<char, &'a str>,
}

impl<'a> GlyphList<'a> {
    /// Parse text in the glyph list format, one `name;HEX[ HEX...]` entry
    /// per line.
    ///
    /// Empty lines and lines starting with `#` are ignored; malformed lines
    /// are skipped with a warning. When a name appears more than once, its
    /// first entry is kept. Every codepoint maps back to the last name that
    /// lists it.
    pub fn parse(text: &'a str) -> Self {
        let mut list = GlyphList::default();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, chars)) = parse_line(line) else {
                log::warn!("skipping malformed glyph list line {}: '{line}'", i + 1);
                continue;
            };
            for c in &chars {
                list.by_char.insert(*c, name);
            }
            list.by_name.entry(name).or_insert(chars);
        }
        log::debug!(
            "loaded {} glyph names for {} codepoints",
            list.by_name.len(),
            list.by_char.len()
        );
        list
    }

    /// The codepoints for a glyph name.
    pub fn unicode_values(&self, name: &str) -> Option<&[char]> {
        self.by_name.get(name).map(Vec::as_slice)
    }

    /// The glyph name for a codepoint.
    pub fn glyph_name(&self, c: char) -> Option<&'a str> {
        self.by_char.get(&c).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

fn parse_line(line: &str) -> Option<(&str, Vec<char>)> {
    let (name, codes) = line.split_once(';')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let chars = codes
        .split_whitespace()
        .map(|hex| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32))
        .collect::<Option<Vec<_>>>()?;
    (!chars.is_empty()).then_some((name, chars))
}

fn glyph_list() -> &'static GlyphList<'static> {
    static GLYPH_LIST: OnceLock<GlyphList<'static>> = OnceLock::new();
    GLYPH_LIST.get_or_init(|| GlyphList::parse(GLYPH_LIST_TEXT))
}

/// Start loading the bundled glyph list on a background thread.
///
/// Only the first call starts a thread; lookups call this themselves. If the
/// thread cannot be spawned, the list is loaded by the waiting lookup
/// instead.
pub fn preload() {
    static PRELOAD: Once = Once::new();
    PRELOAD.call_once(|| {
        let spawned = thread::Builder::new()
            .name("glyph-list-loader".to_string())
            .spawn(|| {
                glyph_list();
            });
        if let Err(e) = spawned {
            log::warn!("failed to spawn glyph list loader: {e}");
        }
    });
}

fn loaded_glyph_list() -> &'static GlyphList<'static> {
    preload();
    glyph_list()
}

/// The codepoints the bundled glyph list gives for `name`.
pub fn unicode_values(name: &str) -> Option<&'static [char]> {
    loaded_glyph_list().unicode_values(name)
}

/// The name the bundled glyph list gives for `c`.
pub fn glyph_name(c: char) -> Option<&'static str> {
    loaded_glyph_list().glyph_name(c)
}

/// Decode any glyph name to the characters it stands for.
///
/// Everything after the first `.` is ignored, and `_` separates the
/// components of a ligature. Each component is looked up in the glyph list,
/// or else read as `uniXXXX[XXXX...]` or `uXXXX[XX]`. Components that match
/// none of these are dropped, so `f_UNKNOWN` decodes to `f`.
pub fn glyph_name_to_unicode(name: &str) -> Vec<char> {
    let base = name.split_once('.').map_or(name, |(base, _)| base);
    base.split('_').flat_map(component_to_unicode).collect()
}

fn component_to_unicode(component: &str) -> Vec<char> {
    if let Some(chars) = unicode_values(component) {
        return chars.to_vec();
    }
    uni_sequence(component)
        .or_else(|| u_value(component).map(|c| vec![c]))
        .unwrap_or_default()
}

fn is_upper_hex(digits: &str) -> bool {
    digits
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
}

/// `uni` followed by one or more groups of four uppercase hex digits.
fn uni_sequence(component: &str) -> Option<Vec<char>> {
    let digits = component.strip_prefix("uni")?;
    if digits.is_empty() || digits.len() % 4 != 0 || !is_upper_hex(digits) {
        return None;
    }
    (0..digits.len() / 4)
        .map(|i| {
            let value = u32::from_str_radix(&digits[i * 4..i * 4 + 4], 16).ok()?;
            // surrogates are not characters
            char::from_u32(value)
        })
        .collect()
}

/// `u` followed by four to six uppercase hex digits.
fn u_value(component: &str) -> Option<char> {
    let digits = component.strip_prefix('u')?;
    if !(4..=6).contains(&digits.len()) || !is_upper_hex(digits) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
}
