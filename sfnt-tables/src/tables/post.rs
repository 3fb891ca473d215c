//! The [post (PostScript)](https://docs.microsoft.com/en-us/typography/opentype/spec/post#header) table

use std::collections::HashMap;

use sfnt_types::{Fixed, GlyphId, Tag, Version16Dot16};

use crate::{
    read::{FontRead, ReadError, TopLevelTable},
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
    FontData,
};

/// The [post] table.
///
/// The table version is determined by how glyph names are stored; see
/// [`PostNames`].
///
/// [post]: https://docs.microsoft.com/en-us/typography/opentype/spec/post
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Post {
    pub italic_angle: Fixed,
    pub underline_position: i16,
    pub underline_thickness: i16,
    /// Non-zero if the font is monospaced.
    pub is_fixed_pitch: u32,
    pub min_mem_type42: u32,
    pub max_mem_type42: u32,
    pub min_mem_type1: u32,
    pub max_mem_type1: u32,
    pub names: PostNames,
}

/// How a post table names its glyphs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PostNames {
    /// Version 1.0: glyphs use the 258 standard Macintosh names, in order.
    Standard,
    /// Version 2.0: an index per glyph into the standard names followed
    /// by `strings`.
    ///
    /// Name bytes are mapped one to one onto the first 256 code points, so
    /// names that are not ASCII survive a round trip unchanged.
    Custom {
        glyph_name_index: Vec<u16>,
        strings: Vec<String>,
    },
    /// Version 3.0: no glyph names.
    #[default]
    None,
    /// Any other version, with its payload kept verbatim.
    Other {
        version: Version16Dot16,
        data: Vec<u8>,
    },
}

impl Post {
    /// The size of the header shared by every version.
    pub const HEADER_LEN: usize = 32;

    pub fn version(&self) -> Version16Dot16 {
        match &self.names {
            PostNames::Standard => Version16Dot16::VERSION_1_0,
            PostNames::Custom { .. } => Version16Dot16::VERSION_2_0,
            PostNames::None => Version16Dot16::VERSION_3_0,
            PostNames::Other { version, .. } => *version,
        }
    }

    /// The number of glyphs that have names.
    pub fn num_names(&self) -> usize {
        match &self.names {
            PostNames::Standard => DEFAULT_GLYPH_NAMES.len(),
            PostNames::Custom {
                glyph_name_index, ..
            } => glyph_name_index.len(),
            PostNames::None | PostNames::Other { .. } => 0,
        }
    }

    pub fn glyph_name(&self, gid: GlyphId) -> Option<&str> {
        let gid = gid.to_u16() as usize;
        match &self.names {
            PostNames::Standard => DEFAULT_GLYPH_NAMES.get(gid).copied(),
            PostNames::Custom {
                glyph_name_index,
                strings,
            } => {
                let idx = *glyph_name_index.get(gid)? as usize;
                match idx.checked_sub(DEFAULT_GLYPH_NAMES.len()) {
                    None => DEFAULT_GLYPH_NAMES.get(idx).copied(),
                    Some(idx) => strings.get(idx).map(String::as_str),
                }
            }
            PostNames::None | PostNames::Other { .. } => None,
        }
    }

    /// The first glyph with this name.
    pub fn glyph_id(&self, name: &str) -> Option<GlyphId> {
        let gid = match &self.names {
            PostNames::Standard => DEFAULT_GLYPH_NAMES.iter().position(|n| *n == name)?,
            PostNames::Custom {
                glyph_name_index,
                strings,
            } => {
                let idx = match DEFAULT_GLYPH_NAMES.iter().position(|n| *n == name) {
                    Some(idx) => idx,
                    None => DEFAULT_GLYPH_NAMES.len() + strings.iter().position(|s| s == name)?,
                };
                glyph_name_index
                    .iter()
                    .position(|entry| *entry as usize == idx)?
            }
            PostNames::None | PostNames::Other { .. } => return None,
        };
        u16::try_from(gid).ok().map(GlyphId::new)
    }

    /// Set the glyph names, given in glyph order.
    ///
    /// This switches the table to version 2.0. Standard names are stored
    /// as indices, and a repeated custom name is stored once.
    pub fn set_glyph_names<'a>(&mut self, order: impl IntoIterator<Item = &'a str>) {
        let mut known: HashMap<&str, u16> = DEFAULT_GLYPH_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, i as u16))
            .collect();
        let mut glyph_name_index = Vec::new();
        let mut strings = Vec::new();
        for name in order {
            let next_idx = (DEFAULT_GLYPH_NAMES.len() + strings.len()) as u16;
            let idx = *known.entry(name).or_insert_with(|| {
                strings.push(name.to_string());
                next_idx
            });
            glyph_name_index.push(idx);
        }
        self.names = PostNames::Custom {
            glyph_name_index,
            strings,
        };
    }
}

impl Default for Post {
    fn default() -> Self {
        Post {
            italic_angle: Fixed::ZERO,
            underline_position: 0,
            underline_thickness: 0,
            is_fixed_pitch: 0,
            min_mem_type42: 0,
            max_mem_type42: 0,
            min_mem_type1: 0,
            max_mem_type1: 0,
            names: PostNames::None,
        }
    }
}

impl TopLevelTable for Post {
    const TAG: Tag = Tag::new(b"post");
}

impl FontRead for Post {
    fn read(data: FontData) -> Result<Self, ReadError> {
        if data.len() < Self::HEADER_LEN {
            return Err(ReadError::MalformedTable {
                tag: Self::TAG,
                expected: Self::HEADER_LEN,
                actual: data.len(),
            });
        }
        let mut cursor = data.cursor();
        let version: Version16Dot16 = cursor.read()?;
        let mut post = Post {
            italic_angle: cursor.read()?,
            underline_position: cursor.read()?,
            underline_thickness: cursor.read()?,
            is_fixed_pitch: cursor.read()?,
            min_mem_type42: cursor.read()?,
            max_mem_type42: cursor.read()?,
            min_mem_type1: cursor.read()?,
            max_mem_type1: cursor.read()?,
            names: PostNames::None,
        };
        post.names = match version {
            Version16Dot16::VERSION_1_0 => PostNames::Standard,
            Version16Dot16::VERSION_2_0 => read_custom_names(&mut cursor)?,
            Version16Dot16::VERSION_3_0 => PostNames::None,
            version => {
                log::debug!("keeping names of post version {version:?} unparsed");
                PostNames::Other {
                    version,
                    data: cursor.remaining().as_bytes().to_vec(),
                }
            }
        };
        Ok(post)
    }
}

fn read_custom_names(cursor: &mut crate::Cursor) -> Result<PostNames, ReadError> {
    let num_glyphs: u16 = cursor.read()?;
    let glyph_name_index: Vec<u16> = cursor.read_array(num_glyphs as usize)?;
    let mut strings = Vec::new();
    while cursor.has_room_for::<u8>() {
        let len: u8 = cursor.read()?;
        let bytes = cursor.read_bytes(len as usize)?;
        strings.push(bytes.iter().copied().map(char::from).collect());
    }
    let n_names = DEFAULT_GLYPH_NAMES.len() + strings.len();
    if let Some(bad) = glyph_name_index.iter().find(|idx| **idx as usize >= n_names) {
        log::warn!("post glyph name index {bad} is out of range ({n_names} names)");
    }
    Ok(PostNames::Custom {
        glyph_name_index,
        strings,
    })
}

impl FontWrite for Post {
    fn write_into(&self, writer: &mut TableWriter) {
        self.version().write_into(writer);
        self.italic_angle.write_into(writer);
        self.underline_position.write_into(writer);
        self.underline_thickness.write_into(writer);
        self.is_fixed_pitch.write_into(writer);
        self.min_mem_type42.write_into(writer);
        self.max_mem_type42.write_into(writer);
        self.min_mem_type1.write_into(writer);
        self.max_mem_type1.write_into(writer);
        match &self.names {
            PostNames::Standard | PostNames::None => (),
            PostNames::Custom {
                glyph_name_index,
                strings,
            } => {
                (glyph_name_index.len() as u16).write_into(writer);
                glyph_name_index.write_into(writer);
                for string in strings {
                    let bytes = name_bytes(string);
                    (bytes.len() as u8).write_into(writer);
                    writer.write_slice(&bytes);
                }
            }
            PostNames::Other { data, .. } => writer.write_slice(data),
        }
    }

    fn compute_length(&self) -> usize {
        Self::HEADER_LEN
            + match &self.names {
                PostNames::Standard | PostNames::None => 0,
                PostNames::Custom {
                    glyph_name_index,
                    strings,
                } => {
                    2 + 2 * glyph_name_index.len()
                        + strings.iter().map(|s| 1 + s.chars().count()).sum::<usize>()
                }
                PostNames::Other { data, .. } => data.len(),
            }
    }
}

impl Validate for Post {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        ctx.in_table("post", |ctx| {
            if let PostNames::Custom {
                glyph_name_index,
                strings,
            } = &self.names
            {
                ctx.in_field("glyph_name_index", |ctx| {
                    if glyph_name_index.len() > u16::MAX as usize {
                        ctx.report("too many glyphs");
                    }
                    let n_names = DEFAULT_GLYPH_NAMES.len() + strings.len();
                    if glyph_name_index.iter().any(|idx| *idx as usize >= n_names) {
                        ctx.report("index refers to a missing name");
                    }
                });
                ctx.in_field("strings", |ctx| {
                    for (i, string) in strings.iter().enumerate() {
                        ctx.in_item(i, |ctx| {
                            if string.chars().count() > u8::MAX as usize {
                                ctx.report("name exceeds 255 bytes");
                            }
                            if string.chars().any(|c| u8::try_from(c).is_err()) {
                                ctx.report("name has characters above U+00FF");
                            }
                        });
                    }
                });
            }
        })
    }
}

/// One byte per character; characters past U+00FF fail validation.
fn name_bytes(name: &str) -> Vec<u8> {
    name.chars()
        .map(|c| u8::try_from(c).unwrap_or(b'?'))
        .collect()
}

/// The standard Macintosh glyph names.
#[rustfmt::skip]
pub const DEFAULT_GLYPH_NAMES: [&str; 258] = [
    ".notdef", ".null", "nonmarkingreturn", "space", "exclam", "quotedbl", "numbersign", "dollar",
    "percent", "ampersand", "quotesingle", "parenleft", "parenright", "asterisk", "plus", "comma",
    "hyphen", "period", "slash", "zero", "one", "two", "three", "four", "five", "six", "seven",
    "eight", "nine", "colon", "semicolon", "less", "equal", "greater", "question", "at", "A", "B",
    "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U",
    "V", "W", "X", "Y", "Z", "bracketleft", "backslash", "bracketright", "asciicircum",
    "underscore", "grave", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n",
    "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "braceleft", "bar", "braceright",
    "asciitilde", "Adieresis", "Aring", "Ccedilla", "Eacute", "Ntilde", "Odieresis", "Udieresis",
    "aacute", "agrave", "acircumflex", "adieresis", "atilde", "aring", "ccedilla", "eacute",
    "egrave", "ecircumflex", "edieresis", "iacute", "igrave", "icircumflex", "idieresis", "ntilde",
    "oacute", "ograve", "ocircumflex", "odieresis", "otilde", "uacute", "ugrave", "ucircumflex",
    "udieresis", "dagger", "degree", "cent", "sterling", "section", "bullet", "paragraph",
    "germandbls", "registered", "copyright", "trademark", "acute", "dieresis", "notequal", "AE",
    "Oslash", "infinity", "plusminus", "lessequal", "greaterequal", "yen", "mu", "partialdiff",
    "summation", "product", "pi", "integral", "ordfeminine", "ordmasculine", "Omega", "ae",
    "oslash", "questiondown", "exclamdown", "logicalnot", "radical", "florin", "approxequal",
    "Delta", "guillemotleft", "guillemotright", "ellipsis", "nonbreakingspace", "Agrave", "Atilde",
    "Otilde", "OE", "oe", "endash", "emdash", "quotedblleft", "quotedblright", "quoteleft",
    "quoteright", "divide", "lozenge", "ydieresis", "Ydieresis", "fraction", "currency",
    "guilsinglleft", "guilsinglright", "fi", "fl", "daggerdbl", "periodcentered", "quotesinglbase",
    "quotedblbase", "perthousand", "Acircumflex", "Ecircumflex", "Aacute", "Edieresis", "Egrave",
    "Iacute", "Icircumflex", "Idieresis", "Igrave", "Oacute", "Ocircumflex", "apple", "Ograve",
    "Uacute", "Ucircumflex", "Ugrave", "dotlessi", "circumflex", "tilde", "macron", "breve",
    "dotaccent", "ring", "cedilla", "hungarumlaut", "ogonek", "caron", "Lslash", "lslash",
    "Scaron", "scaron", "Zcaron", "zcaron", "brokenbar", "Eth", "eth", "Yacute", "yacute", "Thorn",
    "thorn", "minus", "multiply", "onesuperior", "twosuperior", "threesuperior", "onehalf",
    "onequarter", "threequarters", "franc", "Gbreve", "gbreve", "Idotaccent", "Scedilla",
    "scedilla", "Cacute", "cacute", "Ccaron", "ccaron", "dcroat",
];
