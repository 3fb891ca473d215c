//! Name Identifiers
//!
//! These are plain u16s on disk; a distinct type keeps them from being
//! confused with the platform, encoding and language ids they travel with.

use std::fmt;

/// Identifier for a string in the `name` table.
///
/// IDs 0 to 25 are predefined; 26 to 255 are reserved and 256 to 32767 are
/// available for font-specific strings.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NameId(u16);

impl NameId {
    pub const COPYRIGHT_NOTICE: Self = Self(0);
    pub const FAMILY_NAME: Self = Self(1);
    pub const SUBFAMILY_NAME: Self = Self(2);
    pub const UNIQUE_ID: Self = Self(3);
    /// Full font name, usually family and subfamily joined.
    pub const FULL_NAME: Self = Self(4);
    pub const VERSION_STRING: Self = Self(5);
    /// PostScript name; restricted to printable ASCII without `[](){}<>/%`.
    pub const POSTSCRIPT_NAME: Self = Self(6);
    pub const TRADEMARK: Self = Self(7);
    pub const MANUFACTURER: Self = Self(8);
    pub const DESIGNER: Self = Self(9);
    pub const DESCRIPTION: Self = Self(10);
    pub const VENDOR_URL: Self = Self(11);
    pub const DESIGNER_URL: Self = Self(12);
    pub const LICENSE_DESCRIPTION: Self = Self(13);
    pub const LICENSE_URL: Self = Self(14);
    pub const TYPOGRAPHIC_FAMILY_NAME: Self = Self(16);
    pub const TYPOGRAPHIC_SUBFAMILY_NAME: Self = Self(17);
    /// Macintosh only.
    pub const COMPATIBLE_FULL_NAME: Self = Self(18);
    pub const SAMPLE_TEXT: Self = Self(19);
    pub const POSTSCRIPT_CID_NAME: Self = Self(20);
    pub const WWS_FAMILY_NAME: Self = Self(21);
    pub const WWS_SUBFAMILY_NAME: Self = Self(22);
    pub const LIGHT_BACKGROUND_PALETTE: Self = Self(23);
    pub const DARK_BACKGROUND_PALETTE: Self = Self(24);
    pub const VARIATIONS_POSTSCRIPT_NAME_PREFIX: Self = Self(25);

    /// Create a new identifier from a raw u16 value.
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns an iterator over the predefined identifiers.
    pub fn predefined() -> impl Iterator<Item = Self> + Clone {
        // 15 was never assigned
        (0..15).chain(16..=25).map(Self)
    }

    /// Return the identifier as a u16.
    pub const fn to_u16(self) -> u16 {
        self.0
    }
}

impl From<u16> for NameId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Debug for NameId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NameId({})", self.0)
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

crate::newtype_scalar!(NameId, [u8; 2]);

#[cfg(test)]
mod tests {
    use super::NameId;

    #[test]
    fn predefined_skips_fifteen() {
        let ids: Vec<_> = NameId::predefined().map(NameId::to_u16).collect();
        assert_eq!(ids.len(), 25);
        assert!(!ids.contains(&15));
        assert_eq!(ids.last(), Some(&25));
    }
}
