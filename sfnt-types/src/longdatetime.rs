//! a datetime type

/// A simple datetime type.
///
/// This represented as a number of seconds since 12:00 midnight, January 1, 1904, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongDateTime(i64);

impl LongDateTime {
    /// Seconds between 1904-01-01 and the unix epoch.
    const UNIX_EPOCH_OFFSET: i64 = 2_082_844_800;

    /// Create with a number of seconds relative to 1904-01-01 00:00.
    pub const fn new(secs: i64) -> Self {
        Self(secs)
    }

    /// Create from a number of seconds since the unix epoch.
    pub const fn from_unix_secs(secs: i64) -> Self {
        Self(secs + Self::UNIX_EPOCH_OFFSET)
    }

    /// The number of seconds since 00:00 1904-01-01, UTC.
    ///
    /// This can be a negative number, which presumably represents a date prior
    /// to the reference date.
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// The number of seconds since the unix epoch.
    pub const fn to_unix_secs(&self) -> i64 {
        self.0 - Self::UNIX_EPOCH_OFFSET
    }
}

crate::newtype_scalar!(LongDateTime, [u8; 8]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_epoch() {
        assert_eq!(LongDateTime::from_unix_secs(0).as_secs(), 2_082_844_800);
        assert_eq!(LongDateTime::new(2_082_844_801).to_unix_secs(), 1);
    }
}
