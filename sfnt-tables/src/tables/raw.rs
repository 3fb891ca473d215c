//! Tables that are carried through without being interpreted

use sfnt_types::Tag;

use crate::{
    validate::{Validate, ValidationCtx},
    write::{FontWrite, TableWriter},
};

/// The bytes of a table this crate does not parse, kept with its tag.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawTable {
    tag: Tag,
    pub data: Vec<u8>,
}

impl RawTable {
    pub fn new(tag: Tag, data: impl Into<Vec<u8>>) -> Self {
        RawTable {
            tag,
            data: data.into(),
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }
}

impl FontWrite for RawTable {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_slice(&self.data)
    }

    fn compute_length(&self) -> usize {
        self.data.len()
    }
}

impl Validate for RawTable {
    fn validate_impl(&self, _ctx: &mut ValidationCtx) {}
}
