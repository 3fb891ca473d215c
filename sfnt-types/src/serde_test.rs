use crate::{Fixed, GlyphId, NameId, Tag, Version16Dot16};

#[test]
fn tag_is_a_string_in_json() {
    let tag = Tag::new(b"glyf");
    let json = serde_json::to_string(&tag).unwrap();
    assert_eq!(json, "\"glyf\"");
    let back: Tag = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tag);
    assert!(serde_json::from_str::<Tag>("\"gly\"").is_err());
}

#[test]
fn scalars_roundtrip() {
    let value = (
        GlyphId::new(7),
        NameId::FAMILY_NAME,
        Fixed::from_f64(-2.5),
        Version16Dot16::VERSION_2_0,
    );
    let json = serde_json::to_string(&value).unwrap();
    let back: (GlyphId, NameId, Fixed, Version16Dot16) = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
}
