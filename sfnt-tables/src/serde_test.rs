use pretty_assertions::assert_eq;

use crate::{
    read::FontRead,
    tables::{
        cmap::Cmap,
        head::Head,
        hmtx::{Hmtx, LongMetric},
        loca::Loca,
        maxp::Maxp,
        name::{Name, NameKey},
        post::Post,
    },
    FontData,
};
use sfnt_types::NameId;

fn roundtrip<T>(table: &T) -> T
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    let json = serde_json::to_string(table).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn fixed_size_tables() {
    let head = Head {
        units_per_em: 2048,
        ..Default::default()
    };
    assert_eq!(roundtrip(&head), head);
    let maxp = Maxp {
        num_glyphs: 12,
        ..Default::default()
    };
    assert_eq!(roundtrip(&maxp), maxp);
}

#[test]
fn metrics_and_offsets() {
    let hmtx = Hmtx::new(vec![LongMetric::new(500, -5)], vec![3, 4]);
    assert_eq!(roundtrip(&hmtx), hmtx);
    let loca = Loca::from_offsets(vec![0, 12, 12, 70000]);
    assert_eq!(roundtrip(&loca), loca);
}

#[test]
fn name_records_are_a_list() {
    let mut name = Name::new();
    name.add_record(NameKey::new(3, 1, 0x409, NameId::FAMILY_NAME), "Demo");
    let json = serde_json::to_value(&name).unwrap();
    assert!(json["records"].is_array());
    assert_eq!(roundtrip(&name), name);
}

#[test]
fn post_and_cmap() {
    let post = Post::read(FontData::new(&sfnt_test_data::post::post_v2())).unwrap();
    assert_eq!(roundtrip(&post), post);
    let cmap = Cmap::read(FontData::new(&sfnt_test_data::cmap::cmap_table())).unwrap();
    assert_eq!(roundtrip(&cmap), cmap);
}
