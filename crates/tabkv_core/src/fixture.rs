//! Shared test record and table.

use crate::record::CborCodec;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use tabkv_codec::{encode, KeyEncoder, OrderedKey};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Item {
    pub id: u32,
    pub kind: String,
    pub level: u8,
    pub tags: Vec<String>,
}

pub(crate) fn item(id: u32, kind: &str, level: u8, tags: &[&str]) -> Item {
    Item {
        id,
        kind: kind.to_string(),
        level,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

pub(crate) fn item_table() -> Table<Item> {
    Table::builder("shop/items")
        .fields(["ID", "Kind", "Level", "Tags"])
        .codec(CborCodec::new())
        .primary_key("pk_ID", |i: &Item| i.id.to_ordered_bytes())
        .index("idx_Kind_Level", |i: &Item| {
            let mut key = KeyEncoder::new();
            key.field(i.kind.as_bytes()).ordered(&i.level);
            key.into_bytes()
        })
        .mindex("midx_Tags", |i: &Item| {
            i.tags.iter().map(|t| encode(&[t])).collect()
        })
        .build()
        .expect("fixture table")
}
