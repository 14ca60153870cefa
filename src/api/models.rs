//! Plain data types shared across the catalog API.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// Numeric identifier of a board (a table-like collection of items).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(pub u64);

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a board column, e.g. `board_relation_mkxw7hzd`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(pub String);

impl ColumnId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnId {
    fn from(s: &str) -> Self {
        ColumnId(s.to_string())
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage-assigned identifier of an item (a row in a board).
///
/// The service stores these as numbers but its query layer returns them as
/// strings, so deserialization accepts both encodings. Serialization is
/// always numeric, matching what mutations expect in `item_ids` lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl ItemId {
    /// Lenient conversion from a JSON scalar (number or numeric string).
    pub fn from_json(value: &serde_json::Value) -> Option<ItemId> {
        match value {
            serde_json::Value::Number(n) => n.as_u64().map(ItemId),
            serde_json::Value::String(s) => s.trim().parse().ok().map(ItemId),
            _ => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ItemId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an item id as a number or numeric string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ItemId, E> {
                Ok(ItemId(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ItemId, E> {
                u64::try_from(v)
                    .map(ItemId)
                    .map_err(|_| E::custom("negative item id"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ItemId, E> {
                v.trim()
                    .parse()
                    .map(ItemId)
                    .map_err(|_| E::custom(format!("non-numeric item id: {v:?}")))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Immutable snapshot of an item, fetched on demand and never cached
/// beyond the current selection session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
}
