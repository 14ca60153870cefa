//! Normalization of relation-column payloads.
//!
//! A relation column carries links to items in another board. Depending on
//! query path and column age the service hands the linked-id list back in
//! one of two encodings:
//!
//! - a pre-parsed array under `linked_item_ids`, ids as strings or numbers
//! - a serialized-text `value` holding either a JSON array of ids or the
//!   storage form `{"linkedPulseIds": [{"linkedPulseId": <id>}, ...]}`
//!
//! Both normalize to `Vec<ItemId>` here, in one place, independent of
//! transport.

use serde_json::Value;

use super::models::{ColumnId, ItemId};
use crate::error::DecodeError;

/// Normalize one column's payload to its linked-id list.
///
/// `payload` is the column-value object as returned by the service.
pub fn decode_linked_ids(column: &ColumnId, payload: &Value) -> Result<Vec<ItemId>, DecodeError> {
    if let Some(ids) = payload.get("linked_item_ids").and_then(Value::as_array) {
        return ids
            .iter()
            .map(|v| {
                ItemId::from_json(v).ok_or_else(|| malformed(column, format!("bad id {v}")))
            })
            .collect();
    }

    match payload.get("value") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(Vec::new()),
        Some(Value::String(text)) => {
            let parsed: Value = serde_json::from_str(text)
                .map_err(|e| malformed(column, format!("unparseable text value: {e}")))?;
            ids_from_value(column, &parsed)
        }
        // Some query paths return the storage form pre-parsed.
        Some(other) => ids_from_value(column, other),
    }
}

fn ids_from_value(column: &ColumnId, value: &Value) -> Result<Vec<ItemId>, DecodeError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(ids) => ids
            .iter()
            .map(|v| ItemId::from_json(v).ok_or_else(|| malformed(column, format!("bad id {v}"))))
            .collect(),
        Value::Object(map) => match map.get("linkedPulseIds") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(links)) => links
                .iter()
                .map(|link| {
                    link.get("linkedPulseId")
                        .and_then(ItemId::from_json)
                        .ok_or_else(|| malformed(column, format!("bad link entry {link}")))
                })
                .collect(),
            Some(other) => Err(malformed(column, format!("linkedPulseIds is {other}"))),
        },
        other => Err(malformed(column, format!("unexpected payload {other}"))),
    }
}

fn malformed(column: &ColumnId, reason: String) -> DecodeError {
    DecodeError {
        column: column.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn col() -> ColumnId {
        ColumnId::from("board_relation_test")
    }

    #[test]
    fn decodes_preparsed_id_array() {
        let payload = json!({ "linked_item_ids": ["101", 102] });
        let ids = decode_linked_ids(&col(), &payload).unwrap();
        assert_eq!(ids, vec![ItemId(101), ItemId(102)]);
    }

    #[test]
    fn decodes_serialized_text_array() {
        let payload = json!({ "value": "[201, \"202\"]" });
        let ids = decode_linked_ids(&col(), &payload).unwrap();
        assert_eq!(ids, vec![ItemId(201), ItemId(202)]);
    }

    #[test]
    fn decodes_storage_form() {
        let payload = json!({
            "value": "{\"linkedPulseIds\":[{\"linkedPulseId\":301},{\"linkedPulseId\":302}]}"
        });
        let ids = decode_linked_ids(&col(), &payload).unwrap();
        assert_eq!(ids, vec![ItemId(301), ItemId(302)]);
    }

    #[test]
    fn missing_or_blank_value_is_empty() {
        assert!(decode_linked_ids(&col(), &json!({})).unwrap().is_empty());
        assert!(decode_linked_ids(&col(), &json!({ "value": null })).unwrap().is_empty());
        assert!(decode_linked_ids(&col(), &json!({ "value": "  " })).unwrap().is_empty());
    }

    #[test]
    fn malformed_text_is_an_error() {
        let err = decode_linked_ids(&col(), &json!({ "value": "{not json" })).unwrap_err();
        assert!(err.to_string().contains("board_relation_test"));

        let err = decode_linked_ids(&col(), &json!({ "value": "\"a string\"" })).unwrap_err();
        assert!(err.reason.contains("unexpected payload"));
    }
}
