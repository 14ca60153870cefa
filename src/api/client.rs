//! Thin client over the remote boards service.
//!
//! Wraps a [`Transport`] with the handful of query shapes the intake flow
//! needs: full-board listing with cursor pagination, relation lookups,
//! batch name resolution, natural-key point lookup and item creation.
//! Query text mirrors the service's GraphQL dialect; response subtrees are
//! deserialized strictly and shape mismatches surface as
//! [`RemoteError::Shape`].

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Value, json};

use super::models::{BoardId, CatalogItem, ColumnId, ItemId};
use super::relation::decode_linked_ids;
use super::transport::Transport;
use crate::config::BoardsConfig;
use crate::error::RemoteError;

const BOARD_PAGE: &str = "query BoardPage ($board: [ID!], $limit: Int!) { \
     boards (ids: $board) { items_page (limit: $limit) { cursor items { id name } } } }";

const NEXT_PAGE: &str = "query NextPage ($cursor: String!, $limit: Int!) { \
     next_items_page (cursor: $cursor, limit: $limit) { cursor items { id name } } }";

const LINKED_IDS: &str = "query LinkedIds ($ids: [ID!], $columns: [String!]) { \
     items (ids: $ids) { column_values (ids: $columns) { id \
     ... on BoardRelationValue { linked_item_ids value } } } }";

const ITEM_NAMES: &str = "query ItemNames ($ids: [ID!]) { items (ids: $ids) { id name } }";

const ITEM_LABELS: &str = "query ItemLabels ($ids: [ID!], $column: [String!]) { \
     items (ids: $ids) { id name column_values (ids: $column) { text } } }";

const FIND_BY_COLUMN: &str = "query FindByColumn ($board: ID!, $column: String!, $key: String!) { \
     items_page_by_column_values (board_id: $board, limit: 1, \
     columns: [{column_id: $column, column_values: [$key]}]) { items { id } } }";

const CREATE_ITEM: &str = "mutation CreateItem ($board: ID!, $name: String!, $values: JSON) { \
     create_item (board_id: $board, item_name: $name, column_values: $values) { id } }";

#[derive(Debug, Deserialize)]
struct ItemsPage {
    cursor: Option<String>,
    items: Vec<CatalogItem>,
}

pub struct CatalogClient<T: Transport> {
    transport: T,
    config: BoardsConfig,
}

impl<T: Transport> CatalogClient<T> {
    pub fn new(transport: T, config: BoardsConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &BoardsConfig {
        &self.config
    }

    /// List every item of a board, paging until the service reports no
    /// further cursor. Pages are concatenated in server order; any page
    /// failure discards the partial result.
    pub async fn list_all(&self, board: BoardId) -> Result<Vec<CatalogItem>, RemoteError> {
        let limit = self.config.page_size;
        let data = self
            .transport
            .execute(BOARD_PAGE, json!({ "board": [board], "limit": limit }))
            .await?;

        let first = match data.pointer("/boards/0/items_page") {
            Some(subtree) => parse::<ItemsPage>(subtree, "items_page")?,
            // Unknown board: the service answers with an empty boards list.
            None => return Ok(Vec::new()),
        };

        let mut items = first.items;
        let mut cursor = first.cursor;
        while let Some(current) = cursor {
            let data = self
                .transport
                .execute(NEXT_PAGE, json!({ "cursor": current, "limit": limit }))
                .await?;
            let subtree = data
                .get("next_items_page")
                .ok_or_else(|| RemoteError::Shape("missing next_items_page".into()))?;
            let page = parse::<ItemsPage>(subtree, "next_items_page")?;
            items.extend(page.items);
            cursor = page.cursor;
        }

        log::debug!("listed {} items from board {}", items.len(), board);
        Ok(items)
    }

    /// Fetch one item's relation columns in a single round trip.
    ///
    /// Every requested column gets an entry in the result. A column whose
    /// payload cannot be decoded degrades to an empty list (logged); a
    /// missing item yields empty lists for all columns.
    pub async fn get_linked_ids(
        &self,
        item: ItemId,
        columns: &[ColumnId],
    ) -> Result<HashMap<ColumnId, Vec<ItemId>>, RemoteError> {
        let data = self
            .transport
            .execute(LINKED_IDS, json!({ "ids": [item], "columns": columns }))
            .await?;

        let mut linked: HashMap<ColumnId, Vec<ItemId>> =
            columns.iter().map(|c| (c.clone(), Vec::new())).collect();

        let column_values = data
            .pointer("/items/0/column_values")
            .and_then(Value::as_array);
        let Some(column_values) = column_values else {
            log::warn!("item {} not found while resolving relations", item);
            return Ok(linked);
        };

        for payload in column_values {
            let Some(column) = payload.get("id").and_then(Value::as_str) else {
                continue;
            };
            let column = ColumnId::from(column);
            match decode_linked_ids(&column, payload) {
                Ok(ids) => {
                    linked.insert(column, ids);
                }
                Err(e) => {
                    // Degrade, don't fail: the level just shows no options.
                    log::warn!("{}", e);
                }
            }
        }

        Ok(linked)
    }

    /// Batch name lookup. Empty input yields empty output with no remote call.
    pub async fn get_names(&self, ids: &[ItemId]) -> Result<Vec<CatalogItem>, RemoteError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let data = self
            .transport
            .execute(ITEM_NAMES, json!({ "ids": ids }))
            .await?;
        let items = data
            .get("items")
            .ok_or_else(|| RemoteError::Shape("missing items".into()))?;
        parse(items, "items")
    }

    /// Batch name lookup plus one text column used as a display label.
    /// The label is `None` when the column is absent or blank.
    pub async fn get_labeled(
        &self,
        ids: &[ItemId],
        text_column: &ColumnId,
    ) -> Result<Vec<(CatalogItem, Option<String>)>, RemoteError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let data = self
            .transport
            .execute(ITEM_LABELS, json!({ "ids": ids, "column": [text_column] }))
            .await?;
        let items = data
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| RemoteError::Shape("missing items".into()))?;

        items
            .iter()
            .map(|entry| {
                let item: CatalogItem = parse(entry, "item")?;
                let text = entry
                    .pointer("/column_values/0/text")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from);
                Ok((item, text))
            })
            .collect()
    }

    /// Point lookup by a unique natural-key column. First match wins; at
    /// most one is expected.
    pub async fn find_by_key(
        &self,
        board: BoardId,
        column: &ColumnId,
        key: &str,
    ) -> Result<Option<ItemId>, RemoteError> {
        let data = self
            .transport
            .execute(
                FIND_BY_COLUMN,
                json!({ "board": board, "column": column, "key": key }),
            )
            .await?;

        let found = data
            .pointer("/items_page_by_column_values/items/0/id")
            .and_then(ItemId::from_json);
        Ok(found)
    }

    /// Create an item and return its new id. `column_values` is serialized
    /// into the mutation's JSON-string argument.
    pub async fn create_item(
        &self,
        board: BoardId,
        name: &str,
        column_values: &Value,
    ) -> Result<ItemId, RemoteError> {
        let values = serde_json::to_string(column_values)
            .map_err(|e| RemoteError::Shape(format!("unserializable column values: {e}")))?;

        let data = self
            .transport
            .execute(
                CREATE_ITEM,
                json!({ "board": board, "name": name, "values": values }),
            )
            .await?;

        data.pointer("/create_item/id")
            .and_then(ItemId::from_json)
            .ok_or_else(|| RemoteError::Shape("create_item returned no id".into()))
    }
}

fn parse<D: for<'de> Deserialize<'de>>(subtree: &Value, what: &str) -> Result<D, RemoteError> {
    serde_json::from_value(subtree.clone())
        .map_err(|e| RemoteError::Shape(format!("unexpected {what} shape: {e}")))
}
