//! Buyer rows and find-or-create reconciliation by national ID.
//!
//! Reconciliation is best-effort idempotent: a row whose national ID
//! already exists remotely reuses the existing record verbatim; lookup
//! failures degrade to creation. Rows are grouped by national ID before
//! the concurrent fan-out, so two rows sharing a novel ID resolve to one
//! created record.

use std::collections::HashMap;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::api::models::ItemId;
use crate::api::{CatalogClient, Transport};
use crate::error::{RemoteError, SubmitError};

/// One operator-entered buyer line. Row 0 is the mandatory primary buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuyerRow {
    pub full_name: String,
    pub national_id: String,
    pub phone: String,
    pub email: String,
}

impl BuyerRow {
    /// All four fields blank. Empty rows are dropped before reconciliation.
    pub fn is_blank(&self) -> bool {
        self.full_name.trim().is_empty()
            && self.national_id.trim().is_empty()
            && self.phone.trim().is_empty()
            && self.email.trim().is_empty()
    }

    fn key(&self) -> Option<String> {
        let id = self.national_id.trim();
        (!id.is_empty()).then(|| id.to_string())
    }
}

/// Which buyer-row fields are mandatory. Has flip-flopped between product
/// versions, so it is carried as a value, not branched in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequiredFields {
    NameAndId,
    NameIdPhoneEmail,
}

impl RequiredFields {
    /// A row neither blank nor complete is "partial" and fails validation.
    pub fn is_complete(&self, row: &BuyerRow) -> bool {
        let base = !row.full_name.trim().is_empty() && !row.national_id.trim().is_empty();
        match self {
            RequiredFields::NameAndId => base,
            RequiredFields::NameIdPhoneEmail => {
                base && !row.phone.trim().is_empty() && !row.email.trim().is_empty()
            }
        }
    }
}

/// A buyer row resolved to a record id for the current submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledBuyer {
    /// Index of the row in the submitted (unfiltered) row list.
    pub row: usize,
    pub resolved_id: ItemId,
    pub was_existing: bool,
}

/// Find-or-create resolution of buyer rows against the buyers board.
pub struct BuyerReconciler<'a, T: Transport> {
    client: &'a CatalogClient<T>,
}

struct WorkUnit<'r> {
    /// Trimmed national ID, when present. Blank-key rows never deduplicate.
    key: Option<String>,
    /// Original row indices resolving through this unit, in input order.
    rows: Vec<usize>,
    exemplar: &'r BuyerRow,
}

impl<'a, T: Transport> BuyerReconciler<'a, T> {
    pub fn new(client: &'a CatalogClient<T>) -> Self {
        Self { client }
    }

    /// Reconcile the given rows concurrently, returning one entry per row
    /// in input order. Any creation failure aborts the whole set; records
    /// created before the failure stay in place (the operator retries the
    /// entire submission).
    pub async fn reconcile_all(
        &self,
        rows: &[(usize, &BuyerRow)],
    ) -> Result<Vec<ReconciledBuyer>, SubmitError> {
        let units = group_by_key(rows);

        let outcomes = join_all(units.iter().map(|unit| self.resolve_unit(unit))).await;

        // Map unit outcomes back onto rows, keeping input row order. The
        // first failing row in row order decides the reported error.
        let mut resolved: Vec<ReconciledBuyer> = Vec::with_capacity(rows.len());
        let mut first_failure: Option<(usize, RemoteError)> = None;

        for (unit, outcome) in units.iter().zip(outcomes) {
            match outcome {
                Ok((id, was_existing)) => {
                    for &row in &unit.rows {
                        resolved.push(ReconciledBuyer {
                            row,
                            resolved_id: id,
                            was_existing,
                        });
                    }
                }
                Err(e) => {
                    let row = unit.rows[0];
                    if first_failure.as_ref().is_none_or(|(r, _)| row < *r) {
                        first_failure = Some((row, e));
                    }
                }
            }
        }

        if let Some((row, source)) = first_failure {
            return Err(SubmitError::PartialFailure { row, source });
        }

        resolved.sort_by_key(|b| b.row);
        Ok(resolved)
    }

    /// Find-or-create one buyer record. Lookup errors are logged and treated
    /// as not-found: dedup is best-effort, only creation failures abort.
    async fn resolve_unit(&self, unit: &WorkUnit<'_>) -> Result<(ItemId, bool), RemoteError> {
        let config = self.client.config();

        if let Some(key) = &unit.key {
            match self
                .client
                .find_by_key(config.boards.buyers, &config.columns.buyer_id_number, key)
                .await
            {
                Ok(Some(existing)) => {
                    log::debug!("buyer with ID {} already exists as {}", key, existing);
                    return Ok((existing, true));
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("buyer lookup for ID {} failed, creating anyway: {}", key, e);
                }
            }
        }

        let created = self
            .client
            .create_item(
                config.boards.buyers,
                unit.exemplar.full_name.trim(),
                &self.buyer_column_values(unit.exemplar),
            )
            .await?;
        log::info!("created buyer record {}", created);
        Ok((created, false))
    }

    fn buyer_column_values(&self, row: &BuyerRow) -> Value {
        let config = self.client.config();
        let mut values = serde_json::Map::new();

        if let Some(id) = row.key() {
            values.insert(config.columns.buyer_id_number.to_string(), json!(id));
        }
        let phone = row.phone.trim();
        if !phone.is_empty() {
            values.insert(
                config.columns.buyer_phone.to_string(),
                json!({ "phone": phone, "countryShortName": config.phone_country }),
            );
        }
        let email = row.email.trim();
        if !email.is_empty() {
            values.insert(
                config.columns.buyer_email.to_string(),
                json!({ "email": email, "text": email }),
            );
        }

        Value::Object(values)
    }
}

fn group_by_key<'r>(rows: &[(usize, &'r BuyerRow)]) -> Vec<WorkUnit<'r>> {
    let mut units: Vec<WorkUnit<'r>> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for &(index, row) in rows {
        match row.key() {
            Some(key) => {
                if let Some(&unit) = by_key.get(&key) {
                    units[unit].rows.push(index);
                } else {
                    by_key.insert(key.clone(), units.len());
                    units.push(WorkUnit {
                        key: Some(key),
                        rows: vec![index],
                        exemplar: row,
                    });
                }
            }
            None => units.push(WorkUnit {
                key: None,
                rows: vec![index],
                exemplar: row,
            }),
        }
    }

    units
}
