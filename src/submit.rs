//! Submission orchestration: validate, reconcile buyers, create the
//! communication record.
//!
//! The whole submission is one attempt: validation happens strictly before
//! any remote call, reconciliation fans out per buyer, and the linking
//! record is created last, referencing the resolved buyer ids and the
//! selected catalog ids. A failure anywhere surfaces as one typed error;
//! buyer records created before the failure are left in place.

use serde_json::{Value, json};

use crate::api::models::ItemId;
use crate::api::{CatalogClient, Transport};
use crate::buyers::{BuyerReconciler, BuyerRow, ReconciledBuyer, RequiredFields};
use crate::cascade::SelectionState;
use crate::error::{SubmitError, ValidationError};
use crate::validate::{valid_email, valid_national_id, valid_phone};

/// Display-name prefix of a communication record, kept byte-for-byte from
/// the production boards ("new inquiry").
const COMMUNICATION_PREFIX: &str = "פנייה חדשה";

/// Opaque attachment reference, passed through to the communication
/// record's file column uninspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle(pub Value);

/// Aggregate form state handed over by the UI on submit. The engine
/// receives it by reference and never retains it.
#[derive(Debug, Clone, Default)]
pub struct FormSubmission {
    pub selection: SelectionState,
    pub buyers: Vec<BuyerRow>,
    pub attachment: Option<FileHandle>,
}

/// What a successful submission produced.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub communication_id: ItemId,
    pub buyers: Vec<ReconciledBuyer>,
}

pub struct SubmissionOrchestrator<'a, T: Transport> {
    client: &'a CatalogClient<T>,
    policy: RequiredFields,
}

impl<'a, T: Transport> SubmissionOrchestrator<'a, T> {
    /// Use the required-field policy from the client's configuration.
    pub fn new(client: &'a CatalogClient<T>) -> Self {
        let policy = client.config().required_fields;
        Self::with_policy(client, policy)
    }

    pub fn with_policy(client: &'a CatalogClient<T>, policy: RequiredFields) -> Self {
        Self { client, policy }
    }

    /// Local validation only; first failure wins. Safe to call from the UI
    /// on every change — it never issues a remote call.
    pub fn validate(&self, submission: &FormSubmission) -> Result<(), ValidationError> {
        validate(self.policy, submission)
    }

    /// Run the whole submission: validate, reconcile, create the linking
    /// record.
    pub async fn submit(
        &self,
        submission: &FormSubmission,
    ) -> Result<SubmissionReceipt, SubmitError> {
        self.validate(submission)?;

        let rows: Vec<(usize, &BuyerRow)> = submission
            .buyers
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.is_blank())
            .collect();

        let reconciler = BuyerReconciler::new(self.client);
        let buyers = reconciler.reconcile_all(&rows).await?;

        let name = communication_name(&rows);
        let values = self.communication_column_values(submission, &buyers);

        let communication_id = self
            .client
            .create_item(self.client.config().boards.buyer_comm, &name, &values)
            .await?;
        log::info!(
            "created communication record {} linking {} buyer(s)",
            communication_id,
            buyers.len()
        );

        Ok(SubmissionReceipt {
            communication_id,
            buyers,
        })
    }

    fn communication_column_values(
        &self,
        submission: &FormSubmission,
        buyers: &[ReconciledBuyer],
    ) -> Value {
        let columns = &self.client.config().columns;
        let selection = &submission.selection;
        let mut values = serde_json::Map::new();

        let mut relate = |column: &crate::api::models::ColumnId, id: ItemId| {
            values.insert(column.to_string(), json!({ "item_ids": [id] }));
        };

        if let Some(project) = selection.project {
            relate(&columns.target_project, project);
        }
        // The apartment goes into the slot named for buildings. Downstream
        // boards consume it there; do not "fix" the mapping.
        if let Some(apartment) = selection.apartment {
            relate(&columns.target_building, apartment);
        }
        if let Some(storage) = selection.storage {
            relate(&columns.target_storage, storage);
        }
        if let Some(parking) = selection.parking {
            relate(&columns.target_parking, parking);
        }
        if let Some(commercial) = selection.commercial {
            relate(&columns.target_commercial, commercial);
        }

        let mut buyer_ids: Vec<ItemId> = Vec::new();
        for buyer in buyers {
            if !buyer_ids.contains(&buyer.resolved_id) {
                buyer_ids.push(buyer.resolved_id);
            }
        }
        values.insert(
            columns.target_buyers_connect.to_string(),
            json!({ "item_ids": buyer_ids }),
        );

        if let (Some(column), Some(attachment)) =
            (&columns.target_attachment, &submission.attachment)
        {
            values.insert(column.to_string(), attachment.0.clone());
        }

        Value::Object(values)
    }
}

/// Validate the aggregate form state against the business rules, in their
/// fixed order: selection completeness, primary-row presence and
/// completeness, per-row completeness, then field formats. The first
/// failure wins and nothing is sent to the remote.
pub fn validate(
    policy: RequiredFields,
    submission: &FormSubmission,
) -> Result<(), ValidationError> {
    let selection = &submission.selection;
    if selection.project.is_none() || selection.building.is_none() || selection.apartment.is_none()
    {
        return Err(ValidationError::IncompleteSelection);
    }

    match submission.buyers.first() {
        None => return Err(ValidationError::MissingPrimaryBuyer),
        Some(row) if row.is_blank() => return Err(ValidationError::MissingPrimaryBuyer),
        Some(row) if !policy.is_complete(row) => {
            return Err(ValidationError::IncompleteRow { row: 0 });
        }
        Some(_) => {}
    }

    for (index, row) in submission.buyers.iter().enumerate() {
        if row.is_blank() {
            continue;
        }
        if !policy.is_complete(row) {
            return Err(ValidationError::IncompleteRow { row: index });
        }
    }

    for (index, row) in submission.buyers.iter().enumerate() {
        if row.is_blank() {
            continue;
        }
        if !valid_national_id(&row.national_id) {
            return Err(ValidationError::BadNationalId { row: index });
        }
        let phone = row.phone.trim();
        if !phone.is_empty() && !valid_phone(phone) {
            return Err(ValidationError::BadPhone { row: index });
        }
        let email = row.email.trim();
        if !email.is_empty() && !valid_email(email) {
            return Err(ValidationError::BadEmail { row: index });
        }
    }

    Ok(())
}

fn communication_name(rows: &[(usize, &BuyerRow)]) -> String {
    let names: Vec<&str> = rows
        .iter()
        .map(|(_, row)| row.full_name.trim())
        .filter(|n| !n.is_empty())
        .collect();
    format!("{} - {}", COMMUNICATION_PREFIX, names.join(", "))
}
