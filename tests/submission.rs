mod support;

use buyer_intake::api::models::{ColumnId, ItemId};
use buyer_intake::buyers::BuyerRow;
use buyer_intake::cascade::SelectionState;
use buyer_intake::config::BoardsConfig;
use buyer_intake::error::{SubmitError, ValidationError};
use buyer_intake::submit::{FileHandle, FormSubmission, SubmissionOrchestrator};
use buyer_intake::CatalogClient;
use serde_json::{Value, json};
use support::*;

fn complete_row(name: &str, national_id: &str) -> BuyerRow {
    BuyerRow {
        full_name: name.to_string(),
        national_id: national_id.to_string(),
        phone: "050-0000000".to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
    }
}

fn submission(buyers: Vec<BuyerRow>) -> FormSubmission {
    FormSubmission {
        selection: SelectionState {
            project: Some(ItemId(100)),
            building: Some(ItemId(200)),
            apartment: Some(ItemId(300)),
            ..SelectionState::default()
        },
        buyers,
        attachment: None,
    }
}

/// Column values sent with the communication create, parsed back from the
/// serialized mutation argument.
fn sent_column_values(transport: &MockTransport, call_index: usize) -> Value {
    let calls = transport.calls();
    let create_calls: Vec<_> = calls
        .iter()
        .filter(|c| c.operation == "CreateItem")
        .collect();
    serde_json::from_str(create_calls[call_index].variables["values"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn novel_buyer_produces_one_create_and_one_linked_communication() {
    init_logging();
    let transport = MockTransport::new();
    transport
        .respond("FindByColumn", found(None))
        .respond("CreateItem", created(7001)) // buyer
        .respond("CreateItem", created(9001)); // communication
    let client = client(&transport);
    let orchestrator = SubmissionOrchestrator::new(&client);

    let receipt = orchestrator
        .submit(&submission(vec![complete_row("Dana Levi", "000000018")]))
        .await
        .unwrap();

    assert_eq!(receipt.communication_id, ItemId(9001));
    assert_eq!(receipt.buyers.len(), 1);
    assert_eq!(receipt.buyers[0].resolved_id, ItemId(7001));
    assert!(!receipt.buyers[0].was_existing);

    // exactly one buyer create plus the communication create
    assert_eq!(transport.call_count("CreateItem"), 2);

    let columns = client.config().columns.clone();
    let values = sent_column_values(&transport, 1);
    assert_eq!(values[columns.target_project.as_str()], json!({ "item_ids": [100] }));
    // the apartment selection lands in the building-named slot
    assert_eq!(values[columns.target_building.as_str()], json!({ "item_ids": [300] }));
    assert_eq!(
        values[columns.target_buyers_connect.as_str()],
        json!({ "item_ids": [7001] })
    );
    assert!(values.get(columns.target_storage.as_str()).is_none());
}

#[tokio::test]
async fn existing_buyer_is_reused_without_a_create() {
    let transport = MockTransport::new();
    transport
        .respond("FindByColumn", found(Some(7777)))
        .respond("CreateItem", created(9001)); // communication only
    let client = client(&transport);
    let orchestrator = SubmissionOrchestrator::new(&client);

    let receipt = orchestrator
        .submit(&submission(vec![complete_row("Dana Levi", "000000018")]))
        .await
        .unwrap();

    assert_eq!(receipt.buyers[0].resolved_id, ItemId(7777));
    assert!(receipt.buyers[0].was_existing);
    assert_eq!(transport.call_count("CreateItem"), 1);
}

#[tokio::test]
async fn partial_row_fails_validation_before_any_remote_call() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let orchestrator = SubmissionOrchestrator::new(&client);

    let mut partial = BuyerRow::default();
    partial.full_name = "Noa Katz".to_string();

    let err = orchestrator
        .submit(&submission(vec![
            complete_row("Dana Levi", "000000018"),
            partial,
        ]))
        .await
        .unwrap_err();

    match err {
        SubmitError::Validation(ValidationError::IncompleteRow { row }) => assert_eq!(row, 1),
        other => panic!("expected a row-1 validation error, got {other:?}"),
    }
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn two_rows_sharing_novel_id_create_once() {
    let transport = MockTransport::new();
    transport
        .respond("FindByColumn", found(None))
        .respond("CreateItem", created(7001)) // single buyer record
        .respond("CreateItem", created(9001)); // communication
    let client = client(&transport);
    let orchestrator = SubmissionOrchestrator::new(&client);

    let receipt = orchestrator
        .submit(&submission(vec![
            complete_row("Dana Levi", "000000018"),
            complete_row("Dana L", "000000018"),
        ]))
        .await
        .unwrap();

    // one lookup, one create, both rows resolve to the same record
    assert_eq!(transport.call_count("FindByColumn"), 1);
    assert_eq!(transport.call_count("CreateItem"), 2);
    assert_eq!(receipt.buyers.len(), 2);
    assert_eq!(receipt.buyers[0].resolved_id, receipt.buyers[1].resolved_id);

    let columns = client.config().columns.clone();
    let values = sent_column_values(&transport, 1);
    assert_eq!(
        values[columns.target_buyers_connect.as_str()],
        json!({ "item_ids": [7001] })
    );
}

#[tokio::test]
async fn distinct_rows_reconcile_concurrently_and_in_order() {
    let transport = MockTransport::new();
    transport
        .respond("FindByColumn", found(None))
        .respond("FindByColumn", found(Some(7800)))
        .respond("CreateItem", created(7001)) // first row's buyer
        .respond("CreateItem", created(9001)); // communication
    let client = client(&transport);
    let orchestrator = SubmissionOrchestrator::new(&client);

    let receipt = orchestrator
        .submit(&submission(vec![
            complete_row("Dana Levi", "000000018"),
            complete_row("Noa Katz", "000000026"),
        ]))
        .await
        .unwrap();

    assert_eq!(receipt.buyers[0].row, 0);
    assert_eq!(receipt.buyers[0].resolved_id, ItemId(7001));
    assert_eq!(receipt.buyers[1].row, 1);
    assert_eq!(receipt.buyers[1].resolved_id, ItemId(7800));
    assert!(receipt.buyers[1].was_existing);
}

#[tokio::test]
async fn failed_buyer_creation_aborts_with_the_failing_row() {
    let transport = MockTransport::new();
    transport
        .respond("FindByColumn", found(None))
        .respond("FindByColumn", found(None))
        .respond("CreateItem", created(7001))
        .fail("CreateItem", "mutation rejected");
    let client = client(&transport);
    let orchestrator = SubmissionOrchestrator::new(&client);

    let err = orchestrator
        .submit(&submission(vec![
            complete_row("Dana Levi", "000000018"),
            complete_row("Noa Katz", "000000026"),
        ]))
        .await
        .unwrap_err();

    match err {
        SubmitError::PartialFailure { row, .. } => assert_eq!(row, 1),
        other => panic!("expected partial failure, got {other:?}"),
    }
    // the communication record was never attempted
    assert_eq!(transport.call_count("CreateItem"), 2);
}

#[tokio::test]
async fn lookup_failure_degrades_to_creation() {
    let transport = MockTransport::new();
    transport
        .fail("FindByColumn", "search index offline")
        .respond("CreateItem", created(7001))
        .respond("CreateItem", created(9001));
    let client = client(&transport);
    let orchestrator = SubmissionOrchestrator::new(&client);

    let receipt = orchestrator
        .submit(&submission(vec![complete_row("Dana Levi", "000000018")]))
        .await
        .unwrap();

    assert!(!receipt.buyers[0].was_existing);
    assert_eq!(receipt.buyers[0].resolved_id, ItemId(7001));
}

#[tokio::test]
async fn incomplete_selection_fails_first_with_no_calls() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let orchestrator = SubmissionOrchestrator::new(&client);

    let mut incomplete = submission(vec![complete_row("Dana Levi", "000000018")]);
    incomplete.selection.apartment = None;

    let err = orchestrator.submit(&incomplete).await.unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Validation(ValidationError::IncompleteSelection)
    ));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn attachment_passes_through_verbatim_when_configured() {
    let transport = MockTransport::new();
    transport
        .respond("FindByColumn", found(None))
        .respond("CreateItem", created(7001))
        .respond("CreateItem", created(9001));

    let mut config = BoardsConfig::default();
    config.columns.target_attachment = Some(ColumnId::from("file_contract"));
    let client = CatalogClient::new(transport.clone(), config);
    let orchestrator = SubmissionOrchestrator::new(&client);

    let handle = FileHandle(json!({ "assetIds": [123456] }));
    let mut with_file = submission(vec![complete_row("Dana Levi", "000000018")]);
    with_file.attachment = Some(handle.clone());

    orchestrator.submit(&with_file).await.unwrap();

    let values = sent_column_values(&transport, 1);
    assert_eq!(values["file_contract"], handle.0);
}

#[tokio::test]
async fn optional_units_map_to_their_own_slots() {
    let transport = MockTransport::new();
    transport
        .respond("FindByColumn", found(None))
        .respond("CreateItem", created(7001))
        .respond("CreateItem", created(9001));
    let client = client(&transport);
    let orchestrator = SubmissionOrchestrator::new(&client);

    let mut full = submission(vec![complete_row("Dana Levi", "000000018")]);
    full.selection.storage = Some(ItemId(400));
    full.selection.parking = Some(ItemId(500));

    orchestrator.submit(&full).await.unwrap();

    let columns = client.config().columns.clone();
    let values = sent_column_values(&transport, 1);
    assert_eq!(values[columns.target_storage.as_str()], json!({ "item_ids": [400] }));
    assert_eq!(values[columns.target_parking.as_str()], json!({ "item_ids": [500] }));
    assert!(values.get(columns.target_commercial.as_str()).is_none());
}
