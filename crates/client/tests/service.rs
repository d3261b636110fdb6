//! Mutation coordinator tests.

mod common;
use common::*;

use serde_json::json;
use sheetsync::{SheetProperties, SheetsError, SheetsService};
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Structural updates over HTTP
// ============================================================================

#[tokio::test]
async fn test_rename_sheet_end_to_end() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/spreadsheets/abc:batchUpdate"))
        .and(body_json(json!({"requests": [{"updateSheetProperties": {
            "properties": {"sheetId": 7, "title": "Data"},
            "fields": "title"
        }}]})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"spreadsheetId": "abc", "replies": [{}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/spreadsheets/abc"))
        .and(query_param("fields", sheetsync::sync::FETCH_FIELDS))
        .respond_with(ResponseTemplate::new(200).set_body_json(spreadsheet_json(
            "abc",
            "Budget",
            &[sheet(7, "Data", 100, 26)],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let service = SheetsService::new(http_executor(&server));
    let mut ss = spreadsheet("abc", "Budget", &[sheet(7, "Sheet1", 100, 26)]);

    service.rename_sheet(&mut ss, 7, "Data").await.unwrap();

    assert_eq!(ss.sheet_by_id(7).unwrap().title(), "Data");
}

#[tokio::test]
async fn test_fetch_remote_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/spreadsheets/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "status": "NOT_FOUND", "message": "Requested entity was not found."}
        })))
        .mount(&server)
        .await;

    let service = SheetsService::new(http_executor(&server));
    let err = service.fetch_spreadsheet("missing").await.unwrap_err();

    assert!(matches!(err, SheetsError::RemoteApi { code: 404, .. }));
}

#[tokio::test]
async fn test_create_spreadsheet() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/spreadsheets"))
        .and(body_json(json!({
            "properties": {"title": "Inventory"},
            "sheets": [{"properties": {"title": "Items"}}, {"properties": {"title": "Log"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"spreadsheetId": "new-id"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/spreadsheets/new-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(spreadsheet_json(
            "new-id",
            "Inventory",
            &[sheet(0, "Items", 1000, 26), sheet(1, "Log", 1000, 26)],
        )))
        .mount(&server)
        .await;

    let service = SheetsService::new(http_executor(&server));
    let ss = service
        .create_spreadsheet("Inventory", &["Items", "Log"])
        .await
        .unwrap();

    assert_eq!(ss.id(), "new-id");
    assert_eq!(ss.sheets().len(), 2);
    assert_eq!(ss.sheet_by_title("Log").unwrap().id(), 1);
}

// ============================================================================
// Optimistic bookkeeping
// ============================================================================

#[tokio::test]
async fn test_delete_rows_body_and_local_count() {
    let executor = Arc::new(RecordingExecutor::new());
    executor.respond(json!({"spreadsheetId": "abc", "replies": [{}]}));
    executor.respond(spreadsheet_json("abc", "Budget", &[sheet(4, "Sheet1", 97, 26)]));

    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    service.delete_rows(&mut ss, 4, 2, 5).await.unwrap();

    let calls = executor.calls();
    assert_eq!(calls[0].path, "/spreadsheets/abc:batchUpdate");
    assert_eq!(
        calls[0].body.as_ref().unwrap(),
        &json!({"requests": [{"deleteDimension": {"range": {
            "sheetId": 4, "dimension": "ROWS", "startIndex": 2, "endIndex": 5
        }}}]})
    );
    assert_eq!(calls[1].method, "GET");
    assert_eq!(ss.sheet_by_id(4).unwrap().grid().row_count, 97);
}

#[tokio::test]
async fn test_delete_rows_applied_before_response_and_kept_on_failure() {
    let executor = Arc::new(RecordingExecutor::new());
    executor.respond(json!({
        "error": {"code": 503, "status": "UNAVAILABLE", "message": "try later"}
    }));

    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    let err = service.delete_rows(&mut ss, 4, 2, 5).await.unwrap_err();
    assert_eq!(err.remote_status(), Some("UNAVAILABLE"));

    // Not rolled back: row count and projection both dropped by 3
    let sheet = ss.sheet_by_id(4).unwrap();
    assert_eq!(sheet.grid().row_count, 97);
    assert_eq!(sheet.projection().max_row, 97);
    // No resync after a failed submit
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_delete_columns_adjusts_columns_only() {
    let executor = Arc::new(RecordingExecutor::new());
    executor.fail(SheetsError::Transport("timed out".into()));

    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    assert!(service.delete_columns(&mut ss, 4, 0, 6).await.is_err());
    let sheet = ss.sheet_by_id(4).unwrap();
    assert_eq!(sheet.grid().column_count, 20);
    assert_eq!(sheet.projection().max_column, 20);
    assert_eq!(sheet.grid().row_count, 100);
}

#[tokio::test]
async fn test_reconcile_after_failure() {
    let executor = Arc::new(RecordingExecutor::new());
    executor.fail(SheetsError::Transport("reset".into()));
    executor.respond(spreadsheet_json("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]));

    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    assert!(service.delete_rows(&mut ss, 4, 0, 10).await.is_err());
    assert_eq!(ss.sheet_by_id(4).unwrap().grid().row_count, 90);

    service.reload_spreadsheet(&mut ss).await.unwrap();
    assert_eq!(ss.sheet_by_id(4).unwrap().grid().row_count, 100);
}

#[tokio::test]
async fn test_insert_columns_grows_grid() {
    let executor = Arc::new(RecordingExecutor::new());
    executor.fail(SheetsError::Transport("reset".into()));

    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    assert!(service.insert_columns(&mut ss, 4, 3, 5).await.is_err());
    let calls = executor.calls();
    assert_eq!(
        calls[0].body.as_ref().unwrap()["requests"][0],
        json!({"insertDimension": {
            "range": {"sheetId": 4, "dimension": "COLUMNS", "startIndex": 3, "endIndex": 5},
            "inheritFromBefore": true
        }})
    );
    assert_eq!(ss.sheet_by_id(4).unwrap().grid().column_count, 28);
}

#[tokio::test]
async fn test_invalid_range_changes_nothing() {
    let executor = Arc::new(RecordingExecutor::new());
    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    let err = service.delete_rows(&mut ss, 4, 5, 5).await.unwrap_err();
    assert!(matches!(err, SheetsError::InvalidArgument(_)));
    assert_eq!(ss.sheet_by_id(4).unwrap().grid().row_count, 100);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_sheet_is_invalid_argument() {
    let executor = Arc::new(RecordingExecutor::new());
    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    let err = service.rename_sheet(&mut ss, 99, "X").await.unwrap_err();
    assert!(matches!(err, SheetsError::InvalidArgument(_)));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_noop_update_is_empty_batch() {
    let executor = Arc::new(RecordingExecutor::new());
    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    let err = service.rename_sheet(&mut ss, 4, "Sheet1").await.unwrap_err();
    assert!(matches!(err, SheetsError::EmptyBatch));
    let err = service.rename_spreadsheet(&mut ss, "Budget").await.unwrap_err();
    assert!(matches!(err, SheetsError::EmptyBatch));
    assert!(executor.calls().is_empty());
}

// ============================================================================
// Other structural operations
// ============================================================================

#[tokio::test]
async fn test_add_and_delete_sheet() {
    let executor = Arc::new(RecordingExecutor::new());
    executor.respond(json!({"replies": [{"addSheet": {"properties": {"sheetId": 12}}}]}));
    executor.respond(spreadsheet_json(
        "abc",
        "Budget",
        &[sheet(4, "Sheet1", 100, 26), sheet(12, "Notes", 1000, 26)],
    ));
    executor.respond(json!({"replies": [{}]}));
    executor.respond(spreadsheet_json("abc", "Budget", &[sheet(12, "Notes", 1000, 26)]));

    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    service
        .add_sheet(&mut ss, &SheetProperties::titled("Notes"))
        .await
        .unwrap();
    assert_eq!(ss.sheets().len(), 2);

    service.delete_sheet(&mut ss, 4).await.unwrap();
    assert_eq!(ss.sheets().len(), 1);
    assert!(ss.sheet_by_id(4).is_none());

    let calls = executor.calls();
    assert_eq!(
        calls[0].body.as_ref().unwrap(),
        &json!({"requests": [{"addSheet": {"properties": {"title": "Notes"}}}]})
    );
    assert_eq!(
        calls[2].body.as_ref().unwrap(),
        &json!({"requests": [{"deleteSheet": {"sheetId": 4}}]})
    );
}

#[tokio::test]
async fn test_update_spreadsheet_properties_sends_diff() {
    let executor = Arc::new(RecordingExecutor::new());
    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    let mut proposed = ss.properties().clone();
    proposed.locale = "fr_FR".into();
    // Reload answers `{}`, which decodes as an empty mirror
    service
        .update_spreadsheet_properties(&mut ss, &proposed)
        .await
        .unwrap();

    let calls = executor.calls();
    assert_eq!(
        calls[0].body.as_ref().unwrap(),
        &json!({"requests": [{"updateSpreadsheetProperties": {
            "properties": {"locale": "fr_FR"},
            "fields": "locale"
        }}]})
    );
    assert_eq!(calls[1].path, sheetsync::sync::fetch_path("abc"));
}

#[tokio::test]
async fn test_freeze_and_hide_masks() {
    let executor = Arc::new(RecordingExecutor::new());
    executor.respond(json!({}));
    executor.respond(spreadsheet_json("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]));
    executor.respond(json!({}));
    executor.respond(spreadsheet_json("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]));

    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    service.freeze(&mut ss, 4, 1, 0).await.unwrap();
    service.set_sheet_hidden(&mut ss, 4, true).await.unwrap();

    let calls = executor.calls();
    assert_eq!(
        calls[0].body.as_ref().unwrap()["requests"][0]["updateSheetProperties"]["fields"],
        json!("gridProperties.frozenRowCount")
    );
    assert_eq!(
        calls[2].body.as_ref().unwrap()["requests"][0]["updateSheetProperties"],
        json!({"properties": {"sheetId": 4, "hidden": true}, "fields": "hidden"})
    );
}

#[tokio::test]
async fn test_append_cells() {
    let executor = Arc::new(RecordingExecutor::new());
    executor.respond(json!({}));
    executor.respond(spreadsheet_json("abc", "Budget", &[sheet(4, "Sheet1", 101, 26)]));

    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(4, "Sheet1", 100, 26)]);

    service
        .append_cells(&mut ss, 4, &[vec!["2024-01-01", "42"]])
        .await
        .unwrap();

    let calls = executor.calls();
    assert_eq!(
        calls[0].body.as_ref().unwrap()["requests"][0]["appendCells"],
        json!({
            "sheetId": 4,
            "rows": [{"values": [
                {"userEnteredValue": {"stringValue": "2024-01-01"}},
                {"userEnteredValue": {"stringValue": "42"}}
            ]}],
            "fields": "userEnteredValue"
        })
    );
    assert_eq!(ss.sheet_by_id(4).unwrap().grid().row_count, 101);
}

// ============================================================================
// Cell flush
// ============================================================================

#[tokio::test]
async fn test_sync_expands_grid_before_writing() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/spreadsheets/abc:batchUpdate"))
        .and(body_json(json!({"requests": [{"updateSheetProperties": {
            "properties": {"sheetId": 2, "gridProperties": {"rowCount": 1201, "columnCount": 30}},
            "fields": "gridProperties.rowCount,gridProperties.columnCount"
        }}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"spreadsheetId": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/spreadsheets/abc/values:batchUpdate"))
        .and(body_json(json!({
            "valueInputOption": "USER_ENTERED",
            "data": [
                {"range": "Sheet1!A1", "majorDimension": "COLUMNS", "values": [["total"]]},
                {"range": "Sheet1!AD1201", "majorDimension": "COLUMNS", "values": [["=SUM(A1:A2)"]]}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"spreadsheetId": "abc", "totalUpdatedCells": 2})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = SheetsService::new(http_executor(&server));
    let mut ss = spreadsheet("abc", "Budget", &[sheet(2, "Sheet1", 1000, 26)]);
    {
        let sheet = ss.sheet_by_id_mut(2).unwrap();
        sheet.update(0, 0, "total").unwrap();
        sheet.update(1200, 29, "=SUM(A1:A2)").unwrap();
    }

    service.sync_sheet(&mut ss, 2).await.unwrap();

    let sheet = ss.sheet_by_id(2).unwrap();
    assert!(!sheet.has_pending());
    assert_eq!(sheet.grid().row_count, 1201);
    assert_eq!(sheet.grid().column_count, 30);
    assert_eq!(sheet.projection().max_row, 1201);
    assert_eq!(sheet.projection().max_column, 30);
}

#[tokio::test]
async fn test_sync_within_bounds_writes_values_only() {
    let executor = Arc::new(RecordingExecutor::new());
    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(2, "My Sheet", 100, 26)]);
    ss.sheet_by_id_mut(2).unwrap().update(4, 1, "7").unwrap();

    service.sync_sheet(&mut ss, 2).await.unwrap();

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "/spreadsheets/abc/values:batchUpdate");
    assert_eq!(
        calls[0].body.as_ref().unwrap()["data"][0]["range"],
        json!("'My Sheet'!B5")
    );
    assert!(!ss.sheet_by_id(2).unwrap().has_pending());
}

#[tokio::test]
async fn test_sync_without_pending_is_noop() {
    let executor = Arc::new(RecordingExecutor::new());
    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(2, "Sheet1", 100, 26)]);

    service.sync_sheet(&mut ss, 2).await.unwrap();
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_failed_value_write_keeps_pending() {
    let executor = Arc::new(RecordingExecutor::new());
    executor.respond(json!({
        "error": {"code": 429, "status": "RESOURCE_EXHAUSTED", "message": "quota"}
    }));
    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(2, "Sheet1", 100, 26)]);
    ss.sheet_by_id_mut(2).unwrap().update(0, 0, "x").unwrap();

    let err = service.sync_sheet(&mut ss, 2).await.unwrap_err();
    assert_eq!(err.remote_status(), Some("RESOURCE_EXHAUSTED"));
    assert_eq!(ss.sheet_by_id(2).unwrap().modified_cells().len(), 1);
}

#[tokio::test]
async fn test_failed_expansion_skips_value_write() {
    let executor = Arc::new(RecordingExecutor::new());
    executor.fail(SheetsError::Transport("reset".into()));
    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(2, "Sheet1", 10, 5)]);
    ss.sheet_by_id_mut(2).unwrap().update(20, 0, "x").unwrap();

    assert!(service.sync_sheet(&mut ss, 2).await.is_err());
    assert_eq!(executor.calls().len(), 1);

    let sheet = ss.sheet_by_id(2).unwrap();
    assert_eq!(sheet.grid().row_count, 10);
    assert_eq!(sheet.pending_expansion(), Some((21, 5)));
}

#[tokio::test]
async fn test_reconcile_resets_projection() {
    let executor = Arc::new(RecordingExecutor::new());
    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(2, "Sheet1", 10, 5)]);
    ss.sheet_by_id_mut(2).unwrap().update(20, 8, "x").unwrap();

    service.reconcile(&mut ss, 2).unwrap();
    let sheet = ss.sheet_by_id(2).unwrap();
    assert_eq!(sheet.projection().max_row, 10);
    assert_eq!(sheet.projection().max_column, 5);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_sync_after_reconcile_still_expands() {
    let executor = Arc::new(RecordingExecutor::new());
    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(2, "Sheet1", 10, 5)]);
    ss.sheet_by_id_mut(2).unwrap().update(20, 8, "x").unwrap();

    service.reconcile(&mut ss, 2).unwrap();
    service.sync_sheet(&mut ss, 2).await.unwrap();

    let calls = executor.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].path, "/spreadsheets/abc:batchUpdate");
    assert_eq!(
        calls[0].body.as_ref().unwrap()["requests"][0]["updateSheetProperties"]["properties"]
            ["gridProperties"],
        json!({"rowCount": 21, "columnCount": 9})
    );
    assert_eq!(calls[1].path, "/spreadsheets/abc/values:batchUpdate");
    assert_eq!(
        calls[1].body.as_ref().unwrap()["data"][0]["range"],
        json!("Sheet1!I21")
    );
    assert_eq!(ss.sheet_by_id(2).unwrap().grid().row_count, 21);
}

#[tokio::test]
async fn test_sync_after_failed_delete_expands_to_pending_cells() {
    let executor = Arc::new(RecordingExecutor::new());
    executor.fail(SheetsError::Transport("reset".into()));
    let service = SheetsService::new(executor.clone());
    let mut ss = spreadsheet("abc", "Budget", &[sheet(2, "Sheet1", 100, 26)]);
    ss.sheet_by_id_mut(2).unwrap().update(99, 0, "last").unwrap();

    assert!(service.delete_rows(&mut ss, 2, 2, 5).await.is_err());
    assert_eq!(ss.sheet_by_id(2).unwrap().grid().row_count, 97);

    service.sync_sheet(&mut ss, 2).await.unwrap();

    let calls = executor.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[1].body.as_ref().unwrap()["requests"][0]["updateSheetProperties"],
        json!({
            "properties": {"sheetId": 2, "gridProperties": {"rowCount": 100}},
            "fields": "gridProperties.rowCount"
        })
    );
    assert_eq!(calls[2].path, "/spreadsheets/abc/values:batchUpdate");
    assert!(!ss.sheet_by_id(2).unwrap().has_pending());
}

#[tokio::test]
async fn test_write_past_grid_limit_is_rejected() {
    let mut ss = spreadsheet("abc", "Budget", &[sheet(2, "Sheet1", 10, 5)]);
    let err = ss
        .sheet_by_id_mut(2)
        .unwrap()
        .update(u32::MAX, 0, "x")
        .unwrap_err();
    assert!(matches!(err, SheetsError::InvalidArgument(_)));
}
