//! Shared helpers for sheetsync integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use sheetsync::{ClientConfig, HttpExecutor, RequestExecutor, SheetsResult, Spreadsheet};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// A request seen by [`RecordingExecutor`].
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<JsonValue>,
}

/// In-memory executor that records calls and replays scripted responses.
///
/// Without a scripted response, calls answer `{}`.
#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<SheetsResult<Vec<u8>>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response for the next call.
    pub fn respond(&self, body: JsonValue) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(serde_json::to_vec(&body).unwrap()));
        self
    }

    /// Queue a failure for the next call.
    pub fn fail(&self, err: sheetsync::SheetsError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, call: Call) -> SheetsResult<Vec<u8>> {
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(b"{}".to_vec()))
    }
}

#[async_trait]
impl RequestExecutor for RecordingExecutor {
    async fn get(&self, path: &str) -> SheetsResult<Vec<u8>> {
        self.next(Call {
            method: "GET",
            path: path.to_string(),
            body: None,
        })
    }

    async fn post(&self, path: &str, body: &JsonValue) -> SheetsResult<Vec<u8>> {
        self.next(Call {
            method: "POST",
            path: path.to_string(),
            body: Some(body.clone()),
        })
    }
}

/// A sheet in a fetch-response fixture.
pub struct SheetFixture<'a> {
    pub id: u32,
    pub title: &'a str,
    pub rows: u32,
    pub columns: u32,
}

pub fn sheet(id: u32, title: &str, rows: u32, columns: u32) -> SheetFixture<'_> {
    SheetFixture {
        id,
        title,
        rows,
        columns,
    }
}

/// Fetch response body for a spreadsheet with the given sheets.
pub fn spreadsheet_json(id: &str, title: &str, sheets: &[SheetFixture<'_>]) -> JsonValue {
    let sheets: Vec<_> = sheets
        .iter()
        .enumerate()
        .map(|(index, s)| {
            json!({
                "properties": {
                    "sheetId": s.id,
                    "title": s.title,
                    "index": index,
                    "sheetType": "GRID",
                    "gridProperties": {"rowCount": s.rows, "columnCount": s.columns}
                }
            })
        })
        .collect();
    json!({
        "spreadsheetId": id,
        "properties": {"title": title, "locale": "en_US", "autoRecalc": "ON_CHANGE", "timeZone": "Etc/GMT"},
        "sheets": sheets
    })
}

/// Decode a fixture into a mirror.
pub fn spreadsheet(id: &str, title: &str, sheets: &[SheetFixture<'_>]) -> Spreadsheet {
    Spreadsheet::from_json(&serde_json::to_vec(&spreadsheet_json(id, title, sheets)).unwrap())
        .unwrap()
}

/// HTTP executor pointed at a mock server.
pub fn http_executor(server: &MockServer) -> HttpExecutor {
    HttpExecutor::new(&ClientConfig::new("test-token").with_base_url(server.uri())).unwrap()
}
