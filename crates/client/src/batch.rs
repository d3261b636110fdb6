//! Structural batch updates.
//!
//! A [`BatchUpdate`] collects operations bound for one spreadsheet and sends
//! them as a single atomic call. Property updates compute their diff when
//! appended, against whatever snapshot the caller passes in at that moment.

use crate::request::{
    AddSheetRequest, AppendCellsRequest, DeleteDimensionRequest, DeleteSheetRequest,
    DimensionRange, InsertDimensionRequest, Request, RowData, SheetPropertiesPatch,
    UpdateSheetPropertiesRequest, UpdateSpreadsheetPropertiesRequest,
};
use serde::Deserialize;
use serde_json::json;
use sheetsync_core::{
    Dimension, Sheet, SheetProperties, SheetsError, SheetsResult, Spreadsheet,
    SpreadsheetProperties,
};
use sheetsync_http::{envelope, RequestExecutor};
use tracing::{debug, info};

/// Reply of a structural batch update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchUpdateResponse {
    pub spreadsheet_id: String,
    /// One reply per request, in request order.
    pub replies: Vec<serde_json::Value>,
}

/// Ordered operations destined for one `batchUpdate` call.
#[derive(Debug, Clone)]
pub struct BatchUpdate {
    spreadsheet_id: String,
    requests: Vec<Request>,
}

impl BatchUpdate {
    /// Open a batch scoped to `spreadsheet`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the spreadsheet has no remote ID.
    pub fn open(spreadsheet: &Spreadsheet) -> SheetsResult<Self> {
        Self::for_id(spreadsheet.id())
    }

    /// Open a batch by spreadsheet ID.
    pub fn for_id(spreadsheet_id: &str) -> SheetsResult<Self> {
        if spreadsheet_id.trim().is_empty() {
            return Err(SheetsError::invalid_argument(
                "spreadsheet must have a remote ID",
            ));
        }
        Ok(Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            requests: Vec::with_capacity(1),
        })
    }

    #[must_use]
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Append an operation as-is.
    pub fn push(&mut self, request: Request) -> &mut Self {
        self.requests.push(request);
        self
    }

    // ===== Operations =====

    /// Update spreadsheet properties that differ from `current`.
    ///
    /// Nothing is appended when every field is equal.
    pub fn update_spreadsheet_properties(
        &mut self,
        current: &SpreadsheetProperties,
        proposed: &SpreadsheetProperties,
    ) -> &mut Self {
        match UpdateSpreadsheetPropertiesRequest::diff(current, proposed) {
            Some(req) => self.push(Request::UpdateSpreadsheetProperties(req)),
            None => {
                debug!("spreadsheet properties unchanged; skipping update");
                self
            }
        }
    }

    /// Update the properties of `sheet` that differ from its known snapshot.
    ///
    /// Nothing is appended when every field is equal.
    pub fn update_sheet_properties(&mut self, sheet: &Sheet, proposed: &SheetProperties) -> &mut Self {
        match UpdateSheetPropertiesRequest::diff(sheet.properties(), proposed) {
            Some(req) => self.push(Request::UpdateSheetProperties(req)),
            None => {
                debug!(sheet_id = sheet.id(), "sheet properties unchanged; skipping update");
                self
            }
        }
    }

    /// Add a sheet. The server assigns its ID.
    pub fn add_sheet(&mut self, properties: &SheetProperties) -> &mut Self {
        self.push(Request::AddSheet(AddSheetRequest {
            properties: SheetPropertiesPatch::for_new_sheet(properties),
        }))
    }

    pub fn delete_sheet(&mut self, sheet_id: u32) -> &mut Self {
        self.push(Request::DeleteSheet(DeleteSheetRequest { sheet_id }))
    }

    /// Insert empty rows or columns over the half-open span `start..end`.
    ///
    /// Inserted rows inherit formatting from the row before unless they start
    /// at the top edge.
    pub fn insert_dimension(
        &mut self,
        sheet: &Sheet,
        dimension: Dimension,
        start: u32,
        end: u32,
    ) -> SheetsResult<&mut Self> {
        let range = dimension_range(sheet, dimension, start, end)?;
        Ok(self.push(Request::InsertDimension(InsertDimensionRequest {
            range,
            inherit_from_before: start > 0,
        })))
    }

    /// Delete rows or columns over the half-open span `start..end`.
    pub fn delete_dimension(
        &mut self,
        sheet: &Sheet,
        dimension: Dimension,
        start: u32,
        end: u32,
    ) -> SheetsResult<&mut Self> {
        let range = dimension_range(sheet, dimension, start, end)?;
        Ok(self.push(Request::DeleteDimension(DeleteDimensionRequest { range })))
    }

    /// Append rows of user-entered values after the last row with data.
    pub fn append_cells<S: AsRef<str>>(
        &mut self,
        sheet: &Sheet,
        rows: &[Vec<S>],
    ) -> SheetsResult<&mut Self> {
        if rows.is_empty() {
            return Err(SheetsError::invalid_argument("no rows to append"));
        }
        Ok(self.push(Request::AppendCells(AppendCellsRequest {
            sheet_id: sheet.id(),
            rows: rows.iter().map(|row| RowData::from_values(row)).collect(),
            fields: "userEnteredValue".to_string(),
        })))
    }

    // ===== Submission =====

    /// Request body: `{"requests": [...]}`.
    pub fn body(&self) -> SheetsResult<serde_json::Value> {
        Ok(json!({ "requests": serde_json::to_value(&self.requests)? }))
    }

    /// Send the batch as one `batchUpdate` call.
    ///
    /// # Errors
    ///
    /// Returns `EmptyBatch` without touching the network when no operation was
    /// appended. Remote and transport errors are returned as-is.
    pub async fn submit<E>(&self, executor: &E) -> SheetsResult<BatchUpdateResponse>
    where
        E: RequestExecutor + ?Sized,
    {
        if self.requests.is_empty() {
            return Err(SheetsError::EmptyBatch);
        }

        let path = format!("/spreadsheets/{}:batchUpdate", self.spreadsheet_id);
        let body = executor.post(&path, &self.body()?).await?;
        let response: BatchUpdateResponse = envelope::decode(&body)?;

        info!(
            spreadsheet_id = %self.spreadsheet_id,
            requests = self.requests.len(),
            kinds = ?self.requests.iter().map(Request::kind).collect::<Vec<_>>(),
            "batch update committed"
        );
        Ok(response)
    }
}

fn dimension_range(
    sheet: &Sheet,
    dimension: Dimension,
    start: u32,
    end: u32,
) -> SheetsResult<DimensionRange> {
    if start >= end {
        return Err(SheetsError::invalid_argument(format!(
            "empty {dimension} range: start {start} must be less than end {end}"
        )));
    }
    Ok(DimensionRange {
        sheet_id: sheet.id(),
        dimension,
        start_index: start,
        end_index: end,
    })
}
