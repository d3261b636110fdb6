//! Cell value writes through the `values:batchUpdate` endpoint.
//!
//! Value writes go to a different endpoint than structural updates and are
//! never mixed into a [`BatchUpdate`](crate::batch::BatchUpdate).

use serde::{Deserialize, Serialize};
use sheetsync_core::a1_notation::sheet_qualified;
use sheetsync_core::{Cell, Dimension, Sheet, SheetsError, SheetsResult};
use sheetsync_http::{envelope, RequestExecutor};
use tracing::info;

/// How input values are interpreted by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    /// Stored as-is.
    Raw,
    /// Parsed as if typed into the UI (numbers, dates, formulas).
    #[default]
    UserEntered,
}

/// Values written to one A1 range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: String,
    pub major_dimension: Dimension,
    pub values: Vec<Vec<String>>,
}

impl ValueRange {
    /// Single-cell range for `cell` on `sheet`, e.g. `Sheet1!B3`.
    #[must_use]
    pub fn for_cell(sheet: &Sheet, cell: &Cell) -> Self {
        Self {
            range: sheet_qualified(sheet.title(), &cell.pos()),
            major_dimension: Dimension::Columns,
            values: vec![vec![cell.value.clone()]],
        }
    }
}

/// Reply of a values batch update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValuesBatchUpdateResponse {
    pub spreadsheet_id: String,
    pub total_updated_rows: u32,
    pub total_updated_columns: u32,
    pub total_updated_cells: u32,
}

/// Value ranges destined for one `values:batchUpdate` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesBatchUpdate {
    #[serde(skip)]
    spreadsheet_id: String,
    value_input_option: ValueInputOption,
    data: Vec<ValueRange>,
}

impl ValuesBatchUpdate {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            value_input_option: ValueInputOption::default(),
            data: Vec::new(),
        }
    }

    /// One single-cell range per pending cell of `sheet`, in write order.
    #[must_use]
    pub fn for_pending(sheet: &Sheet) -> Self {
        let mut update = Self::new(sheet.spreadsheet_id());
        update.data = sheet
            .modified_cells()
            .iter()
            .map(|cell| ValueRange::for_cell(sheet, cell))
            .collect();
        update
    }

    #[must_use]
    pub fn with_input_option(mut self, option: ValueInputOption) -> Self {
        self.value_input_option = option;
        self
    }

    pub fn push(&mut self, range: ValueRange) -> &mut Self {
        self.data.push(range);
        self
    }

    #[must_use]
    pub fn data(&self) -> &[ValueRange] {
        &self.data
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Send all ranges in one call.
    ///
    /// # Errors
    ///
    /// Returns `EmptyBatch` without touching the network when there is no data.
    pub async fn submit<E>(&self, executor: &E) -> SheetsResult<ValuesBatchUpdateResponse>
    where
        E: RequestExecutor + ?Sized,
    {
        if self.data.is_empty() {
            return Err(SheetsError::EmptyBatch);
        }
        if self.spreadsheet_id.trim().is_empty() {
            return Err(SheetsError::invalid_argument(
                "spreadsheet must have a remote ID",
            ));
        }

        let path = format!("/spreadsheets/{}/values:batchUpdate", self.spreadsheet_id);
        let body = executor.post(&path, &serde_json::to_value(self)?).await?;
        let response: ValuesBatchUpdateResponse = envelope::decode(&body)?;

        info!(
            spreadsheet_id = %self.spreadsheet_id,
            ranges = self.data.len(),
            updated_cells = response.total_updated_cells,
            "values batch update committed"
        );
        Ok(response)
    }
}
