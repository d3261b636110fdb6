//! High-level mutations of a mirrored spreadsheet.
//!
//! Every operation runs build → submit → resync in a straight line and
//! returns the first error it meets. Row and column deletions adjust the
//! local grid before the call goes out and are not rolled back on failure;
//! use [`SheetsService::reconcile`] or [`SheetsService::reload_spreadsheet`]
//! to repair the mirror afterwards.

use crate::batch::BatchUpdate;
use crate::sync;
use crate::values::ValuesBatchUpdate;
use serde::Deserialize;
use serde_json::json;
use sheetsync_core::{
    Dimension, Sheet, SheetProperties, SheetsError, SheetsResult, Spreadsheet,
    SpreadsheetProperties,
};
use sheetsync_http::{envelope, ClientConfig, HttpExecutor, RequestExecutor};
use tracing::{debug, info};

/// Entry point for mirroring and mutating remote spreadsheets.
#[derive(Debug, Clone)]
pub struct SheetsService<E> {
    executor: E,
}

impl SheetsService<HttpExecutor> {
    /// Service over an HTTP executor built from `config`.
    pub fn from_config(config: &ClientConfig) -> SheetsResult<Self> {
        Ok(Self::new(HttpExecutor::new(config)?))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Created {
    spreadsheet_id: String,
}

impl<E: RequestExecutor> SheetsService<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    // ===== Spreadsheets =====

    /// Create a spreadsheet with the given sheets and fetch it.
    pub async fn create_spreadsheet(
        &self,
        title: &str,
        sheet_titles: &[&str],
    ) -> SheetsResult<Spreadsheet> {
        let sheets: Vec<_> = sheet_titles
            .iter()
            .map(|t| json!({ "properties": { "title": t } }))
            .collect();
        let body = json!({
            "properties": { "title": title },
            "sheets": sheets,
        });

        let reply = self.executor.post("/spreadsheets", &body).await?;
        let created: Created = envelope::decode(&reply)?;
        info!(spreadsheet_id = %created.spreadsheet_id, "spreadsheet created");
        self.fetch_spreadsheet(&created.spreadsheet_id).await
    }

    pub async fn fetch_spreadsheet(&self, spreadsheet_id: &str) -> SheetsResult<Spreadsheet> {
        sync::fetch(&self.executor, spreadsheet_id).await
    }

    /// Replace the mirror with the server's current state.
    pub async fn reload_spreadsheet(&self, spreadsheet: &mut Spreadsheet) -> SheetsResult<()> {
        sync::reload(&self.executor, spreadsheet).await
    }

    /// Update whichever spreadsheet properties differ from the mirror.
    ///
    /// # Errors
    ///
    /// `EmptyBatch` when `properties` matches the mirror in every field.
    pub async fn update_spreadsheet_properties(
        &self,
        spreadsheet: &mut Spreadsheet,
        properties: &SpreadsheetProperties,
    ) -> SheetsResult<()> {
        let mut batch = BatchUpdate::open(spreadsheet)?;
        batch.update_spreadsheet_properties(spreadsheet.properties(), properties);
        self.commit(&batch, spreadsheet).await
    }

    pub async fn rename_spreadsheet(
        &self,
        spreadsheet: &mut Spreadsheet,
        title: &str,
    ) -> SheetsResult<()> {
        let mut properties = spreadsheet.properties().clone();
        properties.title = title.to_string();
        self.update_spreadsheet_properties(spreadsheet, &properties)
            .await
    }

    // ===== Sheets =====

    /// Update whichever sheet properties differ from the mirror.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an unknown sheet; `EmptyBatch` when nothing
    /// differs.
    pub async fn update_sheet_properties(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        properties: &SheetProperties,
    ) -> SheetsResult<()> {
        let mut batch = BatchUpdate::open(spreadsheet)?;
        batch.update_sheet_properties(sheet(spreadsheet, sheet_id)?, properties);
        self.commit(&batch, spreadsheet).await
    }

    pub async fn rename_sheet(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        title: &str,
    ) -> SheetsResult<()> {
        self.edit_sheet(spreadsheet, sheet_id, |p| p.title = title.to_string())
            .await
    }

    /// Set the sheet's row and column counts.
    pub async fn resize_sheet(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        rows: u32,
        columns: u32,
    ) -> SheetsResult<()> {
        self.edit_sheet(spreadsheet, sheet_id, |p| {
            p.grid_properties.row_count = rows;
            p.grid_properties.column_count = columns;
        })
        .await
    }

    pub async fn set_sheet_hidden(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        hidden: bool,
    ) -> SheetsResult<()> {
        self.edit_sheet(spreadsheet, sheet_id, |p| p.hidden = hidden)
            .await
    }

    /// Move the sheet to a new tab position.
    pub async fn move_sheet(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        index: u32,
    ) -> SheetsResult<()> {
        self.edit_sheet(spreadsheet, sheet_id, |p| p.index = index)
            .await
    }

    /// Freeze the leading rows and columns.
    pub async fn freeze(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        rows: u32,
        columns: u32,
    ) -> SheetsResult<()> {
        self.edit_sheet(spreadsheet, sheet_id, |p| {
            p.grid_properties.frozen_row_count = rows;
            p.grid_properties.frozen_column_count = columns;
        })
        .await
    }

    async fn edit_sheet(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        edit: impl FnOnce(&mut SheetProperties),
    ) -> SheetsResult<()> {
        let mut properties = sheet(spreadsheet, sheet_id)?.properties().clone();
        edit(&mut properties);
        self.update_sheet_properties(spreadsheet, sheet_id, &properties)
            .await
    }

    pub async fn add_sheet(
        &self,
        spreadsheet: &mut Spreadsheet,
        properties: &SheetProperties,
    ) -> SheetsResult<()> {
        let mut batch = BatchUpdate::open(spreadsheet)?;
        batch.add_sheet(properties);
        self.commit(&batch, spreadsheet).await
    }

    pub async fn delete_sheet(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
    ) -> SheetsResult<()> {
        let mut batch = BatchUpdate::open(spreadsheet)?;
        batch.delete_sheet(sheet(spreadsheet, sheet_id)?.id());
        self.commit(&batch, spreadsheet).await
    }

    // ===== Rows & Columns =====

    /// Insert rows `start..end` (zero-based, half-open).
    pub async fn insert_rows(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        start: u32,
        end: u32,
    ) -> SheetsResult<()> {
        self.insert_dimension(spreadsheet, sheet_id, Dimension::Rows, start, end)
            .await
    }

    /// Insert columns `start..end` (zero-based, half-open).
    pub async fn insert_columns(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        start: u32,
        end: u32,
    ) -> SheetsResult<()> {
        self.insert_dimension(spreadsheet, sheet_id, Dimension::Columns, start, end)
            .await
    }

    /// Delete rows `start..end` (zero-based, half-open).
    ///
    /// The sheet's row count and projection drop by `end - start` before the
    /// call is sent and stay that way if it fails.
    pub async fn delete_rows(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        start: u32,
        end: u32,
    ) -> SheetsResult<()> {
        self.delete_dimension(spreadsheet, sheet_id, Dimension::Rows, start, end)
            .await
    }

    /// Delete columns `start..end` (zero-based, half-open).
    ///
    /// The sheet's column count and projection drop by `end - start` before
    /// the call is sent and stay that way if it fails.
    pub async fn delete_columns(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        start: u32,
        end: u32,
    ) -> SheetsResult<()> {
        self.delete_dimension(spreadsheet, sheet_id, Dimension::Columns, start, end)
            .await
    }

    async fn insert_dimension(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        dimension: Dimension,
        start: u32,
        end: u32,
    ) -> SheetsResult<()> {
        let mut batch = BatchUpdate::open(spreadsheet)?;
        let target = sheet_mut(spreadsheet, sheet_id)?;
        batch.insert_dimension(target, dimension, start, end)?;
        target.grow_dimension(dimension, end - start);
        self.commit(&batch, spreadsheet).await
    }

    async fn delete_dimension(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        dimension: Dimension,
        start: u32,
        end: u32,
    ) -> SheetsResult<()> {
        let mut batch = BatchUpdate::open(spreadsheet)?;
        let target = sheet_mut(spreadsheet, sheet_id)?;
        batch.delete_dimension(target, dimension, start, end)?;
        target.shrink_dimension(dimension, end - start);
        debug!(
            sheet_id,
            %dimension,
            count = end - start,
            "applied optimistic dimension delete"
        );
        self.commit(&batch, spreadsheet).await
    }

    // ===== Cells =====

    /// Append rows of values after the sheet's last row with data.
    pub async fn append_cells<S: AsRef<str> + Sync>(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        rows: &[Vec<S>],
    ) -> SheetsResult<()> {
        let mut batch = BatchUpdate::open(spreadsheet)?;
        batch.append_cells(sheet(spreadsheet, sheet_id)?, rows)?;
        self.commit(&batch, spreadsheet).await
    }

    /// Grow the sheet's grid to `rows` × `columns`.
    ///
    /// On success the mirror records the new bounds without refetching.
    pub async fn expand_sheet(
        &self,
        spreadsheet: &mut Spreadsheet,
        sheet_id: u32,
        rows: u32,
        columns: u32,
    ) -> SheetsResult<()> {
        let mut batch = BatchUpdate::open(spreadsheet)?;
        let target = sheet_mut(spreadsheet, sheet_id)?;

        let mut properties = target.properties().clone();
        properties.grid_properties.row_count = rows;
        properties.grid_properties.column_count = columns;
        batch.update_sheet_properties(target, &properties);

        batch.submit(&self.executor).await?;
        target.confirm_grid(rows, columns);
        info!(sheet_id, rows, columns, "sheet expanded");
        Ok(())
    }

    /// Flush the sheet's pending cell writes.
    ///
    /// When the writes reach past the known grid, the grid is expanded first
    /// in its own batch, since the server rejects writes outside it. All cells
    /// then go out in one values call. On success the pending list is cleared
    /// and the projection reset to the confirmed grid. Does nothing when no
    /// write is pending.
    pub async fn sync_sheet(&self, spreadsheet: &mut Spreadsheet, sheet_id: u32) -> SheetsResult<()> {
        let target = sheet_mut(spreadsheet, sheet_id)?;
        if !target.has_pending() {
            debug!(sheet_id, "no pending cell writes");
            return Ok(());
        }

        if let Some((rows, columns)) = target.pending_expansion() {
            self.expand_sheet(spreadsheet, sheet_id, rows, columns)
                .await?;
        }

        let target = sheet_mut(spreadsheet, sheet_id)?;
        ValuesBatchUpdate::for_pending(target)
            .submit(&self.executor)
            .await?;
        target.clear_pending();
        Ok(())
    }

    /// Reset a sheet's projection to its confirmed grid bounds, without any
    /// network call.
    pub fn reconcile(&self, spreadsheet: &mut Spreadsheet, sheet_id: u32) -> SheetsResult<()> {
        sheet_mut(spreadsheet, sheet_id)?.reconcile();
        Ok(())
    }

    async fn commit(&self, batch: &BatchUpdate, spreadsheet: &mut Spreadsheet) -> SheetsResult<()> {
        batch.submit(&self.executor).await?;
        sync::reload(&self.executor, spreadsheet).await
    }
}

fn sheet(spreadsheet: &Spreadsheet, sheet_id: u32) -> SheetsResult<&Sheet> {
    spreadsheet
        .sheet_by_id(sheet_id)
        .ok_or_else(|| missing_sheet(spreadsheet.id(), sheet_id))
}

fn sheet_mut(spreadsheet: &mut Spreadsheet, sheet_id: u32) -> SheetsResult<&mut Sheet> {
    let id = spreadsheet.id().to_string();
    spreadsheet
        .sheet_by_id_mut(sheet_id)
        .ok_or_else(|| missing_sheet(&id, sheet_id))
}

fn missing_sheet(spreadsheet_id: &str, sheet_id: u32) -> SheetsError {
    SheetsError::invalid_argument(format!(
        "sheet {sheet_id} not found in spreadsheet {spreadsheet_id}"
    ))
}
