//! Resynchronization of the local mirror with the server.
//!
//! After a structural change commits, the whole spreadsheet is fetched again
//! and its properties and sheet collection replace the local ones. Nothing
//! structural is merged. Cell writes still pending on a sheet that survives
//! the reload are replayed onto the fresh sheet so they are not lost.

use sheetsync_core::{SheetsResult, Spreadsheet};
use sheetsync_http::{envelope, RequestExecutor};
use tracing::{debug, info, warn};

/// Field projection used for fetches: metadata, sheet properties and
/// user-entered cell values.
pub const FETCH_FIELDS: &str =
    "spreadsheetId,properties,sheets(properties,data.rowData.values(userEnteredValue))";

/// Fetch path for a spreadsheet, with the field projection applied.
#[must_use]
pub fn fetch_path(spreadsheet_id: &str) -> String {
    format!(
        "/spreadsheets/{}?fields={}",
        urlencoding::encode(spreadsheet_id),
        urlencoding::encode(FETCH_FIELDS)
    )
}

/// Fetch the authoritative state of a spreadsheet.
pub async fn fetch<E>(executor: &E, spreadsheet_id: &str) -> SheetsResult<Spreadsheet>
where
    E: RequestExecutor + ?Sized,
{
    debug!(spreadsheet_id, "fetching spreadsheet");
    let body = executor.get(&fetch_path(spreadsheet_id)).await?;
    envelope::check_error(&body)?;
    Spreadsheet::from_json(&body)
}

/// Refetch `spreadsheet` and overwrite the local mirror with the result.
pub async fn reload<E>(executor: &E, spreadsheet: &mut Spreadsheet) -> SheetsResult<()>
where
    E: RequestExecutor + ?Sized,
{
    let fresh = fetch(executor, spreadsheet.id()).await?;
    replace(spreadsheet, fresh);
    info!(
        spreadsheet_id = %spreadsheet.id(),
        sheets = spreadsheet.sheets().len(),
        "spreadsheet reloaded"
    );
    Ok(())
}

/// Replace `spreadsheet` wholesale with `fresh`, replaying pending writes.
pub fn replace(spreadsheet: &mut Spreadsheet, fresh: Spreadsheet) {
    let previous = std::mem::replace(spreadsheet, fresh);

    for old in previous.sheets().iter().filter(|s| s.has_pending()) {
        match spreadsheet.sheet_by_id_mut(old.id()) {
            Some(sheet) => {
                for cell in old.modified_cells() {
                    if let Err(err) = sheet.update(cell.row, cell.column, cell.value.clone()) {
                        warn!(sheet_id = old.id(), %err, "dropping pending cell write");
                    }
                }
            }
            None => warn!(
                sheet_id = old.id(),
                pending = old.modified_cells().len(),
                "sheet no longer exists; dropping pending cell writes"
            ),
        }
    }
}
