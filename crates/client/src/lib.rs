//! # sheetsync
//!
//! Keeps a local mirror of a remote spreadsheet and pushes local changes back
//! as batched updates.
//!
//! - [`batch::BatchUpdate`] collects structural operations for one atomic
//!   call, sending only the fields that differ from the known state.
//! - [`values::ValuesBatchUpdate`] writes pending cell values.
//! - [`sync`] refetches the authoritative state after a change commits.
//! - [`SheetsService`] ties these together into one call per mutation.
//!
//! # Examples
//!
//! ```no_run
//! use sheetsync::{ClientConfig, SheetsService};
//!
//! # async fn run() -> sheetsync::SheetsResult<()> {
//! let service = SheetsService::from_config(&ClientConfig::from_env()?)?;
//! let mut spreadsheet = service.fetch_spreadsheet("1AbC").await?;
//! let sheet_id = spreadsheet.sheets()[0].id();
//!
//! service.rename_sheet(&mut spreadsheet, sheet_id, "Data").await?;
//!
//! if let Some(sheet) = spreadsheet.sheet_by_id_mut(sheet_id) {
//!     sheet.update(0, 0, "total")?;
//!     sheet.update(1200, 3, "=SUM(D1:D1199)")?;
//! }
//! service.sync_sheet(&mut spreadsheet, sheet_id).await?;
//! # Ok(())
//! # }
//! ```

/// Structural batch updates.
pub mod batch;
/// Operation variants and field diffs.
pub mod request;
/// High-level mutation coordinator.
pub mod service;
/// Mirror resynchronization.
pub mod sync;
/// Cell value batch updates.
pub mod values;

pub use batch::{BatchUpdate, BatchUpdateResponse};
pub use request::Request;
pub use service::SheetsService;
pub use values::{ValueInputOption, ValueRange, ValuesBatchUpdate};

/// Re-export the mirror model and errors.
pub use sheetsync_core::*;
/// Re-export the transport layer.
pub use sheetsync_http::{ClientConfig, HttpExecutor, RequestExecutor};
