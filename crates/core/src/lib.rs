//! # sheetsync-core
//!
//! Core types for sheetsync.
//!
//! This crate provides:
//! - The local spreadsheet mirror (spreadsheet, sheet, cell, properties)
//! - A1 notation helpers
//! - Error types

/// A1 notation helpers.
pub mod a1_notation;
/// Error types and result aliases.
pub mod error;
/// Spreadsheet mirror types.
pub mod model;

/// Re-export core error types.
pub use error::{SheetsError, SheetsResult};
/// Re-export the mirror types.
pub use model::{
    Cell, Color, Dimension, GridProjection, GridProperties, RecalculationInterval, Sheet,
    SheetProperties, Spreadsheet, SpreadsheetProperties, MAX_COLUMNS, MAX_ROWS,
};
