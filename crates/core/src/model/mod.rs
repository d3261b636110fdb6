//! In-memory mirror of remote spreadsheet state.

mod cell;
mod properties;
mod sheet;
mod spreadsheet;

pub use cell::Cell;
pub use properties::{
    Color, Dimension, GridProperties, RecalculationInterval, SheetProperties,
    SpreadsheetProperties,
};
pub use sheet::{GridProjection, Sheet, MAX_COLUMNS, MAX_ROWS};
pub use spreadsheet::Spreadsheet;
