//! Value objects describing spreadsheet and sheet properties.
//!
//! Field names follow the remote representation (camelCase) so the same types
//! deserialize fetch responses and describe desired state for mutations.

use serde::{Deserialize, Serialize};

/// Recalculation mode of volatile functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecalculationInterval {
    OnChange,
    Minute,
    Hour,
    #[default]
    #[serde(rename = "RECALCULATION_INTERVAL_UNSPECIFIED")]
    #[serde(other)]
    Unspecified,
}

/// Spreadsheet-level properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpreadsheetProperties {
    pub title: String,
    pub locale: String,
    pub auto_recalc: RecalculationInterval,
    pub time_zone: String,
}

impl SpreadsheetProperties {
    /// Properties with only a title set.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Grid dimensions and display flags of a sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridProperties {
    pub row_count: u32,
    pub column_count: u32,
    pub frozen_row_count: u32,
    pub frozen_column_count: u32,
    pub hide_gridlines: bool,
}

impl GridProperties {
    /// Grid of the given size with no frozen rows or columns.
    #[must_use]
    pub fn sized(row_count: u32, column_count: u32) -> Self {
        Self {
            row_count,
            column_count,
            ..Self::default()
        }
    }

    /// Count along a dimension.
    #[must_use]
    pub fn count(&self, dimension: Dimension) -> u32 {
        match dimension {
            Dimension::Rows => self.row_count,
            Dimension::Columns => self.column_count,
        }
    }

    pub(crate) fn count_mut(&mut self, dimension: Dimension) -> &mut u32 {
        match dimension {
            Dimension::Rows => &mut self.row_count,
            Dimension::Columns => &mut self.column_count,
        }
    }
}

/// RGBA color; components are in `0.0..=1.0` and omitted remotely when zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

/// Sheet-level properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetProperties {
    pub sheet_id: u32,
    pub title: String,
    pub index: u32,
    pub grid_properties: GridProperties,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_color: Option<Color>,
    pub right_to_left: bool,
}

impl SheetProperties {
    /// Properties with only a title set, as used when adding a sheet.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Major dimension of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Rows,
    Columns,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Rows => write!(f, "ROWS"),
            Dimension::Columns => write!(f, "COLUMNS"),
        }
    }
}
