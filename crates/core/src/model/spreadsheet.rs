use super::cell::{Cell, ExtendedValue};
use super::properties::{SheetProperties, SpreadsheetProperties};
use super::sheet::{Sheet, MAX_COLUMNS};
use crate::error::{SheetsError, SheetsResult};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Local mirror of a remote spreadsheet.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "SpreadsheetWire")]
pub struct Spreadsheet {
    id: String,
    properties: SpreadsheetProperties,
    sheets: Vec<Sheet>,
}

impl Spreadsheet {
    /// Create a spreadsheet mirror from its parts.
    #[must_use]
    pub fn new(id: impl Into<String>, properties: SpreadsheetProperties) -> Self {
        Spreadsheet {
            id: id.into(),
            properties,
            sheets: Vec::new(),
        }
    }

    /// Add a sheet to the mirror, e.g. when building a fixture.
    #[must_use]
    pub fn with_sheet(mut self, properties: SheetProperties) -> Self {
        self.sheets.push(Sheet::new(self.id.clone(), properties));
        self
    }

    /// Decode a spreadsheet from a fetch response body.
    pub fn from_json(body: &[u8]) -> SheetsResult<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn properties(&self) -> &SpreadsheetProperties {
        &self.properties
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.properties.title
    }

    /// Sheets in remote order
    #[must_use]
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut [Sheet] {
        &mut self.sheets
    }

    #[must_use]
    pub fn sheet_by_id(&self, sheet_id: u32) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.id() == sheet_id)
    }

    pub fn sheet_by_id_mut(&mut self, sheet_id: u32) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.id() == sheet_id)
    }

    #[must_use]
    pub fn sheet_by_title(&self, title: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.title() == title)
    }

    /// Get a sheet by position (0-based)
    #[must_use]
    pub fn sheet_by_index(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }
}

// ===== Remote representation =====

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetWire {
    #[serde(default)]
    spreadsheet_id: String,
    #[serde(default)]
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetWire>,
}

#[derive(Deserialize)]
struct SheetWire {
    #[serde(default)]
    properties: SheetProperties,
    #[serde(default)]
    data: Vec<GridData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridData {
    #[serde(default)]
    start_row: u32,
    #[serde(default)]
    start_column: u32,
    #[serde(default)]
    row_data: Vec<RowData>,
}

#[derive(Deserialize)]
struct RowData {
    #[serde(default)]
    values: Vec<CellData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellData {
    #[serde(default)]
    user_entered_value: Option<ExtendedValue>,
}

impl TryFrom<SpreadsheetWire> for Spreadsheet {
    type Error = SheetsError;

    fn try_from(wire: SpreadsheetWire) -> SheetsResult<Self> {
        let id = wire.spreadsheet_id;
        let sheets = wire
            .sheets
            .into_iter()
            .map(|sheet| {
                let rows = grid_rows(sheet.data)?;
                Ok(Sheet::new(id.clone(), sheet.properties).with_rows(rows))
            })
            .collect::<SheetsResult<_>>()?;
        Ok(Spreadsheet {
            id,
            properties: wire.properties,
            sheets,
        })
    }
}

fn offset(start: u32, index: usize, what: &str) -> SheetsResult<u32> {
    u32::try_from(index)
        .ok()
        .and_then(|i| start.checked_add(i))
        .ok_or_else(|| SheetsError::Decode(format!("{what} index out of range: {start} + {index}")))
}

fn grid_rows(data: Vec<GridData>) -> SheetsResult<BTreeMap<u32, Vec<Cell>>> {
    let mut rows: BTreeMap<u32, Vec<Cell>> = BTreeMap::new();
    for grid in data {
        for (i, row_data) in grid.row_data.into_iter().enumerate() {
            if row_data.values.is_empty() {
                continue;
            }
            let row = offset(grid.start_row, i, "row")?;
            let cells = rows.entry(row).or_default();
            for (j, cell) in row_data.values.into_iter().enumerate() {
                let column = offset(grid.start_column, j, "column")?;
                if column >= MAX_COLUMNS {
                    return Err(SheetsError::Decode(format!(
                        "column {column} exceeds the {MAX_COLUMNS}-column limit"
                    )));
                }
                while cells.len() < column as usize {
                    let next = cells.len() as u32;
                    cells.push(Cell::new(row, next, ""));
                }
                let value = cell
                    .user_entered_value
                    .map(ExtendedValue::into_text)
                    .unwrap_or_default();
                match cells.get_mut(column as usize) {
                    Some(existing) => existing.value = value,
                    None => cells.push(Cell::new(row, column, value)),
                }
            }
        }
    }
    Ok(rows)
}
