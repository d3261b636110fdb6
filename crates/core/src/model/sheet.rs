use super::cell::Cell;
use super::properties::{Dimension, GridProperties, SheetProperties};
use crate::error::{SheetsError, SheetsResult};
use std::collections::BTreeMap;

/// Largest row count the remote API accepts for a sheet.
pub const MAX_ROWS: u32 = 10_000_000;
/// Largest column count the remote API accepts for a sheet (`ZZZ`).
pub const MAX_COLUMNS: u32 = 18_278;

/// Optimistic local projection of a sheet's grid bounds.
///
/// Never smaller than the confirmed grid; grows ahead of the server when cell
/// writes address positions past the confirmed bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridProjection {
    pub max_row: u32,
    pub max_column: u32,
}

impl GridProjection {
    fn of(grid: &GridProperties) -> Self {
        Self {
            max_row: grid.row_count,
            max_column: grid.column_count,
        }
    }

    fn get_mut(&mut self, dimension: Dimension) -> &mut u32 {
        match dimension {
            Dimension::Rows => &mut self.max_row,
            Dimension::Columns => &mut self.max_column,
        }
    }
}

/// A sheet of a mirrored spreadsheet.
///
/// Holds the confirmed properties as last seen from the server next to the
/// pending local state: the grid projection and the cells written locally
/// but not yet flushed. Cell rows are stored sparsely by row index.
#[derive(Debug, Clone)]
pub struct Sheet {
    spreadsheet_id: String,
    properties: SheetProperties,
    rows: BTreeMap<u32, Vec<Cell>>,
    projection: GridProjection,
    modified_cells: Vec<Cell>,
}

impl Sheet {
    /// Create a sheet with no cell data.
    #[must_use]
    pub fn new(spreadsheet_id: impl Into<String>, properties: SheetProperties) -> Self {
        let projection = GridProjection::of(&properties.grid_properties);
        Sheet {
            spreadsheet_id: spreadsheet_id.into(),
            properties,
            rows: BTreeMap::new(),
            projection,
            modified_cells: Vec::new(),
        }
    }

    pub(crate) fn with_rows(mut self, rows: BTreeMap<u32, Vec<Cell>>) -> Self {
        self.rows = rows;
        self
    }

    /// ID of the owning spreadsheet
    #[must_use]
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Confirmed properties
    #[must_use]
    pub fn properties(&self) -> &SheetProperties {
        &self.properties
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.properties.sheet_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.properties.title
    }

    #[must_use]
    pub fn grid(&self) -> &GridProperties {
        &self.properties.grid_properties
    }

    #[must_use]
    pub fn projection(&self) -> GridProjection {
        self.projection
    }

    /// Cells written locally and awaiting flush, in write order.
    #[must_use]
    pub fn modified_cells(&self) -> &[Cell] {
        &self.modified_cells
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.modified_cells.is_empty()
    }

    // ===== Cell Access =====

    /// Stored rows in row order, as fetched plus local writes. Rows never
    /// fetched or written are absent.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &[Cell])> + '_ {
        self.rows.iter().map(|(&row, cells)| (row, cells.as_slice()))
    }

    /// Cells of one row; empty if the row holds no data.
    #[must_use]
    pub fn row(&self, row: u32) -> &[Cell] {
        self.rows.get(&row).map(Vec::as_slice).unwrap_or_default()
    }

    /// Cells grouped by column. Short rows are skipped in each column.
    #[must_use]
    pub fn columns(&self) -> Vec<Vec<&Cell>> {
        let width = self.rows.values().map(Vec::len).max().unwrap_or(0);
        (0..width)
            .map(|col| self.rows.values().filter_map(|row| row.get(col)).collect())
            .collect()
    }

    /// Get a cell by 0-based position
    #[must_use]
    pub fn cell(&self, row: u32, column: u32) -> Option<&Cell> {
        self.rows.get(&row)?.get(column as usize)
    }

    /// Write a cell value locally.
    ///
    /// The write is staged for the next flush and the projection grows to
    /// cover the position if it lies past the current bounds.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the position lies beyond [`MAX_ROWS`] or
    /// [`MAX_COLUMNS`].
    pub fn update(&mut self, row: u32, column: u32, value: impl Into<String>) -> SheetsResult<()> {
        if row >= MAX_ROWS || column >= MAX_COLUMNS {
            return Err(SheetsError::invalid_argument(format!(
                "cell ({row}, {column}) is outside the {MAX_ROWS}x{MAX_COLUMNS} grid limit"
            )));
        }
        let value = value.into();

        let cells = self.rows.entry(row).or_default();
        while cells.len() <= column as usize {
            let next = cells.len() as u32;
            cells.push(Cell::new(row, next, ""));
        }
        cells[column as usize].value.clone_from(&value);

        match self
            .modified_cells
            .iter_mut()
            .find(|c| c.row == row && c.column == column)
        {
            Some(cell) => cell.value = value,
            None => self.modified_cells.push(Cell::new(row, column, value)),
        }

        self.projection.max_row = self.projection.max_row.max(row + 1);
        self.projection.max_column = self.projection.max_column.max(column + 1);
        Ok(())
    }

    // ===== Reconciliation =====

    /// Target bounds when pending writes reach past the confirmed grid.
    ///
    /// Computed from the pending cells themselves, so it holds after the
    /// projection has been reset or shrunk.
    #[must_use]
    pub fn pending_expansion(&self) -> Option<(u32, u32)> {
        let grid = self.grid();
        let (rows, columns) = self.modified_cells.iter().fold(
            (grid.row_count, grid.column_count),
            |(rows, columns), cell| (rows.max(cell.row + 1), columns.max(cell.column + 1)),
        );
        (rows > grid.row_count || columns > grid.column_count).then_some((rows, columns))
    }

    /// Replace the projection with the confirmed grid bounds.
    pub fn reconcile(&mut self) {
        self.projection = GridProjection::of(&self.properties.grid_properties);
    }

    /// Drop all pending cell writes and reconcile the projection.
    pub fn clear_pending(&mut self) {
        self.modified_cells.clear();
        self.reconcile();
    }

    /// Record grid bounds the server has accepted.
    pub fn confirm_grid(&mut self, row_count: u32, column_count: u32) {
        let grid = &mut self.properties.grid_properties;
        grid.row_count = row_count;
        grid.column_count = column_count;
        self.projection.max_row = self.projection.max_row.max(row_count);
        self.projection.max_column = self.projection.max_column.max(column_count);
    }

    /// Optimistically remove `n` rows or columns from the confirmed grid and
    /// the projection, ahead of server confirmation.
    pub fn shrink_dimension(&mut self, dimension: Dimension, n: u32) {
        let confirmed = self.properties.grid_properties.count_mut(dimension);
        *confirmed = confirmed.saturating_sub(n);
        let confirmed = *confirmed;

        let projected = self.projection.get_mut(dimension);
        *projected = projected.saturating_sub(n).max(confirmed);
    }

    /// Optimistically add `n` rows or columns to the confirmed grid and the
    /// projection, ahead of server confirmation.
    pub fn grow_dimension(&mut self, dimension: Dimension, n: u32) {
        let confirmed = self.properties.grid_properties.count_mut(dimension);
        *confirmed = confirmed.saturating_add(n);
        let projected = self.projection.get_mut(dimension);
        *projected = projected.saturating_add(n);
    }
}
