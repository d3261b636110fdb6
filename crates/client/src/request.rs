//! Structural update operations.
//!
//! Each supported operation kind is one variant of [`Request`]. Variants
//! serialize externally tagged, so a request renders as
//! `{"<operationName>": {...}}` inside the batch body. Update variants carry a
//! sparse properties payload plus the field mask naming what it changes.

use serde::Serialize;
use sheetsync_core::{
    Color, Dimension, GridProperties, RecalculationInterval, SheetProperties,
    SpreadsheetProperties,
};

/// One operation of a structural batch update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    UpdateSpreadsheetProperties(UpdateSpreadsheetPropertiesRequest),
    UpdateSheetProperties(UpdateSheetPropertiesRequest),
    AddSheet(AddSheetRequest),
    DeleteSheet(DeleteSheetRequest),
    InsertDimension(InsertDimensionRequest),
    DeleteDimension(DeleteDimensionRequest),
    AppendCells(AppendCellsRequest),
}

impl Request {
    /// Remote operation name, as used for the variant's key.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Request::UpdateSpreadsheetProperties(_) => "updateSpreadsheetProperties",
            Request::UpdateSheetProperties(_) => "updateSheetProperties",
            Request::AddSheet(_) => "addSheet",
            Request::DeleteSheet(_) => "deleteSheet",
            Request::InsertDimension(_) => "insertDimension",
            Request::DeleteDimension(_) => "deleteDimension",
            Request::AppendCells(_) => "appendCells",
        }
    }
}

// ===== Field diffs =====

/// Collects the dotted paths of fields whose proposed value differs.
#[derive(Debug, Default)]
struct FieldDiff {
    prefix: &'static str,
    fields: Vec<String>,
}

impl FieldDiff {
    fn nested(prefix: &'static str) -> Self {
        Self {
            prefix,
            fields: Vec::new(),
        }
    }

    /// Returns the proposed value when it differs from the current one.
    fn field<T: PartialEq + Clone>(&mut self, name: &str, current: &T, proposed: &T) -> Option<T> {
        if current == proposed {
            return None;
        }
        if self.prefix.is_empty() {
            self.fields.push(name.to_string());
        } else {
            self.fields.push(format!("{}.{name}", self.prefix));
        }
        Some(proposed.clone())
    }
}

/// Comma-joined list of dotted field paths.
fn join_mask(fields: &[String]) -> String {
    fields.join(",")
}

/// Changed spreadsheet properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetPropertiesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_recalc: Option<RecalculationInterval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl SpreadsheetPropertiesPatch {
    /// Diff `proposed` against `current`.
    ///
    /// Returns the patch and its field mask, or `None` when nothing differs.
    #[must_use]
    pub fn between(
        current: &SpreadsheetProperties,
        proposed: &SpreadsheetProperties,
    ) -> Option<(Self, Vec<String>)> {
        let mut diff = FieldDiff::default();
        let patch = Self {
            title: diff.field("title", &current.title, &proposed.title),
            locale: diff.field("locale", &current.locale, &proposed.locale),
            auto_recalc: diff.field("autoRecalc", &current.auto_recalc, &proposed.auto_recalc),
            time_zone: diff.field("timeZone", &current.time_zone, &proposed.time_zone),
        };
        (!diff.fields.is_empty()).then_some((patch, diff.fields))
    }
}

/// Changed grid properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPropertiesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen_row_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen_column_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_gridlines: Option<bool>,
}

impl GridPropertiesPatch {
    fn between(diff: &mut FieldDiff, current: &GridProperties, proposed: &GridProperties) -> Self {
        Self {
            row_count: diff.field("rowCount", &current.row_count, &proposed.row_count),
            column_count: diff.field("columnCount", &current.column_count, &proposed.column_count),
            frozen_row_count: diff.field(
                "frozenRowCount",
                &current.frozen_row_count,
                &proposed.frozen_row_count,
            ),
            frozen_column_count: diff.field(
                "frozenColumnCount",
                &current.frozen_column_count,
                &proposed.frozen_column_count,
            ),
            hide_gridlines: diff.field(
                "hideGridlines",
                &current.hide_gridlines,
                &proposed.hide_gridlines,
            ),
        }
    }
}

/// Changed sheet properties. `sheet_id` identifies the target and is not part
/// of the field mask.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetPropertiesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_properties: Option<GridPropertiesPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    /// A cleared tab color is listed in the mask but absent here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_to_left: Option<bool>,
}

impl SheetPropertiesPatch {
    /// Diff `proposed` against the sheet's `current` properties.
    ///
    /// Returns the patch (always carrying the current sheet ID) and its field
    /// mask, or `None` when nothing differs.
    #[must_use]
    pub fn between(
        current: &SheetProperties,
        proposed: &SheetProperties,
    ) -> Option<(Self, Vec<String>)> {
        let (mut patch, fields) = Self::diff(current, proposed);
        patch.sheet_id = Some(current.sheet_id);
        (!fields.is_empty()).then_some((patch, fields))
    }

    fn diff(current: &SheetProperties, proposed: &SheetProperties) -> (Self, Vec<String>) {
        let mut diff = FieldDiff::default();
        let title = diff.field("title", &current.title, &proposed.title);
        let index = diff.field("index", &current.index, &proposed.index);

        let mut grid_diff = FieldDiff::nested("gridProperties");
        let grid = GridPropertiesPatch::between(
            &mut grid_diff,
            &current.grid_properties,
            &proposed.grid_properties,
        );
        let grid_properties = (!grid_diff.fields.is_empty()).then_some(grid);
        diff.fields.append(&mut grid_diff.fields);

        let hidden = diff.field("hidden", &current.hidden, &proposed.hidden);
        let tab_color = diff
            .field("tabColor", &current.tab_color, &proposed.tab_color)
            .flatten();
        let right_to_left = diff.field("rightToLeft", &current.right_to_left, &proposed.right_to_left);

        let patch = Self {
            sheet_id: None,
            title,
            index,
            grid_properties,
            hidden,
            tab_color,
            right_to_left,
        };
        (patch, diff.fields)
    }

    /// Properties for a new sheet: every field that differs from the defaults.
    /// The sheet ID is left for the server to assign.
    #[must_use]
    pub fn for_new_sheet(proposed: &SheetProperties) -> Self {
        Self::diff(&SheetProperties::default(), proposed).0
    }
}

// ===== Request payloads =====

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateSpreadsheetPropertiesRequest {
    pub properties: SpreadsheetPropertiesPatch,
    pub fields: String,
}

impl UpdateSpreadsheetPropertiesRequest {
    /// `None` when `proposed` equals `current` in every field.
    #[must_use]
    pub fn diff(current: &SpreadsheetProperties, proposed: &SpreadsheetProperties) -> Option<Self> {
        SpreadsheetPropertiesPatch::between(current, proposed).map(|(properties, fields)| Self {
            properties,
            fields: join_mask(&fields),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateSheetPropertiesRequest {
    pub properties: SheetPropertiesPatch,
    pub fields: String,
}

impl UpdateSheetPropertiesRequest {
    /// `None` when `proposed` equals `current` in every field.
    #[must_use]
    pub fn diff(current: &SheetProperties, proposed: &SheetProperties) -> Option<Self> {
        SheetPropertiesPatch::between(current, proposed).map(|(properties, fields)| Self {
            properties,
            fields: join_mask(&fields),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddSheetRequest {
    pub properties: SheetPropertiesPatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSheetRequest {
    pub sheet_id: u32,
}

/// Half-open, zero-based span of rows or columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: u32,
    pub dimension: Dimension,
    pub start_index: u32,
    pub end_index: u32,
}

impl DimensionRange {
    /// Number of rows or columns covered.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.end_index.saturating_sub(self.start_index)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertDimensionRequest {
    pub range: DimensionRange,
    pub inherit_from_before: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteDimensionRequest {
    pub range: DimensionRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendCellsRequest {
    pub sheet_id: u32,
    pub rows: Vec<RowData>,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowData {
    pub values: Vec<CellData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub user_entered_value: ExtendedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedValue {
    pub string_value: String,
}

impl RowData {
    /// A row of user-entered string values.
    pub fn from_values<S: AsRef<str>>(values: &[S]) -> Self {
        Self {
            values: values
                .iter()
                .map(|v| CellData {
                    user_entered_value: ExtendedValue {
                        string_value: v.as_ref().to_string(),
                    },
                })
                .collect(),
        }
    }
}
