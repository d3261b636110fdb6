use crate::a1_notation::to_a1_notation;
use serde::Deserialize;

/// A single cell value at a 0-based grid position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub row: u32,
    pub column: u32,
    pub value: String,
}

impl Cell {
    pub fn new(row: u32, column: u32, value: impl Into<String>) -> Self {
        Cell {
            row,
            column,
            value: value.into(),
        }
    }

    /// A1-style position, e.g. `AB1` for row 0, column 27.
    #[must_use]
    pub fn pos(&self) -> String {
        to_a1_notation(self.row as usize, self.column as usize)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Remote `userEnteredValue`; exactly one field is set when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ExtendedValue {
    string_value: Option<String>,
    number_value: Option<f64>,
    bool_value: Option<bool>,
    formula_value: Option<String>,
    error_value: Option<ErrorValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ErrorValue {
    message: String,
}

impl ExtendedValue {
    /// Flatten to the string form used by the local mirror.
    pub(crate) fn into_text(self) -> String {
        if let Some(s) = self.string_value {
            s
        } else if let Some(n) = self.number_value {
            n.to_string()
        } else if let Some(b) = self.bool_value {
            if b { "TRUE" } else { "FALSE" }.to_string()
        } else if let Some(f) = self.formula_value {
            f
        } else if let Some(e) = self.error_value {
            e.message
        } else {
            String::new()
        }
    }
}
