use crate::error::{SheetsError, SheetsResult};

/// Parse A1-style cell notation (e.g., "A1", "Z99", "AA1")
/// Returns (row, column) as 0-based indices
pub fn parse_a1(notation: &str) -> SheetsResult<(usize, usize)> {
    let invalid = || SheetsError::invalid_argument(format!("invalid cell notation: {notation:?}"));

    let upper = notation.to_ascii_uppercase();
    let split_pos = upper
        .bytes()
        .position(|b| b.is_ascii_digit())
        .ok_or_else(invalid)?;
    if split_pos == 0 {
        return Err(invalid());
    }

    let col = parse_column_letters(&upper[..split_pos]).ok_or_else(invalid)?;
    let row = upper[split_pos..]
        .parse::<usize>()
        .map_err(|_| invalid())?;

    // Rows are 1-based in A1 notation
    if row == 0 {
        return Err(invalid());
    }

    Ok((row - 1, col))
}

/// A=0, B=1, ... Z=25, AA=26, AB=27, ...
fn parse_column_letters(col_str: &str) -> Option<usize> {
    let mut col = 0usize;
    for b in col_str.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        col = col.checked_mul(26)?.checked_add((b - b'A') as usize + 1)?;
    }
    col.checked_sub(1)
}

/// Convert 0-based column index to column letters
/// 0=A, 1=B, ... 25=Z, 26=AA, 27=AB, ...
#[must_use]
pub fn column_index_to_letters(mut col: usize) -> String {
    let mut result = String::new();
    col += 1;

    while col > 0 {
        col -= 1;
        result.insert(0, ((col % 26) as u8 + b'A') as char);
        col /= 26;
    }

    result
}

/// Convert (row, col) to A1 notation
/// (0, 0) = "A1", (0, 1) = "B1", etc.
#[must_use]
pub fn to_a1_notation(row: usize, col: usize) -> String {
    format!("{}{}", column_index_to_letters(col), row + 1)
}

/// Qualify an A1 reference with a sheet title, e.g. `Data!B2` or `'My Data'!B2`.
///
/// Titles containing anything other than ASCII alphanumerics or `_` are
/// single-quoted, with embedded quotes doubled.
#[must_use]
pub fn sheet_qualified(title: &str, a1: &str) -> String {
    let plain = !title.is_empty()
        && title
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        format!("{title}!{a1}")
    } else {
        format!("'{}'!{a1}", title.replace('\'', "''"))
    }
}
