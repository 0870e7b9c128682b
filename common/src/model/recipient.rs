use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Hard ceiling on the number of columns an uploaded file may produce.
pub const MAX_COLUMNS: usize = 10;

/// Returns the positional column key for a zero-based column index
/// (`0` -> `column1`).
pub fn positional_key(index: usize) -> String {
    format!("column{}", index + 1)
}

/// A single scalar cell read from an uploaded file.
///
/// Spreadsheets yield numbers, delimited text always yields strings. The
/// string form (`Display`) is what ends up inside rendered messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// True for an empty or whitespace-only text cell. Numbers are never blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::empty()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            // Whole numbers print without a fractional part so that an
            // employee id stored as 1024.0 in a workbook renders as "1024".
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// One recipient: a mapping from column key to cell value.
///
/// The row's position in its dataset (1-indexed) is its identity in reports;
/// the row itself carries no number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientRow(BTreeMap<String, CellValue>);

impl RecipientRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }

    /// String form of the value at `column`, or an empty string when the
    /// column is absent.
    pub fn text(&self, column: &str) -> String {
        self.0.get(column).map(ToString::to_string).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for RecipientRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
