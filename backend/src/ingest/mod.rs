//! Turns an uploaded file into a uniform, ordered set of recipient rows.
//!
//! The format is picked from the file extension; CSV goes through
//! [`delimited`], workbooks through [`spreadsheet`]. Both produce raw records
//! (one `Vec<CellValue>` per line, blank lines included) which [`normalize`]
//! maps onto column keys according to the deployment's [`HeaderMode`]. Blank
//! records are dropped there, after the header row has been taken.
//!
//! The column ceiling is checked on the normalized column list before any row
//! is built, so an oversized file never yields a partial dataset.

mod delimited;
pub mod sample;
mod spreadsheet;

use common::model::datasource::{DatasetSummary, FileFormat, HeaderMode};
use common::model::recipient::{positional_key, CellValue, RecipientRow, MAX_COLUMNS};
use rayon::prelude::*;

/// Number of rows shown back to the user after an upload.
pub const PREVIEW_ROWS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("unsupported file '{0}': upload a .csv, .xlsx or .xls file")]
    UnsupportedFormat(String),
    #[error("the file has {found} columns, more than the supported maximum of {max}")]
    TooManyColumns { found: usize, max: usize },
    #[error("could not read CSV file: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not read spreadsheet: {0}")]
    Spreadsheet(String),
}

/// A parsed upload. Rows keep file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub file_name: String,
    pub format: FileFormat,
    pub header_mode: HeaderMode,
    pub columns: Vec<String>,
    pub rows: Vec<RecipientRow>,
    /// MD5 of the uploaded bytes.
    pub md5: String,
}

impl Dataset {
    /// The first `min(PREVIEW_ROWS, len)` rows.
    pub fn preview(&self) -> &[RecipientRow] {
        &self.rows[..self.rows.len().min(PREVIEW_ROWS)]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            file_name: self.file_name.clone(),
            columns: self.columns.clone(),
            total_rows: self.rows.len(),
            preview: self.preview().to_vec(),
            md5: self.md5.clone(),
        }
    }
}

/// Parses `bytes` as the format implied by `file_name`.
pub fn ingest(file_name: &str, bytes: &[u8], mode: HeaderMode) -> Result<Dataset, IngestError> {
    let format = FileFormat::from_file_name(file_name)
        .ok_or_else(|| IngestError::UnsupportedFormat(file_name.to_string()))?;

    let records = match format {
        FileFormat::Csv => delimited::read_records(bytes)?,
        FileFormat::Xlsx | FileFormat::Xls => spreadsheet::read_records(bytes, format)?,
    };
    let (columns, rows) = normalize(records, mode)?;

    log::info!(
        "ingested '{}' ({:?}): {} rows, {} columns",
        file_name,
        format,
        rows.len(),
        columns.len()
    );

    Ok(Dataset {
        file_name: file_name.to_string(),
        format,
        header_mode: mode,
        columns,
        rows,
        md5: format!("{:x}", md5::compute(bytes)),
    })
}

/// Maps raw records onto column keys.
///
/// Positional mode uses the widest record for the column count and pads
/// shorter records with empty strings. First-row mode takes the first record
/// as the header, blank or not, and uses its non-blank cells as names; a
/// header without names falls back to positional keys as wide as the widest
/// data record.
fn normalize(
    records: Vec<Vec<CellValue>>,
    mode: HeaderMode,
) -> Result<(Vec<String>, Vec<RecipientRow>), IngestError> {
    let (columns, data) = match mode {
        HeaderMode::Positional => {
            let data = without_blanks(records);
            (positional_columns(&data), data)
        }
        HeaderMode::FirstRow => {
            let mut iter = records.into_iter();
            let header = iter.next().unwrap_or_default();
            let data = without_blanks(iter.collect());
            let names: Vec<String> = header
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
            if names.is_empty() {
                (positional_columns(&data), data)
            } else {
                (names, data)
            }
        }
    };

    if columns.len() > MAX_COLUMNS {
        return Err(IngestError::TooManyColumns {
            found: columns.len(),
            max: MAX_COLUMNS,
        });
    }

    let rows = data
        .into_par_iter()
        .map(|record| to_row(&columns, record))
        .collect();

    Ok((columns, rows))
}

fn without_blanks(records: Vec<Vec<CellValue>>) -> Vec<Vec<CellValue>> {
    records
        .into_iter()
        .filter(|record| !record.iter().all(CellValue::is_blank))
        .collect()
}

fn positional_columns(records: &[Vec<CellValue>]) -> Vec<String> {
    let width = records.iter().map(Vec::len).max().unwrap_or(0);
    (0..width).map(positional_key).collect()
}

fn to_row(columns: &[String], record: Vec<CellValue>) -> RecipientRow {
    let mut cells = record.into_iter();
    columns
        .iter()
        .map(|column| (column.clone(), cells.next().unwrap_or_default()))
        .collect()
}
