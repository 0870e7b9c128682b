use super::IngestError;
use calamine::{Data, Reader, Xls, Xlsx};
use common::model::datasource::FileFormat;
use common::model::recipient::CellValue;
use std::fmt::Display;
use std::io::{Cursor, Read, Seek};

/// Reads the first worksheet of an `.xlsx` / `.xls` workbook.
///
/// The reader is chosen from the declared format, not from the bytes. Trailing
/// empty cells are dropped so that each record's width is the position of its
/// last filled cell. A fully empty row comes back as an empty record.
pub(super) fn read_records(
    bytes: &[u8],
    format: FileFormat,
) -> Result<Vec<Vec<CellValue>>, IngestError> {
    let cursor = Cursor::new(bytes);
    match format {
        FileFormat::Xlsx => first_sheet(Xlsx::new(cursor).map_err(unreadable)?),
        FileFormat::Xls => first_sheet(Xls::new(cursor).map_err(unreadable)?),
        FileFormat::Csv => Err(IngestError::Spreadsheet(
            "CSV data passed to the spreadsheet reader".to_string(),
        )),
    }
}

fn unreadable(e: impl Display) -> IngestError {
    IngestError::Spreadsheet(e.to_string())
}

fn first_sheet<RS, R>(mut workbook: R) -> Result<Vec<Vec<CellValue>>, IngestError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(unreadable)?,
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for row in range.rows() {
        let mut cells: Vec<CellValue> = row.iter().map(cell_value).collect();
        while cells.last().is_some_and(CellValue::is_blank) {
            cells.pop();
        }
        records.push(cells);
    }
    Ok(records)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::empty(),
    }
}
