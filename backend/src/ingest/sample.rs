//! The downloadable example workbook shown to users before their first upload.
//!
//! Static content: a header row and two sample recipients.

use rust_xlsxwriter::{Workbook, XlsxError};

pub const SAMPLE_FILE_NAME: &str = "template.xlsx";

const SAMPLE_HEADERS: [&str; 3] = ["name", "email", "phone"];
const SAMPLE_ROWS: [[&str; 3]; 2] = [
    ["John Doe", "john@example.com", "081-234-5678"],
    ["Jane Smith", "jane@example.com", "082-345-6789"],
];

/// Builds the sample workbook and returns its `.xlsx` bytes.
pub fn sample_workbook() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Template")?;
        for (col, header) in SAMPLE_HEADERS.iter().enumerate() {
            sheet.write_string(0, col as u16, *header)?;
        }
        for (row, values) in SAMPLE_ROWS.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                sheet.write_string(row as u32 + 1, col as u16, *value)?;
            }
        }
    }
    workbook.save_to_buffer()
}
