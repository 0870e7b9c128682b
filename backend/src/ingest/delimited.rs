use common::model::recipient::CellValue;

/// Picks the separator that occurs most often in the first line. Ties keep
/// the earlier candidate, so a line without any separator reads as CSV.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes
        .split(|&b| b == b'\n')
        .find(|line| !line.iter().all(u8::is_ascii_whitespace))
        .unwrap_or(&[]);

    let mut best = (b',', 0);
    for candidate in [b',', b';', b'\t', b'|'] {
        let count = first_line.iter().filter(|&&b| b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Reads every line as a record of text cells. Whitespace-only lines are
/// kept; the caller decides whether they are a header or skipped.
pub(super) fn read_records(bytes: &[u8]) -> Result<Vec<Vec<CellValue>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(detect_delimiter(bytes))
        .from_reader(bytes);

    reader
        .records()
        .map(|record| Ok(record?.iter().map(CellValue::from).collect()))
        .collect()
}
