use crate::model::recipient::RecipientRow;
use serde::{Deserialize, Serialize};

/// Source formats accepted by the upload endpoint. Selected by file
/// extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    /// Picks the format from the file name's extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            _ => None,
        }
    }
}

/// How the first row of an uploaded file is treated. One mode per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// Every row is data; columns are `column1..columnN` by position.
    #[default]
    Positional,
    /// The first row names the columns (legacy behaviour).
    FirstRow,
}

/// What the client sees after a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub file_name: String,
    pub columns: Vec<String>,
    pub total_rows: usize,
    pub preview: Vec<RecipientRow>,
    /// MD5 of the uploaded bytes; identifies the dataset across sends.
    pub md5: String,
}
