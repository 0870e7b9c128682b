use serde::{Deserialize, Serialize};

/// Body of `POST /api/dispatch/prepare`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareDispatchRequest {
    /// Column holding each recipient's username.
    #[serde(default)]
    pub username_column: Option<String>,
    /// Required to send again to a dataset that was already sent in full.
    #[serde(default)]
    pub resend: bool,
}

/// Returned once a confirmed run has been scheduled.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchStarted {
    pub job_id: String,
}

/// Identity and role flags of the caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user: String,
    pub is_authorized: bool,
    pub is_admin: bool,
}

/// Returned after a dataset has been archived through the procedure gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveReceipt {
    pub upload_id: i64,
    pub rows_saved: usize,
}

/// A template kept in the database, as listed for import.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTemplate {
    pub template_id: i64,
    pub template_name: String,
    pub html_content: String,
}
