use serde::{Deserialize, Serialize};

/// Username recorded for a row whose username cell is empty.
pub const MISSING_USERNAME: &str = "-";
/// Outcome message for a row whose username cell is empty.
pub const NO_USERNAME_MESSAGE: &str = "no username found";
/// Outcome message for a row whose send failed in transport.
pub const NETWORK_ERROR_MESSAGE: &str = "network error";

/// Lifecycle of a user's dispatch session.
///
/// `Idle -> Confirming -> Running -> Completed`. A `Completed` session may be
/// prepared again; a `Running` session can only move to `Completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    /// Nothing prepared.
    #[default]
    Idle,
    /// Preconditions passed; waiting for the user to confirm the recipient count.
    Confirming,
    /// Rows are being sent one at a time.
    Running,
    /// Every row has been attempted. The result stays available.
    Completed,
}

/// Per-row status in the outcome ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// The recorded result of attempting one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// 1-indexed position of the row in the uploaded data.
    pub row: usize,
    pub username: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DispatchOutcome {
    pub fn success(row: usize, username: impl Into<String>) -> Self {
        Self {
            row,
            username: username.into(),
            status: OutcomeStatus::Success,
            message: None,
        }
    }

    pub fn failure(row: usize, username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            username: username.into(),
            status: OutcomeStatus::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Aggregate ledger of a dispatch run.
///
/// Counts are only changed through [`DispatchResult::record`], which keeps
/// `success_count + fail_count == items.len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub success_count: usize,
    pub fail_count: usize,
    pub items: Vec<DispatchOutcome>,
}

impl DispatchResult {
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            success_count: 0,
            fail_count: 0,
            items: Vec::with_capacity(rows),
        }
    }

    pub fn record(&mut self, outcome: DispatchOutcome) {
        if outcome.is_success() {
            self.success_count += 1;
        } else {
            self.fail_count += 1;
        }
        self.items.push(outcome);
    }
}

/// Rows attempted so far out of the rows in the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// Returned by `prepare`: what the user is asked to confirm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationPrompt {
    pub recipient_count: usize,
    pub prompt: String,
}

/// Snapshot of a user's dispatch session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchStatus {
    pub phase: DispatchPhase,
    pub progress: Progress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// The current dataset has already been sent in full.
    pub already_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<DispatchResult>,
}
