use serde::{Deserialize, Serialize};

/// Status of a background job tracked by the service's job controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress { current: usize, total: usize },
    Completed(String),
    Failed(String),
}
