//! Sending one rendered message per recipient row.
//!
//! - [`session`]: the per-workspace state machine
//!   (`Idle → Confirming → Running → Completed`).
//! - [`engine`]: the sequential run over a frozen [`DispatchPlan`].
//! - [`audit`]: the subscriber that mirrors a run's events into the job
//!   audit procedures.
//!
//! The engine reports progress to the job controller and emits
//! [`DispatchEvent`]s on an unbounded channel; nothing downstream of that
//! channel can delay or alter a row's outcome.

pub mod audit;
pub mod engine;
pub mod session;

pub use engine::{DispatchEngine, DispatchPlan};
pub use session::{ConfirmedRun, DispatchSession};

use common::model::dispatch::DispatchOutcome;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("select the column that holds the username")]
    MissingUsernameColumn,
    #[error("column '{0}' does not exist in the uploaded file")]
    UnknownColumn(String),
    #[error("there are no recipients: upload a file with at least one row")]
    NoRows,
    #[error("the template is empty")]
    EmptyTemplate,
    #[error("a dispatch is already running")]
    AlreadyRunning,
    #[error("this file has already been sent; confirm a resend to send it again")]
    AlreadySent,
    #[error("nothing to confirm: prepare the dispatch first")]
    NotConfirming,
}

/// What a run reports to its audit subscriber, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    Started {
        job_id: String,
        template: String,
        total: usize,
        initiator: String,
    },
    RowCompleted {
        outcome: DispatchOutcome,
        /// The rendered body, empty when the row was never rendered.
        message: String,
    },
    Finished {
        success_count: usize,
        fail_count: usize,
    },
}
