use super::DispatchEvent;
use crate::config::BodyFormat;
use crate::ingest::Dataset;
use crate::job_controller::state::JobUpdate;
use crate::messaging::{MessageSender, OutboundMessage, SendError, SendOutcome};
use crate::render::render_body;
use common::jobs::JobStatus;
use common::model::dispatch::{
    DispatchOutcome, DispatchResult, MISSING_USERNAME, NETWORK_ERROR_MESSAGE, NO_USERNAME_MESSAGE,
};
use common::model::recipient::RecipientRow;
use common::model::template::DraftTemplate;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Everything a run needs, frozen at confirmation. Later edits to the
/// workspace do not reach a run in progress.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    pub job_id: String,
    pub dataset: Arc<Dataset>,
    pub username_column: String,
    pub template: DraftTemplate,
    pub title: String,
    pub body_format: BodyFormat,
    /// Identity of whoever confirmed the run.
    pub initiator: String,
}

pub struct DispatchEngine {
    sender: Arc<dyn MessageSender>,
}

impl DispatchEngine {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self { sender }
    }

    /// Sends one message per row, strictly one after another.
    ///
    /// After row `k` the job controller sees `InProgress { current: k, .. }`.
    /// Row failures are recorded in the returned ledger; nothing here aborts
    /// the batch.
    pub async fn run(
        &self,
        plan: &DispatchPlan,
        progress: &mpsc::Sender<JobUpdate>,
        events: &mpsc::UnboundedSender<DispatchEvent>,
    ) -> DispatchResult {
        let rows = &plan.dataset.rows;
        let total = rows.len();
        log::info!("dispatch {} started: {} recipients", plan.job_id, total);

        let _ = events.send(DispatchEvent::Started {
            job_id: plan.job_id.clone(),
            template: plan.template.html_content.clone(),
            total,
            initiator: plan.initiator.clone(),
        });
        report(progress, &plan.job_id, 0, total).await;

        let mut result = DispatchResult::with_capacity(total);
        for (index, row) in rows.iter().enumerate() {
            let (outcome, message) = self.dispatch_row(plan, index + 1, row).await;
            let _ = events.send(DispatchEvent::RowCompleted {
                outcome: outcome.clone(),
                message,
            });
            result.record(outcome);
            report(progress, &plan.job_id, index + 1, total).await;
        }

        let _ = events.send(DispatchEvent::Finished {
            success_count: result.success_count,
            fail_count: result.fail_count,
        });
        log::info!(
            "dispatch {} finished: {} sent, {} failed",
            plan.job_id,
            result.success_count,
            result.fail_count
        );
        result
    }

    async fn dispatch_row(
        &self,
        plan: &DispatchPlan,
        row_number: usize,
        row: &RecipientRow,
    ) -> (DispatchOutcome, String) {
        let username = row.text(&plan.username_column).trim().to_string();
        if username.is_empty() {
            return (
                DispatchOutcome::failure(row_number, MISSING_USERNAME, NO_USERNAME_MESSAGE),
                String::new(),
            );
        }

        let body = render_body(
            &plan.template.html_content,
            &plan.template.tags,
            row,
            plan.body_format,
        );
        let message = OutboundMessage {
            to: vec![username.clone()],
            title: plan.title.clone(),
            message: body,
        };

        let outcome = match self.sender.send(&message).await {
            Ok(SendOutcome::Delivered) => DispatchOutcome::success(row_number, username),
            Ok(SendOutcome::Refused(reason)) => {
                log::warn!("row {}: provider refused '{}': {}", row_number, username, reason);
                DispatchOutcome::failure(row_number, username, reason)
            }
            Err(SendError::Transport(e)) => {
                log::warn!("row {}: sending to '{}' failed: {}", row_number, username, e);
                DispatchOutcome::failure(row_number, username, NETWORK_ERROR_MESSAGE)
            }
            Err(e) => DispatchOutcome::failure(row_number, username, e.to_string()),
        };
        (outcome, message.message)
    }
}

async fn report(progress: &mpsc::Sender<JobUpdate>, job_id: &str, current: usize, total: usize) {
    let _ = progress
        .send(JobUpdate {
            job_id: job_id.to_string(),
            status: JobStatus::InProgress { current, total },
        })
        .await;
}
