//! Best-effort job audit trail.
//!
//! The subscriber turns a run's [`DispatchEvent`]s into procedure calls:
//! create the job on `Started`, one log row per `RowCompleted`, complete on
//! `Finished`. Every failure is logged and dropped. When the job cannot be
//! created, or its id cannot be found in the response, the rest of the run
//! goes unaudited.

use super::DispatchEvent;
use crate::config::ProcedureNames;
use crate::gateway::normalize::extract_id;
use crate::gateway::ProcedureGateway;
use common::model::dispatch::{DispatchOutcome, OutcomeStatus};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct AuditTrail {
    gateway: Arc<dyn ProcedureGateway>,
    procedures: ProcedureNames,
}

impl AuditTrail {
    pub fn new(gateway: Arc<dyn ProcedureGateway>, procedures: ProcedureNames) -> Self {
        Self {
            gateway,
            procedures,
        }
    }

    pub fn spawn(self, events: mpsc::UnboundedReceiver<DispatchEvent>) -> JoinHandle<()> {
        tokio::spawn(async move { self.consume(events).await })
    }

    /// Processes events until the sending side is dropped.
    pub async fn consume(&self, mut events: mpsc::UnboundedReceiver<DispatchEvent>) {
        let mut job_id: Option<i64> = None;

        while let Some(event) = events.recv().await {
            match event {
                DispatchEvent::Started {
                    job_id: run_id,
                    template,
                    total,
                    initiator,
                } => {
                    job_id = self.create_job(&run_id, &template, total, &initiator).await;
                }
                DispatchEvent::RowCompleted { outcome, message } => {
                    if let Some(id) = job_id {
                        self.log_row(id, &outcome, &message).await;
                    }
                }
                DispatchEvent::Finished {
                    success_count,
                    fail_count,
                } => {
                    if let Some(id) = job_id.take() {
                        self.complete_job(id, success_count, fail_count).await;
                    }
                }
            }
        }
    }

    async fn create_job(
        &self,
        run_id: &str,
        template: &str,
        total: usize,
        initiator: &str,
    ) -> Option<i64> {
        let parameters = json!({
            "TemplateContent": template,
            "TotalRecipients": total,
            "CreatedBy": initiator,
        });
        match self.gateway.execute(&self.procedures.create_job, parameters).await {
            Ok(response) => {
                let id = extract_id(&response, "JobId");
                match id {
                    Some(id) => log::info!("dispatch {} audited as job {}", run_id, id),
                    None => log::warn!(
                        "dispatch {}: job created without an id, audit skipped",
                        run_id
                    ),
                }
                id
            }
            Err(e) => {
                log::warn!("dispatch {}: could not create audit job: {}", run_id, e);
                None
            }
        }
    }

    async fn log_row(&self, job_id: i64, outcome: &DispatchOutcome, message: &str) {
        let status = match outcome.status {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Error => "error",
        };
        let parameters = json!({
            "JobId": job_id,
            "RowNumber": outcome.row,
            "Username": outcome.username,
            "Message": message,
            "Status": status,
            "ErrorMessage": outcome.message,
        });
        if let Err(e) = self.gateway.execute(&self.procedures.log_job_row, parameters).await {
            log::warn!("job {}: could not log row {}: {}", job_id, outcome.row, e);
        }
    }

    async fn complete_job(&self, job_id: i64, success_count: usize, fail_count: usize) {
        let parameters = json!({
            "JobId": job_id,
            "SuccessCount": success_count,
            "FailCount": fail_count,
        });
        if let Err(e) = self.gateway.execute(&self.procedures.complete_job, parameters).await {
            log::warn!("job {}: could not mark complete: {}", job_id, e);
        }
    }
}
