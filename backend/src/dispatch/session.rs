use super::DispatchError;
use crate::ingest::Dataset;
use common::model::dispatch::{
    ConfirmationPrompt, DispatchPhase, DispatchResult, DispatchStatus, Progress,
};
use common::model::template::DraftTemplate;
use common::requests::PrepareDispatchRequest;
use uuid::Uuid;

/// Dispatch state of one workspace.
///
/// `already_sent` is set when a run completes and cleared only by loading a
/// new dataset; preparing again while it is set needs an explicit resend.
#[derive(Debug, Default)]
pub struct DispatchSession {
    phase: DispatchPhase,
    progress: Progress,
    username_column: Option<String>,
    job_id: Option<String>,
    already_sent: bool,
    result: Option<DispatchResult>,
}

/// Handed out by [`DispatchSession::confirm`]; the caller freezes the plan
/// from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedRun {
    pub job_id: String,
    pub username_column: String,
    pub total: usize,
}

impl DispatchSession {
    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == DispatchPhase::Running
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Checks the entry conditions and moves to `Confirming`.
    ///
    /// Any failure leaves the session untouched.
    pub fn prepare(
        &mut self,
        dataset: Option<&Dataset>,
        draft: &DraftTemplate,
        request: &PrepareDispatchRequest,
    ) -> Result<ConfirmationPrompt, DispatchError> {
        if self.is_running() {
            return Err(DispatchError::AlreadyRunning);
        }

        let column = request
            .username_column
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(DispatchError::MissingUsernameColumn)?;

        let dataset = dataset.filter(|d| !d.is_empty()).ok_or(DispatchError::NoRows)?;
        if !dataset.has_column(column) {
            return Err(DispatchError::UnknownColumn(column.to_string()));
        }
        if draft.is_empty() {
            return Err(DispatchError::EmptyTemplate);
        }
        if self.already_sent && !request.resend {
            return Err(DispatchError::AlreadySent);
        }

        let recipient_count = dataset.len();
        self.phase = DispatchPhase::Confirming;
        self.username_column = Some(column.to_string());
        self.progress = Progress {
            current: 0,
            total: recipient_count,
        };

        Ok(ConfirmationPrompt {
            recipient_count,
            prompt: format!("Send this message to {} recipients?", recipient_count),
        })
    }

    /// Abandons a pending confirmation. A running dispatch cannot be
    /// cancelled.
    pub fn cancel(&mut self) -> Result<(), DispatchError> {
        match self.phase {
            DispatchPhase::Running => Err(DispatchError::AlreadyRunning),
            DispatchPhase::Confirming => {
                self.phase = DispatchPhase::Idle;
                self.username_column = None;
                self.progress = Progress::default();
                Ok(())
            }
            DispatchPhase::Idle | DispatchPhase::Completed => Ok(()),
        }
    }

    /// Moves `Confirming → Running` and issues the run's job id. The previous
    /// result is dropped.
    ///
    /// The entry conditions are checked again against the dataset and draft
    /// about to be frozen, since the draft may have changed since `prepare`.
    /// A failure leaves the session in `Confirming`.
    pub fn confirm(
        &mut self,
        dataset: Option<&Dataset>,
        draft: &DraftTemplate,
    ) -> Result<ConfirmedRun, DispatchError> {
        if self.phase != DispatchPhase::Confirming {
            return Err(DispatchError::NotConfirming);
        }
        let column = self
            .username_column
            .as_deref()
            .ok_or(DispatchError::MissingUsernameColumn)?;
        let dataset = dataset.filter(|d| !d.is_empty()).ok_or(DispatchError::NoRows)?;
        if !dataset.has_column(column) {
            return Err(DispatchError::UnknownColumn(column.to_string()));
        }
        if draft.is_empty() {
            return Err(DispatchError::EmptyTemplate);
        }

        let username_column = column.to_string();
        let job_id = Uuid::new_v4().to_string();
        self.phase = DispatchPhase::Running;
        self.username_column = None;
        self.job_id = Some(job_id.clone());
        self.result = None;

        Ok(ConfirmedRun {
            job_id,
            username_column,
            total: dataset.len(),
        })
    }

    /// Progress only moves forward, and only while running.
    pub fn record_progress(&mut self, progress: Progress) {
        if self.is_running() && progress.current >= self.progress.current {
            self.progress = progress;
        }
    }

    pub fn complete(&mut self, result: DispatchResult) {
        let total = result.items.len();
        self.phase = DispatchPhase::Completed;
        self.progress = Progress { current: total, total };
        self.already_sent = true;
        self.result = Some(result);
    }

    /// Leaves `Running` without a result, for a run whose task died. The
    /// dataset is not marked as sent.
    pub fn abort(&mut self) {
        if self.is_running() {
            self.phase = DispatchPhase::Idle;
            self.progress = Progress::default();
        }
    }

    /// Forgets everything about earlier runs. Refused while running.
    pub fn reset_for_new_dataset(&mut self) -> Result<(), DispatchError> {
        if self.is_running() {
            return Err(DispatchError::AlreadyRunning);
        }
        *self = Self::default();
        Ok(())
    }

    pub fn status(&self) -> DispatchStatus {
        DispatchStatus {
            phase: self.phase,
            progress: self.progress,
            job_id: self.job_id.clone(),
            already_sent: self.already_sent,
            result: self.result.clone(),
        }
    }
}
