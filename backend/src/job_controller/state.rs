//! Tracks background dispatch jobs by id.
//!
//! Runs never write the job map directly: they push [`JobUpdate`]s into an
//! mpsc channel, and a single [`start_job_updater`] task applies them. Status
//! endpoints only ever take the read lock.
//!
//! Finished jobs are kept for lookup up to [`MAX_FINISHED_JOBS`]; beyond that
//! the oldest finished entry is dropped. Pending and running jobs are never
//! pruned.

use common::jobs::JobStatus;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Capacity of the update channel created by [`JobsState::new`].
pub const UPDATE_BUFFER: usize = 100;

/// Completed or failed jobs retained for status lookups.
pub const MAX_FINISHED_JOBS: usize = 1000;

#[derive(Clone)]
pub struct JobsState {
    /// Job id → latest status.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    /// Creates an empty state and the receiver its updater must drain.
    pub fn new() -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Registers a job as `Pending` before its task is spawned, so a status
    /// request right after scheduling never sees "not found".
    pub async fn register(&self, job_id: &str) {
        self.jobs
            .write()
            .await
            .insert(job_id.to_string(), JobStatus::Pending);
    }

    pub async fn get(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Applies updates until every sender is dropped.
pub async fn start_job_updater(state: JobsState, rx: mpsc::Receiver<JobUpdate>) {
    apply_updates(state, rx, MAX_FINISHED_JOBS).await
}

async fn apply_updates(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>, keep_finished: usize) {
    let mut finished = VecDeque::new();
    while let Some(update) = rx.recv().await {
        log::debug!("job {} -> {:?}", update.job_id, update.status);
        let done = matches!(update.status, JobStatus::Completed(_) | JobStatus::Failed(_));

        let mut jobs = state.jobs.write().await;
        if done {
            finished.push_back(update.job_id.clone());
        }
        jobs.insert(update.job_id, update.status);
        while finished.len() > keep_finished {
            if let Some(oldest) = finished.pop_front() {
                jobs.remove(&oldest);
            }
        }
    }
}
