use crate::dispatch::DispatchSession;
use crate::ingest::Dataset;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One owner's uploaded dataset and dispatch session.
///
/// The dataset sits behind an `Arc` so a run can hold a snapshot while the
/// workspace itself stays lockable.
#[derive(Debug, Default)]
pub struct Workspace {
    pub dataset: Option<Arc<Dataset>>,
    pub session: DispatchSession,
}

/// Workspaces keyed by owner identity.
#[derive(Clone, Default)]
pub struct WorkspaceState {
    workspaces: Arc<RwLock<HashMap<String, Workspace>>>,
}

impl WorkspaceState {
    /// Runs `f` with exclusive access to `owner`'s workspace, creating it on
    /// first use.
    pub async fn with<R>(&self, owner: &str, f: impl FnOnce(&mut Workspace) -> R) -> R {
        let mut workspaces = self.workspaces.write().await;
        f(workspaces.entry(owner.to_string()).or_default())
    }

    /// Runs `f` against `owner`'s workspace if it exists, without creating it.
    pub async fn read<R>(&self, owner: &str, f: impl FnOnce(Option<&Workspace>) -> R) -> R {
        let workspaces = self.workspaces.read().await;
        f(workspaces.get(owner))
    }
}
