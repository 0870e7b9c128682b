//! HTTP handlers, one sub-module per `/api` scope.
//!
//! Every handler takes an [`AuthorizedUser`](crate::auth::AuthorizedUser); its
//! identity selects the workspace and draft the request works on.

pub mod data_sources;
pub mod dispatch;
pub mod session;
pub mod templates;

use crate::app::AppContext;
use crate::error::ApiError;

/// Refuses changes to an owner's dataset, bindings or template while one of
/// their runs is in progress.
pub(crate) async fn ensure_not_running(ctx: &AppContext, owner: &str) -> Result<(), ApiError> {
    let running = ctx
        .workspaces
        .read(owner, |ws| ws.is_some_and(|ws| ws.session.is_running()))
        .await;
    if running {
        return Err(ApiError::Conflict(
            "a dispatch is running; wait for it to finish".to_string(),
        ));
    }
    Ok(())
}
