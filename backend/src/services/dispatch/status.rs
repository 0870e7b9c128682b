use crate::app::AppContext;
use crate::auth::AuthorizedUser;
use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use common::jobs::JobStatus;
use common::model::dispatch::Progress;

/// The owner's dispatch status. While a run is in flight its progress is read
/// from the job controller.
pub(crate) async fn session(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
) -> Result<HttpResponse, ApiError> {
    let running_job = ctx
        .workspaces
        .read(&user.id, |ws| {
            ws.filter(|ws| ws.session.is_running())
                .and_then(|ws| ws.session.job_id().map(str::to_string))
        })
        .await;

    let live = match running_job {
        Some(job_id) => match ctx.jobs.get(&job_id).await {
            Some(JobStatus::InProgress { current, total }) => Some(Progress { current, total }),
            _ => None,
        },
        None => None,
    };

    let status = ctx
        .workspaces
        .with(&user.id, |ws| {
            if let Some(progress) = live {
                ws.session.record_progress(progress);
            }
            ws.session.status()
        })
        .await;
    Ok(HttpResponse::Ok().json(status))
}

pub(crate) async fn job(
    ctx: web::Data<AppContext>,
    _user: AuthorizedUser,
    job_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let status = ctx
        .jobs
        .get(&job_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Job ID not found".to_string()))?;
    Ok(HttpResponse::Ok().json(status))
}
