//! `POST /api/dispatch/confirm`
//!
//! Freezes the owner's dataset, draft and username column into a
//! [`DispatchPlan`], registers the job as `Pending`, and returns the job id
//! straight away. The run itself is a spawned task:
//!
//! 1. The engine sends row by row, pushing `InProgress { current, total }`
//!    into the job controller after each row.
//! 2. Every outcome also goes out as a [`DispatchEvent`](crate::dispatch::DispatchEvent)
//!    to an [`AuditTrail`] running in its own task.
//! 3. On completion the ledger is stored in the session and the job is
//!    marked `Completed`. If the run task dies, the session goes back to
//!    `Idle` and the job is marked `Failed`.

use crate::app::AppContext;
use crate::auth::AuthorizedUser;
use crate::dispatch::audit::AuditTrail;
use crate::dispatch::{DispatchEngine, DispatchError, DispatchPlan};
use crate::error::ApiError;
use crate::job_controller::state::JobUpdate;
use actix_web::{web, HttpResponse};
use common::jobs::JobStatus;
use common::requests::DispatchStarted;
use std::sync::Arc;
use tokio::sync::mpsc;

pub(crate) async fn process(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
) -> Result<HttpResponse, ApiError> {
    if !ctx.sender.is_configured() {
        return Err(ApiError::Config(
            "message sending is not configured".to_string(),
        ));
    }
    let draft = ctx.drafts.load(&user.id)?;

    let (run, dataset) = ctx
        .workspaces
        .with(&user.id, |ws| {
            let run = ws.session.confirm(ws.dataset.as_deref(), &draft)?;
            let dataset = ws.dataset.clone().ok_or(DispatchError::NoRows)?;
            Ok::<_, DispatchError>((run, dataset))
        })
        .await?;

    let plan = DispatchPlan {
        job_id: run.job_id.clone(),
        dataset,
        username_column: run.username_column,
        title: ctx.settings.dispatch.title_for(draft.name.as_deref()),
        template: draft,
        body_format: ctx.settings.dispatch.body_format,
        initiator: user.id.clone(),
    };

    ctx.jobs.register(&run.job_id).await;
    schedule_run(ctx.into_inner(), user.id, plan);

    Ok(HttpResponse::Ok().json(DispatchStarted { job_id: run.job_id }))
}

fn schedule_run(ctx: Arc<AppContext>, owner: String, plan: DispatchPlan) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    AuditTrail::new(ctx.procedures.clone(), ctx.settings.procedures.clone()).spawn(events_rx);

    let engine = DispatchEngine::new(ctx.sender.clone());
    let progress = ctx.jobs.tx.clone();
    let job_id = plan.job_id.clone();

    let handle = tokio::spawn(async move {
        let result = engine.run(&plan, &progress, &events_tx).await;
        drop(events_tx);
        result
    });

    tokio::spawn(async move {
        let status = match handle.await {
            Ok(result) => {
                let summary = format!(
                    "{} sent, {} failed",
                    result.success_count, result.fail_count
                );
                ctx.workspaces
                    .with(&owner, |ws| ws.session.complete(result))
                    .await;
                JobStatus::Completed(summary)
            }
            Err(e) => {
                log::error!("dispatch {} aborted: {}", job_id, e);
                ctx.workspaces.with(&owner, |ws| ws.session.abort()).await;
                JobStatus::Failed(format!("Task join error: {}", e))
            }
        };
        let _ = ctx.jobs.tx.send(JobUpdate { job_id, status }).await;
    });
}
