use crate::app::AppContext;
use crate::auth::AuthorizedUser;
use crate::error::ApiError;
use crate::render::render;
use crate::services::ensure_not_running;
use actix_web::{web, HttpResponse};
use common::model::template::DraftTemplate;
use serde_json::json;

pub(crate) async fn get(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
) -> Result<HttpResponse, ApiError> {
    let draft = ctx.drafts.load(&user.id)?;
    Ok(HttpResponse::Ok().json(draft))
}

/// Tag names are unique by construction: a body with a repeated name fails
/// to deserialize and is answered with `400`.
pub(crate) async fn save(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
    payload: web::Json<DraftTemplate>,
) -> Result<HttpResponse, ApiError> {
    ensure_not_running(&ctx, &user.id).await?;
    let draft = payload.into_inner();
    ctx.drafts.save(&user.id, &draft)?;
    Ok(HttpResponse::Ok().json(draft))
}

/// Renders the draft against the first uploaded row; without a dataset the
/// HTML comes back as stored.
pub(crate) async fn preview(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
) -> Result<HttpResponse, ApiError> {
    let draft = ctx.drafts.load(&user.id)?;
    let first_row = ctx
        .workspaces
        .read(&user.id, |ws| {
            ws.and_then(|ws| ws.dataset.as_ref())
                .and_then(|d| d.rows.first().cloned())
        })
        .await;

    let html = match first_row {
        Some(row) => render(&draft.html_content, &draft.tags, &row),
        None => draft.html_content,
    };
    Ok(HttpResponse::Ok().json(json!({ "html": html })))
}
