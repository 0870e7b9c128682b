use crate::app::AppContext;
use crate::auth::AuthorizedUser;
use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use common::requests::PrepareDispatchRequest;

pub(crate) async fn process(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
    payload: web::Json<PrepareDispatchRequest>,
) -> Result<HttpResponse, ApiError> {
    let draft = ctx.drafts.load(&user.id)?;
    let request = payload.into_inner();

    let prompt = ctx
        .workspaces
        .with(&user.id, |ws| {
            ws.session.prepare(ws.dataset.as_deref(), &draft, &request)
        })
        .await?;

    Ok(HttpResponse::Ok().json(prompt))
}

pub(crate) async fn cancel(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
) -> Result<HttpResponse, ApiError> {
    let status = ctx
        .workspaces
        .with(&user.id, |ws| ws.session.cancel().map(|_| ws.session.status()))
        .await?;
    Ok(HttpResponse::Ok().json(status))
}
