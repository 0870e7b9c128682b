use crate::app::AppContext;
use crate::auth::AuthorizedUser;
use crate::error::ApiError;
use actix_web::{web, HttpResponse};

pub(crate) async fn get(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
) -> Result<HttpResponse, ApiError> {
    let summary = ctx
        .workspaces
        .read(&user.id, |ws| {
            ws.and_then(|ws| ws.dataset.as_ref()).map(|d| d.summary())
        })
        .await
        .ok_or_else(|| ApiError::NotFound("no file has been uploaded".to_string()))?;

    Ok(HttpResponse::Ok().json(summary))
}

pub(crate) async fn clear(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
) -> Result<HttpResponse, ApiError> {
    ctx.workspaces
        .with(&user.id, |ws| {
            ws.session.reset_for_new_dataset()?;
            ws.dataset = None;
            Ok::<_, ApiError>(())
        })
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
