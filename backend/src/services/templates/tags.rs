use crate::app::AppContext;
use crate::auth::AuthorizedUser;
use crate::error::ApiError;
use crate::services::ensure_not_running;
use actix_web::{web, HttpResponse};
use common::model::tag::TagBinding;
use serde_json::json;

pub(crate) async fn add(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
    payload: web::Json<TagBinding>,
) -> Result<HttpResponse, ApiError> {
    ensure_not_running(&ctx, &user.id).await?;
    let mut draft = ctx.drafts.load(&user.id)?;
    draft.tags.add(payload.into_inner())?;
    ctx.drafts.save(&user.id, &draft)?;
    Ok(HttpResponse::Ok().json(draft))
}

pub(crate) async fn remove(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
    name: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    ensure_not_running(&ctx, &user.id).await?;
    let name = name.into_inner();
    let mut draft = ctx.drafts.load(&user.id)?;
    if !draft.tags.remove(&name) {
        return Err(ApiError::NotFound(format!("tag '{}' does not exist", name)));
    }
    ctx.drafts.save(&user.id, &draft)?;
    Ok(HttpResponse::Ok().json(draft))
}

pub(crate) async fn marker(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
    name: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let draft = ctx.drafts.load(&user.id)?;
    let binding = draft
        .tags
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(format!("tag '{}' does not exist", name)))?;
    Ok(HttpResponse::Ok().json(json!({ "marker": binding.marker() })))
}
