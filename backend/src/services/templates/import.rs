//! `POST /api/templates/import/{template_id}`
//!
//! Copies a template kept in the database into the caller's draft. The stored
//! template is only read; later edits stay in the draft.

use crate::app::AppContext;
use crate::auth::AuthorizedUser;
use crate::error::ApiError;
use crate::gateway::normalize::extract_rows;
use crate::gateway::{GatewayError, QueryGateway};
use crate::services::ensure_not_running;
use actix_web::{web, HttpResponse};
use common::model::tag::{TagBinding, TagSet};
use common::model::template::DraftTemplate;
use serde_json::{json, Value};

const TEMPLATE_BY_ID_SQL: &str =
    "SELECT TemplateId, TemplateName, HtmlContent FROM dbo.Templates WHERE TemplateId = @TemplateId";
const TEMPLATE_TAGS_SQL: &str =
    "SELECT TagName, ColumnName FROM TemplateTags WHERE TemplateId = @TemplateId";

pub(crate) async fn process(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
    template_id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    ensure_not_running(&ctx, &user.id).await?;
    let template_id = template_id.into_inner();

    let draft = load_template(ctx.queries.as_ref(), template_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("template {} does not exist", template_id)))?;

    ctx.drafts.save(&user.id, &draft)?;
    log::info!(
        "{} imported template {} ({} tags)",
        user.id,
        template_id,
        draft.tags.len()
    );
    Ok(HttpResponse::Ok().json(draft))
}

/// The stored template and its tags as a draft, or `None` when no template
/// has that id. Repeated or incomplete tag rows are skipped; the first
/// binding of a name wins.
pub async fn load_template(
    queries: &dyn QueryGateway,
    template_id: i64,
) -> Result<Option<DraftTemplate>, GatewayError> {
    let parameters = json!({ "TemplateId": template_id });

    let response = queries.query(TEMPLATE_BY_ID_SQL, parameters.clone()).await?;
    let Some(template) = extract_rows(&response).into_iter().next() else {
        return Ok(None);
    };

    let response = queries.query(TEMPLATE_TAGS_SQL, parameters).await?;
    let mut tags = TagSet::new();
    for row in extract_rows(&response) {
        let binding = TagBinding::new(text(&row, "TagName"), text(&row, "ColumnName"));
        if let Err(e) = tags.add(binding) {
            log::warn!("template {}: skipping tag: {}", template_id, e);
        }
    }

    Ok(Some(DraftTemplate {
        name: Some(text(&template, "TemplateName")).filter(|n| !n.is_empty()),
        html_content: text(&template, "HtmlContent"),
        tags,
    }))
}

fn text(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
