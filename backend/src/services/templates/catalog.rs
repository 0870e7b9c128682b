//! `GET /api/templates`
//!
//! Lists the templates stored in the database, newest first, so a client can
//! pick one to import.

use crate::app::AppContext;
use crate::auth::AuthorizedUser;
use crate::error::ApiError;
use crate::gateway::normalize::{extract_id, extract_rows};
use crate::gateway::{GatewayError, QueryGateway};
use actix_web::{web, HttpResponse};
use common::requests::StoredTemplate;
use serde_json::{json, Value};

const TEMPLATES_SQL: &str =
    "SELECT TemplateId, TemplateName, HtmlContent FROM dbo.Templates ORDER BY CreatedAt DESC";

pub(crate) async fn process(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
) -> Result<HttpResponse, ApiError> {
    let templates = list_templates(ctx.queries.as_ref()).await?;
    log::debug!("{} listed {} stored templates", user.id, templates.len());
    Ok(HttpResponse::Ok().json(templates))
}

/// Rows without a usable `TemplateId` are skipped.
pub async fn list_templates(queries: &dyn QueryGateway) -> Result<Vec<StoredTemplate>, GatewayError> {
    let response = queries.query(TEMPLATES_SQL, json!({})).await?;
    Ok(extract_rows(&response)
        .iter()
        .filter_map(|row| {
            Some(StoredTemplate {
                template_id: extract_id(row, "TemplateId")?,
                template_name: text(row, "TemplateName"),
                html_content: text(row, "HtmlContent"),
            })
        })
        .collect())
}

fn text(row: &Value, key: &str) -> String {
    row.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}
