//! `POST /api/data_sources/archive`
//!
//! Stores the current dataset in the database: one upload record, then one
//! row record per recipient row with the cells spread over `Column1` to
//! `Column10`. Unlike the audit trail this is not best-effort; the first
//! failure is returned to the caller.

use crate::app::AppContext;
use crate::auth::AuthorizedUser;
use crate::config::ProcedureNames;
use crate::error::ApiError;
use crate::gateway::normalize::extract_id;
use crate::gateway::{GatewayError, ProcedureGateway};
use crate::ingest::Dataset;
use actix_web::{web, HttpResponse};
use common::model::datasource::HeaderMode;
use common::model::recipient::{RecipientRow, MAX_COLUMNS};
use common::requests::ArchiveReceipt;
use serde_json::{json, Map, Value};

pub(crate) async fn process(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
) -> Result<HttpResponse, ApiError> {
    let dataset = ctx
        .workspaces
        .read(&user.id, |ws| ws.and_then(|ws| ws.dataset.clone()))
        .await
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest("there is no data to save".to_string()))?;

    let receipt = archive_dataset(ctx.procedures.as_ref(), &ctx.settings.procedures, &dataset).await?;
    log::info!(
        "{} archived '{}' as upload {} ({} rows)",
        user.id,
        dataset.file_name,
        receipt.upload_id,
        receipt.rows_saved
    );
    Ok(HttpResponse::Ok().json(receipt))
}

pub async fn archive_dataset(
    gateway: &dyn ProcedureGateway,
    procedures: &ProcedureNames,
    dataset: &Dataset,
) -> Result<ArchiveReceipt, GatewayError> {
    let response = gateway
        .execute(
            &procedures.save_upload,
            json!({
                "FileName": dataset.file_name,
                "FirstRowIsHeader": i32::from(dataset.header_mode == HeaderMode::FirstRow),
                "TotalRows": dataset.len(),
                "TotalColumns": dataset.columns.len(),
            }),
        )
        .await?;

    let upload_id = extract_id(&response, "UploadId").ok_or_else(|| {
        GatewayError::Rejected(format!("{} returned no UploadId", procedures.save_upload))
    })?;

    for (index, row) in dataset.rows.iter().enumerate() {
        gateway
            .execute(
                &procedures.save_upload_row,
                row_parameters(upload_id, index + 1, &dataset.columns, row),
            )
            .await?;
    }

    Ok(ArchiveReceipt {
        upload_id,
        rows_saved: dataset.len(),
    })
}

fn row_parameters(upload_id: i64, row_number: usize, columns: &[String], row: &RecipientRow) -> Value {
    let mut parameters = Map::new();
    parameters.insert("UploadId".to_string(), json!(upload_id));
    parameters.insert("RowNumber".to_string(), json!(row_number));
    for i in 0..MAX_COLUMNS {
        let value = columns
            .get(i)
            .and_then(|column| row.get(column))
            .map(|cell| json!(cell))
            .unwrap_or_else(|| json!(""));
        parameters.insert(format!("Column{}", i + 1), value);
    }
    Value::Object(parameters)
}
