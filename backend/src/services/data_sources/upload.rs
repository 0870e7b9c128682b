use crate::app::AppContext;
use crate::auth::AuthorizedUser;
use crate::error::ApiError;
use crate::ingest::{ingest, IngestError};
use crate::services::ensure_not_running;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::datasource::FileFormat;
use futures_util::StreamExt;
use std::sync::Arc;

pub(crate) async fn process(
    ctx: web::Data<AppContext>,
    user: AuthorizedUser,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    ensure_not_running(&ctx, &user.id).await?;

    let (file_name, bytes) = read_file_field(payload, ctx.settings.server.upload_limit_bytes).await?;
    if FileFormat::from_file_name(&file_name).is_none() {
        return Err(IngestError::UnsupportedFormat(file_name).into());
    }
    log::info!("{} uploaded '{}' ({} bytes)", user.id, file_name, bytes.len());

    let mode = ctx.settings.ingest.header_mode;
    let parsed = tokio::task::spawn_blocking(move || ingest(&file_name, &bytes, mode))
        .await
        .map_err(|e| ApiError::Internal(format!("ingest task failed: {}", e)))?;

    let summary = ctx
        .workspaces
        .with(&user.id, |ws| {
            ws.session.reset_for_new_dataset()?;
            match parsed {
                Ok(dataset) => {
                    let summary = dataset.summary();
                    ws.dataset = Some(Arc::new(dataset));
                    Ok(summary)
                }
                Err(e) => {
                    ws.dataset = None;
                    Err(ApiError::from(e))
                }
            }
        })
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Reads the `file` field of a multipart body, refusing anything over
/// `limit` bytes. Other fields are skipped.
async fn read_file_field(
    mut payload: Multipart,
    limit: usize,
) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let disposition = field.content_disposition().cloned();
        if disposition.as_ref().and_then(|cd| cd.get_name()) != Some("file") {
            continue;
        }

        let file_name = disposition
            .as_ref()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::BadRequest(e.to_string()))?;
            if bytes.len() + chunk.len() > limit {
                return Err(ApiError::BadRequest(format!(
                    "file is larger than {} bytes",
                    limit
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok((file_name, bytes));
    }

    Err(ApiError::BadRequest(
        "no file uploaded: send it in the 'file' field".to_string(),
    ))
}
