use crate::auth::AuthorizedUser;
use crate::error::ApiError;
use crate::ingest::sample::{sample_workbook, SAMPLE_FILE_NAME};
use actix_web::http::header::CONTENT_DISPOSITION;
use actix_web::HttpResponse;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub(crate) async fn process(_user: AuthorizedUser) -> Result<HttpResponse, ApiError> {
    let bytes = sample_workbook().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header((
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", SAMPLE_FILE_NAME),
        ))
        .body(bytes))
}
