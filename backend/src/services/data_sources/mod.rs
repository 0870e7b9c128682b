//! Recipient file endpoints under `/api/data_sources`.
//!
//! - `POST /upload`: multipart upload (field `file`) of a `.csv`, `.xlsx` or
//!   `.xls` file. Parsing runs on the blocking pool. A good file replaces the
//!   workspace dataset and resets the dispatch session; a bad one clears both.
//!   An unsupported extension is refused before anything changes.
//! - `GET /`: summary of the current dataset (columns, row count, first rows).
//! - `DELETE /`: drops the dataset.
//! - `GET /sample`: the example workbook.
//! - `POST /archive`: copies the dataset into the database via the upload
//!   procedures.
//!
//! Upload and delete answer `409` while a dispatch is running.

mod archive;
mod current;
mod sample;
mod upload;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/data_sources";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(current::get))
        .route("", delete().to(current::clear))
        .route("/upload", post().to(upload::process))
        .route("/sample", get().to(sample::process))
        .route("/archive", post().to(archive::process))
}
