//! Draft template endpoints under `/api/templates`.
//!
//! Each owner has one draft (`{name?, htmlContent, tags}`) kept in the draft
//! store. Edits are refused with `409` while the owner's dispatch runs.
//!
//! - `GET /`: templates stored in the database, newest first
//! - `GET /draft`, `PUT /draft`
//! - `POST /draft/tags`, `DELETE /draft/tags/{name}`
//! - `GET /draft/tags/{name}/marker`: the `{{name}}` text to insert
//! - `GET /draft/preview`: the draft rendered against the first row
//! - `POST /import/{template_id}`: replaces the draft with a stored template

mod catalog;
mod draft;
mod import;
mod tags;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/templates";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(catalog::process))
        .route("/draft", get().to(draft::get))
        .route("/draft", put().to(draft::save))
        .route("/draft/preview", get().to(draft::preview))
        .route("/draft/tags", post().to(tags::add))
        .route("/draft/tags/{name}", delete().to(tags::remove))
        .route("/draft/tags/{name}/marker", get().to(tags::marker))
        .route("/import/{template_id}", post().to(import::process))
}
