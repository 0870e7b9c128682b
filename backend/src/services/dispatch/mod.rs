//! Dispatch endpoints under `/api/dispatch`.
//!
//! - `POST /prepare`: entry checks and the recipient-count prompt
//! - `POST /cancel`: drop a pending confirmation
//! - `POST /confirm`: start the run in the background, returns its `jobId`
//! - `GET /status`: phase, live progress, sent flag, last result
//! - `GET /jobs/{job_id}`: raw job controller status

mod prepare;
mod start;
mod status;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/dispatch";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/prepare", post().to(prepare::process))
        .route("/cancel", post().to(prepare::cancel))
        .route("/confirm", post().to(start::process))
        .route("/status", get().to(status::session))
        .route("/jobs/{job_id}", get().to(status::job))
}
