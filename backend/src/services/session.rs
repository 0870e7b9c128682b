use crate::auth::AuthorizedUser;
use actix_web::web::{get, scope};
use actix_web::{HttpResponse, Scope};
use common::requests::SessionInfo;

const API_PATH: &str = "/api/session";

/// `GET /api/session`: who the caller is and whether they are an admin.
/// Unauthenticated and unauthorized callers never reach the handler.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(process))
}

async fn process(user: AuthorizedUser) -> HttpResponse {
    HttpResponse::Ok().json(SessionInfo {
        user: user.id,
        is_authorized: true,
        is_admin: user.is_admin,
    })
}
