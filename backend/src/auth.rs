//! Authorization of the identity forwarded by the fronting proxy.
//!
//! The proxy authenticates users and passes the identity in a header
//! (`server.identity_header`). Each request checks that identity with the
//! authorization procedure. Without a configured gateway the check permits
//! everyone as a non-admin, so an unconfigured deployment is not locked out.
//! A configured gateway that fails or returns no rows denies.

use crate::app::AppContext;
use crate::error::ApiError;
use crate::gateway::normalize::extract_rows;
use crate::gateway::ProcedureGateway;
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub is_authorized: bool,
    pub is_admin: bool,
}

impl Access {
    const DENIED: Access = Access {
        is_authorized: false,
        is_admin: false,
    };
}

#[derive(Clone)]
pub struct Authorizer {
    gateway: Option<Arc<dyn ProcedureGateway>>,
    procedure: String,
}

impl Authorizer {
    /// `gateway` is `None` when the deployment has no gateway configured.
    pub fn new(gateway: Option<Arc<dyn ProcedureGateway>>, procedure: impl Into<String>) -> Self {
        Self {
            gateway,
            procedure: procedure.into(),
        }
    }

    pub async fn check(&self, identity: &str) -> Access {
        let Some(gateway) = &self.gateway else {
            log::warn!("authorization gateway not configured, permitting '{}'", identity);
            return Access {
                is_authorized: true,
                is_admin: false,
            };
        };

        let response = match gateway
            .execute(&self.procedure, json!({ "EmployeeId": identity }))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::error!("authorization check for '{}' failed: {}", identity, e);
                return Access::DENIED;
            }
        };

        match extract_rows(&response).first() {
            Some(user) => Access {
                is_authorized: flag(user.get("IsAuthorized")),
                is_admin: flag(user.get("IsAdmin")),
            },
            None => {
                log::info!("no authorization record for '{}'", identity);
                Access::DENIED
            }
        }
    }
}

/// `1` and `true` are set; anything else is not.
fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

/// An authorized caller. Extracting it rejects the request with 401 when the
/// identity header is missing and 403 when the identity is not authorized.
#[derive(Debug, Clone)]
pub struct AuthorizedUser {
    pub id: String,
    pub is_admin: bool,
}

impl FromRequest for AuthorizedUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let ctx = req.app_data::<web::Data<AppContext>>().cloned();
        let identity = ctx.as_ref().and_then(|ctx| {
            req.headers()
                .get(ctx.settings.server.identity_header.as_str())
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        });

        Box::pin(async move {
            let ctx = ctx.ok_or_else(|| ApiError::Internal("application context missing".into()))?;
            let id = identity.ok_or(ApiError::Unauthenticated)?;
            let access = ctx.authorizer.check(&id).await;
            if !access.is_authorized {
                return Err(ApiError::Forbidden(id));
            }
            Ok(AuthorizedUser {
                id,
                is_admin: access.is_admin,
            })
        })
    }
}
