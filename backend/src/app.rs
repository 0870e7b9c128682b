//! Application wiring: the shared context handed to every handler, and the
//! route table.

use crate::auth::Authorizer;
use crate::config::Settings;
use crate::drafts::{DraftStore, SqliteDraftStore, StoreError};
use crate::gateway::{GatewayClient, HttpProcedureGateway, HttpQueryGateway, ProcedureGateway, QueryGateway};
use crate::job_controller::state::JobsState;
use crate::job_controller::workspace::WorkspaceState;
use crate::messaging::{HttpMessageSender, MessageSender};
use crate::error::ApiError;
use crate::services;
use actix_web::{error::JsonPayloadError, web, HttpRequest};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Collaborators and shared state, registered once as `web::Data`.
#[derive(Clone)]
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub authorizer: Authorizer,
    pub procedures: Arc<dyn ProcedureGateway>,
    pub queries: Arc<dyn QueryGateway>,
    pub sender: Arc<dyn MessageSender>,
    pub drafts: Arc<dyn DraftStore>,
    pub workspaces: WorkspaceState,
    pub jobs: JobsState,
}

impl AppContext {
    /// Builds the HTTP-backed collaborators described by `settings`.
    pub fn from_settings(settings: Settings, jobs: JobsState) -> Result<Self, StartupError> {
        let client = GatewayClient::new(&settings.gateway)?;
        let authorizer = Authorizer::new(
            client
                .is_configured()
                .then(|| Arc::new(client.clone()) as Arc<dyn ProcedureGateway>),
            settings.procedures.check_authorized_user.clone(),
        );
        let procedures = Arc::new(HttpProcedureGateway::new(
            client.clone(),
            settings.gateway.procedure_allowlist.clone(),
        ));
        let queries = Arc::new(HttpQueryGateway::new(client));
        let sender = Arc::new(HttpMessageSender::new(&settings.messaging)?);
        let drafts = Arc::new(SqliteDraftStore::open(&settings.drafts.path)?);

        Ok(Self {
            settings: Arc::new(settings),
            authorizer,
            procedures,
            queries,
            sender,
            drafts,
            workspaces: WorkspaceState::default(),
            jobs,
        })
    }
}

/// Registers every `/api` scope. Shared by `main` and the integration tests.
/// Registers the JSON body settings and every `/api` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(services::session::configure_routes())
        .service(services::data_sources::configure_routes())
        .service(services::templates::configure_routes())
        .service(services::dispatch::configure_routes());
}

/// Largest JSON body accepted. Drafts are the biggest bodies the API reads.
const JSON_LIMIT: usize = 2 * 1024 * 1024;

/// JSON bodies that fail to parse, including drafts with repeated tag names,
/// answer with the usual `{"error": ...}` body.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            ApiError::BadRequest(err.to_string()).into()
        })
}
