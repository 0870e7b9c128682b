use backend::app::AppContext;
use backend::auth::Authorizer;
use backend::config::{ProcedureNames, Settings};
use backend::drafts::SqliteDraftStore;
use backend::gateway::{GatewayClient, HttpProcedureGateway, HttpQueryGateway, ProcedureGateway};
use backend::job_controller::state::{start_job_updater, JobsState};
use backend::job_controller::workspace::WorkspaceState;
use backend::messaging::HttpMessageSender;
use secrecy::Secret;
use std::sync::Arc;
use wiremock::MockServer;

pub const USER_HEADER: &str = "x-authenticated-user";
pub const USER: &str = "E1001";

const BOUNDARY: &str = "notifier-test-boundary";

/// Builds the actix test service for a [`TestApp`].
macro_rules! init_app {
    ($app:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($app.ctx.clone()))
                .configure(backend::app::configure),
        )
        .await
    };
}

pub struct TestApp {
    pub ctx: AppContext,
    /// Stands in for the procedure and query gateway.
    pub gateway: MockServer,
    /// Stands in for the message-send provider.
    pub provider: MockServer,
}

/// An app wired to two mock servers. Authorization is left unconfigured, so
/// every identity is permitted.
pub async fn spawn_app() -> TestApp {
    let gateway = MockServer::start().await;
    let provider = MockServer::start().await;

    let procedures = ProcedureNames::default();
    let mut settings = Settings::default();
    settings.gateway.procedure_url = Some(format!("{}/procedure", gateway.uri()));
    settings.gateway.query_url = Some(format!("{}/query", gateway.uri()));
    settings.gateway.api_key = Some(Secret::new("gateway-key".to_string()));
    settings.gateway.procedure_allowlist = vec![
        procedures.create_job.clone(),
        procedures.log_job_row.clone(),
        procedures.complete_job.clone(),
        procedures.save_upload.clone(),
        procedures.save_upload_row.clone(),
    ];
    settings.messaging.send_url = Some(format!("{}/send", provider.uri()));
    settings.messaging.api_key = Some(Secret::new("send-key".to_string()));

    let client = GatewayClient::new(&settings.gateway).unwrap();
    let (jobs, rx) = JobsState::new();
    tokio::spawn(start_job_updater(jobs.clone(), rx));

    let ctx = AppContext {
        authorizer: Authorizer::new(None, procedures.check_authorized_user.clone()),
        procedures: Arc::new(HttpProcedureGateway::new(
            client.clone(),
            settings.gateway.procedure_allowlist.clone(),
        )),
        queries: Arc::new(HttpQueryGateway::new(client)),
        sender: Arc::new(HttpMessageSender::new(&settings.messaging).unwrap()),
        drafts: Arc::new(SqliteDraftStore::open_in_memory().unwrap()),
        workspaces: WorkspaceState::default(),
        jobs,
        settings: Arc::new(settings),
    };

    TestApp {
        ctx,
        gateway,
        provider,
    }
}

impl TestApp {
    /// Turns on the authorization check against the mock gateway.
    pub fn with_authorization(mut self) -> Self {
        let client = GatewayClient::new(&self.ctx.settings.gateway).unwrap();
        self.ctx.authorizer = Authorizer::new(
            Some(Arc::new(client) as Arc<dyn ProcedureGateway>),
            self.ctx.settings.procedures.check_authorized_user.clone(),
        );
        self
    }
}

/// A `multipart/form-data` body with a single `file` field.
pub fn multipart(file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// A test request for `uri` carrying the test identity.
pub fn as_user(req: actix_web::test::TestRequest, uri: &str) -> actix_web::test::TestRequest {
    req.uri(uri).insert_header((USER_HEADER, USER))
}

pub fn upload_request(file_name: &str, bytes: &[u8]) -> actix_web::test::TestRequest {
    let (content_type, body) = multipart(file_name, bytes);
    as_user(actix_web::test::TestRequest::post(), "/api/data_sources/upload")
        .insert_header(("content-type", content_type))
        .set_payload(body)
}
