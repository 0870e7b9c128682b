use actix_web::{web, App, HttpServer};
use backend::app::{self, AppContext};
use backend::config::Settings;
use backend::job_controller::state::{self, JobsState};
use env_logger::Env;
use log::info;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::load().map_err(io::Error::other)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let upload_limit = settings.server.upload_limit_bytes;

    let (jobs, rx) = JobsState::new();
    tokio::spawn(state::start_job_updater(jobs.clone(), rx));

    let ctx = AppContext::from_settings(settings, jobs).map_err(io::Error::other)?;
    if ctx.settings.gateway.procedure_allowlist.is_empty() {
        log::warn!("procedure allowlist is empty: audit and archive calls will be rejected");
    }
    if !ctx.sender.is_configured() {
        log::warn!("messaging.send_url / messaging.api_key not set: dispatch is disabled");
    }

    info!("Server running at http://{}:{}", host, port);

    let data = web::Data::new(ctx);
    HttpServer::new(move || {
        App::new()
            .app_data(web::PayloadConfig::new(upload_limit))
            .app_data(data.clone())
            .configure(app::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
