//! Service configuration.
//!
//! Settings are assembled from built-in defaults, an optional `notifier.toml`
//! in the working directory, and `NOTIFIER__`-prefixed environment variables
//! (`NOTIFIER__GATEWAY__API_KEY`, `NOTIFIER__DISPATCH__TITLE_MODE`, ...).
//! Each collaborator receives only its own section at construction time.

use common::model::datasource::HeaderMode;
use config::{Config, ConfigError, Environment, File, FileFormat};
use secrecy::Secret;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub gateway: GatewaySettings,
    pub procedures: ProcedureNames,
    pub messaging: MessagingSettings,
    pub dispatch: DispatchSettings,
    pub ingest: IngestSettings,
    pub drafts: DraftSettings,
}

impl Settings {
    /// Loads settings from `notifier.toml` (optional) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("notifier").required(false))
            .add_source(
                Environment::with_prefix("NOTIFIER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("gateway.procedure_allowlist")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parses settings from a TOML document, falling back to defaults for
    /// anything it leaves out.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Header carrying the identity established by the fronting proxy.
    pub identity_header: String,
    pub upload_limit_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            identity_header: "x-authenticated-user".to_string(),
            upload_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Connection to the database-backed procedure/query gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub procedure_url: Option<String>,
    pub query_url: Option<String>,
    pub api_key: Option<Secret<String>>,
    pub database: String,
    /// Procedures callers may execute. Empty means every call is rejected.
    pub procedure_allowlist: Vec<String>,
    pub timeout_ms: u64,
}

impl GatewaySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            procedure_url: None,
            query_url: None,
            api_key: None,
            database: "Notification".to_string(),
            procedure_allowlist: Vec::new(),
            timeout_ms: 10_000,
        }
    }
}

/// Names of the stored procedures the service calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcedureNames {
    pub check_authorized_user: String,
    pub create_job: String,
    pub log_job_row: String,
    pub complete_job: String,
    pub save_upload: String,
    pub save_upload_row: String,
}

impl Default for ProcedureNames {
    fn default() -> Self {
        Self {
            check_authorized_user: "sp_CheckAuthorizedUser".to_string(),
            create_job: "sp_CreateNotificationJob".to_string(),
            log_job_row: "sp_LogNotificationJobRow".to_string(),
            complete_job: "sp_CompleteNotificationJob".to_string(),
            save_upload: "sp_SaveUpload".to_string(),
            save_upload_row: "sp_SaveUploadRow".to_string(),
        }
    }
}

/// The outbound message-send provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessagingSettings {
    pub send_url: Option<String>,
    pub api_key: Option<Secret<String>>,
    pub source: String,
    pub app_url: String,
    pub timeout_ms: u64,
}

impl MessagingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for MessagingSettings {
    fn default() -> Self {
        Self {
            send_url: None,
            api_key: None,
            source: "AOT".to_string(),
            app_url: String::new(),
            timeout_ms: 10_000,
        }
    }
}

/// Where a message's title comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleMode {
    /// The draft's display name, or the default title when it has none.
    #[default]
    TemplateName,
    /// Always the default title.
    Fixed,
}

/// What is sent as the message body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyFormat {
    /// The rendered HTML as-is.
    #[default]
    Html,
    /// The rendered HTML with markup stripped.
    PlainText,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub title_mode: TitleMode,
    pub default_title: String,
    pub body_format: BodyFormat,
}

impl DispatchSettings {
    pub fn title_for(&self, template_name: Option<&str>) -> String {
        match (self.title_mode, template_name.map(str::trim)) {
            (TitleMode::TemplateName, Some(name)) if !name.is_empty() => name.to_string(),
            _ => self.default_title.clone(),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            title_mode: TitleMode::TemplateName,
            default_title: "Notification".to_string(),
            body_format: BodyFormat::Html,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub header_mode: HeaderMode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DraftSettings {
    pub path: PathBuf,
}

impl Default for DraftSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("notifier.sqlite"),
        }
    }
}
