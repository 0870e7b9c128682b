use super::{GatewayError, ProcedureGateway, QueryGateway};
use crate::config::GatewaySettings;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};

const API_KEY_HEADER: &str = "x-api-key";

/// Raw HTTP access to the gateway. Performs no allowlist check; see
/// [`HttpProcedureGateway`] for the restricted surface.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    procedure_url: Option<String>,
    query_url: Option<String>,
    api_key: Option<Secret<String>>,
    database: String,
}

impl GatewayClient {
    pub fn new(settings: &GatewaySettings) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self {
            http,
            procedure_url: settings.procedure_url.clone(),
            query_url: settings.query_url.clone(),
            api_key: settings.api_key.clone(),
            database: settings.database.clone(),
        })
    }

    /// Whether procedure calls can be made at all.
    pub fn is_configured(&self) -> bool {
        self.procedure_url.is_some() && self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, GatewayError> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret().as_str())
            .ok_or(GatewayError::NotConfigured("gateway.api_key"))
    }

    pub async fn call_procedure(
        &self,
        procedure: &str,
        parameters: Value,
    ) -> Result<Value, GatewayError> {
        let url = self
            .procedure_url
            .as_deref()
            .ok_or(GatewayError::NotConfigured("gateway.procedure_url"))?;

        log::debug!("[gateway/procedure] {} {}", procedure, parameters);
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.api_key()?)
            .json(&json!({
                "database": self.database,
                "procedure": procedure,
                "parameters": parameters,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        log::debug!("[gateway/procedure] {} -> {}", procedure, status);
        procedure_result(status, &body)
    }

    pub async fn call_query(&self, query: &str, parameters: Value) -> Result<Value, GatewayError> {
        let url = self
            .query_url
            .as_deref()
            .ok_or(GatewayError::NotConfigured("gateway.query_url"))?;

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.api_key()?)
            .json(&json!({
                "database": self.database,
                "query": query,
                "parameters": parameters,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Rejected(non_empty_or(&body, "Query request failed")));
        }
        let json: Value = serde_json::from_str(&body).map_err(|_| GatewayError::InvalidResponse)?;
        if json.get("success") == Some(&Value::Bool(false)) {
            return Err(GatewayError::Rejected(error_field(&json).unwrap_or("Query failed").to_string()));
        }
        Ok(json)
    }
}

/// Interprets a procedure response.
///
/// An explicit `success: false` is a failure whatever the status; otherwise a
/// non-2xx status fails with the body's `error` field, the raw body, or a
/// generic message, in that order.
fn procedure_result(status: StatusCode, body: &str) -> Result<Value, GatewayError> {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => {
            if json.get("success") == Some(&Value::Bool(false)) {
                let message = error_field(&json).unwrap_or("Procedure failed");
                return Err(GatewayError::Rejected(message.to_string()));
            }
            if !status.is_success() {
                let message = error_field(&json)
                    .map(str::to_string)
                    .unwrap_or_else(|| non_empty_or(body, "Procedure request failed"));
                return Err(GatewayError::Rejected(message));
            }
            Ok(json)
        }
        Err(_) if !status.is_success() => {
            log::error!("[gateway/procedure] status {}: {}", status, body);
            Err(GatewayError::Rejected(non_empty_or(body, "Procedure request failed")))
        }
        Err(_) => Err(GatewayError::InvalidResponse),
    }
}

fn error_field(json: &Value) -> Option<&str> {
    json.get("error").and_then(Value::as_str).filter(|e| !e.is_empty())
}

fn non_empty_or(body: &str, fallback: &str) -> String {
    if body.trim().is_empty() {
        fallback.to_string()
    } else {
        body.to_string()
    }
}

/// Unrestricted procedure access, for calls the service makes on its own
/// behalf (the authorization check).
#[async_trait]
impl ProcedureGateway for GatewayClient {
    async fn execute(&self, procedure: &str, parameters: Value) -> Result<Value, GatewayError> {
        self.call_procedure(procedure, parameters).await
    }
}

/// Procedure calls restricted to an allowlist.
///
/// The list is fail-closed: when it is empty, every call is rejected before
/// anything is sent.
#[derive(Clone)]
pub struct HttpProcedureGateway {
    client: GatewayClient,
    allowlist: Vec<String>,
}

impl HttpProcedureGateway {
    pub fn new(client: GatewayClient, allowlist: Vec<String>) -> Self {
        Self { client, allowlist }
    }

    fn check_allowed(&self, procedure: &str) -> Result<(), GatewayError> {
        if self.allowlist.is_empty() {
            return Err(GatewayError::EmptyAllowlist);
        }
        if !self.allowlist.iter().any(|allowed| allowed == procedure) {
            return Err(GatewayError::NotAllowed(procedure.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProcedureGateway for HttpProcedureGateway {
    async fn execute(&self, procedure: &str, parameters: Value) -> Result<Value, GatewayError> {
        self.check_allowed(procedure)?;
        self.client.call_procedure(procedure, parameters).await
    }
}

#[derive(Clone)]
pub struct HttpQueryGateway {
    client: GatewayClient,
}

impl HttpQueryGateway {
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryGateway for HttpQueryGateway {
    async fn query(&self, query: &str, parameters: Value) -> Result<Value, GatewayError> {
        self.client.call_query(query, parameters).await
    }
}
