//! Access to the database behind the HTTP procedure and query gateway.
//!
//! Two seams are exposed as traits so the dispatch and service layers can be
//! driven by in-memory fakes in tests:
//!
//! - [`ProcedureGateway`]: named stored-procedure calls, restricted to the
//!   configured allowlist. An empty allowlist rejects every call.
//! - [`QueryGateway`]: parameterized read-only SQL.
//!
//! Responses are returned as raw JSON; [`normalize`] turns them into rows and
//! ids.

mod client;
pub mod normalize;

pub use client::{GatewayClient, HttpProcedureGateway, HttpQueryGateway};

use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway is not configured: {0} is missing")]
    NotConfigured(&'static str),
    #[error("no procedures are allowed: the procedure allowlist is empty")]
    EmptyAllowlist,
    #[error("procedure '{0}' is not allowed")]
    NotAllowed(String),
    /// The gateway answered but reported a failure.
    #[error("{0}")]
    Rejected(String),
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway returned a response that is not JSON")]
    InvalidResponse,
}

#[async_trait]
pub trait ProcedureGateway: Send + Sync {
    /// Executes `procedure` with named `parameters` and returns the response.
    async fn execute(&self, procedure: &str, parameters: Value) -> Result<Value, GatewayError>;
}

#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Runs a parameterized read-only query and returns the response.
    async fn query(&self, query: &str, parameters: Value) -> Result<Value, GatewayError>;
}
