//! Data types shared between the notification service and its clients.
//!
//! Everything here is plain serde data: recipient rows produced by ingestion,
//! tag bindings and draft templates authored by users, and the outcome ledger
//! produced by a dispatch run.

pub mod jobs;
pub mod model;
pub mod requests;
