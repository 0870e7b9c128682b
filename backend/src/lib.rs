//! Bulk notification service.
//!
//! Users upload a recipient file, bind `{{tag}}` placeholders in a template
//! to its columns, and send one rendered message per row. Each run keeps an
//! ordered outcome ledger and is mirrored, best-effort, into a job audit
//! trail.

pub mod app;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod drafts;
pub mod error;
pub mod gateway;
pub mod ingest;
pub mod job_controller;
pub mod messaging;
pub mod render;
pub mod services;
