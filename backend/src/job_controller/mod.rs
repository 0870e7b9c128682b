//! Shared in-memory state: background job statuses and per-owner workspaces.

pub mod state;
pub mod workspace;
