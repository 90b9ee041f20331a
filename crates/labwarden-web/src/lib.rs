//! labwarden-web: HTTP API for the lab record keeper.
//! Serves:
//!   - Experiments with AI hazard assessment
//!   - Lab notes (with search)
//!   - Compliance tasks (with status updates)
//!   - Safety incident reports
//!   - Dashboard summary and health check

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
