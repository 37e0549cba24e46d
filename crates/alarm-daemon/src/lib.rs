//! alarm-daemon library target.
//!
//! Exposes the router, state, reconciler and monitor for integration tests.
//! The binary `main.rs` depends on this library target.

pub mod api_types;
pub mod commands;
pub mod log_forward;
pub mod monitor;
pub mod reconciler;
pub mod routes;
pub mod state;
