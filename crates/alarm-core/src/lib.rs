//! alarm-core
//!
//! Event reconciliation and alerting state machine.
//!
//! Architectural decisions:
//! - One authoritative in-memory registry of sensors keyed by location
//! - Reports are classified as connect / unchanged / transition / stale
//! - Only transitions are persisted; alerts fire only when armed
//! - Silent sensors are evicted by a liveness sweep and must reconnect
//! - Boot is always DISARMED
//!
//! Pure deterministic logic. No IO, no wall-clock. The daemon supplies
//! server-assigned timestamps and executes the returned plans.

mod arm_state;
mod engine;
mod liveness;
mod registry;

pub use arm_state::{ArmState, DisarmReason};
pub use engine::{apply, classify, plan, reconcile, Classification, ReconcilePlan};
pub use liveness::{sweep, Disconnected};
pub use registry::{SensorRecord, SensorRegistry};
