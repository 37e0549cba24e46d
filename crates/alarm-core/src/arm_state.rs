//! Arm state with fail-closed boot semantics.
//!
//! # Invariants
//!
//! - **Boot is always DISARMED**: nothing about the arm flag survives a
//!   restart, so every session starts disarmed and must be armed explicitly.
//!
//! - **Explicit arm is the only escape**: `ArmState::arm()` is the sole path
//!   to `Armed`, reachable only from an authorized operator command.
//!
//! - **Persistence is unaffected**: transitions are stored whether armed or
//!   not; the arm state only gates human-facing alerts.

use alarm_schemas::SystemStatus;

// ---------------------------------------------------------------------------
// Disarm reason
// ---------------------------------------------------------------------------

/// Why the system is disarmed. Surfaced in logs and status replies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisarmReason {
    /// Process start; fail-closed default.
    BootDefault,
    /// Operator sent a disarm command.
    ManualDisarm,
}

// ---------------------------------------------------------------------------
// Arm state
// ---------------------------------------------------------------------------

/// The system's process-wide arm state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArmState {
    /// Transitions raise alerts to every recipient.
    Armed,
    /// Transitions are recorded silently.
    Disarmed { reason: DisarmReason },
}

impl Default for ArmState {
    fn default() -> Self {
        Self::boot()
    }
}

impl ArmState {
    /// Starting state of every process.
    pub fn boot() -> Self {
        ArmState::Disarmed {
            reason: DisarmReason::BootDefault,
        }
    }

    /// Explicit operator arm.
    pub fn arm() -> Self {
        ArmState::Armed
    }

    /// Explicit operator disarm.
    pub fn manual_disarm() -> Self {
        ArmState::Disarmed {
            reason: DisarmReason::ManualDisarm,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, ArmState::Armed)
    }

    pub fn is_disarmed(&self) -> bool {
        !self.is_armed()
    }

    /// Snapshot stamped onto persisted events.
    pub fn system_status(&self) -> SystemStatus {
        if self.is_armed() {
            SystemStatus::Armed
        } else {
            SystemStatus::Disarmed
        }
    }
}
