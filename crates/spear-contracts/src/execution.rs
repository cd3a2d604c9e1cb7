//! Sequencer-level results and step records.
//!
//! `SequencerStatus` is what the sequencer returns after every call.
//! `StepRecord` is kept for each step that reached a terminal status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::MissionStatus;

/// Where the mission stands after the sequencer handled a call.
///
/// - `Running` → keep feeding bus events
/// - `Complete` → every step succeeded
/// - `Halted` → a step ended `Aborted` or `Preempted`; the mission stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerStatus {
    /// A step is active and waiting on the outside world.
    Running {
        /// Index of the active step in the plan.
        step: usize,
    },

    /// All steps reported `Succeeded`.
    Complete,

    /// A step ended without success.
    Halted {
        /// Index of the step that stopped the mission.
        step: usize,
        status: MissionStatus,
    },
}

impl SequencerStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, SequencerStatus::Running { .. })
    }
}

/// The record of one finished step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Position in the plan.
    pub index: usize,
    /// Action tag as written in the plan.
    pub action: String,
    /// The state's human-readable description.
    pub description: String,
    pub status: MissionStatus,
    /// Wall-clock time the status was received (UTC).
    pub finished_at: DateTime<Utc>,
}
