//! Terminal status codes.
//!
//! `GoalStatus` mirrors the full action-server status table as it appears on
//! the wire. `MissionStatus` is the narrower set a mission state reports to
//! the sequencer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The final outcome of a mission state's operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionStatus {
    Succeeded,
    Aborted,
    Preempted,
}

impl MissionStatus {
    /// The action-server status code for this outcome.
    pub fn code(self) -> i32 {
        match self {
            MissionStatus::Preempted => GoalStatus::Preempted as i32,
            MissionStatus::Succeeded => GoalStatus::Succeeded as i32,
            MissionStatus::Aborted => GoalStatus::Aborted as i32,
        }
    }

    /// Convert a raw status code from a result message.
    ///
    /// Returns `None` for the non-terminal codes (pending, active, preempting,
    /// recalling). Codes outside the known table are treated as `Aborted`.
    pub fn from_code(code: i32) -> Option<Self> {
        match GoalStatus::from_code(code) {
            Some(status) => status.to_mission_status(),
            None => Some(MissionStatus::Aborted),
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MissionStatus::Succeeded => "succeeded",
            MissionStatus::Aborted => "aborted",
            MissionStatus::Preempted => "preempted",
        };
        f.write_str(label)
    }
}

/// Action-server goal status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum GoalStatus {
    Pending = 0,
    Active = 1,
    Preempted = 2,
    Succeeded = 3,
    Aborted = 4,
    Rejected = 5,
    Preempting = 6,
    Recalling = 7,
    Recalled = 8,
    Lost = 9,
}

impl GoalStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        let status = match code {
            0 => GoalStatus::Pending,
            1 => GoalStatus::Active,
            2 => GoalStatus::Preempted,
            3 => GoalStatus::Succeeded,
            4 => GoalStatus::Aborted,
            5 => GoalStatus::Rejected,
            6 => GoalStatus::Preempting,
            7 => GoalStatus::Recalling,
            8 => GoalStatus::Recalled,
            9 => GoalStatus::Lost,
            _ => return None,
        };
        Some(status)
    }

    /// True if the goal will not change status again.
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            GoalStatus::Pending | GoalStatus::Active | GoalStatus::Preempting | GoalStatus::Recalling
        )
    }

    /// Collapse a terminal code into the three outcomes the sequencer handles.
    pub fn to_mission_status(self) -> Option<MissionStatus> {
        match self {
            GoalStatus::Succeeded => Some(MissionStatus::Succeeded),
            GoalStatus::Preempted | GoalStatus::Recalled => Some(MissionStatus::Preempted),
            GoalStatus::Aborted | GoalStatus::Rejected | GoalStatus::Lost => {
                Some(MissionStatus::Aborted)
            }
            GoalStatus::Pending
            | GoalStatus::Active
            | GoalStatus::Preempting
            | GoalStatus::Recalling => None,
        }
    }
}
