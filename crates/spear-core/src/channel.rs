//! Per-submission goal handle.
//!
//! A `GoalHandle` is what `ActionChannel::send_goal` hands back. It knows
//! which server and which goal identity it stands for, and turns bus events
//! into a terminal status only when they belong to that goal. Result messages
//! for older goals on the same server resolve to nothing.

use spear_contracts::{
    event::{BusEvent, GoalId},
    status::MissionStatus,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalHandle {
    server: String,
    goal_id: GoalId,
}

impl GoalHandle {
    pub fn new(server: impl Into<String>, goal_id: GoalId) -> Self {
        Self {
            server: server.into(),
            goal_id,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn goal_id(&self) -> &GoalId {
        &self.goal_id
    }

    /// The terminal status `event` reports for this goal, if any.
    ///
    /// - a result message for this goal with a terminal code → that status
    /// - a timeout for this goal → `Aborted`
    /// - anything else (other server, other goal, non-terminal code) → `None`
    pub fn resolve(&self, event: &BusEvent) -> Option<MissionStatus> {
        match event {
            BusEvent::GoalResult { server, message }
                if *server == self.server && message.goal_id() == self.goal_id.as_str() =>
            {
                MissionStatus::from_code(message.status_code())
            }
            BusEvent::GoalTimeout { server, goal_id }
                if *server == self.server && *goal_id == self.goal_id =>
            {
                Some(MissionStatus::Aborted)
            }
            _ => None,
        }
    }

    /// True for a result message on this server that belongs to another goal.
    pub fn is_foreign_result(&self, event: &BusEvent) -> bool {
        match event {
            BusEvent::GoalResult { server, message } => {
                *server == self.server && message.goal_id() != self.goal_id.as_str()
            }
            _ => false,
        }
    }
}
