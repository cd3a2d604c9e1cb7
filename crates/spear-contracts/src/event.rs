//! Identity tokens and the events the bus delivers back to a mission state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::message::{GoalResultMessage, GpsToUtmResponse};

/// Identity of one submitted goal.
///
/// Issued by the action channel on submission and never reused. Compared
/// against `goal_id.id` of result messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalId(pub String);

impl GoalId {
    /// Create a new, unique goal identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correlates a transform service response with its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Handle for a timer armed through the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// An asynchronous callback from the outside world.
///
/// The event loop delivers every event to the active mission state. States
/// decide for themselves whether an event belongs to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BusEvent {
    /// A message on `<server>/result`.
    GoalResult {
        server: String,
        message: GoalResultMessage,
    },

    /// The action channel gave up waiting on a goal.
    GoalTimeout { server: String, goal_id: GoalId },

    /// The transform service answered a request.
    TransformResponse {
        request_id: RequestId,
        response: GpsToUtmResponse,
    },

    /// The transform service call failed.
    TransformFailed { request_id: RequestId, reason: String },

    /// A scheduler timer expired.
    TimerFired(TimerId),
}

impl BusEvent {
    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            BusEvent::GoalResult { .. } => "goal_result",
            BusEvent::GoalTimeout { .. } => "goal_timeout",
            BusEvent::TransformResponse { .. } => "transform_response",
            BusEvent::TransformFailed { .. } => "transform_failed",
            BusEvent::TimerFired(_) => "timer_fired",
        }
    }
}
