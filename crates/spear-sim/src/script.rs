//! What the simulated robot does with the goals it receives.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The fate of one submitted goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum GoalScript {
    /// Publish a result with raw status `status` after `after_ms`.
    Complete { status: i32, after_ms: u64 },
    /// Report a channel timeout for the goal after `after_ms`.
    Timeout { after_ms: u64 },
    /// Never answer.
    Silent,
}

impl GoalScript {
    pub fn succeed_after(after: Duration) -> Self {
        GoalScript::Complete {
            status: 3,
            after_ms: after.as_millis() as u64,
        }
    }

    pub fn abort_after(after: Duration) -> Self {
        GoalScript::Complete {
            status: 4,
            after_ms: after.as_millis() as u64,
        }
    }
}

impl Default for GoalScript {
    fn default() -> Self {
        GoalScript::Complete {
            status: 3,
            after_ms: 2000,
        }
    }
}

/// Latencies and scripted outcomes, usually read from a `[sim]` table.
///
/// ```toml
/// [sim]
/// transform_service = "gps_to_utm"
/// transform_latency_ms = 50
/// cancel_latency_ms = 100
/// default_goal = { outcome = "complete", status = 3, after_ms = 2000 }
///
/// [[sim.goals.move_base]]
/// outcome = "timeout"
/// after_ms = 5000
/// ```
///
/// Scripts under `goals.<server>` are consumed in submission order; once a
/// server's list runs out, `default_goal` applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// The only service name the simulated transform answers to.
    pub transform_service: String,
    pub transform_latency_ms: u64,
    pub cancel_latency_ms: u64,
    /// When set, every transform request fails with this reason.
    pub transform_failure: Option<String>,
    pub default_goal: GoalScript,
    pub goals: HashMap<String, Vec<GoalScript>>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            transform_service: "gps_to_utm".to_string(),
            transform_latency_ms: 50,
            cancel_latency_ms: 100,
            transform_failure: None,
            default_goal: GoalScript::default(),
            goals: HashMap::new(),
        }
    }
}
