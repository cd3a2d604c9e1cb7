//! Remote action state: submit one goal to a named action server and report
//! whatever terminal status the server gives it.
//!
//! `cancel()` only forwards the request. The terminal status (normally
//! `Preempted`) comes back later as a result message, or as a timeout. With
//! `cancellation.timeout_ms` configured, a silent channel is reported as
//! `Preempted` once the timeout passes.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use spear_contracts::{
    error::{MissionError, MissionResult},
    event::{BusEvent, GoalId},
    message::NavigationGoal,
};
use spear_core::{
    traits::{ActionChannel, CompletionCallback, MissionState, Scheduler},
    Completion,
};

use crate::goal::GoalTracker;

pub struct RemoteActionState {
    goal: NavigationGoal,
    description: String,
    tracker: GoalTracker,
    completion: Completion,
}

impl RemoteActionState {
    pub fn new(
        server: impl Into<String>,
        goal: NavigationGoal,
        description: impl Into<String>,
        channel: Arc<dyn ActionChannel>,
        scheduler: Arc<dyn Scheduler>,
        cancel_timeout: Option<Duration>,
    ) -> Self {
        Self {
            goal,
            description: description.into(),
            tracker: GoalTracker::new(server, channel, scheduler, cancel_timeout),
            completion: Completion::new(),
        }
    }

    pub fn goal(&self) -> &NavigationGoal {
        &self.goal
    }

    pub fn server(&self) -> &str {
        self.tracker.server()
    }

    /// Identity of the goal still awaiting a terminal status.
    pub fn pending_goal(&self) -> Option<&GoalId> {
        self.tracker.pending_goal()
    }
}

impl MissionState for RemoteActionState {
    fn set_completion_callback(&mut self, callback: CompletionCallback) {
        self.completion.arm(callback);
    }

    fn enter(&mut self) -> MissionResult<()> {
        if !self.completion.is_armed() {
            return Err(MissionError::CallbackNotSet {
                description: self.description.clone(),
            });
        }
        info!(description = %self.description, "entering state");
        self.tracker.submit(&self.goal, &mut self.completion);
        Ok(())
    }

    fn cancel(&mut self) -> MissionResult<()> {
        info!(description = %self.description, "cancelling state");
        self.tracker.cancel()
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn handle_event(&mut self, event: &BusEvent) {
        self.tracker.handle_event(event, &mut self.completion);
    }
}
