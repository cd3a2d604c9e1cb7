//! Goal submission and tracking shared by the channel-backed states.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use spear_contracts::{
    error::MissionResult,
    event::{BusEvent, GoalId, TimerId},
    message::NavigationGoal,
    status::MissionStatus,
};
use spear_core::{
    traits::{ActionChannel, Scheduler},
    Completion, GoalHandle,
};

/// Owns the in-flight goal of one state.
///
/// The handle is taken on the first terminal event, so a late duplicate or a
/// result for an older goal on the same server never reaches the completion.
pub(crate) struct GoalTracker {
    server: String,
    channel: Arc<dyn ActionChannel>,
    scheduler: Arc<dyn Scheduler>,
    cancel_timeout: Option<Duration>,
    pending: Option<GoalHandle>,
    cancel_timer: Option<TimerId>,
}

impl GoalTracker {
    pub(crate) fn new(
        server: impl Into<String>,
        channel: Arc<dyn ActionChannel>,
        scheduler: Arc<dyn Scheduler>,
        cancel_timeout: Option<Duration>,
    ) -> Self {
        Self {
            server: server.into(),
            channel,
            scheduler,
            cancel_timeout,
            pending: None,
            cancel_timer: None,
        }
    }

    pub(crate) fn server(&self) -> &str {
        &self.server
    }

    pub(crate) fn has_cancel_timeout(&self) -> bool {
        self.cancel_timeout.is_some()
    }

    pub(crate) fn pending_goal(&self) -> Option<&GoalId> {
        self.pending.as_ref().map(GoalHandle::goal_id)
    }

    /// Submit `goal`. A refused submission ends the state with `Aborted`.
    pub(crate) fn submit(&mut self, goal: &NavigationGoal, completion: &mut Completion) {
        match self.channel.send_goal(&self.server, goal) {
            Ok(handle) => {
                info!(
                    server = %self.server,
                    result_topic = %format!("{}/result", self.server),
                    goal_id = %handle.goal_id(),
                    frame = %goal.frame_id(),
                    x = goal.position().x,
                    y = goal.position().y,
                    "goal submitted"
                );
                self.pending = Some(handle);
            }
            Err(e) => {
                error!(server = %self.server, error = %e, "goal submission failed");
                completion.fire(MissionStatus::Aborted);
            }
        }
    }

    /// Forward a server-scoped cancel for the pending goal.
    ///
    /// Does nothing once the goal has resolved, so a late cancel cannot hit
    /// the next state's goal on the same server.
    pub(crate) fn cancel(&mut self) -> MissionResult<()> {
        let Some(handle) = &self.pending else {
            debug!(server = %self.server, "no pending goal, cancel ignored");
            return Ok(());
        };

        info!(server = %self.server, goal_id = %handle.goal_id(), "forwarding cancel");
        self.channel.cancel(&self.server)?;

        if let (Some(timeout), None) = (self.cancel_timeout, self.cancel_timer) {
            self.cancel_timer = Some(self.scheduler.schedule(timeout)?);
        }
        Ok(())
    }

    /// Feed one bus event. Fires `completion` on the first terminal match.
    pub(crate) fn handle_event(&mut self, event: &BusEvent, completion: &mut Completion) {
        if let BusEvent::TimerFired(timer) = event {
            if self.cancel_timer == Some(*timer) {
                self.cancel_timer = None;
                if let Some(handle) = self.pending.take() {
                    warn!(
                        server = %self.server,
                        goal_id = %handle.goal_id(),
                        "channel silent after cancel, reporting preempted"
                    );
                    completion.fire(MissionStatus::Preempted);
                }
            }
            return;
        }

        let Some(handle) = &self.pending else {
            return;
        };

        if let Some(status) = handle.resolve(event) {
            info!(server = %self.server, goal_id = %handle.goal_id(), %status, "goal finished");
            self.pending = None;
            if let Some(timer) = self.cancel_timer.take() {
                self.scheduler.cancel(timer);
            }
            completion.fire(status);
        } else if handle.is_foreign_result(event) {
            debug!(
                server = %self.server,
                goal_id = %handle.goal_id(),
                event = event.kind(),
                "dropping result for another goal"
            );
        }
    }
}
