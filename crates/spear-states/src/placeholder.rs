//! Stand-in state for action tags the factory does not recognise.
//!
//! Behaves like a harmless action that takes `placeholder.delay_ms` and then
//! succeeds, so a plan referencing unimplemented actions can still be played
//! through. Both outcomes travel through the scheduler: success on the delay
//! timer, `Preempted` on a zero-delay timer armed by `cancel()`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use spear_contracts::{
    error::{MissionError, MissionResult},
    event::{BusEvent, TimerId},
    status::MissionStatus,
};
use spear_core::{
    traits::{CompletionCallback, MissionState, Scheduler},
    Completion,
};

pub struct PlaceholderState {
    action: String,
    parameters: String,
    delay: Duration,
    scheduler: Arc<dyn Scheduler>,
    completion: Completion,
    entered: bool,
    delay_timer: Option<TimerId>,
    preempt_timer: Option<TimerId>,
}

impl PlaceholderState {
    pub fn new(
        action: impl Into<String>,
        parameters: impl Into<String>,
        delay: Duration,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            action: action.into(),
            parameters: parameters.into(),
            delay,
            scheduler,
            completion: Completion::new(),
            entered: false,
            delay_timer: None,
            preempt_timer: None,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn parameters(&self) -> &str {
        &self.parameters
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn arm_preempt(&mut self) {
        match self.scheduler.schedule(Duration::ZERO) {
            Ok(timer) => self.preempt_timer = Some(timer),
            Err(e) => {
                // No asynchronous path left; report directly.
                error!(error = %e, "could not schedule preemption");
                self.completion.fire(MissionStatus::Preempted);
            }
        }
    }
}

impl MissionState for PlaceholderState {
    fn set_completion_callback(&mut self, callback: CompletionCallback) {
        self.completion.arm(callback);
    }

    fn enter(&mut self) -> MissionResult<()> {
        if !self.completion.is_armed() {
            return Err(MissionError::CallbackNotSet {
                description: self.description(),
            });
        }
        self.entered = true;
        if self.preempt_timer.is_some() {
            debug!(description = %self.description(), "already cancelled, delay not started");
            return Ok(());
        }
        info!(description = %self.description(), delay_ms = self.delay.as_millis() as u64, "entering state");

        match self.scheduler.schedule(self.delay) {
            Ok(timer) => self.delay_timer = Some(timer),
            Err(e) => {
                error!(error = %e, "could not schedule placeholder delay");
                self.completion.fire(MissionStatus::Aborted);
            }
        }
        Ok(())
    }

    fn cancel(&mut self) -> MissionResult<()> {
        if self.preempt_timer.is_some() {
            return Ok(());
        }
        if let Some(timer) = self.delay_timer.take() {
            info!(description = %self.description(), "cancelling state");
            self.scheduler.cancel(timer);
            self.arm_preempt();
        } else if !self.entered && self.completion.is_armed() {
            self.arm_preempt();
        } else {
            debug!(description = %self.description(), "placeholder already finished, cancel ignored");
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Placeholder state: {} {}", self.action, self.parameters)
            .trim_end()
            .to_string()
    }

    fn handle_event(&mut self, event: &BusEvent) {
        let BusEvent::TimerFired(timer) = event else {
            return;
        };
        if self.delay_timer == Some(*timer) {
            self.delay_timer = None;
            self.completion.fire(MissionStatus::Succeeded);
        } else if self.preempt_timer == Some(*timer) {
            self.preempt_timer = None;
            self.completion.fire(MissionStatus::Preempted);
        }
    }
}
