//! Manual control handoff.
//!
//! Entering hands the rover to a human operator, so the automated mission
//! stops: `enter()` reports `Aborted` at once. `cancel()` means the sequencer
//! is taking control back and reports `Preempted` at once. No channel is
//! involved.

use tracing::info;

use spear_contracts::{
    error::{MissionError, MissionResult},
    event::BusEvent,
    status::MissionStatus,
};
use spear_core::{
    traits::{CompletionCallback, MissionState},
    Completion,
};

const DESCRIPTION: &str = "Take manual control";

#[derive(Debug, Default)]
pub struct ManualControlState {
    completion: Completion,
}

impl ManualControlState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MissionState for ManualControlState {
    fn set_completion_callback(&mut self, callback: CompletionCallback) {
        self.completion.arm(callback);
    }

    fn enter(&mut self) -> MissionResult<()> {
        if !self.completion.is_armed() {
            return Err(MissionError::CallbackNotSet {
                description: DESCRIPTION.to_string(),
            });
        }
        info!("handing control to operator");
        self.completion.fire(MissionStatus::Aborted);
        Ok(())
    }

    fn cancel(&mut self) -> MissionResult<()> {
        if self.completion.fire(MissionStatus::Preempted) {
            info!("control reclaimed from operator");
        }
        Ok(())
    }

    fn description(&self) -> String {
        DESCRIPTION.to_string()
    }

    fn handle_event(&mut self, _event: &BusEvent) {}
}
