//! Plays a mission against a [`SimBus`] until it finishes or runs dry.

use std::time::Duration;

use tracing::{info, warn};

use spear_contracts::{
    error::MissionResult,
    execution::{SequencerStatus, StepRecord},
};
use spear_core::MissionSequencer;

use crate::bus::SimBus;

/// How a simulated run ended.
#[derive(Debug, Clone)]
pub struct MissionReport {
    pub status: SequencerStatus,
    pub records: Vec<StepRecord>,
    /// Virtual time when the run stopped.
    pub elapsed: Duration,
    /// True when a step was still running but the bus had nothing left to
    /// deliver (for example a silent server after a cancel).
    pub stalled: bool,
}

/// Start `sequencer` and pump bus events into it.
///
/// With `cancel_after`, the active step is cancelled once the virtual clock
/// reaches that instant.
pub fn run_mission(
    sequencer: &mut MissionSequencer,
    bus: &SimBus,
    cancel_after: Option<Duration>,
) -> MissionResult<MissionReport> {
    let mut status = sequencer.start()?;
    let mut cancel_at = cancel_after;
    let mut stalled = false;

    while !status.is_finished() {
        if let Some(at) = cancel_at {
            if bus.next_due().map_or(true, |due| due > at) {
                bus.advance_to(at);
                info!(at_ms = at.as_millis() as u64, "cancel requested");
                cancel_at = None;
                status = sequencer.cancel()?;
                continue;
            }
        }

        match bus.next_event() {
            Some(event) => status = sequencer.dispatch(&event)?,
            None => {
                warn!(?status, "no events left while mission is running");
                stalled = true;
                break;
            }
        }
    }

    Ok(MissionReport {
        status,
        records: sequencer.records().to_vec(),
        elapsed: bus.now(),
        stalled,
    })
}
