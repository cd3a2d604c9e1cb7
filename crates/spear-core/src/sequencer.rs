//! Reference mission sequencer.
//!
//! The sequencer holds exactly one active `MissionState` at a time:
//!
//!   build → set callback → enter → (bus events...) → terminal status → retire
//!
//! `Succeeded` advances to the next plan step. `Aborted` and `Preempted` halt
//! the mission; recovery (retry, operator escalation) is left to the caller.
//! Completions are collected through an mpsc channel tagged with the step
//! index, so a status from a retired state can never advance the plan.

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::Utc;
use tracing::{debug, info, warn};

use spear_contracts::{
    error::{MissionError, MissionResult},
    event::BusEvent,
    execution::{SequencerStatus, StepRecord},
    status::MissionStatus,
    step::MissionPlan,
};

use crate::traits::{MissionState, StateFactory};

pub struct MissionSequencer {
    factory: Box<dyn StateFactory>,
    plan: MissionPlan,
    cursor: usize,
    started: bool,
    active: Option<Box<dyn MissionState>>,
    outcome_tx: Sender<(usize, MissionStatus)>,
    outcome_rx: Receiver<(usize, MissionStatus)>,
    records: Vec<StepRecord>,
    finished: Option<SequencerStatus>,
}

impl MissionSequencer {
    pub fn new(factory: Box<dyn StateFactory>, plan: MissionPlan) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            factory,
            plan,
            cursor: 0,
            started: false,
            active: None,
            outcome_tx,
            outcome_rx,
            records: Vec::new(),
            finished: None,
        }
    }

    /// Enter the first step.
    ///
    /// States that complete synchronously (manual handoff) are resolved
    /// before this returns, so the result may already be `Halted`.
    ///
    /// # Errors
    ///
    /// `StateMachineError` if called twice; otherwise any error from the
    /// factory or from `MissionState::enter`.
    pub fn start(&mut self) -> MissionResult<SequencerStatus> {
        if self.started {
            return Err(MissionError::StateMachineError {
                reason: "sequencer already started".to_string(),
            });
        }
        self.started = true;

        info!(steps = self.plan.len(), "mission starting");

        if self.plan.is_empty() {
            self.finished = Some(SequencerStatus::Complete);
            return Ok(SequencerStatus::Complete);
        }

        self.enter_current()?;
        self.advance()
    }

    /// Route one bus event to the active state and collect any outcome.
    pub fn dispatch(&mut self, event: &BusEvent) -> MissionResult<SequencerStatus> {
        if let Some(status) = &self.finished {
            debug!(event = event.kind(), "mission finished, dropping event");
            return Ok(status.clone());
        }
        if let Some(state) = self.active.as_mut() {
            state.handle_event(event);
        }
        self.advance()
    }

    /// Cancel the active step.
    ///
    /// For channel-backed states the terminal status usually arrives with a
    /// later event, so the result is often still `Running`.
    pub fn cancel(&mut self) -> MissionResult<SequencerStatus> {
        if let Some(state) = self.active.as_mut() {
            info!(step = self.cursor, description = %state.description(), "cancelling active step");
            state.cancel()?;
        }
        self.advance()
    }

    /// Current status without delivering anything.
    pub fn status(&self) -> SequencerStatus {
        match &self.finished {
            Some(status) => status.clone(),
            None => SequencerStatus::Running { step: self.cursor },
        }
    }

    /// Records for every step that reached a terminal status, in plan order.
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn active_description(&self) -> Option<String> {
        self.active.as_ref().map(|state| state.description())
    }

    pub fn plan(&self) -> &MissionPlan {
        &self.plan
    }

    fn enter_current(&mut self) -> MissionResult<()> {
        let index = self.cursor;
        let step = &self.plan.steps[index];
        let mut state = self.factory.build_state(step)?;

        let tx = self.outcome_tx.clone();
        state.set_completion_callback(Box::new(move |status| {
            // The receiver lives as long as the sequencer; a failed send only
            // means the sequencer is gone.
            let _ = tx.send((index, status));
        }));

        info!(
            step = index,
            action = %step.action,
            description = %state.description(),
            "entering step"
        );

        // Store first so `records` can find the description even when
        // `enter` completes synchronously.
        self.active = Some(state);
        if let Some(state) = self.active.as_mut() {
            if let Err(e) = state.enter() {
                warn!(step = index, error = %e, "step refused to enter");
                self.active = None;
                return Err(e);
            }
        }
        Ok(())
    }

    fn advance(&mut self) -> MissionResult<SequencerStatus> {
        loop {
            if let Some(status) = &self.finished {
                return Ok(status.clone());
            }

            let status = match self.outcome_rx.try_recv() {
                Ok((index, status)) if index == self.cursor => status,
                Ok((index, status)) => {
                    warn!(index, %status, active = self.cursor, "dropping completion from retired step");
                    continue;
                }
                Err(_) => return Ok(SequencerStatus::Running { step: self.cursor }),
            };

            self.retire_active(status);

            match status {
                MissionStatus::Succeeded if self.cursor + 1 < self.plan.len() => {
                    self.cursor += 1;
                    self.enter_current()?;
                }
                MissionStatus::Succeeded => {
                    info!(steps = self.plan.len(), "mission complete");
                    self.finished = Some(SequencerStatus::Complete);
                }
                other => {
                    warn!(step = self.cursor, status = %other, "mission halted");
                    self.finished = Some(SequencerStatus::Halted {
                        step: self.cursor,
                        status: other,
                    });
                }
            }
        }
    }

    fn retire_active(&mut self, status: MissionStatus) {
        let description = self
            .active
            .take()
            .map(|state| state.description())
            .unwrap_or_default();
        let action = self.plan.steps[self.cursor].action.clone();

        info!(step = self.cursor, action = %action, %status, "step finished");

        self.records.push(StepRecord {
            index: self.cursor,
            action,
            description,
            status,
            finished_at: Utc::now(),
        });
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use spear_contracts::{
        error::{MissionError, MissionResult},
        event::{BusEvent, TimerId},
        execution::SequencerStatus,
        status::MissionStatus,
        step::{MissionPlan, MissionStep},
    };

    use crate::completion::Completion;
    use crate::traits::{CompletionCallback, MissionState, StateFactory};

    use super::MissionSequencer;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// How a scripted state finishes.
    #[derive(Clone, Copy)]
    enum Script {
        /// Fire during `enter`.
        Immediate(MissionStatus),
        /// Fire when `TimerFired(id)` arrives.
        OnTimer(u64, MissionStatus),
        /// `enter` returns an error.
        Refuse,
    }

    struct ScriptedState {
        name: String,
        script: Script,
        completion: Completion,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl MissionState for ScriptedState {
        fn set_completion_callback(&mut self, callback: CompletionCallback) {
            self.completion.arm(callback);
        }

        fn enter(&mut self) -> MissionResult<()> {
            self.log.lock().unwrap().push(format!("enter {}", self.name));
            match self.script {
                Script::Immediate(status) => {
                    self.completion.fire(status);
                }
                Script::Refuse => {
                    return Err(MissionError::StateMachineError {
                        reason: format!("{} refused", self.name),
                    })
                }
                Script::OnTimer(..) => {}
            }
            Ok(())
        }

        fn cancel(&mut self) -> MissionResult<()> {
            self.log.lock().unwrap().push(format!("cancel {}", self.name));
            self.completion.fire(MissionStatus::Preempted);
            Ok(())
        }

        fn description(&self) -> String {
            format!("scripted {}", self.name)
        }

        fn handle_event(&mut self, event: &BusEvent) {
            if let (Script::OnTimer(id, status), BusEvent::TimerFired(TimerId(fired))) =
                (self.script, event)
            {
                if id == *fired {
                    self.completion.fire(status);
                }
            }
        }
    }

    /// Builds scripted states keyed by the step's action tag.
    struct ScriptedFactory {
        scripts: Vec<(String, Script)>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl StateFactory for ScriptedFactory {
        fn build_state(&self, step: &MissionStep) -> MissionResult<Box<dyn MissionState>> {
            let script = self
                .scripts
                .iter()
                .find(|(tag, _)| *tag == step.action)
                .map(|(_, script)| *script)
                .ok_or_else(|| MissionError::InvalidParameters {
                    tag: step.action.clone(),
                    parameters: step.parameters.clone(),
                    reason: "no script".to_string(),
                })?;
            Ok(Box::new(ScriptedState {
                name: step.action.clone(),
                script,
                completion: Completion::new(),
                log: self.log.clone(),
            }))
        }
    }

    fn sequencer(
        scripts: Vec<(&str, Script)>,
        plan: &[&str],
    ) -> (MissionSequencer, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let factory = ScriptedFactory {
            scripts: scripts.into_iter().map(|(t, s)| (t.to_string(), s)).collect(),
            log: log.clone(),
        };
        let plan = MissionPlan {
            steps: plan.iter().map(|tag| MissionStep::new(*tag, "")).collect(),
        };
        (MissionSequencer::new(Box::new(factory), plan), log)
    }

    // ── Test cases ────────────────────────────────────────────────────────────

    #[test]
    fn succeeded_steps_advance_to_completion() {
        let (mut seq, log) = sequencer(
            vec![
                ("a", Script::OnTimer(1, MissionStatus::Succeeded)),
                ("b", Script::OnTimer(2, MissionStatus::Succeeded)),
            ],
            &["a", "b"],
        );

        assert_eq!(seq.start().unwrap(), SequencerStatus::Running { step: 0 });
        assert_eq!(seq.active_description().as_deref(), Some("scripted a"));

        // An event for a later step does nothing yet.
        assert_eq!(
            seq.dispatch(&BusEvent::TimerFired(TimerId(2))).unwrap(),
            SequencerStatus::Running { step: 0 }
        );
        assert_eq!(
            seq.dispatch(&BusEvent::TimerFired(TimerId(1))).unwrap(),
            SequencerStatus::Running { step: 1 }
        );
        assert_eq!(
            seq.dispatch(&BusEvent::TimerFired(TimerId(2))).unwrap(),
            SequencerStatus::Complete
        );

        assert_eq!(*log.lock().unwrap(), vec!["enter a", "enter b"]);
        let records = seq.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "scripted a");
        assert!(records.iter().all(|r| r.status == MissionStatus::Succeeded));
    }

    #[test]
    fn synchronous_completions_chain_inside_start() {
        let (mut seq, _log) = sequencer(
            vec![
                ("ok", Script::Immediate(MissionStatus::Succeeded)),
                ("halt", Script::Immediate(MissionStatus::Aborted)),
                ("never", Script::Immediate(MissionStatus::Succeeded)),
            ],
            &["ok", "halt", "never"],
        );

        assert_eq!(
            seq.start().unwrap(),
            SequencerStatus::Halted { step: 1, status: MissionStatus::Aborted }
        );
        assert_eq!(seq.records().len(), 2);
        assert!(seq.active_description().is_none());
    }

    #[test]
    fn cancel_halts_with_preempted() {
        let (mut seq, log) = sequencer(
            vec![("wait", Script::OnTimer(9, MissionStatus::Succeeded))],
            &["wait"],
        );
        seq.start().unwrap();

        assert_eq!(
            seq.cancel().unwrap(),
            SequencerStatus::Halted { step: 0, status: MissionStatus::Preempted }
        );
        assert_eq!(*log.lock().unwrap(), vec!["enter wait", "cancel wait"]);

        // Events after the mission finished are dropped.
        assert_eq!(
            seq.dispatch(&BusEvent::TimerFired(TimerId(9))).unwrap(),
            SequencerStatus::Halted { step: 0, status: MissionStatus::Preempted }
        );
        assert_eq!(seq.records().len(), 1);
    }

    #[test]
    fn start_twice_is_a_state_machine_error() {
        let (mut seq, _log) = sequencer(
            vec![("wait", Script::OnTimer(1, MissionStatus::Succeeded))],
            &["wait"],
        );
        seq.start().unwrap();

        assert!(matches!(seq.start(), Err(MissionError::StateMachineError { .. })));
    }

    #[test]
    fn factory_errors_propagate() {
        let (mut seq, _log) = sequencer(vec![], &["unscripted"]);
        assert!(matches!(seq.start(), Err(MissionError::InvalidParameters { .. })));
    }

    #[test]
    fn failed_enter_leaves_no_active_state() {
        let (mut seq, log) = sequencer(vec![("broken", Script::Refuse)], &["broken"]);

        assert!(matches!(seq.start(), Err(MissionError::StateMachineError { .. })));
        assert_eq!(seq.active_description(), None);
        assert!(seq.records().is_empty());

        // Nothing left to cancel.
        seq.cancel().unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["enter broken".to_string()]);
    }

    #[test]
    fn empty_plan_is_immediately_complete() {
        let (mut seq, _log) = sequencer(vec![], &[]);
        assert_eq!(seq.start().unwrap(), SequencerStatus::Complete);
    }
}
