//! The simulated bus.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use spear_contracts::{
    error::{MissionError, MissionResult},
    event::{BusEvent, GoalId, RequestId, TimerId},
    message::{GoalResultMessage, GpsToUtmRequest, GpsToUtmResponse, NavigationGoal, Point},
    status::GoalStatus,
};
use spear_core::{
    traits::{ActionChannel, Scheduler, TransformClient},
    GoalHandle,
};

use crate::geo;
use crate::script::{GoalScript, SimSettings};

/// Queue position: due time in virtual milliseconds, then insertion order.
type Slot = (u64, u64);

struct Entry {
    event: BusEvent,
    /// Set for scripted goal outcomes; popping the entry retires the goal.
    goal: Option<GoalId>,
}

struct ActiveGoal {
    server: String,
    goal_id: GoalId,
    outcome: Option<Slot>,
    preempting: bool,
}

/// A goal the bus accepted, for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub at_ms: u64,
    pub server: String,
    pub goal_id: GoalId,
    pub goal: NavigationGoal,
}

struct SimState {
    now_ms: u64,
    next_seq: u64,
    queue: BTreeMap<Slot, Entry>,
    timers: HashMap<TimerId, Slot>,
    next_timer: u64,
    next_request: u64,
    active: Vec<ActiveGoal>,
    scripts: HashMap<String, VecDeque<GoalScript>>,
    settings: SimSettings,
    refusal: Option<String>,
    transform_offline: bool,
    submissions: Vec<Submission>,
    cancels: Vec<(u64, String)>,
}

impl SimState {
    fn push(&mut self, delay_ms: u64, event: BusEvent, goal: Option<GoalId>) -> Slot {
        let slot = (self.now_ms.saturating_add(delay_ms), self.next_seq);
        self.next_seq += 1;
        trace!(due_ms = slot.0, event = event.kind(), "event queued");
        self.queue.insert(slot, Entry { event, goal });
        slot
    }

    fn next_script(&mut self, server: &str) -> GoalScript {
        self.scripts
            .get_mut(server)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| self.settings.default_goal.clone())
    }
}

/// In-process action channel, transform service and scheduler sharing one
/// virtual clock.
///
/// Cloning is cheap and every clone drives the same bus, so the same
/// instance can be handed out as all three capabilities.
#[derive(Clone)]
pub struct SimBus {
    inner: Arc<Mutex<SimState>>,
}

impl SimBus {
    pub fn new(settings: SimSettings) -> Self {
        let scripts = settings
            .goals
            .iter()
            .map(|(server, list)| (server.clone(), list.iter().cloned().collect()))
            .collect();
        let state = SimState {
            now_ms: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
            timers: HashMap::new(),
            next_timer: 1,
            next_request: 1,
            active: Vec::new(),
            scripts,
            settings,
            refusal: None,
            transform_offline: false,
            submissions: Vec::new(),
            cancels: Vec::new(),
        };
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn channel(&self) -> Arc<dyn ActionChannel> {
        Arc::new(self.clone())
    }

    pub fn transform(&self) -> Arc<dyn TransformClient> {
        Arc::new(self.clone())
    }

    pub fn scheduler(&self) -> Arc<dyn Scheduler> {
        Arc::new(self.clone())
    }

    /// Queue a script for the next goal submitted to `server`.
    pub fn script_goal(&self, server: &str, script: GoalScript) {
        self.state()
            .scripts
            .entry(server.to_string())
            .or_default()
            .push_back(script);
    }

    /// Make every later `send_goal` fail synchronously (`None` to undo).
    pub fn refuse_goals(&self, reason: Option<&str>) {
        self.state().refusal = reason.map(str::to_string);
    }

    /// Make every later `gps_to_utm` call fail synchronously.
    pub fn set_transform_offline(&self, offline: bool) {
        self.state().transform_offline = offline;
    }

    /// Queue an arbitrary event, e.g. a stray or duplicate result.
    pub fn inject(&self, after: Duration, event: BusEvent) {
        self.state().push(millis(after), event, None);
    }

    /// Queue a result message for `goal_id` on `server` that no script produced.
    pub fn inject_result(&self, after: Duration, server: &str, goal_id: &str, status: i32) {
        self.inject(
            after,
            BusEvent::GoalResult {
                server: server.to_string(),
                message: GoalResultMessage::new(goal_id, status),
            },
        );
    }

    /// Pop the earliest event, moving the clock forward to its due time.
    pub fn next_event(&self) -> Option<BusEvent> {
        let mut state = self.state();
        let ((due_ms, _), entry) = state.queue.pop_first()?;
        state.now_ms = due_ms;

        if let BusEvent::TimerFired(timer) = &entry.event {
            state.timers.remove(timer);
        }
        if let Some(goal_id) = &entry.goal {
            state.active.retain(|goal| goal.goal_id != *goal_id);
        }

        debug!(now_ms = due_ms, event = entry.event.kind(), "delivering event");
        Some(entry.event)
    }

    /// Due time of the earliest queued event.
    pub fn next_due(&self) -> Option<Duration> {
        self.state()
            .queue
            .keys()
            .next()
            .map(|(due_ms, _)| Duration::from_millis(*due_ms))
    }

    /// Move the clock forward without delivering anything.
    ///
    /// Never moves past a queued event and never moves backwards.
    pub fn advance_to(&self, at: Duration) {
        let mut state = self.state();
        let mut target = millis(at);
        if let Some((due_ms, _)) = state.queue.keys().next() {
            target = target.min(*due_ms);
        }
        state.now_ms = state.now_ms.max(target);
    }

    pub fn now(&self) -> Duration {
        Duration::from_millis(self.state().now_ms)
    }

    pub fn pending_events(&self) -> usize {
        self.state().queue.len()
    }

    /// Goals submitted but not yet resolved by the bus.
    pub fn active_goals(&self) -> Vec<GoalId> {
        self.state()
            .active
            .iter()
            .map(|goal| goal.goal_id.clone())
            .collect()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state().submissions.clone()
    }

    /// `(virtual ms, server)` for every cancel request received.
    pub fn cancels(&self) -> Vec<(u64, String)> {
        self.state().cancels.clone()
    }
}

impl ActionChannel for SimBus {
    fn send_goal(&self, server: &str, goal: &NavigationGoal) -> MissionResult<GoalHandle> {
        let mut state = self.state();
        if let Some(reason) = &state.refusal {
            return Err(MissionError::ChannelError {
                server: server.to_string(),
                reason: reason.clone(),
            });
        }

        let goal_id = GoalId::new();
        let script = state.next_script(server);
        let outcome = match &script {
            GoalScript::Complete { status, after_ms } => {
                let event = BusEvent::GoalResult {
                    server: server.to_string(),
                    message: GoalResultMessage::new(goal_id.as_str(), *status),
                };
                Some(state.push(*after_ms, event, Some(goal_id.clone())))
            }
            GoalScript::Timeout { after_ms } => {
                let event = BusEvent::GoalTimeout {
                    server: server.to_string(),
                    goal_id: goal_id.clone(),
                };
                Some(state.push(*after_ms, event, Some(goal_id.clone())))
            }
            GoalScript::Silent => None,
        };

        info!(server, goal_id = %goal_id, script = ?script, "goal accepted");
        let at_ms = state.now_ms;
        state.active.push(ActiveGoal {
            server: server.to_string(),
            goal_id: goal_id.clone(),
            outcome,
            preempting: false,
        });
        state.submissions.push(Submission {
            at_ms,
            server: server.to_string(),
            goal_id: goal_id.clone(),
            goal: goal.clone(),
        });

        Ok(GoalHandle::new(server, goal_id))
    }

    fn cancel(&self, server: &str) -> MissionResult<()> {
        let mut state = self.state();
        let at_ms = state.now_ms;
        state.cancels.push((at_ms, server.to_string()));

        let latency = state.settings.cancel_latency_ms;
        let mut preempted = Vec::new();
        for goal in state.active.iter_mut() {
            if goal.server != server || goal.preempting {
                continue;
            }
            goal.preempting = true;
            preempted.push((goal.goal_id.clone(), goal.outcome.take()));
        }

        if preempted.is_empty() {
            debug!(server, "cancel received with no active goals");
        }
        for (goal_id, outcome) in preempted {
            if let Some(slot) = outcome {
                state.queue.remove(&slot);
            }
            let event = BusEvent::GoalResult {
                server: server.to_string(),
                message: GoalResultMessage::new(goal_id.as_str(), GoalStatus::Preempted as i32),
            };
            let slot = state.push(latency, event, Some(goal_id.clone()));
            if let Some(goal) = state.active.iter_mut().find(|goal| goal.goal_id == goal_id) {
                goal.outcome = Some(slot);
            }
            info!(server, goal_id = %goal_id, "goal preempting");
        }
        Ok(())
    }
}

impl TransformClient for SimBus {
    fn gps_to_utm(&self, service: &str, request: &GpsToUtmRequest) -> MissionResult<RequestId> {
        let mut state = self.state();
        if state.transform_offline {
            return Err(MissionError::TransformError {
                reason: "transform service offline".to_string(),
            });
        }
        if service != state.settings.transform_service {
            return Err(MissionError::TransformError {
                reason: format!("no service named '{}'", service),
            });
        }

        let request_id = RequestId(state.next_request);
        state.next_request += 1;
        let latency = state.settings.transform_latency_ms;

        let event = match (&state.settings.transform_failure, geo::to_utm(request.lat(), request.lon())) {
            (Some(reason), _) => BusEvent::TransformFailed {
                request_id,
                reason: reason.clone(),
            },
            (None, Some(utm)) => BusEvent::TransformResponse {
                request_id,
                response: GpsToUtmResponse {
                    utm_coord: Point::planar(utm.easting, utm.northing),
                },
            },
            (None, None) => {
                warn!(lat = request.lat(), lon = request.lon(), "coordinate outside UTM domain");
                BusEvent::TransformFailed {
                    request_id,
                    reason: format!(
                        "({}, {}) has no UTM projection",
                        request.lat(),
                        request.lon()
                    ),
                }
            }
        };
        state.push(latency, event, None);
        Ok(request_id)
    }
}

impl Scheduler for SimBus {
    fn schedule(&self, delay: Duration) -> MissionResult<TimerId> {
        let mut state = self.state();
        let timer = TimerId(state.next_timer);
        state.next_timer += 1;
        let slot = state.push(millis(delay), BusEvent::TimerFired(timer), None);
        state.timers.insert(timer, slot);
        Ok(timer)
    }

    fn cancel(&self, timer: TimerId) {
        let mut state = self.state();
        if let Some(slot) = state.timers.remove(&timer) {
            state.queue.remove(&slot);
            debug!(%timer, "timer cancelled");
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use spear_contracts::{
        error::MissionError,
        event::{BusEvent, RequestId, TimerId},
        message::{GpsToUtmRequest, NavigationGoal},
        status::MissionStatus,
    };
    use spear_core::traits::{ActionChannel, Scheduler, TransformClient};

    use crate::script::{GoalScript, SimSettings};

    use super::SimBus;

    fn bus() -> SimBus {
        SimBus::new(SimSettings::default())
    }

    fn goal() -> NavigationGoal {
        NavigationGoal::planar("base_link", 1.0, 2.0)
    }

    // ── Clock and ordering ──────────────────────────────────────────────

    #[test]
    fn events_come_out_by_due_time_then_insertion() {
        let bus = bus();
        let late = bus.schedule(Duration::from_millis(30)).unwrap();
        let first = bus.schedule(Duration::from_millis(10)).unwrap();
        let second = bus.schedule(Duration::from_millis(10)).unwrap();

        assert_eq!(bus.next_event(), Some(BusEvent::TimerFired(first)));
        assert_eq!(bus.now(), Duration::from_millis(10));
        assert_eq!(bus.next_event(), Some(BusEvent::TimerFired(second)));
        assert_eq!(bus.next_event(), Some(BusEvent::TimerFired(late)));
        assert_eq!(bus.now(), Duration::from_millis(30));
        assert_eq!(bus.next_event(), None);
    }

    #[test]
    fn zero_delay_timer_is_still_asynchronous() {
        let bus = bus();
        let timer = bus.schedule(Duration::ZERO).unwrap();
        assert_eq!(bus.pending_events(), 1);
        assert_eq!(bus.next_event(), Some(BusEvent::TimerFired(timer)));
        assert_eq!(bus.now(), Duration::ZERO);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let bus = bus();
        let timer = bus.schedule(Duration::from_millis(5)).unwrap();
        Scheduler::cancel(&bus, timer);
        Scheduler::cancel(&bus, TimerId(99));
        assert_eq!(bus.next_event(), None);
    }

    #[test]
    fn advance_to_stops_at_next_event() {
        let bus = bus();
        bus.schedule(Duration::from_millis(50)).unwrap();
        bus.advance_to(Duration::from_millis(20));
        assert_eq!(bus.now(), Duration::from_millis(20));
        bus.advance_to(Duration::from_millis(500));
        assert_eq!(bus.now(), Duration::from_millis(50));
        bus.advance_to(Duration::from_millis(10));
        assert_eq!(bus.now(), Duration::from_millis(50));
    }

    // ── Action channel ──────────────────────────────────────────────────

    #[test]
    fn default_script_succeeds_after_two_seconds() {
        let bus = bus();
        let handle = bus.send_goal("move_base", &goal()).unwrap();

        let event = bus.next_event().unwrap();
        assert_eq!(bus.now(), Duration::from_secs(2));
        assert_eq!(handle.resolve(&event), Some(MissionStatus::Succeeded));
        assert!(bus.active_goals().is_empty());
        assert_eq!(bus.submissions()[0].goal, goal());
    }

    #[test]
    fn every_submission_gets_a_fresh_goal_id() {
        let bus = bus();
        let a = bus.send_goal("move_base", &goal()).unwrap();
        let b = bus.send_goal("move_base", &goal()).unwrap();
        assert_ne!(a.goal_id(), b.goal_id());
    }

    #[test]
    fn scripts_are_consumed_per_server_in_order() {
        let bus = bus();
        bus.script_goal("move_base", GoalScript::Timeout { after_ms: 100 });
        bus.script_goal("move_base", GoalScript::abort_after(Duration::from_millis(50)));

        let first = bus.send_goal("move_base", &goal()).unwrap();
        let second = bus.send_goal("move_base", &goal()).unwrap();
        let other = bus.send_goal("arm", &goal()).unwrap();

        let e1 = bus.next_event().unwrap();
        assert_eq!(second.resolve(&e1), Some(MissionStatus::Aborted));
        let e2 = bus.next_event().unwrap();
        assert!(matches!(e2, BusEvent::GoalTimeout { .. }));
        assert_eq!(first.resolve(&e2), Some(MissionStatus::Aborted));
        let e3 = bus.next_event().unwrap();
        assert_eq!(other.resolve(&e3), Some(MissionStatus::Succeeded));
    }

    #[test]
    fn cancel_preempts_every_active_goal_on_the_server() {
        let bus = bus();
        bus.script_goal("move_base", GoalScript::Silent);
        let silent = bus.send_goal("move_base", &goal()).unwrap();
        let scripted = bus.send_goal("move_base", &goal()).unwrap();
        let elsewhere = bus.send_goal("arm", &goal()).unwrap();

        ActionChannel::cancel(&bus, "move_base").unwrap();
        // A repeated cancel does not queue a second preemption.
        ActionChannel::cancel(&bus, "move_base").unwrap();

        let e1 = bus.next_event().unwrap();
        let e2 = bus.next_event().unwrap();
        assert_eq!(bus.now(), Duration::from_millis(100));
        assert_eq!(silent.resolve(&e1), Some(MissionStatus::Preempted));
        assert_eq!(scripted.resolve(&e2), Some(MissionStatus::Preempted));

        // The scripted success was withdrawn; only the other server remains.
        let e3 = bus.next_event().unwrap();
        assert_eq!(elsewhere.resolve(&e3), Some(MissionStatus::Succeeded));
        assert_eq!(bus.next_event(), None);
        assert_eq!(bus.cancels().len(), 2);
    }

    #[test]
    fn refused_goals_fail_synchronously() {
        let bus = bus();
        bus.refuse_goals(Some("server not available"));
        assert!(bus.send_goal("move_base", &goal()).is_err());
        assert_eq!(bus.pending_events(), 0);

        bus.refuse_goals(None);
        assert!(bus.send_goal("move_base", &goal()).is_ok());
    }

    #[test]
    fn injected_duplicates_are_delivered_verbatim() {
        let bus = bus();
        bus.script_goal("move_base", GoalScript::succeed_after(Duration::from_millis(10)));
        let handle = bus.send_goal("move_base", &goal()).unwrap();
        bus.inject_result(Duration::from_millis(20), "move_base", handle.goal_id().as_str(), 4);
        bus.inject_result(Duration::from_millis(5), "move_base", "stale-goal", 3);

        let stray = bus.next_event().unwrap();
        assert_eq!(handle.resolve(&stray), None);
        assert!(handle.is_foreign_result(&stray));
        assert_eq!(handle.resolve(&bus.next_event().unwrap()), Some(MissionStatus::Succeeded));
        assert_eq!(handle.resolve(&bus.next_event().unwrap()), Some(MissionStatus::Aborted));
    }

    // ── Transform service ───────────────────────────────────────────────

    #[test]
    fn transform_answers_with_utm_after_latency() {
        let bus = bus();
        let id = bus.gps_to_utm("gps_to_utm", &GpsToUtmRequest::new(40.7484, -73.9857)).unwrap();
        assert_eq!(id, RequestId(1));

        match bus.next_event() {
            Some(BusEvent::TransformResponse { request_id, response }) => {
                assert_eq!(request_id, id);
                assert!((response.utm_coord.x - 585_628.4).abs() < 1.0);
                assert!((response.utm_coord.y - 4_511_322.4).abs() < 1.0);
            }
            other => panic!("expected transform response, got {:?}", other),
        }
        assert_eq!(bus.now(), Duration::from_millis(50));
    }

    #[test]
    fn transform_fails_for_unprojectable_coordinates() {
        let bus = bus();
        let id = bus.gps_to_utm("gps_to_utm", &GpsToUtmRequest::new(f64::NAN, 10.0)).unwrap();
        assert!(matches!(
            bus.next_event(),
            Some(BusEvent::TransformFailed { request_id, .. }) if request_id == id
        ));
    }

    #[test]
    fn configured_transform_failure_and_offline_service() {
        let bus = SimBus::new(SimSettings {
            transform_failure: Some("no fix".to_string()),
            ..SimSettings::default()
        });
        bus.gps_to_utm("gps_to_utm", &GpsToUtmRequest::new(1.0, 1.0)).unwrap();
        assert!(matches!(
            bus.next_event(),
            Some(BusEvent::TransformFailed { ref reason, .. }) if reason == "no fix"
        ));

        bus.set_transform_offline(true);
        assert!(bus.gps_to_utm("gps_to_utm", &GpsToUtmRequest::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn transform_rejects_unknown_service_name() {
        let bus = bus();
        assert!(matches!(
            bus.gps_to_utm("nav_gps", &GpsToUtmRequest::new(1.0, 1.0)),
            Err(MissionError::TransformError { ref reason }) if reason.contains("nav_gps")
        ));
        assert_eq!(bus.pending_events(), 0);
    }
}
