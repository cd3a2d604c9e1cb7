//! Recording mocks for the external capabilities.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use spear_config::MissionConfig;
use spear_contracts::{
    error::{MissionError, MissionResult},
    event::{BusEvent, GoalId, RequestId, TimerId},
    message::{GoalResultMessage, GpsToUtmRequest, NavigationGoal},
    status::MissionStatus,
};
use spear_core::{
    traits::{ActionChannel, CompletionCallback, Scheduler, TransformClient},
    GoalHandle,
};

use crate::context::StateContext;

/// Collects every status a completion callback receives.
pub(crate) fn recorder() -> (Arc<Mutex<Vec<MissionStatus>>>, CompletionCallback) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, Box::new(move |status| sink.lock().unwrap().push(status)))
}

pub(crate) fn result_event(server: &str, goal_id: &str, code: i32) -> BusEvent {
    BusEvent::GoalResult {
        server: server.to_string(),
        message: GoalResultMessage::new(goal_id, code),
    }
}

/// Action channel that hands out `goal-1`, `goal-2`, ... and records calls.
#[derive(Clone, Default)]
pub(crate) struct MockChannel {
    sent: Arc<Mutex<Vec<(String, NavigationGoal)>>>,
    cancels: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockChannel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub(crate) fn handle(&self) -> Arc<dyn ActionChannel> {
        Arc::new(self.clone())
    }

    pub(crate) fn sent(&self) -> Vec<(String, NavigationGoal)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn cancels(&self) -> Vec<String> {
        self.cancels.lock().unwrap().clone()
    }
}

impl ActionChannel for MockChannel {
    fn send_goal(&self, server: &str, goal: &NavigationGoal) -> MissionResult<GoalHandle> {
        if self.fail {
            return Err(MissionError::ChannelError {
                server: server.to_string(),
                reason: "not connected".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((server.to_string(), goal.clone()));
        let goal_id = GoalId(format!("goal-{}", sent.len()));
        Ok(GoalHandle::new(server, goal_id))
    }

    fn cancel(&self, server: &str) -> MissionResult<()> {
        self.cancels.lock().unwrap().push(server.to_string());
        Ok(())
    }
}

/// Transform client that records requests and numbers them from 1.
#[derive(Clone, Default)]
pub(crate) struct MockTransform {
    requests: Arc<Mutex<Vec<(String, GpsToUtmRequest)>>>,
    fail: bool,
}

impl MockTransform {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub(crate) fn handle(&self) -> Arc<dyn TransformClient> {
        Arc::new(self.clone())
    }

    pub(crate) fn requests(&self) -> Vec<GpsToUtmRequest> {
        self.requests.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    pub(crate) fn services(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }
}

impl TransformClient for MockTransform {
    fn gps_to_utm(&self, service: &str, request: &GpsToUtmRequest) -> MissionResult<RequestId> {
        if self.fail {
            return Err(MissionError::TransformError {
                reason: "service unavailable".to_string(),
            });
        }
        let mut requests = self.requests.lock().unwrap();
        requests.push((service.to_string(), request.clone()));
        Ok(RequestId(requests.len() as u64))
    }
}

/// Scheduler that records armed and cancelled timers, numbered from 1.
#[derive(Clone, Default)]
pub(crate) struct MockScheduler {
    armed: Arc<Mutex<Vec<(TimerId, Duration)>>>,
    cancelled: Arc<Mutex<Vec<TimerId>>>,
}

impl MockScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn handle(&self) -> Arc<dyn Scheduler> {
        Arc::new(self.clone())
    }

    pub(crate) fn armed(&self) -> Vec<(TimerId, Duration)> {
        self.armed.lock().unwrap().clone()
    }

    pub(crate) fn cancelled(&self) -> Vec<TimerId> {
        self.cancelled.lock().unwrap().clone()
    }
}

impl Scheduler for MockScheduler {
    fn schedule(&self, delay: Duration) -> MissionResult<TimerId> {
        let mut armed = self.armed.lock().unwrap();
        let id = TimerId(armed.len() as u64 + 1);
        armed.push((id, delay));
        Ok(id)
    }

    fn cancel(&self, timer: TimerId) {
        self.cancelled.lock().unwrap().push(timer);
    }
}

/// All three mocks wired into a `StateContext`.
pub(crate) struct Harness {
    pub(crate) channel: MockChannel,
    pub(crate) transform: MockTransform,
    pub(crate) scheduler: MockScheduler,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self {
            channel: MockChannel::new(),
            transform: MockTransform::new(),
            scheduler: MockScheduler::new(),
        }
    }

    pub(crate) fn context(&self, config: MissionConfig) -> StateContext {
        StateContext::new(
            self.channel.handle(),
            self.transform.handle(),
            self.scheduler.handle(),
            config,
        )
    }
}
