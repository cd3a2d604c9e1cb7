//! GPS navigation state.
//!
//! Converts the target latitude/longitude to a local UTM coordinate through
//! the transform service, then behaves like a remote action state with a goal
//! in the GPS frame.
//!
//! Phases:
//!
//!   Idle → Transforming → Navigating → (terminal status via the goal tracker)
//!
//! A cancel that lands while the transform is still outstanding is governed
//! by `PendingTransformPolicy`: `Suppress` reports `Preempted` at once and
//! never submits; `Submit` forwards the cancel and still submits the goal
//! once the transform resolves. With a cancel timeout configured, that late
//! goal is cancelled again right after submission so the timeout covers it.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use spear_config::PendingTransformPolicy;
use spear_contracts::{
    error::{MissionError, MissionResult},
    event::{BusEvent, GoalId, RequestId},
    message::{GpsToUtmRequest, NavigationGoal},
    status::MissionStatus,
};
use spear_core::{
    traits::{ActionChannel, CompletionCallback, MissionState, TransformClient},
    Completion,
};

use crate::context::StateContext;
use crate::goal::GoalTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Transforming {
        request: RequestId,
        cancel_requested: bool,
    },
    Navigating,
    Finished,
}

pub struct GpsNavigationState {
    lat: f64,
    lon: f64,
    frame: String,
    service: String,
    pending_transform: PendingTransformPolicy,
    transform: Arc<dyn TransformClient>,
    channel: Arc<dyn ActionChannel>,
    tracker: GoalTracker,
    completion: Completion,
    phase: Phase,
}

impl GpsNavigationState {
    pub fn new(lat: f64, lon: f64, ctx: &StateContext) -> Self {
        let config = &ctx.config;
        Self {
            lat,
            lon,
            frame: config.navigation.gps_frame.clone(),
            service: config.transform.service.clone(),
            pending_transform: config.cancellation.pending_transform,
            transform: ctx.transform.clone(),
            channel: ctx.channel.clone(),
            tracker: GoalTracker::new(
                config.navigation.server.clone(),
                ctx.channel.clone(),
                ctx.scheduler.clone(),
                config.cancellation.timeout(),
            ),
            completion: Completion::new(),
            phase: Phase::Idle,
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn pending_goal(&self) -> Option<&GoalId> {
        self.tracker.pending_goal()
    }

    /// True while waiting on the transform service.
    pub fn is_transforming(&self) -> bool {
        matches!(self.phase, Phase::Transforming { .. })
    }

    fn on_transform(&mut self, x: f64, y: f64) {
        let cancel_requested = matches!(self.phase, Phase::Transforming { cancel_requested: true, .. });
        if cancel_requested {
            warn!(
                description = %self.description(),
                "transform resolved after cancel, submitting goal anyway"
            );
        }
        info!(x, y, "transform finished");

        let goal = NavigationGoal::planar(self.frame.clone(), x, y);
        self.phase = Phase::Navigating;
        self.tracker.submit(&goal, &mut self.completion);

        if cancel_requested && self.tracker.has_cancel_timeout() {
            if let Err(e) = self.tracker.cancel() {
                error!(error = %e, "could not cancel goal submitted after cancel");
            }
        }
    }
}

impl MissionState for GpsNavigationState {
    fn set_completion_callback(&mut self, callback: CompletionCallback) {
        self.completion.arm(callback);
    }

    fn enter(&mut self) -> MissionResult<()> {
        if !self.completion.is_armed() {
            return Err(MissionError::CallbackNotSet {
                description: self.description(),
            });
        }
        info!(description = %self.description(), "entering state");
        info!(service = %self.service, lat = self.lat, lon = self.lon, "translating gps to utm");

        let request = GpsToUtmRequest::new(self.lat, self.lon);
        match self.transform.gps_to_utm(&self.service, &request) {
            Ok(request) => {
                self.phase = Phase::Transforming {
                    request,
                    cancel_requested: false,
                };
            }
            Err(e) => {
                error!(service = %self.service, error = %e, "transform request failed");
                self.phase = Phase::Finished;
                self.completion.fire(MissionStatus::Aborted);
            }
        }
        Ok(())
    }

    fn cancel(&mut self) -> MissionResult<()> {
        info!(description = %self.description(), "cancelling state");

        match self.phase {
            Phase::Idle | Phase::Finished => {
                debug!("state not active, cancel ignored");
                Ok(())
            }
            Phase::Transforming { request, .. } => match self.pending_transform {
                PendingTransformPolicy::Suppress => {
                    info!(%request, "cancelled before goal submission, goal suppressed");
                    self.phase = Phase::Finished;
                    self.completion.fire(MissionStatus::Preempted);
                    Ok(())
                }
                PendingTransformPolicy::Submit => {
                    self.phase = Phase::Transforming {
                        request,
                        cancel_requested: true,
                    };
                    self.channel.cancel(self.tracker.server())
                }
            },
            Phase::Navigating => self.tracker.cancel(),
        }
    }

    fn description(&self) -> String {
        format!("Move to gps coordinate ({}, {})", self.lat, self.lon)
    }

    fn handle_event(&mut self, event: &BusEvent) {
        match (self.phase, event) {
            (Phase::Transforming { request, .. }, BusEvent::TransformResponse { request_id, response })
                if request == *request_id =>
            {
                self.on_transform(response.utm_coord.x, response.utm_coord.y);
            }
            (Phase::Transforming { request, .. }, BusEvent::TransformFailed { request_id, reason })
                if request == *request_id =>
            {
                error!(%request, reason = %reason, "transform failed");
                self.phase = Phase::Finished;
                self.completion.fire(MissionStatus::Aborted);
            }
            (Phase::Navigating, _) => {
                self.tracker.handle_event(event, &mut self.completion);
            }
            _ => {}
        }
    }
}
