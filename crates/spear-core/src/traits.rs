//! Core trait definitions for the mission state layer.
//!
//! - `MissionState`    - one unit of mission work (navigate, hand off, ...)
//! - `ActionChannel`   - goal submission and cancellation on a named server
//! - `TransformClient` - GPS to local planar coordinate service
//! - `Scheduler`       - timers, so delays can be simulated in tests
//! - `StateFactory`    - turns a plan step into a `MissionState`
//!
//! Everything runs on a single control thread. Asynchronous replies reach a
//! state as `BusEvent`s through `MissionState::handle_event`.

use std::time::Duration;

use spear_contracts::{
    error::MissionResult,
    event::{BusEvent, RequestId, TimerId},
    message::{GpsToUtmRequest, NavigationGoal},
    status::MissionStatus,
    step::MissionStep,
};

use crate::channel::GoalHandle;

/// The function a state calls once with its terminal status.
pub type CompletionCallback = Box<dyn FnOnce(MissionStatus) + Send>;

/// A single, cancellable unit of mission work.
///
/// There are no default implementations: every variant decides for itself
/// how to enter, cancel, and react to bus events.
///
/// Lifecycle: built idle → `set_completion_callback` → `enter` → exactly one
/// completion → retired. The sequencer drops a state once it has completed.
pub trait MissionState: Send {
    /// Register the function invoked with the terminal status.
    ///
    /// Must be called before `enter()`.
    fn set_completion_callback(&mut self, callback: CompletionCallback);

    /// Begin the operation.
    ///
    /// Returns `MissionError::CallbackNotSet` if no callback is registered.
    /// Called once per instance; a second call is not guarded.
    fn enter(&mut self) -> MissionResult<()>;

    /// Request early termination.
    ///
    /// Safe at any time, including after completion, where it does nothing.
    /// Channel-backed states only forward the request; their terminal status
    /// arrives later through `handle_event`.
    fn cancel(&mut self) -> MissionResult<()>;

    /// Human-readable description, available before and after entering.
    fn description(&self) -> String;

    /// Deliver an asynchronous event from the bus.
    ///
    /// Events that do not belong to this state are ignored.
    fn handle_event(&mut self, event: &BusEvent);
}

/// Client side of a goal-based action server.
pub trait ActionChannel: Send + Sync {
    /// Submit `goal` to `server` and return a handle for the new goal.
    ///
    /// Every call issues a fresh goal identity.
    fn send_goal(&self, server: &str, goal: &NavigationGoal) -> MissionResult<GoalHandle>;

    /// Ask `server` to cancel its goals. Fire-and-forget: no acknowledgement.
    fn cancel(&self, server: &str) -> MissionResult<()>;
}

/// Client for the GPS to UTM conversion service.
///
/// Single request, single response, addressed to a named service. The response arrives as
/// `BusEvent::TransformResponse` (or `TransformFailed`) carrying the returned
/// `RequestId`. There is no way to cancel a request.
pub trait TransformClient: Send + Sync {
    fn gps_to_utm(&self, service: &str, request: &GpsToUtmRequest) -> MissionResult<RequestId>;
}

/// Timer service.
///
/// Expiry arrives as `BusEvent::TimerFired` on a later turn of the event
/// loop, never synchronously inside `schedule`, even for a zero delay.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration) -> MissionResult<TimerId>;

    /// Disarm a timer. Unknown or already-fired timers are ignored.
    fn cancel(&self, timer: TimerId);
}

/// Builds the state for one plan step.
pub trait StateFactory: Send + Sync {
    fn build_state(&self, step: &MissionStep) -> MissionResult<Box<dyn MissionState>>;
}
