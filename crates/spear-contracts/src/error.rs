//! Runtime error types for the mission state layer.
//!
//! Only contract violations and construction problems are errors. Remote
//! outcomes (timeouts, aborted goals) are not errors here: they travel to the
//! sequencer as a terminal `MissionStatus`.

use thiserror::Error;

/// The unified error type for the SPEAR mission runtime.
#[derive(Debug, Error)]
pub enum MissionError {
    /// A coordinate parameter string could not be parsed in strict mode.
    #[error("invalid parameters for '{tag}' ({parameters:?}): {reason}")]
    InvalidParameters {
        tag: String,
        parameters: String,
        reason: String,
    },

    /// `enter()` was called before a completion callback was registered.
    ///
    /// This is a programming error in the caller and is reported before any
    /// channel is touched.
    #[error("no completion callback registered before entering state '{description}'")]
    CallbackNotSet { description: String },

    /// The action channel refused a submission or cancellation.
    #[error("action channel '{server}' error: {reason}")]
    ChannelError { server: String, reason: String },

    /// The coordinate transform service could not be reached.
    #[error("coordinate transform error: {reason}")]
    TransformError { reason: String },

    /// The scheduler could not arm or disarm a timer.
    #[error("scheduler error: {reason}")]
    SchedulerError { reason: String },

    /// A state or the sequencer was driven outside its lifecycle contract.
    #[error("state machine error: {reason}")]
    StateMachineError { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A mission plan could not be parsed.
    #[error("mission plan error at line {line}: {reason}")]
    PlanError { line: usize, reason: String },
}

/// Convenience alias used throughout the SPEAR crates.
pub type MissionResult<T> = Result<T, MissionError>;
