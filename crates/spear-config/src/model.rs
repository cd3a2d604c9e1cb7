//! Configuration schema.
//!
//! Example:
//! ```toml
//! [navigation]
//! server = "move_base"
//! relative_frame = "base_link"
//! gps_frame = "utm"
//!
//! [placeholder]
//! delay_ms = 1000
//!
//! [cancellation]
//! timeout_ms = 5000
//! pending_transform = "suppress"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration. Every table is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub navigation: NavigationConfig,
    pub transform: TransformConfig,
    pub placeholder: PlaceholderConfig,
    pub cancellation: CancellationConfig,
    pub parameters: ParameterConfig,
}

/// The navigation action server and the frames goals are expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Action server name; results arrive on `<server>/result`.
    pub server: String,
    /// Frame for `MoveToRelativeCoord` goals.
    pub relative_frame: String,
    /// Frame for goals built from a GPS transform.
    pub gps_frame: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            server: "move_base".to_string(),
            relative_frame: "base_link".to_string(),
            gps_frame: "utm".to_string(),
        }
    }
}

/// The GPS to UTM conversion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Service name passed with every `gps_to_utm` request.
    pub service: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            service: "gps_to_utm".to_string(),
        }
    }
}

/// Timing of the stand-in state used for unrecognised actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub delay_ms: u64,
}

impl PlaceholderConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self { delay_ms: 1000 }
    }
}

/// What a GPS state does when cancelled before its transform has resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PendingTransformPolicy {
    /// Report `Preempted` at once and never submit a goal.
    #[default]
    Suppress,
    /// Forward the cancel and still submit once the transform resolves.
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CancellationConfig {
    /// If set, a cancelled channel-backed state reports `Preempted` when the
    /// channel stays silent for this long. Unset means wait indefinitely.
    pub timeout_ms: Option<u64>,
    pub pending_transform: PendingTransformPolicy,
}

impl CancellationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Coordinate parameter parsing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterConfig {
    /// Reject malformed coordinates instead of passing NaN downstream.
    pub strict: bool,
}
