//! # spear-config
//!
//! TOML configuration for the SPEAR mission runtime.
//!
//! ## Overview
//!
//! [`MissionConfig`] names the remote endpoints the mission states talk to
//! (navigation action server, GPS transform service), the placeholder delay,
//! and the cancellation and parameter-parsing policies. Every field has a
//! default, so an empty document is a valid configuration.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use spear_config::MissionConfig;
//!
//! let config = MissionConfig::from_file(Path::new("config/mission.toml"))?;
//! ```
//!
//! [`plan`] loads mission plans, either the line format or TOML.

pub mod loader;
pub mod model;
pub mod plan;

pub use model::{
    CancellationConfig, MissionConfig, NavigationConfig, ParameterConfig, PendingTransformPolicy,
    PlaceholderConfig, TransformConfig,
};

// ── Tests ─────────────────────────────────────────────────────────────────────
