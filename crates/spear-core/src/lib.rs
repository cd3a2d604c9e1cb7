//! # spear-core
//!
//! The mission state abstraction for the SPEAR rover runtime.
//!
//! This crate provides:
//! - The capability traits (`MissionState`, `ActionChannel`, `TransformClient`,
//!   `Scheduler`, `StateFactory`)
//! - `Completion`, the one-shot slot every state reports through
//! - `GoalHandle`, a submitted goal that recognises its own result messages
//! - `MissionSequencer`, which plays a plan one state at a time
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spear_core::{MissionSequencer, traits::{ActionChannel, MissionState, StateFactory}};
//! ```

pub mod channel;
pub mod completion;
pub mod sequencer;
pub mod traits;

pub use channel::GoalHandle;
pub use completion::Completion;
pub use sequencer::MissionSequencer;
