//! # spear-contracts
//!
//! Shared types, bus message shapes, and error contracts for the SPEAR
//! mission runtime.
//!
//! All crates in the workspace import from here. No mission logic lives in
//! this crate, only data definitions, conversions, and error types.

pub mod error;
pub mod event;
pub mod execution;
pub mod message;
pub mod status;
pub mod step;
