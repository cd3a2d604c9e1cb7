//! # spear-sim
//!
//! A deterministic stand-in for the robot side of a mission.
//!
//! [`SimBus`] implements all three external capabilities a mission state
//! needs (`ActionChannel`, `TransformClient`, `Scheduler`) on top of a single
//! virtual millisecond clock. Nothing happens until the caller pulls the next
//! event with [`SimBus::next_event`], which advances the clock to that
//! event's due time. Events due at the same instant come out in the order
//! they were scheduled.
//!
//! Goal outcomes are scripted per server with [`GoalScript`]; the transform
//! service runs a real WGS84 to UTM projection from [`geo`]. [`run_mission`]
//! pumps bus events into a `MissionSequencer` until the mission finishes.

pub mod bus;
pub mod geo;
pub mod runner;
pub mod script;

pub use bus::{SimBus, Submission};
pub use runner::{run_mission, MissionReport};
pub use script::{GoalScript, SimSettings};
