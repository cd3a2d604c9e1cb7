//! # spear-states
//!
//! Concrete mission states and the factory that builds them from plan steps.
//!
//! | Action tag            | State                  | Talks to                      |
//! |-----------------------|------------------------|-------------------------------|
//! | `MoveToRelativeCoord` | [`RemoteActionState`]  | action channel                |
//! | `MoveToGpsCoord`      | [`GpsNavigationState`] | transform client, then channel|
//! | `TakeManualControl`   | [`ManualControlState`] | nothing                       |
//! | anything else         | [`PlaceholderState`]   | scheduler                     |
//!
//! All of them implement [`spear_core::traits::MissionState`].

pub mod context;
pub mod factory;
pub mod gps_navigation;
pub mod manual_control;
pub mod parse;
pub mod placeholder;
pub mod remote_action;

mod goal;

#[cfg(test)]
pub(crate) mod testing;

pub use context::StateContext;
pub use factory::MissionStateFactory;
pub use gps_navigation::GpsNavigationState;
pub use manual_control::ManualControlState;
pub use placeholder::PlaceholderState;
pub use remote_action::RemoteActionState;
