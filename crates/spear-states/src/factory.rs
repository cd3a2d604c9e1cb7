//! Builds mission states from `(action tag, parameters)` pairs.
//!
//! [`MissionStateFactory::build`] never fails: malformed coordinates become
//! `NaN` and an unrecognised tag degrades to a [`PlaceholderState`] with a
//! single warning. [`MissionStateFactory::try_build`] rejects malformed
//! coordinates up front. Which one the [`StateFactory`] impl uses is decided
//! by `parameters.strict`.

use tracing::{debug, warn};

use spear_contracts::{
    error::MissionResult,
    message::NavigationGoal,
    step::{ActionTag, MissionStep},
};
use spear_core::traits::{MissionState, StateFactory};

use crate::context::StateContext;
use crate::gps_navigation::GpsNavigationState;
use crate::manual_control::ManualControlState;
use crate::parse::{lenient_pair, raw_pair, strict_pair};
use crate::placeholder::PlaceholderState;
use crate::remote_action::RemoteActionState;

pub struct MissionStateFactory {
    ctx: StateContext,
}

impl MissionStateFactory {
    pub fn new(ctx: StateContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &StateContext {
        &self.ctx
    }

    /// Build a state for `action`, whatever it is.
    pub fn build(&self, action: &str, parameters: &str) -> Box<dyn MissionState> {
        match ActionTag::parse(action) {
            ActionTag::MoveToRelativeCoord => {
                let (x, y) = lenient_pair(parameters);
                Box::new(self.relative_state(x, y, relative_description(parameters)))
            }
            ActionTag::MoveToGpsCoord => {
                let (lat, lon) = lenient_pair(parameters);
                Box::new(self.gps_coord_state(lat, lon))
            }
            ActionTag::TakeManualControl => Box::new(ManualControlState::new()),
            ActionTag::Unknown(tag) => {
                warn!(action = %tag, parameters, "unrecognized action, building placeholder state");
                Box::new(self.placeholder_state(&tag, parameters))
            }
        }
    }

    /// Like [`build`](Self::build), but coordinate actions must carry exactly
    /// two finite numbers.
    pub fn try_build(&self, action: &str, parameters: &str) -> MissionResult<Box<dyn MissionState>> {
        match ActionTag::parse(action) {
            ActionTag::MoveToRelativeCoord => {
                let (x, y) = strict_pair(action, parameters)?;
                Ok(Box::new(self.relative_state(x, y, relative_description(parameters))))
            }
            ActionTag::MoveToGpsCoord => {
                let (lat, lon) = strict_pair(action, parameters)?;
                Ok(Box::new(self.gps_coord_state(lat, lon)))
            }
            _ => Ok(self.build(action, parameters)),
        }
    }

    pub fn relative_coord_state(&self, x: f64, y: f64) -> RemoteActionState {
        self.relative_state(x, y, format!("Move to relative coordinate ({}, {})", x, y))
    }

    fn relative_state(&self, x: f64, y: f64, description: String) -> RemoteActionState {
        let config = &self.ctx.config;
        let goal = NavigationGoal::planar(config.navigation.relative_frame.clone(), x, y);
        RemoteActionState::new(
            config.navigation.server.clone(),
            goal,
            description,
            self.ctx.channel.clone(),
            self.ctx.scheduler.clone(),
            config.cancellation.timeout(),
        )
    }

    pub fn gps_coord_state(&self, lat: f64, lon: f64) -> GpsNavigationState {
        GpsNavigationState::new(lat, lon, &self.ctx)
    }

    pub fn placeholder_state(&self, action: &str, parameters: &str) -> PlaceholderState {
        PlaceholderState::new(
            action,
            parameters,
            self.ctx.config.placeholder.delay(),
            self.ctx.scheduler.clone(),
        )
    }
}

/// Echoes the coordinates as written in the plan.
fn relative_description(parameters: &str) -> String {
    let (x, y) = raw_pair(parameters);
    format!("Move to relative coordinate ({}, {})", x, y)
}

impl StateFactory for MissionStateFactory {
    fn build_state(&self, step: &MissionStep) -> MissionResult<Box<dyn MissionState>> {
        debug!(action = %step.action, parameters = %step.parameters, "building state");
        if self.ctx.config.parameters.strict {
            self.try_build(&step.action, &step.parameters)
        } else {
            Ok(self.build(&step.action, &step.parameters))
        }
    }
}
