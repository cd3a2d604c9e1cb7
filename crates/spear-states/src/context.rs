//! Shared handles every channel-backed state needs.

use std::sync::Arc;

use spear_config::MissionConfig;
use spear_core::traits::{ActionChannel, Scheduler, TransformClient};

/// External capabilities plus configuration, cloned into each state.
#[derive(Clone)]
pub struct StateContext {
    pub channel: Arc<dyn ActionChannel>,
    pub transform: Arc<dyn TransformClient>,
    pub scheduler: Arc<dyn Scheduler>,
    pub config: Arc<MissionConfig>,
}

impl StateContext {
    pub fn new(
        channel: Arc<dyn ActionChannel>,
        transform: Arc<dyn TransformClient>,
        scheduler: Arc<dyn Scheduler>,
        config: MissionConfig,
    ) -> Self {
        Self {
            channel,
            transform,
            scheduler,
            config: Arc::new(config),
        }
    }
}
