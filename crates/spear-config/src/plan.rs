//! Mission plan loading.
//!
//! Two formats are accepted:
//!
//! - the line format understood by `MissionPlan::parse`
//! - TOML, selected by a `.toml` extension:
//!
//! ```toml
//! [[steps]]
//! action = "MoveToGpsCoord"
//! parameters = "49.2606 -123.2460"
//! ```

use std::path::Path;

use tracing::debug;

use spear_contracts::{
    error::{MissionError, MissionResult},
    step::MissionPlan,
};

/// Parse a TOML plan document.
pub fn plan_from_toml_str(s: &str) -> MissionResult<MissionPlan> {
    let plan: MissionPlan = toml::from_str(s).map_err(|e| MissionError::PlanError {
        line: 0,
        reason: format!("failed to parse plan TOML: {}", e),
    })?;
    if plan.is_empty() {
        return Err(MissionError::PlanError {
            line: 0,
            reason: "plan contains no steps".to_string(),
        });
    }
    Ok(plan)
}

/// Load a plan from `path`, choosing the format by extension.
pub fn load_plan(path: &Path) -> MissionResult<MissionPlan> {
    let contents = std::fs::read_to_string(path).map_err(|e| MissionError::PlanError {
        line: 0,
        reason: format!("failed to read plan '{}': {}", path.display(), e),
    })?;

    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let plan = if is_toml {
        plan_from_toml_str(&contents)?
    } else {
        MissionPlan::parse(&contents)?
    };

    debug!(path = %path.display(), steps = plan.len(), "mission plan loaded");
    Ok(plan)
}
