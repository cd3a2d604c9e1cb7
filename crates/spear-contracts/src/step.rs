//! Mission steps and plans.
//!
//! A mission plan is an ordered list of `MissionStep`s. Each step names an
//! action tag and carries a free-form parameter string whose layout depends
//! on the tag.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MissionError, MissionResult};

/// The closed set of actions the factory knows how to build.
///
/// Anything else is carried verbatim in `Unknown` so a plan that references
/// a not-yet-implemented action still produces a usable state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionTag {
    MoveToRelativeCoord,
    MoveToGpsCoord,
    TakeManualControl,
    Unknown(String),
}

impl ActionTag {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "MoveToRelativeCoord" => ActionTag::MoveToRelativeCoord,
            "MoveToGpsCoord" => ActionTag::MoveToGpsCoord,
            "TakeManualControl" => ActionTag::TakeManualControl,
            other => ActionTag::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActionTag::MoveToRelativeCoord => "MoveToRelativeCoord",
            ActionTag::MoveToGpsCoord => "MoveToGpsCoord",
            ActionTag::TakeManualControl => "TakeManualControl",
            ActionTag::Unknown(tag) => tag,
        }
    }
}

impl From<&str> for ActionTag {
    fn from(tag: &str) -> Self {
        Self::parse(tag)
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a mission plan: `(action tag, parameter string)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionStep {
    pub action: String,
    #[serde(default)]
    pub parameters: String,
}

impl MissionStep {
    pub fn new(action: impl Into<String>, parameters: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            parameters: parameters.into(),
        }
    }

    pub fn tag(&self) -> ActionTag {
        ActionTag::parse(&self.action)
    }
}

/// An ordered mission plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MissionPlan {
    pub steps: Vec<MissionStep>,
}

impl MissionPlan {
    /// Parse the line-oriented plan format.
    ///
    /// ```text
    /// # survey the north field
    /// MoveToGpsCoord 49.2606 -123.2460
    /// MoveToRelativeCoord 1.5 -2.0
    /// TakeManualControl
    /// ```
    ///
    /// The first whitespace-delimited token is the action tag; the trimmed
    /// remainder of the line is the parameter string. Blank lines and lines
    /// starting with `#` are skipped. A plan with no steps is rejected.
    pub fn parse(text: &str) -> MissionResult<Self> {
        let mut steps = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (action, parameters) = match line.split_once(char::is_whitespace) {
                Some((action, rest)) => (action, rest.trim()),
                None => (line, ""),
            };
            steps.push(MissionStep::new(action, parameters));
        }

        if steps.is_empty() {
            return Err(MissionError::PlanError {
                line: 0,
                reason: "plan contains no steps".to_string(),
            });
        }

        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
