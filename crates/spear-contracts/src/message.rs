//! Message shapes exchanged with the action server and transform service.
//!
//! Field names follow the bus convention (`target_pose`, `frame_id`,
//! `goal_id`, ...) so the serialized JSON is what the transport expects.
//! The transport itself is not modelled here.

use serde::{Deserialize, Serialize};

/// A point or vector in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    /// A point on the ground plane (`z = 0`).
    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// An orientation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// The "no rotation" orientation.
    pub fn identity() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    /// Reference frame the pose is expressed in (e.g. "base_link", "utm").
    pub frame_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseStamped {
    pub header: Header,
    pub pose: Pose,
}

/// The goal payload submitted to the navigation action server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NavigationGoal {
    pub target_pose: PoseStamped,
}

impl NavigationGoal {
    /// A goal at `(x, y)` in `frame_id` with identity orientation.
    pub fn planar(frame_id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            target_pose: PoseStamped {
                header: Header { frame_id: frame_id.into() },
                pose: Pose {
                    position: Point::planar(x, y),
                    orientation: Quaternion::identity(),
                },
            },
        }
    }

    pub fn frame_id(&self) -> &str {
        &self.target_pose.header.frame_id
    }

    pub fn position(&self) -> Point {
        self.target_pose.pose.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoalIdMessage {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoalStatusMessage {
    pub goal_id: GoalIdMessage,
    /// Raw status code (see `GoalStatus`).
    pub status: i32,
}

/// One message on an action server's result stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoalResultMessage {
    pub status: GoalStatusMessage,
}

impl GoalResultMessage {
    pub fn new(goal_id: impl Into<String>, status: i32) -> Self {
        Self {
            status: GoalStatusMessage {
                goal_id: GoalIdMessage { id: goal_id.into() },
                status,
            },
        }
    }

    pub fn goal_id(&self) -> &str {
        &self.status.goal_id.id
    }

    pub fn status_code(&self) -> i32 {
        self.status.status
    }
}

/// Request to convert a geographic coordinate (`x = lat`, `y = lon`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsToUtmRequest {
    pub gps_coord: Point,
}

impl GpsToUtmRequest {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { gps_coord: Point::planar(lat, lon) }
    }

    pub fn lat(&self) -> f64 {
        self.gps_coord.x
    }

    pub fn lon(&self) -> f64 {
        self.gps_coord.y
    }
}

/// Local planar coordinate returned by the transform service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsToUtmResponse {
    pub utm_coord: Point,
}
