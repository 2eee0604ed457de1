//! Request and response models for the planner.

use serde::{Deserialize, Serialize};

use crate::geometry::GeoPoint;
use crate::planner::SearchStats;

/// Which cost the search minimises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationPriority {
    /// Shortest ground track
    #[default]
    Distance,
    /// Shortest flight time (wind-adjusted when a wind provider is set)
    Time,
}

impl std::fmt::Display for OptimizationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizationPriority::Distance => write!(f, "distance"),
            OptimizationPriority::Time => write!(f, "time"),
        }
    }
}

impl std::str::FromStr for OptimizationPriority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "distance" | "0" => Ok(OptimizationPriority::Distance),
            "time" | "1" => Ok(OptimizationPriority::Time),
            other => Err(format!("unknown optimization priority '{other}'")),
        }
    }
}

/// A planning request in geographic coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    /// True airspeed in knots, constant along the route
    pub cruise_speed_kts: f64,
    /// Cruise altitude in feet; carried through to the result, not used by the planar search
    #[serde(default)]
    pub altitude_ft: f64,
    /// Obstacle polygons as [lat, lon] rings, clockwise once projected
    #[serde(default)]
    pub obstacles: Vec<Vec<[f64; 2]>>,
    /// Overrides the planner's configured priority when set
    #[serde(default)]
    pub priority: Option<OptimizationPriority>,
}

/// The selected route in geographic coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedRoute {
    pub waypoints: Vec<GeoPoint>,
    pub distance_nm: f64,
    pub time_hr: f64,
    pub altitude_ft: f64,
    pub cruise_speed_kts: f64,
    pub priority: OptimizationPriority,
    pub stats: SearchStats,
}
