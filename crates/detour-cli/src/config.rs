//! Planner configuration from environment.

use std::env;

use detour_core::{OptimizationPriority, PlannerConfig};

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub waypoint_spacing_nm: f64,
    pub max_open_routes: usize,
    pub priority: OptimizationPriority,
    pub wind_margin: f64,
}

impl Default for CliConfig {
    fn default() -> Self {
        let planner = PlannerConfig::default();
        Self {
            waypoint_spacing_nm: planner.waypoint_spacing_nm,
            max_open_routes: planner.max_open_routes,
            priority: planner.priority,
            wind_margin: planner.wind_margin,
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            waypoint_spacing_nm: lookup("DETOUR_WAYPOINT_SPACING_NM")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.waypoint_spacing_nm),
            max_open_routes: lookup("DETOUR_MAX_OPEN_ROUTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_open_routes),
            priority: lookup("DETOUR_PRIORITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.priority),
            wind_margin: lookup("DETOUR_WIND_MARGIN")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.wind_margin),
        }
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            waypoint_spacing_nm: self.waypoint_spacing_nm,
            max_open_routes: self.max_open_routes,
            priority: self.priority,
            wind_margin: self.wind_margin,
        }
    }
}
