//! Candidate routes and their repair after a detour is spliced in.

use serde::{Deserialize, Serialize};

use crate::geometry::{build_straight_route, path_length, Position, GEOMETRY_EPS_NM};
use crate::models::OptimizationPriority;
use crate::obstacle::Obstacle;
use crate::wind::{ground_speed, WindField};

/// An ordered waypoint sequence from origin to destination with its cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: Vec<Position>,
    /// Total length in nautical miles
    pub distance: f64,
    /// Total time in hours
    pub time: f64,
    /// Cost increase over the parent route, used as the search priority
    pub deviation: f64,
}

impl Route {
    /// Straight route from `origin` to `destination` with waypoints every `spacing_nm` on average.
    pub fn direct(origin: Position, destination: Position, spacing_nm: f64) -> Self {
        Self::from_waypoints(build_straight_route(origin, destination, spacing_nm))
    }

    /// Route through the given waypoints with distance filled in and no time yet.
    pub fn from_waypoints(waypoints: Vec<Position>) -> Self {
        let distance = path_length(&waypoints);
        Self {
            waypoints,
            distance,
            time: 0.0,
            deviation: 0.0,
        }
    }

    pub fn origin(&self) -> Option<Position> {
        self.waypoints.first().copied()
    }

    pub fn destination(&self) -> Option<Position> {
        self.waypoints.last().copied()
    }

    /// Consecutive waypoint pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.waypoints.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Cost under the given priority.
    pub fn cost(&self, priority: OptimizationPriority) -> f64 {
        match priority {
            OptimizationPriority::Distance => self.distance,
            OptimizationPriority::Time => self.time,
        }
    }

    /// No leg crosses an obstacle edge or passes through an obstacle interior.
    pub fn is_clear_of(&self, obstacles: &[Obstacle]) -> bool {
        self.segments()
            .all(|(start, end)| shortcut_is_clear(obstacles, start, end))
    }

    /// Remove intermediate waypoints that sit inside (or on an edge of) any obstacle.
    pub fn clean(&mut self, obstacles: &[Obstacle]) {
        self.strip_interior(obstacles, 0);
    }

    /// Splice `detour` in directly after waypoint `index`.
    ///
    /// The destination always stays last; an index past it is clamped.
    pub fn insert(&mut self, index: usize, detour: &[Position]) {
        if self.waypoints.is_empty() {
            return;
        }
        let at = (index + 1).min(self.waypoints.len() - 1);
        self.waypoints.splice(at..at, detour.iter().copied());
    }

    /// Repair the route around a freshly spliced detour.
    ///
    /// `last` is the index of the first waypoint after the detour. Interior
    /// waypoints are stripped everywhere; then, walking back from the detour
    /// exit towards the origin until a pass changes nothing, any waypoint
    /// whose neighbours can be joined without crossing an obstacle is
    /// dropped; finally waypoints after the exit are dropped while the exit
    /// can see past them. Origin and destination are never removed.
    pub fn backward_cleanup(&mut self, obstacles: &[Obstacle], last: usize) {
        let mut last = last.min(self.waypoints.len().saturating_sub(1));
        last -= self.strip_interior(obstacles, last);

        // Dropping a waypoint can open a shortcut for the one after it.
        loop {
            let mut removed = false;
            let mut idx = last.saturating_sub(1);
            while idx >= 1 {
                if idx + 1 < self.waypoints.len()
                    && shortcut_is_clear(obstacles, self.waypoints[idx - 1], self.waypoints[idx + 1])
                {
                    self.waypoints.remove(idx);
                    last -= 1;
                    removed = true;
                }
                idx -= 1;
            }
            if !removed {
                break;
            }
        }

        let exit = last.saturating_sub(1);
        while exit + 2 < self.waypoints.len()
            && shortcut_is_clear(obstacles, self.waypoints[exit], self.waypoints[exit + 2])
        {
            self.waypoints.remove(exit + 1);
        }

        self.waypoints.dedup_by(|next, prev| next.approx_eq(*prev));
    }

    /// Strip interior waypoints, returning how many sat before index `last`.
    fn strip_interior(&mut self, obstacles: &[Obstacle], last: usize) -> usize {
        let end = self.waypoints.len().saturating_sub(1);
        let mut interior = std::collections::BTreeSet::new();
        for obstacle in obstacles {
            interior.extend(
                obstacle
                    .points_inside(&self.waypoints)
                    .into_iter()
                    .filter(|idx| *idx != 0 && *idx != end),
            );
        }
        let shifted = interior.iter().filter(|idx| **idx < last).count();
        // Highest index first so earlier indices stay valid.
        for idx in interior.into_iter().rev() {
            self.waypoints.remove(idx);
        }
        shifted
    }

    /// Recompute distance and time.
    ///
    /// Each leg's ground speed is the airspeed plus the wind component along
    /// the leg, sampled at the leg midpoint. A leg that cannot make headway
    /// takes forever.
    pub fn recompute_cost(&mut self, airspeed_kts: f64, wind: Option<&dyn WindField>) {
        let mut distance = 0.0;
        let mut time = 0.0;
        for (start, end) in self.segments() {
            let leg = end - start;
            let length = leg.length();
            if length <= GEOMETRY_EPS_NM {
                continue;
            }
            distance += length;
            let speed = match (wind, leg.unit()) {
                (Some(field), Some(heading)) => {
                    ground_speed(airspeed_kts, heading, field.wind_at(start.midpoint(end)))
                }
                _ => airspeed_kts,
            };
            time += if speed > GEOMETRY_EPS_NM {
                length / speed
            } else {
                f64::INFINITY
            };
        }
        self.distance = distance;
        self.time = time;
    }

    /// Cost increase of this route over `parent` under `priority`.
    pub fn deviation_relative_to(&self, parent: &Route, priority: OptimizationPriority) -> f64 {
        self.cost(priority) - parent.cost(priority)
    }
}

fn shortcut_is_clear(obstacles: &[Obstacle], a: Position, b: Position) -> bool {
    !obstacles.iter().any(|obstacle| obstacle.blocks_segment(a, b))
}
