//! Human-readable plan summaries and feasibility checks.

use std::fmt::Write;

use detour_core::{GeoPoint, LocalFrame, Obstacle, PlanRequest, PlannedRoute, Position};

pub fn render_summary(planned: &PlannedRoute) -> String {
    let mut out = String::new();
    let stats = &planned.stats;
    let _ = writeln!(
        out,
        "Route: {} waypoints | distance={:.2}NM time={:.3}h priority={}",
        planned.waypoints.len(),
        planned.distance_nm,
        planned.time_hr,
        planned.priority
    );
    let _ = writeln!(
        out,
        "Search: expanded={} branched={} fathomed={} blocked={} incumbents={} peak_open={}",
        stats.expanded,
        stats.branched,
        stats.fathomed,
        stats.blocked,
        stats.incumbent_updates,
        stats.peak_open_routes
    );
    for (idx, wp) in planned.waypoints.iter().enumerate() {
        let _ = writeln!(out, "  {:>3}  {:>10.5} {:>11.5}", idx, wp.lat, wp.lon);
    }
    out
}

/// Straight-line distance between the request endpoints on the local plane.
pub fn direct_distance_nm(request: &PlanRequest) -> f64 {
    let frame = LocalFrame::centered(request.origin, request.destination);
    frame
        .project(request.origin)
        .distance_to(frame.project(request.destination))
}

/// One message per request obstacle the planned route still crosses.
///
/// Obstacles that cannot be built are ignored, matching the planner.
pub fn find_obstacle_violations(request: &PlanRequest, planned: &PlannedRoute) -> Vec<String> {
    let frame = LocalFrame::centered(request.origin, request.destination);
    let route: Vec<Position> = planned.waypoints.iter().map(|wp| frame.project(*wp)).collect();

    let mut violations = Vec::new();
    for (idx, ring) in request.obstacles.iter().enumerate() {
        let vertices = ring
            .iter()
            .map(|[lat, lon]| frame.project(GeoPoint::new(*lat, *lon)))
            .collect();
        let Ok(obstacle) = Obstacle::new(vertices) else {
            continue;
        };
        let hits = obstacle.intersect_route(&route);
        if !hits.is_empty() {
            violations.push(format!(
                "obstacle {} crossed on leg {}",
                idx, hits[0].route_segment
            ));
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{create_clear_scenario, create_single_square_scenario, DEFAULT_CENTER};
    use detour_core::Planner;

    #[test]
    fn summary_lists_every_waypoint() {
        let scenario = create_single_square_scenario(DEFAULT_CENTER);
        let planned = Planner::default().plan(&scenario.request).unwrap();
        let summary = render_summary(&planned);
        assert!(summary.starts_with("Route: 4 waypoints"));
        assert_eq!(summary.lines().count(), 2 + planned.waypoints.len());
    }

    #[test]
    fn straight_line_through_obstacle_is_flagged() {
        let scenario = create_single_square_scenario(DEFAULT_CENTER);
        // Same endpoints, but planned without the square in the way.
        let straight = Planner::default()
            .plan(&create_clear_scenario(DEFAULT_CENTER).request)
            .unwrap();
        let violations = find_obstacle_violations(&scenario.request, &straight);
        assert_eq!(violations.len(), 1, "{violations:?}");

        let planned = Planner::default().plan(&scenario.request).unwrap();
        assert!(find_obstacle_violations(&scenario.request, &planned).is_empty());
        assert!(planned.distance_nm > direct_distance_nm(&scenario.request));
    }
}
