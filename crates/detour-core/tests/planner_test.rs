//! Search driver integration tests.
//!
//! Run with: cargo test -p detour-core --test planner_test

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use detour_core::{
    BoundingBox, GeoPoint, LocalFrame, Obstacle, OptimizationPriority, PlanError, PlanRequest,
    Planner, PlannerConfig, Position, Route, SearchEvent, SearchObserver, WindField,
};

fn p(x: f64, y: f64) -> Position {
    Position::new(x, y)
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Obstacle {
    Obstacle::new(vec![p(x0, y0), p(x0, y1), p(x1, y1), p(x1, y0)]).unwrap()
}

fn intersections(route: &Route, obstacles: &[Obstacle]) -> usize {
    obstacles
        .iter()
        .map(|obstacle| obstacle.intersect_route(&route.waypoints).len())
        .sum()
}

/// Keeps an owned copy of what the search reported.
#[derive(Default)]
struct Recorder {
    direct: Option<Route>,
    branches: Vec<(usize, Route, Route)>,
    max_open_after_select: usize,
    incumbents: usize,
}

impl SearchObserver for Recorder {
    fn on_event(&mut self, event: &SearchEvent<'_>) {
        match event {
            SearchEvent::Started { direct } => self.direct = Some((*direct).clone()),
            SearchEvent::Selected { open_routes, .. } => {
                self.max_open_after_select = self.max_open_after_select.max(*open_routes)
            }
            SearchEvent::Branched {
                obstacle,
                left,
                right,
            } => self
                .branches
                .push((*obstacle, (*left).clone(), (*right).clone())),
            SearchEvent::IncumbentUpdated { .. } => self.incumbents += 1,
            _ => {}
        }
    }
}

#[test]
fn test_single_square_scenario() {
    let obstacles = vec![rect(40.0, -10.0, 60.0, 10.0)];
    let outcome = Planner::default()
        .search(p(0.0, 0.0), p(100.0, 0.0), &obstacles, 250.0, &mut ())
        .unwrap();

    let route = &outcome.route;
    assert_eq!(route.waypoints.len(), 4, "two extra waypoints: {:?}", route.waypoints);
    assert_eq!(route.origin(), Some(p(0.0, 0.0)));
    assert_eq!(route.destination(), Some(p(100.0, 0.0)));
    assert!(route.distance > 100.0 && route.distance < 120.0, "distance {}", route.distance);
    let expected = 2.0 * (40.0f64 * 40.0 + 10.0 * 10.0).sqrt() + 20.0;
    assert!((route.distance - expected).abs() < 1e-6);
    assert_eq!(intersections(route, &obstacles), 0);

    // Both bypass vertices sit on the same side of the square.
    let (a, b) = (route.waypoints[1], route.waypoints[2]);
    assert!((a.y - b.y).abs() < 1e-9 && a.y.abs() > 9.9);
}

#[test]
fn test_left_and_right_detours_are_symmetric() {
    let obstacles = vec![rect(40.0, -10.0, 60.0, 10.0)];
    let mut recorder = Recorder::default();
    Planner::default()
        .search(p(0.0, 0.0), p(100.0, 0.0), &obstacles, 250.0, &mut recorder)
        .unwrap();

    let (obstacle, left, right) = &recorder.branches[0];
    assert_eq!(*obstacle, 0);
    assert!((left.distance - right.distance).abs() < 1e-9);
    assert!((left.time - right.time).abs() < 1e-9);
    assert_eq!(left.waypoints.len(), right.waypoints.len());
    // Mirror images across the direct line.
    for (l, r) in left.waypoints.iter().zip(&right.waypoints) {
        assert!((l.x - r.x).abs() < 1e-9 && (l.y + r.y).abs() < 1e-9);
    }
}

#[test]
fn test_detours_never_shorten_the_direct_route() {
    let obstacles = vec![rect(40.0, -10.0, 60.0, 10.0), rect(20.0, -30.0, 30.0, -20.0)];
    let mut recorder = Recorder::default();
    Planner::default()
        .search(p(0.0, 0.0), p(100.0, 0.0), &obstacles, 250.0, &mut recorder)
        .unwrap();

    let direct = recorder.direct.expect("search reports the direct route");
    let (_, left, right) = &recorder.branches[0];
    for child in [left, right] {
        assert!(child.distance > direct.distance);
        assert!(child.deviation > 0.0);
    }
}

#[test]
fn test_first_detours_are_longer_for_random_squares() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let cx = rng.random_range(30.0..70.0);
        let cy = rng.random_range(-2.0..2.0);
        let half = rng.random_range(3.0..15.0);
        let obstacles = vec![rect(cx - half, cy - half, cx + half, cy + half)];

        let mut recorder = Recorder::default();
        let _ = Planner::default().search(p(0.0, 0.0), p(100.0, 0.0), &obstacles, 250.0, &mut recorder);

        let direct = recorder.direct.as_ref().unwrap();
        let (_, left, right) = &recorder.branches[0];
        assert!(left.distance > direct.distance, "{obstacles:?}");
        assert!(right.distance > direct.distance, "{obstacles:?}");
    }
}

#[test]
fn test_no_obstacles_returns_direct_route() {
    let planner = Planner::default();
    let mut recorder = Recorder::default();
    let outcome = planner
        .search(p(0.0, 0.0), p(100.0, 0.0), &[], 250.0, &mut recorder)
        .unwrap();

    let direct = Route::direct(p(0.0, 0.0), p(100.0, 0.0), planner.config().waypoint_spacing_nm);
    assert_eq!(outcome.route.waypoints, direct.waypoints);
    assert!(recorder.branches.is_empty());
    assert_eq!(recorder.max_open_after_select, 0);
    assert_eq!(outcome.stats.peak_open_routes, 1);
    assert_eq!(outcome.stats.expanded, 1);
    assert_eq!(outcome.stats.incumbent_updates, 1);
}

#[test]
fn test_obstacles_in_series_branch_in_encounter_order() {
    // Listed far-first so index order and encounter order disagree.
    let obstacles = vec![rect(60.0, -5.0, 70.0, 5.0), rect(30.0, -5.0, 40.0, 5.0)];
    let mut recorder = Recorder::default();
    let outcome = Planner::default()
        .search(p(0.0, 0.0), p(100.0, 0.0), &obstacles, 250.0, &mut recorder)
        .unwrap();

    let order: Vec<usize> = recorder.branches.iter().map(|(idx, _, _)| *idx).collect();
    assert_eq!(order[0], 1, "nearer obstacle first: {order:?}");
    assert_eq!(order[1], 0, "far obstacle re-tested after the splice: {order:?}");

    // The first detour clears the near square but still runs into the far one.
    let (_, left, _) = &recorder.branches[0];
    assert!(obstacles[1].intersect_route(&left.waypoints).is_empty());
    assert!(!obstacles[0].intersect_route(&left.waypoints).is_empty());

    assert_eq!(intersections(&outcome.route, &obstacles), 0);
    assert!(outcome.stats.branched >= 2);
}

#[test]
fn test_search_is_deterministic() {
    let obstacles = vec![
        rect(20.0, -15.0, 35.0, 5.0),
        rect(50.0, -5.0, 65.0, 20.0),
        rect(75.0, -12.0, 85.0, 3.0),
    ];
    let planner = Planner::default();
    let first = planner
        .search(p(0.0, 0.0), p(100.0, 0.0), &obstacles, 250.0, &mut ())
        .unwrap();
    let second = planner
        .search(p(0.0, 0.0), p(100.0, 0.0), &obstacles, 250.0, &mut ())
        .unwrap();
    assert_eq!(first.route, second.route);
    assert_eq!(first.stats, second.stats);
    assert_eq!(intersections(&first.route, &obstacles), 0);
}

#[test]
fn test_open_set_cap_raises_no_route_found() {
    let obstacles = vec![rect(40.0, -10.0, 60.0, 10.0)];
    let planner = Planner::new(PlannerConfig {
        max_open_routes: 1,
        ..PlannerConfig::default()
    });
    let err = planner
        .search(p(0.0, 0.0), p(100.0, 0.0), &obstacles, 250.0, &mut ())
        .unwrap_err();
    assert_eq!(err, PlanError::NoRouteFound { cap: 1, expanded: 1 });
}

#[test]
fn test_open_set_never_exceeds_cap() {
    let obstacles = vec![rect(30.0, -5.0, 40.0, 5.0), rect(60.0, -5.0, 70.0, 5.0)];
    let planner = Planner::new(PlannerConfig {
        max_open_routes: 2,
        ..PlannerConfig::default()
    });
    let mut recorder = Recorder::default();
    let err = planner
        .search(p(0.0, 0.0), p(100.0, 0.0), &obstacles, 250.0, &mut recorder)
        .unwrap_err();
    assert_eq!(err, PlanError::NoRouteFound { cap: 2, expanded: 2 });
    assert!(recorder.max_open_after_select < 2);
    assert_eq!(recorder.incumbents, 0);
}

#[test]
fn test_endpoint_inside_obstacle_is_infeasible() {
    let obstacles = vec![rect(40.0, -10.0, 60.0, 10.0)];
    let planner = Planner::default();

    let err = planner
        .search(p(0.0, 0.0), p(50.0, 0.0), &obstacles, 250.0, &mut ())
        .unwrap_err();
    assert_eq!(err, PlanError::NoRouteFound { cap: 500, expanded: 0 });

    // On an edge counts as inside; on a vertex does not.
    let err = planner
        .search(p(40.0, 0.0), p(0.0, 0.0), &obstacles, 250.0, &mut ())
        .unwrap_err();
    assert!(matches!(err, PlanError::NoRouteFound { expanded: 0, .. }));
    let outcome = planner
        .search(p(40.0, 10.0), p(0.0, 30.0), &obstacles, 250.0, &mut ())
        .unwrap();
    assert!(outcome.route.is_clear_of(&obstacles));
}

#[test]
fn test_chord_through_obstacle_is_never_accepted() {
    // Opposite corners: the cleaned direct route is a chord that touches no edge.
    let obstacles = vec![rect(40.0, -10.0, 60.0, 10.0)];
    let mut recorder = Recorder::default();
    let err = Planner::default()
        .search(p(40.0, -10.0), p(60.0, 10.0), &obstacles, 250.0, &mut recorder)
        .unwrap_err();
    assert_eq!(err, PlanError::NoRouteFound { cap: 500, expanded: 1 });
    assert_eq!(recorder.incumbents, 0);
}

#[test]
fn test_time_priority_follows_the_tailwind() {
    let obstacles = vec![rect(40.0, -10.0, 60.0, 10.0)];
    // Tailwind north of the direct line, headwind south of it.
    let planner = Planner::new(PlannerConfig {
        priority: OptimizationPriority::Time,
        ..PlannerConfig::default()
    })
    .with_wind(|_bounds: &BoundingBox| -> Box<dyn WindField> {
        Box::new(|at: Position| {
            if at.y > 0.0 {
                Position::new(40.0, 0.0)
            } else {
                Position::new(-40.0, 0.0)
            }
        })
    });

    let outcome = planner
        .search(p(0.0, 0.0), p(100.0, 0.0), &obstacles, 200.0, &mut ())
        .unwrap();
    let route = &outcome.route;
    assert!(route.waypoints.iter().all(|wp| wp.y > -1e-9), "{:?}", route.waypoints);
    assert!(route.waypoints.iter().any(|wp| wp.y > 9.9));
    assert!(route.time < route.distance / 200.0);
    assert_eq!(intersections(route, &obstacles), 0);
}

#[test]
fn test_geographic_plan_round_trips_endpoints() {
    let origin = GeoPoint::new(40.0, -75.0);
    let destination = GeoPoint::new(40.0, -74.0);
    let request = PlanRequest {
        origin,
        destination,
        cruise_speed_kts: 180.0,
        altitude_ft: 8000.0,
        obstacles: vec![vec![
            [39.9, -74.62],
            [40.1, -74.62],
            [40.1, -74.42],
            [39.9, -74.42],
        ]],
        priority: None,
    };

    let planned = Planner::default().plan(&request).unwrap();
    let first = planned.waypoints.first().unwrap();
    let last = planned.waypoints.last().unwrap();
    assert!((first.lat - origin.lat).abs() < 1e-9 && (first.lon - origin.lon).abs() < 1e-9);
    assert!((last.lat - destination.lat).abs() < 1e-9 && (last.lon - destination.lon).abs() < 1e-9);
    assert_eq!(planned.altitude_ft, 8000.0);
    assert_eq!(planned.priority, OptimizationPriority::Distance);

    let frame = LocalFrame::centered(origin, destination);
    let direct_nm = frame.project(origin).distance_to(frame.project(destination));
    assert!(planned.distance_nm > direct_nm);
    assert!((planned.time_hr - planned.distance_nm / 180.0).abs() < 1e-9);

    let obstacle = Obstacle::new(
        request.obstacles[0]
            .iter()
            .map(|[lat, lon]| frame.project(GeoPoint::new(*lat, *lon)))
            .collect(),
    )
    .unwrap();
    let projected: Vec<Position> = planned.waypoints.iter().map(|wp| frame.project(*wp)).collect();
    assert!(obstacle.intersect_route(&projected).is_empty());
}

#[test]
fn test_degenerate_obstacles_are_skipped() {
    let request = PlanRequest {
        origin: GeoPoint::new(10.0, 10.0),
        destination: GeoPoint::new(10.0, 11.0),
        cruise_speed_kts: 120.0,
        altitude_ft: 0.0,
        obstacles: vec![vec![[10.0, 10.5], [10.0, 10.6]]],
        priority: Some(OptimizationPriority::Time),
    };
    let planned = Planner::default().plan(&request).unwrap();
    assert_eq!(planned.priority, OptimizationPriority::Time);
    assert_eq!(planned.stats.branched, 0);
}

#[test]
fn test_non_finite_request_is_rejected() {
    let request = PlanRequest {
        origin: GeoPoint::new(f64::NAN, 0.0),
        destination: GeoPoint::new(0.0, 1.0),
        cruise_speed_kts: 120.0,
        altitude_ft: 0.0,
        obstacles: Vec::new(),
        priority: None,
    };
    let err = Planner::default().plan(&request).unwrap_err();
    assert!(matches!(err, PlanError::InvalidConfig(_)));
}
