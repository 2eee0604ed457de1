//! Branch-and-bound search over detour routes.
//!
//! Starting from the straight route, the planner repeatedly takes the open
//! route with the smallest deviation from its parent. A route that crosses an
//! obstacle is split into a left and a right detour around the first obstacle
//! it meets; a route that crosses nothing is a candidate solution. Routes that
//! already cost at least as much as the best candidate are discarded.
//!
//! Backward cleanup can shortcut waypoints an earlier detour needed, so a
//! child may come out cheaper than its parent and its deviation negative.
//! The bound still compares absolute cost, never deviation.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::geometry::{BoundingBox, GeoPoint, LocalFrame, Position};
use crate::models::{OptimizationPriority, PlanRequest, PlannedRoute};
use crate::obstacle::{Intersection, Obstacle};
use crate::observer::{SearchEvent, SearchObserver};
use crate::route::Route;
use crate::wind::{WindField, WindProvider};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Average spacing of waypoints on the straight route
    pub waypoint_spacing_nm: f64,
    /// Open-set size at which the search gives up
    pub max_open_routes: usize,
    pub priority: OptimizationPriority,
    /// Fractional margin around the origin/destination box handed to the wind provider
    pub wind_margin: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            waypoint_spacing_nm: 10.0,
            max_open_routes: 500,
            priority: OptimizationPriority::Distance,
            wind_margin: 0.01,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), PlanError> {
        if !(self.waypoint_spacing_nm.is_finite() && self.waypoint_spacing_nm > 0.0) {
            return Err(PlanError::InvalidConfig(format!(
                "waypoint spacing must be positive, got {}",
                self.waypoint_spacing_nm
            )));
        }
        if self.max_open_routes == 0 {
            return Err(PlanError::InvalidConfig(
                "max_open_routes must be at least 1".to_string(),
            ));
        }
        if !(self.wind_margin.is_finite() && self.wind_margin >= 0.0) {
            return Err(PlanError::InvalidConfig(format!(
                "wind margin must be non-negative, got {}",
                self.wind_margin
            )));
        }
        Ok(())
    }
}

/// Counters describing one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Routes popped from the open set
    pub expanded: usize,
    /// Routes discarded by the bound check
    pub fathomed: usize,
    /// Routes split into two detours
    pub branched: usize,
    /// Routes that cross no edge but still cut through an obstacle
    pub blocked: usize,
    pub incumbent_updates: usize,
    pub peak_open_routes: usize,
}

/// The best route found on the local plane.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub route: Route,
    pub stats: SearchStats,
}

/// Open-set entry ordered by deviation, then by insertion order.
#[derive(Debug)]
struct OpenRoute {
    deviation: f64,
    sequence: u64,
    route: Route,
}

impl PartialEq for OpenRoute {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenRoute {}

impl PartialOrd for OpenRoute {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenRoute {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deviation
            .total_cmp(&other.deviation)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// Pending routes awaiting expansion, owned by a single search.
#[derive(Debug, Default)]
struct OpenSet {
    heap: BinaryHeap<Reverse<OpenRoute>>,
    next_sequence: u64,
}

impl OpenSet {
    fn push(&mut self, route: Route) {
        let entry = OpenRoute {
            deviation: route.deviation,
            sequence: self.next_sequence,
            route,
        };
        self.next_sequence += 1;
        self.heap.push(Reverse(entry));
    }

    /// Remove the route with the smallest deviation; earliest pushed wins ties.
    fn pop_best(&mut self) -> Option<Route> {
        self.heap.pop().map(|Reverse(entry)| entry.route)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

pub struct Planner {
    config: PlannerConfig,
    wind: Option<Box<dyn WindProvider + Send + Sync>>,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("config", &self.config)
            .field("wind", &self.wind.is_some())
            .finish()
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config, wind: None }
    }

    /// Use `provider` for wind-adjusted time costs.
    pub fn with_wind(mut self, provider: impl WindProvider + Send + Sync + 'static) -> Self {
        self.wind = Some(Box::new(provider));
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a geographic request.
    pub fn plan(&self, request: &PlanRequest) -> Result<PlannedRoute, PlanError> {
        self.plan_observed(request, &mut ())
    }

    /// Plan a geographic request, reporting each search step to `observer`.
    ///
    /// Obstacles that are not usable polygons are skipped with a warning, so
    /// obstacle indices in events refer to the usable ones in request order.
    pub fn plan_observed(
        &self,
        request: &PlanRequest,
        observer: &mut dyn SearchObserver,
    ) -> Result<PlannedRoute, PlanError> {
        if !request.origin.is_finite() || !request.destination.is_finite() {
            return Err(PlanError::InvalidConfig(
                "origin and destination must be finite coordinates".to_string(),
            ));
        }

        let frame = LocalFrame::centered(request.origin, request.destination);
        let origin = frame.project(request.origin);
        let destination = frame.project(request.destination);

        let obstacles: Vec<Obstacle> = request
            .obstacles
            .iter()
            .enumerate()
            .filter_map(|(idx, ring)| {
                let vertices = ring
                    .iter()
                    .map(|[lat, lon]| frame.project(GeoPoint::new(*lat, *lon)))
                    .collect();
                match Obstacle::new(vertices) {
                    Ok(obstacle) => Some(obstacle),
                    Err(err) => {
                        tracing::warn!(obstacle = idx, %err, "skipping unusable obstacle");
                        None
                    }
                }
            })
            .collect();

        let priority = request.priority.unwrap_or(self.config.priority);
        let outcome = self.run(
            origin,
            destination,
            &obstacles,
            request.cruise_speed_kts,
            priority,
            observer,
        )?;

        Ok(PlannedRoute {
            waypoints: outcome
                .route
                .waypoints
                .iter()
                .map(|wp| frame.unproject(*wp))
                .collect(),
            distance_nm: outcome.route.distance,
            time_hr: outcome.route.time,
            altitude_ft: request.altitude_ft,
            cruise_speed_kts: request.cruise_speed_kts,
            priority,
            stats: outcome.stats,
        })
    }

    /// Search on the local plane with the configured priority.
    pub fn search(
        &self,
        origin: Position,
        destination: Position,
        obstacles: &[Obstacle],
        airspeed_kts: f64,
        observer: &mut dyn SearchObserver,
    ) -> Result<SearchOutcome, PlanError> {
        self.run(
            origin,
            destination,
            obstacles,
            airspeed_kts,
            self.config.priority,
            observer,
        )
    }

    fn run(
        &self,
        origin: Position,
        destination: Position,
        obstacles: &[Obstacle],
        airspeed_kts: f64,
        priority: OptimizationPriority,
        observer: &mut dyn SearchObserver,
    ) -> Result<SearchOutcome, PlanError> {
        self.config.validate()?;
        if !(airspeed_kts.is_finite() && airspeed_kts > 0.0) {
            return Err(PlanError::InvalidConfig(format!(
                "cruise speed must be positive, got {airspeed_kts}"
            )));
        }
        if !origin.is_finite() || !destination.is_finite() {
            return Err(PlanError::InvalidConfig(
                "origin and destination must be finite".to_string(),
            ));
        }

        let cap = self.config.max_open_routes;
        if let Some(idx) = obstacles
            .iter()
            .position(|obstacle| !obstacle.points_inside(&[origin, destination]).is_empty())
        {
            tracing::warn!(obstacle = idx, "route endpoint lies inside an obstacle");
            return Err(PlanError::NoRouteFound { cap, expanded: 0 });
        }

        let bounds = BoundingBox::around(origin, destination, self.config.wind_margin);
        let wind_field = self.wind.as_ref().map(|provider| provider.field(&bounds));
        let wind = wind_field.as_deref();

        let mut direct = Route::direct(origin, destination, self.config.waypoint_spacing_nm);
        direct.clean(obstacles);
        direct.recompute_cost(airspeed_kts, wind);
        observer.on_event(&SearchEvent::Started { direct: &direct });
        tracing::debug!(
            obstacles = obstacles.len(),
            %priority,
            direct_nm = direct.distance,
            "starting branch-and-bound search"
        );

        let mut open = OpenSet::default();
        open.push(direct);
        let mut incumbent: Option<Route> = None;
        let mut stats = SearchStats::default();

        loop {
            stats.peak_open_routes = stats.peak_open_routes.max(open.len());
            if open.len() > cap {
                tracing::warn!(cap, expanded = stats.expanded, "open set exceeded cap");
                return Err(PlanError::NoRouteFound {
                    cap,
                    expanded: stats.expanded,
                });
            }

            let Some(parent) = open.pop_best() else {
                break;
            };
            stats.expanded += 1;
            observer.on_event(&SearchEvent::Selected {
                route: &parent,
                open_routes: open.len(),
            });

            if let Some(best) = &incumbent {
                if parent.cost(priority) >= best.cost(priority) {
                    stats.fathomed += 1;
                    observer.on_event(&SearchEvent::Fathomed { route: &parent });
                    continue;
                }
            }

            let hits: Vec<Vec<Intersection>> = obstacles
                .iter()
                .map(|obstacle| obstacle.intersect_route(&parent.waypoints))
                .collect();

            match select_branching_obstacle(&parent, obstacles, &hits) {
                None if !parent.is_clear_of(obstacles) => {
                    // A vertex-to-vertex chord or a leg leaving a vertex inwards.
                    stats.blocked += 1;
                    tracing::debug!(distance_nm = parent.distance, "route cuts through an obstacle");
                }
                None => {
                    let first = incumbent.is_none();
                    let improves = incumbent
                        .as_ref()
                        .map_or(true, |best| parent.cost(priority) < best.cost(priority));
                    if improves {
                        stats.incumbent_updates += 1;
                        observer.on_event(&SearchEvent::IncumbentUpdated {
                            route: &parent,
                            first,
                        });
                        incumbent = Some(parent);
                    }
                }
                Some(branch) => {
                    let context = BranchContext {
                        obstacles,
                        destination,
                        airspeed_kts,
                        priority,
                        wind,
                    };
                    let (left, right) = context.branch(&parent, branch, &hits[branch]);
                    stats.branched += 1;
                    observer.on_event(&SearchEvent::Branched {
                        obstacle: branch,
                        left: &left,
                        right: &right,
                    });
                    open.push(left);
                    open.push(right);
                }
            }
        }

        let Some(route) = incumbent else {
            return Err(PlanError::NoRouteFound {
                cap,
                expanded: stats.expanded,
            });
        };
        observer.on_event(&SearchEvent::Finished { route: &route });
        tracing::debug!(
            expanded = stats.expanded,
            fathomed = stats.fathomed,
            branched = stats.branched,
            distance_nm = route.distance,
            time_hr = route.time,
            "search finished"
        );

        Ok(SearchOutcome { route, stats })
    }
}

/// Pick the obstacle the route meets first.
///
/// The obstacle whose earliest intersected leg has the smallest index wins.
/// Ties on that leg go to the intersection nearest the leg's start, then to
/// the lowest obstacle index.
pub fn select_branching_obstacle(
    route: &Route,
    obstacles: &[Obstacle],
    hits: &[Vec<Intersection>],
) -> Option<usize> {
    let first_segments: Vec<(usize, usize)> = hits
        .iter()
        .enumerate()
        .filter_map(|(idx, obstacle_hits)| {
            obstacle_hits
                .iter()
                .map(|hit| hit.route_segment)
                .min()
                .map(|segment| (idx, segment))
        })
        .collect();

    let earliest = first_segments.iter().map(|(_, segment)| *segment).min()?;
    let candidates: Vec<usize> = first_segments
        .iter()
        .filter(|(_, segment)| *segment == earliest)
        .map(|(idx, _)| *idx)
        .collect();
    if candidates.len() == 1 {
        return candidates.first().copied();
    }

    let start = *route.waypoints.get(earliest)?;
    let end = *route.waypoints.get(earliest + 1)?;
    candidates
        .into_iter()
        .map(|idx| {
            let nearest = hits[idx]
                .iter()
                .filter(|hit| hit.route_segment == earliest)
                .map(|hit| obstacles[idx].encounter_distance(hit.obstacle_edge, start, end))
                .fold(f64::INFINITY, f64::min);
            (idx, nearest)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
        .map(|(idx, _)| idx)
}

/// Everything needed to turn a parent route into its two detour children.
struct BranchContext<'a> {
    obstacles: &'a [Obstacle],
    destination: Position,
    airspeed_kts: f64,
    priority: OptimizationPriority,
    wind: Option<&'a dyn WindField>,
}

impl BranchContext<'_> {
    fn branch(&self, parent: &Route, branch: usize, hits: &[Intersection]) -> (Route, Route) {
        let obstacle = &self.obstacles[branch];
        let edges: Vec<usize> = hits.iter().map(|hit| hit.obstacle_edge).collect();
        let ordered = obstacle.reorder_by_encounter(&edges, &parent.waypoints, hits);
        let splice_after = hits.iter().map(|hit| hit.route_segment).min().unwrap_or(0);

        let left = Obstacle::clean_detour(obstacle.left_detour(&ordered), self.destination);
        let right = Obstacle::clean_detour(obstacle.right_detour(&ordered), self.destination);

        (
            self.detour_route(parent, &left, splice_after),
            self.detour_route(parent, &right, splice_after),
        )
    }

    fn detour_route(&self, parent: &Route, detour: &[Position], splice_after: usize) -> Route {
        let mut child = parent.clone();
        child.insert(splice_after, detour);
        child.backward_cleanup(self.obstacles, splice_after + 1 + detour.len());
        child.recompute_cost(self.airspeed_kts, self.wind);
        child.deviation = child.deviation_relative_to(parent, self.priority);
        child
    }
}
