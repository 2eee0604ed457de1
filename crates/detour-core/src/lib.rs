pub mod error;
pub mod geometry;
pub mod models;
pub mod observer;
pub mod obstacle;
pub mod planner;
pub mod route;
pub mod wind;

pub use error::{ObstacleError, PlanError};
pub use geometry::{
    build_straight_route, path_length, segments_intersect, BoundingBox, GeoPoint, LocalFrame,
    Position, NM_PER_DEG_LAT,
};
pub use models::{OptimizationPriority, PlanRequest, PlannedRoute};
pub use observer::{SearchEvent, SearchObserver, TracingObserver};
pub use obstacle::{Intersection, Obstacle};
pub use planner::{
    select_branching_obstacle, Planner, PlannerConfig, SearchOutcome, SearchStats,
};
pub use route::Route;
pub use wind::{ground_speed, Calm, UniformWind, WindField, WindProvider};
