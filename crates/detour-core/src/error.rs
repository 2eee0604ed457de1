//! Error types for route planning.

/// Failures surfaced by the planner.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PlanError {
    /// The search could not produce an obstacle-free route.
    ///
    /// Raised when the open set grows past its cap or runs dry without a
    /// feasible route, which usually means overlapping obstacles or an
    /// endpoint inside one. Not retried.
    #[error("no route found after {expanded} expansions (open-set cap {cap})")]
    NoRouteFound {
        /// Configured open-set cap.
        cap: usize,
        /// Routes popped from the open set before giving up.
        expanded: usize,
    },

    /// The request or planner configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Reasons a polygon cannot be used as an obstacle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ObstacleError {
    #[error("obstacle needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),

    #[error("obstacle polygon has zero area")]
    ZeroArea,

    #[error("obstacle vertex {0} is not a finite coordinate")]
    NonFiniteVertex(usize),
}
