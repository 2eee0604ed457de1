//! Search event callbacks.
//!
//! The search loop reports what it does through [`SearchObserver`] instead of
//! logging inline, so callers can trace, record, or plot the branching tree.

use crate::route::Route;

/// A step of the branch-and-bound search.
#[derive(Debug, Clone, Copy)]
pub enum SearchEvent<'a> {
    /// The direct route has been built and cleaned.
    Started { direct: &'a Route },
    /// A route was popped from the open set.
    Selected { route: &'a Route, open_routes: usize },
    /// A route was discarded because it cannot beat the incumbent.
    Fathomed { route: &'a Route },
    /// Two detour routes around `obstacle` were added to the open set.
    Branched {
        obstacle: usize,
        left: &'a Route,
        right: &'a Route,
    },
    /// A feasible route became the new incumbent.
    IncumbentUpdated { route: &'a Route, first: bool },
    /// The open set is empty and `route` is the answer.
    Finished { route: &'a Route },
}

pub trait SearchObserver {
    fn on_event(&mut self, event: &SearchEvent<'_>);
}

impl SearchObserver for () {
    fn on_event(&mut self, _event: &SearchEvent<'_>) {}
}

impl<F> SearchObserver for F
where
    F: FnMut(&SearchEvent<'_>),
{
    fn on_event(&mut self, event: &SearchEvent<'_>) {
        self(event)
    }
}

/// Writes search events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn on_event(&mut self, event: &SearchEvent<'_>) {
        match event {
            SearchEvent::Started { direct } => tracing::debug!(
                waypoints = direct.waypoints.len(),
                distance_nm = direct.distance,
                time_hr = direct.time,
                "direct route built"
            ),
            SearchEvent::Selected { route, open_routes } => tracing::debug!(
                open_routes,
                deviation = route.deviation,
                distance_nm = route.distance,
                "route selected"
            ),
            SearchEvent::Fathomed { route } => {
                tracing::debug!(distance_nm = route.distance, time_hr = route.time, "route fathomed")
            }
            SearchEvent::Branched {
                obstacle,
                left,
                right,
            } => tracing::debug!(
                obstacle,
                left_deviation = left.deviation,
                right_deviation = right.deviation,
                "branched around obstacle"
            ),
            SearchEvent::IncumbentUpdated { route, first } => tracing::info!(
                first,
                distance_nm = route.distance,
                time_hr = route.time,
                "incumbent updated"
            ),
            SearchEvent::Finished { route } => tracing::debug!(
                waypoints = route.waypoints.len(),
                distance_nm = route.distance,
                "search finished"
            ),
        }
    }
}
