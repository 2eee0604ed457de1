//! Polygonal obstacles and detour construction around them.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::ObstacleError;
use crate::geometry::{
    distance_to_segment, intersection_point, segments_intersect, BoundingBox, Position,
    GEOMETRY_EPS_NM,
};

/// One crossing between a route leg and an obstacle edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Intersection {
    /// Index of the route leg (waypoint `i` to `i + 1`)
    pub route_segment: usize,
    /// Index of the obstacle edge (vertex `j` to `j + 1`, wrapping)
    pub obstacle_edge: usize,
}

/// A closed simple polygon the route must not cross.
///
/// Vertices are stored clockwise and never change after construction, so a
/// walk by decreasing index goes counter-clockwise around the ring and a
/// walk by increasing index goes clockwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Obstacle {
    vertices: Vec<Position>,
    #[serde(skip)]
    bounds: BoundingBox,
}

impl Obstacle {
    /// Build an obstacle from a vertex ring.
    ///
    /// A repeated closing vertex and consecutive duplicates are dropped. A
    /// counter-clockwise ring is reversed once so storage is always clockwise.
    pub fn new(vertices: Vec<Position>) -> Result<Self, ObstacleError> {
        if let Some(idx) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(ObstacleError::NonFiniteVertex(idx));
        }

        let mut ring: Vec<Position> = Vec::with_capacity(vertices.len());
        for vertex in vertices {
            if ring.last().map_or(true, |last| !last.approx_eq(vertex)) {
                ring.push(vertex);
            }
        }
        while ring.len() > 1 && ring[0].approx_eq(ring[ring.len() - 1]) {
            ring.pop();
        }

        if ring.len() < 3 {
            return Err(ObstacleError::TooFewVertices(ring.len()));
        }

        let area = shoelace(&ring);
        if area.abs() <= GEOMETRY_EPS_NM {
            return Err(ObstacleError::ZeroArea);
        }
        if area > 0.0 {
            ring.reverse();
        }

        let bounds = BoundingBox::of_points(&ring).ok_or(ObstacleError::TooFewVertices(0))?;
        Ok(Self {
            vertices: ring,
            bounds,
        })
    }

    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Vertex `index`, wrapping around the ring.
    pub fn vertex(&self, index: usize) -> Position {
        self.vertices[index % self.vertices.len()]
    }

    /// Edge `index` as (start, end), wrapping around the ring.
    pub fn edge(&self, index: usize) -> (Position, Position) {
        (self.vertex(index), self.vertex(index + 1))
    }

    /// Signed shoelace area; negative for the stored clockwise ring.
    pub fn signed_area(&self) -> f64 {
        shoelace(&self.vertices)
    }

    /// Every (route leg, obstacle edge) pair that intersects, ordered by leg then edge.
    pub fn intersect_route(&self, waypoints: &[Position]) -> Vec<Intersection> {
        let mut hits = Vec::new();
        for (segment, pair) in waypoints.windows(2).enumerate() {
            let (start, end) = (pair[0], pair[1]);
            if !self.bounds.overlaps_segment(start, end) {
                continue;
            }
            for edge in 0..self.vertices.len() {
                let (a, b) = self.edge(edge);
                if segments_intersect(start, end, a, b) {
                    hits.push(Intersection {
                        route_segment: segment,
                        obstacle_edge: edge,
                    });
                }
            }
        }
        hits
    }

    /// Distance from `start` to where the leg `start`-`end` meets edge `edge`.
    pub fn encounter_distance(&self, edge: usize, start: Position, end: Position) -> f64 {
        let (a, b) = self.edge(edge);
        match intersection_point(start, end, a, b) {
            Some(point) => point.distance_to(start),
            // Collinear overlap: the leg first meets the nearer edge endpoint.
            None => a.distance_to(start).min(b.distance_to(start)),
        }
    }

    /// Order the edges hit on the first intersected leg by where the route meets them.
    ///
    /// Edges hit only on later legs are dropped; an edge listed twice appears once.
    pub fn reorder_by_encounter(
        &self,
        edges: &[usize],
        waypoints: &[Position],
        intersections: &[Intersection],
    ) -> Vec<usize> {
        let Some(first_segment) = intersections.iter().map(|hit| hit.route_segment).min() else {
            return Vec::new();
        };
        let (Some(&start), Some(&end)) = (waypoints.get(first_segment), waypoints.get(first_segment + 1))
        else {
            return Vec::new();
        };

        let mut seen = BTreeSet::new();
        let mut ordered: Vec<(usize, f64)> = edges
            .iter()
            .copied()
            .filter(|edge| {
                intersections
                    .iter()
                    .any(|hit| hit.route_segment == first_segment && hit.obstacle_edge == *edge)
            })
            .filter(|edge| seen.insert(*edge))
            .map(|edge| (edge, self.encounter_distance(edge, start, end)))
            .collect();

        ordered.sort_by(|a, b| a.1.total_cmp(&b.1));
        ordered.into_iter().map(|(edge, _)| edge).collect()
    }

    /// Boundary vertices bypassing the obstacle counter-clockwise.
    ///
    /// Walks by decreasing index from the first vertex of the entry edge to
    /// the far vertex of the exit edge, both inclusive.
    pub fn left_detour(&self, ordered_edges: &[usize]) -> Vec<Position> {
        let (Some(&first), Some(&last)) = (ordered_edges.first(), ordered_edges.last()) else {
            return Vec::new();
        };
        let n = self.vertices.len();
        self.walk(first % n, (last + 1) % n, |i| (i + n - 1) % n)
    }

    /// Boundary vertices bypassing the obstacle clockwise.
    ///
    /// Walks by increasing index from the far vertex of the entry edge to the
    /// first vertex of the exit edge, both inclusive.
    pub fn right_detour(&self, ordered_edges: &[usize]) -> Vec<Position> {
        let (Some(&first), Some(&last)) = (ordered_edges.first(), ordered_edges.last()) else {
            return Vec::new();
        };
        let n = self.vertices.len();
        self.walk((first + 1) % n, last % n, |i| (i + 1) % n)
    }

    fn walk(&self, start: usize, stop: usize, step: impl Fn(usize) -> usize) -> Vec<Position> {
        let mut points = vec![self.vertices[start]];
        let mut index = start;
        while index != stop && points.len() < self.vertices.len() {
            index = step(index);
            points.push(self.vertices[index]);
        }
        points
    }

    /// Drop detour points that repeat the destination or the point before them.
    pub fn clean_detour(detour: Vec<Position>, destination: Position) -> Vec<Position> {
        let mut cleaned: Vec<Position> = Vec::with_capacity(detour.len());
        for point in detour {
            if point.approx_eq(destination) {
                continue;
            }
            if cleaned.last().is_some_and(|prev| prev.approx_eq(point)) {
                continue;
            }
            cleaned.push(point);
        }
        cleaned
    }

    /// Ray-casting point-in-polygon test for the interior.
    pub fn contains(&self, point: Position) -> bool {
        if !self.bounds.contains(point) {
            return false;
        }
        let mut inside = false;
        let n = self.vertices.len();
        let mut j = n - 1;
        for i in 0..n {
            let (vi, vj) = (self.vertices[i], self.vertices[j]);
            if ((vi.y > point.y) != (vj.y > point.y))
                && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    pub fn on_boundary(&self, point: Position) -> bool {
        (0..self.vertices.len()).any(|edge| {
            let (a, b) = self.edge(edge);
            distance_to_segment(point, a, b) <= GEOMETRY_EPS_NM
        })
    }

    pub fn is_vertex(&self, point: Position) -> bool {
        self.vertices.iter().any(|vertex| vertex.approx_eq(point))
    }

    /// Indices of waypoints inside the polygon or on an edge between vertices.
    ///
    /// Waypoints on a vertex are left alone: detours are made of them.
    pub fn points_inside(&self, waypoints: &[Position]) -> BTreeSet<usize> {
        waypoints
            .iter()
            .enumerate()
            .filter(|(_, point)| !self.is_vertex(**point))
            .filter(|(_, point)| self.on_boundary(**point) || self.contains(**point))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Whether a straight leg from `a` to `b` would cross or cut through this obstacle.
    pub fn blocks_segment(&self, a: Position, b: Position) -> bool {
        if !self.bounds.overlaps_segment(a, b) {
            return false;
        }
        let crosses = (0..self.vertices.len()).any(|edge| {
            let (start, end) = self.edge(edge);
            segments_intersect(a, b, start, end)
        });
        if crosses {
            return true;
        }
        // A chord between two vertices touches no edge but still passes through the interior.
        let mid = a.midpoint(b);
        self.contains(mid) && !self.on_boundary(mid)
    }
}

fn shoelace(ring: &[Position]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| ring[i].cross(ring[(i + 1) % n]))
        .sum::<f64>()
        / 2.0
}
