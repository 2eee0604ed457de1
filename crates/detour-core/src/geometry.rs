//! Planar geometry for route planning.
//!
//! All planning happens on a flat local plane measured in nautical miles.
//! Geographic coordinates are projected into that plane once per request
//! and projected back when the final route is reported.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Nautical miles per degree of latitude.
pub const NM_PER_DEG_LAT: f64 = 60.0;

/// Tolerance in nautical miles used for "same point" and "on the line" decisions.
pub const GEOMETRY_EPS_NM: f64 = 1e-9;

/// A point (or vector) on the local plane, in nautical miles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of this vector.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(self, other: Position) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3-D cross product.
    pub fn cross(self, other: Position) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn distance_to(self, other: Position) -> f64 {
        (other - self).length()
    }

    pub fn midpoint(self, other: Position) -> Position {
        Position::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    pub fn unit(self) -> Option<Position> {
        let len = self.length();
        if len <= GEOMETRY_EPS_NM {
            return None;
        }
        Some(self * (1.0 / len))
    }

    pub fn approx_eq(self, other: Position) -> bool {
        self.distance_to(other) <= GEOMETRY_EPS_NM
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, rhs: f64) -> Position {
        Position::new(self.x * rhs, self.y * rhs)
    }
}

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Equirectangular projection around a reference parallel and meridian.
///
/// Accurate only over the small region of a single planning request; the
/// planner never uses it for anything larger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    ref_lat: f64,
    ref_lon: f64,
    nm_per_deg_lon: f64,
}

impl LocalFrame {
    pub fn new(reference: GeoPoint) -> Self {
        // Keep the longitude scale away from zero so the inverse stays defined near the poles.
        let nm_per_deg_lon = (NM_PER_DEG_LAT * reference.lat.to_radians().cos()).max(1e-9);
        Self {
            ref_lat: reference.lat,
            ref_lon: reference.lon,
            nm_per_deg_lon,
        }
    }

    /// Frame whose reference sits halfway between two points.
    pub fn centered(a: GeoPoint, b: GeoPoint) -> Self {
        Self::new(GeoPoint::new((a.lat + b.lat) / 2.0, (a.lon + b.lon) / 2.0))
    }

    pub fn reference(&self) -> GeoPoint {
        GeoPoint::new(self.ref_lat, self.ref_lon)
    }

    /// Convert a geographic coordinate to the local plane.
    pub fn project(&self, point: GeoPoint) -> Position {
        Position::new(
            (point.lon - self.ref_lon) * self.nm_per_deg_lon,
            (point.lat - self.ref_lat) * NM_PER_DEG_LAT,
        )
    }

    /// Exact inverse of [`LocalFrame::project`].
    pub fn unproject(&self, position: Position) -> GeoPoint {
        GeoPoint::new(
            self.ref_lat + position.y / NM_PER_DEG_LAT,
            self.ref_lon + position.x / self.nm_per_deg_lon,
        )
    }
}

/// Axis-aligned rectangle on the local plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Position,
    pub max: Position,
}

impl BoundingBox {
    /// Box spanning two points, grown on every side by `margin` times its span.
    pub fn around(a: Position, b: Position, margin: f64) -> Self {
        let min = Position::new(a.x.min(b.x), a.y.min(b.y));
        let max = Position::new(a.x.max(b.x), a.y.max(b.y));
        let pad = Position::new((max.x - min.x) * margin, (max.y - min.y) * margin);
        Self {
            min: min - pad,
            max: max + pad,
        }
    }

    /// Smallest box holding every point. `None` for an empty slice.
    pub fn of_points(points: &[Position]) -> Option<Self> {
        let first = *points.first()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for point in &points[1..] {
            bounds.min.x = bounds.min.x.min(point.x);
            bounds.min.y = bounds.min.y.min(point.y);
            bounds.max.x = bounds.max.x.max(point.x);
            bounds.max.y = bounds.max.y.max(point.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Whether the segment's own bounding box touches this box (with tolerance).
    pub fn overlaps_segment(&self, a: Position, b: Position) -> bool {
        a.x.max(b.x) >= self.min.x - GEOMETRY_EPS_NM
            && a.x.min(b.x) <= self.max.x + GEOMETRY_EPS_NM
            && a.y.max(b.y) >= self.min.y - GEOMETRY_EPS_NM
            && a.y.min(b.y) <= self.max.y + GEOMETRY_EPS_NM
    }
}

/// Signed distance of `r` from the line through `p` and `q` (positive = left).
fn side(p: Position, q: Position, r: Position) -> f64 {
    let dir = q - p;
    let len = dir.length();
    if len <= GEOMETRY_EPS_NM {
        return 0.0;
    }
    dir.cross(r - p) / len
}

/// `r` lies on segment `p`-`q` but is not one of its endpoints.
/// Assumes `r` is already known to be on the supporting line.
fn strictly_between(p: Position, q: Position, r: Position) -> bool {
    if r.approx_eq(p) || r.approx_eq(q) {
        return false;
    }
    let dir = q - p;
    let len_sq = dir.dot(dir);
    if len_sq <= GEOMETRY_EPS_NM * GEOMETRY_EPS_NM {
        return false;
    }
    let t = (r - p).dot(dir) / len_sq;
    t > 0.0 && t < 1.0
}

fn opposite(a: f64, b: f64) -> bool {
    (a > GEOMETRY_EPS_NM && b < -GEOMETRY_EPS_NM) || (a < -GEOMETRY_EPS_NM && b > GEOMETRY_EPS_NM)
}

/// Segment-segment intersection test.
///
/// Proper crossings intersect, and so does any endpoint of one segment lying
/// inside the other (touching or collinear overlap). Segments that only share
/// an endpoint, or that coincide exactly, do not: a route may turn on an
/// obstacle vertex or run along an obstacle edge.
pub fn segments_intersect(p1: Position, p2: Position, q1: Position, q2: Position) -> bool {
    let d1 = side(q1, q2, p1);
    let d2 = side(q1, q2, p2);
    let d3 = side(p1, p2, q1);
    let d4 = side(p1, p2, q2);

    if opposite(d1, d2) && opposite(d3, d4) {
        return true;
    }

    (d1.abs() <= GEOMETRY_EPS_NM && strictly_between(q1, q2, p1))
        || (d2.abs() <= GEOMETRY_EPS_NM && strictly_between(q1, q2, p2))
        || (d3.abs() <= GEOMETRY_EPS_NM && strictly_between(p1, p2, q1))
        || (d4.abs() <= GEOMETRY_EPS_NM && strictly_between(p1, p2, q2))
}

/// Intersection of the lines through `p1`-`p2` and `q1`-`q2`.
///
/// Returns `None` for parallel lines.
pub fn intersection_point(p1: Position, p2: Position, q1: Position, q2: Position) -> Option<Position> {
    let r = p2 - p1;
    let s = q2 - q1;
    let denom = r.cross(s);
    if denom.abs() <= GEOMETRY_EPS_NM * GEOMETRY_EPS_NM {
        return None;
    }
    let t = (q1 - p1).cross(s) / denom;
    Some(p1 + r * t)
}

/// Shortest distance from `point` to segment `a`-`b`.
pub fn distance_to_segment(point: Position, a: Position, b: Position) -> f64 {
    let dir = b - a;
    let len_sq = dir.dot(dir);
    if len_sq <= GEOMETRY_EPS_NM * GEOMETRY_EPS_NM {
        return point.distance_to(a);
    }
    let t = ((point - a).dot(dir) / len_sq).clamp(0.0, 1.0);
    point.distance_to(a + dir * t)
}

/// Evenly spaced waypoints from `origin` to `destination`.
///
/// The number of legs is the trip length divided by `spacing_nm`, rounded,
/// and never less than one. Origin and destination are always included.
pub fn build_straight_route(origin: Position, destination: Position, spacing_nm: f64) -> Vec<Position> {
    let distance = origin.distance_to(destination);
    let legs = if spacing_nm.is_finite() && spacing_nm > 0.0 {
        ((distance / spacing_nm).round() as usize).max(1)
    } else {
        1
    };

    let step = destination - origin;
    let mut waypoints: Vec<Position> = (0..legs)
        .map(|i| origin + step * (i as f64 / legs as f64))
        .collect();
    waypoints.push(destination);
    waypoints
}

/// Total length of a polyline.
pub fn path_length(points: &[Position]) -> f64 {
    points.windows(2).map(|pair| pair[0].distance_to(pair[1])).sum()
}
