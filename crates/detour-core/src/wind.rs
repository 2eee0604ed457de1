//! Wind fields consumed by the time cost.
//!
//! The planner never models weather itself. A [`WindProvider`] is handed the
//! planning area once per search and returns a [`WindField`] that is sampled
//! per route leg.

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Position};

/// Wind vector (u east, v north) in knots at a point on the local plane.
pub trait WindField {
    fn wind_at(&self, position: Position) -> Position;
}

impl<F> WindField for F
where
    F: Fn(Position) -> Position,
{
    fn wind_at(&self, position: Position) -> Position {
        self(position)
    }
}

/// Builds a wind field covering the planning area.
pub trait WindProvider {
    fn field(&self, bounds: &BoundingBox) -> Box<dyn WindField>;
}

impl<F> WindProvider for F
where
    F: Fn(&BoundingBox) -> Box<dyn WindField>,
{
    fn field(&self, bounds: &BoundingBox) -> Box<dyn WindField> {
        self(bounds)
    }
}

/// Same wind everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UniformWind {
    /// Eastward component in knots
    pub u: f64,
    /// Northward component in knots
    pub v: f64,
}

impl UniformWind {
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Wind blowing *from* `direction_deg` (meteorological convention) at `speed_kts`.
    pub fn from_direction(direction_deg: f64, speed_kts: f64) -> Self {
        let toward = (direction_deg + 180.0).to_radians();
        Self {
            u: speed_kts * toward.sin(),
            v: speed_kts * toward.cos(),
        }
    }
}

impl WindField for UniformWind {
    fn wind_at(&self, _position: Position) -> Position {
        Position::new(self.u, self.v)
    }
}

impl WindProvider for UniformWind {
    fn field(&self, _bounds: &BoundingBox) -> Box<dyn WindField> {
        Box::new(*self)
    }
}

/// No wind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calm;

impl WindField for Calm {
    fn wind_at(&self, _position: Position) -> Position {
        Position::default()
    }
}

impl WindProvider for Calm {
    fn field(&self, _bounds: &BoundingBox) -> Box<dyn WindField> {
        Box::new(Calm)
    }
}

/// Ground speed along `heading` (a unit vector) for a given airspeed and wind.
pub fn ground_speed(airspeed_kts: f64, heading: Position, wind: Position) -> f64 {
    airspeed_kts + wind.dot(heading)
}
