//! Planning scenarios: JSON files and pre-defined layouts for testing.

use std::fs;
use std::path::Path;

use anyhow::Context;
use detour_core::{GeoPoint, LocalFrame, PlanRequest, Position};

/// Default centre for the built-in layouts.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(33.6846, -117.8265);

const DEFAULT_SPEED_KTS: f64 = 250.0;
const DEFAULT_ALTITUDE_FT: f64 = 10_000.0;

/// A named planning request with what a correct plan must look like.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub request: PlanRequest,
    /// Whether a correct plan has to leave the straight line
    pub expect_detour: bool,
}

/// Read a [`PlanRequest`] from a JSON file.
pub fn load_scenario(path: impl AsRef<Path>) -> anyhow::Result<PlanRequest> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    parse_scenario(&raw).with_context(|| format!("invalid scenario {}", path.display()))
}

pub fn parse_scenario(raw: &str) -> anyhow::Result<PlanRequest> {
    let request: PlanRequest = serde_json::from_str(raw)?;
    anyhow::ensure!(
        request.cruise_speed_kts > 0.0,
        "cruise_speed_kts must be positive, got {}",
        request.cruise_speed_kts
    );
    Ok(request)
}

/// All built-in layouts around `center`.
pub fn builtin_scenarios(center: GeoPoint) -> Vec<Scenario> {
    vec![
        create_single_square_scenario(center),
        create_series_scenario(center),
        create_offset_pair_scenario(center),
        create_clear_scenario(center),
    ]
}

pub fn find_builtin(name: &str, center: GeoPoint) -> Option<Scenario> {
    builtin_scenarios(center)
        .into_iter()
        .find(|scenario| scenario.name == name)
}

/// One 20 NM square centred on a 100 NM west-to-east leg.
pub fn create_single_square_scenario(center: GeoPoint) -> Scenario {
    let frame = LocalFrame::new(center);
    Scenario {
        name: "single_square".to_string(),
        request: east_west_request(&frame, vec![ring(&frame, -10.0, -10.0, 10.0, 10.0)]),
        expect_detour: true,
    }
}

/// Two squares one after the other on the direct line.
pub fn create_series_scenario(center: GeoPoint) -> Scenario {
    let frame = LocalFrame::new(center);
    Scenario {
        name: "series".to_string(),
        request: east_west_request(
            &frame,
            vec![
                ring(&frame, -25.0, -5.0, -15.0, 5.0),
                ring(&frame, 15.0, -5.0, 25.0, 5.0),
            ],
        ),
        expect_detour: true,
    }
}

/// Two rectangles straddling the line from opposite sides.
pub fn create_offset_pair_scenario(center: GeoPoint) -> Scenario {
    let frame = LocalFrame::new(center);
    Scenario {
        name: "offset_pair".to_string(),
        request: east_west_request(
            &frame,
            vec![
                ring(&frame, -20.0, -3.0, -8.0, 15.0),
                ring(&frame, 8.0, -15.0, 20.0, 3.0),
            ],
        ),
        expect_detour: true,
    }
}

/// An obstacle well north of the line; the direct route must come back unchanged.
pub fn create_clear_scenario(center: GeoPoint) -> Scenario {
    let frame = LocalFrame::new(center);
    Scenario {
        name: "clear".to_string(),
        request: east_west_request(&frame, vec![ring(&frame, -10.0, 20.0, 10.0, 30.0)]),
        expect_detour: false,
    }
}

fn east_west_request(frame: &LocalFrame, obstacles: Vec<Vec<[f64; 2]>>) -> PlanRequest {
    PlanRequest {
        origin: frame.unproject(Position::new(-50.0, 0.0)),
        destination: frame.unproject(Position::new(50.0, 0.0)),
        cruise_speed_kts: DEFAULT_SPEED_KTS,
        altitude_ft: DEFAULT_ALTITUDE_FT,
        obstacles,
        priority: None,
    }
}

/// Clockwise [lat, lon] ring for an axis-aligned rectangle given in local NM.
fn ring(frame: &LocalFrame, x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<[f64; 2]> {
    [(x0, y0), (x0, y1), (x1, y1), (x1, y0)]
        .into_iter()
        .map(|(x, y)| {
            let point = frame.unproject(Position::new(x, y));
            [point.lat, point.lon]
        })
        .collect()
}
