//! Stress runner for the built-in planning scenarios.
//!
//! Plans every built-in layout and prints PASS/FAIL for the obstacle and
//! detour checks. Exits with an error when any check fails.

use clap::Parser;
use detour_cli::report::{direct_distance_nm, find_obstacle_violations};
use detour_cli::scenario::DEFAULT_CENTER;
use detour_cli::{builtin_scenarios, init_tracing, CliConfig};
use detour_core::{GeoPoint, Planner};

/// Run every built-in scenario and check the planned routes
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value_t = DEFAULT_CENTER.lat)]
    lat: f64,

    #[arg(long, default_value_t = DEFAULT_CENTER.lon)]
    lon: f64,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(false, args.json_logs)?;

    let config = CliConfig::from_env();
    tracing::info!(
        spacing_nm = config.waypoint_spacing_nm,
        max_open_routes = config.max_open_routes,
        priority = %config.priority,
        "running built-in scenarios"
    );
    let planner = Planner::new(config.planner_config());
    let mut failures = 0usize;

    for scenario in builtin_scenarios(GeoPoint::new(args.lat, args.lon)) {
        println!("\n=== {} ===", scenario.name);
        let planned = match planner.plan(&scenario.request) {
            Ok(planned) => planned,
            Err(err) => {
                tracing::warn!(scenario = %scenario.name, %err, "planning failed");
                println!("Result: FAIL");
                println!("Error: {}", err);
                failures += 1;
                continue;
            }
        };

        let stats = &planned.stats;
        println!(
            "Result: OK | waypoints={} distance={:.2}NM expanded={} branched={}",
            planned.waypoints.len(),
            planned.distance_nm,
            stats.expanded,
            stats.branched
        );

        let violations = find_obstacle_violations(&scenario.request, &planned);
        if violations.is_empty() {
            println!("Obstacle check: PASS");
        } else {
            println!("Obstacle check: FAIL ({})", violations.len());
            for violation in violations {
                println!(" - {}", violation);
            }
            failures += 1;
        }

        let direct = direct_distance_nm(&scenario.request);
        let detoured = planned.distance_nm > direct + 1e-6;
        if detoured == scenario.expect_detour {
            println!("Detour check: PASS (direct {:.2}NM)", direct);
        } else {
            println!(
                "Detour check: FAIL (expected detour={}, direct {:.2}NM)",
                scenario.expect_detour, direct
            );
            failures += 1;
        }
    }

    anyhow::ensure!(failures == 0, "{failures} scenario checks failed");
    Ok(())
}
