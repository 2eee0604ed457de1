//! CLI tool to plan an obstacle-avoiding route.
//!
//! Reads a JSON scenario (or picks a built-in layout), runs the planner and
//! prints the route as a table or as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use detour_cli::report::{direct_distance_nm, render_summary};
use detour_cli::scenario::DEFAULT_CENTER;
use detour_cli::{find_builtin, init_tracing, load_scenario, CliConfig};
use detour_core::{GeoPoint, OptimizationPriority, Planner, TracingObserver, UniformWind};

/// Plan a route around polygonal obstacles
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON scenario file (a plan request)
    #[arg(long, conflicts_with = "builtin")]
    scenario: Option<PathBuf>,

    /// Built-in layout: single_square, series, offset_pair, clear
    #[arg(long, default_value = "single_square")]
    builtin: String,

    /// Centre latitude for built-in layouts
    #[arg(long, default_value_t = DEFAULT_CENTER.lat)]
    lat: f64,

    /// Centre longitude for built-in layouts
    #[arg(long, default_value_t = DEFAULT_CENTER.lon)]
    lon: f64,

    /// Optimise for distance or time (overrides DETOUR_PRIORITY)
    #[arg(long)]
    priority: Option<OptimizationPriority>,

    /// Average spacing of the initial straight-route waypoints in NM
    #[arg(long)]
    spacing_nm: Option<f64>,

    /// Give up once this many candidate routes are pending
    #[arg(long)]
    max_open_routes: Option<usize>,

    /// Uniform eastward wind in knots
    #[arg(long, default_value_t = 0.0)]
    wind_u: f64,

    /// Uniform northward wind in knots
    #[arg(long, default_value_t = 0.0)]
    wind_v: f64,

    /// Print the planned route as JSON
    #[arg(long)]
    json: bool,

    /// Log every search step
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, false)?;

    let mut config = CliConfig::from_env().planner_config();
    if let Some(priority) = args.priority {
        config.priority = priority;
    }
    if let Some(spacing) = args.spacing_nm {
        config.waypoint_spacing_nm = spacing;
    }
    if let Some(cap) = args.max_open_routes {
        config.max_open_routes = cap;
    }

    let request = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => {
            let center = GeoPoint::new(args.lat, args.lon);
            find_builtin(&args.builtin, center)
                .with_context(|| format!("unknown built-in scenario '{}'", args.builtin))?
                .request
        }
    };

    tracing::info!(
        obstacles = request.obstacles.len(),
        priority = %config.priority,
        spacing_nm = config.waypoint_spacing_nm,
        "planning route"
    );
    let mut planner = Planner::new(config);
    if args.wind_u != 0.0 || args.wind_v != 0.0 {
        planner = planner.with_wind(UniformWind::new(args.wind_u, args.wind_v));
    }

    let planned = if args.verbose {
        planner.plan_observed(&request, &mut TracingObserver)?
    } else {
        planner.plan(&request)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&planned)?);
    } else {
        println!(
            "Direct: {:.2}NM over {} obstacles",
            direct_distance_nm(&request),
            request.obstacles.len()
        );
        print!("{}", render_summary(&planned));
    }
    Ok(())
}
