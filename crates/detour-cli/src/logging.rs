//! Tracing setup shared by the CLI binaries.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global subscriber writing to stderr so stdout stays clean for reports.
///
/// `RUST_LOG` wins when set; otherwise everything logs at info and `verbose`
/// raises the planner to debug.
pub fn init_tracing(verbose: bool, json: bool) -> anyhow::Result<()> {
    let default_directives = if verbose {
        "info,detour_core=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .try_init()?;
    Ok(())
}
