//! Detour CLI - command line tools for the detour route planner.
//!
//! This crate provides two binaries:
//! - detour-plan: plan one scenario file or built-in layout
//! - detour-scenarios: run every built-in layout and check the results

pub mod config;
pub mod logging;
pub mod report;
pub mod scenario;

pub use config::CliConfig;
pub use logging::init_tracing;
pub use scenario::{builtin_scenarios, find_builtin, load_scenario, Scenario};
