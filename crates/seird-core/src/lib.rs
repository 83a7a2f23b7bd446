#![forbid(unsafe_code)]
//! seird-core library.
//!
//! Shared vocabulary for the other seird crates: community tables,
//! simulation parameters, scenario files, typed configuration errors and the
//! seeded RNG every run draws from.
//!
//! # Conventions
//!
//! - **Errors**: library entry points return `Result<_, ConfigError>`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod community;
pub mod config;
pub mod error;
pub mod params;
pub mod presets;
pub mod rng;

pub use community::{Community, total_population, validate_communities};
pub use config::{Scenario, ScenarioConfig, load_scenario};
pub use error::ConfigError;
pub use params::{SimulationParams, Topology};
pub use presets::Region;
pub use rng::DeterministicRng;
