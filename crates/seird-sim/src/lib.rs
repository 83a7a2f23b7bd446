#![forbid(unsafe_code)]
//! seird-sim library.
//!
//! Discrete-time SEIRD epidemics over a [`seird_graph::ContactGraph`].
//!
//! - [`state`]: per-node health state and exposure counters, double-buffered.
//! - [`engine`]: one simulated day.
//! - [`driver`]: weeks, mutation schedule and the weekly report.
//! - [`ledger`]: cumulative cases per community.
//! - [`oracle`] / [`campaign`]: report invariants and multi-seed runs.
//!
//! # Conventions
//!
//! - **Errors**: simulation setup returns `Result<_, seird_core::ConfigError>`;
//!   campaigns use `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod campaign;
pub mod driver;
pub mod engine;
pub mod ledger;
pub mod oracle;
pub mod state;

pub use driver::{Simulation, SimulationReport, WeekRecord, build_graph, run_scenario};
pub use engine::{DayOutcome, DayRates, DayStream, advance_day};
pub use ledger::{CaseLedger, CommunityCases};
pub use oracle::{OracleResult, ReportOracle, check_report};
pub use state::{HealthState, StateCounts, StateStore};
