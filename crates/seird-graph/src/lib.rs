#![forbid(unsafe_code)]
//! seird-graph library.
//!
//! Builds the multi-community contact graph a run spreads over.
//!
//! ```text
//! [Community] + bridges + Topology
//!        ↓  build::ContactGraph::build()
//! ContactGraph (UnGraph, node weight = community index)
//!        ↓  stats::GraphStats::from_graph()
//! GraphStats (degrees, components, intra/bridge split, …)
//! ```
//!
//! # Conventions
//!
//! - **Errors**: construction returns `Result<_, seird_core::ConfigError>`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod attach;
pub mod build;
pub mod stats;

pub use build::{CommunityRange, ContactGraph};
pub use stats::{CommunityStats, GraphStats};
