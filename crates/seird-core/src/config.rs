//! Scenario files.
//!
//! A scenario names a preset region or lists its own communities, and may
//! override any simulation parameter:
//!
//! ```toml
//! region = "vancouver"
//! inter_region_edges = 11
//!
//! [simulation]
//! total_weeks = 52
//! seed = 7
//! mutation_weeks = [10, 20]
//! ```
//!
//! Missing `[simulation]` fields fall back to [`SimulationParams::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::community::{Community, validate_communities};
use crate::error::ConfigError;
use crate::params::SimulationParams;
use crate::presets::Region;

/// Raw scenario file contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub communities: Vec<Community>,
    /// Bridge edges per bridged pair. Defaults to the region's own count.
    #[serde(default)]
    pub inter_region_edges: Option<usize>,
    #[serde(default)]
    pub simulation: SimulationParams,
}

/// A resolved community table plus parameters, ready to build and run.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub communities: Vec<Community>,
    pub params: SimulationParams,
}

impl Scenario {
    /// The preset table for `region` with default parameters.
    #[must_use]
    pub fn from_region(region: Region) -> Self {
        let params = SimulationParams {
            inter_region_edge_count: region.inter_region_edge_count(),
            ..SimulationParams::default()
        };
        Self {
            communities: region.communities(),
            params,
        }
    }

    /// Validate the community table and the graph-independent parameters.
    ///
    /// # Errors
    ///
    /// See [`validate_communities`] and [`SimulationParams::validate`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_communities(&self.communities)?;
        self.params.validate()
    }
}

impl ScenarioConfig {
    /// Parse scenario TOML. `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or mistyped fields.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Self>(content).map_err(|e| ConfigError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Turn the file contents into a runnable [`Scenario`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AmbiguousScenario`] unless exactly one of
    /// `region` / `communities` is set, or any validation failure.
    pub fn resolve(self) -> Result<Scenario, ConfigError> {
        let (communities, preset_bridges) = match (self.region, self.communities.is_empty()) {
            (Some(region), true) => (region.communities(), Some(region.inter_region_edge_count())),
            (None, false) => (self.communities, None),
            _ => return Err(ConfigError::AmbiguousScenario),
        };

        let mut params = self.simulation;
        if let Some(bridges) = self.inter_region_edges.or(preset_bridges) {
            params.inter_region_edge_count = bridges;
        }

        let scenario = Scenario {
            communities,
            params,
        };
        scenario.validate()?;
        Ok(scenario)
    }
}

/// Read, parse and resolve a scenario file.
///
/// # Errors
///
/// [`ConfigError::Read`] if the file cannot be read, otherwise anything
/// [`ScenarioConfig::from_toml_str`] or [`ScenarioConfig::resolve`] returns.
pub fn load_scenario(path: &Path) -> Result<Scenario, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let scenario = ScenarioConfig::from_toml_str(&content, &path.display().to_string())?.resolve()?;
    debug!(
        path = %path.display(),
        communities = scenario.communities.len(),
        "loaded scenario"
    );
    Ok(scenario)
}
