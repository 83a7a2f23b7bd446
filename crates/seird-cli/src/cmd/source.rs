//! Scenario selection flags shared by every simulating command.
//!
//! A scenario comes from a preset `--region` or a TOML `--config` file
//! (never both); the remaining flags override whatever that source set.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use seird_core::{Region, Scenario, Topology, load_scenario};
use tracing::debug;

/// Preset community tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RegionArg {
    Bc,
    Vancouver,
    VancouverFull,
}

impl From<RegionArg> for Region {
    fn from(arg: RegionArg) -> Self {
        match arg {
            RegionArg::Bc => Self::Bc,
            RegionArg::Vancouver => Self::Vancouver,
            RegionArg::VancouverFull => Self::VancouverFull,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TopologyArg {
    Chain,
    Ring,
}

impl From<TopologyArg> for Topology {
    fn from(arg: TopologyArg) -> Self {
        match arg {
            TopologyArg::Chain => Self::Chain,
            TopologyArg::Ring => Self::Ring,
        }
    }
}

/// Where the scenario comes from, plus per-run overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Preset community table (default: vancouver).
    #[arg(long, value_enum, conflicts_with = "config")]
    pub region: Option<RegionArg>,

    /// TOML scenario file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of weeks to simulate.
    #[arg(long)]
    pub weeks: Option<u32>,

    /// RNG seed. Drawn from OS entropy and reported when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Nodes exposed at the start of the run.
    #[arg(long)]
    pub initial_infected: Option<usize>,

    /// Bridge edges between each bridged pair of communities.
    #[arg(long)]
    pub inter_region_edges: Option<usize>,

    /// How communities are bridged.
    #[arg(long, value_enum)]
    pub topology: Option<TopologyArg>,
}

impl SourceArgs {
    /// Load the base scenario and apply the override flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the resulting
    /// scenario fails validation.
    pub fn resolve(&self) -> Result<Scenario> {
        let mut scenario = match &self.config {
            Some(path) => load_scenario(path)
                .with_context(|| format!("loading scenario {}", path.display()))?,
            None => Scenario::from_region(self.region.map_or(Region::Vancouver, Region::from)),
        };

        let params = &mut scenario.params;
        if let Some(weeks) = self.weeks {
            params.total_weeks = weeks;
        }
        if let Some(seed) = self.seed {
            params.seed = Some(seed);
        }
        if let Some(initial) = self.initial_infected {
            params.initial_infected = initial;
        }
        if let Some(bridges) = self.inter_region_edges {
            params.inter_region_edge_count = bridges;
        }
        if let Some(topology) = self.topology {
            params.topology = topology.into();
        }

        scenario.validate().context("invalid scenario")?;
        debug!(
            communities = scenario.communities.len(),
            weeks = scenario.params.total_weeks,
            "resolved scenario"
        );
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seird_core::ConfigError;
    use std::io::Write;

    #[test]
    fn defaults_to_vancouver() {
        let scenario = SourceArgs::default().resolve().expect("scenario");
        assert_eq!(scenario.communities, Region::Vancouver.communities());
        assert_eq!(scenario.params.inter_region_edge_count, 55);
    }

    #[test]
    fn flags_override_preset() {
        let args = SourceArgs {
            region: Some(RegionArg::Bc),
            weeks: Some(3),
            seed: Some(5),
            initial_infected: Some(7),
            inter_region_edges: Some(2),
            topology: Some(TopologyArg::Ring),
            ..SourceArgs::default()
        };
        let scenario = args.resolve().expect("scenario");
        assert_eq!(scenario.communities.len(), Region::Bc.community_count());
        assert_eq!(scenario.params.total_weeks, 3);
        assert_eq!(scenario.params.seed, Some(5));
        assert_eq!(scenario.params.initial_infected, 7);
        assert_eq!(scenario.params.inter_region_edge_count, 2);
        assert_eq!(scenario.params.topology, Topology::Ring);
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "region = \"vancouver\"\n[simulation]\ntotal_weeks = 9\nseed = 1")
            .expect("write");
        let args = SourceArgs {
            config: Some(file.path().to_path_buf()),
            seed: Some(2),
            ..SourceArgs::default()
        };
        let scenario = args.resolve().expect("scenario");
        assert_eq!(scenario.params.total_weeks, 9);
        assert_eq!(scenario.params.seed, Some(2));
    }

    #[test]
    fn invalid_override_keeps_typed_error() {
        let args = SourceArgs {
            weeks: Some(0),
            ..SourceArgs::default()
        };
        let err = args.resolve().unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::ZeroWeeks));
    }
}
