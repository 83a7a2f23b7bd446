use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, check_probability};
use crate::presets::VANCOUVER_INTER_REGION_EDGES;

pub const DEFAULT_INFECTION_RATE: f64 = 0.15;
pub const DEFAULT_RECOVERY_RATE: f64 = 0.9;
pub const DEFAULT_MORTALITY_RATE: f64 = 0.01;
pub const DEFAULT_INCUBATION_PERIOD: u32 = 5;
pub const DEFAULT_MUTATION_WEEKS: [u32; 2] = [48, 96];
pub const DEFAULT_MUTATION_MULTIPLIER: f64 = 1.2;
/// Three simulated years.
pub const DEFAULT_TOTAL_WEEKS: u32 = 156;
pub const DEFAULT_INITIAL_INFECTED: usize = 20;

/// How communities are bridged to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Community `i` is bridged to `i + 1` only.
    #[default]
    Chain,
    /// Chain plus a bridge from the last community back to the first.
    Ring,
}

impl Topology {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chain => "chain",
            Self::Ring => "ring",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topology {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chain" => Ok(Self::Chain),
            "ring" => Ok(Self::Ring),
            other => Err(ConfigError::Parse {
                origin: "topology".to_string(),
                message: format!("expected `chain` or `ring`, got `{other}`"),
            }),
        }
    }
}

/// Everything a run needs besides the community table.
///
/// Only the run's effective infection rate changes once a run starts, and it
/// lives in the driver's run context, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Daily probability that an infectious node exposes a susceptible neighbour.
    pub initial_infection_rate: f64,
    /// Daily probability an infectious node recovers (checked after mortality).
    pub recovery_rate: f64,
    /// Daily probability an infectious node dies.
    pub mortality_rate: f64,
    /// Days of exposure before a node becomes infectious.
    pub incubation_period: u32,
    /// Zero-based week indices at which the infection rate is multiplied.
    pub mutation_weeks: Vec<u32>,
    /// Factor applied at each mutation week; compounds.
    pub mutation_multiplier: f64,
    /// Bridge edges added between each bridged pair of communities.
    ///
    /// Scenario files set this at the top level (`inter_region_edges`) so a
    /// region preset can supply its own default.
    #[serde(skip_deserializing)]
    pub inter_region_edge_count: usize,
    pub topology: Topology,
    pub total_weeks: u32,
    /// Size of the initial exposed set, sampled without replacement.
    pub initial_infected: usize,
    /// RNG seed; `None` draws one from OS entropy when the run starts.
    pub seed: Option<u64>,
    /// Keep a full per-node state copy in every week record.
    pub retain_snapshots: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            initial_infection_rate: DEFAULT_INFECTION_RATE,
            recovery_rate: DEFAULT_RECOVERY_RATE,
            mortality_rate: DEFAULT_MORTALITY_RATE,
            incubation_period: DEFAULT_INCUBATION_PERIOD,
            mutation_weeks: DEFAULT_MUTATION_WEEKS.to_vec(),
            mutation_multiplier: DEFAULT_MUTATION_MULTIPLIER,
            inter_region_edge_count: VANCOUVER_INTER_REGION_EDGES,
            topology: Topology::Chain,
            total_weeks: DEFAULT_TOTAL_WEEKS,
            initial_infected: DEFAULT_INITIAL_INFECTED,
            seed: None,
            retain_snapshots: true,
        }
    }
}

impl SimulationParams {
    /// Validate everything that does not depend on the graph.
    ///
    /// # Errors
    ///
    /// Returns the first failing check: rates outside `[0, 1]`, a zero
    /// incubation period, a non-positive or non-finite multiplier, or zero
    /// total weeks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("initial_infection_rate", self.initial_infection_rate)?;
        check_probability("recovery_rate", self.recovery_rate)?;
        check_probability("mortality_rate", self.mortality_rate)?;
        if self.incubation_period == 0 {
            return Err(ConfigError::ZeroIncubation);
        }
        if !self.mutation_multiplier.is_finite() || self.mutation_multiplier <= 0.0 {
            return Err(ConfigError::InvalidMultiplier {
                value: self.mutation_multiplier,
            });
        }
        if self.total_weeks == 0 {
            return Err(ConfigError::ZeroWeeks);
        }
        Ok(())
    }

    /// Validate, then check the initial-infected sample fits the graph.
    ///
    /// # Errors
    ///
    /// Everything [`validate`](Self::validate) rejects, plus
    /// [`ConfigError::TooManyInitialInfected`].
    pub fn validate_for(&self, node_count: usize) -> Result<(), ConfigError> {
        self.validate()?;
        if self.initial_infected > node_count {
            return Err(ConfigError::TooManyInitialInfected {
                requested: self.initial_infected,
                node_count,
            });
        }
        Ok(())
    }

    /// The mutation schedule with duplicates removed.
    #[must_use]
    pub fn mutation_schedule(&self) -> BTreeSet<u32> {
        self.mutation_weeks.iter().copied().collect()
    }

    /// Infection rate in effect during week `week` (zero-based).
    ///
    /// Equals `initial_infection_rate * mutation_multiplier^k` where `k` is
    /// the number of distinct scheduled weeks `<= week`.
    #[must_use]
    pub fn rate_for_week(&self, week: u32) -> f64 {
        let applied = self.mutation_schedule().range(..=week).count();
        let exponent = i32::try_from(applied).unwrap_or(i32::MAX);
        self.initial_infection_rate * self.mutation_multiplier.powi(exponent)
    }
}
