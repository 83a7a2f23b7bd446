//! One simulated day.
//!
//! Every decision reads the frozen snapshot of the previous day and every
//! write lands in the next-day buffer, so a node's fate depends only on
//! yesterday's states of itself and its neighbours.
//!
//! Per-state rules:
//!
//! - `Exposed`: one more day of exposure. On reaching the incubation period
//!   the node turns `Infectious`, which counts as one case for its community.
//! - `Infectious`: each neighbour that was `Susceptible` yesterday is exposed
//!   with the day's infection rate. Then a mortality roll; only if the node
//!   survives it, a recovery roll.
//! - `Susceptible`, `Recovered`, `Dead`: nothing on their own.
//!
//! Each node draws its own fate from a stream keyed by `(seed, day, node)`,
//! and each exposure roll from a stream keyed by the contact pair. Neither
//! the order nodes are visited in nor the order a node's neighbours are
//! listed in changes the outcome, so two graphs with the same edge set
//! behave the same under one seed.

use rand::Rng;
use seird_core::{DeterministicRng, SimulationParams};
use seird_graph::ContactGraph;
use tracing::trace;

use crate::state::{DayBuffers, HealthState, StateStore};

/// Rates in effect for one day.
///
/// [`advance_day`] treats every rate as a probability: values above 1 are
/// certain, values below 0 and NaN never fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayRates {
    /// Effective infection rate. May exceed 1 after enough mutations; draws
    /// treat anything above 1 as certain.
    pub infection: f64,
    pub recovery: f64,
    pub mortality: f64,
    pub incubation_period: u32,
}

impl DayRates {
    /// Fixed rates from `params` with the run's current infection rate.
    #[must_use]
    pub const fn new(params: &SimulationParams, infection: f64) -> Self {
        Self {
            infection,
            recovery: params.recovery_rate,
            mortality: params.mortality_rate,
            incubation_period: params.incubation_period,
        }
    }
}

/// Keys the per-node random streams for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStream {
    pub seed: u64,
    pub day: u64,
}

impl DayStream {
    #[must_use]
    pub const fn new(seed: u64, day: u64) -> Self {
        Self { seed, day }
    }

    #[must_use]
    pub fn node(self, node: usize) -> DeterministicRng {
        DeterministicRng::for_node(self.seed, self.day, node)
    }

    /// Stream for `infector`'s exposure roll against `neighbor`.
    #[must_use]
    pub fn contact(self, infector: usize, neighbor: usize) -> DeterministicRng {
        self.node(infector)
            .fork(u64::try_from(neighbor).unwrap_or(u64::MAX))
    }
}

/// What happened during one day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayOutcome {
    /// `Exposed → Infectious` transitions.
    pub new_cases: usize,
    pub deaths: usize,
    /// `new_cases` split by community index.
    pub cases_by_community: Vec<usize>,
}

/// Advance `store` by one day over `graph`.
///
/// Nodes past the end of `store` are ignored, as are neighbours the store
/// has no state for.
pub fn advance_day(
    graph: &ContactGraph,
    store: &mut StateStore,
    rates: &DayRates,
    stream: DayStream,
) -> DayOutcome {
    let infection = probability(rates.infection);
    let mortality = probability(rates.mortality);
    let recovery = probability(rates.recovery);
    let mut outcome = DayOutcome {
        cases_by_community: vec![0; graph.communities().len()],
        ..DayOutcome::default()
    };

    let DayBuffers {
        frozen,
        next,
        exposure_days,
    } = store.begin_day();
    for (node, &state) in frozen.iter().enumerate() {
        match state {
            HealthState::Exposed => {
                let exposed_for = &mut exposure_days[node];
                *exposed_for += 1;
                if *exposed_for >= rates.incubation_period {
                    next[node] = HealthState::Infectious;
                    outcome.new_cases += 1;
                    if let Some(slot) = graph
                        .community_of(node)
                        .and_then(|c| outcome.cases_by_community.get_mut(c))
                    {
                        *slot += 1;
                    }
                }
            }
            HealthState::Infectious => {
                for neighbor in graph.neighbors(node) {
                    if frozen.get(neighbor) == Some(&HealthState::Susceptible)
                        && stream.contact(node, neighbor).gen_bool(infection)
                    {
                        next[neighbor] = HealthState::Exposed;
                    }
                }
                let mut rng = stream.node(node);
                if rng.gen_bool(mortality) {
                    next[node] = HealthState::Dead;
                    outcome.deaths += 1;
                } else if rng.gen_bool(recovery) {
                    next[node] = HealthState::Recovered;
                }
            }
            HealthState::Susceptible | HealthState::Recovered | HealthState::Dead => {}
        }
    }
    store.commit_day();

    trace!(
        day = stream.day,
        new_cases = outcome.new_cases,
        deaths = outcome.deaths,
        "advanced day"
    );
    outcome
}

fn probability(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}
