//! Runs day steps in weeks, applies mutations and keeps the weekly report.
//!
//! # Timeline
//!
//! Day `d` (zero-based) belongs to week `d / 7`. At the start of each week
//! `w` listed in the mutation schedule the run's infection rate is multiplied
//! by the mutation multiplier; the change is permanent, so scheduled weeks
//! compound. When the seventh day of a week finishes, a [`WeekRecord`] is
//! appended.
//!
//! Cumulative cases start at the number of initially infected nodes and grow
//! by every `Exposed → Infectious` transition, including those of the
//! initially exposed nodes.

use std::collections::BTreeSet;
use std::mem;

use seird_core::rng::{GRAPH_STREAM, SEEDING_STREAM, entropy_seed};
use seird_core::{ConfigError, DeterministicRng, Scenario, SimulationParams};
use seird_graph::ContactGraph;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::engine::{DayOutcome, DayRates, DayStream, advance_day};
use crate::ledger::CaseLedger;
use crate::state::{HealthState, StateCounts, StateStore};

pub const DAYS_PER_WEEK: u64 = 7;

/// One completed simulated week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRecord {
    /// Zero-based week index.
    pub week: u32,
    pub new_cases: usize,
    pub deaths: usize,
    pub cumulative_cases: usize,
    /// Infection rate in effect for the whole week.
    pub infection_rate: f64,
    /// State counts at week end.
    pub counts: StateCounts,
    /// Every node's state at week end, when snapshots are retained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Vec<HealthState>>,
}

/// Everything a finished (or stopped) run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Seed the run used; pass it back to replay the run exactly.
    pub seed: u64,
    pub graph_hash: String,
    pub node_count: usize,
    pub initial_infected: usize,
    /// Days simulated. A multiple of 7 unless the run stopped mid-week.
    pub days: u64,
    /// Cumulative cases after the last simulated day.
    pub cumulative_cases: usize,
    pub final_infection_rate: f64,
    pub initial_counts: StateCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_snapshot: Option<Vec<HealthState>>,
    pub weeks: Vec<WeekRecord>,
    pub ledger: CaseLedger,
    pub final_counts: StateCounts,
}

impl SimulationReport {
    /// New cases summed over completed weeks.
    #[must_use]
    pub fn total_new_cases(&self) -> usize {
        self.weeks.iter().map(|w| w.new_cases).sum()
    }

    #[must_use]
    pub fn total_deaths(&self) -> usize {
        self.weeks.iter().map(|w| w.deaths).sum()
    }

    /// Week with the most new cases; the earliest wins a tie.
    #[must_use]
    pub fn peak_week(&self) -> Option<&WeekRecord> {
        self.weeks
            .iter()
            .fold(None, |best: Option<&WeekRecord>, week| match best {
                Some(b) if b.new_cases >= week.new_cases => Some(b),
                _ => Some(week),
            })
    }
}

/// One run over a borrowed contact graph.
///
/// Holds the run context: the effective infection rate, the day counter,
/// the case ledger and the seed all per-node streams derive from.
#[derive(Debug)]
pub struct Simulation<'g> {
    graph: &'g ContactGraph,
    params: SimulationParams,
    seed: u64,
    mutations: BTreeSet<u32>,
    store: StateStore,
    effective_infection_rate: f64,
    day: u64,
    week_new_cases: usize,
    week_deaths: usize,
    initial_infected: usize,
    cumulative_cases: usize,
    initial_counts: StateCounts,
    initial_snapshot: Option<Vec<HealthState>>,
    ledger: CaseLedger,
    weeks: Vec<WeekRecord>,
}

impl<'g> Simulation<'g> {
    /// Validate `params` against `graph` and seed the initial exposed set.
    ///
    /// Without `params.seed` a seed is drawn from OS entropy; either way
    /// [`seed`](Self::seed) reports the one in use.
    ///
    /// # Errors
    ///
    /// Everything [`SimulationParams::validate_for`] rejects.
    #[instrument(skip(graph, params), fields(nodes = graph.node_count()))]
    pub fn new(graph: &'g ContactGraph, params: SimulationParams) -> Result<Self, ConfigError> {
        params.validate_for(graph.node_count())?;
        let seed = params.seed.unwrap_or_else(entropy_seed);
        let mut rng = DeterministicRng::new(seed).fork(SEEDING_STREAM);
        let store = StateStore::seeded(graph.node_count(), params.initial_infected, &mut rng)?;
        let initial_infected = params.initial_infected;
        Ok(Self::assemble(graph, params, seed, store, initial_infected))
    }

    /// Start from explicit node states instead of a sampled exposed set.
    ///
    /// `params.initial_infected` is ignored; every node that is not
    /// `Susceptible` counts as initially infected.
    ///
    /// # Errors
    ///
    /// [`ConfigError::StateCountMismatch`] if `store` does not cover the
    /// graph, plus everything [`SimulationParams::validate`] rejects.
    pub fn from_store(
        graph: &'g ContactGraph,
        params: SimulationParams,
        store: StateStore,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        if store.len() != graph.node_count() {
            return Err(ConfigError::StateCountMismatch {
                states: store.len(),
                node_count: graph.node_count(),
            });
        }
        let seed = params.seed.unwrap_or_else(entropy_seed);
        let initial_infected = store.counts().ever_infected();
        Ok(Self::assemble(graph, params, seed, store, initial_infected))
    }

    fn assemble(
        graph: &'g ContactGraph,
        params: SimulationParams,
        seed: u64,
        store: StateStore,
        initial_infected: usize,
    ) -> Self {
        let initial_snapshot = params.retain_snapshots.then(|| store.states().to_vec());
        info!(
            seed,
            nodes = graph.node_count(),
            initial_infected,
            weeks = params.total_weeks,
            "simulation ready"
        );
        Self {
            graph,
            mutations: params.mutation_schedule(),
            effective_infection_rate: params.initial_infection_rate,
            initial_counts: store.counts(),
            ledger: CaseLedger::for_graph(graph),
            params,
            seed,
            store,
            day: 0,
            week_new_cases: 0,
            week_deaths: 0,
            initial_infected,
            cumulative_cases: initial_infected,
            initial_snapshot,
            weeks: Vec::new(),
        }
    }

    /// Run the remaining days of `total_weeks` and return the report.
    #[instrument(skip(self), fields(seed = self.seed))]
    pub fn run(mut self) -> SimulationReport {
        let target = u64::from(self.params.total_weeks) * DAYS_PER_WEEK;
        while self.day < target {
            self.step_day();
        }
        info!(
            weeks = self.weeks.len(),
            cumulative_cases = self.cumulative_cases,
            dead = self.store.counts().dead,
            "run complete"
        );
        self.into_report()
    }

    /// Advance to the end of the current week and return its record.
    pub fn step_week(&mut self) -> &WeekRecord {
        let index = self.weeks.len();
        loop {
            self.step_day();
            if self.day % DAYS_PER_WEEK == 0 {
                break;
            }
        }
        &self.weeks[index]
    }

    /// Advance one day.
    ///
    /// Applies a scheduled mutation first when the day opens a week, and
    /// closes the week's record when the day ends one.
    pub fn step_day(&mut self) -> DayOutcome {
        if self.day % DAYS_PER_WEEK == 0 {
            self.begin_week();
        }

        let rates = DayRates::new(&self.params, self.effective_infection_rate);
        let outcome = advance_day(
            self.graph,
            &mut self.store,
            &rates,
            DayStream::new(self.seed, self.day),
        );
        self.ledger.record(&outcome.cases_by_community);
        self.week_new_cases += outcome.new_cases;
        self.week_deaths += outcome.deaths;
        self.cumulative_cases += outcome.new_cases;
        self.day += 1;

        if self.day % DAYS_PER_WEEK == 0 {
            self.close_week();
        }
        outcome
    }

    /// Advance until `day` days have been simulated.
    ///
    /// Does nothing if the run is already past `day`.
    pub fn run_until_day(&mut self, day: u64) -> &CaseLedger {
        while self.day < day {
            self.step_day();
        }
        &self.ledger
    }

    /// Stop here and produce the report for the days simulated so far.
    #[must_use]
    pub fn into_report(self) -> SimulationReport {
        SimulationReport {
            seed: self.seed,
            graph_hash: self.graph.content_hash().to_string(),
            node_count: self.graph.node_count(),
            initial_infected: self.initial_infected,
            days: self.day,
            cumulative_cases: self.cumulative_cases,
            final_infection_rate: self.effective_infection_rate,
            initial_counts: self.initial_counts,
            initial_snapshot: self.initial_snapshot,
            weeks: self.weeks,
            final_counts: self.store.counts(),
            ledger: self.ledger,
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Days simulated so far.
    #[must_use]
    pub const fn day(&self) -> u64 {
        self.day
    }

    /// Zero-based index of the week the next day belongs to.
    #[must_use]
    pub fn week(&self) -> u32 {
        u32::try_from(self.day / DAYS_PER_WEEK).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub const fn effective_infection_rate(&self) -> f64 {
        self.effective_infection_rate
    }

    #[must_use]
    pub const fn cumulative_cases(&self) -> usize {
        self.cumulative_cases
    }

    #[must_use]
    pub const fn store(&self) -> &StateStore {
        &self.store
    }

    #[must_use]
    pub const fn ledger(&self) -> &CaseLedger {
        &self.ledger
    }

    #[must_use]
    pub fn weeks(&self) -> &[WeekRecord] {
        &self.weeks
    }

    #[must_use]
    pub const fn graph(&self) -> &'g ContactGraph {
        self.graph
    }

    fn begin_week(&mut self) {
        let week = self.week();
        if self.mutations.contains(&week) {
            self.effective_infection_rate *= self.params.mutation_multiplier;
            info!(
                week,
                rate = self.effective_infection_rate,
                "mutation raised infection rate"
            );
        }
    }

    fn close_week(&mut self) {
        let week = self.week().saturating_sub(1);
        let record = WeekRecord {
            week,
            new_cases: mem::take(&mut self.week_new_cases),
            deaths: mem::take(&mut self.week_deaths),
            cumulative_cases: self.cumulative_cases,
            infection_rate: self.effective_infection_rate,
            counts: self.store.counts(),
            snapshot: self
                .params
                .retain_snapshots
                .then(|| self.store.states().to_vec()),
        };
        debug!(
            week,
            new_cases = record.new_cases,
            deaths = record.deaths,
            cumulative_cases = record.cumulative_cases,
            "week complete"
        );
        self.weeks.push(record);
    }
}

/// Resolve the scenario's seed, drawing one from OS entropy if unset.
#[must_use]
pub fn resolve_seed(params: &SimulationParams) -> u64 {
    params.seed.unwrap_or_else(entropy_seed)
}

/// Build the scenario's contact graph from the graph stream of `seed`.
///
/// # Errors
///
/// Whatever [`ContactGraph::build`] rejects.
pub fn build_graph(scenario: &Scenario, seed: u64) -> Result<ContactGraph, ConfigError> {
    let mut rng = DeterministicRng::new(seed).fork(GRAPH_STREAM);
    ContactGraph::build(
        &scenario.communities,
        scenario.params.inter_region_edge_count,
        scenario.params.topology,
        &mut rng,
    )
}

/// Build the graph and run the whole scenario under one seed.
///
/// # Errors
///
/// Any validation failure from graph construction or [`Simulation::new`].
pub fn run_scenario(scenario: &Scenario) -> Result<SimulationReport, ConfigError> {
    let seed = resolve_seed(&scenario.params);
    let graph = build_graph(scenario, seed)?;
    let params = SimulationParams {
        seed: Some(seed),
        ..scenario.params.clone()
    };
    Ok(Simulation::new(&graph, params)?.run())
}
