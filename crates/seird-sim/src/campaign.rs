//! Multi-seed sweeps of one scenario.
//!
//! Runs one scenario under many seeds, checks every report with the
//! [`ReportOracle`], and summarises the spread of outcomes. Each seed builds
//! its own graph, so a campaign samples both network and epidemic variation.

use std::ops::Range;

use anyhow::{Context, Result, bail};
use seird_core::{Scenario, SimulationParams};
use seird_graph::ContactGraph;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::driver::{DAYS_PER_WEEK, Simulation, SimulationReport, build_graph};
use crate::oracle::{OracleResult, ReportOracle, format_violation};

/// Which seeds to run and what to run under them.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignConfig {
    /// Half-open, so `0..100` runs seeds 0 through 99.
    pub seed_range: Range<u64>,
    pub scenario: Scenario,
}

impl CampaignConfig {
    /// Reject an empty sweep or a scenario that would fail to build.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed range is empty or the scenario is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.seed_range.is_empty() {
            bail!("seed_range must not be empty");
        }
        self.scenario.validate().context("invalid campaign scenario")?;
        Ok(())
    }

    /// Parameters for one seed. Snapshots are always kept so transitions
    /// can be checked.
    #[must_use]
    pub fn params_for_seed(&self, seed: u64) -> SimulationParams {
        SimulationParams {
            seed: Some(seed),
            retain_snapshots: true,
            ..self.scenario.params.clone()
        }
    }
}

/// Headline numbers for one seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub seed: u64,
    pub graph_hash: String,
    pub cumulative_cases: usize,
    pub deaths: usize,
    /// Zero-based week with the most new cases.
    pub peak_week: Option<u32>,
    pub peak_new_cases: usize,
}

impl SeedSummary {
    fn from_report(report: &SimulationReport) -> Self {
        let peak = report.peak_week();
        Self {
            seed: report.seed,
            graph_hash: report.graph_hash.clone(),
            cumulative_cases: report.cumulative_cases,
            deaths: report.final_counts.dead,
            peak_week: peak.map(|w| w.week),
            peak_new_cases: peak.map_or(0, |w| w.new_cases),
        }
    }
}

/// A seed whose report broke at least one invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFailure {
    pub seed: u64,
    /// One line per violation, as rendered by [`format_violation`].
    pub violations: Vec<String>,
}

/// Pass/fail tally plus outcome spread over every seed in the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub seeds_run: usize,
    pub seeds_passed: usize,
    /// Lowest failing seed; replay this one first.
    pub first_failure: Option<u64>,
    pub failures: Vec<SeedFailure>,
    pub summaries: Vec<SeedSummary>,
    pub mean_cumulative_cases: f64,
    pub mean_deaths: f64,
    pub min_cumulative_cases: usize,
    pub max_cumulative_cases: usize,
}

impl CampaignReport {
    /// No seed broke an invariant.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run and check every seed in `config.seed_range`, in order.
///
/// # Errors
///
/// Returns an error if config validation fails or a seed cannot be set up.
/// Invariant violations are reported in the [`CampaignReport`], not as
/// errors.
#[instrument(skip(config), fields(seeds = ?config.seed_range))]
pub fn run_campaign(config: &CampaignConfig) -> Result<CampaignReport> {
    config.validate()?;

    let mut summaries = Vec::new();
    let mut failures = Vec::new();

    for seed in config.seed_range.clone() {
        let (summary, oracle) = run_single_seed(seed, config)?;
        debug!(
            seed,
            cumulative_cases = summary.cumulative_cases,
            deaths = summary.deaths,
            passed = oracle.passed,
            "seed done"
        );
        if !oracle.passed {
            warn!(seed, violations = oracle.violations.len(), "seed broke invariants");
            failures.push(SeedFailure {
                seed,
                violations: oracle.violations.iter().map(format_violation).collect(),
            });
        }
        summaries.push(summary);
    }

    let report = aggregate(summaries, failures);
    info!(
        seeds_run = report.seeds_run,
        seeds_passed = report.seeds_passed,
        mean_cumulative_cases = report.mean_cumulative_cases,
        "sweep finished"
    );
    Ok(report)
}

/// Run one seed and check its report.
///
/// Besides the report-level checks, every simulated day is checked with
/// [`ReportOracle::check_day`] against the state of the day before.
///
/// # Errors
///
/// Returns an error if the graph or simulation cannot be constructed.
pub fn run_single_seed(seed: u64, config: &CampaignConfig) -> Result<(SeedSummary, OracleResult)> {
    let graph = seed_graph(seed, config)?;
    let mut simulation = seed_simulation(&graph, seed, config)?;
    let target = u64::from(config.scenario.params.total_weeks) * DAYS_PER_WEEK;

    let mut steps = OracleResult::default();
    let mut before = simulation.store().states().to_vec();
    while simulation.day() < target {
        let day = simulation.day();
        simulation.step_day();
        let after = simulation.store().states();
        steps = steps.merge(ReportOracle::check_day(day, &before, after));
        before.copy_from_slice(after);
    }

    let report = simulation.into_report();
    let oracle = steps.merge(ReportOracle::check_all(&report, report.node_count));
    Ok((SeedSummary::from_report(&report), oracle))
}

/// Re-run a single seed and return its full report, snapshots included.
///
/// # Errors
///
/// Returns an error if the graph or simulation cannot be constructed.
pub fn replay_seed(seed: u64, config: &CampaignConfig) -> Result<SimulationReport> {
    let graph = seed_graph(seed, config)?;
    Ok(seed_simulation(&graph, seed, config)?.run())
}

fn seed_graph(seed: u64, config: &CampaignConfig) -> Result<ContactGraph> {
    build_graph(&config.scenario, seed).with_context(|| format!("building graph for seed {seed}"))
}

fn seed_simulation<'g>(
    graph: &'g ContactGraph,
    seed: u64,
    config: &CampaignConfig,
) -> Result<Simulation<'g>> {
    Simulation::new(graph, config.params_for_seed(seed))
        .with_context(|| format!("setting up seed {seed}"))
}

#[allow(clippy::cast_precision_loss)]
fn aggregate(summaries: Vec<SeedSummary>, failures: Vec<SeedFailure>) -> CampaignReport {
    let seeds_run = summaries.len();
    let seeds_passed = seeds_run - failures.len();
    let first_failure = failures.first().map(|f| f.seed);
    let (case_sum, death_sum) = summaries
        .iter()
        .fold((0_usize, 0_usize), |(cases, deaths), s| {
            (cases + s.cumulative_cases, deaths + s.deaths)
        });
    let mean = |sum: usize| {
        if seeds_run == 0 {
            0.0
        } else {
            sum as f64 / seeds_run as f64
        }
    };

    CampaignReport {
        seeds_run,
        seeds_passed,
        first_failure,
        failures,
        mean_cumulative_cases: mean(case_sum),
        mean_deaths: mean(death_sum),
        min_cumulative_cases: summaries.iter().map(|s| s.cumulative_cases).min().unwrap_or(0),
        max_cumulative_cases: summaries.iter().map(|s| s.cumulative_cases).max().unwrap_or(0),
        summaries,
    }
}
