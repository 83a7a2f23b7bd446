//! `seird run`: simulate a scenario and print the weekly report.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use seird_sim::{HealthState, SimulationReport, StateCounts, run_scenario};

use crate::cmd::source::SourceArgs;
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

/// Arguments for `seird run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Include every node's state at each week end in JSON output.
    #[arg(long)]
    pub snapshots: bool,
}

/// Execute `seird run`.
pub fn run_run(args: &RunArgs, output: OutputMode) -> Result<()> {
    let mut scenario = args.source.resolve()?;
    scenario.params.retain_snapshots = args.snapshots;

    let report = run_scenario(&scenario).context("running scenario")?;
    render_mode(output, &report, render_text, render_pretty)
}

/// The classic weekly line, with weeks numbered from 1.
#[must_use]
pub fn week_line(week: u32, new_cases: usize, cumulative: usize, deaths: usize) -> String {
    format!(
        "Week {}: New Cases = {new_cases}, Cumulative Cases = {cumulative}, Deaths = {deaths}",
        u64::from(week) + 1
    )
}

fn counts_line(counts: &StateCounts) -> String {
    HealthState::ALL
        .iter()
        .map(|&state| format!("{}={}", state.code(), counts.get(state)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_text(report: &SimulationReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "run seed={} nodes={} initial_infected={} graph={}",
        report.seed, report.node_count, report.initial_infected, report.graph_hash
    )?;
    for week in &report.weeks {
        writeln!(
            w,
            "{}",
            week_line(week.week, week.new_cases, week.cumulative_cases, week.deaths)
        )?;
    }
    writeln!(w, "final {}", counts_line(&report.final_counts))?;
    for (community, cases) in report.ledger.iter() {
        writeln!(w, "ledger cases={cases} community={community}")?;
    }
    Ok(())
}

fn render_pretty(report: &SimulationReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Simulation")?;
    pretty_kv(w, "Seed", report.seed.to_string())?;
    pretty_kv(w, "Nodes", report.node_count.to_string())?;
    pretty_kv(w, "Graph", &report.graph_hash)?;
    pretty_kv(w, "Weeks", report.weeks.len().to_string())?;
    pretty_kv(w, "Initial", report.initial_infected.to_string())?;
    pretty_kv(w, "Cumulative", report.cumulative_cases.to_string())?;
    pretty_kv(w, "Deaths", report.total_deaths().to_string())?;
    pretty_kv(w, "Final rate", format!("{:.4}", report.final_infection_rate))?;
    if let Some(peak) = report.peak_week() {
        pretty_kv(
            w,
            "Peak",
            format!("week {} ({} new cases)", u64::from(peak.week) + 1, peak.new_cases),
        )?;
    }

    writeln!(w)?;
    pretty_section(w, "Weekly Report")?;
    writeln!(
        w,
        "{:>6}  {:>9}  {:>10}  {:>7}  {:>8}",
        "week", "new", "cumulative", "deaths", "rate"
    )?;
    for week in &report.weeks {
        writeln!(
            w,
            "{:>6}  {:>9}  {:>10}  {:>7}  {:>8.4}",
            u64::from(week.week) + 1,
            week.new_cases,
            week.cumulative_cases,
            week.deaths,
            week.infection_rate
        )?;
    }

    writeln!(w)?;
    pretty_section(w, "Final State")?;
    for state in HealthState::ALL {
        pretty_kv(w, state.as_str(), report.final_counts.get(state).to_string())?;
    }

    writeln!(w)?;
    pretty_section(w, "Cases by Community")?;
    for (community, cases) in report.ledger.iter() {
        writeln!(w, "{community:<32} {cases:>9}")?;
    }
    pretty_rule(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_line_numbers_from_one() {
        assert_eq!(
            week_line(0, 12, 32, 1),
            "Week 1: New Cases = 12, Cumulative Cases = 32, Deaths = 1"
        );
    }

    #[test]
    fn counts_line_uses_state_codes() {
        let counts = StateCounts {
            susceptible: 5,
            exposed: 1,
            infectious: 2,
            recovered: 3,
            dead: 0,
        };
        assert_eq!(counts_line(&counts), "S=5 E=1 I=2 R=3 D=0");
    }
}
