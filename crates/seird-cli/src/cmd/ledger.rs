//! `seird ledger`: cumulative cases per community after a given day.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use seird_sim::{CommunityCases, Simulation, build_graph, driver::resolve_seed};
use serde::Serialize;
use tracing::info;

use crate::cmd::source::SourceArgs;
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

/// Arguments for `seird ledger`.
#[derive(Args, Debug)]
pub struct LedgerArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of days to simulate before reading the ledger.
    #[arg(long)]
    pub day: u64,
}

#[derive(Debug, Serialize)]
struct LedgerOutput {
    seed: u64,
    day: u64,
    initial_infected: usize,
    new_cases: usize,
    communities: Vec<CommunityCases>,
}

/// Execute `seird ledger`.
///
/// Runs past `--weeks` if `--day` asks for more days than the scenario has.
pub fn run_ledger(args: &LedgerArgs, output: OutputMode) -> Result<()> {
    let mut scenario = args.source.resolve()?;
    let seed = resolve_seed(&scenario.params);
    scenario.params.seed = Some(seed);
    scenario.params.retain_snapshots = false;

    let initial_infected = scenario.params.initial_infected;

    let graph = build_graph(&scenario, seed).context("building contact graph")?;
    let mut sim = Simulation::new(&graph, scenario.params).context("setting up simulation")?;
    let ledger = sim.run_until_day(args.day);
    info!(day = args.day, cases = ledger.total(), "ledger ready");

    let out = LedgerOutput {
        seed,
        day: args.day,
        initial_infected,
        new_cases: sim.ledger().total(),
        communities: sim.ledger().entries().to_vec(),
    };
    render_mode(output, &out, render_text, render_pretty)
}

fn render_text(out: &LedgerOutput, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "ledger seed={} day={} new_cases={}", out.seed, out.day, out.new_cases)?;
    for entry in &out.communities {
        writeln!(w, "cases={} community={}", entry.cumulative_cases, entry.community)?;
    }
    Ok(())
}

fn render_pretty(out: &LedgerOutput, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Cases by Community after Day {}", out.day))?;
    pretty_kv(w, "Seed", out.seed.to_string())?;
    pretty_kv(w, "New cases", out.new_cases.to_string())?;
    writeln!(w)?;
    for entry in &out.communities {
        writeln!(w, "{:<32} {:>9}", entry.community, entry.cumulative_cases)?;
    }
    pretty_rule(w)
}
