//! `seird graph`: build the contact graph only and summarise it.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use seird_graph::GraphStats;
use seird_sim::{build_graph, driver::resolve_seed};
use serde::Serialize;

use crate::cmd::source::SourceArgs;
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

/// Arguments for `seird graph`.
#[derive(Args, Debug)]
pub struct GraphArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Serialize)]
struct GraphOutput {
    seed: u64,
    #[serde(flatten)]
    stats: GraphStats,
}

/// Execute `seird graph`.
pub fn run_graph(args: &GraphArgs, output: OutputMode) -> Result<()> {
    let scenario = args.source.resolve()?;
    let seed = resolve_seed(&scenario.params);
    let graph = build_graph(&scenario, seed).context("building contact graph")?;

    let out = GraphOutput {
        seed,
        stats: GraphStats::from_graph(&graph),
    };
    render_mode(output, &out, render_text, render_pretty)
}

fn render_text(out: &GraphOutput, w: &mut dyn Write) -> io::Result<()> {
    let s = &out.stats;
    writeln!(
        w,
        "graph seed={} nodes={} edges={} intra={} bridges={} components={} isolated={} hash={}",
        out.seed,
        s.node_count,
        s.edge_count,
        s.intra_edge_count,
        s.bridge_edge_count,
        s.component_count,
        s.isolated_node_count,
        s.content_hash
    )?;
    for c in &s.communities {
        writeln!(
            w,
            "community offset={} population={} intra_edges={} bridge_edges={} max_degree={} name={}",
            c.offset, c.population, c.intra_edges, c.bridge_edges, c.max_degree, c.name
        )?;
    }
    Ok(())
}

fn render_pretty(out: &GraphOutput, w: &mut dyn Write) -> io::Result<()> {
    let s = &out.stats;
    pretty_section(w, "Contact Graph")?;
    pretty_kv(w, "Seed", out.seed.to_string())?;
    pretty_kv(w, "Nodes", s.node_count.to_string())?;
    pretty_kv(
        w,
        "Edges",
        format!(
            "{} ({} intra, {} bridges)",
            s.edge_count, s.intra_edge_count, s.bridge_edge_count
        ),
    )?;
    pretty_kv(w, "Density", format!("{:.6}", s.density))?;
    pretty_kv(
        w,
        "Degree",
        format!("mean {:.2}, max {}", s.mean_degree, s.max_degree),
    )?;
    pretty_kv(w, "Components", s.component_count.to_string())?;
    pretty_kv(w, "Isolated", s.isolated_node_count.to_string())?;
    pretty_kv(w, "Hash", &s.content_hash)?;

    writeln!(w)?;
    pretty_section(w, "Communities")?;
    writeln!(
        w,
        "{:<28} {:>8} {:>8} {:>7} {:>6}",
        "name", "nodes", "edges", "bridges", "max"
    )?;
    for c in &s.communities {
        writeln!(
            w,
            "{:<28} {:>8} {:>8} {:>7} {:>6}",
            c.name, c.population, c.intra_edges, c.bridge_edges, c.max_degree
        )?;
    }
    pretty_rule(w)
}
