use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use seird_core::Region;
use serde::Serialize;

use crate::output::{OutputMode, pretty_rule, pretty_section, render_mode};

/// Arguments for `seird regions`.
#[derive(Args, Debug, Default)]
pub struct RegionsArgs {}

#[derive(Debug, Serialize)]
struct RegionRow {
    name: &'static str,
    communities: usize,
    population: usize,
    inter_region_edges: usize,
}

fn rows() -> Vec<RegionRow> {
    Region::ALL
        .iter()
        .map(|&region| RegionRow {
            name: region.as_str(),
            communities: region.community_count(),
            population: region.population(),
            inter_region_edges: region.inter_region_edge_count(),
        })
        .collect()
}

/// Execute `seird regions`.
pub fn run_regions(_args: &RegionsArgs, output: OutputMode) -> Result<()> {
    render_mode(output, &rows(), render_text, render_pretty)
}

fn render_text(rows: &Vec<RegionRow>, w: &mut dyn Write) -> io::Result<()> {
    for row in rows {
        writeln!(
            w,
            "region={} communities={} population={} inter_region_edges={}",
            row.name, row.communities, row.population, row.inter_region_edges
        )?;
    }
    Ok(())
}

fn render_pretty(rows: &Vec<RegionRow>, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Preset Regions")?;
    writeln!(
        w,
        "{:<16} {:>11} {:>11} {:>8}",
        "region", "communities", "population", "bridges"
    )?;
    for row in rows {
        writeln!(
            w,
            "{:<16} {:>11} {:>11} {:>8}",
            row.name, row.communities, row.population, row.inter_region_edges
        )?;
    }
    pretty_rule(w)
}
