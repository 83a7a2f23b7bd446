//! `seird campaign`: run one scenario under many seeds and check every run.

use std::io::{self, Write};
use std::process;

use anyhow::{Result, bail};
use clap::Args;
use seird_sim::campaign::{CampaignConfig, CampaignReport, run_campaign};

use crate::cmd::source::SourceArgs;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `seird campaign`.
///
/// `--seed` is ignored; each run takes its seed from the campaign range.
#[derive(Args, Debug)]
pub struct CampaignArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of seeds to run.
    #[arg(long, default_value = "20")]
    pub seeds: u64,

    /// First seed of the range.
    #[arg(long, default_value = "0")]
    pub seed_start: u64,
}

/// Execute `seird campaign`. Exits with status 1 if any seed breaks an invariant.
pub fn run_campaign_cmd(args: &CampaignArgs, output: OutputMode) -> Result<()> {
    let Some(seed_end) = args.seed_start.checked_add(args.seeds) else {
        bail!("--seed-start + --seeds overflows u64");
    };
    let config = CampaignConfig {
        seed_range: args.seed_start..seed_end,
        scenario: args.source.resolve()?,
    };

    let report = run_campaign(&config)?;
    render_mode(output, &report, render_text, render_pretty)?;

    // Exit code 1 on any failure for CI integration
    if !report.all_passed() {
        process::exit(1);
    }
    Ok(())
}

fn render_text(report: &CampaignReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "campaign seeds_run={} passed={} failed={} all_passed={}",
        report.seeds_run,
        report.seeds_passed,
        report.failures.len(),
        report.all_passed()
    )?;
    writeln!(
        w,
        "cases mean={:.1} min={} max={} deaths_mean={:.1}",
        report.mean_cumulative_cases,
        report.min_cumulative_cases,
        report.max_cumulative_cases,
        report.mean_deaths
    )?;
    for s in &report.summaries {
        writeln!(
            w,
            "seed={} cumulative_cases={} deaths={} peak_week={} peak_new_cases={}",
            s.seed,
            s.cumulative_cases,
            s.deaths,
            s.peak_week.map_or_else(|| "-".to_string(), |week| (u64::from(week) + 1).to_string()),
            s.peak_new_cases
        )?;
    }
    for failure in report.failures.iter().take(5) {
        writeln!(
            w,
            "failure seed={} violations={}",
            failure.seed,
            failure.violations.len()
        )?;
    }
    if report.failures.len() > 5 {
        writeln!(w, "failures_truncated count={}", report.failures.len() - 5)?;
    }
    if let Some(seed) = report.first_failure {
        writeln!(w, "hint replay_seed={seed}")?;
    }
    Ok(())
}

fn render_pretty(report: &CampaignReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Simulation Campaign")?;
    pretty_kv(w, "Seeds", report.seeds_run.to_string())?;
    pretty_kv(
        w,
        "Results",
        format!(
            "{} passed / {} failed",
            report.seeds_passed,
            report.failures.len()
        ),
    )?;
    pretty_kv(
        w,
        "Cases",
        format!(
            "mean {:.1} (min {}, max {})",
            report.mean_cumulative_cases, report.min_cumulative_cases, report.max_cumulative_cases
        ),
    )?;
    pretty_kv(w, "Deaths", format!("mean {:.1}", report.mean_deaths))?;

    match report.first_failure {
        None => pretty_kv(w, "Status", "all seeds passed")?,
        Some(seed) => {
            pretty_kv(
                w,
                "Status",
                format!(
                    "{} failures (first at seed {seed})",
                    report.failures.len()
                ),
            )?;
            writeln!(w)?;
            pretty_section(w, "Failure Samples")?;
            for failure in report.failures.iter().take(5) {
                writeln!(w, "seed {:<8} violations={}", failure.seed, failure.violations.len())?;
                for violation in &failure.violations {
                    writeln!(w, "  - {violation}")?;
                }
            }
            if report.failures.len() > 5 {
                writeln!(w, "... and {} more failures", report.failures.len() - 5)?;
            }
            writeln!(w)?;
            pretty_kv(w, "Replay", format!("seird run --seed {seed} --format json"))?;
        }
    }
    Ok(())
}
