#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::process;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use seird_core::ConfigError;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "seird: seeded SEIRD epidemic simulation over synthetic contact graphs",
    long_about = None
)]
struct Cli {
    /// Enable debug logging when `SEIRD_LOG` is unset.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (default: pretty on a TTY, text when piped).
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Simulate",
        about = "Run a scenario and print the weekly report",
        long_about = "Build the contact graph for a preset region or scenario file, run the\n\
                      SEIRD simulation week by week and print new cases, cumulative cases and\n\
                      deaths per week, the final state counts and cases per community.",
        after_help = "EXAMPLES:\n    # Three years over the reduced Vancouver table\n    seird run\n\n\
                      # A short, reproducible BC run\n    seird run --region bc --weeks 12 --seed 7\n\n\
                      # Scenario file, machine-readable output\n    seird run --config scenario.toml --format json"
    )]
    Run(cmd::run::RunArgs),

    #[command(
        next_help_heading = "Simulate",
        about = "Print cumulative cases per community after N days",
        after_help = "EXAMPLES:\n    # Cases per neighbourhood after 90 days\n    seird ledger --day 90 --seed 7"
    )]
    Ledger(cmd::ledger::LedgerArgs),

    #[command(
        next_help_heading = "Simulate",
        about = "Run many seeds and check every report",
        long_about = "Run one scenario under a range of seeds, check each report against the\n\
                      simulation invariants and summarise the spread of outcomes. Exits with\n\
                      status 1 if any seed fails.",
        after_help = "EXAMPLES:\n    # 50 seeds over 10 weeks\n    seird campaign --seeds 50 --weeks 10\n\n\
                      # Machine-readable output\n    seird campaign --seeds 20 --format json"
    )]
    Campaign(cmd::campaign::CampaignArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Build the contact graph and print its statistics",
        after_help = "EXAMPLES:\n    # Graph for the BC table in a ring\n    seird graph --region bc --topology ring --seed 1"
    )]
    Graph(cmd::graph::GraphArgs),

    #[command(next_help_heading = "Inspect", about = "List preset community tables")]
    Regions(cmd::regions::RegionsArgs),

    #[command(
        next_help_heading = "Shell",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    seird completions bash\n\n    # Generate zsh completions\n    seird completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SEIRD_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "seird=debug,info"
        } else {
            "seird=info,warn"
        })
    });

    let format = env::var("SEIRD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Exit status for errors caused by bad input rather than a failed run.
const EXIT_CONFIG: i32 = 2;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.verbose {
        info!("Verbose mode enabled");
    }
    let output = cli.output_mode();
    debug!(?output, "resolved output mode");

    let result = match cli.command {
        Commands::Run(ref args) => cmd::run::run_run(args, output),
        Commands::Ledger(ref args) => cmd::ledger::run_ledger(args, output),
        Commands::Campaign(ref args) => cmd::campaign::run_campaign_cmd(args, output),
        Commands::Graph(ref args) => cmd::graph::run_graph(args, output),
        Commands::Regions(ref args) => cmd::regions::run_regions(args, output),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command, &mut std::io::stdout())
        }
    };

    if let Err(err) = result {
        if let Some(config_err) = err.downcast_ref::<ConfigError>() {
            let mut cli_err = CliError::from(config_err);
            cli_err.message = format!("{err:#}");
            render_error(output, &cli_err)?;
            process::exit(EXIT_CONFIG);
        }
        render_error(output, &CliError::new(format!("{err:#}")))?;
        process::exit(1);
    }
    Ok(())
}
