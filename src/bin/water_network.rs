//! The CLI entry point (§4.12, §6): loads a network, computes its baseline
//! max-flow, then drops into the interactive menu (`water_network::cli`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use water_network::cli::{self, AppContext};
use water_network::config::Config;
use water_network::{flow, ingest};

/// Analyse a municipal water-distribution network.
#[derive(Parser)]
#[command(name = "water-network", version, about)]
struct Args {
    /// Directory containing the Reservoir/Stations/Cities/Pipes CSV files.
    #[arg(long)]
    data_dir: PathBuf,

    /// Label used as the output subdirectory for reports.
    #[arg(long, default_value = "network")]
    network_name: String,

    /// Directory CSV reports are written under.
    #[arg(long, default_value = "out")]
    output_dir: PathBuf,

    /// Safety cap on load-balancer iterations; defaults to the network's
    /// edge count.
    #[arg(long)]
    max_load_iterations: Option<usize>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Config {
        network_name: args.network_name,
        max_load_iterations: args.max_load_iterations,
        output_dir: args.output_dir,
    };

    match run(&args.data_dir, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(data_dir: &std::path::Path, config: Config) -> anyhow::Result<()> {
    let mut net = ingest::load_network(data_dir)?;
    flow::maxflow(&mut net)?;
    let mut ctx = AppContext { net, config };
    cli::run_menu(&mut ctx);
    Ok(())
}
