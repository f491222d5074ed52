//! raidlens - combat-log report analysis from the command line.

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "raidlens", version, about = "Combat-log report analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interrupt analysis for one fight
    Interrupts {
        /// Report code, e.g. AbCd1234xYz9
        report: String,
        /// Fight ID within the report
        fight: i64,
        /// Restrict the analysis to one player's interrupts
        #[arg(short, long)]
        player: Option<String>,
    },
    /// Death analysis for one fight
    Deaths {
        /// Report code
        report: String,
        /// Fight ID within the report
        fight: i64,
        /// Detailed per-death context for one player
        #[arg(short, long)]
        player: Option<String>,
    },
    /// List players present in a report
    Players {
        /// Report code
        report: String,
    },
    /// Show or update stored API settings
    Config {
        /// Set the GraphQL endpoint
        #[arg(long)]
        endpoint: Option<String>,
        /// Set the API access token
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = commands::run(cli.command).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
