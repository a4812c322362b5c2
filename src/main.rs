use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "crucible")]
#[command(version, about = "Autonomous coding orchestrator")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "crucible.json", global = true)]
    pub config: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file for the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Run the full workflow for a project description
    Run {
        /// Free-text description of the project to build
        #[arg(short, long)]
        description: String,

        /// Tech-stack preferences as a JSON object
        #[arg(long)]
        stack: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up provider API keys from a local .env if present.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Init { force } => cmd::cmd_init(&cli, *force),
        Commands::Run { description, stack } => {
            cmd::cmd_run(&cli, description, stack.as_deref()).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "crucible=debug" } else { "crucible=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
