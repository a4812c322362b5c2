//! Command implementations for the crucible CLI.

use anyhow::{Context, Result};
use console::style;
use serde_json::{Map, Value};
use tokio::sync::watch;

use crucible::config::Config;
use crucible::model::TaskStatus;
use crucible::orchestrator::Orchestrator;

use crate::Cli;

pub fn cmd_init(cli: &Cli, force: bool) -> Result<()> {
    let project_root = std::env::current_dir().context("Failed to get current directory")?;

    if cli.config.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            cli.config.display()
        );
    }

    let config = Config::create_default(&project_root);
    config.save(&cli.config)?;

    println!("{} {}", style("Created").green().bold(), cli.config.display());
    println!("Set ANTHROPIC_API_KEY (or add an api_key to the config) before running.");
    Ok(())
}

pub async fn cmd_run(cli: &Cli, description: &str, stack: Option<&str>) -> Result<()> {
    let config = Config::load(&cli.config)?;
    let tech_preferences = stack.map(parse_stack).transpose()?;

    let orchestrator = Orchestrator::new(config)?;
    orchestrator.start()?;

    println!("{}", style("crucible: autonomous coding workflow").cyan().bold());
    println!("  {description}");

    // Ctrl-C flips the cancellation signal; the in-flight backend call is
    // dropped and the run fails with a cancellation error.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    let outcome = orchestrator
        .run_cancellable(description, tech_preferences, cancel_rx)
        .await?;

    let completed = outcome
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    println!(
        "{} {}/{} tasks implemented",
        style("✓").green().bold(),
        completed,
        outcome.tasks.len()
    );
    println!(
        "Artifacts written to {}",
        orchestrator.artifacts().dir().display()
    );
    Ok(())
}

fn parse_stack(stack: &str) -> Result<Map<String, Value>> {
    serde_json::from_str(stack).context("--stack must be a JSON object")
}
