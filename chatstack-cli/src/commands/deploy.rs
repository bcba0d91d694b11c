//! First-time deployment: host preparation followed by a full bring-up.

use super::env_files;
use crate::setup;
use anyhow::Result;
use chatstack_core::DeployConfig;
use colored::Colorize;
use std::path::Path;

pub async fn run(config: &DeployConfig, config_path: &Path) -> Result<()> {
    println!("{} Running preflight checks", "→".cyan().bold());
    setup::preflight()?;

    // Persist the active configuration so later up/down/reset invocations
    // operate on the same group topology.
    if !config_path.exists() {
        config.save(config_path)?;
        println!("{} Wrote configuration to {}", "→".cyan().bold(), config_path.display());
    }

    println!("{} Installing dependencies", "→".cyan().bold());
    setup::install_dependencies().await?;

    println!("{} Fetching deployment repository", "→".cyan().bold());
    setup::fetch_repository(config).await?;

    env_files::run(config).await?;

    let orch = super::orchestrator(config);
    orch.ensure_network().await?;
    orch.ensure_volumes().await?;

    let bar = super::spinner("Starting service groups (this may take a while)...");
    let result = orch.bring_up().await;
    bar.finish_and_clear();
    result?;

    println!("{} All service groups running", "✓".green().bold());
    Ok(())
}
