//! The reset command: confirmation-gated full removal.

use anyhow::Result;
use chatstack_core::DeployConfig;
use colored::Colorize;

pub async fn run(config: &DeployConfig) -> Result<()> {
    println!("{} This will remove:", "WARNING!".red().bold());
    println!("  - All chatstack service containers");
    println!("  - All project volumes (data is lost)");
    println!("  - The {} network and all project images", config.network.bold());
    println!("  - Unused containers, images, volumes and networks host-wide");
    println!();

    let orch = super::orchestrator(config);
    let Some(report) = orch.reset().await? else {
        println!("Aborted.");
        return Ok(());
    };

    println!();
    println!("{} Reset complete", "✓".green().bold());
    println!("  containers removed: {}", report.containers_removed);
    println!("  volumes removed:    {}", report.volumes_removed);
    println!("  images removed:     {}", report.images_removed);
    if report.checkout_removed {
        println!("  checkout removed:   {}", config.checkout_dir.display());
    }

    if !report.errors.is_empty() {
        println!();
        println!("{} {} step(s) reported errors:", "⚠".yellow().bold(), report.errors.len());
        for error in &report.errors {
            println!("  {} {}", "•".dimmed(), error);
        }
    }

    if !report.leftovers.is_empty() {
        println!();
        println!("{} Resources still present:", "⚠".yellow().bold());
        for leftover in &report.leftovers {
            println!("  {} {}", "•".dimmed(), leftover);
        }
    }

    Ok(())
}
