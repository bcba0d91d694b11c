//! Day-two lifecycle commands: up, down, restart.

use anyhow::{bail, Result};
use chatstack_core::{DeployConfig, GroupReport};
use colored::Colorize;

pub async fn up(config: &DeployConfig) -> Result<()> {
    let orch = super::orchestrator(config);
    orch.ensure_network().await?;
    orch.ensure_volumes().await?;

    let bar = super::spinner("Bringing service groups up...");
    let result = orch.reconcile_up().await;
    bar.finish_and_clear();
    result?;

    println!("{} All service groups running", "✓".green().bold());
    Ok(())
}

pub async fn down(config: &DeployConfig) -> Result<()> {
    let orch = super::orchestrator(config);
    let report = orch.tear_down().await;
    print_report(&report, "stopped");
    if !report.is_clean() {
        bail!("{} group(s) failed to stop", report.failed.len());
    }
    Ok(())
}

pub async fn restart(config: &DeployConfig) -> Result<()> {
    let orch = super::orchestrator(config);
    let report = orch.restart_in_place().await;
    print_report(&report, "restarted");
    if !report.is_clean() {
        bail!("{} group(s) failed to restart", report.failed.len());
    }
    Ok(())
}

fn print_report(report: &GroupReport, verb: &str) {
    for name in &report.succeeded {
        println!("{} {} {}", "✓".green().bold(), name.bold(), verb.dimmed());
    }
    for name in &report.skipped {
        println!("{} {} {}", "-".dimmed(), name.bold(), "skipped (no definition)".dimmed());
    }
    for (name, reason) in &report.failed {
        println!("{} {} {}", "✗".red().bold(), name.bold(), reason.red());
    }
}
