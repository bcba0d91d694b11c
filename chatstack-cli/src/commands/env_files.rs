//! Environment-file editing for the deployed stacks.
//!
//! Seeds each group's `.env` from its `.env.example` when absent, then opens
//! it in the operator's editor. Editing the contents is the operator's job.

use anyhow::{Context, Result};
use chatstack_core::DeployConfig;
use colored::Colorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::warn;

pub async fn run(config: &DeployConfig) -> Result<()> {
    let files = env_file_candidates(config);
    if files.is_empty() {
        println!("No environment files found under {}", config.checkout_dir.display());
        return Ok(());
    }

    if !std::io::stdin().is_terminal() {
        warn!("stdin is not a terminal, skipping environment file editing");
        return Ok(());
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    for file in files {
        println!("{} Editing {}", "→".cyan().bold(), file.display());
        let status = Command::new(&editor)
            .arg(&file)
            .status()
            .await
            .with_context(|| format!("failed to launch editor {}", editor))?;
        if !status.success() {
            warn!(file = %file.display(), "Editor exited with a non-zero status");
        }
    }

    Ok(())
}

/// The env file next to each group's stack definition, plus the checkout
/// root. Files are seeded from their `.env.example` siblings when missing.
fn env_file_candidates(config: &DeployConfig) -> Vec<PathBuf> {
    let mut dirs = vec![config.checkout_dir.clone()];
    for group in &config.groups {
        if let Some(parent) = group.definition_path(&config.checkout_dir).parent() {
            dirs.push(parent.to_path_buf());
        }
    }
    dirs.dedup();

    let mut files = Vec::new();
    for dir in dirs {
        let env = dir.join(".env");
        let example = dir.join(".env.example");
        if !env.exists() && example.exists() {
            if let Err(e) = std::fs::copy(&example, &env) {
                warn!(path = %env.display(), error = %e, "Failed to seed env file");
                continue;
            }
        }
        if env.exists() {
            files.push(env);
        }
    }
    files
}
