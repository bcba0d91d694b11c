//! CLI command implementations.

pub mod deploy;
pub mod env_files;
pub mod lifecycle;
pub mod reset;

use chatstack_core::{
    DeployConfig, DockerRuntime, GitCheckout, Orchestrator, TerminalPrompt,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Build an orchestrator wired to the Docker engine and the terminal.
pub fn orchestrator(config: &DeployConfig) -> Orchestrator {
    let checkout = GitCheckout::new(&config.checkout_dir);
    Orchestrator::new(
        config.clone(),
        Arc::new(DockerRuntime::new()),
        Arc::new(TerminalPrompt),
        Arc::new(checkout),
    )
}

/// Spinner shown while a long-running operation polls the runtime.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("static spinner template"),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
