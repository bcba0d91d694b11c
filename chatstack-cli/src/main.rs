use anyhow::Result;
use chatstack_core::DeployConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod setup;

#[derive(Parser)]
#[command(name = "chatstack")]
#[command(about = "Multi-service chatbot stack deployment CLI", long_about = None)]
struct Cli {
    /// Path to an alternate configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full first-time deployment: preflight, dependencies, repository, env files, bring-up
    Deploy,

    /// Bring all service groups up, skipping ones already running
    #[command(alias = "start")]
    Up,

    /// Stop all service groups in reverse order
    #[command(alias = "stop")]
    Down,

    /// Restart all service groups in place
    Restart,

    /// Open the stack environment files in $EDITOR
    UpdateEnv,

    /// Remove every chatstack container, volume, network and image
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(DeployConfig::config_path);
    let config = DeployConfig::load(&config_path)?;

    match cli.command.unwrap_or(Commands::Deploy) {
        Commands::Deploy => commands::deploy::run(&config, &config_path).await?,
        Commands::Up => commands::lifecycle::up(&config).await?,
        Commands::Down => commands::lifecycle::down(&config).await?,
        Commands::Restart => commands::lifecycle::restart(&config).await?,
        Commands::UpdateEnv => commands::env_files::run(&config).await?,
        Commands::Reset => commands::reset::run(&config).await?,
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
