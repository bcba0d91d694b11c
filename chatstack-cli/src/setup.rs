//! Host preparation for first-time deployment: preflight checks, dependency
//! installation, and the deployment repository checkout.

use chatstack_core::{DeployConfig, Result, StackError};
use std::net::TcpListener;
use tokio::process::Command;
use tracing::{info, warn};

/// Ports the proxy group binds; they must be free before bring-up.
const REQUIRED_PORTS: [u16; 2] = [80, 443];

/// Verify privilege level, host OS, and port availability.
pub fn preflight() -> Result<()> {
    if unsafe { libc::geteuid() } != 0 {
        return Err(StackError::Preflight {
            reason: "must run as root (the deployment manages system packages and Docker)"
                .to_string(),
        });
    }

    let os_release = std::fs::read_to_string("/etc/os-release").map_err(|e| {
        StackError::Preflight { reason: format!("cannot read /etc/os-release: {}", e) }
    })?;
    let id = os_release
        .lines()
        .find_map(|l| l.strip_prefix("ID="))
        .map(|v| v.trim_matches('"').to_string())
        .unwrap_or_default();
    if id != "debian" && id != "ubuntu" {
        return Err(StackError::Preflight {
            reason: format!("unsupported host OS '{}', expected debian or ubuntu", id),
        });
    }

    for port in REQUIRED_PORTS {
        if TcpListener::bind(("0.0.0.0", port)).is_err() {
            return Err(StackError::Preflight {
                reason: format!("required port {} is already bound", port),
            });
        }
    }

    info!("Preflight checks passed");
    Ok(())
}

/// Install the container engine, compose plugin and git when missing.
pub async fn install_dependencies() -> Result<()> {
    let mut missing: Vec<&str> = Vec::new();
    if !command_works("docker", &["version"]).await {
        missing.push("docker.io");
        missing.push("docker-compose-v2");
    }
    if !command_works("git", &["--version"]).await {
        missing.push("git");
    }

    if missing.is_empty() {
        info!("All dependencies already installed");
        return Ok(());
    }

    info!(packages = ?missing, "Installing missing packages");
    apt_get(&["update"]).await?;
    let mut args = vec!["install", "-y"];
    args.extend(&missing);
    apt_get(&args).await?;

    // The engine must answer before anything else is attempted.
    if !command_works("docker", &["version"]).await {
        return Err(StackError::DependencyInstall {
            package: "docker.io".to_string(),
            reason: "docker does not respond after installation".to_string(),
        });
    }
    Ok(())
}

/// Clone the deployment repository, or fast-forward an existing checkout.
pub async fn fetch_repository(config: &DeployConfig) -> Result<()> {
    let dir = &config.checkout_dir;

    let output = if dir.join(".git").exists() {
        info!(path = %dir.display(), "Updating existing checkout");
        Command::new("git").args(["pull", "--ff-only"]).current_dir(dir).output().await
    } else {
        info!(url = %config.repo_url, path = %dir.display(), "Cloning deployment repository");
        let target = dir.to_string_lossy();
        Command::new("git")
            .args(["clone", config.repo_url.as_str(), target.as_ref()])
            .output()
            .await
    };

    match output {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => Err(StackError::RepositoryFetch {
            url: config.repo_url.clone(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
        Err(e) => Err(StackError::RepositoryFetch {
            url: config.repo_url.clone(),
            reason: e.to_string(),
        }),
    }
}

async fn command_works(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

async fn apt_get(args: &[&str]) -> Result<()> {
    let output = Command::new("apt-get")
        .args(args)
        .env("DEBIAN_FRONTEND", "noninteractive")
        .output()
        .await
        .map_err(|e| StackError::DependencyInstall {
            package: args.join(" "),
            reason: format!("failed to invoke apt-get: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(args = ?args, error = %stderr, "apt-get failed");
        return Err(StackError::DependencyInstall {
            package: args.join(" "),
            reason: stderr,
        });
    }
    Ok(())
}
