//! Docker engine runtime.
//!
//! Drives the `docker` and `docker compose` CLIs through `tokio::process` and
//! maps their structured output back into domain types. Compose state is read
//! via `docker compose ps --format json` rather than scraping table output.

use super::ContainerRuntime;
use crate::error::{Result, StackError};
use crate::types::{ContainerFilter, DeploymentState, NetworkDriver, ServiceStatus};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// Runtime backed by the Docker CLI.
pub struct DockerRuntime {
    binary: String,
}

impl DockerRuntime {
    pub fn new() -> Self {
        Self { binary: "docker".to_string() }
    }

    /// Run a docker subcommand and fail on a non-zero exit status.
    async fn run(&self, args: &[&str], project_dir: Option<&Path>) -> Result<Output> {
        debug!(command = %format!("{} {}", self.binary, args.join(" ")), "Invoking runtime");

        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        if let Some(dir) = project_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| StackError::RuntimeUnavailable {
            reason: format!("failed to invoke {}: {}", self.binary, e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(StackError::RuntimeCommandFailed {
                command: format!("{} {}", self.binary, args.join(" ")),
                reason: if stderr.is_empty() { output.status.to_string() } else { stderr },
            });
        }

        Ok(output)
    }

    /// Run a docker subcommand and return the non-empty stdout lines.
    async fn run_lines(&self, args: &[&str]) -> Result<Vec<String>> {
        let output = self.run(args, None).await?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl Default for DockerRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a compose invocation pinned to an explicit project name.
///
/// Without `-p`, compose derives the project from the definition's directory,
/// so two definitions in the same directory would share one project and
/// `up --remove-orphans` for one would remove the other's containers. The
/// project name also becomes the `<project>-<service>-N` container name
/// prefix the presence poll matches against.
fn compose_args<'a>(project: &'a str, definition: &'a str, action: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["compose", "-p", project, "-f", definition];
    args.extend_from_slice(action);
    args
}

/// Translate a container filter into `docker ps` arguments. Listings always
/// include stopped containers unless a status filter narrows them.
fn ps_args(filter: &ContainerFilter) -> Vec<String> {
    let mut args: Vec<String> =
        vec!["ps".into(), "-a".into(), "--format".into(), "{{.ID}}".into()];
    if let Some(pattern) = &filter.name_pattern {
        args.push("--filter".into());
        args.push(format!("name={}", pattern));
    }
    if let Some(network) = &filter.network {
        args.push("--filter".into());
        args.push(format!("network={}", network));
    }
    if let Some(status) = filter.status {
        args.push("--filter".into());
        args.push(format!("status={}", status.as_str()));
    }
    args
}

/// One entry of `docker compose ps --format json` (one JSON object per line).
#[derive(Debug, Deserialize)]
struct ComposePsEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "State")]
    state: String,
}

/// Map a compose/engine state string onto the domain state.
fn map_state(state: &str) -> DeploymentState {
    match state {
        "running" => DeploymentState::Running,
        "restarting" => DeploymentState::Restarting,
        "created" | "starting" => DeploymentState::Starting,
        "exited" | "paused" | "dead" | "removing" => DeploymentState::Stopped,
        _ => DeploymentState::Unknown,
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn network_exists(&self, name: &str) -> Result<bool> {
        let names =
            self.run_lines(&["network", "ls", "--format", "{{.Name}}"]).await?;
        Ok(names.iter().any(|n| n == name))
    }

    async fn create_network(&self, name: &str, driver: NetworkDriver) -> Result<()> {
        self.run(&["network", "create", "--driver", &driver.to_string(), name], None).await?;
        Ok(())
    }

    async fn volume_exists(&self, name: &str) -> Result<bool> {
        let names = self.run_lines(&["volume", "ls", "--format", "{{.Name}}"]).await?;
        Ok(names.iter().any(|n| n == name))
    }

    async fn create_volume(&self, name: &str) -> Result<()> {
        self.run(&["volume", "create", name], None).await?;
        Ok(())
    }

    async fn stack_status(
        &self,
        project: &str,
        definition: &Path,
        project_dir: &Path,
    ) -> Result<Vec<ServiceStatus>> {
        let definition = definition.to_string_lossy();
        let args = compose_args(project, &definition, &["ps", "--all", "--format", "json"]);
        let output = self.run(&args, Some(project_dir)).await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut services = Vec::new();
        for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let entry: ComposePsEntry = serde_json::from_str(line).map_err(|e| {
                StackError::Internal(format!("unparseable compose status line: {}", e))
            })?;
            services.push(ServiceStatus { name: entry.name, state: map_state(&entry.state) });
        }
        Ok(services)
    }

    async fn stack_up(&self, project: &str, definition: &Path, project_dir: &Path) -> Result<()> {
        let definition = definition.to_string_lossy();
        let args = compose_args(project, &definition, &["up", "-d", "--remove-orphans"]);
        self.run(&args, Some(project_dir)).await?;
        Ok(())
    }

    async fn stack_down(
        &self,
        project: &str,
        definition: &Path,
        project_dir: &Path,
    ) -> Result<()> {
        let definition = definition.to_string_lossy();
        let args = compose_args(project, &definition, &["down", "--remove-orphans"]);
        self.run(&args, Some(project_dir)).await?;
        Ok(())
    }

    async fn stack_restart(
        &self,
        project: &str,
        definition: &Path,
        project_dir: &Path,
    ) -> Result<()> {
        let definition = definition.to_string_lossy();
        let args = compose_args(project, &definition, &["restart"]);
        self.run(&args, Some(project_dir)).await?;
        Ok(())
    }

    async fn list_containers(&self, filter: &ContainerFilter) -> Result<Vec<String>> {
        let args = ps_args(filter);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_lines(&args).await
    }

    async fn remove_containers(&self, ids: &[String], force: bool) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut args: Vec<&str> = vec!["rm"];
        if force {
            args.push("-f");
        }
        args.extend(ids.iter().map(String::as_str));
        self.run(&args, None).await?;
        Ok(())
    }

    async fn list_volumes(&self, name_pattern: Option<&str>) -> Result<Vec<String>> {
        let names = self.run_lines(&["volume", "ls", "--format", "{{.Name}}"]).await?;
        Ok(match name_pattern {
            Some(pattern) => names.into_iter().filter(|n| n.contains(pattern)).collect(),
            None => names,
        })
    }

    async fn remove_volumes(&self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        let mut args: Vec<&str> = vec!["volume", "rm", "-f"];
        args.extend(names.iter().map(String::as_str));
        self.run(&args, None).await?;
        Ok(())
    }

    async fn prune_dangling_volumes(&self) -> Result<()> {
        self.run(&["volume", "prune", "-f"], None).await?;
        Ok(())
    }

    async fn remove_network(&self, name: &str) -> Result<()> {
        self.run(&["network", "rm", name], None).await?;
        Ok(())
    }

    async fn list_images(&self, repo_pattern: &str) -> Result<Vec<String>> {
        let refs =
            self.run_lines(&["images", "--format", "{{.Repository}}:{{.Tag}}"]).await?;
        Ok(refs
            .into_iter()
            .filter(|r| r.split(':').next().is_some_and(|repo| repo.contains(repo_pattern)))
            .collect())
    }

    async fn remove_images(&self, refs: &[String]) -> Result<()> {
        if refs.is_empty() {
            return Ok(());
        }
        let mut args: Vec<&str> = vec!["rmi", "-f"];
        args.extend(refs.iter().map(String::as_str));
        self.run(&args, None).await?;
        Ok(())
    }

    async fn prune_dangling_images(&self) -> Result<()> {
        self.run(&["image", "prune", "-f"], None).await?;
        Ok(())
    }

    async fn system_prune(&self, all_images: bool, volumes: bool) -> Result<()> {
        let mut args: Vec<&str> = vec!["system", "prune", "-f"];
        if all_images {
            args.push("-a");
        }
        if volumes {
            args.push("--volumes");
        }
        self.run(&args, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_state_covers_compose_vocabulary() {
        assert_eq!(map_state("running"), DeploymentState::Running);
        assert_eq!(map_state("restarting"), DeploymentState::Restarting);
        assert_eq!(map_state("created"), DeploymentState::Starting);
        assert_eq!(map_state("exited"), DeploymentState::Stopped);
        assert_eq!(map_state("paused"), DeploymentState::Stopped);
        assert_eq!(map_state("weird"), DeploymentState::Unknown);
    }

    #[test]
    fn compose_args_pin_the_project_name() {
        let args = compose_args(
            "supabase-s3",
            "supabase/docker/docker-compose.s3.yml",
            &["up", "-d", "--remove-orphans"],
        );
        assert_eq!(
            args,
            [
                "compose",
                "-p",
                "supabase-s3",
                "-f",
                "supabase/docker/docker-compose.s3.yml",
                "up",
                "-d",
                "--remove-orphans"
            ]
        );
    }

    #[test]
    fn ps_args_translate_each_filter_field() {
        use crate::types::StatusFilter;

        let filter = ContainerFilter::by_name("redis").with_status(StatusFilter::Running);
        let args = ps_args(&filter);
        assert!(args.contains(&"name=redis".to_string()));
        assert!(args.contains(&"status=running".to_string()));

        let filter = ContainerFilter::on_network("chatstack_net");
        assert!(ps_args(&filter).contains(&"network=chatstack_net".to_string()));
    }

    #[test]
    fn compose_ps_line_parses() {
        let line = r#"{"Name":"chatstack-redis-1","State":"running","Service":"redis"}"#;
        let entry: ComposePsEntry = serde_json::from_str(line).unwrap();
        assert_eq!(entry.name, "chatstack-redis-1");
        assert_eq!(map_state(&entry.state), DeploymentState::Running);
    }
}
