//! Multi-group lifecycle orchestration.
//!
//! Brings the fixed, ordered set of service groups to a desired state.
//! Bring-up is fail-fast and strictly sequential because the start order
//! encodes real dependency edges; teardown, restart and reset are
//! best-effort so they make maximal progress toward a stopped state.

use crate::config::DeployConfig;
use crate::error::{Result, StackError};
use crate::prompt::OperatorPrompt;
use crate::runtime::ContainerRuntime;
use crate::types::{ContainerFilter, DeploymentState, ServiceGroup, StatusFilter};
use crate::workspace::Workspace;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

mod reset;
pub use reset::ResetReport;

/// Per-group outcomes of a best-effort operation (teardown, restart).
#[derive(Debug, Default)]
pub struct GroupReport {
    /// Groups the primitive succeeded for.
    pub succeeded: Vec<String>,

    /// Groups skipped because their stack definition is missing.
    pub skipped: Vec<String>,

    /// Groups whose primitive failed, with the failure reason.
    pub failed: Vec<(String, String)>,
}

impl GroupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Lifecycle orchestrator over the configured service groups.
///
/// Holds no state of its own between operations; every decision re-queries
/// the runtime.
pub struct Orchestrator {
    config: DeployConfig,
    runtime: Arc<dyn ContainerRuntime>,
    prompt: Arc<dyn OperatorPrompt>,
    workspace: Arc<dyn Workspace>,
}

impl Orchestrator {
    pub fn new(
        config: DeployConfig,
        runtime: Arc<dyn ContainerRuntime>,
        prompt: Arc<dyn OperatorPrompt>,
        workspace: Arc<dyn Workspace>,
    ) -> Self {
        Self { config, runtime, prompt, workspace }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Groups in bring-up order.
    fn groups_ascending(&self) -> Vec<&ServiceGroup> {
        let mut groups: Vec<&ServiceGroup> = self.config.groups.iter().collect();
        groups.sort_by_key(|g| g.start_order);
        groups
    }

    /// Groups in teardown order: the exact reverse of bring-up.
    fn groups_descending(&self) -> Vec<&ServiceGroup> {
        let mut groups = self.groups_ascending();
        groups.reverse();
        groups
    }

    /// Create the shared network if absent, then verify it exists.
    /// Idempotent, safe to call on every invocation.
    #[instrument(skip(self))]
    pub async fn ensure_network(&self) -> Result<()> {
        let name = &self.config.network;
        if self.runtime.network_exists(name).await? {
            debug!(network = %name, "Network already exists");
            return Ok(());
        }

        info!(network = %name, driver = %self.config.network_driver, "Creating network");
        self.runtime.create_network(name, self.config.network_driver).await?;

        if !self.runtime.network_exists(name).await? {
            return Err(StackError::NetworkCreateFailed { name: name.clone() });
        }
        Ok(())
    }

    /// Create each configured volume if absent.
    ///
    /// Race-tolerant: absence-check, create, presence-check. A create error
    /// is tolerated when the volume exists afterwards (someone else created
    /// it between the checks).
    #[instrument(skip(self))]
    pub async fn ensure_volumes(&self) -> Result<()> {
        for name in &self.config.volumes {
            if self.runtime.volume_exists(name).await? {
                debug!(volume = %name, "Volume already exists");
                continue;
            }

            info!(volume = %name, "Creating volume");
            if let Err(e) = self.runtime.create_volume(name).await {
                warn!(volume = %name, error = %e, "Volume creation reported an error");
            }

            if !self.runtime.volume_exists(name).await? {
                return Err(StackError::VolumeCreateFailed {
                    name: name.clone(),
                    reason: "not found after creation".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Start every group in ascending order, fail-fast.
    ///
    /// Group *i+1* is never started before group *i*'s containers are
    /// confirmed present. On a fatal error, already-started groups keep
    /// running and are left to the operator to diagnose.
    #[instrument(skip(self))]
    pub async fn bring_up(&self) -> Result<()> {
        for group in self.groups_ascending() {
            self.start_group(group).await?;
        }
        info!("All service groups are up");
        Ok(())
    }

    /// Start one group and wait for its containers to appear.
    async fn start_group(&self, group: &ServiceGroup) -> Result<()> {
        let definition = group.definition_path(&self.config.checkout_dir);
        if !definition.exists() {
            return Err(StackError::StackDefinitionMissing {
                group: group.name.clone(),
                path: definition,
            });
        }

        info!(group = %group.name, "Starting group");
        self.runtime
            .stack_up(&group.name, &definition, &self.config.checkout_dir)
            .await
            .map_err(|e| StackError::GroupStartFailed {
                group: group.name.clone(),
                reason: e.to_string(),
            })?;

        self.wait_for_group(group).await
    }

    /// Poll until a running container belonging to the group is present, or
    /// the timeout ceiling elapses.
    async fn wait_for_group(&self, group: &ServiceGroup) -> Result<()> {
        let interval = self.config.poll_interval();
        let ceiling = self.config.start_timeout();
        let filter =
            ContainerFilter::by_name(group.name.as_str()).with_status(StatusFilter::Running);
        let mut waited = Duration::ZERO;

        loop {
            if !self.runtime.list_containers(&filter).await?.is_empty() {
                info!(group = %group.name, waited_secs = waited.as_secs(), "Group is up");
                return Ok(());
            }
            if waited >= ceiling {
                return Err(StackError::GroupStartTimeout { group: group.name.clone(), waited });
            }
            debug!(group = %group.name, waited_secs = waited.as_secs(), "Waiting for group");
            tokio::time::sleep(interval).await;
            waited += interval;
        }
    }

    /// Stop every group in descending order, best-effort.
    ///
    /// A missing definition means there is nothing to stop: warn and
    /// continue. A stop failure is recorded and the remaining groups are
    /// still processed.
    #[instrument(skip(self))]
    pub async fn tear_down(&self) -> GroupReport {
        let mut report = GroupReport::default();

        for group in self.groups_descending() {
            let definition = group.definition_path(&self.config.checkout_dir);
            if !definition.exists() {
                warn!(group = %group.name, path = %definition.display(),
                      "Stack definition missing, nothing to stop");
                report.skipped.push(group.name.clone());
                continue;
            }

            info!(group = %group.name, "Stopping group");
            match self
                .runtime
                .stack_down(&group.name, &definition, &self.config.checkout_dir)
                .await
            {
                Ok(()) => report.succeeded.push(group.name.clone()),
                Err(e) => {
                    let err = StackError::GroupStopFailed {
                        group: group.name.clone(),
                        reason: e.to_string(),
                    };
                    error!(group = %group.name, error = %err, "Group stop failed, continuing");
                    report.failed.push((group.name.clone(), e.to_string()));
                }
            }
        }

        report
    }

    /// Idempotent bring-up: skip groups that are already running.
    ///
    /// A group reported restarting is left alone with a warning. Any other
    /// state gets a full down+up cycle; "not running" is not assumed to mean
    /// "never started".
    #[instrument(skip(self))]
    pub async fn reconcile_up(&self) -> Result<()> {
        for group in self.groups_ascending() {
            let definition = group.definition_path(&self.config.checkout_dir);
            if !definition.exists() {
                return Err(StackError::StackDefinitionMissing {
                    group: group.name.clone(),
                    path: definition,
                });
            }

            let state = match self
                .runtime
                .stack_status(&group.name, &definition, &self.config.checkout_dir)
                .await
            {
                Ok(services) => DeploymentState::aggregate(&services),
                Err(e) => {
                    warn!(group = %group.name, error = %e,
                          "Status query failed, treating state as unknown");
                    DeploymentState::Unknown
                }
            };

            match state {
                DeploymentState::Running => {
                    info!(group = %group.name, "Group already running, skipping");
                }
                DeploymentState::Restarting => {
                    warn!(group = %group.name,
                          "Group is restarting, leaving it to the operator");
                }
                _ => {
                    info!(group = %group.name, state = %state, "Recycling group");
                    if let Err(e) = self
                        .runtime
                        .stack_down(&group.name, &definition, &self.config.checkout_dir)
                        .await
                    {
                        warn!(group = %group.name, error = %e,
                              "Pre-start stop reported an error, starting anyway");
                    }
                    self.start_group(group).await?;
                }
            }
        }
        Ok(())
    }

    /// Restart every group in place in ascending order, best-effort.
    #[instrument(skip(self))]
    pub async fn restart_in_place(&self) -> GroupReport {
        let mut report = GroupReport::default();

        for group in self.groups_ascending() {
            let definition = group.definition_path(&self.config.checkout_dir);
            if !definition.exists() {
                warn!(group = %group.name, "Stack definition missing, nothing to restart");
                report.skipped.push(group.name.clone());
                continue;
            }

            info!(group = %group.name, "Restarting group");
            match self
                .runtime
                .stack_restart(&group.name, &definition, &self.config.checkout_dir)
                .await
            {
                Ok(()) => report.succeeded.push(group.name.clone()),
                Err(e) => {
                    error!(group = %group.name, error = %e, "Group restart failed, continuing");
                    report.failed.push((group.name.clone(), e.to_string()));
                }
            }
        }

        report
    }
}
