//! Destructive full-system reset.
//!
//! Gated by two sequential confirmations with distinct required literals.
//! Every phase afterwards is best-effort: failures are logged and the
//! remaining phases still run, so the system gets as close to empty as the
//! runtime allows. No phase retries.

use super::Orchestrator;
use crate::error::Result;
use crate::types::ContainerFilter;
use tracing::{info, instrument, warn};

/// Confirmation literal for deleting the deployment checkout (phase 6).
const CHECKOUT_DELETE_LITERAL: &str = "DELETE";

/// Summary of what reset removed and what it found left over.
#[derive(Debug, Default)]
pub struct ResetReport {
    pub containers_removed: usize,
    pub volumes_removed: usize,
    pub images_removed: usize,
    pub network_removed: bool,
    pub checkout_removed: bool,

    /// Project-pattern resources still present after all phases.
    pub leftovers: Vec<String>,

    /// Non-fatal failures encountered along the way.
    pub errors: Vec<String>,
}

impl Orchestrator {
    /// Tear everything down and remove all project resources.
    ///
    /// Returns `None` when either confirmation is declined; in that case no
    /// destructive runtime call has been made.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<Option<ResetReport>> {
        let first = &self.config.reset_first_literal;
        let second = &self.config.reset_second_literal;

        if !self
            .prompt
            .confirm(
                "This removes every chatstack container, volume, network and image",
                first,
            )
            .await
        {
            info!("Reset declined at first confirmation");
            return Ok(None);
        }
        if !self.prompt.confirm("Last chance, this cannot be undone", second).await {
            info!("Reset declined at second confirmation");
            return Ok(None);
        }

        let mut report = ResetReport::default();
        self.reset_groups(&mut report).await;
        self.reset_container_sweep(&mut report).await;
        self.reset_volumes(&mut report).await;
        self.reset_network(&mut report).await;
        self.reset_images(&mut report).await;
        self.reset_checkout(&mut report).await;
        self.reset_system_prune(&mut report).await;
        self.reset_verify(&mut report).await;

        info!(
            containers = report.containers_removed,
            volumes = report.volumes_removed,
            images = report.images_removed,
            leftovers = report.leftovers.len(),
            "Reset complete"
        );
        Ok(Some(report))
    }

    fn note_failure(report: &mut ResetReport, context: &str, error: impl std::fmt::Display) {
        warn!(context = context, error = %error, "Reset step failed, continuing");
        report.errors.push(format!("{}: {}", context, error));
    }

    /// Phase 1: stop every group in descending order, then force-remove any
    /// container still carrying the group's compose identity. The fallback
    /// runs even when the stop failed.
    async fn reset_groups(&self, report: &mut ResetReport) {
        for group in self.groups_descending() {
            let definition = group.definition_path(&self.config.checkout_dir);
            if definition.exists() {
                info!(group = %group.name, "Stopping group");
                if let Err(e) = self
                    .runtime
                    .stack_down(&group.name, &definition, &self.config.checkout_dir)
                    .await
                {
                    Self::note_failure(report, &format!("stop {}", group.name), e);
                }
            } else {
                warn!(group = %group.name, "Stack definition missing, relying on sweep");
            }

            let filter = ContainerFilter::by_name(group.name.as_str());
            match self.runtime.list_containers(&filter).await {
                Ok(ids) if !ids.is_empty() => {
                    info!(group = %group.name, count = ids.len(), "Force-removing containers");
                    match self.runtime.remove_containers(&ids, true).await {
                        Ok(()) => report.containers_removed += ids.len(),
                        Err(e) => {
                            Self::note_failure(report, &format!("remove {}", group.name), e)
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => Self::note_failure(report, &format!("list {}", group.name), e),
            }
        }
    }

    /// Phase 2: safety-net sweep for containers the declarative stop missed,
    /// by network membership and by group-name substring. Catches containers
    /// started manually or orphaned across definition renames.
    async fn reset_container_sweep(&self, report: &mut ResetReport) {
        let filter = ContainerFilter::on_network(self.config.network.as_str());
        match self.runtime.list_containers(&filter).await {
            Ok(ids) if !ids.is_empty() => {
                info!(count = ids.len(), "Sweeping containers on project network");
                match self.runtime.remove_containers(&ids, true).await {
                    Ok(()) => report.containers_removed += ids.len(),
                    Err(e) => Self::note_failure(report, "network sweep", e),
                }
            }
            Ok(_) => {}
            Err(e) => Self::note_failure(report, "network sweep list", e),
        }

        for group in &self.config.groups {
            let filter = ContainerFilter::by_name(group.name.as_str());
            match self.runtime.list_containers(&filter).await {
                Ok(ids) if !ids.is_empty() => {
                    match self.runtime.remove_containers(&ids, true).await {
                        Ok(()) => report.containers_removed += ids.len(),
                        Err(e) => {
                            Self::note_failure(report, &format!("name sweep {}", group.name), e)
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    Self::note_failure(report, &format!("name sweep list {}", group.name), e)
                }
            }
        }
    }

    /// Phase 3: volumes matching the project name or a group-name substring,
    /// then the dangling-volume sweep.
    async fn reset_volumes(&self, report: &mut ResetReport) {
        match self.runtime.list_volumes(None).await {
            Ok(names) => {
                let matching: Vec<String> = names
                    .into_iter()
                    .filter(|name| {
                        name == &self.config.project
                            || self.config.groups.iter().any(|g| name.contains(&g.name))
                    })
                    .collect();
                if !matching.is_empty() {
                    info!(count = matching.len(), "Removing project volumes");
                    match self.runtime.remove_volumes(&matching).await {
                        Ok(()) => report.volumes_removed += matching.len(),
                        Err(e) => Self::note_failure(report, "remove volumes", e),
                    }
                }
            }
            Err(e) => Self::note_failure(report, "list volumes", e),
        }

        if let Err(e) = self.runtime.prune_dangling_volumes().await {
            Self::note_failure(report, "prune dangling volumes", e);
        }
    }

    /// Phase 4: the shared network.
    async fn reset_network(&self, report: &mut ResetReport) {
        match self.runtime.network_exists(&self.config.network).await {
            Ok(true) => {
                info!(network = %self.config.network, "Removing network");
                match self.runtime.remove_network(&self.config.network).await {
                    Ok(()) => report.network_removed = true,
                    Err(e) => Self::note_failure(report, "remove network", e),
                }
            }
            Ok(false) => {}
            Err(e) => Self::note_failure(report, "network query", e),
        }
    }

    /// Phase 5: images whose repository matches a group name, then the
    /// dangling-image sweep.
    async fn reset_images(&self, report: &mut ResetReport) {
        for group in &self.config.groups {
            match self.runtime.list_images(&group.name).await {
                Ok(refs) if !refs.is_empty() => {
                    info!(group = %group.name, count = refs.len(), "Removing images");
                    match self.runtime.remove_images(&refs).await {
                        Ok(()) => report.images_removed += refs.len(),
                        Err(e) => {
                            Self::note_failure(report, &format!("remove images {}", group.name), e)
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => Self::note_failure(report, &format!("list images {}", group.name), e),
            }
        }

        if let Err(e) = self.runtime.prune_dangling_images().await {
            Self::note_failure(report, "prune dangling images", e);
        }
    }

    /// Phase 6: the deployment checkout, behind its own confirmation. When
    /// declined, generated artifacts are scrubbed instead and the checkout
    /// reverted to a clean state.
    async fn reset_checkout(&self, report: &mut ResetReport) {
        let confirmed = self
            .prompt
            .confirm(
                &format!(
                    "Also delete the deployment checkout at {}?",
                    self.config.checkout_dir.display()
                ),
                CHECKOUT_DELETE_LITERAL,
            )
            .await;

        if confirmed {
            match self.workspace.remove_checkout().await {
                Ok(()) => report.checkout_removed = true,
                Err(e) => Self::note_failure(report, "remove checkout", e),
            }
        } else if let Err(e) = self.workspace.scrub_artifacts().await {
            Self::note_failure(report, "scrub checkout", e);
        }
    }

    /// Phase 7: untargeted system-wide prune. Intentionally broader than the
    /// project's own resources, the trade-off being that unrelated stopped
    /// containers and unused images on a shared host are removed too.
    async fn reset_system_prune(&self, report: &mut ResetReport) {
        info!("Running system-wide prune");
        if let Err(e) = self.runtime.system_prune(true, true).await {
            Self::note_failure(report, "system prune", e);
        }
    }

    /// Phase 8: re-query by known patterns and report whatever survived.
    async fn reset_verify(&self, report: &mut ResetReport) {
        for group in &self.config.groups {
            let filter = ContainerFilter::by_name(group.name.as_str());
            if let Ok(ids) = self.runtime.list_containers(&filter).await {
                for id in ids {
                    report.leftovers.push(format!("container {} ({})", id, group.name));
                }
            }
            if let Ok(names) = self.runtime.list_volumes(Some(&group.name)).await {
                for name in names {
                    report.leftovers.push(format!("volume {}", name));
                }
            }
        }
        if let Ok(true) = self.runtime.network_exists(&self.config.network).await {
            report.leftovers.push(format!("network {}", self.config.network));
        }

        if report.leftovers.is_empty() {
            info!("Verification found no remaining project resources");
        } else {
            warn!(count = report.leftovers.len(), "Resources remain after reset");
        }
    }
}
