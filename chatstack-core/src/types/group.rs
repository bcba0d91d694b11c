//! Service group domain types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One deployable unit: a named compose stack with a fixed position in the
/// bring-up sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceGroup {
    /// Stable identifier ("traefik", "redis", ...).
    pub name: String,

    /// Stack definition path, relative to the deployment checkout.
    /// A missing file is a handled state, not corrupt configuration.
    pub definition: PathBuf,

    /// Position in the ascending bring-up sequence. Teardown uses the exact
    /// reverse. Fixed in configuration because the order encodes real
    /// dependency edges (proxy before everything, cache before the platform).
    pub start_order: u32,
}

impl ServiceGroup {
    pub fn new(name: impl Into<String>, definition: impl Into<PathBuf>, start_order: u32) -> Self {
        Self { name: name.into(), definition: definition.into(), start_order }
    }

    /// Resolve the definition against the deployment checkout directory.
    pub fn definition_path(&self, checkout: &Path) -> PathBuf {
        checkout.join(&self.definition)
    }
}

/// Observed state of a service group.
///
/// Always derived from a fresh runtime query, never cached: manual `docker`
/// invocations and crashes can change it between orchestrator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentState {
    Absent,
    Stopped,
    Starting,
    Running,
    Restarting,
    Unknown,
}

impl DeploymentState {
    /// Fold per-service states into a single group state.
    pub fn aggregate(services: &[ServiceStatus]) -> Self {
        if services.is_empty() {
            return DeploymentState::Absent;
        }
        if services.iter().any(|s| s.state == DeploymentState::Restarting) {
            return DeploymentState::Restarting;
        }
        if services.iter().all(|s| s.state == DeploymentState::Running) {
            return DeploymentState::Running;
        }
        if services
            .iter()
            .any(|s| matches!(s.state, DeploymentState::Running | DeploymentState::Starting))
        {
            return DeploymentState::Starting;
        }
        if services
            .iter()
            .all(|s| matches!(s.state, DeploymentState::Stopped | DeploymentState::Absent))
        {
            return DeploymentState::Stopped;
        }
        DeploymentState::Unknown
    }
}

impl std::fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeploymentState::Absent => "absent",
            DeploymentState::Stopped => "stopped",
            DeploymentState::Starting => "starting",
            DeploymentState::Running => "running",
            DeploymentState::Restarting => "restarting",
            DeploymentState::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Status of one service inside a stack, as reported by the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Container/service name.
    pub name: String,

    /// Current state.
    pub state: DeploymentState,
}
