//! Container runtime abstraction.
//!
//! The orchestrator never talks to the engine, the network, or the disk
//! directly: every state query and every mutation goes through this trait so
//! the engine can be swapped or mocked. State is re-queried on every call and
//! never cached, because out-of-band operator actions can mutate it between
//! orchestrator invocations.

use crate::error::Result;
use crate::types::{ContainerFilter, NetworkDriver, ServiceStatus};
use async_trait::async_trait;
use std::path::Path;

mod docker;
pub use docker::DockerRuntime;

/// Container engine primitives required by the orchestrator.
///
/// Stack operations take an explicit project name, the definition path and
/// an explicit project directory; the runtime must not depend on the process
/// working directory, and it must not let the engine derive project identity
/// from the definition's location (two definitions can share a directory).
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Whether a network with this exact name exists.
    async fn network_exists(&self, name: &str) -> Result<bool>;

    /// Create a named network with the given driver.
    async fn create_network(&self, name: &str, driver: NetworkDriver) -> Result<()>;

    /// Whether a volume with this exact name exists.
    async fn volume_exists(&self, name: &str) -> Result<bool>;

    /// Create a named volume.
    async fn create_volume(&self, name: &str) -> Result<()>;

    /// Per-service states for one stack definition.
    async fn stack_status(
        &self,
        project: &str,
        definition: &Path,
        project_dir: &Path,
    ) -> Result<Vec<ServiceStatus>>;

    /// Start a stack in the background under the given project name.
    async fn stack_up(&self, project: &str, definition: &Path, project_dir: &Path) -> Result<()>;

    /// Stop and remove a stack's containers.
    async fn stack_down(&self, project: &str, definition: &Path, project_dir: &Path)
        -> Result<()>;

    /// Restart a stack's containers in place.
    async fn stack_restart(
        &self,
        project: &str,
        definition: &Path,
        project_dir: &Path,
    ) -> Result<()>;

    /// Container ids matching the filter, including stopped containers.
    async fn list_containers(&self, filter: &ContainerFilter) -> Result<Vec<String>>;

    /// Remove containers by id.
    async fn remove_containers(&self, ids: &[String], force: bool) -> Result<()>;

    /// Volume names, optionally narrowed to a name pattern.
    async fn list_volumes(&self, name_pattern: Option<&str>) -> Result<Vec<String>>;

    /// Remove volumes by name.
    async fn remove_volumes(&self, names: &[String]) -> Result<()>;

    /// Remove all dangling volumes.
    async fn prune_dangling_volumes(&self) -> Result<()>;

    /// Remove a named network.
    async fn remove_network(&self, name: &str) -> Result<()>;

    /// Image references whose repository matches the pattern.
    async fn list_images(&self, repo_pattern: &str) -> Result<Vec<String>>;

    /// Remove images by reference.
    async fn remove_images(&self, refs: &[String]) -> Result<()>;

    /// Remove all dangling images.
    async fn prune_dangling_images(&self) -> Result<()>;

    /// System-wide prune of stopped containers, unused images and networks,
    /// optionally including all unreferenced images and unused volumes.
    async fn system_prune(&self, all_images: bool, volumes: bool) -> Result<()>;
}
