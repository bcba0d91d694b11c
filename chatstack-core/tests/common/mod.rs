//! Shared test doubles: a recording mock runtime, a scripted prompt, and an
//! in-memory workspace. No Docker engine is required.

// Not every helper is used by every test binary.
#![allow(dead_code)]

use async_trait::async_trait;
use chatstack_core::{
    ContainerFilter, ContainerRuntime, DeployConfig, DeploymentState, NetworkDriver,
    OperatorPrompt, Orchestrator, Result, ServiceGroup, ServiceStatus, StackError, Workspace,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One recorded runtime invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    NetworkExists(String),
    CreateNetwork(String),
    VolumeExists(String),
    CreateVolume(String),
    StackStatus(String),
    StackUp(String),
    StackDown(String),
    StackRestart(String),
    ListByName(String),
    ListByNetwork(String),
    RemoveContainers(usize),
    ListVolumes,
    RemoveVolumes(Vec<String>),
    PruneVolumes,
    RemoveNetwork(String),
    ListImages(String),
    RemoveImages(Vec<String>),
    PruneImages,
    SystemPrune,
}

/// Recording mock for the container runtime.
///
/// Group identity is taken from the compose project name the orchestrator
/// passes to each stack primitive.
#[derive(Default)]
pub struct MockRuntime {
    pub calls: Mutex<Vec<Call>>,
    pub networks: Mutex<HashSet<String>>,
    pub volumes: Mutex<HashSet<String>>,
    /// Groups whose containers currently exist.
    pub present: Mutex<HashSet<String>>,
    /// Per-group states reported by stack_status.
    pub states: Mutex<HashMap<String, DeploymentState>>,
    /// Container ids attached to the shared network.
    pub network_containers: Mutex<Vec<String>>,
    /// Image references known to the engine.
    pub images: Mutex<Vec<String>>,

    /// Groups whose start primitive fails.
    pub fail_up: HashSet<String>,
    /// Groups whose stop primitive fails.
    pub fail_down: HashSet<String>,
    /// Groups whose restart primitive fails.
    pub fail_restart: HashSet<String>,
    /// Volume creation errors but the volume appears anyway (lost race).
    pub volume_create_conflict: bool,
    /// Volume creation silently does nothing.
    pub volume_create_noop: bool,
    /// Network creation silently does nothing.
    pub network_create_noop: bool,
    /// Started groups never show a container (drives the timeout path).
    pub never_present: bool,
}

impl MockRuntime {
    pub fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of groups whose start primitive was invoked, in order.
    pub fn started(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::StackUp(g) => Some(g),
                _ => None,
            })
            .collect()
    }

    /// Names of groups whose stop primitive was invoked, in order.
    pub fn stopped(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::StackDown(g) => Some(g),
                _ => None,
            })
            .collect()
    }
}

fn container_id(group: &str) -> String {
    format!("{}-cid", group)
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn network_exists(&self, name: &str) -> Result<bool> {
        self.record(Call::NetworkExists(name.to_string()));
        Ok(self.networks.lock().unwrap().contains(name))
    }

    async fn create_network(&self, name: &str, _driver: NetworkDriver) -> Result<()> {
        self.record(Call::CreateNetwork(name.to_string()));
        if !self.network_create_noop {
            self.networks.lock().unwrap().insert(name.to_string());
        }
        Ok(())
    }

    async fn volume_exists(&self, name: &str) -> Result<bool> {
        self.record(Call::VolumeExists(name.to_string()));
        Ok(self.volumes.lock().unwrap().contains(name))
    }

    async fn create_volume(&self, name: &str) -> Result<()> {
        self.record(Call::CreateVolume(name.to_string()));
        if !self.volume_create_noop {
            self.volumes.lock().unwrap().insert(name.to_string());
        }
        if self.volume_create_conflict {
            return Err(StackError::Internal(format!("volume {} already exists", name)));
        }
        Ok(())
    }

    async fn stack_status(
        &self,
        project: &str,
        _definition: &Path,
        _project_dir: &Path,
    ) -> Result<Vec<ServiceStatus>> {
        let group = project.to_string();
        self.record(Call::StackStatus(group.clone()));
        Ok(match self.states.lock().unwrap().get(&group) {
            Some(state) => {
                vec![ServiceStatus { name: format!("{}-1", group), state: *state }]
            }
            None => Vec::new(),
        })
    }

    async fn stack_up(&self, project: &str, _definition: &Path, _project_dir: &Path) -> Result<()> {
        let group = project.to_string();
        self.record(Call::StackUp(group.clone()));
        if self.fail_up.contains(&group) {
            return Err(StackError::Internal("compose up exited with status 1".to_string()));
        }
        if !self.never_present {
            self.present.lock().unwrap().insert(group);
        }
        Ok(())
    }

    async fn stack_down(
        &self,
        project: &str,
        _definition: &Path,
        _project_dir: &Path,
    ) -> Result<()> {
        let group = project.to_string();
        self.record(Call::StackDown(group.clone()));
        if self.fail_down.contains(&group) {
            return Err(StackError::Internal("compose down exited with status 1".to_string()));
        }
        self.present.lock().unwrap().remove(&group);
        Ok(())
    }

    async fn stack_restart(
        &self,
        project: &str,
        _definition: &Path,
        _project_dir: &Path,
    ) -> Result<()> {
        let group = project.to_string();
        self.record(Call::StackRestart(group.clone()));
        if self.fail_restart.contains(&group) {
            return Err(StackError::Internal("compose restart exited with status 1".to_string()));
        }
        Ok(())
    }

    async fn list_containers(&self, filter: &ContainerFilter) -> Result<Vec<String>> {
        if let Some(network) = &filter.network {
            self.record(Call::ListByNetwork(network.clone()));
            return Ok(self.network_containers.lock().unwrap().clone());
        }
        let pattern = filter.name_pattern.clone().unwrap_or_default();
        self.record(Call::ListByName(pattern.clone()));
        Ok(if self.present.lock().unwrap().contains(&pattern) {
            vec![container_id(&pattern)]
        } else {
            Vec::new()
        })
    }

    async fn remove_containers(&self, ids: &[String], _force: bool) -> Result<()> {
        self.record(Call::RemoveContainers(ids.len()));
        for id in ids {
            if let Some(group) = id.strip_suffix("-cid") {
                self.present.lock().unwrap().remove(group);
            }
        }
        self.network_containers.lock().unwrap().retain(|id| !ids.contains(id));
        Ok(())
    }

    async fn list_volumes(&self, name_pattern: Option<&str>) -> Result<Vec<String>> {
        self.record(Call::ListVolumes);
        let volumes = self.volumes.lock().unwrap();
        Ok(volumes
            .iter()
            .filter(|v| name_pattern.map_or(true, |p| v.contains(p)))
            .cloned()
            .collect())
    }

    async fn remove_volumes(&self, names: &[String]) -> Result<()> {
        self.record(Call::RemoveVolumes(names.to_vec()));
        let mut volumes = self.volumes.lock().unwrap();
        for name in names {
            volumes.remove(name);
        }
        Ok(())
    }

    async fn prune_dangling_volumes(&self) -> Result<()> {
        self.record(Call::PruneVolumes);
        Ok(())
    }

    async fn remove_network(&self, name: &str) -> Result<()> {
        self.record(Call::RemoveNetwork(name.to_string()));
        self.networks.lock().unwrap().remove(name);
        Ok(())
    }

    async fn list_images(&self, repo_pattern: &str) -> Result<Vec<String>> {
        self.record(Call::ListImages(repo_pattern.to_string()));
        let images = self.images.lock().unwrap();
        Ok(images.iter().filter(|i| i.contains(repo_pattern)).cloned().collect())
    }

    async fn remove_images(&self, refs: &[String]) -> Result<()> {
        self.record(Call::RemoveImages(refs.to_vec()));
        self.images.lock().unwrap().retain(|i| !refs.contains(i));
        Ok(())
    }

    async fn prune_dangling_images(&self) -> Result<()> {
        self.record(Call::PruneImages);
        Ok(())
    }

    async fn system_prune(&self, _all_images: bool, _volumes: bool) -> Result<()> {
        self.record(Call::SystemPrune);
        Ok(())
    }
}

/// Prompt answering from a fixed script. An exhausted script declines.
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self { answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()) }
    }

    pub fn declining() -> Self {
        Self::new(&[])
    }
}

#[async_trait]
impl OperatorPrompt for ScriptedPrompt {
    async fn confirm(&self, _prompt: &str, required: &str) -> bool {
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => answer == required,
            None => false,
        }
    }
}

/// Workspace recording whether it was removed or scrubbed.
#[derive(Default)]
pub struct MockWorkspace {
    pub removed: AtomicBool,
    pub scrubbed: AtomicBool,
}

#[async_trait]
impl Workspace for MockWorkspace {
    async fn remove_checkout(&self) -> Result<()> {
        self.removed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn scrub_artifacts(&self) -> Result<()> {
        self.scrubbed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// The six-group topology from the deployment: proxy first, bot builder last.
pub const GROUPS: [&str; 6] =
    ["proxy", "cache", "platform", "platform-ext", "automation", "bot-builder"];

/// Test configuration rooted at a temp checkout.
pub fn test_config(checkout: &Path) -> DeployConfig {
    DeployConfig {
        project: "chatstack".to_string(),
        checkout_dir: checkout.to_path_buf(),
        network: "chatstack_net".to_string(),
        volumes: vec!["proxy_certs".to_string(), "cache_data".to_string()],
        groups: GROUPS
            .iter()
            .enumerate()
            .map(|(i, name)| {
                ServiceGroup::new(*name, format!("{}/docker-compose.yml", name), i as u32 + 1)
            })
            .collect(),
        ..Default::default()
    }
}

/// Create `<group>/docker-compose.yml` under the checkout for each name.
pub fn write_definitions(checkout: &Path, names: &[&str]) {
    for name in names {
        let dir = checkout.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("docker-compose.yml"), "services: {}\n").unwrap();
    }
}

/// Orchestrator wired to the mocks.
pub fn orchestrator(
    config: DeployConfig,
    runtime: Arc<MockRuntime>,
    prompt: Arc<dyn OperatorPrompt>,
    workspace: Arc<MockWorkspace>,
) -> Orchestrator {
    Orchestrator::new(config, runtime, prompt, workspace)
}
