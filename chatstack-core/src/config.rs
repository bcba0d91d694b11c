//! Deployment configuration.
//!
//! The group list, their start order, and all shared resource names live in
//! one immutable configuration object handed to the orchestrator at
//! construction. Nothing about the deployment is ambient state.

use crate::error::{Result, StackError};
use crate::types::{NetworkDriver, ServiceGroup};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Persistent configuration for a chatstack deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Project name; also the compose project prefix and a volume-sweep pattern.
    pub project: String,

    /// Deployment repository checkout directory.
    pub checkout_dir: PathBuf,

    /// Deployment repository URL, cloned on first deploy.
    pub repo_url: String,

    /// Shared network all groups attach to.
    pub network: String,
    pub network_driver: NetworkDriver,

    /// Shared volumes created before bring-up.
    pub volumes: Vec<String>,

    /// The ordered service groups. Bring-up ascends `start_order`, teardown
    /// descends it.
    pub groups: Vec<ServiceGroup>,

    /// Presence-poll interval during bring-up, in seconds.
    pub poll_interval_secs: u64,

    /// Bring-up ceiling per group, in seconds.
    pub start_timeout_secs: u64,

    /// Required literals for the two reset confirmations. Deliberately
    /// distinct words so a reflexive double-Enter cannot pass both.
    pub reset_first_literal: String,
    pub reset_second_literal: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            project: "chatstack".to_string(),
            checkout_dir: PathBuf::from("/opt/chatstack"),
            repo_url: "https://github.com/chatstack/chatstack-deploy.git".to_string(),
            network: "chatstack_net".to_string(),
            network_driver: NetworkDriver::Bridge,
            volumes: vec!["traefik_letsencrypt".to_string(), "redis_data".to_string()],
            groups: vec![
                ServiceGroup::new("traefik", "traefik/docker-compose.yml", 1),
                ServiceGroup::new("redis", "redis/docker-compose.yml", 2),
                ServiceGroup::new("supabase", "supabase/docker/docker-compose.yml", 3),
                ServiceGroup::new("supabase-s3", "supabase/docker/docker-compose.s3.yml", 4),
                ServiceGroup::new("n8n", "n8n/docker-compose.yml", 5),
                ServiceGroup::new("typebot", "typebot/docker-compose.yml", 6),
            ],
            poll_interval_secs: 5,
            start_timeout_secs: 1800,
            reset_first_literal: "RESET".to_string(),
            reset_second_literal: "DESTROY".to_string(),
        }
    }
}

impl DeployConfig {
    /// Default location of the configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("/etc/chatstack/config.json")
    }

    /// Load configuration from the given path, or defaults if it is absent.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| StackError::Io { path: path.to_path_buf(), source: e })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            StackError::InvalidConfig { reason: format!("failed to parse config: {}", e) }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StackError::Io { path: parent.to_path_buf(), source: e })?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            StackError::InvalidConfig { reason: format!("failed to serialize config: {}", e) }
        })?;
        std::fs::write(path, content)
            .map_err(|e| StackError::Io { path: path.to_path_buf(), source: e })
    }

    /// Reject duplicate group names or start orders.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let mut orders = HashSet::new();
        for group in &self.groups {
            if !names.insert(group.name.as_str()) {
                return Err(StackError::InvalidConfig {
                    reason: format!("duplicate group name: {}", group.name),
                });
            }
            if !orders.insert(group.start_order) {
                return Err(StackError::InvalidConfig {
                    reason: format!(
                        "duplicate start order {} for group {}",
                        group.start_order, group.name
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_groups_form_a_total_order() {
        let config = DeployConfig::default();
        config.validate().unwrap();

        let mut orders: Vec<u32> = config.groups.iter().map(|g| g.start_order).collect();
        let sorted = {
            let mut s = orders.clone();
            s.sort_unstable();
            s
        };
        assert_eq!(orders, sorted);
        orders.dedup();
        assert_eq!(orders.len(), config.groups.len());
        assert_eq!(config.groups[0].name, "traefik");
        assert_eq!(config.groups.last().unwrap().name, "typebot");
    }

    #[test]
    fn validate_rejects_duplicate_order() {
        let mut config = DeployConfig::default();
        config.groups.push(ServiceGroup::new("dup", "dup/docker-compose.yml", 1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DeployConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.project, "chatstack");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = DeployConfig::default();
        config.poll_interval_secs = 1;
        config.save(&path).unwrap();

        let loaded = DeployConfig::load(&path).unwrap();
        assert_eq!(loaded.poll_interval_secs, 1);
        assert_eq!(loaded.groups.len(), config.groups.len());
    }
}
