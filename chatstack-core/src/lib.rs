//! chatstack core library
//!
//! Domain types, the container runtime abstraction, and the lifecycle
//! orchestrator for the chatstack multi-service deployment tool.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod runtime;
pub mod types;
pub mod workspace;

// Re-export commonly used items
pub use config::DeployConfig;
pub use error::{Result, StackError};
pub use orchestrator::{GroupReport, Orchestrator, ResetReport};
pub use prompt::{OperatorPrompt, TerminalPrompt};
pub use runtime::{ContainerRuntime, DockerRuntime};
pub use types::{
    ContainerFilter, DeploymentState, NetworkDriver, ServiceGroup, ServiceStatus, StatusFilter,
};
pub use workspace::{GitCheckout, Workspace};
