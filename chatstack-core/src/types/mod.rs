//! Domain types shared across the orchestrator and runtime layers.

pub mod filter;
pub mod group;
pub mod network;

pub use filter::{ContainerFilter, StatusFilter};
pub use group::{DeploymentState, ServiceGroup, ServiceStatus};
pub use network::NetworkDriver;
