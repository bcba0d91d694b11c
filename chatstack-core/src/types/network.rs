//! Network domain types.

use serde::{Deserialize, Serialize};

/// Network driver type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkDriver {
    #[default]
    Bridge,
    Overlay,
}

impl std::fmt::Display for NetworkDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkDriver::Bridge => write!(f, "bridge"),
            NetworkDriver::Overlay => write!(f, "overlay"),
        }
    }
}

impl std::str::FromStr for NetworkDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bridge" => Ok(NetworkDriver::Bridge),
            "overlay" => Ok(NetworkDriver::Overlay),
            _ => Err(format!("Unknown network driver: {}", s)),
        }
    }
}
