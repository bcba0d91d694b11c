//! Structured container listing filters.
//!
//! The orchestrator never parses raw engine output; filters are expressed as
//! data and translated into engine arguments by the runtime implementation.

/// Coarse status filter for container listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Running,
    Exited,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Running => "running",
            StatusFilter::Exited => "exited",
        }
    }
}

/// Filter for container listings. Fields combine conjunctively.
#[derive(Debug, Clone, Default)]
pub struct ContainerFilter {
    /// Substring match against the container name.
    pub name_pattern: Option<String>,

    /// Containers attached to the named network.
    pub network: Option<String>,

    /// Containers in the given status.
    pub status: Option<StatusFilter>,
}

impl ContainerFilter {
    pub fn by_name(pattern: impl Into<String>) -> Self {
        Self { name_pattern: Some(pattern.into()), ..Default::default() }
    }

    pub fn on_network(network: impl Into<String>) -> Self {
        Self { network: Some(network.into()), ..Default::default() }
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = Some(status);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_single_fields() {
        let f = ContainerFilter::by_name("redis");
        assert_eq!(f.name_pattern.as_deref(), Some("redis"));
        assert!(f.network.is_none());

        let f = ContainerFilter::on_network("chatstack_net").with_status(StatusFilter::Running);
        assert_eq!(f.network.as_deref(), Some("chatstack_net"));
        assert_eq!(f.status, Some(StatusFilter::Running));
    }
}
