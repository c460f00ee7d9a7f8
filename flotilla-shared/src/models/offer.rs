use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inclusive range of ports granted by an offer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortRange {
    pub begin: u16,
    pub end: u16,
}

impl PortRange {
    pub fn new(begin: u16, end: u16) -> Self {
        Self { begin, end }
    }

    pub fn contains(&self, port: u16) -> bool {
        self.begin <= port && port <= self.end
    }
}

/// A resource offer advertised by the cluster manager
///
/// The registry carries this as an opaque payload; only intake and
/// scheduling code look inside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceOffer {
    pub id: Uuid,
    pub agent_id: String,
    pub hostname: String,
    pub cpus: f64,
    pub mem_mb: u64,
    pub disk_mb: u64,
    pub ports: Vec<PortRange>,
    pub attributes: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl ResourceOffer {
    /// Create a new offer for the given agent
    pub fn new(agent_id: &str, hostname: &str, cpus: f64, mem_mb: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_id: agent_id.to_string(),
            hostname: hostname.to_string(),
            cpus,
            mem_mb,
            disk_mb: 0,
            ports: Vec::new(),
            attributes: serde_json::json!({}),
            received_at: Utc::now(),
        }
    }

    /// Canonical string key under which this offer is registered
    pub fn offer_key(&self) -> String {
        self.id.to_string()
    }
}
