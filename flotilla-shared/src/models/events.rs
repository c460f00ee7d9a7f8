use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Why an offer left the registry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemovalReason {
    /// Expired unclaimed and was returned to the cluster manager
    Declined,
    /// Claimed by a scheduling pass and launched against
    Consumed,
    /// Withdrawn by the cluster manager itself
    Rescinded,
}

/// Delivered to removal listeners after an offer leaves the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRemovedEvent {
    pub offer_id: String,
    pub reason: RemovalReason,
    /// Unix milliseconds at the moment of removal
    pub removed_at: i64,
}

impl OfferRemovedEvent {
    pub fn new(offer_id: &str, reason: RemovalReason) -> Self {
        Self {
            offer_id: offer_id.to_string(),
            reason,
            removed_at: Utc::now().timestamp_millis(),
        }
    }
}
