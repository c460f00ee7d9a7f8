use async_trait::async_trait;

/// Failure reported by the cluster manager when an offer is declined
#[derive(Debug, thiserror::Error)]
pub enum DeclineError {
    #[error("Offer not known to the cluster manager: {0}")]
    UnknownOffer(String),

    #[error("Cluster manager unreachable: {0}")]
    Unreachable(String),

    #[error("Decline rejected: {0}")]
    Rejected(String),
}

/// Callback seam to the cluster manager's decline endpoint
///
/// Invoked only from the maintenance sweep, never from walk or claim paths.
/// The sweep retries failed declines on later passes, so implementations
/// must tolerate seeing the same offer id more than once.
#[async_trait]
pub trait OfferDecliner: Send + Sync {
    async fn decline_offer(&self, offer_id: &str) -> Result<(), DeclineError>;
}
