use crate::decline::OfferDecliner;
use std::sync::Arc;
use std::time::Duration;

/// Default lifespan of an offer from the moment it is added
pub const DEFAULT_OFFER_TTL: Duration = Duration::from_secs(60);
/// Default grace period an expired, unclaimed offer is retained before decline
pub const DEFAULT_LINGER_TTL: Duration = Duration::from_secs(30);
/// Default delay between a removal and its listener notification
pub const DEFAULT_LISTENER_DELAY: Duration = Duration::from_secs(1);

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Declarative policy for an offer registry, fixed once the registry starts
pub struct OfferRegistryConfig {
    /// Lifespan of a freshly added offer
    pub ttl: Duration,
    /// How long an expired, unclaimed offer lingers before being declined
    pub linger_ttl: Duration,
    /// Delay between a removal and the listener notification for it
    pub listener_delay: Duration,
    /// Callback that returns an unused offer to the cluster manager
    pub decliner: Arc<dyn OfferDecliner>,
}

impl OfferRegistryConfig {
    pub fn new(decliner: Arc<dyn OfferDecliner>) -> Self {
        Self {
            ttl: DEFAULT_OFFER_TTL,
            linger_ttl: DEFAULT_LINGER_TTL,
            listener_delay: DEFAULT_LISTENER_DELAY,
            decliner,
        }
    }

    /// Cadence of the maintenance sweep
    ///
    /// Tracks the offer ttl so offers are swept within one lifetime, floored
    /// so a zero ttl cannot busy-loop and capped so long-lived offers still
    /// get a regular sweep.
    pub(crate) fn sweep_interval(&self) -> Duration {
        self.ttl.clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL)
    }
}
