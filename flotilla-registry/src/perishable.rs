use chrono::{DateTime, Utc};
use flotilla_shared::ResourceOffer;
use std::sync::atomic::{AtomicBool, Ordering};

/// Claim/expiry contract for anything the registry hands to a scheduling pass
///
/// Holders get the capability to inspect, claim and release an offer; they
/// never own it. Claim state and expiry are orthogonal: an expired offer can
/// still be acquired, and the clock keeps running on a claimed one. Callers
/// that care must check `has_expired` themselves after acquiring.
pub trait PerishableOffer: Send + Sync {
    /// Read handle on the underlying offer payload
    fn details(&self) -> &ResourceOffer;

    /// True iff the current time is strictly past the offer's expiry
    fn has_expired(&self) -> bool;

    /// Attempt the unclaimed -> claimed transition
    ///
    /// Returns true iff this call performed the transition, i.e. the caller
    /// now holds the exclusive claim. Never consults the clock.
    fn acquire(&self) -> bool;

    /// Reset the claim to unclaimed
    ///
    /// Idempotent; releasing an already-unclaimed offer is a no-op. There is
    /// no owner token, so acquire-then-use-or-release is a caller contract.
    fn release(&self);
}

/// A live offer held by the registry: payload, absolute expiry, claim flag
pub struct LiveOffer {
    payload: ResourceOffer,
    expiry: DateTime<Utc>,
    claimed: AtomicBool,
}

impl LiveOffer {
    pub fn new(payload: ResourceOffer, expiry: DateTime<Utc>) -> Self {
        Self {
            payload,
            expiry,
            claimed: AtomicBool::new(false),
        }
    }

    /// Absolute timestamp after which this offer is stale
    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }
}

impl PerishableOffer for LiveOffer {
    fn details(&self) -> &ResourceOffer {
        &self.payload
    }

    fn has_expired(&self) -> bool {
        Utc::now() > self.expiry
    }

    fn acquire(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn release(&self) {
        self.claimed.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn offer_with_ttl(ttl: chrono::Duration) -> LiveOffer {
        let payload = ResourceOffer::new("agent-1", "node-1.example.com", 4.0, 8192);
        LiveOffer::new(payload, Utc::now() + ttl)
    }

    #[test]
    fn test_claim_cycle_and_expiry() {
        let ttl = chrono::Duration::milliseconds(200);
        let o = offer_with_ttl(ttl);

        assert!(!o.has_expired(), "offer should not have expired yet");
        assert!(o.acquire(), "1st acquisition failed");
        o.release();
        assert!(o.acquire(), "2nd acquisition failed");
        assert!(!o.acquire(), "3rd acquisition passed but prior claim was not released");
        o.release();
        assert!(o.acquire(), "4th acquisition failed");
        o.release();

        std::thread::sleep(Duration::from_millis(250));
        assert!(o.has_expired(), "offer not expired after ttl passed");
        assert!(o.acquire(), "5th acquisition failed; claims are not tied to expiration");
        assert!(!o.acquire(), "6th acquisition passed on an already claimed offer");
    }

    #[test]
    fn test_release_is_idempotent() {
        let o = offer_with_ttl(chrono::Duration::seconds(60));
        o.release();
        o.release();
        assert!(o.acquire());
        o.release();
        o.release();
        assert!(o.acquire());
    }

    #[test]
    fn test_acquire_ignores_expiry() {
        let o = offer_with_ttl(chrono::Duration::seconds(-1));
        assert!(o.has_expired());
        assert!(o.acquire(), "expired offers must still be claimable");
    }

    #[test]
    fn test_expiry_is_monotonic() {
        let o = offer_with_ttl(chrono::Duration::milliseconds(-1));
        for _ in 0..10 {
            assert!(o.has_expired());
        }
    }
}
