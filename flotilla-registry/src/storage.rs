use crate::perishable::{LiveOffer, PerishableOffer};
use dashmap::DashMap;
use std::sync::Arc;

/// Error type surfaced by walk visitors, propagated verbatim to the caller
pub type WalkError = Box<dyn std::error::Error + Send + Sync>;

/// Concurrent keyed container of live offers
///
/// Several keys may alias the same `LiveOffer`. Aliases share its claim
/// flag, so claiming through one alias claims them all; entries are never
/// deep-copied on insert.
pub struct OfferStorage {
    offers: DashMap<String, Arc<LiveOffer>>,
}

impl OfferStorage {
    pub fn new() -> Self {
        Self {
            offers: DashMap::new(),
        }
    }

    /// Insert or overwrite the entry for `offer_id`
    pub fn add(&self, offer_id: &str, offer: Arc<LiveOffer>) {
        self.offers.insert(offer_id.to_string(), offer);
    }

    /// Remove and return the entry for `offer_id`
    pub fn remove(&self, offer_id: &str) -> Option<Arc<LiveOffer>> {
        self.offers.remove(offer_id).map(|(_, offer)| offer)
    }

    pub fn get(&self, offer_id: &str) -> Option<Arc<LiveOffer>> {
        self.offers.get(offer_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Snapshot of the current entries, keys included, for the maintenance sweep
    pub(crate) fn entries(&self) -> Vec<(String, Arc<LiveOffer>)> {
        self.offers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Visit each stored offer until the visitor stops the scan
    ///
    /// The visitor returns `Ok(true)` to stop the scan (it found what it
    /// needed), `Ok(false)` to keep scanning, or an error, which stops the
    /// scan and is returned verbatim. Iteration covers a snapshot of the
    /// entries taken at call time: no entry is visited twice in one call,
    /// offers added mid-scan are not observed, and no storage lock is held
    /// while the visitor runs, so visitors may freely acquire, release or
    /// remove entries. Iteration order is unspecified.
    pub fn walk<F>(&self, mut visit: F) -> Result<(), WalkError>
    where
        F: FnMut(&dyn PerishableOffer) -> Result<bool, WalkError>,
    {
        let snapshot: Vec<Arc<LiveOffer>> = self
            .offers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for offer in snapshot {
            if visit(offer.as_ref())? {
                return Ok(());
            }
        }
        Ok(())
    }
}

impl Default for OfferStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flotilla_shared::ResourceOffer;

    fn live_offer() -> Arc<LiveOffer> {
        let payload = ResourceOffer::new("agent-1", "node-1.example.com", 2.0, 4096);
        Arc::new(LiveOffer::new(
            payload,
            Utc::now() + chrono::Duration::seconds(2),
        ))
    }

    #[test]
    fn test_walk_empty_storage() {
        let storage = OfferStorage::new();
        let mut walked = 0;
        let result = storage.walk(|_| {
            walked += 1;
            Ok(true)
        });
        assert!(result.is_ok());
        assert_eq!(walked, 0, "walked empty storage");
    }

    #[test]
    fn test_walk_claims_a_single_offer() {
        let storage = OfferStorage::new();
        storage.add("x", live_offer());

        let mut walked = 0;
        let mut claimed_host = None;
        storage
            .walk(|offer| {
                walked += 1;
                if offer.acquire() {
                    claimed_host = Some(offer.details().hostname.clone());
                    return Ok(true);
                }
                Ok(false)
            })
            .unwrap();
        assert_eq!(walked, 1);
        assert_eq!(claimed_host.as_deref(), Some("node-1.example.com"));

        // claim still held, so a second scan finds nothing usable
        let mut walked = 0;
        let mut found = false;
        storage
            .walk(|offer| {
                walked += 1;
                if offer.acquire() {
                    found = true;
                    return Ok(true);
                }
                Ok(false)
            })
            .unwrap();
        assert_eq!(walked, 1);
        assert!(!found, "claimed offer was acquired a second time");
    }

    #[test]
    fn test_walk_visits_every_alias() {
        let storage = OfferStorage::new();
        let offer = live_offer();
        assert!(offer.acquire());
        // two keys aliasing one offer share its claim flag
        storage.add("x", offer.clone());
        storage.add("y", offer);

        let mut walked = 0;
        storage
            .walk(|offer| {
                walked += 1;
                Ok(offer.acquire())
            })
            .unwrap();
        assert_eq!(walked, 2, "both aliases should be visited");
    }

    #[test]
    fn test_walk_early_stop() {
        let storage = OfferStorage::new();
        let offer = live_offer();
        storage.add("x", offer.clone());
        storage.add("y", offer);

        let mut walked = 0;
        storage
            .walk(|_| {
                walked += 1;
                Ok(true)
            })
            .unwrap();
        assert_eq!(walked, 1, "visitor asked to stop after the first entry");
    }

    #[test]
    fn test_walk_propagates_visitor_error() {
        let storage = OfferStorage::new();
        storage.add("x", live_offer());

        let mut walked = 0;
        let err = storage
            .walk(|_| {
                walked += 1;
                Err("baz".into())
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "baz");
        assert_eq!(walked, 1);
    }

    #[test]
    fn test_add_overwrites_existing_key() {
        let storage = OfferStorage::new();
        let first = live_offer();
        assert!(first.acquire());
        storage.add("x", first);
        storage.add("x", live_offer());

        assert_eq!(storage.len(), 1);
        let current = storage.get("x").unwrap();
        assert!(current.acquire(), "overwritten entry kept the old claim");
    }

    #[test]
    fn test_remove_returns_the_offer() {
        let storage = OfferStorage::new();
        storage.add("x", live_offer());
        assert!(storage.remove("x").is_some());
        assert!(storage.remove("x").is_none());
        assert!(storage.is_empty());
    }
}
