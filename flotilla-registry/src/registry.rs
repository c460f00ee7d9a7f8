use crate::config::OfferRegistryConfig;
use crate::listener::RemovalListener;
use crate::perishable::{LiveOffer, PerishableOffer};
use crate::storage::{OfferStorage, WalkError};
use chrono::Utc;
use flotilla_shared::{OfferRemovedEvent, RemovalReason, ResourceOffer};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Service façade over offer storage: intake, scan-and-claim, and the
/// background maintenance sweep that declines expired offers
///
/// Each registry owns its own sweeper task; `shutdown` tears it down
/// deterministically, so multiple registries can coexist in one process.
pub struct OfferRegistry {
    inner: Arc<RegistryInner>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

struct RegistryInner {
    config: OfferRegistryConfig,
    storage: OfferStorage,
    listeners: RwLock<Vec<Arc<dyn RemovalListener>>>,
    shutdown: Notify,
}

impl OfferRegistry {
    /// Build the registry and start its maintenance sweep
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: OfferRegistryConfig) -> Self {
        let inner = Arc::new(RegistryInner {
            config,
            storage: OfferStorage::new(),
            listeners: RwLock::new(Vec::new()),
            shutdown: Notify::new(),
        });
        let sweeper = tokio::spawn(Self::maintenance_loop(inner.clone()));
        Self {
            inner,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    /// Accept a new offer under `offer_id`, alive for the configured ttl
    pub fn add(&self, offer_id: &str, payload: ResourceOffer) {
        let expiry = Utc::now() + self.inner.config.ttl;
        self.inner
            .storage
            .add(offer_id, Arc::new(LiveOffer::new(payload, expiry)));
        debug!("Offer {} registered, expires at {}", offer_id, expiry);
    }

    /// Scan live offers with a claiming visitor; see `OfferStorage::walk`
    pub fn walk<F>(&self, visit: F) -> Result<(), WalkError>
    where
        F: FnMut(&dyn PerishableOffer) -> Result<bool, WalkError>,
    {
        self.inner.storage.walk(visit)
    }

    /// Claim/read handle for a specific offer
    pub fn get(&self, offer_id: &str) -> Option<Arc<LiveOffer>> {
        self.inner.storage.get(offer_id)
    }

    pub fn len(&self) -> usize {
        self.inner.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.storage.is_empty()
    }

    /// Remove an offer the caller has claimed and actually launched against
    ///
    /// Claiming never removes: a scheduling pass that uses an offer must
    /// consume it explicitly, otherwise the entry stays until the sweep
    /// declines it. Returns false if the offer was not present.
    pub fn consume(&self, offer_id: &str) -> bool {
        match self.inner.storage.remove(offer_id) {
            Some(_) => {
                debug!("Offer {} consumed", offer_id);
                Self::notify_removed(
                    &self.inner,
                    OfferRemovedEvent::new(offer_id, RemovalReason::Consumed),
                );
                true
            }
            None => false,
        }
    }

    /// Drop an offer the cluster manager has rescinded
    ///
    /// No decline round-trip is made: the manager already withdrew it.
    pub fn rescind(&self, offer_id: &str) -> bool {
        match self.inner.storage.remove(offer_id) {
            Some(_) => {
                info!("Offer {} rescinded by the cluster manager", offer_id);
                Self::notify_removed(
                    &self.inner,
                    OfferRemovedEvent::new(offer_id, RemovalReason::Rescinded),
                );
                true
            }
            None => false,
        }
    }

    /// Register a listener for offer-removal events
    pub async fn add_listener(&self, listener: Arc<dyn RemovalListener>) {
        self.inner.listeners.write().await.push(listener);
    }

    /// Stop the maintenance sweep and wait for it to exit
    pub async fn shutdown(&self) {
        self.inner.shutdown.notify_one();
        let sweeper = self.sweeper.lock().await.take();
        if let Some(sweeper) = sweeper {
            let _ = sweeper.await;
        }
    }

    async fn maintenance_loop(inner: Arc<RegistryInner>) {
        let mut tick = tokio::time::interval(inner.config.sweep_interval());
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = tick.tick() => Self::sweep(&inner).await,
                _ = inner.shutdown.notified() => break,
            }
        }
        debug!("Offer maintenance sweep stopped");
    }

    /// One maintenance pass: decline offers that have expired and outlived
    /// their linger window without being claimed
    async fn sweep(inner: &Arc<RegistryInner>) {
        let now = Utc::now();
        for (offer_id, offer) in inner.storage.entries() {
            if !offer.has_expired() {
                continue;
            }
            if now < offer.expiry() + inner.config.linger_ttl {
                continue;
            }
            // claim it so no scheduling pass can grab it mid-decline; a
            // failed acquire means the offer is in active use, revisit later
            if !offer.acquire() {
                continue;
            }
            match inner.config.decliner.decline_offer(&offer_id).await {
                Ok(()) => {
                    inner.storage.remove(&offer_id);
                    debug!("Offer {} declined after lingering unclaimed", offer_id);
                    Self::notify_removed(
                        inner,
                        OfferRemovedEvent::new(&offer_id, RemovalReason::Declined),
                    );
                }
                Err(e) => {
                    // deferred, not abandoned: unclaim and retry next pass
                    warn!("Failed to decline offer {}: {}", offer_id, e);
                    offer.release();
                }
            }
        }
    }

    fn notify_removed(inner: &Arc<RegistryInner>, event: OfferRemovedEvent) {
        let inner = inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(inner.config.listener_delay).await;
            let listeners = inner.listeners.read().await.clone();
            for listener in listeners {
                listener.offer_removed(&event).await;
            }
        });
    }
}

impl Drop for OfferRegistry {
    fn drop(&mut self) {
        // a registry dropped without shutdown must not leave its sweeper behind
        if let Ok(mut sweeper) = self.sweeper.try_lock() {
            if let Some(sweeper) = sweeper.take() {
                sweeper.abort();
            }
        }
    }
}
