use async_trait::async_trait;
use flotilla_shared::OfferRemovedEvent;
use tokio::sync::mpsc;

/// Notified after an offer has been removed from the registry
///
/// Delivery is delayed by the configured `listener_delay` and happens
/// outside all registry state, so a slow listener never stalls scheduling
/// traffic. Collaborators that keep a shadow view of outstanding offers
/// register one of these.
#[async_trait]
pub trait RemovalListener: Send + Sync {
    async fn offer_removed(&self, event: &OfferRemovedEvent);
}

/// Listener adapter that forwards removal events into an mpsc channel
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<OfferRemovedEvent>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OfferRemovedEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl RemovalListener for ChannelListener {
    async fn offer_removed(&self, event: &OfferRemovedEvent) {
        // the receiver may already be gone; notifications are best effort
        let _ = self.tx.send(event.clone());
    }
}
