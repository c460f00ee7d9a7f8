pub mod models;

pub use models::events::{OfferRemovedEvent, RemovalReason};
pub use models::offer::{PortRange, ResourceOffer};
