pub mod config;
pub mod decline;
pub mod listener;
pub mod perishable;
pub mod registry;
pub mod storage;

pub use config::OfferRegistryConfig;
pub use decline::{DeclineError, OfferDecliner};
pub use listener::{ChannelListener, RemovalListener};
pub use perishable::{LiveOffer, PerishableOffer};
pub use registry::OfferRegistry;
pub use storage::{OfferStorage, WalkError};
