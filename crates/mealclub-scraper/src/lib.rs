pub mod client;
pub mod error;
pub mod orders;
pub mod parse;
pub mod types;

pub use client::{map_url, PortalClient};
pub use error::ScraperError;
pub use orders::OrderScraper;
pub use types::{Credentials, DeliveryRecord, DeliveryStatus, DishEntry, OrderId, OrderRecord};
