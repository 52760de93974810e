//! Delivery overview and status buckets from the listing page forms.

use crate::error::ScraperError;
use crate::parse::parse_delivery_forms;
use crate::types::{DeliveryRecord, DeliveryStatus};

use super::OrderScraper;

impl OrderScraper {
    /// Parses every delivery form on the listing page.
    ///
    /// # Errors
    ///
    /// Propagates transport errors from
    /// [`crate::PortalClient::authenticate_and_fetch_main`].
    pub async fn list_deliveries(&self) -> Result<Vec<DeliveryRecord>, ScraperError> {
        let document = self.client.authenticate_and_fetch_main().await?;
        let deliveries = parse_delivery_forms(&document);
        tracing::info!(count = deliveries.len(), "parsed deliveries");
        Ok(deliveries)
    }

    /// Deliveries whose `"Status"` field is exactly `status.label()`.
    ///
    /// A delivery with no status, or one the portal spells differently, is
    /// in no bucket.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::list_deliveries`].
    pub async fn deliveries_with_status(
        &self,
        status: DeliveryStatus,
    ) -> Result<Vec<DeliveryRecord>, ScraperError> {
        Ok(self
            .list_deliveries()
            .await?
            .into_iter()
            .filter(|delivery| delivery.status() == Some(status))
            .collect())
    }

    /// New deliveries that have not been accepted yet.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::list_deliveries`].
    pub async fn unconfirmed_deliveries(&self) -> Result<Vec<DeliveryRecord>, ScraperError> {
        self.deliveries_with_status(DeliveryStatus::Unconfirmed)
            .await
    }

    /// Accepted deliveries that have not been picked up.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::list_deliveries`].
    pub async fn confirmed_deliveries(&self) -> Result<Vec<DeliveryRecord>, ScraperError> {
        self.deliveries_with_status(DeliveryStatus::Confirmed).await
    }

    /// # Errors
    ///
    /// Propagates any error from [`Self::list_deliveries`].
    pub async fn picked_up_deliveries(&self) -> Result<Vec<DeliveryRecord>, ScraperError> {
        self.deliveries_with_status(DeliveryStatus::PickedUp).await
    }

    /// Deliveries handed to the customer.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::list_deliveries`].
    pub async fn delivered_deliveries(&self) -> Result<Vec<DeliveryRecord>, ScraperError> {
        self.deliveries_with_status(DeliveryStatus::Delivered).await
    }
}
