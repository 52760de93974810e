//! Order extraction on top of [`PortalClient`].

mod deliveries;

use crate::client::PortalClient;
use crate::error::ScraperError;
use crate::parse::{parse_order_ids, parse_order_page};
use crate::types::{OrderId, OrderRecord};

/// Turns portal pages into order and delivery records.
///
/// Nothing is cached: every call re-authenticates and re-parses, and pages
/// are fetched one at a time in discovery order.
pub struct OrderScraper {
    client: PortalClient,
}

impl OrderScraper {
    #[must_use]
    pub fn new(client: PortalClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &PortalClient {
        &self.client
    }

    /// Human-facing link to an order's detail page.
    #[must_use]
    pub fn order_url(&self, order_id: &OrderId) -> String {
        self.client.order_url(order_id)
    }

    /// Lists the ids of the orders on the listing page, in document order.
    ///
    /// Returns an empty `Vec` when the page has no order rows.
    ///
    /// # Errors
    ///
    /// Propagates transport errors from [`PortalClient::authenticate_and_fetch_main`].
    pub async fn list_order_ids(&self) -> Result<Vec<OrderId>, ScraperError> {
        let document = self.client.authenticate_and_fetch_main().await?;
        let ids = parse_order_ids(&document);
        tracing::info!(count = ids.len(), "discovered orders");
        Ok(ids)
    }

    /// Fetches and parses one order's detail page.
    ///
    /// # Errors
    ///
    /// - Transport errors from [`PortalClient::authenticate_and_fetch`].
    /// - [`ScraperError::MissingElement`], [`ScraperError::MalformedOverview`]
    ///   or [`ScraperError::TooFewTables`] if the page is not shaped as expected.
    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderRecord, ScraperError> {
        let url = self.client.order_url(order_id);
        let document = self.client.authenticate_and_fetch(&url).await?;
        let order = parse_order_page(&document, &url)?;
        tracing::debug!(
            order_id = %order_id,
            restaurant = order.restaurant(),
            dishes = order.dishes().len(),
            "parsed order"
        );
        Ok(order)
    }

    /// Fetches every listed order, sequentially and in listing order.
    ///
    /// All-or-nothing: the first failing order aborts the whole call.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::list_order_ids`] or [`Self::fetch_order`].
    pub async fn list_orders(&self) -> Result<Vec<OrderRecord>, ScraperError> {
        let ids = self.list_order_ids().await?;
        let mut orders = Vec::with_capacity(ids.len());
        for order_id in &ids {
            orders.push(self.fetch_order(order_id).await?);
        }
        Ok(orders)
    }

    /// The first order of [`Self::list_orders`], or `None` when there are no
    /// orders.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::list_orders`].
    pub async fn latest_order(&self) -> Result<Option<OrderRecord>, ScraperError> {
        Ok(self.list_orders().await?.into_iter().next())
    }
}
