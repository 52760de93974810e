//! Command handlers for order and delivery lookups.
//!
//! Each handler receives the scraper built in `main`; errors from the portal
//! propagate unchanged and end the process with a non-zero status.

use mealclub_scraper::{DeliveryRecord, DeliveryStatus, OrderId, OrderRecord, OrderScraper};
use serde::Serialize;

const NO_ORDERS_MESSAGE: &str = "You don't have any orders yet!";

/// One-line summary of an order, as the assistant would say it.
pub(crate) fn latest_order_speech(order: &OrderRecord) -> String {
    format!(
        "Your current order is from {} at {}",
        order.restaurant(),
        order.pickup_time().unwrap_or("an unknown time")
    )
}

/// Full text rendering: summary line, item list and the detail link.
pub(crate) fn render_latest(order: Option<&OrderRecord>, order_url: Option<&str>) -> String {
    let Some(order) = order else {
        return NO_ORDERS_MESSAGE.to_owned();
    };

    let mut out = latest_order_speech(order);
    out.push('\n');
    out.push_str(&render_items(order));
    if let Some(url) = order_url {
        out.push_str(&format!("View Order: {url}\n"));
    }
    out
}

pub(crate) fn render_items(order: &OrderRecord) -> String {
    order
        .items()
        .map(|(title, description)| format!("  {title}: {description}\n"))
        .collect()
}

pub(crate) fn render_delivery(delivery: &DeliveryRecord) -> String {
    delivery
        .fields()
        .map(|(field, value)| format!("{field}: {value}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_order(order: &OrderRecord) {
    println!("{}", order.restaurant());
    print!("{}", render_items(order));
}

pub(crate) async fn run_latest(scraper: &OrderScraper, json: bool) -> anyhow::Result<()> {
    let latest = scraper.latest_order().await?;

    if json {
        return print_json(&latest);
    }

    let order_url = latest
        .as_ref()
        .and_then(OrderRecord::order_id)
        .map(|id| scraper.order_url(&id));
    println!(
        "{}",
        render_latest(latest.as_ref(), order_url.as_deref()).trim_end()
    );
    Ok(())
}

pub(crate) async fn run_ids(scraper: &OrderScraper, json: bool) -> anyhow::Result<()> {
    let ids = scraper.list_order_ids().await?;
    if json {
        return print_json(&ids);
    }
    for id in &ids {
        println!("{id}");
    }
    Ok(())
}

pub(crate) async fn run_order(scraper: &OrderScraper, id: &str, json: bool) -> anyhow::Result<()> {
    let order = scraper.fetch_order(&OrderId::from(id)).await?;
    if json {
        return print_json(&order);
    }
    print_order(&order);
    Ok(())
}

pub(crate) async fn run_orders(scraper: &OrderScraper, json: bool) -> anyhow::Result<()> {
    let orders = scraper.list_orders().await?;
    if json {
        return print_json(&orders);
    }
    if orders.is_empty() {
        println!("{NO_ORDERS_MESSAGE}");
    }
    for order in &orders {
        print_order(order);
    }
    Ok(())
}

pub(crate) async fn run_deliveries(
    scraper: &OrderScraper,
    status: Option<DeliveryStatus>,
    json: bool,
) -> anyhow::Result<()> {
    let deliveries = match status {
        Some(status) => scraper.deliveries_with_status(status).await?,
        None => scraper.list_deliveries().await?,
    };
    tracing::debug!(count = deliveries.len(), ?status, "deliveries fetched");

    if json {
        return print_json(&deliveries);
    }
    for delivery in &deliveries {
        println!("{}", render_delivery(delivery));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use mealclub_scraper::DishEntry;

    use super::*;

    fn sample_order() -> OrderRecord {
        let mut order = OrderRecord::new("Tony's Pizza");
        order.insert("OrderId", "881");
        order.insert("Pickup Time", "6:15 PM");
        order.push_dish(DishEntry {
            name: "PepperoniPizza".to_owned(),
            price: "$12.00".to_owned(),
        });
        order
    }

    #[test]
    fn speech_names_restaurant_and_pickup_time() {
        assert_eq!(
            latest_order_speech(&sample_order()),
            "Your current order is from Tony's Pizza at 6:15 PM"
        );
    }

    #[test]
    fn render_latest_without_order_says_so() {
        assert_eq!(render_latest(None, None), "You don't have any orders yet!");
    }

    #[test]
    fn render_latest_lists_items_and_link() {
        let order = sample_order();
        let text = render_latest(Some(&order), Some("http://d.mealclub.com/order.php?id=881"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Your current order is from Tony's Pizza at 6:15 PM",
                "  Restaurant: Tony's Pizza",
                "  OrderId: 881",
                "  Pickup Time: 6:15 PM",
                "  PepperoniPizza: $12.00",
                "View Order: http://d.mealclub.com/order.php?id=881",
            ]
        );
    }

    #[test]
    fn render_delivery_joins_fields() {
        let mut delivery = DeliveryRecord::new();
        delivery.insert("OrderId", "881");
        delivery.insert("Status", "Confirmed");
        assert_eq!(render_delivery(&delivery), "OrderId: 881 | Status: Confirmed");
    }
}
