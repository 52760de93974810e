//! Markup walkers that turn portal pages into records.
//!
//! Everything here is pure: callers hand in an already-parsed [`Html`]
//! document (or an element of one) and get typed records back.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::types::{
    DeliveryRecord, DishEntry, OrderId, OrderRecord, RESTAURANT_FIELD, TIME_DELIVERED_FIELD,
};

/// Separator between the parts of listing-row and overview text.
const SEGMENT_SEPARATOR: &str = " - ";

const ORDER_ROW_CSS: &str = "tr.order > td > strong";
const OVERVIEW_CSS: &str = "#content > p";

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector `{css}`: {e:?}"))
}

static ORDER_ROW: LazyLock<Selector> = LazyLock::new(|| selector(ORDER_ROW_CSS));
static OVERVIEW: LazyLock<Selector> = LazyLock::new(|| selector(OVERVIEW_CSS));
static FORM: LazyLock<Selector> = LazyLock::new(|| selector("form"));
static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| selector("th"));
static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// NBSP to space, then trim surrounding whitespace.
fn normalize_value(raw: &str) -> String {
    raw.replace('\u{a0}', " ").trim().to_owned()
}

/// As [`normalize_value`], then strip colons from both ends.
fn normalize_label(raw: &str) -> String {
    raw.replace('\u{a0}', " ")
        .trim()
        .trim_matches(':')
        .to_owned()
}

/// Removes every space and newline from a dish name, then edge tabs.
fn compact_dish_name(raw: &str) -> String {
    raw.replace([' ', '\n'], "").trim_matches('\t').to_owned()
}

/// Extracts order ids from the listing page, in document order.
///
/// Each `tr.order > td > strong` cell reads `"<id> - <method>"`; the id is
/// the text before the first separator. Cells without a separator are
/// skipped with a warning.
#[must_use]
pub fn parse_order_ids(document: &Html) -> Vec<OrderId> {
    document
        .select(&ORDER_ROW)
        .filter_map(|cell| {
            let text = element_text(cell);
            let text = text.trim();
            match text.split_once(SEGMENT_SEPARATOR) {
                Some((id, _method)) => Some(OrderId::from(id)),
                None => {
                    tracing::warn!(row = %text, "parse_order_ids: skipping malformed order row");
                    None
                }
            }
        })
        .collect()
}

/// Parses a two-column (`th`/`td`) block into a [`DeliveryRecord`].
///
/// Rows missing either cell are skipped. The `"Time Delivered"` row is
/// dropped since it holds a form control.
#[must_use]
pub fn parse_delivery_info(container: ElementRef<'_>) -> DeliveryRecord {
    let mut delivery = DeliveryRecord::new();
    for row in container.select(&ROW) {
        let (Some(header), Some(data)) = (
            row.select(&HEADER_CELL).next(),
            row.select(&DATA_CELL).next(),
        ) else {
            continue;
        };
        delivery.insert(
            normalize_label(&element_text(header)),
            normalize_value(&element_text(data)),
        );
    }
    delivery.remove(TIME_DELIVERED_FIELD);
    delivery
}

/// Parses every `<form>` on the listing page as a delivery.
#[must_use]
pub fn parse_delivery_forms(document: &Html) -> Vec<DeliveryRecord> {
    document.select(&FORM).map(parse_delivery_info).collect()
}

/// Rows of the dish/charges table.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DishTable {
    pub dishes: Vec<DishEntry>,
    /// Two-cell rows such as subtotal, tax and delivery fee, in order.
    pub charges: Vec<(String, String)>,
}

/// Classifies dish-table rows purely by `td` count.
///
/// - 3 cells: dish line (`qty | name | price`). The name is compacted and
///   the price kept verbatim.
/// - 2 cells: charge line, both sides label-normalised.
/// - anything else is ignored.
#[must_use]
pub fn parse_dish_info(table: ElementRef<'_>) -> DishTable {
    let mut parsed = DishTable::default();
    for row in table.select(&ROW) {
        let cells: Vec<ElementRef<'_>> = row.select(&DATA_CELL).collect();
        match cells.as_slice() {
            [_, name, price] => parsed.dishes.push(DishEntry {
                name: compact_dish_name(&element_text(*name)),
                price: element_text(*price),
            }),
            [label, value] => parsed.charges.push((
                normalize_label(&element_text(*label)),
                normalize_label(&element_text(*value)),
            )),
            _ => {}
        }
    }
    parsed
}

/// Reads the restaurant name from the overview paragraph: the second
/// `" - "`-delimited segment of the first `#content > p`.
///
/// # Errors
///
/// - [`ScraperError::MissingElement`] if there is no overview paragraph.
/// - [`ScraperError::MalformedOverview`] if the text has no second segment.
pub fn parse_restaurant(document: &Html, url: &str) -> Result<String, ScraperError> {
    let overview = document
        .select(&OVERVIEW)
        .next()
        .ok_or_else(|| ScraperError::MissingElement {
            url: url.to_owned(),
            selector: OVERVIEW_CSS.to_owned(),
        })?;
    let text = element_text(overview);
    text.split(SEGMENT_SEPARATOR)
        .nth(1)
        .map(|segment| segment.trim().to_owned())
        .ok_or_else(|| ScraperError::MalformedOverview {
            url: url.to_owned(),
            text: text.trim().to_owned(),
        })
}

/// Builds an [`OrderRecord`] from an order detail page.
///
/// Merge order: delivery-info table, then dish-table charges, then the
/// overview restaurant, so the overview value always wins.
///
/// # Errors
///
/// - [`ScraperError::MissingElement`] / [`ScraperError::MalformedOverview`]
///   if the overview paragraph cannot be read.
/// - [`ScraperError::TooFewTables`] if the page has fewer than two tables.
pub fn parse_order_page(document: &Html, url: &str) -> Result<OrderRecord, ScraperError> {
    let restaurant = parse_restaurant(document, url)?;

    let tables: Vec<ElementRef<'_>> = document.select(&TABLE).collect();
    let [delivery_table, dish_table, ..] = tables.as_slice() else {
        return Err(ScraperError::TooFewTables {
            url: url.to_owned(),
            found: tables.len(),
        });
    };

    let mut order = OrderRecord::new(restaurant.clone());
    order.merge_delivery(parse_delivery_info(*delivery_table));

    let dish_info = parse_dish_info(*dish_table);
    for dish in dish_info.dishes {
        order.push_dish(dish);
    }
    for (label, value) in dish_info.charges {
        order.insert(label, value);
    }

    order.insert(RESTAURANT_FIELD, restaurant);
    Ok(order)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
