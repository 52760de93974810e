//! Record types produced by the order extractor.
//!
//! ## Observed shape of the portal's pages
//!
//! ### Listing page
//! Returned as the body of the login POST. Each order appears as a
//! `<tr class="order">` whose bold cell reads `"<id> - <method>"`
//! (e.g. `"ORD123 - Pickup"`). Each delivery is a `<form>` wrapping a
//! `th`/`td` table with labels like `"Status:"` and `"Pickup Time:"`.
//! The `"Time Delivered"` row holds a `<select>` of times, not a value.
//!
//! ### Detail page
//! `#content > p` reads `"Order #5 - Tony's Pizza - Placed 2pm"`. The first
//! table uses the same `th`/`td` layout as the listing forms. The second
//! mixes 3-cell dish rows (`qty | name | price`) and 2-cell charge rows
//! (`"Tax:" | "$1.20"`).
//!
//! Field names are whatever labels the portal emits, so records are kept as
//! ordered string maps rather than fixed structs.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Label the portal uses for the delivery status row.
pub const STATUS_FIELD: &str = "Status";
/// Label for the restaurant, set from the detail page overview.
pub const RESTAURANT_FIELD: &str = "Restaurant";
pub const PICKUP_TIME_FIELD: &str = "Pickup Time";
pub const ORDER_ID_FIELD: &str = "OrderId";
/// Key of the dish list in a serialised [`OrderRecord`]. Reserved: table rows
/// with this label are not stored as fields.
pub const DISHES_FIELD: &str = "dishes";
/// Form control row dropped from every parsed delivery table.
pub const TIME_DELIVERED_FIELD: &str = "Time Delivered";

/// Portal login. Supplied once at construction and never logged.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Order identifier as printed on the listing page.
///
/// Only meaningful within the listing fetch it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Where a delivery is in its lifecycle, derived from the `"Status"` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryStatus {
    /// New and not yet accepted (blue on the portal).
    Unconfirmed,
    /// Accepted, waiting for pickup (red).
    Confirmed,
    PickedUp,
    /// Handed to the customer (green).
    Delivered,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 4] = [
        DeliveryStatus::Unconfirmed,
        DeliveryStatus::Confirmed,
        DeliveryStatus::PickedUp,
        DeliveryStatus::Delivered,
    ];

    /// The exact text the portal prints for this status.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DeliveryStatus::Unconfirmed => "Unconfirmed",
            DeliveryStatus::Confirmed => "Confirmed",
            DeliveryStatus::PickedUp => "Picked Up",
            DeliveryStatus::Delivered => "Delivered",
        }
    }

    /// Exact, case-sensitive match against [`DeliveryStatus::label`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == label)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Insertion-ordered string map. Re-inserting a key replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FieldMap(Vec<(String, String)>);

impl FieldMap {
    fn insert(&mut self, key: String, value: String) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Label/value pairs read from one two-column (`th`/`td`) table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryRecord {
    fields: FieldMap,
}

impl DeliveryRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field`, replacing any earlier value for the same label.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
    }

    /// The parsed status, or `None` when the field is absent or unrecognised.
    #[must_use]
    pub fn status(&self) -> Option<DeliveryStatus> {
        self.get(STATUS_FIELD).and_then(DeliveryStatus::from_label)
    }

    /// Fields in document order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.0.is_empty()
    }
}

impl Serialize for DeliveryRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (field, value) in self.fields() {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

/// One line item from the dish table.
///
/// Serialises as a single-entry object `{ name: price }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DishEntry {
    pub name: String,
    pub price: String,
}

impl Serialize for DishEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.price)?;
        map.end()
    }
}

/// A fully parsed order detail page.
///
/// Holds the delivery-info fields, any charge rows from the dish table, the
/// overview-derived `"Restaurant"` and the dish list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    fields: FieldMap,
    dishes: Vec<DishEntry>,
}

impl OrderRecord {
    /// Starts a record whose `"Restaurant"` field is `restaurant`.
    #[must_use]
    pub fn new(restaurant: impl Into<String>) -> Self {
        let mut fields = FieldMap::default();
        fields.insert(RESTAURANT_FIELD.to_owned(), restaurant.into());
        Self {
            fields,
            dishes: Vec::new(),
        }
    }

    /// Sets `field`, last write wins. A `"dishes"` field is ignored so the
    /// dish list stays the only value under that key.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        if field == DISHES_FIELD {
            tracing::debug!("ignoring table field shadowing the dish list");
            return;
        }
        self.fields.insert(field, value.into());
    }

    /// Copies every field of `delivery` into this record, last write wins.
    pub fn merge_delivery(&mut self, delivery: DeliveryRecord) {
        for (field, value) in delivery.fields.0 {
            self.insert(field, value);
        }
    }

    pub fn push_dish(&mut self, dish: DishEntry) {
        self.dishes.push(dish);
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn restaurant(&self) -> &str {
        self.get(RESTAURANT_FIELD).unwrap_or_default()
    }

    #[must_use]
    pub fn pickup_time(&self) -> Option<&str> {
        self.get(PICKUP_TIME_FIELD)
    }

    /// The `"OrderId"` field as printed in the delivery-info table, if any.
    #[must_use]
    pub fn order_id(&self) -> Option<OrderId> {
        self.get(ORDER_ID_FIELD).map(OrderId::from)
    }

    #[must_use]
    pub fn dishes(&self) -> &[DishEntry] {
        &self.dishes
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter()
    }

    /// `(title, description)` pairs for display: every field in order, then
    /// one pair per dish.
    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields().chain(
            self.dishes
                .iter()
                .map(|dish| (dish.name.as_str(), dish.price.as_str())),
        )
    }
}

impl Serialize for OrderRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.0.len() + 1))?;
        for (field, value) in self.fields() {
            map.serialize_entry(field, value)?;
        }
        map.serialize_entry(DISHES_FIELD, &self.dishes)?;
        map.end()
    }
}
