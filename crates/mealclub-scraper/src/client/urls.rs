//! URL construction for portal endpoints and display links.

use crate::error::ScraperError;
use crate::types::OrderId;

const LOGIN_PATH: &str = "login.php";
const ORDER_PATH: &str = "order.php?id=";
const MAPS_PLACE_URL: &str = "https://www.google.com/maps/place/";

/// Validates `base_url` and normalises it to end with exactly one slash, so
/// endpoint paths can be appended by plain concatenation.
pub(super) fn normalize_base_url(base_url: &str) -> Result<String, ScraperError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let parsed = reqwest::Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: "expected an http(s) URL".to_owned(),
        });
    }
    Ok(normalised)
}

pub(super) fn login_url(base_url: &str) -> String {
    format!("{base_url}{LOGIN_PATH}")
}

/// The order id is appended verbatim, matching the links the portal renders.
pub(super) fn order_url(base_url: &str, order_id: &OrderId) -> String {
    format!("{base_url}{ORDER_PATH}{order_id}")
}

/// Builds a Google Maps place link for a free-text address.
///
/// Spaces become `+`; nothing else is escaped.
#[must_use]
pub fn map_url(address: &str) -> String {
    format!("{MAPS_PLACE_URL}{}", address.replace(' ', "+"))
}
