//! Authenticated HTTP access to the order portal.

mod urls;

use std::time::Duration;

use reqwest::{Client, Response};
use scraper::Html;

use crate::error::ScraperError;
use crate::types::{Credentials, OrderId};

pub use urls::map_url;

const DEFAULT_BASE_URL: &str = "http://d.mealclub.com/";
const DEFAULT_USER_AGENT: &str = "mealclub-assistant/0.1";

/// Session client for the order portal.
///
/// The portal does not keep sessions reliably, so every call builds a new
/// `reqwest::Client` with an empty cookie jar and logs in before fetching.
/// Nothing is shared between calls.
pub struct PortalClient {
    credentials: Credentials,
    base_url: String,
    timeout_secs: u64,
    user_agent: String,
}

impl PortalClient {
    /// Creates a client pointed at the production portal.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] if the built-in base URL is
    /// rejected (never expected in practice).
    pub fn new(credentials: Credentials, timeout_secs: u64) -> Result<Self, ScraperError> {
        Self::with_base_url(credentials, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL.
    pub fn with_base_url(
        credentials: Credentials,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        Ok(Self {
            credentials,
            base_url: urls::normalize_base_url(base_url)?,
            timeout_secs,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }

    /// Overrides the `User-Agent` sent with every request.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn login_url(&self) -> String {
        urls::login_url(&self.base_url)
    }

    /// Detail page URL for `order_id`. Also used for human-facing links.
    #[must_use]
    pub fn order_url(&self, order_id: &OrderId) -> String {
        urls::order_url(&self.base_url, order_id)
    }

    /// Logs in and returns the login response body as the listing page.
    ///
    /// The portal answers a successful login with the main delivery list, so
    /// no second request is made.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::LoginFailed`] if the login POST returns a non-2xx status.
    /// - [`ScraperError::Http`] on network failure.
    pub async fn authenticate_and_fetch_main(&self) -> Result<Html, ScraperError> {
        let session = self.new_session()?;
        let response = self.login(&session).await?;
        let body = decode_body(response).await?;
        Ok(Html::parse_document(&body))
    }

    /// Logs in on a fresh session, then GETs `url` under it.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::LoginFailed`] if the login POST returns a non-2xx
    ///   status; `url` is not requested in that case.
    /// - [`ScraperError::UnexpectedStatus`] if the GET returns a non-2xx status.
    /// - [`ScraperError::Http`] on network failure.
    pub async fn authenticate_and_fetch(&self, url: &str) -> Result<Html, ScraperError> {
        let session = self.new_session()?;
        self.login(&session).await?;

        tracing::debug!(url, "fetching portal page");
        let response = session.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = decode_body(response).await?;
        Ok(Html::parse_document(&body))
    }

    /// Builds a client with its own empty cookie store.
    fn new_session(&self) -> Result<Client, ScraperError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&self.user_agent)
            .build()?;
        Ok(client)
    }

    async fn login(&self, session: &Client) -> Result<Response, ScraperError> {
        let url = self.login_url();
        tracing::debug!(url = %url, username = %self.credentials.username, "logging in to portal");

        let response = session
            .post(&url)
            .form(&[
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "portal login rejected");
            return Err(ScraperError::LoginFailed {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response)
    }
}

/// Reads the body as UTF-8 regardless of the declared charset.
async fn decode_body(response: Response) -> Result<String, ScraperError> {
    let bytes = response.bytes().await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
