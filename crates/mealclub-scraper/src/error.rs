use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("login rejected with HTTP status {status} by {url}")]
    LoginFailed { status: u16, url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("no element matching `{selector}` on {url}")]
    MissingElement { url: String, selector: String },

    #[error("expected at least 2 tables on {url}, found {found}")]
    TooFewTables { url: String, found: usize },

    #[error("order overview on {url} has no restaurant segment: \"{text}\"")]
    MalformedOverview { url: String, text: String },

    #[error("invalid portal base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl ScraperError {
    /// `true` for failures talking to the portal: network errors and
    /// non-success statuses on either the login or the page fetch.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::LoginFailed { .. } | Self::UnexpectedStatus { .. }
        )
    }

    /// `true` when a fetched page lacks the markup the extractor needs.
    #[must_use]
    pub fn is_structure(&self) -> bool {
        matches!(
            self,
            Self::MissingElement { .. } | Self::TooFewTables { .. } | Self::MalformedOverview { .. }
        )
    }
}
