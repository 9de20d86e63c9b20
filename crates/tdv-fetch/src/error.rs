//! Remote fetch error types.

/// Errors from fetching a schema over HTTP.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The URL is not an absolute http(s) URL.
    #[error("invalid schema URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// HTTP transport error, including timeouts.
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// The server answered with a status other than 200.
    #[error("{url} returned {status}")]
    Status { url: String, status: u16 },

    /// The response body is not JSON.
    #[error("failed to parse response from {url}: {source}")]
    Body {
        url: String,
        source: reqwest::Error,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

impl FetchError {
    /// Whether the server reported that the document does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Whether the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http { source, .. } if source.is_timeout())
    }
}
