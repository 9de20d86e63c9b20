//! Blocking HTTP implementation of [`SchemaSource`].

use std::time::Duration;

use serde_json::Value;
use tdv_core::{NamespaceUris, RemoteConfig, SchemaDocument, SchemaIdentity, SchemaOrigin};
use tdv_schema::{SchemaSource, SourceError};

use crate::error::FetchError;

/// Fetches schemas from their published URLs.
#[derive(Debug, Clone)]
pub struct RemoteSchemaSource {
    client: reqwest::blocking::Client,
    uris: NamespaceUris,
    timeout: Duration,
}

impl RemoteSchemaSource {
    /// Create a source resolving identities through `uris`, with a
    /// per-request timeout.
    pub fn new(uris: NamespaceUris, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static(
                        "application/schema+json, application/json;q=0.9",
                    ),
                );
                headers
            })
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            uris,
            timeout,
        })
    }

    /// Create a source from the `remote` section of the configuration.
    pub fn from_config(config: &RemoteConfig, uris: NamespaceUris) -> Result<Self, FetchError> {
        Self::new(uris, Duration::from_secs(config.timeout_secs))
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and parse the body as JSON. Only `200 OK` is accepted.
    pub fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        tracing::debug!(url, "fetching remote schema");
        let resp = self
            .client
            .get(parsed)
            .send()
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.json::<Value>().map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }

    fn lookup(&self, url: &str) -> Result<Option<Value>, SourceError> {
        match self.get_json(url) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => {
                tracing::debug!(url, "remote schema not published");
                Ok(None)
            }
            Err(e) => Err(SourceError::Remote {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

impl SchemaSource for RemoteSchemaSource {
    fn name(&self) -> &str {
        "remote"
    }

    /// A namespace with no configured base URL has no published location,
    /// so it is reported as absent rather than as a failure.
    fn fetch_schema(&self, identity: &SchemaIdentity) -> Result<Option<SchemaDocument>, SourceError> {
        let url = match self.uris.canonical_uri(identity) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(schema = %identity, error = %e, "no remote location for schema");
                return Ok(None);
            }
        };
        let content = self.lookup(&url)?;
        Ok(content.map(|content| {
            tracing::info!(schema = %identity, url = %url, "fetched remote schema");
            SchemaDocument::new(identity.clone(), content, SchemaOrigin::Remote(url))
        }))
    }

    fn fetch_reference(&self, url: &str) -> Result<Option<Value>, SourceError> {
        self.lookup(url)
    }
}
