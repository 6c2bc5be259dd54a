//! Default [`Transport`] backed by a pooled `reqwest` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::ports::{CalendarError, Transport};

/// Overall request timeout. Some upstream lookups are slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3 * 60);

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("collection-calendar/", env!("CARGO_PKG_VERSION"));

/// Transport issuing GET requests relative to a fixed base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport with its own HTTP client, bound to `base_url`.
    ///
    /// `base_url` should end with `/`; request paths are appended to it verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Network`] if the HTTP client cannot be built.
    pub fn new<S: Into<String>>(base_url: S) -> Result<Self, CalendarError> {
        let base_url = base_url.into();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        tracing::trace!(%base_url, "built HTTP transport");
        Ok(Self::with_client(client, base_url))
    }

    /// Bind an existing, pre-configured HTTP client to `base_url`.
    #[must_use]
    pub fn with_client<S: Into<String>>(client: Client, base_url: S) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Base URL all request paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resolve(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.base_url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path_and_query: &str) -> Result<String, CalendarError> {
        let url = self.resolve(path_and_query);
        tracing::debug!(url = %url, "GET");

        // reqwest percent-encodes whatever the URL parser requires; nothing else is escaped
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::UnexpectedStatus {
                status,
                url: response.url().to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
