//! Error taxonomy, query parameters, and the transport seam used by calendar clients.

use std::io::Error as IoError;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Error as ReqwestError, StatusCode};
use serde_json::Error as JsonError;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the collection calendar service.
pub enum CalendarError {
    /// The request was rejected locally, before any network activity.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Network layer failed or timed out.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The service answered with a non-success status.
    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus {
        /// Status code returned by the service.
        status: StatusCode,
        /// Fully resolved request URL.
        url: String,
    },
    /// Response body was not the expected JSON.
    #[error("Decode error: {0}")]
    Decode(#[from] JsonError),
    /// The client was disposed before the call was made.
    #[error("Client has been disposed")]
    Disposed,
    /// The runtime driving blocking calls could not be created.
    #[error("Runtime error: {0}")]
    Runtime(#[from] IoError),
}

impl CalendarError {
    /// Inputs were invalid; fix them and try again.
    #[must_use]
    pub fn is_argument(&self) -> bool {
        matches!(self, CalendarError::InvalidArgument(_))
    }

    /// Transport failure, timeout, or non-success status.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            CalendarError::Network(_) | CalendarError::UnexpectedStatus { .. }
        )
    }

    /// The body did not decode into the expected shape.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, CalendarError::Decode(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Parameters for a collection days lookup.
///
/// Exactly one of `address` and `account_number` must be set. Empty strings
/// count as unset.
pub struct CollectionDaysQuery {
    /// Canonical service address, as returned by an address lookup.
    pub address: Option<String>,
    /// Utility account number, an alternative key to the address.
    pub account_number: Option<String>,
    /// Lower bound of the date range, unbounded when absent.
    pub start: Option<DateTime<Utc>>,
    /// Upper bound of the date range, unbounded when absent.
    pub end: Option<DateTime<Utc>>,
}

impl CollectionDaysQuery {
    /// Look up collection days for a service address.
    #[must_use]
    pub fn by_address<S: Into<String>>(address: S) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    /// Look up collection days for an account number.
    #[must_use]
    pub fn by_account_number<S: Into<String>>(account_number: S) -> Self {
        Self {
            account_number: Some(account_number.into()),
            ..Self::default()
        }
    }

    /// Restrict results to collections at or after `start`.
    #[must_use]
    pub fn starting<Tz: TimeZone>(mut self, start: &DateTime<Tz>) -> Self {
        self.start = Some(start.with_timezone(&Utc));
        self
    }

    /// Restrict results to collections at or before `end`.
    #[must_use]
    pub fn ending<Tz: TimeZone>(mut self, end: &DateTime<Tz>) -> Self {
        self.end = Some(end.with_timezone(&Utc));
        self
    }

    /// Address, if one was given and is non-empty.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        non_empty(self.address.as_deref())
    }

    /// Account number, if one was given and is non-empty.
    #[must_use]
    pub fn account_number(&self) -> Option<&str> {
        non_empty(self.account_number.as_deref())
    }

    /// Check that exactly one lookup key is present.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidArgument`] when both or neither of
    /// address and account number are given.
    pub fn validate(&self) -> Result<(), CalendarError> {
        match (self.address(), self.account_number()) {
            (Some(_), Some(_)) => Err(CalendarError::InvalidArgument(
                "can't provide both address and account number",
            )),
            (None, None) => Err(CalendarError::InvalidArgument(
                "must provide address or account number",
            )),
            _ => Ok(()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|inner| !inner.is_empty())
}

#[async_trait]
/// HTTP transport bound to the service base URL.
///
/// Implementations must be safe to share between concurrent calls.
pub trait Transport: Send + Sync {
    /// Issue a GET for `path_and_query`, resolved against the base URL, and
    /// return the body of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Network`] or [`CalendarError::UnexpectedStatus`]
    /// when the request fails.
    async fn get(&self, path_and_query: &str) -> Result<String, CalendarError>;

    /// Release resources held by the transport. Called once on dispose.
    fn close(&self) {}
}
