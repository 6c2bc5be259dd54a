//! Blocking wrapper around the async [`crate::CalendarClient`].
//!
//! Each method drives the matching async method to completion on a private
//! current-thread runtime. Do not call these from within an async context.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::runtime::{Builder, Runtime};

use crate::CalendarClient as AsyncCalendarClient;
use crate::{CalendarError, CollectionDaysQuery, CollectionEvent, Transport};

/// Blocking client for the collection calendar service.
pub struct CalendarClient {
    inner: AsyncCalendarClient,
    runtime: Runtime,
}

impl CalendarClient {
    /// Create a blocking client with the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client or the runtime cannot be built.
    pub fn new() -> Result<Self, CalendarError> {
        Self::from_async(AsyncCalendarClient::new()?)
    }

    /// Create a blocking client on top of a pre-configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Runtime`] if the runtime cannot be built.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Result<Self, CalendarError> {
        Self::from_async(AsyncCalendarClient::with_transport(transport))
    }

    /// Wrap an existing async client.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Runtime`] if the runtime cannot be built.
    pub fn from_async(inner: AsyncCalendarClient) -> Result<Self, CalendarError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { inner, runtime })
    }

    /// See [`crate::CalendarClient::lookup_addresses`].
    ///
    /// # Errors
    ///
    /// Same as the async method.
    pub fn lookup_addresses(&self, address: &str) -> Result<Vec<String>, CalendarError> {
        self.runtime.block_on(self.inner.lookup_addresses(address))
    }

    /// See [`crate::CalendarClient::collection_days`].
    ///
    /// # Errors
    ///
    /// Same as the async method.
    pub fn collection_days(
        &self,
        query: &CollectionDaysQuery,
    ) -> Result<Vec<CollectionEvent>, CalendarError> {
        self.runtime.block_on(self.inner.collection_days(query))
    }

    /// See [`crate::CalendarClient::collection_days_by_address`].
    ///
    /// # Errors
    ///
    /// Same as the async method.
    pub fn collection_days_by_address(
        &self,
        address: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<CollectionEvent>, CalendarError> {
        self.runtime
            .block_on(self.inner.collection_days_by_address(address, start, end))
    }

    /// See [`crate::CalendarClient::collection_days_by_account_number`].
    ///
    /// # Errors
    ///
    /// Same as the async method.
    pub fn collection_days_by_account_number(
        &self,
        account_number: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<CollectionEvent>, CalendarError> {
        self.runtime.block_on(
            self.inner
                .collection_days_by_account_number(account_number, start, end),
        )
    }

    /// See [`crate::CalendarClient::dispose`].
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// The async client driven by this wrapper.
    #[must_use]
    pub fn as_async(&self) -> &AsyncCalendarClient {
        &self.inner
    }
}
