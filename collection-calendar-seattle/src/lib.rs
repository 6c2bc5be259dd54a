//! Client for the Seattle Public Utilities collection calendar service.
//!
//! The service resolves free-text addresses into canonical service addresses and
//! lists upcoming garbage, recycling and food/yard waste collections for an
//! address or utility account number.

/// Blocking calling convention on top of [`CalendarClient`].
pub mod blocking;

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::from_str;

pub use collection_calendar_core::{
    CalendarError, CollectionDaysQuery, CollectionEvent, HttpTransport, Transport, WasteStream,
};

/// Base URL of the collection calendar service.
pub const BASE_URL: &str = "https://www.seattle.gov/UTIL/WARP/CollectionCalendar/";

const ADDRESS_ENDPOINT: &str = "GetCCAddress?pAddress=";

/// Client for the collection calendar service.
///
/// Every call issues exactly one request and keeps no state between calls, so a
/// single instance can be shared across tasks.
pub struct CalendarClient {
    transport: Mutex<Option<Arc<dyn Transport>>>,
}

impl CalendarClient {
    /// Create a client with a default HTTP transport bound to [`BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Network`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, CalendarError> {
        let transport = HttpTransport::new(BASE_URL)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client on top of a pre-configured transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: Mutex::new(Some(transport)),
        }
    }

    /// Look up canonical service addresses matching `address`.
    ///
    /// The address is forwarded as-is. An empty result means the address is
    /// either unknown or has no collection account; the service does not say
    /// which. This is known to be a slow call.
    ///
    /// # Errors
    ///
    /// Returns a network error if the request fails and a decode error if the
    /// body is not a JSON array of strings.
    pub async fn lookup_addresses(&self, address: &str) -> Result<Vec<String>, CalendarError> {
        let transport = self.transport()?;
        let body = transport.get(&address_path(address)).await?;
        let addresses: Vec<String> = from_str(&body)?;
        tracing::debug!(count = addresses.len(), "decoded addresses");
        Ok(addresses)
    }

    /// Look up collection days for a query.
    ///
    /// The returned events are unordered; sort them locally if order matters.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidArgument`] without touching the network
    /// when the query does not name exactly one of address and account number,
    /// a network error if the request fails, and a decode error if the body is
    /// not a JSON array of collection events.
    pub async fn collection_days(
        &self,
        query: &CollectionDaysQuery,
    ) -> Result<Vec<CollectionEvent>, CalendarError> {
        query.validate()?;
        let transport = self.transport()?;
        let body = transport.get(&collection_days_path(query)).await?;
        let events: Vec<CollectionEvent> = from_str(&body)?;
        tracing::debug!(count = events.len(), "decoded collection days");
        Ok(events)
    }

    /// Look up collection days for a canonical service address.
    ///
    /// `address` should come from [`CalendarClient::lookup_addresses`].
    ///
    /// # Errors
    ///
    /// See [`CalendarClient::collection_days`].
    pub async fn collection_days_by_address(
        &self,
        address: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<CollectionEvent>, CalendarError> {
        let query = CollectionDaysQuery {
            start,
            end,
            ..CollectionDaysQuery::by_address(address)
        };
        self.collection_days(&query).await
    }

    /// Look up collection days for a utility account number.
    ///
    /// # Errors
    ///
    /// See [`CalendarClient::collection_days`].
    pub async fn collection_days_by_account_number(
        &self,
        account_number: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<CollectionEvent>, CalendarError> {
        let query = CollectionDaysQuery {
            start,
            end,
            ..CollectionDaysQuery::by_account_number(account_number)
        };
        self.collection_days(&query).await
    }

    /// Release the transport. Later calls fail with [`CalendarError::Disposed`].
    ///
    /// Calling this more than once has no further effect.
    pub fn dispose(&self) {
        let released = self
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(transport) = released {
            tracing::trace!("disposing transport");
            transport.close();
        }
    }

    /// Whether [`CalendarClient::dispose`] has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn transport(&self) -> Result<Arc<dyn Transport>, CalendarError> {
        self.transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
            .ok_or(CalendarError::Disposed)
    }
}

fn address_path(address: &str) -> String {
    format!("{ADDRESS_ENDPOINT}{address}")
}

// pJustChecking, pApp and pIE are required by the service and never vary.
fn collection_days_path(query: &CollectionDaysQuery) -> String {
    let account = query.account_number().unwrap_or_default();
    let address = query.address().unwrap_or_default();
    let start = query
        .start
        .map_or_else(|| "0".to_owned(), |start| start.timestamp().to_string());
    let end = query
        .end
        .map(|end| end.timestamp().to_string())
        .unwrap_or_default();

    format!(
        "GetCollectionDays?pAccount={account}&pAddress={address}&pJustChecking=&pApp=CC&pIE=&start={start}&end={end}"
    )
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use super::{CollectionDaysQuery, address_path, collection_days_path};

    #[test]
    fn address_is_appended_verbatim() {
        assert_eq!(
            address_path("123 Fake St & Co"),
            "GetCCAddress?pAddress=123 Fake St & Co"
        );
    }

    #[test]
    fn unbounded_range_sends_zero_and_empty() {
        let path = collection_days_path(&CollectionDaysQuery::by_address("123 Main St"));
        assert_eq!(
            path,
            "GetCollectionDays?pAccount=&pAddress=123 Main St&pJustChecking=&pApp=CC&pIE=&start=0&end="
        );
    }

    #[test]
    fn account_number_fills_account_parameter() {
        let path = collection_days_path(&CollectionDaysQuery::by_account_number("0042"));
        assert!(path.starts_with("GetCollectionDays?pAccount=0042&pAddress=&"));
    }

    #[test]
    fn bounds_are_utc_epoch_seconds() {
        let start = Utc
            .with_ymd_and_hms(2019, 1, 1, 0, 0, 0)
            .single()
            .expect("unambiguous");
        // 2019-01-31T00:00:00-08:00 is 2019-01-31T08:00:00Z
        let end = FixedOffset::west_opt(8 * 3600)
            .and_then(|pacific| pacific.with_ymd_and_hms(2019, 1, 31, 0, 0, 0).single())
            .expect("unambiguous");

        let query = CollectionDaysQuery::by_address("123 Main St")
            .starting(&start)
            .ending(&end);

        assert!(
            collection_days_path(&query).ends_with("&start=1546300800&end=1548921600"),
            "epoch seconds must be taken in UTC"
        );
    }
}
