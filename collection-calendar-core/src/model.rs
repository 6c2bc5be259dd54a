//! Domain data structures for collection events and waste streams.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Waste streams the upstream service reports per collection day.
pub enum WasteStream {
    /// Residual garbage cart.
    Garbage,
    /// Mixed recycling cart.
    Recycling,
    /// Food and yard waste cart.
    FoodAndYardWaste,
}

impl WasteStream {
    /// Every stream, in the order the upstream schema lists them.
    pub const ALL: [WasteStream; 3] = [
        WasteStream::FoodAndYardWaste,
        WasteStream::Garbage,
        WasteStream::Recycling,
    ];
}

impl fmt::Display for WasteStream {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WasteStream::Garbage => "garbage",
            WasteStream::Recycling => "recycling",
            WasteStream::FoodAndYardWaste => "food and yard waste",
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// A single collection date as returned by the `GetCollectionDays` endpoint.
///
/// Records are handed to the caller as decoded and never touched again by the
/// client. The upstream returns them in no particular order.
pub struct CollectionEvent {
    /// Unused by the upstream, always `0` in practice.
    #[serde(default)]
    pub id: i64,
    /// HTML snippet rendering the calendar icons for this day.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Day the collection takes place.
    #[serde(with = "timestamp")]
    pub start: DateTime<FixedOffset>,
    /// Unused by the upstream, always absent in practice.
    #[serde(default, with = "timestamp::option")]
    pub end: Option<DateTime<FixedOffset>>,
    /// Unused by the upstream, always absent in practice.
    #[serde(default)]
    pub url: Option<String>,
    /// Always `true` in practice.
    #[serde(default)]
    pub all_day: bool,
    /// Food and yard waste is collected on [`CollectionEvent::start`].
    #[serde(default)]
    pub food_and_yard_waste: bool,
    /// Garbage is collected on [`CollectionEvent::start`].
    #[serde(default)]
    pub garbage: bool,
    /// Recycling is collected on [`CollectionEvent::start`].
    #[serde(default)]
    pub recycling: bool,
    /// Opaque passthrough, always absent in practice.
    #[serde(default)]
    pub delimited_data: Option<Value>,
    /// Diagnostic set by the upstream when it rejects a request, absent on success.
    #[serde(default)]
    pub status: Option<Value>,
}

impl CollectionEvent {
    /// Calendar date of the collection, in the offset the service reported.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Whether the given stream is picked up on this day.
    #[must_use]
    pub fn collects(&self, stream: WasteStream) -> bool {
        match stream {
            WasteStream::Garbage => self.garbage,
            WasteStream::Recycling => self.recycling,
            WasteStream::FoodAndYardWaste => self.food_and_yard_waste,
        }
    }

    /// All streams picked up on this day.
    #[must_use]
    pub fn streams(&self) -> Vec<WasteStream> {
        WasteStream::ALL
            .into_iter()
            .filter(|stream| self.collects(*stream))
            .collect()
    }

    /// The upstream diagnostic rendered as text, if one was set.
    ///
    /// The shape of the diagnostic is undocumented, so string values are returned
    /// as-is and anything else as its JSON text.
    #[must_use]
    pub fn status_message(&self) -> Option<String> {
        match self.status.as_ref()? {
            Value::Null => None,
            Value::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::{CollectionEvent, WasteStream};

    fn sample() -> serde_json::Value {
        json!({
            "Id": 0,
            "Title": "<img src=\"garbage.png\"/>",
            "Start": "2019-01-08T00:00:00",
            "End": null,
            "Url": null,
            "AllDay": true,
            "FoodAndYardWaste": false,
            "Garbage": true,
            "Recycling": false,
            "DelimitedData": null,
            "Status": null
        })
    }

    #[test]
    fn decodes_upstream_record() {
        let event: CollectionEvent = serde_json::from_value(sample()).expect("valid record");

        assert_eq!(event.id, 0);
        assert_eq!(event.title, "<img src=\"garbage.png\"/>");
        assert_eq!(
            event.date(),
            NaiveDate::from_ymd_opt(2019, 1, 8).expect("valid date")
        );
        assert_eq!(event.start.offset().local_minus_utc(), -8 * 3600);
        assert_eq!(event.end, None);
        assert_eq!(event.url, None);
        assert!(event.all_day);
        assert!(event.garbage);
        assert!(!event.recycling);
        assert!(!event.food_and_yard_waste);
        assert_eq!(event.delimited_data, None);
        assert_eq!(event.status_message(), None);
    }

    #[test]
    fn missing_passthrough_fields_default() {
        let event: CollectionEvent = serde_json::from_value(json!({
            "Start": "2019-01-08",
            "Recycling": true
        }))
        .expect("minimal record");

        assert_eq!(event.title, "");
        assert_eq!(event.streams(), vec![WasteStream::Recycling]);
        assert!(!event.all_day);
    }

    #[test]
    fn missing_start_is_rejected() {
        let result = serde_json::from_value::<CollectionEvent>(json!({ "Garbage": true }));
        assert!(result.is_err(), "start is required");
    }

    #[test]
    fn out_of_range_offset_is_a_decode_error() {
        let result =
            serde_json::from_str::<Vec<CollectionEvent>>(r#"[{"Start":"/Date(0+99999999)/"}]"#);
        assert!(result.is_err(), "offset overflow must not decode");
    }

    #[test]
    fn streams_follow_flags() {
        let mut event: CollectionEvent = serde_json::from_value(sample()).expect("valid record");
        event.food_and_yard_waste = true;

        assert_eq!(
            event.streams(),
            vec![WasteStream::FoodAndYardWaste, WasteStream::Garbage]
        );
        assert!(event.collects(WasteStream::Garbage));
        assert!(!event.collects(WasteStream::Recycling));
    }

    #[test]
    fn status_is_rendered_as_text() {
        let mut text_record = sample();
        text_record["Status"] = json!("Invalid address");
        let rejected: CollectionEvent =
            serde_json::from_value(text_record).expect("valid record");
        assert_eq!(rejected.status_message().as_deref(), Some("Invalid address"));

        let mut object_record = sample();
        object_record["Status"] = json!({ "Code": 4 });
        let structured: CollectionEvent =
            serde_json::from_value(object_record).expect("valid record");
        assert_eq!(structured.status_message().as_deref(), Some("{\"Code\":4}"));
    }
}
