//! Serde helpers for the timestamp formats emitted by the collection calendar service.
//!
//! The service has been seen to produce ISO-8601 values with and without an
//! offset, bare dates, and the ASP.NET `/Date(1546934400000-0800)/` form. Values
//! carrying an offset keep it; values without one are read as Seattle local time.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::America::Los_Angeles;
use chrono_tz::Tz;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

/// Zone the service reports local times in.
pub const SERVICE_ZONE: Tz = Los_Angeles;

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";
const OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";
const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse any of the supported timestamp representations.
#[must_use]
pub fn parse(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();

    if let Some(inner) = trimmed
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
    {
        return parse_aspnet(inner);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_err| DateTime::parse_from_str(trimmed, OFFSET_FORMAT))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, LOCAL_FORMAT)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                        .ok()
                        .map(|date| date.and_time(NaiveTime::MIN))
                })
                .map(in_service_zone)
        })
}

fn in_service_zone(local: NaiveDateTime) -> DateTime<FixedOffset> {
    SERVICE_ZONE
        .from_local_datetime(&local)
        .earliest()
        // only inside a spring-forward gap
        .unwrap_or_else(|| SERVICE_ZONE.from_utc_datetime(&local))
        .fixed_offset()
}

// "<millis>" or "<millis>(+|-)HHMM"; the millis are UTC.
fn parse_aspnet(inner: &str) -> Option<DateTime<FixedOffset>> {
    let offset_at = inner
        .char_indices()
        .skip(1)
        .find(|(_, ch)| *ch == '+' || *ch == '-')
        .map(|(idx, _)| idx);

    let (millis, offset) = match offset_at {
        Some(idx) => inner.split_at(idx),
        None => (inner, ""),
    };

    let instant = DateTime::from_timestamp_millis(millis.parse().ok()?)?;
    if offset.is_empty() {
        return Some(instant.with_timezone(&SERVICE_ZONE).fixed_offset());
    }

    let zone = parse_hhmm(offset)?;
    Some(instant.with_timezone(&zone))
}

// Exactly a sign and four digits, minutes below 60.
fn parse_hhmm(offset: &str) -> Option<FixedOffset> {
    let mut chars = offset.chars();
    let sign = match chars.next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits = chars
        .map(|ch| ch.to_digit(10))
        .collect::<Option<Vec<u32>>>()?;
    let [h1, h2, m1, m2] = digits.as_slice() else {
        return None;
    };
    let hours = i32::try_from(h1 * 10 + h2).ok()?;
    let minutes = i32::try_from(m1 * 10 + m2).ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Serialize a timestamp in the service's own format.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize<S: Serializer>(
    value: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(WIRE_FORMAT))
}

/// Deserialize a required timestamp.
///
/// # Errors
///
/// Fails when the value is not a string in one of the supported formats.
pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<FixedOffset>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognised timestamp `{raw}`")))
}

/// Same as the parent module, for nullable fields.
pub mod option {
    use chrono::{DateTime, FixedOffset};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize an optional timestamp, `null` when absent.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<FixedOffset>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(timestamp) => super::serialize(timestamp, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional timestamp, treating `null` and `""` as absent.
    ///
    /// # Errors
    ///
    /// Fails when a present value is not in one of the supported formats.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unrecognised timestamp `{raw}`"))),
        }
    }
}
