//! ISO-8601 timestamp coding for JSON models.
//!
//! Decoding accepts timestamps with and without fractional seconds. Encoding
//! always writes milliseconds, e.g. `2024-01-01T12:34:56.789Z`.
//!
//! Use [`iso8601`] as a serde `with` module:
//!
//! ```
//! use chrono::{DateTime, Utc};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Post {
//!     #[serde(rename = "createdAt", with = "endpoint_core::dates::iso8601")]
//!     created_at: DateTime<Utc>,
//! }
//!
//! let post: Post = serde_json::from_str(r#"{"createdAt":"2024-06-15T10:30:00Z"}"#).unwrap();
//! assert_eq!(post.created_at.timestamp(), 1_718_447_400);
//! ```

use chrono::{DateTime, SecondsFormat, Utc};

/// Returned when a string is not an ISO-8601 timestamp in either form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ISO-8601 date: {0}")]
pub struct InvalidDate(pub String);

/// Parse an ISO-8601 timestamp, trying the fractional-seconds form first and
/// falling back to whole seconds with a numeric offset.
pub fn parse_iso8601(raw: &str) -> Result<DateTime<Utc>, InvalidDate> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| InvalidDate(raw.to_string()))
}

pub fn format_iso8601(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for `DateTime<Utc>` fields.
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_iso8601(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso8601(&raw).map_err(serde::de::Error::custom)
    }

    /// Serde adapter for `Option<DateTime<Utc>>` fields.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.serialize_some(&super::super::format_iso8601(date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::super::parse_iso8601(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
