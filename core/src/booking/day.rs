//! Calendar-day serde helpers
//!
//! Bookings work at day granularity. Clients send either `YYYY-MM-DD` or a
//! full RFC 3339 timestamp; only the UTC date part is kept.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::{Error, Result};

pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub fn parse_day(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, DAY_FORMAT) {
        return Ok(day);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
        .map_err(|_| Error::InvalidInput(format!("Invalid date '{}'", raw)))
}

pub fn serialize<S>(day: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&day.format(DAY_FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).map_err(serde::de::Error::custom)
}

/// Same as the parent module for `Option<NaiveDate>` fields
pub mod option {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(
        day: &Option<NaiveDate>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match day {
            Some(day) => super::serialize(day, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse_day(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
