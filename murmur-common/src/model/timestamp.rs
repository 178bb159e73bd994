//! Serde adapter writing a [`UtcDateTime`] as an RFC 3339 string such as
//! `2024-01-15T09:00:00Z`. Use with `#[serde(with = "crate::model::timestamp")]`.

use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
use time::{OffsetDateTime, UtcDateTime, UtcOffset, format_description::well_known::Rfc3339};

pub fn serialize<S>(time: &UtcDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = time
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(S::Error::custom)?;

    serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<UtcDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let inner = String::deserialize(deserializer)?;
    let parsed = OffsetDateTime::parse(&inner, &Rfc3339).map_err(D::Error::custom)?;

    Ok(parsed.to_utc())
}
