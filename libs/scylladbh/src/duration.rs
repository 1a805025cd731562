//! Serde adapter for optional human-readable durations (`"10s"`, `"1m 30s"`)
//!
//! A missing field, an empty string or a zero duration all mean "not configured".

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn parse(raw: &str) -> Result<Option<Duration>, humantime::DurationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let duration = humantime::parse_duration(raw)?;
    Ok((!duration.is_zero()).then_some(duration))
}

pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_str(&humantime::format_duration(*d).to_string()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse(&raw).map_err(D::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(parse("10s").unwrap(), Some(Duration::from_secs(10)));
        assert_eq!(parse("1m 30s").unwrap(), Some(Duration::from_secs(90)));
        assert_eq!(parse("250ms").unwrap(), Some(Duration::from_millis(250)));
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("0s").unwrap(), None);
        assert!(parse("ten seconds").is_err());
    }
}
