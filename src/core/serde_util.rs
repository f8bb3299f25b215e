//! Field deserializers shared by the exchange domain models.
//!
//! Decimals are read from the raw JSON literal (quoted or not) so no value
//! ever passes through a binary float. Timestamps are normalized to UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::fmt;
use std::str::FromStr;

/// Parse a decimal from the text of a JSON number or string literal.
pub fn parse_decimal_literal(raw: &str) -> Result<Decimal, String> {
    let text = if raw.starts_with('"') {
        serde_json::from_str::<String>(raw).map_err(|e| e.to_string())?
    } else {
        raw.to_string()
    };
    let text = text.trim();
    Decimal::from_str_exact(text)
        .or_else(|_| Decimal::from_scientific(text))
        .or_else(|_| Decimal::from_str(text))
        .map_err(|e| format!("invalid decimal `{}`: {}", text, e))
}

pub mod decimal {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        parse_decimal_literal(raw.get()).map_err(de::Error::custom)
    }
}

pub mod decimal_opt {
    use super::*;

    /// Use with `#[serde(default)]`. `null` and `""` both read as `None`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Box<RawValue>>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.get() == "\"\"" => Ok(None),
            Some(raw) => parse_decimal_literal(raw.get())
                .map(Some)
                .map_err(de::Error::custom),
        }
    }
}

/// A decimal standing alone, for maps and arrays of amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DecimalValue(#[serde(with = "decimal")] pub Decimal);

/// Parse a timestamp string: RFC 3339, or a naive date-time read as UTC.
pub fn parse_utc(text: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| format!("unrecognized timestamp `{}`", text))
}

fn from_epoch(value: i64, unit_ms: bool) -> Result<DateTime<Utc>, String> {
    let dt = if unit_ms {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    };
    dt.ok_or_else(|| format!("timestamp out of range: {}", value))
}

struct TimestampVisitor {
    unit_ms: bool,
}

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = DateTime<Utc>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an epoch number or a timestamp string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        from_epoch(v, self.unit_ms).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let v = i64::try_from(v).map_err(E::custom)?;
        from_epoch(v, self.unit_ms).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        from_epoch(v.trunc() as i64, self.unit_ms).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        match v.parse::<i64>() {
            Ok(epoch) => from_epoch(epoch, self.unit_ms),
            Err(_) => parse_utc(v),
        }
        .map_err(E::custom)
    }
}

/// Epoch milliseconds, RFC 3339, or naive UTC strings.
pub mod utc_timestamp {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TimestampVisitor { unit_ms: true })
    }
}

pub mod utc_timestamp_opt {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "utc_timestamp")] DateTime<Utc>);

        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(dt)| dt))
    }
}

/// Epoch seconds, RFC 3339, or naive UTC strings.
pub mod utc_seconds {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TimestampVisitor { unit_ms: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(with = "decimal")]
        price: Decimal,
        #[serde(default, deserialize_with = "decimal_opt::deserialize")]
        size: Option<Decimal>,
        #[serde(with = "utc_timestamp")]
        at: DateTime<Utc>,
    }

    #[test]
    fn test_decimal_keeps_all_digits() {
        let sample: Sample =
            serde_json::from_str(r#"{"price":"15350001.123456789012","at":1640000000000}"#)
                .unwrap();
        assert_eq!(sample.price.to_string(), "15350001.123456789012");
        assert_eq!(sample.size, None);
        assert_eq!(sample.at.timestamp(), 1_640_000_000);
    }

    #[test]
    fn test_unquoted_numbers_and_exponents() {
        assert_eq!(parse_decimal_literal("31690").unwrap(), Decimal::from(31690));
        assert_eq!(
            parse_decimal_literal("1.5e-3").unwrap(),
            Decimal::from_str("0.0015").unwrap()
        );
        assert!(parse_decimal_literal("\"abc\"").is_err());
    }

    #[test]
    fn test_empty_string_reads_as_none() {
        let sample: Sample =
            serde_json::from_str(r#"{"price":1,"size":"","at":"2015-07-08T02:50:59.97"}"#)
                .unwrap();
        assert_eq!(sample.size, None);
        assert_eq!(sample.at.nanosecond(), 970_000_000);
    }

    #[test]
    fn test_timestamp_formats_normalize_to_utc() {
        assert_eq!(
            parse_utc("2019-03-19T11:15:06.001+09:00").unwrap(),
            parse_utc("2019-03-19T02:15:06.001Z").unwrap()
        );
        assert!(parse_utc("yesterday").is_err());
    }
}
