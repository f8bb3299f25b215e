//! Lazy decomposition of a raw response body into metadata and payload.
//!
//! A [`NativeMessage`] owns only the raw body text. Metadata and payload are
//! derived on first access and cached for the lifetime of the message, so
//! repeated access always returns the same reference. Payload content is
//! extracted as raw JSON text so numeric literals keep every digit.

use crate::core::errors::MessageFormatError;
use crate::core::exchange::Exchange;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::fmt;
use std::sync::OnceLock;

/// How an exchange wraps entity data in its responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// No wrapper: the whole body is the entity data.
    Bare,
    /// `{"success": <int>, "data": <entity>}`
    SuccessData,
    /// `{"status": <int>, "data": <entity>, "responsetime": "<ts>"}`
    StatusData,
    /// `{"success": <bool>, ...entity members}`; `success` may be missing.
    InlineSuccess,
}

/// Envelope-level status information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    Absent,
    Success { success: i64 },
    SuccessFlag { success: bool },
    Status {
        status: i64,
        response_time: Option<String>,
    },
}

impl Metadata {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Entity-data portion of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    exchange: Exchange,
    content: String,
}

impl Payload {
    /// Exact text of the entity data.
    ///
    /// For plain wrappers this is a verbatim substring of the raw body; for
    /// restructured envelopes only the container is rebuilt and every value
    /// keeps its original literal text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Raw text of the value reached by following `path` through nested objects.
    pub fn content_at(&self, path: &[&str]) -> Result<&str, MessageFormatError> {
        let mut current: &str = &self.content;
        for (depth, key) in path.iter().enumerate() {
            let members = parse_members(self.exchange, current, || {
                format!("object containing `{}`", path[..=depth].join("."))
            })?;
            current = members
                .find(key)
                .ok_or_else(|| {
                    MessageFormatError::new(
                        self.exchange,
                        format!("member `{}`", path[..=depth].join(".")),
                        format!("object without `{}`", key),
                    )
                })?
                .get();
        }
        Ok(current)
    }
}

/// A raw response body from one exchange.
pub struct NativeMessage {
    exchange: Exchange,
    envelope: Envelope,
    raw: String,
    metadata: OnceLock<Result<Metadata, MessageFormatError>>,
    payload: OnceLock<Result<Payload, MessageFormatError>>,
}

impl NativeMessage {
    /// Wrap a body using the exchange's own envelope shape. Nothing is parsed here.
    pub fn new(exchange: Exchange, raw: impl Into<String>) -> Self {
        Self::with_envelope(exchange, exchange.envelope(), raw)
    }

    pub fn with_envelope(exchange: Exchange, envelope: Envelope, raw: impl Into<String>) -> Self {
        Self {
            exchange,
            envelope,
            raw: raw.into(),
            metadata: OnceLock::new(),
            payload: OnceLock::new(),
        }
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn metadata(&self) -> Result<&Metadata, MessageFormatError> {
        self.metadata
            .get_or_init(|| self.extract_metadata())
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn payload(&self) -> Result<&Payload, MessageFormatError> {
        self.payload
            .get_or_init(|| self.extract_payload())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn extract_metadata(&self) -> Result<Metadata, MessageFormatError> {
        match self.envelope {
            Envelope::Bare => Ok(Metadata::Absent),
            Envelope::SuccessData => {
                let members = self.members("object with `success` and `data`")?;
                let success = self.required_member(&members, "success", "integer")?;
                Ok(Metadata::Success {
                    success: self.scalar(success, "integer `success`")?,
                })
            }
            Envelope::StatusData => {
                let members = self.members("object with `status` and `data`")?;
                let status = self.required_member(&members, "status", "integer")?;
                let response_time = members
                    .find("responsetime")
                    .map(|raw| self.scalar::<Option<String>>(raw, "string `responsetime`"))
                    .transpose()?
                    .flatten();
                Ok(Metadata::Status {
                    status: self.scalar(status, "integer `status`")?,
                    response_time,
                })
            }
            Envelope::InlineSuccess => {
                let members = self.members("object")?;
                match members.find("success") {
                    Some(raw) => Ok(Metadata::SuccessFlag {
                        success: self.scalar(raw, "boolean `success`")?,
                    }),
                    None => Ok(Metadata::Absent),
                }
            }
        }
    }

    fn extract_payload(&self) -> Result<Payload, MessageFormatError> {
        let content = match self.envelope {
            Envelope::Bare => self.raw.clone(),
            Envelope::SuccessData | Envelope::StatusData => {
                let members = self.members("object with `data`")?;
                self.required_member(&members, "data", "entity")?
                    .get()
                    .to_string()
            }
            Envelope::InlineSuccess => {
                let members = self.members("object")?;
                members.rebuild_without("success")
            }
        };
        Ok(Payload {
            exchange: self.exchange,
            content,
        })
    }

    fn members(&self, expected: &str) -> Result<ObjectMembers<'_>, MessageFormatError> {
        parse_members(self.exchange, &self.raw, || expected.to_string())
    }

    fn required_member<'a>(
        &self,
        members: &ObjectMembers<'a>,
        key: &str,
        kind: &str,
    ) -> Result<&'a RawValue, MessageFormatError> {
        members.find(key).ok_or_else(|| {
            MessageFormatError::new(
                self.exchange,
                format!("{} member `{}`", kind, key),
                format!("object without `{}`", key),
            )
        })
    }

    fn scalar<T: for<'de> Deserialize<'de>>(
        &self,
        raw: &RawValue,
        expected: &str,
    ) -> Result<T, MessageFormatError> {
        serde_json::from_str(raw.get()).map_err(|_| {
            MessageFormatError::new(self.exchange, expected, describe_shape(raw.get()))
        })
    }
}

impl fmt::Debug for NativeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeMessage")
            .field("exchange", &self.exchange)
            .field("envelope", &self.envelope)
            .field("raw_len", &self.raw.len())
            .field("metadata_evaluated", &self.metadata.get().is_some())
            .field("payload_evaluated", &self.payload.get().is_some())
            .finish()
    }
}

/// Top-level members of a JSON object in document order, values kept as raw text.
struct ObjectMembers<'a>(Vec<(String, &'a RawValue)>);

impl<'a> ObjectMembers<'a> {
    fn find(&self, key: &str) -> Option<&'a RawValue> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| *value)
    }

    /// Re-emit the object without `excluded`, carrying every value's raw text.
    fn rebuild_without(&self, excluded: &str) -> String {
        let mut out = String::from("{");
        let mut first = true;
        for (name, value) in self.0.iter().filter(|(name, _)| name != excluded) {
            if !first {
                out.push(',');
            }
            first = false;
            // a String always serializes
            out.push_str(&serde_json::to_string(name).unwrap_or_default());
            out.push(':');
            out.push_str(value.get());
        }
        out.push('}');
        out
    }
}

impl<'de> Deserialize<'de> for ObjectMembers<'de> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MembersVisitor;

        impl<'de> Visitor<'de> for MembersVisitor {
            type Value = ObjectMembers<'de>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut members = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, &'de RawValue>()? {
                    members.push((key, value));
                }
                Ok(ObjectMembers(members))
            }
        }

        deserializer.deserialize_map(MembersVisitor)
    }
}

fn parse_members<'a>(
    exchange: Exchange,
    text: &'a str,
    expected: impl FnOnce() -> String,
) -> Result<ObjectMembers<'a>, MessageFormatError> {
    serde_json::from_str::<ObjectMembers<'a>>(text)
        .map_err(|_| MessageFormatError::new(exchange, expected(), describe_shape(text)))
}

/// Coarse description of a JSON text's top-level shape for error messages.
fn describe_shape(text: &str) -> String {
    let trimmed = text.trim_start();
    let shape = match trimmed.chars().next() {
        None => "empty body",
        Some('{') => "object",
        Some('[') => "array",
        Some('"') => "string",
        Some('t' | 'f') => "boolean",
        Some('n') => "null",
        Some(c) if c == '-' || c.is_ascii_digit() => "number",
        Some(_) => "non-JSON text",
    };
    if serde_json::from_str::<&RawValue>(text).is_err() && shape != "empty body" {
        format!("malformed {}", shape)
    } else {
        shape.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_body_has_absent_metadata_and_whole_content() {
        let raw = r#"{"product_code":"BTC_JPY","ltp":31690}"#;
        let message = NativeMessage::new(Exchange::BitFlyer, raw);
        assert!(message.metadata().unwrap().is_absent());
        assert_eq!(message.payload().unwrap().content(), raw);
    }

    #[test]
    fn test_success_data_content_is_verbatim_substring() {
        let raw = r#"{"success":1,"data":{"last":"15350001","vol":"273.5234"}}"#;
        let message = NativeMessage::new(Exchange::Bitbank, raw);
        assert_eq!(message.metadata().unwrap(), &Metadata::Success { success: 1 });
        let content = message.payload().unwrap().content();
        assert_eq!(content, r#"{"last":"15350001","vol":"273.5234"}"#);
        assert!(raw.contains(content));
    }

    #[test]
    fn test_numeric_literals_keep_every_digit() {
        let raw = r#"{"success":1,"data":{"last":15350001.123456789012,"ids":[1,2]}}"#;
        let message = NativeMessage::new(Exchange::Bitbank, raw);
        assert_eq!(
            message.payload().unwrap().content(),
            r#"{"last":15350001.123456789012,"ids":[1,2]}"#
        );
    }

    #[test]
    fn test_derived_values_are_reference_stable() {
        let message = NativeMessage::new(Exchange::Bitbank, r#"{"success":1,"data":[]}"#);
        let first = message.payload().unwrap();
        let second = message.payload().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(
            message.metadata().unwrap(),
            message.metadata().unwrap()
        ));
    }

    #[test]
    fn test_status_envelope() {
        let raw = r#"{"status":0,"data":[{"symbol":"BTC","last":"8000000.123"}],"responsetime":"2019-03-19T02:15:06.001Z"}"#;
        let message = NativeMessage::new(Exchange::GmoCoin, raw);
        assert_eq!(
            message.metadata().unwrap(),
            &Metadata::Status {
                status: 0,
                response_time: Some("2019-03-19T02:15:06.001Z".to_string()),
            }
        );
        assert_eq!(
            message.payload().unwrap().content(),
            r#"[{"symbol":"BTC","last":"8000000.123"}]"#
        );
    }

    #[test]
    fn test_inline_success_is_rebuilt_without_flag() {
        let raw = r#"{"success":true, "jpy":"0.8401","btc" : 7.75052654000000001}"#;
        let message = NativeMessage::new(Exchange::Coincheck, raw);
        assert_eq!(
            message.metadata().unwrap(),
            &Metadata::SuccessFlag { success: true }
        );
        assert_eq!(
            message.payload().unwrap().content(),
            r#"{"jpy":"0.8401","btc":7.75052654000000001}"#
        );
    }

    #[test]
    fn test_inline_success_without_flag_has_absent_metadata() {
        let raw = r#"{"last":27390,"bid":26900}"#;
        let message = NativeMessage::new(Exchange::Coincheck, raw);
        assert!(message.metadata().unwrap().is_absent());
        assert_eq!(message.payload().unwrap().content(), raw);
    }

    #[test]
    fn test_missing_data_member_is_format_error() {
        let message = NativeMessage::new(Exchange::Bitbank, r#"{"success":1}"#);
        let err = message.payload().unwrap_err();
        assert_eq!(err.exchange, Exchange::Bitbank);
        assert_eq!(err.observed, "object without `data`");
        assert!(message.metadata().is_ok());
    }

    #[test]
    fn test_wrong_shape_reports_observed_shape() {
        let message = NativeMessage::new(Exchange::Bitbank, "[1,2,3]");
        let err = message.metadata().unwrap_err();
        assert_eq!(err.observed, "array");

        let message = NativeMessage::new(Exchange::Bitbank, r#"{"success":"yes","data":{}}"#);
        assert_eq!(message.metadata().unwrap_err().observed, "string");

        let message = NativeMessage::new(Exchange::GmoCoin, "<html>");
        assert_eq!(message.payload().unwrap_err().observed, "malformed non-JSON text");
    }

    #[test]
    fn test_content_at_descends_nested_objects() {
        let raw = r#"{"success":1,"data":{"assets":[{"asset":"jpy","free_amount":"1.0000"}]}}"#;
        let message = NativeMessage::new(Exchange::Bitbank, raw);
        let payload = message.payload().unwrap();
        assert_eq!(
            payload.content_at(&["assets"]).unwrap(),
            r#"[{"asset":"jpy","free_amount":"1.0000"}]"#
        );
        assert_eq!(payload.content_at(&[]).unwrap(), payload.content());
        let err = payload.content_at(&["statuses"]).unwrap_err();
        assert_eq!(err.expected, "member `statuses`");
    }
}
