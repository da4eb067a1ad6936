//! Webhook Envelope
//!
//! Top-level body of a webhook POST. Only `object` is interpreted; every
//! other field is carried through untouched for the handler. [`Entry`] and
//! [`Change`] are read-only views over that payload and never fail.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::object::Object;
use crate::error::{DecodeError, Result};

static NULL: Value = Value::Null;

/// Decoded webhook body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Discriminator used to pick a handler.
    pub object: Object,
    /// Batched entries as sent. `Null` when absent.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub entry: Value,
    /// Top-level fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Envelope for `object` with no payload.
    pub fn new(object: Object) -> Self {
        Self {
            object,
            entry: Value::Null,
            extra: Map::new(),
        }
    }

    /// Decode an envelope from a raw request body.
    ///
    /// Fails when the body is not JSON, when `object` is missing or not a
    /// string, or when it is an empty string. The rest of the body is not
    /// validated.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let envelope: Self = serde_json::from_slice(body)?;
        if envelope.object.as_str().is_empty() {
            return Err(DecodeError::EmptyObject);
        }
        Ok(envelope)
    }

    /// Entries of the batch. Empty unless `entry` is an array.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        array_items(&self.entry).iter().map(Entry)
    }

    /// Iterate over all changes across all entries.
    pub fn changes(&self) -> impl Iterator<Item = Change<'_>> {
        self.entries().flat_map(Entry::changes)
    }
}

/// One entry of a webhook batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry<'a>(&'a Value);

impl<'a> Entry<'a> {
    /// The entry exactly as sent.
    pub fn raw(self) -> &'a Value {
        self.0
    }

    /// Entry field by name.
    pub fn get(self, key: &str) -> Option<&'a Value> {
        self.0.get(key)
    }

    /// ID of the resource the entry is about. Numeric IDs are rendered as text.
    pub fn id(self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Event time (Unix seconds or milliseconds, as sent by the platform).
    #[allow(clippy::cast_possible_truncation)]
    pub fn time(self) -> Option<i64> {
        let time = self.0.get("time")?;
        time.as_i64().or_else(|| time.as_f64().map(|t| t as i64))
    }

    /// Field-level changes (feed-style subscriptions).
    pub fn changes(self) -> impl Iterator<Item = Change<'a>> + 'a {
        array_items(self.0.get("changes").unwrap_or(&NULL))
            .iter()
            .map(Change)
    }

    /// Messaging events (page messaging subscriptions).
    pub fn messaging(self) -> &'a [Value] {
        array_items(self.0.get("messaging").unwrap_or(&NULL))
    }
}

/// A single changed field inside an [`Entry`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change<'a>(&'a Value);

impl<'a> Change<'a> {
    /// The change exactly as sent.
    pub fn raw(self) -> &'a Value {
        self.0
    }

    /// Subscribed field name (e.g., `"posts"`). Empty when absent.
    pub fn field(self) -> &'a str {
        self.0.get("field").and_then(Value::as_str).unwrap_or_default()
    }

    /// Field payload. `Null` when absent.
    pub fn value(self) -> &'a Value {
        self.0.get("value").unwrap_or(&NULL)
    }
}

fn array_items(value: &Value) -> &[Value] {
    value.as_array().map_or(&[][..], Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP_POST: &[u8] = br#"{
        "object": "group",
        "entry": [{
            "id": "1234",
            "time": 1520383571,
            "changes": [{
                "field": "posts",
                "value": {"verb": "add", "post_id": "1234_5678"}
            }]
        }]
    }"#;

    #[test]
    fn decodes_group_post() {
        let envelope = Envelope::from_slice(GROUP_POST).unwrap();

        assert_eq!(envelope.object, Object::Group);
        let entries: Vec<_> = envelope.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id().as_deref(), Some("1234"));
        assert_eq!(entries[0].time(), Some(1_520_383_571));

        let changes: Vec<_> = envelope.changes().collect();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field(), "posts");
        assert_eq!(changes[0].value()["verb"], "add");
    }

    #[test]
    fn keeps_unknown_fields() {
        let body = br#"{
            "object": "page",
            "entry": [{"id": "1", "time": 2, "messaging": [{"sender": {"id": "9"}}], "uid": "x"}],
            "community": {"id": "42"}
        }"#;
        let envelope = Envelope::from_slice(body).unwrap();
        let entry = envelope.entries().next().unwrap();

        assert_eq!(envelope.extra["community"]["id"], "42");
        assert_eq!(entry.get("uid").unwrap(), "x");
        assert_eq!(entry.messaging()[0]["sender"]["id"], "9");
    }

    #[test]
    fn entry_is_optional() {
        let envelope = Envelope::from_slice(br#"{"object": "link"}"#).unwrap();
        assert_eq!(envelope.object, Object::Link);
        assert_eq!(envelope.entries().count(), 0);
    }

    #[test]
    fn loosely_typed_payload_is_accepted() {
        let bodies: [&[u8]; 5] = [
            br#"{"object": "page", "entry": null}"#,
            br#"{"object": "page", "entry": {"not": "an array"}}"#,
            br#"{"object": "page", "entry": [{"id": 123, "time": 1}]}"#,
            br#"{"object": "page", "entry": [{"id": "1", "time": 1.5}]}"#,
            br#"{"object": "page", "entry": [{"changes": [{"value": 1}, 7]}]}"#,
        ];
        for body in bodies {
            let envelope = Envelope::from_slice(body).unwrap();
            assert_eq!(envelope.object, Object::Page);
        }
    }

    #[test]
    fn views_tolerate_odd_shapes() {
        let envelope = Envelope::from_slice(
            br#"{"object": "page", "entry": [{"id": 123, "time": 1.5, "changes": [{"value": 1}, 7]}, 3]}"#,
        )
        .unwrap();
        let entries: Vec<_> = envelope.entries().collect();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id().as_deref(), Some("123"));
        assert_eq!(entries[0].time(), Some(1));
        assert_eq!(entries[1].id(), None);
        assert_eq!(entries[1].raw(), &Value::from(3));

        let changes: Vec<_> = envelope.changes().collect();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field(), "");
        assert_eq!(changes[0].value(), &Value::from(1));
        assert_eq!(changes[1].value(), &Value::Null);
    }

    #[test]
    fn missing_object_is_an_error() {
        let err = Envelope::from_slice(br#"{"entry": []}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn non_string_object_is_an_error() {
        let err = Envelope::from_slice(br#"{"object": 7}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn empty_object_is_an_error() {
        let err = Envelope::from_slice(br#"{"object": ""}"#).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyObject));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Envelope::from_slice(b"{\"object\": \"page\"").is_err());
        assert!(Envelope::from_slice(b"").is_err());
        assert!(Envelope::from_slice(b"[]").is_err());
    }
}
