use crate::error::ModelError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

const FIELD_ID: &str = "id";
const FIELD_NAME: &str = "name";
const FIELD_TIMESTAMP: &str = "timestamp";

/// Payload carried by each message on the source topic.
///
/// `parse` mirrors the casts of the append statement for present scalar
/// fields: a value it cannot coerce would also fail the engine's `CAST` and
/// block the partition as a poison message. It is stricter than the engine
/// about missing or non-scalar fields, which the engine extracts as NULL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMessage {
    pub id: i32,
    pub name: String,
    #[serde(with = "iso_micros")]
    pub timestamp: NaiveDateTime,
}

impl SourceMessage {
    pub fn new(id: i32, name: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            id,
            name: name.into(),
            timestamp,
        }
    }

    pub fn parse(payload: &str) -> Result<Self, ModelError> {
        let value: JsonValue = serde_json::from_str(payload)
            .map_err(|e| ModelError::MalformedPayload(e.to_string()))?;
        let obj = value
            .as_object()
            .ok_or_else(|| ModelError::MalformedPayload("expected a JSON object".into()))?;

        let id = coerce_integer(FIELD_ID, scalar(obj.get(FIELD_ID), FIELD_ID)?)?;
        let name = coerce_varchar(FIELD_NAME, scalar(obj.get(FIELD_NAME), FIELD_NAME)?)?;
        let timestamp = coerce_timestamp(
            FIELD_TIMESTAMP,
            scalar(obj.get(FIELD_TIMESTAMP), FIELD_TIMESTAMP)?,
        )?;

        Ok(Self {
            id,
            name,
            timestamp,
        })
    }

    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn scalar<'a>(value: Option<&'a JsonValue>, field: &'static str) -> Result<&'a JsonValue, ModelError> {
    match value {
        None | Some(JsonValue::Null) => Err(ModelError::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn coercion(field: &'static str, value: &JsonValue, target: &'static str) -> ModelError {
    ModelError::Coercion {
        field,
        value: value.to_string(),
        target,
    }
}

fn coerce_integer(field: &'static str, value: &JsonValue) -> Result<i32, ModelError> {
    let parsed = match value {
        JsonValue::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        JsonValue::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| coercion(field, value, "INTEGER"))
}

fn coerce_varchar(field: &'static str, value: &JsonValue) -> Result<String, ModelError> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        _ => Err(coercion(field, value, "VARCHAR")),
    }
}

fn coerce_timestamp(field: &'static str, value: &JsonValue) -> Result<NaiveDateTime, ModelError> {
    let JsonValue::String(raw) = value else {
        return Err(coercion(field, value, "TIMESTAMP(6)"));
    };
    parse_iso8601(raw.trim()).ok_or_else(|| coercion(field, value, "TIMESTAMP(6)"))
}

/// Accepts ISO-8601 date-times with or without an offset, and bare dates.
/// Zoned values keep their wall-clock time, matching a cast to a zoneless
/// timestamp.
pub fn parse_iso8601(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return Some(zoned.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

mod iso_micros {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_iso8601(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 timestamp: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_micro_opt(h, m, s, micro)
            .unwrap()
    }

    #[test]
    fn parses_well_formed_payload() {
        let msg = SourceMessage::parse(
            r#"{"id": 7, "name": "signup", "timestamp": "2024-03-01T10:15:30.123456"}"#,
        )
        .unwrap();
        assert_eq!(msg, SourceMessage::new(7, "signup", ts(10, 15, 30, 123_456)));
    }

    #[test]
    fn coerces_numeric_strings_and_scalar_names() {
        let msg = SourceMessage::parse(
            r#"{"id": "42", "name": 1001, "timestamp": "2024-03-01T10:15:30Z"}"#,
        )
        .unwrap();
        assert_eq!(msg.id, 42);
        assert_eq!(msg.name, "1001");
        assert_eq!(msg.timestamp, ts(10, 15, 30, 0));
    }

    #[test]
    fn zoned_timestamps_keep_wall_clock_time() {
        let msg = SourceMessage::parse(
            r#"{"id": 1, "name": "a", "timestamp": "2024-03-01T10:15:30+02:00"}"#,
        )
        .unwrap();
        assert_eq!(msg.timestamp, ts(10, 15, 30, 0));
    }

    #[test]
    fn rejects_non_integer_id() {
        let err = SourceMessage::parse(
            r#"{"id": "abc", "name": "a", "timestamp": "2024-03-01T10:15:30"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Coercion { field: "id", .. }));

        let err = SourceMessage::parse(
            r#"{"id": 1.5, "name": "a", "timestamp": "2024-03-01T10:15:30"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Coercion { field: "id", .. }));
    }

    #[test]
    fn rejects_missing_and_malformed_fields() {
        assert_eq!(
            SourceMessage::parse(r#"{"id": 1, "timestamp": "2024-03-01"}"#).unwrap_err(),
            ModelError::MissingField("name")
        );
        assert!(matches!(
            SourceMessage::parse(r#"{"id": 1, "name": "a", "timestamp": "yesterday"}"#),
            Err(ModelError::Coercion { field: "timestamp", .. })
        ));
        assert!(matches!(
            SourceMessage::parse("[1, 2]"),
            Err(ModelError::MalformedPayload(_))
        ));
    }

    #[test]
    fn payload_is_parseable_again() {
        let msg = SourceMessage::new(3, "checkout", ts(8, 0, 0, 5));
        let payload = msg.to_payload().unwrap();
        assert!(payload.contains("\"timestamp\":\"2024-03-01T08:00:00.000005\""));
        assert_eq!(SourceMessage::parse(&payload).unwrap(), msg);
    }
}
