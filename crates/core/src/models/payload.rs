//! QR payload format
//!
//! The payload is a JSON document tying a scan to one session. Older codes
//! used a flat `ATTENDANCE_<code>_<unix-millis>` string; those still decode.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const LEGACY_PREFIX: &str = "ATTENDANCE_";

/// Type tag carried by every payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Attendance,
}

/// Structured content encoded into a session's QR code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    #[serde(rename = "type")]
    pub kind: PayloadKind,
    pub session_id: String,
    #[serde(default)]
    pub session_name: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

impl QrPayload {
    pub fn new(code: &str, name: &str, duration_minutes: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            kind: PayloadKind::Attendance,
            session_id: code.to_string(),
            session_name: Some(name.to_string()),
            duration: Some(duration_minutes),
            timestamp: created_at,
        }
    }

    /// Encode as the string stored in the session row
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a scanned string, accepting both JSON and legacy flat payloads
    pub fn decode(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.starts_with('{') {
            return Ok(serde_json::from_str(raw)?);
        }
        Self::decode_legacy(raw)
    }

    fn decode_legacy(raw: &str) -> Result<Self> {
        let invalid = || Error::Validation(format!("Unrecognized QR code: {raw}"));

        let body = raw.strip_prefix(LEGACY_PREFIX).ok_or_else(invalid)?;
        let (code, millis) = body.rsplit_once('_').ok_or_else(invalid)?;
        if code.is_empty() {
            return Err(invalid());
        }
        let millis: i64 = millis.parse().map_err(|_| invalid())?;
        let timestamp = Utc.timestamp_millis_opt(millis).single().ok_or_else(invalid)?;

        Ok(Self {
            kind: PayloadKind::Attendance,
            session_id: code.to_string(),
            session_name: None,
            duration: None,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_payload_is_tagged_json() {
        let now = Utc::now();
        let encoded = QrPayload::new("CS-101", "Intro", 60, now).encode().unwrap();

        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["type"], "attendance");
        assert_eq!(value["sessionId"], "CS-101");
        assert_eq!(value["sessionName"], "Intro");
        assert_eq!(value["duration"], 60);
    }

    #[test]
    fn test_decode_legacy_payload() {
        let payload = QrPayload::decode("ATTENDANCE_CS-101_2024_1730000001000").unwrap();
        assert_eq!(payload.session_id, "CS-101_2024");
        assert_eq!(payload.timestamp.timestamp_millis(), 1_730_000_001_000);
        assert!(payload.session_name.is_none());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(QrPayload::decode("hello").unwrap_err().is_validation());
        assert!(QrPayload::decode("ATTENDANCE__123").is_err());
        assert!(QrPayload::decode("ATTENDANCE_CS101_notanumber").is_err());
        assert!(matches!(
            QrPayload::decode("{\"type\":\"other\"}"),
            Err(Error::Serialization(_))
        ));
    }
}
