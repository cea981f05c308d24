//! Wire payloads.
//!
//! Status records arrive as JSON on the status topic. The capture request is
//! a constant integer payload on its own outbound topic.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Capture request payload, published on every trigger tick.
pub const CAPTURE_REQUEST_PAYLOAD: &[u8] = b"1";

/// Camera status record.
///
/// The sensor block may be absent on partial reports; such records are
/// delivered but carry nothing to apply.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StatusMessage {
    pub sx: Option<CameraState>,
}

/// Sensor sub-record. The field of view is reported as text by the camera
/// firmware and converted defensively on our side.
#[derive(Clone, Debug, Deserialize)]
pub struct CameraState {
    pub fov: String,
    #[serde(default)]
    pub vidres: Option<String>,
}

/// Parse a status payload.
pub fn parse_status(payload: &[u8]) -> Result<StatusMessage> {
    serde_json::from_slice(payload).context("parse status payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_status_record() {
        let msg = parse_status(br#"{"sx": {"fov": "170.0", "vidres": "720p SuperView"}}"#)
            .expect("parse");
        let sx = msg.sx.expect("sensor block");
        assert_eq!(sx.fov, "170.0");
        assert_eq!(sx.vidres.as_deref(), Some("720p SuperView"));
    }

    #[test]
    fn parses_status_without_sensor_block() {
        let msg = parse_status(b"{}").expect("parse");
        assert!(msg.sx.is_none());
    }

    #[test]
    fn parses_status_without_vidres() {
        let msg = parse_status(br#"{"sx": {"fov": "90"}}"#).expect("parse");
        assert!(msg.sx.expect("sensor block").vidres.is_none());
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(parse_status(b"not json").is_err());
    }
}
