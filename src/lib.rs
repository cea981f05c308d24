//! facetrack
//!
//! This crate implements a single face-tracking perception node.
//!
//! # Architecture
//!
//! The node subscribes to a camera picture stream and a camera status stream
//! over MQTT, runs face/eye detection on each decoded frame, computes the
//! signed angular offset of each qualifying face from the image center, and
//! periodically publishes a capture request.
//!
//! # Module Structure
//!
//! - `geometry`: detection box value type and center math
//! - `status`: latest-known camera field-of-view / aspect state
//! - `msg`: wire payloads (status records, capture request constant)
//! - `frame`: payload decode and grayscale helpers
//! - `detect`: detector backend trait and backends (stub, cascade)
//! - `analyze`: per-frame analysis and angular offset computation
//! - `annotate`: frame markup and artifact persistence
//! - `trigger`: fixed-cadence capture request loop
//! - `config`: daemon configuration (file + env)

pub mod analyze;
pub mod annotate;
pub mod config;
pub mod detect;
pub mod frame;
pub mod geometry;
pub mod msg;
pub mod status;
pub mod trigger;

pub use analyze::{AngularOffset, FaceReport, FrameAnalyzer};
pub use detect::{DetectorBackend, ScriptedFrame, StubBackend};
pub use geometry::{Point, Rect};
pub use msg::{StatusMessage, CAPTURE_REQUEST_PAYLOAD};
pub use status::{CameraStatus, StatusTracker};
pub use trigger::CaptureTrigger;

/// Input rejected by an explicit contract rather than a crash.
///
/// Carried through `anyhow` so callers can log the code and drop the input;
/// nothing in this node treats an `InputError` as fatal.
#[derive(Clone, Debug)]
pub struct InputError {
    pub code: &'static str,
    pub message: String,
}

pub const INVALID_STATUS: &str = "INVALID_STATUS";
pub const INVALID_FRAME: &str = "INVALID_FRAME";

impl InputError {
    pub fn invalid_status(message: impl Into<String>) -> Self {
        Self {
            code: INVALID_STATUS,
            message: message.into(),
        }
    }

    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self {
            code: INVALID_FRAME,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for InputError {}
