//! Latest-known camera status.
//!
//! The tracker holds the camera's horizontal field of view and the vertical
//! aspect factor (vertical / horizontal resolution) derived from the reported
//! video resolution identifier. Status delivery is the single writer; the
//! analysis path reads consistent snapshots.

use std::sync::RwLock;

use anyhow::Result;

use crate::msg::StatusMessage;
use crate::InputError;

/// Default horizontal field of view in degrees (wide mode).
pub const DEFAULT_FOV_DEGREES: f64 = 170.0;

/// Default vertical aspect factor (16:9).
pub const DEFAULT_VERTICAL_ASPECT: f64 = 9.0 / 16.0;

/// Resolution identifier to vertical aspect factor. Fixed at initialization;
/// identifiers outside this table leave the stored aspect unchanged.
const VIDEO_RESOLUTIONS: &[(&str, f64)] = &[
    ("720p SuperView", 9.0 / 16.0),
    ("920p", 3.0 / 4.0),
];

/// Snapshot of the camera status used by a single frame analysis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraStatus {
    pub fov_degrees: f64,
    pub vertical_aspect: f64,
}

impl CameraStatus {
    /// Effective vertical field of view in degrees.
    pub fn vertical_fov(&self) -> f64 {
        self.fov_degrees * self.vertical_aspect
    }
}

impl Default for CameraStatus {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            vertical_aspect: DEFAULT_VERTICAL_ASPECT,
        }
    }
}

/// Shared camera status state.
///
/// Single-writer (status delivery) / many-reader (analysis) via `RwLock`.
pub struct StatusTracker {
    state: RwLock<CameraStatus>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CameraStatus::default()),
        }
    }

    /// Apply an observed status record.
    ///
    /// A record without a sensor block is a no-op. A field of view that fails
    /// numeric conversion, or converts to a non-finite or non-positive value,
    /// is rejected with `INVALID_STATUS` and the prior status is preserved.
    /// Unknown resolution identifiers are tolerated: the stored aspect factor
    /// is simply retained.
    pub fn update(&self, message: &StatusMessage) -> Result<()> {
        let Some(sx) = &message.sx else {
            return Ok(());
        };

        let fov: f64 = sx.fov.trim().parse().map_err(|_| {
            InputError::invalid_status(format!("field of view is not numeric: {:?}", sx.fov))
        })?;
        if !fov.is_finite() || fov <= 0.0 {
            return Err(
                InputError::invalid_status(format!("field of view out of range: {}", fov)).into(),
            );
        }

        let aspect = sx
            .vidres
            .as_deref()
            .and_then(|identifier| aspect_for_resolution(identifier));
        if let Some(identifier) = sx.vidres.as_deref() {
            if aspect.is_none() {
                log::debug!("unknown video resolution {:?}, keeping prior aspect", identifier);
            }
        }

        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(aspect) = aspect {
            state.vertical_aspect = aspect;
        }
        state.fov_degrees = fov;
        Ok(())
    }

    /// Consistent snapshot for one frame analysis.
    pub fn snapshot(&self) -> CameraStatus {
        *self
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn aspect_for_resolution(identifier: &str) -> Option<f64> {
    VIDEO_RESOLUTIONS
        .iter()
        .find(|(known, _)| *known == identifier)
        .map(|(_, aspect)| *aspect)
}
