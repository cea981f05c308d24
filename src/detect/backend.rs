use anyhow::Result;

use crate::geometry::Rect;

/// Detector backend trait.
///
/// Detection is delegated entirely to pre-trained classifiers; this trait is
/// the seam between the analyzer and whichever classifier library backs it.
///
/// Implementations must treat the pixel slice as read-only and ephemeral, and
/// must not assume anything about box ordering beyond "the order the
/// classifier emitted them".
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Detect face regions in a grayscale frame.
    fn detect_faces(&mut self, gray: &[u8], width: u32, height: u32) -> Result<Vec<Rect>>;

    /// Detect eye regions inside a grayscale face region of interest.
    ///
    /// Coordinates are relative to the ROI, not the frame. The analyzer only
    /// uses the count, so implementations need not be precise about placement.
    fn detect_eyes(&mut self, gray_roi: &[u8], width: u32, height: u32) -> Result<Vec<Rect>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
