//! Detection box geometry.

/// A point in image coordinates. Fractional because box centers fall between
/// pixels for odd dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned bounding box produced by a detector.
///
/// Boxes are per-frame values: produced fresh by detection, discarded once
/// the frame's analysis completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center of the box, computed with floating-point division.
    pub fn center(&self) -> Point {
        Point {
            x: self.x as f64 + self.width as f64 / 2.0,
            y: self.y as f64 + self.height as f64 / 2.0,
        }
    }

    /// Intersect with a frame of the given dimensions.
    ///
    /// Detector boxes occasionally overhang the frame edge; the clamped box
    /// is what annotation and ROI extraction operate on. Returns `None` when
    /// nothing of the box lies inside the frame.
    pub fn clamped_to(&self, frame_width: u32, frame_height: u32) -> Option<Rect> {
        if self.x >= frame_width || self.y >= frame_height {
            return None;
        }
        let width = self.width.min(frame_width - self.x);
        let height = self.height.min(frame_height - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Rect {
            x: self.x,
            y: self.y,
            width,
            height,
        })
    }
}
