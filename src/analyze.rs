//! Per-frame analysis.
//!
//! Given a decoded frame and the current camera status, detect faces, keep
//! those with both eyes found (qualifying faces), and compute each one's
//! signed angular offset from the image center. Left and above are negative;
//! right and below are positive. The annotated frame is persisted on every
//! call, qualifying faces or not.

use std::path::PathBuf;

use anyhow::Result;
use image::RgbImage;

use crate::annotate;
use crate::detect::DetectorBackend;
use crate::frame::{crop_gray, to_gray};
use crate::geometry::{Point, Rect};
use crate::status::CameraStatus;
use crate::InputError;

/// A face qualifies only when the eye detector finds at least this many eye
/// regions inside its bounding box.
pub const MIN_EYES_PER_FACE: usize = 2;

/// Signed angular displacement of a face center from the image center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngularOffset {
    /// Negative left of center, positive right of center.
    pub horizontal_degrees: f64,
    /// Negative above center, positive below center.
    pub vertical_degrees: f64,
}

/// One qualifying face in an analyzed frame, in detector output order.
#[derive(Clone, Debug)]
pub struct FaceReport {
    pub rect: Rect,
    pub center: Point,
    pub eyes: usize,
    pub offset: AngularOffset,
}

/// Angular offset of a point from the center of a `width` x `height` frame.
///
/// The horizontal axis spans the full field of view; the vertical axis spans
/// the field of view scaled by the vertical aspect factor. Pure function of
/// its inputs.
pub fn angular_offset(
    center: Point,
    width: u32,
    height: u32,
    status: &CameraStatus,
) -> AngularOffset {
    AngularOffset {
        horizontal_degrees: axis_offset(center.x, width, status.fov_degrees),
        vertical_degrees: axis_offset(center.y, height, status.vertical_fov()),
    }
}

fn axis_offset(coordinate: f64, extent: u32, fov_degrees: f64) -> f64 {
    let half = extent as f64 / 2.0;
    if coordinate < half {
        let distance = (coordinate - half).abs();
        -(fov_degrees * distance / extent as f64)
    } else if coordinate > half {
        let distance = (coordinate - half).abs();
        fov_degrees * distance / extent as f64
    } else {
        0.0
    }
}

/// Frame analyzer: detection, qualification, offsets, annotation, persistence.
pub struct FrameAnalyzer {
    backend: Box<dyn DetectorBackend>,
    output_path: PathBuf,
}

impl FrameAnalyzer {
    pub fn new(backend: Box<dyn DetectorBackend>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            output_path: output_path.into(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Analyze one frame against a status snapshot.
    ///
    /// Returns one report per qualifying face, in detector output order.
    /// Rejects zero-area frames with `INVALID_FRAME`; any well-formed frame
    /// is annotated (at minimum the frame-center marker) and persisted.
    pub fn analyze(&mut self, image: &mut RgbImage, status: CameraStatus) -> Result<Vec<FaceReport>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(InputError::invalid_frame(format!(
                "zero-area frame ({}x{})",
                width, height
            ))
            .into());
        }

        let gray = to_gray(image);
        annotate::draw_frame_center(image);

        let faces = self.backend.detect_faces(gray.as_raw(), width, height)?;
        let mut reports = Vec::new();
        for face in faces {
            let Some(face) = face.clamped_to(width, height) else {
                continue;
            };
            let roi = crop_gray(&gray, face);
            let eyes = self.backend.detect_eyes(&roi, face.width, face.height)?;
            if eyes.len() < MIN_EYES_PER_FACE {
                continue;
            }

            let center = face.center();
            let offset = angular_offset(center, width, height, &status);
            annotate::draw_face(image, face, center);
            log_offset(&offset);
            reports.push(FaceReport {
                rect: face,
                center,
                eyes: eyes.len(),
                offset,
            });
        }

        annotate::persist(image, &self.output_path)?;
        Ok(reports)
    }
}

fn log_offset(offset: &AngularOffset) {
    let horizontal = if offset.horizontal_degrees < 0.0 {
        "left"
    } else {
        "right"
    };
    let vertical = if offset.vertical_degrees < 0.0 {
        "top"
    } else {
        "bottom"
    };
    log::info!(
        "face offset: {}={:.2} degrees {}={:.2} degrees",
        horizontal,
        offset.horizontal_degrees.abs(),
        vertical,
        offset.vertical_degrees.abs()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{ScriptedFrame, StubBackend};
    use image::Rgb;

    fn status(fov: f64, aspect: f64) -> CameraStatus {
        CameraStatus {
            fov_degrees: fov,
            vertical_aspect: aspect,
        }
    }

    #[test]
    fn centered_point_has_zero_offsets() {
        let offset = angular_offset(
            Point { x: 100.0, y: 50.0 },
            200,
            100,
            &status(170.0, 9.0 / 16.0),
        );
        assert_eq!(offset.horizontal_degrees, 0.0);
        assert_eq!(offset.vertical_degrees, 0.0);
    }

    #[test]
    fn far_left_is_negative_half_fov() {
        let offset = angular_offset(Point { x: 0.0, y: 50.0 }, 100, 100, &status(170.0, 1.0));
        assert!((offset.horizontal_degrees - (-85.0)).abs() < 1e-12);
    }

    #[test]
    fn far_right_is_positive_half_fov() {
        let offset = angular_offset(Point { x: 100.0, y: 50.0 }, 100, 100, &status(170.0, 1.0));
        assert!((offset.horizontal_degrees - 85.0).abs() < 1e-12);
    }

    #[test]
    fn vertical_axis_uses_aspect_scaled_fov() {
        // vertical fov = 170 * 9/16 = 95.625; point at the very top.
        let offset = angular_offset(
            Point { x: 50.0, y: 0.0 },
            100,
            100,
            &status(170.0, 9.0 / 16.0),
        );
        assert!((offset.vertical_degrees - (-95.625 / 2.0)).abs() < 1e-9);
        assert!(offset.vertical_degrees < 0.0);
    }

    #[test]
    fn below_center_is_positive() {
        let offset = angular_offset(Point { x: 50.0, y: 75.0 }, 100, 100, &status(120.0, 0.5));
        assert!((offset.vertical_degrees - 15.0).abs() < 1e-12);
    }

    fn analyzer_with(frames: Vec<ScriptedFrame>, path: &std::path::Path) -> FrameAnalyzer {
        FrameAnalyzer::new(Box::new(StubBackend::scripted(frames)), path)
    }

    fn two_eyes() -> Vec<Rect> {
        vec![Rect::new(2, 2, 4, 4), Rect::new(20, 2, 4, 4)]
    }

    #[test]
    fn centered_face_with_two_eyes_reports_zero_offsets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("img.jpg");
        let mut analyzer = analyzer_with(
            vec![ScriptedFrame {
                faces: vec![Rect::new(80, 40, 40, 20)],
                eyes: vec![two_eyes()],
            }],
            &out,
        );

        let mut img = RgbImage::from_pixel(200, 100, Rgb([50, 50, 50]));
        let reports = analyzer
            .analyze(&mut img, status(170.0, 9.0 / 16.0))
            .expect("analyze");

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.center, Point { x: 100.0, y: 50.0 });
        assert_eq!(report.offset.horizontal_degrees, 0.0);
        assert_eq!(report.offset.vertical_degrees, 0.0);
        assert!(out.exists(), "artifact must be written");
        // Face box drawn on the annotated frame.
        assert_eq!(*img.get_pixel(80, 40), Rgb([0, 0, 255]));
    }

    #[test]
    fn face_with_one_eye_is_ignored_but_artifact_still_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("img.jpg");
        let mut analyzer = analyzer_with(
            vec![ScriptedFrame {
                faces: vec![Rect::new(10, 10, 40, 40)],
                eyes: vec![vec![Rect::new(2, 2, 4, 4)]],
            }],
            &out,
        );

        let mut img = RgbImage::from_pixel(100, 100, Rgb([50, 50, 50]));
        let reports = analyzer
            .analyze(&mut img, CameraStatus::default())
            .expect("analyze");

        assert!(reports.is_empty());
        assert!(out.exists());
        // No face box, only the frame center marker.
        assert_eq!(*img.get_pixel(10, 10), Rgb([50, 50, 50]));
        assert_eq!(*img.get_pixel(50, 50), Rgb([255, 0, 0]));
    }

    #[test]
    fn every_qualifying_face_gets_a_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("img.jpg");
        let mut analyzer = analyzer_with(
            vec![ScriptedFrame {
                faces: vec![
                    Rect::new(0, 0, 20, 20),
                    Rect::new(40, 40, 20, 20),
                    Rect::new(70, 70, 20, 20),
                ],
                eyes: vec![two_eyes(), vec![], two_eyes()],
            }],
            &out,
        );

        let mut img = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let reports = analyzer
            .analyze(&mut img, CameraStatus::default())
            .expect("analyze");

        assert_eq!(reports.len(), 2);
        // Detector output order preserved.
        assert_eq!(reports[0].rect, Rect::new(0, 0, 20, 20));
        assert_eq!(reports[1].rect, Rect::new(70, 70, 20, 20));
        assert!(reports[0].offset.horizontal_degrees < 0.0);
        assert!(reports[1].offset.horizontal_degrees > 0.0);
    }

    #[test]
    fn zero_area_frame_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("img.jpg");
        let mut analyzer = analyzer_with(vec![], &out);
        let mut img = RgbImage::new(0, 0);
        let err = analyzer
            .analyze(&mut img, CameraStatus::default())
            .unwrap_err();
        assert!(format!("{err}").contains("INVALID_FRAME"));
        assert!(!out.exists());
    }

    #[test]
    fn analysis_is_deterministic_for_fixed_inputs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("img.jpg");
        let frame = ScriptedFrame {
            faces: vec![Rect::new(10, 20, 30, 30)],
            eyes: vec![two_eyes()],
        };
        let mut analyzer = analyzer_with(vec![frame.clone(), frame], &out);

        let base = RgbImage::from_pixel(200, 100, Rgb([5, 5, 5]));
        let first = analyzer
            .analyze(&mut base.clone(), CameraStatus::default())
            .expect("first");
        let second = analyzer
            .analyze(&mut base.clone(), CameraStatus::default())
            .expect("second");

        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].offset, second[0].offset);
        assert_eq!(first[0].center, second[0].center);
    }
}
