//! Cascade classifier backend.
//!
//! Delegates face and eye detection to two pre-trained `rustface` models.
//! Model files are configured at startup; nothing here retrains or tunes the
//! classifiers beyond the standard pyramid parameters.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rustface::{Detector, ImageData};

use crate::detect::backend::DetectorBackend;
use crate::geometry::Rect;

pub struct CascadeBackend {
    face: Box<dyn Detector>,
    eye: Box<dyn Detector>,
}

impl CascadeBackend {
    /// Load the frontal-face and eye classifier models.
    pub fn from_models(face_model: &Path, eye_model: &Path) -> Result<Self> {
        Ok(Self {
            face: load_detector(face_model, 40)?,
            eye: load_detector(eye_model, 20)?,
        })
    }
}

fn load_detector(model: &Path, min_size: u32) -> Result<Box<dyn Detector>> {
    let path = model
        .to_str()
        .ok_or_else(|| anyhow!("model path is not valid UTF-8: {}", model.display()))?;
    let mut detector = rustface::create_detector(path)
        .with_context(|| format!("load classifier model {}", model.display()))?;
    detector.set_min_face_size(min_size);
    detector.set_score_thresh(2.0);
    detector.set_pyramid_scale_factor(0.8);
    detector.set_slide_window_step(4, 4);
    Ok(detector)
}

fn run_detector(detector: &mut dyn Detector, gray: &[u8], width: u32, height: u32) -> Vec<Rect> {
    let mut image = ImageData::new(gray, width, height);
    detector
        .detect(&mut image)
        .iter()
        .map(|info| {
            let bbox = info.bbox();
            Rect::new(
                bbox.x().max(0) as u32,
                bbox.y().max(0) as u32,
                bbox.width(),
                bbox.height(),
            )
        })
        .collect()
}

impl DetectorBackend for CascadeBackend {
    fn name(&self) -> &'static str {
        "cascade"
    }

    fn detect_faces(&mut self, gray: &[u8], width: u32, height: u32) -> Result<Vec<Rect>> {
        Ok(run_detector(self.face.as_mut(), gray, width, height))
    }

    fn detect_eyes(&mut self, gray_roi: &[u8], width: u32, height: u32) -> Result<Vec<Rect>> {
        Ok(run_detector(self.eye.as_mut(), gray_roi, width, height))
    }
}
