use std::collections::VecDeque;

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::detect::backend::DetectorBackend;
use crate::geometry::Rect;

/// Scripted detections for one frame.
#[derive(Clone, Debug)]
pub struct ScriptedFrame {
    pub faces: Vec<Rect>,
    /// One eye list per face, in face order.
    pub eyes: Vec<Vec<Rect>>,
}

/// Stub backend for testing and model-less deployments.
///
/// In scripted mode it replays queued detections frame by frame. Without a
/// script it hashes the pixels and, whenever the frame changed since the last
/// call, synthesizes one centered face with two eyes.
pub struct StubBackend {
    last_hash: Option<[u8; 32]>,
    changed: bool,
    script: VecDeque<ScriptedFrame>,
    pending_eyes: VecDeque<Vec<Rect>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            last_hash: None,
            changed: false,
            script: VecDeque::new(),
            pending_eyes: VecDeque::new(),
        }
    }

    /// Queue scripted detections; one entry is consumed per analyzed frame.
    pub fn scripted(frames: impl IntoIterator<Item = ScriptedFrame>) -> Self {
        let mut backend = Self::new();
        backend.script = frames.into_iter().collect();
        backend
    }

    pub fn push_frame(&mut self, frame: ScriptedFrame) {
        self.script.push_back(frame);
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect_faces(&mut self, gray: &[u8], width: u32, height: u32) -> Result<Vec<Rect>> {
        if let Some(frame) = self.script.pop_front() {
            self.pending_eyes = frame.eyes.into();
            return Ok(frame.faces);
        }

        let current_hash: [u8; 32] = Sha256::digest(gray).into();
        self.changed = match self.last_hash {
            Some(prev) => prev != current_hash,
            None => false,
        };
        self.last_hash = Some(current_hash);

        if !self.changed || width < 4 || height < 4 {
            return Ok(vec![]);
        }
        // Centered box covering the middle half of the frame.
        Ok(vec![Rect::new(
            width / 4,
            height / 4,
            width / 2,
            height / 2,
        )])
    }

    fn detect_eyes(&mut self, _gray_roi: &[u8], width: u32, height: u32) -> Result<Vec<Rect>> {
        if let Some(eyes) = self.pending_eyes.pop_front() {
            return Ok(eyes);
        }
        if !self.changed {
            return Ok(vec![]);
        }
        let eye_w = (width / 4).max(1);
        let eye_h = (height / 4).max(1);
        Ok(vec![
            Rect::new(width / 8, height / 4, eye_w, eye_h),
            Rect::new(width / 2, height / 4, eye_w, eye_h),
        ])
    }
}
