//! Frame markup and artifact persistence.
//!
//! Annotation mirrors what the operator sees downstream: a red marker at the
//! frame center on every frame, and for each qualifying face a blue bounding
//! box, a green center marker, and a red detection banner. The annotated
//! frame is written to a fixed path, overwriting the previous artifact.

use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut};

use crate::geometry::{Point, Rect};

const FRAME_CENTER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const FACE_CENTER_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const FACE_BOX_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const BANNER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const MARKER_RADIUS: i32 = 3;
const BANNER_Y: u32 = 150;
const BANNER_HEIGHT: u32 = 10;
const BANNER_WIDTH: u32 = 160;

/// Mark the geometric center of the frame. Drawn unconditionally.
pub fn draw_frame_center(image: &mut RgbImage) {
    let (width, height) = image.dimensions();
    draw_filled_circle_mut(
        image,
        ((width / 2) as i32, (height / 2) as i32),
        MARKER_RADIUS,
        FRAME_CENTER_COLOR,
    );
}

/// Mark one qualifying face: bounding box, center marker, detection banner.
pub fn draw_face(image: &mut RgbImage, rect: Rect, center: Point) {
    if rect.width > 0 && rect.height > 0 {
        draw_hollow_rect_mut(
            image,
            imageproc::rect::Rect::at(rect.x as i32, rect.y as i32)
                .of_size(rect.width, rect.height),
            FACE_BOX_COLOR,
        );
    }
    draw_filled_circle_mut(
        image,
        (center.x as i32, center.y as i32),
        MARKER_RADIUS,
        FACE_CENTER_COLOR,
    );
    draw_banner(image);
}

// Stand-in for the "Face detected" text label; text rendering would pull in a
// bundled font asset, so the label is a solid banner strip instead.
fn draw_banner(image: &mut RgbImage) {
    let (width, height) = image.dimensions();
    if height == 0 || width == 0 {
        return;
    }
    let y = BANNER_Y.min(height.saturating_sub(BANNER_HEIGHT));
    let banner_w = BANNER_WIDTH.min(width);
    let banner_h = BANNER_HEIGHT.min(height);
    if banner_w == 0 || banner_h == 0 {
        return;
    }
    draw_filled_rect_mut(
        image,
        imageproc::rect::Rect::at(0, y as i32).of_size(banner_w, banner_h),
        BANNER_COLOR,
    );
}

/// Persist the annotated frame, overwriting any prior artifact.
pub fn persist(image: &RgbImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .with_context(|| format!("write annotated frame to {}", path.display()))
}
