//! Placeholder CCTV frames with detection overlays.

pub mod canvas;

use crate::config::FrameConfig;
use crate::error::Error;
use crate::models::CameraLocation;
use anyhow::{Context, Result};
use canvas::{blend_rect, draw_line, fill_ellipse, fill_rect, outline_rect};
use chrono::NaiveDateTime;
use image::{ImageEncoder, Rgb, RgbImage};
use log::debug;
use rand::Rng;
use serde::Serialize;
use std::path::Path;

const BACKGROUND: Rgb<u8> = Rgb([30, 30, 35]);
const GRID: Rgb<u8> = Rgb([50, 50, 55]);
const SIDEWALK: Rgb<u8> = Rgb([60, 60, 65]);
const BUILDING_A: Rgb<u8> = Rgb([70, 70, 80]);
const BUILDING_B: Rgb<u8> = Rgb([65, 65, 75]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const REC_RED: Rgb<u8> = Rgb([255, 0, 0]);
const BODY: Rgb<u8> = Rgb([50, 50, 120]);
const HEAD: Rgb<u8> = Rgb([80, 60, 40]);
const LEGS: Rgb<u8> = Rgb([30, 30, 70]);
pub const BOX_COLOR: Rgb<u8> = Rgb([255, 50, 50]);
const CAR_BODY: Rgb<u8> = Rgb([120, 120, 140]);
const CAR_CABIN: Rgb<u8> = Rgb([100, 100, 130]);
const WHEEL: Rgb<u8> = Rgb([30, 30, 30]);

/// Overlay metadata for a frame showing a violation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameDetection {
    /// Inclusive bounding box (x0, y0, x1, y1)
    pub bbox: (i64, i64, i64, i64),
    pub confidence: f64,
}

/// A rendered mock camera frame
pub struct CctvFrame {
    pub image: RgbImage,
    pub caption: String,
    pub detection: Option<FrameDetection>,
}

/// Text that belongs in the caption bar of a frame
pub fn frame_caption(location: CameraLocation, timestamp: NaiveDateTime) -> String {
    format!("{} | {}", location.label(), timestamp.format("%Y-%m-%d %H:%M:%S"))
}

/// Draw a mock frame. Noise is applied last, so overlay pixels are exact
/// only when `noise_amplitude` is zero.
pub fn render_frame<R: Rng + ?Sized>(
    location: CameraLocation,
    has_violation: bool,
    timestamp: NaiveDateTime,
    rng: &mut R,
    config: &FrameConfig,
) -> CctvFrame {
    let mut img = RgbImage::from_pixel(config.width, config.height, BACKGROUND);
    let w = i64::from(config.width);
    let h = i64::from(config.height);

    draw_scene(&mut img, w, h);

    let detection = if has_violation {
        Some(draw_violation(&mut img, w, h, rng))
    } else {
        None
    };

    add_noise(&mut img, config.noise_amplitude, rng);

    debug!(
        "Rendered {}x{} frame for {} (violation: {})",
        config.width,
        config.height,
        location.short_id(),
        has_violation
    );

    CctvFrame {
        image: img,
        caption: frame_caption(location, timestamp),
        detection,
    }
}

fn draw_scene(img: &mut RgbImage, w: i64, h: i64) {
    // perspective grid converging towards the horizon at a third of the height
    for x in (0..w).step_by(50) {
        draw_line(img, (x, h), (w / 2 + (x - w / 2) / 2, h / 3), GRID, 1);
    }
    for y in (h / 3..h).step_by(50) {
        draw_line(img, (0, y), (w, y), GRID, 1);
    }

    fill_rect(img, (50, h - 100), (w - 50, h), SIDEWALK);
    fill_rect(img, (50, 50), (150, 150), BUILDING_A);
    fill_rect(img, (400, 70), (500, 140), BUILDING_B);

    // caption bar and recording indicator
    blend_rect(img, (10, 10), (350, 30), BLACK, 150);
    fill_ellipse(img, (w - 25, 15), (w - 15, 25), REC_RED);
}

fn draw_violation<R: Rng + ?Sized>(img: &mut RgbImage, w: i64, h: i64, rng: &mut R) -> FrameDetection {
    let px = rng.gen_range(100..=(w - 150).max(100));
    let py = h - 80;

    // attendant
    fill_rect(img, (px - 10, py - 50), (px + 10, py), BODY);
    fill_ellipse(img, (px - 8, py - 70), (px + 8, py - 54), HEAD);
    draw_line(img, (px - 10, py - 40), (px - 25, py - 20), BODY, 5);
    draw_line(img, (px + 10, py - 40), (px + 25, py - 20), BODY, 5);
    draw_line(img, (px - 5, py), (px - 10, py + 30), LEGS, 8);
    draw_line(img, (px + 5, py), (px + 10, py + 30), LEGS, 8);

    let bbox = (px - 30, py - 75, px + 30, py + 35);
    outline_rect(img, (bbox.0, bbox.1), (bbox.2, bbox.3), BOX_COLOR, 2);

    // label tag above the box
    let confidence = rng.gen_range(0.78..0.96);
    blend_rect(img, (px - 30, py - 95), (px + 80, py - 76), BLACK, 180);

    // parked vehicle next to the attendant
    let vx = px + rng.gen_range(-50..=50);
    let vy = py + 10;
    fill_rect(img, (vx - 40, vy), (vx + 40, vy + 25), CAR_BODY);
    fill_rect(img, (vx - 30, vy - 15), (vx + 30, vy), CAR_CABIN);
    fill_ellipse(img, (vx - 30, vy + 20), (vx - 20, vy + 30), WHEEL);
    fill_ellipse(img, (vx + 20, vy + 20), (vx + 30, vy + 30), WHEEL);

    // redraw the box so the vehicle never hides it
    outline_rect(img, (bbox.0, bbox.1), (bbox.2, bbox.3), BOX_COLOR, 2);

    FrameDetection { bbox, confidence }
}

fn add_noise<R: Rng + ?Sized>(img: &mut RgbImage, amplitude: u8, rng: &mut R) {
    if amplitude == 0 {
        return;
    }
    let amp = i16::from(amplitude);
    for channel in img.iter_mut() {
        let noisy = i16::from(*channel) + rng.gen_range(-amp..amp);
        *channel = noisy.clamp(0, 255) as u8;
    }
}

/// Write a frame as PNG
pub fn save_frame(image: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create frame directory: {:?}", parent))?;
    }
    let output =
        std::fs::File::create(path).context(format!("Failed to create frame file: {:?}", path))?;
    let encoder = image::codecs::png::PngEncoder::new(std::io::BufWriter::new(output));

    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| Error::Render(format!("Failed to encode PNG {:?}: {}", path, e)))?;

    Ok(())
}
