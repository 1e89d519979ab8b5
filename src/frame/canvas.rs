//! Minimal raster primitives over `image::RgbImage`. Coordinates are signed
//! and inclusive; anything outside the image is clipped.

use image::{Rgb, RgbImage};

pub type Point = (i64, i64);

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Clip an inclusive rectangle to the image, `None` if nothing is visible
fn clip(img: &RgbImage, top_left: Point, bottom_right: Point) -> Option<(u32, u32, u32, u32)> {
    let x0 = top_left.0.min(bottom_right.0).max(0);
    let y0 = top_left.1.min(bottom_right.1).max(0);
    let x1 = top_left.0.max(bottom_right.0).min(img.width() as i64 - 1);
    let y1 = top_left.1.max(bottom_right.1).min(img.height() as i64 - 1);
    if x0 > x1 || y0 > y1 {
        None
    } else {
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

pub fn fill_rect(img: &mut RgbImage, top_left: Point, bottom_right: Point, color: Rgb<u8>) {
    if let Some((x0, y0, x1, y1)) = clip(img, top_left, bottom_right) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Fill with `color` at `alpha` (0 transparent, 255 opaque) over what is already there
pub fn blend_rect(
    img: &mut RgbImage,
    top_left: Point,
    bottom_right: Point,
    color: Rgb<u8>,
    alpha: u8,
) {
    if let Some((x0, y0, x1, y1)) = clip(img, top_left, bottom_right) {
        let a = u32::from(alpha);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let px = img.get_pixel_mut(x, y);
                for c in 0..3 {
                    let blended =
                        (u32::from(color[c]) * a + u32::from(px[c]) * (255 - a)) / 255;
                    px[c] = blended as u8;
                }
            }
        }
    }
}

/// Rectangle outline growing inwards by `width` pixels
pub fn outline_rect(
    img: &mut RgbImage,
    top_left: Point,
    bottom_right: Point,
    color: Rgb<u8>,
    width: i64,
) {
    let (x0, y0) = top_left;
    let (x1, y1) = bottom_right;
    let w = width.max(1) - 1;
    fill_rect(img, (x0, y0), (x1, y0 + w), color);
    fill_rect(img, (x0, y1 - w), (x1, y1), color);
    fill_rect(img, (x0, y0), (x0 + w, y1), color);
    fill_rect(img, (x1 - w, y0), (x1, y1), color);
}

/// Bresenham line stamped with a square pen of `width` pixels
pub fn draw_line(img: &mut RgbImage, from: Point, to: Point, color: Rgb<u8>, width: i64) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let half = (width.max(1) - 1) / 2;

    loop {
        if half == 0 {
            put(img, x, y, color);
        } else {
            fill_rect(img, (x - half, y - half), (x + half, y + half), color);
        }
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Filled ellipse inscribed in the bounding box
pub fn fill_ellipse(img: &mut RgbImage, top_left: Point, bottom_right: Point, color: Rgb<u8>) {
    let cx = (top_left.0 + bottom_right.0) as f64 / 2.0;
    let cy = (top_left.1 + bottom_right.1) as f64 / 2.0;
    let rx = ((bottom_right.0 - top_left.0) as f64 / 2.0).max(0.5);
    let ry = ((bottom_right.1 - top_left.1) as f64 / 2.0).max(0.5);

    if let Some((x0, y0, x1, y1)) = clip(img, top_left, bottom_right) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                let nx = (x as f64 - cx) / rx;
                let ny = (y as f64 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    img.put_pixel(x, y, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    #[test]
    fn test_fill_rect_clips() {
        let mut img = RgbImage::new(10, 10);
        fill_rect(&mut img, (-5, -5), (2, 2), RED);
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(2, 2), RED);
        assert_eq!(*img.get_pixel(3, 3), BLACK);

        // fully outside is a no-op
        fill_rect(&mut img, (20, 20), (30, 30), RED);
    }

    #[test]
    fn test_outline_leaves_interior() {
        let mut img = RgbImage::new(20, 20);
        outline_rect(&mut img, (2, 2), (17, 17), RED, 2);
        assert_eq!(*img.get_pixel(2, 10), RED);
        assert_eq!(*img.get_pixel(3, 10), RED);
        assert_eq!(*img.get_pixel(4, 10), BLACK);
        assert_eq!(*img.get_pixel(10, 10), BLACK);
        assert_eq!(*img.get_pixel(17, 17), RED);
    }

    #[test]
    fn test_line_endpoints() {
        let mut img = RgbImage::new(20, 20);
        draw_line(&mut img, (1, 1), (15, 8), RED, 1);
        assert_eq!(*img.get_pixel(1, 1), RED);
        assert_eq!(*img.get_pixel(15, 8), RED);
    }

    #[test]
    fn test_ellipse_center_and_corner() {
        let mut img = RgbImage::new(20, 20);
        fill_ellipse(&mut img, (0, 0), (10, 10), RED);
        assert_eq!(*img.get_pixel(5, 5), RED);
        assert_eq!(*img.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn test_blend_half() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([200, 200, 200]));
        blend_rect(&mut img, (0, 0), (3, 3), BLACK, 128);
        let px = img.get_pixel(1, 1);
        assert!(px[0] > 90 && px[0] < 110);
    }
}
