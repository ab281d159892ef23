//! Shared confidence scoring.
//!
//! All strategies score through the same weighted sum so their
//! candidates are comparable during consolidation: rectangularity
//! (0.3), aspect-ratio plausibility (0.25), corner-angle quality
//! (0.2), absolute size (0.15) and texture (0.1).

use nalgebra::Point2;
use photosplit_core::{GrayImageView, PixelRect};

/// Aspect ratios of common photographic formats.
const COMMON_RATIOS: [f32; 7] = [1.0, 4.0 / 3.0, 3.0 / 2.0, 16.0 / 9.0, 5.0 / 4.0, 0.75, 2.0 / 3.0];

/// Interior angle, in degrees, at each vertex of a quadrilateral.
pub fn corner_angles(corners: &[Point2<f32>; 4]) -> [f32; 4] {
    let mut angles = [0.0f32; 4];
    for i in 0..4 {
        let p1 = corners[(i + 3) % 4];
        let p2 = corners[i];
        let p3 = corners[(i + 1) % 4];
        let v1 = p1 - p2;
        let v2 = p3 - p2;
        let cos = (v1.x * v2.x + v1.y * v2.y) / (v1.norm() * v2.norm() + 1e-6);
        angles[i] = cos.clamp(-1.0, 1.0).acos().to_degrees();
    }
    angles
}

fn aspect_score(aspect: f32) -> f32 {
    let min_diff = COMMON_RATIOS
        .iter()
        .map(|r| (aspect - r).abs())
        .fold(f32::INFINITY, f32::min);
    (1.0 - min_diff * 2.0).max(0.0)
}

/// Grayscale variance over the candidate region, clamped to the image.
fn region_variance(gray: &GrayImageView<'_>, rect: &PixelRect) -> f64 {
    let x0 = (rect.x as usize).min(gray.width);
    let y0 = (rect.y as usize).min(gray.height);
    let x1 = (rect.right() as usize).min(gray.width);
    let y1 = (rect.bottom() as usize).min(gray.height);
    if x1 <= x0 || y1 <= y0 {
        return 0.0;
    }

    let n = ((x1 - x0) * (y1 - y0)) as f64;
    let mut sum = 0.0f64;
    for y in y0..y1 {
        for x in x0..x1 {
            sum += gray.data[y * gray.width + x] as f64;
        }
    }
    let mean = sum / n;
    let mut var = 0.0f64;
    for y in y0..y1 {
        for x in x0..x1 {
            let d = gray.data[y * gray.width + x] as f64 - mean;
            var += d * d;
        }
    }
    var / n
}

/// Texture plausibility: real photos have moderate pixel variance;
/// near-uniform or extremely noisy regions are penalized.
fn texture_score(gray: &GrayImageView<'_>, rect: &PixelRect) -> f32 {
    let variance = region_variance(gray, rect);
    if variance > 500.0 && variance < 5000.0 {
        1.0
    } else if (variance > 200.0 && variance < 500.0) || (variance > 5000.0 && variance < 8000.0) {
        0.5
    } else {
        0.2
    }
}

/// The shared confidence score in `[0, 1]`.
///
/// `region_area` is the area enclosed by the candidate's traced
/// boundary; `gray` is the full-resolution luminance of the source
/// image (texture is always judged at source resolution).
pub fn score_region(
    region_area: f32,
    rect: &PixelRect,
    corners: &[Point2<f32>; 4],
    gray: &GrayImageView<'_>,
) -> f32 {
    let bbox_area = rect.area() as f32;
    let mut confidence = 0.0f32;

    if bbox_area > 0.0 {
        confidence += (region_area / bbox_area).clamp(0.0, 1.0) * 0.3;
    }

    confidence += aspect_score(rect.aspect_ratio()) * 0.25;

    let angles = corner_angles(corners);
    let right_angles = angles.iter().filter(|a| (70.0..110.0).contains(*a)).count();
    confidence += right_angles as f32 / 4.0 * 0.2;

    if bbox_area > 5_000.0 && bbox_area < 800_000.0 {
        confidence += 0.15;
    } else if (bbox_area > 2_000.0 && bbox_area < 5_000.0)
        || (bbox_area > 800_000.0 && bbox_area < 1_500_000.0)
    {
        confidence += 0.08;
    }

    confidence += texture_score(gray, rect) * 0.1;

    confidence.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use photosplit_core::GrayImage;

    fn textured_gray(w: usize, h: usize) -> GrayImage {
        let mut img = GrayImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.data[y * w + x] = if (x / 10 + y / 10) % 2 == 0 { 90 } else { 170 };
            }
        }
        img
    }

    #[test]
    fn right_angles_on_an_axis_aligned_rect() {
        let corners = [
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 60.0),
            Point2::new(0.0, 60.0),
        ];
        for a in corner_angles(&corners) {
            assert!((a - 90.0).abs() < 0.5, "angle {a}");
        }
    }

    #[test]
    fn score_is_high_for_a_plausible_photo() {
        let gray = textured_gray(500, 400);
        let rect = PixelRect::new(50, 50, 400, 300);
        let corners = [
            Point2::new(50.0, 50.0),
            Point2::new(449.0, 50.0),
            Point2::new(449.0, 349.0),
            Point2::new(50.0, 349.0),
        ];
        let score = score_region(0.95 * rect.area() as f32, &rect, &corners, &gray.as_view());
        assert!(score > 0.8, "score {score}");
        assert!(score <= 1.0);
    }

    #[test]
    fn skewed_quads_and_odd_aspects_score_lower() {
        let gray = textured_gray(500, 400);
        let rect = PixelRect::new(50, 50, 390, 60); // sliver, aspect 6.5
        let corners = [
            Point2::new(50.0, 50.0),
            Point2::new(439.0, 80.0),
            Point2::new(300.0, 109.0),
            Point2::new(60.0, 70.0),
        ];
        let score = score_region(0.4 * rect.area() as f32, &rect, &corners, &gray.as_view());
        assert!(score < 0.6, "score {score}");
    }

    #[test]
    fn uniform_region_gets_texture_penalty() {
        let flat = GrayImage::filled(300, 300, 128);
        let textured = textured_gray(300, 300);
        let rect = PixelRect::new(10, 10, 200, 150);
        let corners = [
            Point2::new(10.0, 10.0),
            Point2::new(209.0, 10.0),
            Point2::new(209.0, 159.0),
            Point2::new(10.0, 159.0),
        ];
        let s_flat = score_region(rect.area() as f32, &rect, &corners, &flat.as_view());
        let s_tex = score_region(rect.area() as f32, &rect, &corners, &textured.as_view());
        assert!(s_tex > s_flat);
    }
}
