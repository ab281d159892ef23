use nalgebra::Point2;
use photosplit_core::{homography_from_4pt, to_luma, warp_perspective_rgb, RgbImage, RgbImageView};

use crate::extractor::ExtractorParams;
use crate::order::order_corners;

/// White border fill: off-by-a-little corner fits blend into paper
/// rather than black.
const FILL: [u8; 3] = [255, 255, 255];

/// Perspective-correct a quadrilateral region into an axis-aligned
/// rectangle.
///
/// Returns `None` when the implied destination rectangle is
/// implausible (degenerate, huge, absurd aspect ratio) or when the
/// warped result fails the mean-intensity sanity check; the caller
/// then falls back to an axis-aligned crop.
pub(crate) fn perspective_extract(
    src: &RgbImageView<'_>,
    corners: &[Point2<f32>; 4],
    params: &ExtractorParams,
) -> Option<RgbImage> {
    let [tl, tr, br, bl] = order_corners(corners);

    let width_top = (tr - tl).norm();
    let width_bottom = (br - bl).norm();
    let out_w = width_top.max(width_bottom).round() as u32;

    let height_left = (bl - tl).norm();
    let height_right = (br - tr).norm();
    let out_h = height_left.max(height_right).round() as u32;

    if out_w < params.warp_min_dim || out_h < params.warp_min_dim {
        return None;
    }
    if out_w > params.warp_max_dim || out_h > params.warp_max_dim {
        return None;
    }
    let aspect = out_w as f32 / out_h as f32;
    if aspect < params.warp_min_aspect || aspect > params.warp_max_aspect {
        return None;
    }

    let dst = [
        Point2::new(0.0f32, 0.0),
        Point2::new(out_w as f32 - 1.0, 0.0),
        Point2::new(out_w as f32 - 1.0, out_h as f32 - 1.0),
        Point2::new(0.0f32, out_h as f32 - 1.0),
    ];
    let h_img_from_rect = homography_from_4pt(&dst, &[tl, tr, br, bl])?;
    let warped = warp_perspective_rgb(src, h_img_from_rect, out_w as usize, out_h as usize, FILL);

    // a mathematically valid but visually wrong warp lands in
    // near-black or near-white territory
    let mean = mean_intensity(&warped);
    if mean < params.warp_mean_min || mean > params.warp_mean_max {
        log::debug!("rejecting warp with mean intensity {mean:.1}");
        return None;
    }

    Some(warped)
}

fn mean_intensity(img: &RgbImage) -> f32 {
    let luma = to_luma(&img.as_view());
    if luma.data.is_empty() {
        return 0.0;
    }
    let sum: u64 = luma.data.iter().map(|&v| v as u64).sum();
    sum as f32 / luma.data.len() as f32
}
