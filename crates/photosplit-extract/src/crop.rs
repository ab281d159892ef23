use photosplit_core::{to_luma, PixelRect, RgbImage, RgbImageView};

/// Axis-aligned crop of the candidate box plus proportional padding,
/// clamped to the source bounds. Returns `None` for a zero-size
/// result.
pub(crate) fn padded_crop(
    src: &RgbImageView<'_>,
    rect: &PixelRect,
    padding_frac: f32,
    min_padding: u32,
) -> Option<RgbImage> {
    if rect.width == 0 || rect.height == 0 {
        return None;
    }

    let pad = min_padding.max((rect.width.min(rect.height) as f32 * padding_frac) as u32);
    let x0 = rect.x.saturating_sub(pad) as usize;
    let y0 = rect.y.saturating_sub(pad) as usize;
    let x1 = ((rect.right() + pad) as usize).min(src.width);
    let y1 = ((rect.bottom() + pad) as usize).min(src.height);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    let w = x1 - x0;
    let h = y1 - y0;
    let mut data = Vec::with_capacity(w * h * 3);
    for y in y0..y1 {
        let row = (y * src.width + x0) * 3;
        data.extend_from_slice(&src.data[row..row + w * 3]);
    }
    RgbImage::from_raw(w, h, data)
}

/// Light edge-preserving smoothing plus a small border trim to remove
/// scan-edge artifacts. Images too small to trim are only smoothed.
pub(crate) fn refine_edges(img: &RgbImage, trim: u32) -> RgbImage {
    let smoothed = bilateral_smooth_rgb(img, 4, 75.0, 75.0);
    let t = trim as usize;
    if img.width > 2 * t && img.height > 2 * t && t > 0 {
        let w = img.width - 2 * t;
        let h = img.height - 2 * t;
        let mut data = Vec::with_capacity(w * h * 3);
        for y in t..img.height - t {
            let row = (y * img.width + t) * 3;
            data.extend_from_slice(&smoothed.data[row..row + w * 3]);
        }
        RgbImage {
            width: w,
            height: h,
            data,
        }
    } else {
        smoothed
    }
}

/// Luminance-guided bilateral filter applied to all three channels.
fn bilateral_smooth_rgb(img: &RgbImage, radius: usize, sigma_color: f32, sigma_space: f32) -> RgbImage {
    let w = img.width;
    let h = img.height;
    let r = radius as i32;
    let luma = to_luma(&img.as_view());

    let side = 2 * radius + 1;
    let mut spatial = vec![0.0f32; side * side];
    let denom_s = 2.0 * sigma_space * sigma_space;
    for dy in -r..=r {
        for dx in -r..=r {
            let d2 = (dx * dx + dy * dy) as f32;
            spatial[((dy + r) as usize) * side + (dx + r) as usize] = (-d2 / denom_s).exp();
        }
    }
    let denom_c = 2.0 * sigma_color * sigma_color;
    let mut range = [0.0f32; 256];
    for (d, slot) in range.iter_mut().enumerate() {
        *slot = (-((d * d) as f32) / denom_c).exp();
    }

    let mut out = RgbImage::filled(w, h, [0, 0, 0]);
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let center = luma.data[y as usize * w + x as usize];
            let mut acc = [0.0f32; 3];
            let mut weight = 0.0f32;
            for dy in -r..=r {
                for dx in -r..=r {
                    let nx = (x + dx).clamp(0, w as i32 - 1) as usize;
                    let ny = (y + dy).clamp(0, h as i32 - 1) as usize;
                    let diff = (luma.data[ny * w + nx] as i32 - center as i32).unsigned_abs() as usize;
                    let k = spatial[((dy + r) as usize) * side + (dx + r) as usize] * range[diff];
                    let src = (ny * w + nx) * 3;
                    acc[0] += k * img.data[src] as f32;
                    acc[1] += k * img.data[src + 1] as f32;
                    acc[2] += k * img.data[src + 2] as f32;
                    weight += k;
                }
            }
            let dst = (y as usize * w + x as usize) * 3;
            for c in 0..3 {
                out.data[dst + c] = (acc[c] / weight).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_pads_and_clamps_to_bounds() {
        let src = RgbImage::filled(100, 80, [50, 50, 50]);
        let rect = PixelRect::new(2, 2, 60, 40);
        // padding = max(5, 0.02*40) = 5; x0 clamps to 0
        let out = padded_crop(&src.as_view(), &rect, 0.02, 5).expect("crop");
        assert_eq!((out.width, out.height), (67, 47));
    }

    #[test]
    fn zero_rect_yields_none() {
        let src = RgbImage::filled(10, 10, [0, 0, 0]);
        assert!(padded_crop(&src.as_view(), &PixelRect::new(2, 2, 0, 5), 0.02, 5).is_none());
    }

    #[test]
    fn refine_trims_the_border() {
        let img = RgbImage::filled(40, 30, [90, 90, 90]);
        let out = refine_edges(&img, 2);
        assert_eq!((out.width, out.height), (36, 26));
        assert!(out.data.iter().all(|&v| (v as i32 - 90).abs() <= 1));
    }

    #[test]
    fn refine_skips_trim_on_tiny_images() {
        let img = RgbImage::filled(3, 3, [90, 90, 90]);
        let out = refine_edges(&img, 2);
        assert_eq!((out.width, out.height), (3, 3));
    }
}
