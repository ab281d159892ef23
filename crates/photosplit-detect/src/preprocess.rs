//! Scan-artifact compensation: glare inpainting, shadow lifting,
//! illumination flattening, adaptive equalization and edge-preserving
//! denoise.
//!
//! Every operation is a pure function over the core buffer types and
//! is deterministic for identical input pixels. Degenerate inputs
//! (all-black, all-white) pass through without panicking; they simply
//! produce flat outputs that yield empty edge maps downstream.

use photosplit_core::{to_luma, GrayImage, GrayImageView, RgbImageView};

use crate::edges::combined_edge_map;
use crate::morphology::dilate;
use crate::threshold::threshold_binary;

/// Separable Gaussian blur with edge-clamped taps.
pub fn gaussian_blur(src: &GrayImageView<'_>, sigma: f32) -> GrayImage {
    let w = src.width;
    let h = src.height;
    if sigma <= 0.0 || w == 0 || h == 0 {
        return GrayImage {
            width: w,
            height: h,
            data: src.data.to_vec(),
        };
    }

    let radius = ((3.0 * sigma).ceil() as usize).clamp(1, 64);
    let mut kernel = Vec::with_capacity(2 * radius + 1);
    let denom = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;
    for i in 0..=2 * radius {
        let d = i as f32 - radius as f32;
        let v = (-d * d / denom).exp();
        kernel.push(v);
        sum += v;
    }
    for v in &mut kernel {
        *v /= sum;
    }

    // horizontal pass
    let mut tmp = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (i, &k) in kernel.iter().enumerate() {
                let sx = (x as i32 + i as i32 - radius as i32).clamp(0, w as i32 - 1) as usize;
                acc += k * src.data[y * w + sx] as f32;
            }
            tmp[y * w + x] = acc;
        }
    }

    // vertical pass
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (i, &k) in kernel.iter().enumerate() {
                let sy = (y as i32 + i as i32 - radius as i32).clamp(0, h as i32 - 1) as usize;
                acc += k * tmp[sy * w + x];
            }
            out.data[y * w + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Flatten broad illumination gradients by dividing the image by a
/// heavily blurred copy of itself, rescaled into the u8 range.
pub fn normalize_illumination(src: &GrayImageView<'_>, sigma: f32) -> GrayImage {
    let blur = gaussian_blur(src, sigma);
    let mut out = GrayImage::new(src.width, src.height);
    for (i, v) in out.data.iter_mut().enumerate() {
        let b = blur.data[i].max(1) as f32;
        *v = (src.data[i] as f32 / b * 255.0).clamp(0.0, 255.0) as u8;
    }
    out
}

/// Lift shadowed regions using the luminance channel's local
/// illumination pattern.
///
/// The illumination estimate is a large-sigma blur of the color
/// image's luminance. Pixels whose estimate falls below the image mean
/// are multiplied by a bounded gain, so shadows brighten
/// proportionally while true blacks (value 0) stay black.
pub fn remove_shadows(color: &RgbImageView<'_>, gray: &GrayImageView<'_>) -> GrayImage {
    let luma = to_luma(color);
    let illum = gaussian_blur(&luma.as_view(), 20.0);

    let total: u64 = illum.data.iter().map(|&v| v as u64).sum();
    let count = illum.data.len().max(1) as u64;
    let mean = total as f32 / count as f32;

    let mut out = GrayImage::new(gray.width, gray.height);
    for (i, v) in out.data.iter_mut().enumerate() {
        let e = illum.data[i] as f32;
        *v = if e < mean {
            let gain = (mean / e.max(8.0)).min(2.0);
            (gray.data[i] as f32 * gain).clamp(0.0, 255.0) as u8
        } else {
            gray.data[i]
        };
    }
    out
}

/// Detect near-saturated glare pixels, dilate the mask and fill the
/// masked pixels from their known neighborhood (hole-filling
/// interpolation, not a blur).
pub fn reduce_glare(src: &GrayImageView<'_>) -> GrayImage {
    let mask = threshold_binary(src, 240);
    let mask = dilate(&mask.as_view(), 3, 3, 2);
    inpaint(src, &mask)
}

/// Onion-peel inpainting: each sweep fills every masked pixel that has
/// at least one known 8-neighbor with the mean of its known neighbors.
/// Sweeps are computed against the previous state, so fill order does
/// not depend on scan direction. A fully masked image has no seed and
/// is returned unchanged.
fn inpaint(src: &GrayImageView<'_>, mask: &GrayImage) -> GrayImage {
    let w = src.width;
    let h = src.height;
    let mut out = GrayImage {
        width: w,
        height: h,
        data: src.data.to_vec(),
    };
    let mut unknown: Vec<bool> = mask.data.iter().map(|&m| m != 0).collect();
    let mut remaining = unknown.iter().filter(|&&u| u).count();

    while remaining > 0 {
        let mut updates: Vec<(usize, u8)> = Vec::new();
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let idx = y as usize * w + x as usize;
                if !unknown[idx] {
                    continue;
                }
                let mut sum = 0u32;
                let mut cnt = 0u32;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x + dx;
                        let ny = y + dy;
                        if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                            continue;
                        }
                        let nidx = ny as usize * w + nx as usize;
                        if !unknown[nidx] {
                            sum += out.data[nidx] as u32;
                            cnt += 1;
                        }
                    }
                }
                if cnt > 0 {
                    updates.push((idx, (sum / cnt) as u8));
                }
            }
        }
        if updates.is_empty() {
            break;
        }
        for &(idx, v) in &updates {
            out.data[idx] = v;
            unknown[idx] = false;
        }
        remaining -= updates.len();
    }
    out
}

/// Contrast-limited adaptive histogram equalization.
///
/// Per-tile histograms are clipped at `clip_limit` times the uniform
/// bin height, the excess is redistributed, and each pixel blends the
/// CDF lookup tables of its four nearest tile centers bilinearly.
pub fn equalize_adaptive(src: &GrayImageView<'_>, clip_limit: f32, tiles: usize) -> GrayImage {
    let w = src.width;
    let h = src.height;
    if w == 0 || h == 0 {
        return GrayImage::new(w, h);
    }
    let tiles = tiles.max(1);
    let tile_w = w.div_ceil(tiles).max(1);
    let tile_h = h.div_ceil(tiles).max(1);
    let tiles_x = w.div_ceil(tile_w);
    let tiles_y = h.div_ceil(tile_h);

    let mut luts: Vec<[u8; 256]> = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(w);
            let y1 = (y0 + tile_h).min(h);

            let mut hist = [0.0f32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[src.data[y * w + x] as usize] += 1.0;
                }
            }
            let n = ((x1 - x0) * (y1 - y0)).max(1) as f32;
            let clip = (clip_limit * n / 256.0).max(1.0);

            // clip and redistribute the excess uniformly; float bins so
            // no histogram mass is lost to integer division
            let mut excess = 0.0f32;
            for b in hist.iter_mut() {
                if *b > clip {
                    excess += *b - clip;
                    *b = clip;
                }
            }
            let bonus = excess / 256.0;
            for b in hist.iter_mut() {
                *b += bonus;
            }

            let mut lut = [0u8; 256];
            let mut cdf = 0.0f32;
            for (v, slot) in lut.iter_mut().enumerate() {
                cdf += hist[v];
                *slot = (cdf * 255.0 / n).round().clamp(0.0, 255.0) as u8;
            }
            luts.push(lut);
        }
    }

    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            // position in tile-center space
            let fx = (x as f32 + 0.5) / tile_w as f32 - 0.5;
            let fy = (y as f32 + 0.5) / tile_h as f32 - 0.5;
            let tx0 = (fx.floor() as i32).clamp(0, tiles_x as i32 - 1) as usize;
            let ty0 = (fy.floor() as i32).clamp(0, tiles_y as i32 - 1) as usize;
            let tx1 = (tx0 + 1).min(tiles_x - 1);
            let ty1 = (ty0 + 1).min(tiles_y - 1);
            let ax = (fx - fx.floor()).clamp(0.0, 1.0);
            let ay = (fy - fy.floor()).clamp(0.0, 1.0);
            let ax = if fx < 0.0 { 0.0 } else { ax };
            let ay = if fy < 0.0 { 0.0 } else { ay };

            let v = src.data[y * w + x] as usize;
            let p00 = luts[ty0 * tiles_x + tx0][v] as f32;
            let p10 = luts[ty0 * tiles_x + tx1][v] as f32;
            let p01 = luts[ty1 * tiles_x + tx0][v] as f32;
            let p11 = luts[ty1 * tiles_x + tx1][v] as f32;
            let a = p00 + ax * (p10 - p00);
            let b = p01 + ax * (p11 - p01);
            out.data[y * w + x] = (a + ay * (b - a)).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Edge-preserving denoise: range-weighted Gaussian in a
/// `(2*radius+1)²` window.
pub fn bilateral_filter(
    src: &GrayImageView<'_>,
    radius: usize,
    sigma_color: f32,
    sigma_space: f32,
) -> GrayImage {
    let w = src.width;
    let h = src.height;
    let r = radius as i32;

    let mut spatial = vec![0.0f32; (2 * radius + 1) * (2 * radius + 1)];
    let denom_s = 2.0 * sigma_space * sigma_space;
    for dy in -r..=r {
        for dx in -r..=r {
            let d2 = (dx * dx + dy * dy) as f32;
            spatial[((dy + r) as usize) * (2 * radius + 1) + (dx + r) as usize] =
                (-d2 / denom_s).exp();
        }
    }
    let denom_c = 2.0 * sigma_color * sigma_color;
    let mut range = [0.0f32; 256];
    for (d, slot) in range.iter_mut().enumerate() {
        *slot = (-((d * d) as f32) / denom_c).exp();
    }

    let mut out = GrayImage::new(w, h);
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let center = src.data[y as usize * w + x as usize];
            let mut acc = 0.0f32;
            let mut weight = 0.0f32;
            for dy in -r..=r {
                for dx in -r..=r {
                    let nx = (x + dx).clamp(0, w as i32 - 1);
                    let ny = (y + dy).clamp(0, h as i32 - 1);
                    let v = src.data[ny as usize * w + nx as usize];
                    let diff = (v as i32 - center as i32).unsigned_abs() as usize;
                    let k = spatial[((dy + r) as usize) * (2 * radius + 1) + (dx + r) as usize]
                        * range[diff];
                    acc += k * v as f32;
                    weight += k;
                }
            }
            out.data[y as usize * w + x as usize] = (acc / weight).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// The full preprocessing chain feeding contour extraction: glare
/// inpainting on the raw luminance, shadow lifting, illumination
/// flattening, CLAHE, bilateral denoise, then the combined edge map.
pub fn preprocess_for_edges(color: &RgbImageView<'_>) -> GrayImage {
    let gray = to_luma(color);
    let deglared = reduce_glare(&gray.as_view());
    let lifted = remove_shadows(color, &deglared.as_view());
    let flattened = normalize_illumination(&lifted.as_view(), 15.0);
    let equalized = equalize_adaptive(&flattened.as_view(), 3.0, 8);
    let smoothed = bilateral_filter(&equalized.as_view(), 4, 75.0, 75.0);
    combined_edge_map(&smoothed.as_view())
}

#[cfg(test)]
mod tests {
    use super::*;
    use photosplit_core::RgbImage;

    #[test]
    fn gaussian_blur_preserves_flat_images() {
        let img = GrayImage::filled(16, 16, 90);
        let out = gaussian_blur(&img.as_view(), 3.0);
        assert!(out.data.iter().all(|&v| (v as i32 - 90).abs() <= 1));
    }

    #[test]
    fn gaussian_blur_smooths_an_impulse() {
        let mut img = GrayImage::new(15, 15);
        img.data[7 * 15 + 7] = 255;
        let out = gaussian_blur(&img.as_view(), 2.0);
        assert!(out.data[7 * 15 + 7] < 255);
        assert!(out.data[7 * 15 + 8] > 0);
    }

    #[test]
    fn normalize_illumination_flattens_a_gradient() {
        let mut img = GrayImage::new(64, 16);
        for y in 0..16 {
            for x in 0..64 {
                img.data[y * 64 + x] = (60 + x * 3).min(250) as u8;
            }
        }
        let out = normalize_illumination(&img.as_view(), 10.0);
        let left = out.data[8 * 64 + 4] as i32;
        let right = out.data[8 * 64 + 59] as i32;
        let orig_span = (img.data[8 * 64 + 59] as i32 - img.data[8 * 64 + 4] as i32).abs();
        assert!(
            (left - right).abs() < orig_span,
            "gradient not reduced: {left} vs {right}"
        );
    }

    #[test]
    fn remove_shadows_keeps_black_black() {
        let mut color = RgbImage::filled(32, 32, [180, 180, 180]);
        // darken the right half to simulate a shadow
        for y in 0..32 {
            for x in 16..32 {
                let i = (y * 32 + x) * 3;
                color.data[i] = 70;
                color.data[i + 1] = 70;
                color.data[i + 2] = 70;
            }
        }
        let gray = to_luma(&color.as_view());
        let out = remove_shadows(&color.as_view(), &gray.as_view());
        // shadowed side lifted
        assert!(out.data[16 * 32 + 28] > gray.data[16 * 32 + 28]);
        // multiplicative gain leaves zero at zero
        let black = RgbImage::filled(16, 16, [0, 0, 0]);
        let bg = to_luma(&black.as_view());
        let bout = remove_shadows(&black.as_view(), &bg.as_view());
        assert!(bout.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn reduce_glare_fills_a_bright_spot() {
        let mut img = GrayImage::filled(21, 21, 100);
        for y in 8..13 {
            for x in 8..13 {
                img.data[y * 21 + x] = 255;
            }
        }
        let out = reduce_glare(&img.as_view());
        assert!(out.data[10 * 21 + 10] < 200, "glare core not filled");
    }

    #[test]
    fn reduce_glare_tolerates_all_white() {
        let img = GrayImage::filled(16, 16, 255);
        let out = reduce_glare(&img.as_view());
        assert_eq!(out.data.len(), 256);
    }

    #[test]
    fn clahe_stretches_low_contrast() {
        let mut img = GrayImage::new(64, 64);
        for y in 0..64 {
            for x in 0..64 {
                img.data[y * 64 + x] = if (x / 8 + y / 8) % 2 == 0 { 118 } else { 138 };
            }
        }
        let out = equalize_adaptive(&img.as_view(), 4.0, 4);
        let min = *out.data.iter().min().unwrap() as i32;
        let max = *out.data.iter().max().unwrap() as i32;
        assert!(max - min > 20, "contrast not expanded: {min}..{max}");
    }

    #[test]
    fn bilateral_keeps_a_step_edge() {
        let mut img = GrayImage::new(20, 10);
        for y in 0..10 {
            for x in 10..20 {
                img.data[y * 20 + x] = 200;
            }
        }
        let out = bilateral_filter(&img.as_view(), 4, 75.0, 75.0);
        let left = out.data[5 * 20 + 8] as i32;
        let right = out.data[5 * 20 + 11] as i32;
        assert!(right - left > 120, "edge washed out: {left} vs {right}");
    }
}
