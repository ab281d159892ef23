//! Edge-map construction.
//!
//! Two independent estimators feed the combined map: a hysteresis
//! gradient detector whose thresholds adapt to the image median, and a
//! fixed-threshold normalized Sobel magnitude. Their union is closed
//! and dilated to bridge broken contour segments.

use photosplit_core::{GrayImage, GrayImageView};

use crate::morphology::{close, dilate};

/// 3x3 Sobel gradients with edge-clamped taps.
fn sobel_gradients(src: &GrayImageView<'_>) -> (Vec<f32>, Vec<f32>) {
    let w = src.width;
    let h = src.height;
    let mut gx = vec![0.0f32; w * h];
    let mut gy = vec![0.0f32; w * h];

    let at = |x: i32, y: i32| -> f32 {
        let cx = x.clamp(0, w as i32 - 1) as usize;
        let cy = y.clamp(0, h as i32 - 1) as usize;
        src.data[cy * w + cx] as f32
    };

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let p00 = at(x - 1, y - 1);
            let p10 = at(x, y - 1);
            let p20 = at(x + 1, y - 1);
            let p01 = at(x - 1, y);
            let p21 = at(x + 1, y);
            let p02 = at(x - 1, y + 1);
            let p12 = at(x, y + 1);
            let p22 = at(x + 1, y + 1);

            let idx = y as usize * w + x as usize;
            gx[idx] = (p20 + 2.0 * p21 + p22) - (p00 + 2.0 * p01 + p02);
            gy[idx] = (p02 + 2.0 * p12 + p22) - (p00 + 2.0 * p10 + p20);
        }
    }
    (gx, gy)
}

pub fn sobel_magnitude(src: &GrayImageView<'_>) -> Vec<f32> {
    let (gx, gy) = sobel_gradients(src);
    gx.iter()
        .zip(&gy)
        .map(|(x, y)| (x * x + y * y).sqrt())
        .collect()
}

/// Hysteresis edge detector: Sobel gradients, direction-quantized
/// non-maximum suppression, double threshold, then 8-connected
/// propagation from strong pixels through weak ones.
///
/// Zero-gradient pixels never qualify, so flat input yields an empty
/// map regardless of the thresholds.
pub fn canny(src: &GrayImageView<'_>, low: f32, high: f32) -> GrayImage {
    let w = src.width;
    let h = src.height;
    let mut out = GrayImage::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }

    let (gx, gy) = sobel_gradients(src);
    let mag: Vec<f32> = gx
        .iter()
        .zip(&gy)
        .map(|(x, y)| (x * x + y * y).sqrt())
        .collect();

    // non-maximum suppression along the quantized gradient direction
    let mut thin = vec![0.0f32; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            let m = mag[idx];
            if m <= 0.0 {
                continue;
            }
            let angle = gy[idx].atan2(gx[idx]).to_degrees();
            let angle = if angle < 0.0 { angle + 180.0 } else { angle };
            let (n1, n2) = if !(22.5..157.5).contains(&angle) {
                (mag[idx - 1], mag[idx + 1])
            } else if angle < 67.5 {
                (mag[idx - w + 1], mag[idx + w - 1])
            } else if angle < 112.5 {
                (mag[idx - w], mag[idx + w])
            } else {
                (mag[idx - w - 1], mag[idx + w + 1])
            };
            if m >= n1 && m >= n2 {
                thin[idx] = m;
            }
        }
    }

    // double threshold + hysteresis
    const STRONG: u8 = 255;
    const WEAK: u8 = 1;
    let mut marks = vec![0u8; w * h];
    let mut stack: Vec<usize> = Vec::new();
    for (idx, &m) in thin.iter().enumerate() {
        if m <= 0.0 {
            continue;
        }
        if m >= high {
            marks[idx] = STRONG;
            stack.push(idx);
        } else if m >= low {
            marks[idx] = WEAK;
        }
    }

    while let Some(idx) = stack.pop() {
        out.data[idx] = 255;
        let x = (idx % w) as i32;
        let y = (idx / w) as i32;
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
                if marks[nidx] == WEAK {
                    marks[nidx] = STRONG;
                    stack.push(nidx);
                }
            }
        }
    }
    out
}

/// Median intensity via histogram.
fn median_intensity(src: &GrayImageView<'_>) -> u8 {
    if src.data.is_empty() {
        return 0;
    }
    let mut hist = [0u32; 256];
    for &v in src.data {
        hist[v as usize] += 1;
    }
    let half = (src.data.len() as u32).div_ceil(2);
    let mut cum = 0u32;
    for (v, &count) in hist.iter().enumerate() {
        cum += count;
        if cum >= half {
            return v as u8;
        }
    }
    255
}

/// Hysteresis detector with data-adaptive thresholds at median ± 33 %.
pub fn adaptive_canny(src: &GrayImageView<'_>) -> GrayImage {
    const SIGMA: f32 = 0.33;
    let median = median_intensity(src) as f32;
    let low = ((1.0 - SIGMA) * median).max(0.0);
    let high = ((1.0 + SIGMA) * median).min(255.0);
    canny(src, low, high)
}

/// Normalized Sobel magnitude binarized at `thresh` (of 255).
pub fn sobel_edges(src: &GrayImageView<'_>, thresh: u8) -> GrayImage {
    let mag = sobel_magnitude(src);
    let max = mag.iter().cloned().fold(0.0f32, f32::max);
    let mut out = GrayImage::new(src.width, src.height);
    if max <= f32::EPSILON {
        return out;
    }
    for (o, &m) in out.data.iter_mut().zip(&mag) {
        if m / max * 255.0 > thresh as f32 {
            *o = 255;
        }
    }
    out
}

pub fn bitwise_or(a: &GrayImageView<'_>, b: &GrayImageView<'_>) -> GrayImage {
    let data = a
        .data
        .iter()
        .zip(b.data)
        .map(|(&x, &y)| if x != 0 || y != 0 { 255 } else { 0 })
        .collect();
    GrayImage {
        width: a.width,
        height: a.height,
        data,
    }
}

/// Union of both edge estimators, closed 5x5 and dilated 3x3 twice to
/// bridge broken contour segments.
pub fn combined_edge_map(src: &GrayImageView<'_>) -> GrayImage {
    let hysteresis = adaptive_canny(src);
    let magnitude = sobel_edges(src, 50);
    let combined = bitwise_or(&hysteresis.as_view(), &magnitude.as_view());
    let closed = close(&combined.as_view(), 5, 5, 1);
    dilate(&closed.as_view(), 3, 3, 2)
}

/// Gaussian-weighted local mean threshold: a pixel becomes foreground
/// when it exceeds its `block`-sized weighted neighborhood mean minus
/// `c`. Recovers structure invisible to a global threshold.
pub fn adaptive_threshold_gaussian(src: &GrayImageView<'_>, block: usize, c: f32) -> GrayImage {
    let w = src.width;
    let h = src.height;
    let block = block.max(3) | 1; // odd
    let radius = block / 2;
    let sigma = 0.3 * ((block as f32 - 1.0) * 0.5 - 1.0) + 0.8;

    let mut kernel = Vec::with_capacity(block);
    let denom = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;
    for i in 0..block {
        let d = i as f32 - radius as f32;
        let v = (-d * d / denom).exp();
        kernel.push(v);
        sum += v;
    }
    for v in &mut kernel {
        *v /= sum;
    }

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

    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut mean = 0.0f32;
            for (i, &k) in kernel.iter().enumerate() {
                let sy = (y as i32 + i as i32 - radius as i32).clamp(0, h as i32 - 1) as usize;
                mean += k * tmp[sy * w + x];
            }
            let idx = y * w + x;
            if src.data[idx] as f32 > mean - c {
                out.data[idx] = 255;
            }
        }
    }
    out
}
