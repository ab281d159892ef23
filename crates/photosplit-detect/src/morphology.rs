//! Binary morphology with rectangular structuring elements.
//!
//! Operates on 0/255 binary maps. Pixels outside the image count as
//! background, so erosion eats one kernel radius off the outer border.

use photosplit_core::{GrayImage, GrayImageView};

fn window_any(src: &GrayImageView<'_>, x: i32, y: i32, rx: i32, ry: i32) -> bool {
    for dy in -ry..=ry {
        for dx in -rx..=rx {
            let nx = x + dx;
            let ny = y + dy;
            if nx < 0 || ny < 0 || nx >= src.width as i32 || ny >= src.height as i32 {
                continue;
            }
            if src.data[ny as usize * src.width + nx as usize] != 0 {
                return true;
            }
        }
    }
    false
}

fn window_all(src: &GrayImageView<'_>, x: i32, y: i32, rx: i32, ry: i32) -> bool {
    for dy in -ry..=ry {
        for dx in -rx..=rx {
            let nx = x + dx;
            let ny = y + dy;
            if nx < 0 || ny < 0 || nx >= src.width as i32 || ny >= src.height as i32 {
                return false;
            }
            if src.data[ny as usize * src.width + nx as usize] == 0 {
                return false;
            }
        }
    }
    true
}

fn pass(src: &GrayImageView<'_>, kw: usize, kh: usize, all: bool) -> GrayImage {
    let rx = (kw / 2) as i32;
    let ry = (kh / 2) as i32;
    let mut out = GrayImage::new(src.width, src.height);
    for y in 0..src.height {
        for x in 0..src.width {
            let hit = if all {
                window_all(src, x as i32, y as i32, rx, ry)
            } else {
                window_any(src, x as i32, y as i32, rx, ry)
            };
            out.data[y * src.width + x] = if hit { 255 } else { 0 };
        }
    }
    out
}

fn repeat(
    src: &GrayImageView<'_>,
    kw: usize,
    kh: usize,
    iterations: usize,
    all: bool,
) -> GrayImage {
    let mut out = pass(src, kw, kh, all);
    for _ in 1..iterations.max(1) {
        out = pass(&out.as_view(), kw, kh, all);
    }
    out
}

pub fn dilate(src: &GrayImageView<'_>, kw: usize, kh: usize, iterations: usize) -> GrayImage {
    repeat(src, kw, kh, iterations, false)
}

pub fn erode(src: &GrayImageView<'_>, kw: usize, kh: usize, iterations: usize) -> GrayImage {
    repeat(src, kw, kh, iterations, true)
}

/// Erode then dilate: removes speckle smaller than the kernel.
pub fn open(src: &GrayImageView<'_>, kw: usize, kh: usize, iterations: usize) -> GrayImage {
    let eroded = erode(src, kw, kh, iterations);
    dilate(&eroded.as_view(), kw, kh, iterations)
}

/// Dilate then erode: closes gaps smaller than the kernel.
pub fn close(src: &GrayImageView<'_>, kw: usize, kh: usize, iterations: usize) -> GrayImage {
    let dilated = dilate(src, kw, kh, iterations);
    erode(&dilated.as_view(), kw, kh, iterations)
}
