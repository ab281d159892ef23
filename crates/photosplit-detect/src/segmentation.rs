//! Distance transform and marker-based watershed flooding, used to
//! separate touching photos that a single contour would merge.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use photosplit_core::{GrayImage, GrayImageView};

use crate::edges::sobel_magnitude;

/// Chamfer 3-4 approximation of the L2 distance from each foreground
/// pixel to the nearest background pixel.
pub fn distance_transform(binary: &GrayImageView<'_>) -> Vec<f32> {
    let w = binary.width;
    let h = binary.height;
    const INF: u32 = u32::MAX / 2;
    let mut d: Vec<u32> = binary
        .data
        .iter()
        .map(|&v| if v != 0 { INF } else { 0 })
        .collect();

    // forward pass
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if d[idx] == 0 {
                continue;
            }
            let mut best = d[idx];
            if x > 0 {
                best = best.min(d[idx - 1] + 3);
            }
            if y > 0 {
                best = best.min(d[idx - w] + 3);
                if x > 0 {
                    best = best.min(d[idx - w - 1] + 4);
                }
                if x + 1 < w {
                    best = best.min(d[idx - w + 1] + 4);
                }
            }
            d[idx] = best;
        }
    }

    // backward pass
    for y in (0..h).rev() {
        for x in (0..w).rev() {
            let idx = y * w + x;
            if d[idx] == 0 {
                continue;
            }
            let mut best = d[idx];
            if x + 1 < w {
                best = best.min(d[idx + 1] + 3);
            }
            if y + 1 < h {
                best = best.min(d[idx + w] + 3);
                if x + 1 < w {
                    best = best.min(d[idx + w + 1] + 4);
                }
                if x > 0 {
                    best = best.min(d[idx + w - 1] + 4);
                }
            }
            d[idx] = best;
        }
    }

    d.into_iter().map(|v| v as f32 / 3.0).collect()
}

/// Label the 8-connected components of a binary map. Returns the label
/// map (0 = background, components start at `first_label`) and the
/// number of components found.
pub fn label_components(binary: &GrayImageView<'_>, first_label: i32) -> (Vec<i32>, usize) {
    let w = binary.width;
    let h = binary.height;
    let mut labels = vec![0i32; w * h];
    let mut next = first_label;

    for sy in 0..h {
        for sx in 0..w {
            let sidx = sy * w + sx;
            if binary.data[sidx] == 0 || labels[sidx] != 0 {
                continue;
            }
            let mut stack = vec![(sx as i32, sy as i32)];
            labels[sidx] = next;
            while let Some((x, y)) = stack.pop() {
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x + dx;
                        let ny = y + dy;
                        if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                            continue;
                        }
                        let nidx = ny as usize * w + nx as usize;
                        if binary.data[nidx] != 0 && labels[nidx] == 0 {
                            labels[nidx] = next;
                            stack.push((nx, ny));
                        }
                    }
                }
            }
            next += 1;
        }
    }
    (labels, (next - first_label) as usize)
}

/// Meyer's flooding watershed over the gradient magnitude of `gray`.
///
/// `markers` holds the initial seeds (positive labels) and zeros for
/// the unknown region; on return every reachable zero pixel carries
/// either a basin label or `-1` where two basins meet. Equal gradient
/// levels flood in first-pushed order (a deterministic sequence
/// counter), so basins grow breadth-first on flat terrain and repeated
/// runs produce identical label maps.
pub fn watershed(gray: &GrayImageView<'_>, markers: &mut [i32]) {
    let w = gray.width;
    let h = gray.height;
    debug_assert_eq!(markers.len(), w * h);

    let grad = sobel_magnitude(gray);
    let max = grad.iter().cloned().fold(0.0f32, f32::max).max(1.0);
    let level: Vec<u8> = grad.iter().map(|&g| (g / max * 255.0) as u8).collect();

    const NEIGHBORS: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

    let mut heap: BinaryHeap<Reverse<(u8, u64, usize, usize)>> = BinaryHeap::new();
    let mut seq = 0u64;
    let push = |heap: &mut BinaryHeap<Reverse<(u8, u64, usize, usize)>>,
                    seq: &mut u64,
                    x: usize,
                    y: usize| {
        heap.push(Reverse((level[y * w + x], *seq, y, x)));
        *seq += 1;
    };

    for y in 0..h {
        for x in 0..w {
            if markers[y * w + x] <= 0 {
                continue;
            }
            for (dx, dy) in NEIGHBORS {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                    continue;
                }
                let nidx = ny as usize * w + nx as usize;
                if markers[nidx] == 0 {
                    push(&mut heap, &mut seq, nx as usize, ny as usize);
                }
            }
        }
    }

    while let Some(Reverse((_, _, y, x))) = heap.pop() {
        let idx = y * w + x;
        if markers[idx] != 0 {
            continue;
        }

        let mut label = 0i32;
        let mut ridge = false;
        for (dx, dy) in NEIGHBORS {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                continue;
            }
            let n = markers[ny as usize * w + nx as usize];
            if n > 0 {
                if label == 0 {
                    label = n;
                } else if label != n {
                    ridge = true;
                }
            }
        }

        if ridge {
            markers[idx] = -1;
            continue;
        }
        if label == 0 {
            // orphaned by surrounding ridges
            continue;
        }
        markers[idx] = label;

        for (dx, dy) in NEIGHBORS {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                continue;
            }
            let nidx = ny as usize * w + nx as usize;
            if markers[nidx] == 0 {
                push(&mut heap, &mut seq, nx as usize, ny as usize);
            }
        }
    }
}

/// Binary mask of one watershed label.
pub fn label_mask(markers: &[i32], label: i32, width: usize, height: usize) -> GrayImage {
    let data = markers
        .iter()
        .map(|&m| if m == label { 255 } else { 0 })
        .collect();
    GrayImage {
        width,
        height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photosplit_core::GrayImage;

    #[test]
    fn distance_peaks_at_the_blob_center() {
        let mut img = GrayImage::new(21, 21);
        for y in 5..16 {
            for x in 5..16 {
                img.data[y * 21 + x] = 255;
            }
        }
        let d = distance_transform(&img.as_view());
        let center = d[10 * 21 + 10];
        let edge = d[5 * 21 + 10];
        assert!(center > edge, "center {center} edge {edge}");
        assert!(center >= 5.0, "center {center}");
        assert_eq!(d[0], 0.0);
    }

    #[test]
    fn labels_two_separate_blobs() {
        let mut img = GrayImage::new(20, 10);
        img.data[2 * 20 + 2] = 255;
        img.data[2 * 20 + 3] = 255;
        img.data[7 * 20 + 15] = 255;
        let (labels, count) = label_components(&img.as_view(), 2);
        assert_eq!(count, 2);
        assert_eq!(labels[2 * 20 + 2], labels[2 * 20 + 3]);
        assert_ne!(labels[2 * 20 + 2], labels[7 * 20 + 15]);
    }

    #[test]
    fn watershed_separates_two_seeded_basins() {
        // uniform gray: flood is driven purely by seed adjacency
        let img = GrayImage::filled(30, 10, 128);
        let mut markers = vec![0i32; 300];
        markers[5 * 30 + 3] = 2;
        markers[5 * 30 + 26] = 3;
        watershed(&img.as_view(), &mut markers);

        assert_eq!(markers[5 * 30 + 1], 2);
        assert_eq!(markers[5 * 30 + 28], 3);
        // every pixel was reached
        assert!(markers.iter().all(|&m| m != 0));
        // both labels hold substantial territory
        let left = markers.iter().filter(|&&m| m == 2).count();
        let right = markers.iter().filter(|&&m| m == 3).count();
        assert!(left > 50 && right > 50, "left {left} right {right}");
    }

    #[test]
    fn watershed_is_deterministic() {
        let mut img = GrayImage::filled(24, 24, 100);
        for y in 0..24 {
            img.data[y * 24 + 12] = 220;
        }
        let mut a = vec![0i32; 24 * 24];
        a[12 * 24 + 4] = 2;
        a[12 * 24 + 20] = 3;
        let mut b = a.clone();
        watershed(&img.as_view(), &mut a);
        watershed(&img.as_view(), &mut b);
        assert_eq!(a, b);
    }
}
