//! Connected-region extraction from binary maps.
//!
//! Components are 8-connected; each one carries its bounding box and
//! the traced outer boundary polygon. Region `area` is the area
//! enclosed by that boundary (shoelace), so hollow shapes such as a
//! Polaroid border ring measure their full extent, holes included.

use nalgebra::Point2;
use photosplit_core::{GrayImageView, PixelRect};

#[derive(Clone, Debug)]
pub struct Region {
    /// Area enclosed by the outer boundary, in px².
    pub area: f32,
    /// Axis-aligned bounding box of the component pixels.
    pub rect: PixelRect,
    /// Outer boundary pixel centers, clockwise.
    pub boundary: Vec<Point2<f32>>,
}

// Clockwise (screen coordinates, y down) neighbor order starting West.
const DIRS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

#[inline]
fn is_fg(binary: &GrayImageView<'_>, x: i32, y: i32) -> bool {
    if x < 0 || y < 0 || x >= binary.width as i32 || y >= binary.height as i32 {
        return false;
    }
    binary.data[y as usize * binary.width + x as usize] != 0
}

/// Moore-neighbor boundary tracing with a positional stopping
/// criterion: stop when the start pixel is re-entered from the same
/// backtrack position. `start` must be the component's first pixel in
/// row-major scan order, which guarantees its west neighbor is
/// background.
fn trace_boundary(binary: &GrayImageView<'_>, start: (i32, i32)) -> Vec<(i32, i32)> {
    let limit = 2 * binary.width * binary.height + 8;
    let mut boundary = Vec::new();

    let start_b = (start.0 - 1, start.1);
    let mut c = start;
    let mut b = start_b;
    let mut start_visits = 0usize;

    loop {
        boundary.push(c);

        let bi = DIRS
            .iter()
            .position(|d| (c.0 + d.0, c.1 + d.1) == b)
            .unwrap_or(0);

        let mut moved = false;
        for k in 1..=8 {
            let di = (bi + k) % 8;
            let nx = c.0 + DIRS[di].0;
            let ny = c.1 + DIRS[di].1;
            if is_fg(binary, nx, ny) {
                let pi = (bi + k - 1) % 8;
                b = (c.0 + DIRS[pi].0, c.1 + DIRS[pi].1);
                c = (nx, ny);
                moved = true;
                break;
            }
        }

        if !moved {
            break; // isolated pixel
        }
        if c == start {
            // Jacob's criterion, plus a revisit cap for 1px-wide
            // components whose backtrack never realigns
            start_visits += 1;
            if b == start_b || start_visits >= 3 {
                break;
            }
        }
        if boundary.len() >= limit {
            break;
        }
    }
    boundary
}

/// Extract 8-connected foreground regions whose boundary encloses at
/// least `min_area` px², sorted by enclosed area descending.
pub fn find_regions(binary: &GrayImageView<'_>, min_area: f32) -> Vec<Region> {
    let w = binary.width;
    let h = binary.height;
    let mut visited = vec![false; w * h];
    let mut out = Vec::new();

    for sy in 0..h {
        for sx in 0..w {
            let sidx = sy * w + sx;
            if visited[sidx] || binary.data[sidx] == 0 {
                continue;
            }

            // flood the component to mark it visited and find its bbox
            let mut min_x = sx;
            let mut max_x = sx;
            let mut min_y = sy;
            let mut max_y = sy;
            let mut stack = vec![(sx as i32, sy as i32)];
            visited[sidx] = true;
            while let Some((x, y)) = stack.pop() {
                min_x = min_x.min(x as usize);
                max_x = max_x.max(x as usize);
                min_y = min_y.min(y as usize);
                max_y = max_y.max(y as usize);
                for (dx, dy) in DIRS {
                    let nx = x + dx;
                    let ny = y + dy;
                    if !is_fg(binary, nx, ny) {
                        continue;
                    }
                    let nidx = ny as usize * w + nx as usize;
                    if !visited[nidx] {
                        visited[nidx] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            let traced = trace_boundary(binary, (sx as i32, sy as i32));
            let boundary: Vec<Point2<f32>> = traced
                .iter()
                .map(|&(x, y)| Point2::new(x as f32, y as f32))
                .collect();
            let area = polygon_area(&boundary);
            if area < min_area {
                continue;
            }

            out.push(Region {
                area,
                rect: PixelRect::new(
                    min_x as u32,
                    min_y as u32,
                    (max_x - min_x + 1) as u32,
                    (max_y - min_y + 1) as u32,
                ),
                boundary,
            });
        }
    }

    out.sort_by(|a, b| b.area.partial_cmp(&a.area).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Shoelace area of a closed polygon.
pub fn polygon_area(pts: &[Point2<f32>]) -> f32 {
    if pts.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for i in 0..pts.len() {
        let a = pts[i];
        let b = pts[(i + 1) % pts.len()];
        sum += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    (sum.abs() * 0.5) as f32
}

/// Total polyline length; includes the closing segment when `closed`.
pub fn arc_length(pts: &[Point2<f32>], closed: bool) -> f32 {
    if pts.len() < 2 {
        return 0.0;
    }
    let mut len = 0.0f32;
    for i in 0..pts.len() - 1 {
        len += (pts[i + 1] - pts[i]).norm();
    }
    if closed {
        len += (pts[0] - pts[pts.len() - 1]).norm();
    }
    len
}

fn perpendicular_distance(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 < 1e-12 {
        return (p - a).norm();
    }
    let ap = p - a;
    (ab.x * ap.y - ab.y * ap.x).abs() / len2.sqrt()
}

fn rdp_open(pts: &[Point2<f32>], eps: f32) -> Vec<Point2<f32>> {
    if pts.len() < 3 {
        return pts.to_vec();
    }
    let mut keep = vec![false; pts.len()];
    keep[0] = true;
    keep[pts.len() - 1] = true;

    let mut stack = vec![(0usize, pts.len() - 1)];
    while let Some((i, j)) = stack.pop() {
        if j <= i + 1 {
            continue;
        }
        let mut best_k = i + 1;
        let mut best_d = -1.0f32;
        for (k, &p) in pts.iter().enumerate().take(j).skip(i + 1) {
            let d = perpendicular_distance(p, pts[i], pts[j]);
            if d > best_d {
                best_d = d;
                best_k = k;
            }
        }
        if best_d > eps {
            keep[best_k] = true;
            stack.push((i, best_k));
            stack.push((best_k, j));
        }
    }

    pts.iter()
        .zip(&keep)
        .filter(|(_, &k)| k)
        .map(|(&p, _)| p)
        .collect()
}

/// Ramer-Douglas-Peucker simplification of a closed polygon. The curve
/// is split at the vertex farthest from the first point so both chains
/// have stable anchors.
pub fn approx_polygon(pts: &[Point2<f32>], eps: f32) -> Vec<Point2<f32>> {
    if pts.len() < 4 {
        return pts.to_vec();
    }

    let mut far = 1;
    let mut far_d = 0.0f32;
    for (i, p) in pts.iter().enumerate().skip(1) {
        let d = (p - pts[0]).norm_squared();
        if d > far_d {
            far_d = d;
            far = i;
        }
    }

    let chain_a = &pts[..=far];
    let mut chain_b: Vec<Point2<f32>> = pts[far..].to_vec();
    chain_b.push(pts[0]);

    let mut out = rdp_open(chain_a, eps);
    out.pop();
    let mut tail = rdp_open(&chain_b, eps);
    tail.pop();
    out.extend(tail);
    out
}

/// Monotone-chain convex hull (counter-clockwise in math coordinates).
pub fn convex_hull(pts: &[Point2<f32>]) -> Vec<Point2<f32>> {
    let mut sorted: Vec<Point2<f32>> = pts.to_vec();
    sorted.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    sorted.dedup_by(|a, b| a.x == b.x && a.y == b.y);
    if sorted.len() < 3 {
        return sorted;
    }

    let cross = |o: Point2<f32>, a: Point2<f32>, b: Point2<f32>| -> f32 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };

    let mut lower: Vec<Point2<f32>> = Vec::new();
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Point2<f32>> = Vec::new();
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Minimum-area enclosing rectangle via rotating calipers over the
/// convex hull edges. Degenerate inputs collapse gracefully.
pub fn min_area_rect(hull: &[Point2<f32>]) -> [Point2<f32>; 4] {
    match hull.len() {
        0 => [Point2::new(0.0, 0.0); 4],
        1 => [hull[0]; 4],
        2 => [hull[0], hull[1], hull[1], hull[0]],
        _ => {
            let mut best_area = f32::INFINITY;
            let mut best = [hull[0]; 4];
            for i in 0..hull.len() {
                let a = hull[i];
                let b = hull[(i + 1) % hull.len()];
                let e = b - a;
                let len = e.norm();
                if len < 1e-6 {
                    continue;
                }
                let u = Point2::new(e.x / len, e.y / len);
                let v = Point2::new(-u.y, u.x);

                let mut umin = f32::INFINITY;
                let mut umax = f32::NEG_INFINITY;
                let mut vmin = f32::INFINITY;
                let mut vmax = f32::NEG_INFINITY;
                for p in hull {
                    let d = p - a;
                    let pu = d.x * u.x + d.y * u.y;
                    let pv = d.x * v.x + d.y * v.y;
                    umin = umin.min(pu);
                    umax = umax.max(pu);
                    vmin = vmin.min(pv);
                    vmax = vmax.max(pv);
                }
                let area = (umax - umin) * (vmax - vmin);
                if area < best_area {
                    best_area = area;
                    let corner = |pu: f32, pv: f32| {
                        Point2::new(a.x + u.x * pu + v.x * pv, a.y + u.y * pu + v.y * pv)
                    };
                    best = [
                        corner(umin, vmin),
                        corner(umax, vmin),
                        corner(umax, vmax),
                        corner(umin, vmax),
                    ];
                }
            }
            best
        }
    }
}

/// Best-fit 4 corner points of a traced boundary: the RDP polygon when
/// it simplifies to a quadrilateral, otherwise the minimum-area
/// rotated rectangle of its hull. Degenerate boundaries fall back to
/// the bounding-box corners.
pub fn corner_points(boundary: &[Point2<f32>], rect: &PixelRect) -> [Point2<f32>; 4] {
    if boundary.len() >= 3 {
        let eps = 0.015 * arc_length(boundary, true);
        let approx = approx_polygon(boundary, eps);
        if approx.len() == 4 {
            return [approx[0], approx[1], approx[2], approx[3]];
        }
        let hull = convex_hull(boundary);
        if hull.len() >= 3 {
            return min_area_rect(&hull);
        }
    }
    let x0 = rect.x as f32;
    let y0 = rect.y as f32;
    let x1 = (rect.right().saturating_sub(1)) as f32;
    let y1 = (rect.bottom().saturating_sub(1)) as f32;
    [
        Point2::new(x0, y0),
        Point2::new(x1, y0),
        Point2::new(x1, y1),
        Point2::new(x0, y1),
    ]
}
