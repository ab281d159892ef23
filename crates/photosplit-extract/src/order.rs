use nalgebra::Point2;

/// Order 4 corner points as top-left, top-right, bottom-right,
/// bottom-left (clockwise in screen coordinates).
///
/// Primary ordering sorts by angle around the centroid; when that
/// degenerates (a point on the centroid, or two points at the same
/// angle), coordinate-sum ordering takes over.
pub fn order_corners(pts: &[Point2<f32>; 4]) -> [Point2<f32>; 4] {
    let cx = pts.iter().map(|p| p.x).sum::<f32>() / 4.0;
    let cy = pts.iter().map(|p| p.y).sum::<f32>() / 4.0;

    let mut angled: Vec<(f32, Point2<f32>)> = pts
        .iter()
        .map(|&p| ((p.y - cy).atan2(p.x - cx), p))
        .collect();

    let on_centroid = pts
        .iter()
        .any(|p| (p.x - cx).abs() < 1e-3 && (p.y - cy).abs() < 1e-3);
    let mut sorted = angled.clone();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    let duplicate_angle = sorted.windows(2).any(|w| (w[1].0 - w[0].0).abs() < 1e-4);
    if on_centroid || duplicate_angle {
        return order_by_sums(pts);
    }
    angled = sorted;

    // angle-ascending is clockwise on screen; rotate so the corner
    // with the smallest coordinate sum (top-left) leads
    let mut tl_idx = 0;
    let mut tl_sum = f32::INFINITY;
    for (i, (_, p)) in angled.iter().enumerate() {
        let s = p.x + p.y;
        if s < tl_sum {
            tl_sum = s;
            tl_idx = i;
        }
    }

    [
        angled[tl_idx].1,
        angled[(tl_idx + 1) % 4].1,
        angled[(tl_idx + 2) % 4].1,
        angled[(tl_idx + 3) % 4].1,
    ]
}

/// Fallback ordering: top-left minimizes `x+y`, bottom-right maximizes
/// it, top-right minimizes `y-x`, bottom-left maximizes it.
fn order_by_sums(pts: &[Point2<f32>; 4]) -> [Point2<f32>; 4] {
    let pick = |key: fn(&Point2<f32>) -> f32, max: bool| -> Point2<f32> {
        let mut best = pts[0];
        let mut best_k = key(&pts[0]);
        for p in &pts[1..] {
            let k = key(p);
            if (max && k > best_k) || (!max && k < best_k) {
                best_k = k;
                best = *p;
            }
        }
        best
    };

    let tl = pick(|p| p.x + p.y, false);
    let br = pick(|p| p.x + p.y, true);
    let tr = pick(|p| p.y - p.x, false);
    let bl = pick(|p| p.y - p.x, true);
    [tl, tr, br, bl]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_order(input: [Point2<f32>; 4], expected: [(f32, f32); 4]) {
        let out = order_corners(&input);
        for (p, (ex, ey)) in out.iter().zip(expected) {
            assert!(
                (p.x - ex).abs() < 1e-3 && (p.y - ey).abs() < 1e-3,
                "got {p:?}, expected ({ex},{ey})"
            );
        }
    }

    #[test]
    fn orders_a_shuffled_axis_aligned_rect() {
        assert_order(
            [
                Point2::new(100.0, 80.0),
                Point2::new(10.0, 10.0),
                Point2::new(10.0, 80.0),
                Point2::new(100.0, 10.0),
            ],
            [(10.0, 10.0), (100.0, 10.0), (100.0, 80.0), (10.0, 80.0)],
        );
    }

    #[test]
    fn orders_a_rotated_rect() {
        // rectangle rotated ~30 degrees around (50, 50)
        assert_order(
            [
                Point2::new(76.0, 95.0),
                Point2::new(24.0, 5.0),
                Point2::new(81.0, 38.0),
                Point2::new(19.0, 62.0),
            ],
            [(24.0, 5.0), (81.0, 38.0), (76.0, 95.0), (19.0, 62.0)],
        );
    }

    #[test]
    fn degenerate_points_fall_back_to_sum_ordering() {
        // two coincident points share an angle
        let out = order_corners(&[
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
        ]);
        assert_eq!((out[0].x, out[0].y), (0.0, 0.0));
        assert_eq!((out[2].x, out[2].y), (10.0, 10.0));
    }
}
