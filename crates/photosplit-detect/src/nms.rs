//! Greedy non-maximum suppression.

use photosplit_core::PhotoCandidate;

/// Merge overlapping detections: sort by confidence descending, accept
/// each candidate only if its IoU with every already-accepted one stays
/// at or below `iou_threshold`, and cap the output at `max_results`.
///
/// Strategies legitimately report the same physical photo more than
/// once; only the best-scoring explanation survives.
pub fn suppress_overlaps(
    mut detections: Vec<PhotoCandidate>,
    iou_threshold: f32,
    max_results: usize,
) -> Vec<PhotoCandidate> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<PhotoCandidate> = Vec::new();
    for det in detections {
        if kept.len() >= max_results {
            break;
        }
        let duplicate = kept.iter().any(|k| k.rect.iou(&det.rect) > iou_threshold);
        if !duplicate {
            kept.push(det);
        }
    }
    kept
}
