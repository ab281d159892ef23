//! Faded/low-contrast strategy: aggressive tile equalization and a
//! local-mean threshold recover boundaries invisible at normal
//! contrast. Scores carry a fixed discount because the recovered
//! evidence is weaker.

use nalgebra::Point2;
use photosplit_core::{DetectionMethod, PhotoCandidate};

use crate::confidence::score_region;
use crate::edges::{adaptive_threshold_gaussian, canny};
use crate::morphology::dilate;
use crate::params::DetectorParams;
use crate::preprocess::equalize_adaptive;
use crate::regions::{corner_points, find_regions};
use crate::strategy::{DetectionContext, DetectionStrategy};
use crate::validity::region_is_plausible;

const CONFIDENCE_DISCOUNT: f32 = 0.9;

pub struct FadedStrategy;

impl DetectionStrategy for FadedStrategy {
    fn name(&self) -> &'static str {
        "faded"
    }

    fn detect(&self, ctx: &DetectionContext<'_>, params: &DetectorParams) -> Vec<PhotoCandidate> {
        let gray = ctx.gray.as_view();

        let enhanced = equalize_adaptive(&gray, 4.0, 4);
        let binary = adaptive_threshold_gaussian(&enhanced.as_view(), 11, 2.0);
        let edges = canny(&binary.as_view(), 50.0, 150.0);
        let connected = dilate(&edges.as_view(), 5, 5, 3);

        let min_region_area =
            (ctx.width() * ctx.height()) as f32 * params.contour_area_frac;
        let regions = find_regions(&connected.as_view(), min_region_area);

        let mut out = Vec::new();
        for region in regions.iter().take(params.max_region_candidates) {
            if !region_is_plausible(&region.rect, ctx.width(), ctx.height(), params) {
                continue;
            }

            let corners: [Point2<f32>; 4] = corner_points(&region.boundary, &region.rect);
            let confidence =
                score_region(region.area, &region.rect, &corners, &gray) * CONFIDENCE_DISCOUNT;
            if confidence > params.min_confidence {
                out.push(PhotoCandidate {
                    rect: region.rect,
                    confidence,
                    corners: Some(corners),
                    method: DetectionMethod::Faded,
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::set_px;
    use photosplit_core::{PixelRect, RgbImage};

    #[test]
    fn recovers_a_washed_out_photo() {
        // a faded print: only 14 gray levels above its background
        let mut img = RgbImage::filled(300, 300, [120, 120, 120]);
        for y in 60..180 {
            for x in 60..210 {
                let v = if ((x - 60) / 12 + (y - 60) / 12) % 2 == 0 {
                    [134, 134, 134]
                } else {
                    [127, 127, 127]
                };
                set_px(&mut img, x, y, v);
            }
        }
        let ctx = DetectionContext::new(img.as_view());
        let params = DetectorParams::relaxed();

        let found = FadedStrategy.detect(&ctx, &params);
        assert!(!found.is_empty(), "faded photo missed");
        let best = found
            .iter()
            .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap())
            .unwrap();
        assert_eq!(best.method, DetectionMethod::Faded);
        // dilation pads the box; allow a generous halo
        let target = PixelRect::new(60, 60, 150, 120);
        assert!(
            best.rect.iou(&target) > 0.45,
            "rect {:?} vs {target:?}",
            best.rect
        );
    }

    #[test]
    fn flat_input_yields_nothing() {
        let img = RgbImage::filled(200, 200, [120, 120, 120]);
        let ctx = DetectionContext::new(img.as_view());
        let found = FadedStrategy.detect(&ctx, &DetectorParams::relaxed());
        assert!(found.is_empty());
    }
}
