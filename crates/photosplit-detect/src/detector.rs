use photosplit_core::{PhotoCandidate, RgbImageView};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::nms::suppress_overlaps;
use crate::params::DetectorParams;
use crate::strategies::{ContourStrategy, FadedStrategy, PolaroidStrategy, WatershedStrategy};
use crate::strategy::{DetectionContext, DetectionStrategy};

/// Multi-strategy photo region detector.
///
/// Owns its configuration and strategy list; construct one explicitly
/// per pipeline invocation or share it across images (detection holds
/// no mutable state).
pub struct PhotoRegionDetector {
    params: DetectorParams,
    strategies: Vec<Box<dyn DetectionStrategy>>,
}

impl PhotoRegionDetector {
    /// Comprehensive mode: all four strategies.
    pub fn new(params: DetectorParams) -> Self {
        Self::with_strategies(
            params,
            vec![
                Box::new(ContourStrategy),
                Box::new(PolaroidStrategy),
                Box::new(FadedStrategy),
                Box::new(WatershedStrategy),
            ],
        )
    }

    /// Fast mode: only the primary contour strategy.
    pub fn fast(params: DetectorParams) -> Self {
        Self::with_strategies(params, vec![Box::new(ContourStrategy)])
    }

    /// Custom strategy set.
    pub fn with_strategies(
        params: DetectorParams,
        strategies: Vec<Box<dyn DetectionStrategy>>,
    ) -> Self {
        Self { params, strategies }
    }

    #[inline]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Run stages 1-3 on one raster: every registered strategy, then
    /// greedy IoU consolidation, ranked by confidence and capped at
    /// `params.max_results`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, image), fields(width = image.width, height = image.height))
    )]
    pub fn detect(&self, image: &RgbImageView<'_>) -> Vec<PhotoCandidate> {
        if image.width == 0 || image.height == 0 {
            return Vec::new();
        }

        let ctx = DetectionContext::new(*image);
        let mut all = Vec::new();
        for strategy in &self.strategies {
            let found = strategy.detect(&ctx, &self.params);
            log::debug!("strategy {} produced {} candidates", strategy.name(), found.len());
            all.extend(found);
        }

        let kept = suppress_overlaps(all, self.params.nms_iou_threshold, self.params.max_results);
        log::info!(
            "detected {} photo regions ({} strategies)",
            kept.len(),
            self.strategies.len()
        );
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bordered_photo_scene, paint_bordered_photo};
    use photosplit_core::PixelRect;

    #[test]
    fn fast_mode_consolidates_both_scales_into_one() {
        let scene = bordered_photo_scene(300, 300, PixelRect::new(60, 80, 150, 100));
        let detector = PhotoRegionDetector::fast(DetectorParams::relaxed());
        let found = detector.detect(&scene.as_view());
        assert_eq!(found.len(), 1, "candidates: {found:?}");
        assert!(found[0].rect.iou(&PixelRect::new(60, 80, 150, 100)) > 0.6);
    }

    #[test]
    fn detect_is_deterministic() {
        let scene = bordered_photo_scene(300, 300, PixelRect::new(60, 80, 150, 100));
        let detector = PhotoRegionDetector::new(DetectorParams::relaxed());
        let a = detector.detect(&scene.as_view());
        let b = detector.detect(&scene.as_view());
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.rect, y.rect);
            assert_eq!(x.confidence.to_bits(), y.confidence.to_bits());
        }
    }

    #[test]
    fn two_photos_yield_two_candidates() {
        let mut scene = bordered_photo_scene(400, 400, PixelRect::new(30, 30, 140, 110));
        paint_bordered_photo(&mut scene, PixelRect::new(220, 230, 140, 110));
        let detector = PhotoRegionDetector::fast(DetectorParams::relaxed());
        let found = detector.detect(&scene.as_view());
        assert_eq!(found.len(), 2, "candidates: {found:?}");
        assert!(found[0].rect.iou(&found[1].rect) < 1e-3);
    }

    #[test]
    fn every_output_passes_the_validity_predicate() {
        let scene = bordered_photo_scene(300, 300, PixelRect::new(60, 80, 150, 100));
        let params = DetectorParams::relaxed();
        let detector = PhotoRegionDetector::new(params.clone());
        for c in detector.detect(&scene.as_view()) {
            assert!(crate::validity::region_is_plausible(&c.rect, 300, 300, &params));
            assert!((0.0..=1.0).contains(&c.confidence));
        }
    }

    #[test]
    fn empty_image_is_rejected_up_front() {
        let img = photosplit_core::RgbImage::filled(0, 0, [0, 0, 0]);
        let detector = PhotoRegionDetector::new(DetectorParams::default());
        assert!(detector.detect(&img.as_view()).is_empty());
    }
}
