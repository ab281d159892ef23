//! Watershed strategy: separates touching or overlapping photos that a
//! single contour pass would merge into one region.

use nalgebra::Point2;
use photosplit_core::{DetectionMethod, GrayImage, PhotoCandidate};

use crate::confidence::score_region;
use crate::morphology::{dilate, open};
use crate::params::DetectorParams;
use crate::regions::{corner_points, find_regions};
use crate::segmentation::{distance_transform, label_components, label_mask, watershed};
use crate::strategy::{DetectionContext, DetectionStrategy};
use crate::threshold::{otsu_threshold, threshold_binary_inv};
use crate::validity::region_is_plausible;

const CONFIDENCE_DISCOUNT: f32 = 0.85;
/// Sure-foreground cut relative to the distance-transform peak.
const FOREGROUND_DISTANCE_FRAC: f32 = 0.5;

pub struct WatershedStrategy;

impl DetectionStrategy for WatershedStrategy {
    fn name(&self) -> &'static str {
        "watershed"
    }

    fn detect(&self, ctx: &DetectionContext<'_>, params: &DetectorParams) -> Vec<PhotoCandidate> {
        let w = ctx.width();
        let h = ctx.height();
        let gray = ctx.gray.as_view();

        let t = otsu_threshold(&gray);
        let binary = threshold_binary_inv(&gray, t);
        let opening = open(&binary.as_view(), 3, 3, 2);
        let sure_bg = dilate(&opening.as_view(), 3, 3, 3);

        let dist = distance_transform(&opening.as_view());
        let peak = dist.iter().cloned().fold(0.0f32, f32::max);
        if peak <= 0.0 {
            return Vec::new();
        }

        let cut = FOREGROUND_DISTANCE_FRAC * peak;
        let mut sure_fg = GrayImage::new(w, h);
        for (o, &d) in sure_fg.data.iter_mut().zip(&dist) {
            if d >= cut {
                *o = 255;
            }
        }

        // seeds: background 1, one label per sure-foreground blob;
        // the band between stays 0 for the flood to claim
        let (mut markers, seeds) = label_components(&sure_fg.as_view(), 2);
        if seeds == 0 {
            return Vec::new();
        }
        for (m, &bg) in markers.iter_mut().zip(&sure_bg.data) {
            if *m == 0 && bg == 0 {
                *m = 1;
            }
        }

        watershed(&gray, &mut markers);

        let mut out = Vec::new();
        for label in 2..(2 + seeds as i32) {
            let mask = label_mask(&markers, label, w, h);
            for region in find_regions(&mask.as_view(), 64.0) {
                if !region_is_plausible(&region.rect, w, h, params) {
                    continue;
                }
                let corners: [Point2<f32>; 4] = corner_points(&region.boundary, &region.rect);
                let confidence = score_region(region.area, &region.rect, &corners, &gray)
                    * CONFIDENCE_DISCOUNT;
                if confidence > params.min_confidence {
                    out.push(PhotoCandidate {
                        rect: region.rect,
                        confidence,
                        corners: Some(corners),
                        method: DetectionMethod::Watershed,
                    });
                }
            }
        }
        out
    }
}
