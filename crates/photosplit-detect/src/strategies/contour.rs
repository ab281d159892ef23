//! Primary edge/contour strategy, run as a two-level pyramid so both
//! large and small photos are caught.

use nalgebra::Point2;
use photosplit_core::{
    resize_bilinear_rgb, DetectionMethod, PhotoCandidate, PixelRect, RgbImageView,
};

use crate::confidence::score_region;
use crate::params::DetectorParams;
use crate::preprocess::preprocess_for_edges;
use crate::regions::{corner_points, find_regions};
use crate::strategy::{DetectionContext, DetectionStrategy};
use crate::validity::region_is_plausible;

pub struct ContourStrategy;

impl DetectionStrategy for ContourStrategy {
    fn name(&self) -> &'static str {
        "contour"
    }

    fn detect(&self, ctx: &DetectionContext<'_>, params: &DetectorParams) -> Vec<PhotoCandidate> {
        let mut out = Vec::new();
        for &scale in &params.scales {
            out.extend(detect_at_scale(ctx, params, scale));
        }
        out
    }
}

fn detect_at_scale(
    ctx: &DetectionContext<'_>,
    params: &DetectorParams,
    scale: f32,
) -> Vec<PhotoCandidate> {
    if scale <= 0.0 {
        return Vec::new();
    }

    let scaled_storage;
    let view: RgbImageView<'_> = if (scale - 1.0).abs() < 1e-3 {
        ctx.color
    } else {
        let sw = (ctx.width() as f32 * scale).round() as usize;
        let sh = (ctx.height() as f32 * scale).round() as usize;
        scaled_storage = resize_bilinear_rgb(&ctx.color, sw, sh);
        scaled_storage.as_view()
    };

    let edge_map = preprocess_for_edges(&view);
    let min_region_area = (view.width * view.height) as f32 * params.contour_area_frac;
    let regions = find_regions(&edge_map.as_view(), min_region_area);

    let gray = ctx.gray.as_view();
    let mut out = Vec::new();
    for region in regions.iter().take(params.max_region_candidates) {
        let rect = rescale_rect(&region.rect, scale, ctx.width(), ctx.height());
        if !region_is_plausible(&rect, ctx.width(), ctx.height(), params) {
            continue;
        }

        let local = corner_points(&region.boundary, &region.rect);
        let corners = local.map(|p| Point2::new(p.x / scale, p.y / scale));
        let region_area = region.area / (scale * scale);

        let confidence = score_region(region_area, &rect, &corners, &gray);
        if confidence > params.min_confidence {
            out.push(PhotoCandidate {
                rect,
                confidence,
                corners: Some(corners),
                method: DetectionMethod::Contour,
            });
        }
    }
    out
}

/// Map a rect found at `scale` back into source coordinates, clamped
/// to the source bounds.
fn rescale_rect(rect: &PixelRect, scale: f32, max_w: usize, max_h: usize) -> PixelRect {
    if (scale - 1.0).abs() < 1e-3 {
        return *rect;
    }
    let x = ((rect.x as f32 / scale).round() as u32).min(max_w as u32);
    let y = ((rect.y as f32 / scale).round() as u32).min(max_h as u32);
    let w = ((rect.width as f32 / scale).round() as u32).min(max_w as u32 - x);
    let h = ((rect.height as f32 / scale).round() as u32).min(max_h as u32 - y);
    PixelRect::new(x, y, w, h)
}
