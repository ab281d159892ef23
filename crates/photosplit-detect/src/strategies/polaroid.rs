//! White-border (Polaroid / instant-photo) strategy.
//!
//! Strict validation: near-square aspect, very high rectangularity and
//! a minimum interior edge density, so white clothing and paper sheets
//! on the scanner bed do not pass.

use photosplit_core::{DetectionMethod, GrayImage, GrayImageView, PhotoCandidate, PixelRect};

use crate::edges::canny;
use crate::morphology::{close, open};
use crate::params::DetectorParams;
use crate::regions::{corner_points, find_regions};
use crate::strategy::{DetectionContext, DetectionStrategy};
use crate::threshold::threshold_binary;
use crate::validity::region_is_plausible;

const WHITE_THRESHOLD: u8 = 220;
const ASPECT_RANGE: (f32, f32) = (0.8, 1.2);
const MIN_RECTANGULARITY: f32 = 0.88;
const MIN_EDGE_DENSITY: f32 = 0.025;
const BORDER_CONFIDENCE: f32 = 0.65;

pub struct PolaroidStrategy;

impl DetectionStrategy for PolaroidStrategy {
    fn name(&self) -> &'static str {
        "polaroid"
    }

    fn detect(&self, ctx: &DetectionContext<'_>, params: &DetectorParams) -> Vec<PhotoCandidate> {
        let gray = ctx.gray.as_view();
        let white = threshold_binary(&gray, WHITE_THRESHOLD);
        let cleaned = close(&white.as_view(), 5, 5, 1);
        let cleaned = open(&cleaned.as_view(), 5, 5, 1);

        let regions = find_regions(&cleaned.as_view(), 64.0);

        let mut out = Vec::new();
        for region in &regions {
            if !region_is_plausible(&region.rect, ctx.width(), ctx.height(), params) {
                continue;
            }

            let aspect = region.rect.aspect_ratio();
            if aspect < ASPECT_RANGE.0 || aspect > ASPECT_RANGE.1 {
                continue;
            }

            // the white frame must fill its box almost completely
            let rectangularity = region.area / region.rect.area().max(1) as f32;
            if rectangularity < MIN_RECTANGULARITY {
                continue;
            }

            // real instant photos carry picture content inside the frame
            if edge_density(&gray, &region.rect) < MIN_EDGE_DENSITY {
                continue;
            }

            let corners = corner_points(&region.boundary, &region.rect);
            out.push(PhotoCandidate {
                rect: region.rect,
                confidence: BORDER_CONFIDENCE,
                corners: Some(corners),
                method: DetectionMethod::Polaroid,
            });
        }
        out
    }
}

/// Fraction of edge pixels inside the candidate box, measured on the
/// source-resolution luminance.
fn edge_density(gray: &GrayImageView<'_>, rect: &PixelRect) -> f32 {
    let x0 = (rect.x as usize).min(gray.width);
    let y0 = (rect.y as usize).min(gray.height);
    let x1 = (rect.right() as usize).min(gray.width);
    let y1 = (rect.bottom() as usize).min(gray.height);
    if x1 <= x0 || y1 <= y0 {
        return 0.0;
    }

    let rw = x1 - x0;
    let rh = y1 - y0;
    let mut crop = GrayImage::new(rw, rh);
    for y in 0..rh {
        for x in 0..rw {
            crop.data[y * rw + x] = gray.data[(y0 + y) * gray.width + (x0 + x)];
        }
    }

    let edges = canny(&crop.as_view(), 50.0, 150.0);
    let hits = edges.data.iter().filter(|&&v| v != 0).count();
    hits as f32 / (rw * rh) as f32
}
