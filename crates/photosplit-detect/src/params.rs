use serde::{Deserialize, Serialize};

/// Configuration for the photo region detector.
///
/// The defaults reflect a conservative tuning aimed at whole
/// photographs on a scanner bed: large minimum area and dimensions so
/// that objects *inside* a photo (faces, clothing, postcards in the
/// picture) are not reported as photos themselves.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Minimum bounding-box area in pixels for a candidate.
    pub min_photo_area: u64,
    /// Maximum candidate area as a fraction of the full image area.
    /// Guards against the entire scan being reported as one photo.
    pub max_photo_area_ratio: f32,
    /// Allowed width/height range.
    pub min_aspect_ratio: f32,
    pub max_aspect_ratio: f32,
    /// Both bounding-box dimensions must reach this many pixels.
    pub min_dimension_px: u32,
    /// Minimum bounding-box perimeter `2*(w+h)`; rejects thin slivers.
    pub min_perimeter_px: u32,
    /// Candidates closer than this to the image border are scanner-bed
    /// artifacts, not photos.
    pub border_margin_px: u32,
    /// A traced region must enclose at least this fraction of the
    /// (scaled) image area before it is considered at all.
    pub contour_area_frac: f32,
    /// Regions examined per detection pass, largest first.
    pub max_region_candidates: usize,
    /// Pyramid scales for the contour strategy. Coordinates from
    /// downscaled passes are mapped back to source resolution.
    pub scales: Vec<f32>,
    /// Confidence gate applied by the scoring strategies.
    pub min_confidence: f32,
    /// IoU above which two candidates are considered the same photo.
    pub nms_iou_threshold: f32,
    /// Cap on the consolidated output length.
    pub max_results: usize,
    /// Inputs larger than this many pixels are rejected before any
    /// processing buffer is allocated.
    pub max_pixels: u64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            min_photo_area: 200_000,
            max_photo_area_ratio: 0.85,
            min_aspect_ratio: 0.3,
            max_aspect_ratio: 4.0,
            min_dimension_px: 400,
            min_perimeter_px: 1800,
            border_margin_px: 5,
            contour_area_frac: 0.008,
            max_region_candidates: 25,
            scales: vec![1.0, 0.85],
            min_confidence: 0.72,
            nms_iou_threshold: 0.5,
            max_results: 15,
            max_pixels: 25_000_000,
        }
    }
}

impl DetectorParams {
    /// A loose tuning for small test rasters: the production floors
    /// (400 px dimensions, 200k px area) assume real scan resolutions.
    #[cfg(test)]
    pub(crate) fn relaxed() -> Self {
        Self {
            min_photo_area: 900,
            min_dimension_px: 24,
            min_perimeter_px: 100,
            min_confidence: 0.3,
            contour_area_frac: 0.002,
            ..Self::default()
        }
    }
}
