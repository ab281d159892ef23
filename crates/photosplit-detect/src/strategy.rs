use photosplit_core::{to_luma, GrayImage, PhotoCandidate, RgbImageView};

use crate::params::DetectorParams;

/// Shared per-image inputs handed to every strategy: the color raster
/// and its full-resolution luminance projection. Texture and edge
/// density are always judged against these source-resolution buffers,
/// even for candidates found in a downscaled pass.
pub struct DetectionContext<'a> {
    pub color: RgbImageView<'a>,
    pub gray: GrayImage,
}

impl<'a> DetectionContext<'a> {
    pub fn new(color: RgbImageView<'a>) -> Self {
        let gray = to_luma(&color);
        Self { color, gray }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.color.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.color.height
    }
}

/// One candidate generator. Strategies are independent pure functions
/// over the context; they can be registered or dropped on the detector
/// without touching consolidation.
pub trait DetectionStrategy {
    /// Short tag for logs.
    fn name(&self) -> &'static str;

    /// Emit rectangle candidates in source-image coordinates.
    fn detect(&self, ctx: &DetectionContext<'_>, params: &DetectorParams) -> Vec<PhotoCandidate>;
}
