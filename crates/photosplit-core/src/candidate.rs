use std::path::PathBuf;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::rect::PixelRect;

/// Which strategy produced a candidate. Diagnostic only: consolidation
/// and extraction never branch on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Contour,
    Polaroid,
    Faded,
    Watershed,
}

impl DetectionMethod {
    /// Stable lowercase tag used in output filenames and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            DetectionMethod::Contour => "contour",
            DetectionMethod::Polaroid => "polaroid",
            DetectionMethod::Faded => "faded",
            DetectionMethod::Watershed => "watershed",
        }
    }
}

/// One hypothesized photo region.
///
/// `corners` holds the 4 best-fit corner points (possibly a rotated
/// rectangle) when the producing strategy recovered them; `None` means
/// only the axis-aligned crop is meaningful for this candidate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhotoCandidate {
    pub rect: PixelRect,
    /// Combined plausibility score in `[0, 1]`.
    pub confidence: f32,
    pub corners: Option<[Point2<f32>; 4]>,
    pub method: DetectionMethod,
}

impl PhotoCandidate {
    #[inline]
    pub fn area(&self) -> u64 {
        self.rect.area()
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.rect.aspect_ratio()
    }
}

/// One successfully extracted photo artifact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractedPhoto {
    pub path: PathBuf,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub confidence: f32,
    pub method: DetectionMethod,
    pub perspective_corrected: bool,
}
