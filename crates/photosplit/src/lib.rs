//! Photo region detection and extraction for flatbed scans.
//!
//! Given a scan containing one or more physical photographs, locate
//! each photograph's rectangular boundary, score confidence, merge
//! duplicate detections, and extract each region as its own JPEG.
//!
//! ## Quickstart
//!
//! ```no_run
//! use photosplit::{detect_photos, extract_photos, DetectorParams, ExtractorParams};
//!
//! let candidates = detect_photos("scan.png", &DetectorParams::default());
//! let extracted = extract_photos(
//!     "scan.png",
//!     "out/",
//!     &candidates,
//!     &ExtractorParams::default(),
//! );
//! println!("split {} photos", extracted.len());
//! ```
//!
//! The public entry points never fail: a missing file, an undecodable
//! image or an oversize input logs the reason and returns an empty
//! list, and per-candidate extraction failures are skipped. Callers
//! that already hold a decoded raster can drive
//! [`PhotoRegionDetector`] and [`PhotoExtractor`] directly.
//!
//! Each invocation is synchronous and self-contained: it only reads
//! its input raster and writes fresh output buffers, so independent
//! images may be processed on parallel workers without coordination,
//! and every buffer is released when the call returns.

mod io;

use std::path::Path;

pub use io::{
    load_rgb_checked, load_rgb_from_bytes_checked, probe_dimensions, rgb_from_image, LoadError,
};
pub use photosplit_core::{
    DetectionMethod, ExtractedPhoto, GrayImage, GrayImageView, PhotoCandidate, PixelRect,
    RgbImage, RgbImageView,
};
pub use photosplit_core::init_with_level;
#[cfg(feature = "tracing")]
pub use photosplit_core::init_tracing;
pub use photosplit_detect::{
    suppress_overlaps, DetectionContext, DetectionStrategy, DetectorParams, PhotoRegionDetector,
};
pub use photosplit_extract::{ExtractError, ExtractorParams, PhotoExtractor};

/// Detect photo regions in an image file (stages 1-3).
///
/// Returns ranked, de-duplicated candidates. All input failures
/// (missing file, unreadable data, image above `params.max_pixels`)
/// are logged and yield an empty list.
pub fn detect_photos(path: impl AsRef<Path>, params: &DetectorParams) -> Vec<PhotoCandidate> {
    let path = path.as_ref();
    let image = match io::load_rgb_checked(path, params.max_pixels) {
        Ok(image) => image,
        Err(e) => {
            log::error!("photo detection skipped for {}: {e}", path.display());
            return Vec::new();
        }
    };
    log::info!("starting photo detection on {}", path.display());
    PhotoRegionDetector::new(params.clone()).detect(&image.as_view())
}

/// [`detect_photos`] with only the primary contour strategy.
pub fn detect_photos_fast(path: impl AsRef<Path>, params: &DetectorParams) -> Vec<PhotoCandidate> {
    let path = path.as_ref();
    let image = match io::load_rgb_checked(path, params.max_pixels) {
        Ok(image) => image,
        Err(e) => {
            log::error!("photo detection skipped for {}: {e}", path.display());
            return Vec::new();
        }
    };
    PhotoRegionDetector::fast(params.clone()).detect(&image.as_view())
}

/// Detect photo regions in an in-memory encoded image.
pub fn detect_photos_from_bytes(bytes: &[u8], params: &DetectorParams) -> Vec<PhotoCandidate> {
    let image = match io::load_rgb_from_bytes_checked(bytes, params.max_pixels) {
        Ok(image) => image,
        Err(e) => {
            log::error!("photo detection skipped for byte input: {e}");
            return Vec::new();
        }
    };
    PhotoRegionDetector::new(params.clone()).detect(&image.as_view())
}

/// Extract previously detected candidates from an image file (stage
/// 4), writing one JPEG per surviving candidate into `out_dir`.
///
/// Individual failures are logged and skipped; the result never
/// exceeds `candidates.len()`.
pub fn extract_photos(
    path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    candidates: &[PhotoCandidate],
    params: &ExtractorParams,
) -> Vec<ExtractedPhoto> {
    let path = path.as_ref();
    if candidates.is_empty() {
        return Vec::new();
    }
    let image = match io::load_rgb_checked(path, params.max_pixels) {
        Ok(image) => image,
        Err(e) => {
            log::error!("photo extraction skipped for {}: {e}", path.display());
            return Vec::new();
        }
    };

    let base = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    PhotoExtractor::new(params.clone()).extract(&image.as_view(), out_dir.as_ref(), &base, candidates)
}
