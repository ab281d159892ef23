//! Multi-strategy photo region detector for flatbed scans.
//!
//! Given one color raster containing one or more physical photographs
//! (possibly overlapping, rotated, faded, glare-affected or
//! Polaroid-bordered), the detector locates each photograph's
//! rectangular boundary, scores confidence and de-duplicates
//! overlapping candidates.
//!
//! ## Quickstart
//!
//! ```
//! use photosplit_core::RgbImage;
//! use photosplit_detect::{DetectorParams, PhotoRegionDetector};
//!
//! let detector = PhotoRegionDetector::new(DetectorParams::default());
//! let scan = RgbImage::filled(32, 32, [200, 200, 200]);
//! let candidates = detector.detect(&scan.as_view());
//! println!("detected: {}", candidates.len());
//! ```
//!
//! Pipeline stages:
//! 1. Preprocessing: glare inpainting, shadow lifting, illumination
//!    flattening and adaptive equalization feeding a combined edge map.
//! 2. Candidate generation: four independent strategies (contour,
//!    Polaroid border, faded/low-contrast, watershed) behind the
//!    [`DetectionStrategy`] trait.
//! 3. Consolidation: a shared geometric validity predicate, a shared
//!    confidence score and greedy IoU suppression.

mod confidence;
mod detector;
mod nms;
mod params;
mod strategies;
mod strategy;
#[cfg(test)]
mod test_support;
mod validity;

pub mod edges;
pub mod morphology;
pub mod preprocess;
pub mod regions;
pub mod segmentation;
pub mod threshold;

pub use confidence::{corner_angles, score_region};
pub use detector::PhotoRegionDetector;
pub use nms::suppress_overlaps;
pub use params::DetectorParams;
pub use strategies::{ContourStrategy, FadedStrategy, PolaroidStrategy, WatershedStrategy};
pub use strategy::{DetectionContext, DetectionStrategy};
pub use validity::region_is_plausible;
