//! Core raster types and geometry for photo region detection.
//!
//! This crate is intentionally small. It owns the pixel-buffer and
//! candidate value types shared by the detection and extraction crates,
//! plus the 4-point homography machinery used for perspective
//! correction. It does *not* depend on any concrete detection strategy
//! or on an image I/O backend.

mod candidate;
mod homography;
mod image;
mod logger;
mod rect;

pub use candidate::{DetectionMethod, ExtractedPhoto, PhotoCandidate};
pub use homography::{homography_from_4pt, warp_perspective_rgb, Homography};
pub use image::{
    resize_bilinear_rgb, sample_bilinear_rgb, to_luma, GrayImage, GrayImageView, RgbImage,
    RgbImageView,
};
pub use rect::PixelRect;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;
pub use logger::init_with_level;
