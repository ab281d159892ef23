use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use photosplit_core::{ExtractedPhoto, PhotoCandidate, RgbImage, RgbImageView};
use serde::{Deserialize, Serialize};

use crate::crop::{padded_crop, refine_edges};
use crate::naming::unique_output_path;
use crate::warp::perspective_extract;

/// Configuration for the extraction stage.
///
/// The warp bounds are heuristic safety thresholds against
/// mathematically valid but visually wrong perspective transforms, not
/// physical constants; loosen them for unusual material.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractorParams {
    /// Warp candidates carrying 4 corner points into an axis-aligned
    /// rectangle; `false` always crops the bounding box.
    pub perspective_correction: bool,
    /// Bilateral smoothing plus border trim on each extracted region.
    pub edge_refinement: bool,
    /// Crop padding as a fraction of the shorter box side.
    pub padding_frac: f32,
    pub min_padding_px: u32,
    /// Pixels trimmed from each edge during refinement.
    pub border_trim_px: u32,
    pub jpeg_quality: u8,
    /// Accepted destination-rectangle size for a perspective warp.
    pub warp_min_dim: u32,
    pub warp_max_dim: u32,
    /// Accepted destination aspect ratio.
    pub warp_min_aspect: f32,
    pub warp_max_aspect: f32,
    /// Accepted mean intensity of the warped result.
    pub warp_mean_min: f32,
    pub warp_mean_max: f32,
    /// Inputs larger than this many pixels are rejected before
    /// extraction begins.
    pub max_pixels: u64,
}

impl Default for ExtractorParams {
    fn default() -> Self {
        Self {
            perspective_correction: true,
            edge_refinement: true,
            padding_frac: 0.02,
            min_padding_px: 5,
            border_trim_px: 2,
            jpeg_quality: 95,
            warp_min_dim: 24,
            warp_max_dim: 12_000,
            warp_min_aspect: 0.2,
            warp_max_aspect: 5.0,
            warp_mean_min: 8.0,
            warp_mean_max: 247.0,
            max_pixels: 30_000_000,
        }
    }
}

/// Per-candidate extraction failures.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("candidate region is empty after clamping")]
    EmptyCrop,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Encode(#[from] image::ImageError),
}

/// Stage-4 extractor: crops or perspective-corrects each candidate out
/// of the source raster and writes one JPEG per survivor.
pub struct PhotoExtractor {
    params: ExtractorParams,
}

impl PhotoExtractor {
    pub fn new(params: ExtractorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &ExtractorParams {
        &self.params
    }

    /// Extract every candidate, skipping individual failures.
    ///
    /// The result length never exceeds `candidates.len()`; extraction
    /// only processes or skips provided candidates.
    pub fn extract(
        &self,
        image: &RgbImageView<'_>,
        out_dir: &Path,
        base_name: &str,
        candidates: &[PhotoCandidate],
    ) -> Vec<ExtractedPhoto> {
        if candidates.is_empty() {
            return Vec::new();
        }
        if let Err(e) = fs::create_dir_all(out_dir) {
            log::error!("cannot create output directory {}: {e}", out_dir.display());
            return Vec::new();
        }

        let mut out = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            match self.extract_one(image, out_dir, base_name, index, candidate) {
                Ok(record) => {
                    log::info!("extracted photo {}: {}", index + 1, record.filename);
                    out.push(record);
                }
                Err(e) => {
                    log::warn!("skipping photo {}: {e}", index + 1);
                }
            }
        }
        log::info!("extracted {}/{} photos", out.len(), candidates.len());
        out
    }

    fn extract_one(
        &self,
        image: &RgbImageView<'_>,
        out_dir: &Path,
        base_name: &str,
        index: usize,
        candidate: &PhotoCandidate,
    ) -> Result<ExtractedPhoto, ExtractError> {
        let mut corrected = false;
        let mut region: Option<RgbImage> = None;

        if self.params.perspective_correction {
            if let Some(corners) = &candidate.corners {
                region = perspective_extract(image, corners, &self.params);
                corrected = region.is_some();
                if !corrected {
                    log::debug!(
                        "perspective correction unavailable for photo {}, cropping instead",
                        index + 1
                    );
                }
            }
        }

        let region = match region {
            Some(r) => r,
            None => padded_crop(
                image,
                &candidate.rect,
                self.params.padding_frac,
                self.params.min_padding_px,
            )
            .ok_or(ExtractError::EmptyCrop)?,
        };

        let region = if self.params.edge_refinement {
            refine_edges(&region, self.params.border_trim_px)
        } else {
            region
        };

        let path = unique_output_path(
            out_dir,
            base_name,
            index,
            candidate.method.label(),
            candidate.confidence,
        );
        save_jpeg(&region, &path, self.params.jpeg_quality)?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ExtractedPhoto {
            path: path.clone(),
            filename,
            width: region.width as u32,
            height: region.height as u32,
            confidence: candidate.confidence,
            method: candidate.method,
            perspective_corrected: corrected,
        })
    }
}

/// Encode an RGB raster as JPEG at the given quality.
pub fn save_jpeg(img: &RgbImage, path: &Path, quality: u8) -> Result<(), ExtractError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    encoder.write_image(
        &img.data,
        img.width as u32,
        img.height as u32,
        ExtendedColorType::Rgb8,
    )?;
    Ok(())
}
