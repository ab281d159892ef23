//! Raster loading with an up-front size ceiling.
//!
//! Dimensions are probed from the file header (or byte stream) before
//! any full-size buffer is allocated, so oversize inputs are rejected
//! cheaply.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageReader;
use photosplit_core::RgbImage;

/// Why an input raster could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("image file not found: {0}")]
    Missing(PathBuf),

    #[error("image too large: {width}x{height} px exceeds the {max_pixels} px ceiling")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] image::ImageError),
}

/// Read image dimensions from the file header without decoding pixels.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32), LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing(path.to_path_buf()));
    }
    Ok(image::image_dimensions(path)?)
}

/// Load a color raster, enforcing the pixel ceiling before decode.
pub fn load_rgb_checked(path: &Path, max_pixels: u64) -> Result<RgbImage, LoadError> {
    let (width, height) = probe_dimensions(path)?;
    if width as u64 * height as u64 > max_pixels {
        return Err(LoadError::TooLarge {
            width,
            height,
            max_pixels,
        });
    }
    let decoded = ImageReader::open(path)?.decode()?.to_rgb8();
    Ok(rgb_from_image(&decoded))
}

/// Decode a color raster from in-memory bytes, enforcing the pixel
/// ceiling before full decode.
pub fn load_rgb_from_bytes_checked(bytes: &[u8], max_pixels: u64) -> Result<RgbImage, LoadError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    if width as u64 * height as u64 > max_pixels {
        return Err(LoadError::TooLarge {
            width,
            height,
            max_pixels,
        });
    }
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?
        .to_rgb8();
    Ok(rgb_from_image(&decoded))
}

/// Convert an `image::RgbImage` into the core buffer type.
pub fn rgb_from_image(img: &image::RgbImage) -> RgbImage {
    RgbImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let err = probe_dimensions(Path::new("/no/such/scan.png")).unwrap_err();
        assert!(matches!(err, LoadError::Missing(_)));
    }

    #[test]
    fn bytes_ceiling_rejects_before_decode() {
        let img = image::RgbImage::new(64, 64);
        let mut bytes = Vec::new();
        img.write_to(
            &mut Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .expect("encode");

        let err = load_rgb_from_bytes_checked(&bytes, 1000).unwrap_err();
        assert!(matches!(err, LoadError::TooLarge { .. }));
        let ok = load_rgb_from_bytes_checked(&bytes, 10_000).expect("load");
        assert_eq!((ok.width, ok.height), (64, 64));
    }
}
