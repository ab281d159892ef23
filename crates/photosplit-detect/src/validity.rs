//! The shared geometric validity predicate.
//!
//! Identical across every strategy so confidence comparisons during
//! consolidation stay meaningful.

use photosplit_core::PixelRect;

use crate::params::DetectorParams;

/// Whether a bounding box could plausibly be a whole photograph on the
/// scanner bed.
pub fn region_is_plausible(
    rect: &PixelRect,
    image_width: usize,
    image_height: usize,
    params: &DetectorParams,
) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }

    let area = rect.area();
    if area < params.min_photo_area {
        return false;
    }

    let image_area = image_width as u64 * image_height as u64;
    if area as f64 > image_area as f64 * params.max_photo_area_ratio as f64 {
        return false;
    }

    let aspect = rect.aspect_ratio();
    if aspect < params.min_aspect_ratio || aspect > params.max_aspect_ratio {
        return false;
    }

    if rect.width < params.min_dimension_px || rect.height < params.min_dimension_px {
        return false;
    }

    // scanner-bed guard: boxes hugging the outer edge are bed artifacts
    let margin = params.border_margin_px;
    if rect.x < margin || rect.y < margin {
        return false;
    }
    if rect.right() + margin > image_width as u32 || rect.bottom() + margin > image_height as u32 {
        return false;
    }

    if rect.perimeter() < params.min_perimeter_px {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DetectorParams {
        DetectorParams::default()
    }

    #[test]
    fn accepts_a_typical_photo_box() {
        let rect = PixelRect::new(100, 100, 800, 600);
        assert!(region_is_plausible(&rect, 3000, 2000, &params()));
    }

    #[test]
    fn rejects_small_area() {
        let rect = PixelRect::new(100, 100, 400, 400); // 160k < 200k
        assert!(!region_is_plausible(&rect, 3000, 2000, &params()));
    }

    #[test]
    fn rejects_whole_scan() {
        let rect = PixelRect::new(10, 10, 2900, 1900);
        assert!(!region_is_plausible(&rect, 3000, 2000, &params()));
    }

    #[test]
    fn rejects_extreme_aspect() {
        let rect = PixelRect::new(100, 100, 2500, 500);
        assert!(!region_is_plausible(&rect, 3000, 2000, &params()));
    }

    #[test]
    fn rejects_small_dimension() {
        let mut p = params();
        p.min_photo_area = 1000;
        p.min_perimeter_px = 100;
        let rect = PixelRect::new(100, 100, 1200, 300); // height < 400
        assert!(!region_is_plausible(&rect, 3000, 2000, &p));
    }

    #[test]
    fn rejects_border_hugging_box() {
        let rect = PixelRect::new(2, 100, 800, 600);
        assert!(!region_is_plausible(&rect, 3000, 2000, &params()));
        let rect = PixelRect::new(100, 100, 800, 600);
        assert!(!region_is_plausible(&rect, 901, 2000, &params()));
    }

    #[test]
    fn rejects_thin_perimeter() {
        let mut p = params();
        p.min_photo_area = 1;
        p.min_dimension_px = 1;
        p.min_aspect_ratio = 0.01;
        p.max_aspect_ratio = 100.0;
        let rect = PixelRect::new(10, 10, 800, 50);
        assert!(!region_is_plausible(&rect, 3000, 2000, &p));
    }
}
