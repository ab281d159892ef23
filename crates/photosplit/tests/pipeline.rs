//! End-to-end pipeline tests on synthetic scan scenes.

use std::path::{Path, PathBuf};

use photosplit::{
    detect_photos, detect_photos_fast, extract_photos, suppress_overlaps, DetectionMethod,
    DetectorParams, ExtractorParams, PhotoCandidate, PixelRect,
};

/// Scan-scale tuning for the 1000px synthetic scenes: the production
/// floors assume multi-thousand-pixel scanner output.
fn scan_params() -> DetectorParams {
    DetectorParams {
        min_photo_area: 50_000,
        min_dimension_px: 250,
        min_perimeter_px: 1000,
        min_confidence: 0.5,
        ..DetectorParams::default()
    }
}

fn canvas(w: u32, h: u32, level: u8) -> image::RgbImage {
    image::RgbImage::from_pixel(w, h, image::Rgb([level, level, level]))
}

/// Black-bordered photo with a checkered interior.
fn paint_photo(img: &mut image::RgbImage, x0: u32, y0: u32, w: u32, h: u32) {
    const BORDER: u32 = 10;
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let on_border =
                x < x0 + BORDER || y < y0 + BORDER || x >= x0 + w - BORDER || y >= y0 + h - BORDER;
            let v = if on_border {
                10
            } else if (((x - x0) / 20) + ((y - y0) / 20)) % 2 == 0 {
                100
            } else {
                160
            };
            img.put_pixel(x, y, image::Rgb([v, v, v]));
        }
    }
}

fn save_png(dir: &Path, name: &str, img: &image::RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).expect("save png");
    path
}

#[test]
fn single_bordered_photo_is_found_exactly_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut img = canvas(1000, 1000, 205);
    let target = PixelRect::new(300, 350, 400, 300);
    paint_photo(&mut img, 300, 350, 400, 300);
    let path = save_png(dir.path(), "scan.png", &img);

    let params = scan_params();
    let found = detect_photos(&path, &params);
    assert_eq!(found.len(), 1, "candidates: {found:?}");

    let c = &found[0];
    assert!(
        c.rect.iou(&target) > 0.7,
        "rect {:?} misses target {target:?}",
        c.rect
    );
    assert!((c.rect.x as i64 - 300).abs() <= 15);
    assert!((c.rect.y as i64 - 350).abs() <= 15);
    assert!((c.rect.width as i64 - 400).abs() <= 30);
    assert!((c.rect.height as i64 - 300).abs() <= 30);
    assert!(c.confidence > params.min_confidence && c.confidence <= 1.0);
}

#[test]
fn two_disjoint_photos_yield_two_candidates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut img = canvas(1000, 1000, 205);
    paint_photo(&mut img, 80, 80, 400, 400);
    paint_photo(&mut img, 550, 550, 400, 400);
    let path = save_png(dir.path(), "scan.png", &img);

    let found = detect_photos_fast(&path, &scan_params());
    assert_eq!(found.len(), 2, "candidates: {found:?}");
    assert!(found[0].rect.iou(&found[1].rect) < 0.01);

    for c in &found {
        assert!((0.0..=1.0).contains(&c.confidence));
    }
}

#[test]
fn consolidator_keeps_the_higher_confidence_overlap() {
    let a = PhotoCandidate {
        rect: PixelRect::new(100, 100, 400, 300),
        confidence: 0.91,
        corners: None,
        method: DetectionMethod::Contour,
    };
    let b = PhotoCandidate {
        rect: PixelRect::new(130, 120, 400, 300),
        confidence: 0.74,
        corners: None,
        method: DetectionMethod::Faded,
    };
    assert!(a.rect.iou(&b.rect) > 0.5);

    let out = suppress_overlaps(vec![b, a], 0.5, 15);
    assert_eq!(out.len(), 1);
    assert!((out[0].confidence - 0.91).abs() < 1e-6);
}

#[test]
fn flat_inputs_yield_empty_results() {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, level) in [("white.png", 255u8), ("black.png", 0u8)] {
        let img = canvas(1000, 1000, level);
        let path = save_png(dir.path(), name, &img);
        let found = detect_photos(&path, &scan_params());
        assert!(found.is_empty(), "{name}: {found:?}");
    }
}

#[test]
fn oversize_image_is_rejected_before_processing() {
    let dir = tempfile::tempdir().expect("tempdir");
    // 25.5 MP, above the 25 MP default ceiling
    let img = canvas(5100, 5000, 0);
    let path = save_png(dir.path(), "huge.png", &img);

    let found = detect_photos(&path, &DetectorParams::default());
    assert!(found.is_empty());
}

#[test]
fn missing_file_yields_empty_not_panic() {
    let found = detect_photos("/no/such/scan.png", &DetectorParams::default());
    assert!(found.is_empty());

    let extracted = extract_photos(
        "/no/such/scan.png",
        "/tmp",
        &[PhotoCandidate {
            rect: PixelRect::new(0, 0, 10, 10),
            confidence: 0.5,
            corners: None,
            method: DetectionMethod::Contour,
        }],
        &ExtractorParams::default(),
    );
    assert!(extracted.is_empty());
}

#[test]
fn detection_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut img = canvas(700, 700, 205);
    paint_photo(&mut img, 150, 200, 400, 300);
    let path = save_png(dir.path(), "scan.png", &img);

    let params = scan_params();
    let a = detect_photos_fast(&path, &params);
    let b = detect_photos_fast(&path, &params);
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.rect, y.rect);
        assert_eq!(x.confidence.to_bits(), y.confidence.to_bits());
        assert_eq!(x.method, y.method);
    }
}

fn rotated_photo_scene() -> (image::RgbImage, f32) {
    // 480x320 photo rotated 20 degrees about the canvas center
    let mut img = canvas(1000, 1000, 205);
    let cos = 20f32.to_radians().cos();
    let sin = 20f32.to_radians().sin();
    for y in 0..1000u32 {
        for x in 0..1000u32 {
            let dx = x as f32 - 500.0;
            let dy = y as f32 - 500.0;
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            if u.abs() <= 240.0 && v.abs() <= 160.0 {
                let shade = if u.abs() > 230.0 || v.abs() > 150.0 {
                    10
                } else if (((u + 240.0) as u32 / 20) + ((v + 160.0) as u32 / 20)) % 2 == 0 {
                    100
                } else {
                    160
                };
                img.put_pixel(x, y, image::Rgb([shade, shade, shade]));
            }
        }
    }
    (img, 480.0 / 320.0)
}

#[test]
fn rotated_photo_extracts_with_its_true_aspect() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (img, true_aspect) = rotated_photo_scene();
    let path = save_png(dir.path(), "scan.png", &img);

    let found = detect_photos_fast(&path, &scan_params());
    assert!(!found.is_empty(), "rotated photo not detected");
    let best = found[0].clone();
    assert!(best.corners.is_some(), "no corner points recovered");

    let out_dir = dir.path().join("out");
    let extracted = extract_photos(&path, &out_dir, &[best.clone()], &ExtractorParams::default());
    assert_eq!(extracted.len(), 1);

    let rec = &extracted[0];
    assert!(rec.perspective_corrected, "warp fell back to crop");
    let aspect = rec.width as f32 / rec.height as f32;
    assert!(
        (aspect - true_aspect).abs() < 0.15,
        "aspect {aspect} vs true {true_aspect}"
    );
    // and decidedly NOT the rotated bounding box's aspect
    let bbox_aspect = best.rect.aspect_ratio();
    assert!(
        (aspect - bbox_aspect).abs() > 0.1,
        "aspect {aspect} matches the bbox {bbox_aspect}"
    );
    assert!(rec.path.exists());
}

#[test]
fn extraction_count_never_exceeds_candidates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut img = canvas(700, 700, 205);
    paint_photo(&mut img, 150, 200, 400, 300);
    let path = save_png(dir.path(), "scan.png", &img);

    let candidates = detect_photos_fast(&path, &scan_params());
    assert!(!candidates.is_empty());

    // one valid candidate plus one that cannot be cropped
    let mut submitted = candidates.clone();
    submitted.push(PhotoCandidate {
        rect: PixelRect::new(699, 699, 0, 0),
        confidence: 0.6,
        corners: None,
        method: DetectionMethod::Watershed,
    });

    let out_dir = dir.path().join("out");
    let extracted = extract_photos(&path, &out_dir, &submitted, &ExtractorParams::default());
    assert!(extracted.len() <= submitted.len());
    assert_eq!(extracted.len(), candidates.len());
    for rec in &extracted {
        assert!(rec.path.exists());
        let reloaded = image::open(&rec.path).expect("reload");
        assert_eq!(reloaded.width(), rec.width);
        assert_eq!(reloaded.height(), rec.height);
    }
}
