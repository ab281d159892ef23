//! Synthetic scene builders shared by the strategy tests.

use photosplit_core::{PixelRect, RgbImage};

pub fn set_px(img: &mut RgbImage, x: usize, y: usize, v: [u8; 3]) {
    let i = (y * img.width + x) * 3;
    img.data[i] = v[0];
    img.data[i + 1] = v[1];
    img.data[i + 2] = v[2];
}

/// Light scanner-bed canvas holding one black-bordered photo with a
/// gently textured interior.
pub fn bordered_photo_scene(w: usize, h: usize, rect: PixelRect) -> RgbImage {
    let mut img = RgbImage::filled(w, h, [205, 205, 205]);
    paint_bordered_photo(&mut img, rect);
    img
}

pub fn paint_bordered_photo(img: &mut RgbImage, rect: PixelRect) {
    let x0 = rect.x as usize;
    let y0 = rect.y as usize;
    let x1 = rect.right() as usize;
    let y1 = rect.bottom() as usize;
    const BORDER: usize = 4;

    for y in y0..y1 {
        for x in x0..x1 {
            let on_border =
                x < x0 + BORDER || y < y0 + BORDER || x >= x1 - BORDER || y >= y1 - BORDER;
            let v = if on_border {
                [10, 10, 10]
            } else if ((x - x0) / 10 + (y - y0) / 10) % 2 == 0 {
                [100, 100, 100]
            } else {
                [160, 160, 160]
            };
            set_px(img, x, y, v);
        }
    }
}
