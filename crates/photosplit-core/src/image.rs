#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0)
    }

    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn as_view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Interleaved RGB raster, 3 bytes per pixel, row-major.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // len = w*h*3
}

#[derive(Clone, Debug)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbImage {
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap an existing interleaved buffer. Returns `None` when the
    /// buffer length does not match `width * height * 3`.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        if data.len() != width * height * 3 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn as_view(&self) -> RgbImageView<'_> {
        RgbImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

#[inline]
fn get_rgb(src: &RgbImageView<'_>, x: i32, y: i32, fill: [u8; 3]) -> [u8; 3] {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return fill;
    }
    let i = (y as usize * src.width + x as usize) * 3;
    [src.data[i], src.data[i + 1], src.data[i + 2]]
}

/// Bilinear RGB sample. Taps outside the source use `fill`, so warps
/// that reach past the image boundary blend toward the fill color.
#[inline]
pub fn sample_bilinear_rgb(src: &RgbImageView<'_>, x: f32, y: f32, fill: [u8; 3]) -> [u8; 3] {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb(src, x0, y0, fill);
    let p10 = get_rgb(src, x0 + 1, y0, fill);
    let p01 = get_rgb(src, x0, y0 + 1, fill);
    let p11 = get_rgb(src, x0 + 1, y0 + 1, fill);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let a = p00[c] as f32 + fx * (p10[c] as f32 - p00[c] as f32);
        let b = p01[c] as f32 + fx * (p11[c] as f32 - p01[c] as f32);
        out[c] = (a + fy * (b - a)).clamp(0.0, 255.0) as u8;
    }
    out
}

/// Rec.601 luminance projection.
pub fn to_luma(src: &RgbImageView<'_>) -> GrayImage {
    let mut data = Vec::with_capacity(src.width * src.height);
    for px in src.data.chunks_exact(3) {
        let l = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
        data.push(l.clamp(0.0, 255.0) as u8);
    }
    GrayImage {
        width: src.width,
        height: src.height,
        data,
    }
}

/// Bilinear resize of an RGB raster. Degenerate target sizes collapse
/// to a 1x1 output rather than panicking.
pub fn resize_bilinear_rgb(src: &RgbImageView<'_>, out_w: usize, out_h: usize) -> RgbImage {
    let out_w = out_w.max(1);
    let out_h = out_h.max(1);
    let sx = src.width as f32 / out_w as f32;
    let sy = src.height as f32 / out_h as f32;

    let mut data = Vec::with_capacity(out_w * out_h * 3);
    for y in 0..out_h {
        for x in 0..out_w {
            // sample at source pixel centers
            let fx = (x as f32 + 0.5) * sx - 0.5;
            let fy = (y as f32 + 0.5) * sy - 0.5;
            let px = sample_bilinear_rgb(src, fx.max(0.0), fy.max(0.0), [0, 0, 0]);
            data.extend_from_slice(&px);
        }
    }
    RgbImage {
        width: out_w,
        height: out_h,
        data,
    }
}
