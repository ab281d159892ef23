use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle in source-image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }

    #[inline]
    pub fn perimeter(&self) -> u32 {
        2 * (self.width + self.height)
    }

    /// One past the rightmost column.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottommost row.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn intersection_area(&self, other: &PixelRect) -> u64 {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return 0;
        }
        (x1 - x0) as u64 * (y1 - y0) as u64
    }

    /// Intersection over union; 0.0 for disjoint rectangles and for the
    /// degenerate zero-area case.
    pub fn iou(&self, other: &PixelRect) -> f32 {
        let inter = self.intersection_area(other);
        let union = self.area() + other.area() - inter;
        if union == 0 {
            return 0.0;
        }
        inter as f32 / union as f32
    }
}
