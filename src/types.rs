// Core value types shared by the decoder, labels and the frame loop.

use std::ops::{Add, Sub};

/// A position in panel pixels. Signed so drag deltas can be negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Decoded image in the surface's channel order: B, G, R, A per pixel.
#[derive(Clone, Debug)]
pub struct PixelImage {
    pub width: u32,
    pub height: u32,
    pub stride: usize,   // bytes per row, >= width * 4
    pub pixels: Vec<u8>, // length = stride * height
}

impl PixelImage {
    /// One scanline, without any row padding.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.pixels[start..start + self.width as usize * 4]
    }
}

/// The overlay panel's own buffer: B, G, R, A bytes, `stride` bytes per row.
#[derive(Clone, Debug)]
pub struct FrameSurface {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub pixels: Vec<u8>,
}

impl FrameSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, stride: width * 4, pixels: vec![0u8; width * 4 * height] }
    }

    /// Paint every pixel with one BGRA colour.
    pub fn fill(&mut self, bgra: [u8; 4]) {
        for y in 0..self.height {
            let row = &mut self.pixels[y * self.stride..y * self.stride + self.width * 4];
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&bgra);
            }
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = y * self.stride + x * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

/// What minifb wants: one 0x00RRGGBB word per pixel.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_covers_every_pixel() {
        let mut frame = FrameSurface::new(3, 2);
        frame.fill([0x30, 0x30, 0x30, 0xa0]);
        assert_eq!(frame.pixels.len(), 24);
        assert!(frame.pixels.chunks_exact(4).all(|p| p == [0x30, 0x30, 0x30, 0xa0]));
    }

    #[test]
    fn point_arithmetic() {
        assert_eq!(Point::new(15, 12) - Point::new(10, 10), Point::new(5, 2));
        assert_eq!(Point::new(1, -1) + Point::new(2, 3), Point::new(3, 2));
    }
}
