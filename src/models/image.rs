//! Raster buffers shared by every stage
//!
//! All buffers are row-major (`index = y * width + x`) and keep the extent
//! they were created with. `Default` builds the fixed 950x950 extent that
//! the bitmap tools accept.

use crate::error::{CellScanError, Result};

/// Fixed image width in pixels
pub const IMAGE_WIDTH: usize = 950;
/// Fixed image height in pixels
pub const IMAGE_HEIGHT: usize = 950;
/// Channels in a color image
pub const RGB_CHANNELS: usize = 3;

/// Pure red, the default marker color
pub const RED: [u8; RGB_CHANNELS] = [255, 0, 0];

/// Three-channel 8-bit image with interleaved RGB samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl ColorImage {
    /// Create a black image of the given extent
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * RGB_CHANNELS],
        }
    }

    /// Wrap raw RGB bytes (3 bytes per pixel)
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width * height * RGB_CHANNELS;
        if data.len() != expected {
            return Err(CellScanError::InvalidDataLength(data.len(), expected));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.height
    }

    /// (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Get the RGB triple at (x, y), black when out of bounds
    pub fn get(&self, x: usize, y: usize) -> [u8; RGB_CHANNELS] {
        if x >= self.width || y >= self.height {
            return [0; RGB_CHANNELS];
        }
        let idx = (y * self.width + x) * RGB_CHANNELS;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Set the RGB triple at (x, y); out-of-bounds writes are ignored
    pub fn set(&mut self, x: usize, y: usize, rgb: [u8; RGB_CHANNELS]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y * self.width + x) * RGB_CHANNELS;
        self.data[idx..idx + RGB_CHANNELS].copy_from_slice(&rgb);
    }

    /// Set a pixel addressed with signed coordinates, clipping anything outside
    pub fn set_clipped(&mut self, x: isize, y: isize, rgb: [u8; RGB_CHANNELS]) {
        if x < 0 || y < 0 {
            return;
        }
        self.set(x as usize, y as usize, rgb);
    }

    /// Raw interleaved bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw interleaved bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the image and return its bytes
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

impl Default for ColorImage {
    fn default() -> Self {
        Self::new(IMAGE_WIDTH, IMAGE_HEIGHT)
    }
}

/// Single-channel 8-bit intensity image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImage {
    /// Create a black image of the given extent
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0)
    }

    /// Create an image where every pixel has `value`
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap raw intensity bytes (1 byte per pixel)
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width * height;
        if data.len() != expected {
            return Err(CellScanError::InvalidDataLength(data.len(), expected));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.height
    }

    /// (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Intensity at (x, y), 0 when out of bounds
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y * self.width + x]
    }

    /// Set the intensity at (x, y); out-of-bounds writes are ignored
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.data[y * self.width + x] = value;
    }

    /// Raw intensities
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw intensities
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Default for GrayImage {
    fn default() -> Self {
        Self::new(IMAGE_WIDTH, IMAGE_HEIGHT)
    }
}

/// Bit-packed binary image where a set bit is a white (255) pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryImage {
    /// Create an all-black binary image
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Create an all-white binary image
    pub fn white(width: usize, height: usize) -> Self {
        let mut image = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                image.set(x, y, true);
            }
        }
        image
    }

    /// Image width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height
    pub fn height(&self) -> usize {
        self.height
    }

    /// (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// True if (x, y) is white; out of bounds reads as black
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Look up a pixel with signed coordinates; `None` when outside the image
    #[inline]
    pub fn sample(&self, x: isize, y: isize) -> Option<bool> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.get(x as usize, y as usize))
    }

    /// True only for an in-bounds white pixel
    #[inline]
    pub fn is_white_at(&self, x: isize, y: isize) -> bool {
        self.sample(x, y).unwrap_or(false)
    }

    /// Set (x, y) to white (`true`) or black; out-of-bounds writes are ignored
    pub fn set(&mut self, x: usize, y: usize, white: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        if white {
            self.data[byte_index] |= 1 << bit_index;
        } else {
            self.data[byte_index] &= !(1 << bit_index);
        }
    }

    /// Blacken a pixel addressed with signed coordinates, clipping outside
    #[inline]
    pub fn clear_at(&mut self, x: isize, y: isize) {
        if x < 0 || y < 0 {
            return;
        }
        self.set(x as usize, y as usize, false);
    }

    /// Intensity view of a pixel: 255 for white, 0 for black
    pub fn intensity(&self, x: usize, y: usize) -> u8 {
        if self.get(x, y) { 255 } else { 0 }
    }

    /// Set every pixel to black
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Number of white pixels
    pub fn count_white(&self) -> usize {
        let full_bits = self.width * self.height;
        let mut count: usize = self.data.iter().map(|b| b.count_ones() as usize).sum();
        // bits past the last pixel are never set by `set`, but be exact anyway
        if full_bits % 8 != 0 {
            if let Some(last) = self.data.last() {
                let valid = full_bits % 8;
                count -= (last >> valid).count_ones() as usize;
            }
        }
        count
    }

    /// Expand to a 0/255 grayscale image
    pub fn to_gray(&self) -> GrayImage {
        let mut gray = GrayImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                gray.set(x, y, self.intensity(x, y));
            }
        }
        gray
    }

    /// Raw packed bits
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Default for BinaryImage {
    fn default() -> Self {
        Self::new(IMAGE_WIDTH, IMAGE_HEIGHT)
    }
}
