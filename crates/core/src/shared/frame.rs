use ndarray::{ArrayView3, ArrayViewMut3};

use super::color::Rgba;

/// A raster buffer: contiguous RGB or RGBA bytes in row-major order.
///
/// Source frames arrive at camera resolution; the compositor keeps one
/// destination frame alive for the whole session and only reshapes it when
/// the display size changes.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Zero-filled frame (black for RGB, transparent for RGBA).
    pub fn blank(width: u32, height: u32, channels: u8) -> Self {
        let len = (width as usize) * (height as usize) * (channels as usize);
        Self::new(vec![0; len], width, height, channels, 0)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Reshapes the buffer in place. Returns `false` (and touches nothing)
    /// when the dimensions already match, so callers can call it every frame.
    pub fn reshape(&mut self, width: u32, height: u32, channels: u8) -> bool {
        if self.width == width && self.height == height && self.channels == channels {
            return false;
        }
        let len = (width as usize) * (height as usize) * (channels as usize);
        self.data.clear();
        self.data.resize(len, 0);
        self.width = width;
        self.height = height;
        self.channels = channels;
        true
    }

    /// Byte offset of pixel `(x, y)`.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * self.channels as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let off = self.offset(x, y);
        &self.data[off..off + self.channels as usize]
    }

    /// Writes `color` at `(x, y)`; out-of-bounds coordinates are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let off = self.offset(x as u32, y as u32);
        let c = self.channels as usize;
        self.data[off..off + c].copy_from_slice(&color.0[..c]);
    }

    /// Fills the rectangle clipped to the frame bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        let c = self.channels as usize;
        for row in y..y_end {
            for col in x..x_end {
                let off = self.offset(col, row);
                self.data[off..off + c].copy_from_slice(&color.0[..c]);
            }
        }
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
