use crate::masking::domain::face_geometry::PixelRect;
use crate::shared::frame::Frame;

/// Smallest edge the scratch buffer is ever allocated with.
pub const MIN_SCRATCH_EDGE: u32 = 100;
/// Past this edge, a much smaller request releases the buffer.
pub const MAX_RETAINED_EDGE: u32 = 2000;

/// Reusable off-screen copy of one face region.
///
/// Grows when a region does not fit and shrinks only when it holds an
/// edge above [`MAX_RETAINED_EDGE`] while the request needs less than half
/// of that, so sizes bouncing around between frames do not reallocate.
pub struct ScratchBuffer {
    data: Vec<u8>,
    capacity_w: u32,
    capacity_h: u32,
    channels: u8,
    reallocations: usize,
}

impl ScratchBuffer {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            capacity_w: 0,
            capacity_h: 0,
            channels: 0,
            reallocations: 0,
        }
    }

    /// Makes room for a `width` x `height` region. Returns `true` when
    /// this reallocated.
    pub fn ensure(&mut self, width: u32, height: u32, channels: u8) -> bool {
        let too_small = self.capacity_w < width || self.capacity_h < height;
        let oversized = (self.capacity_w > MAX_RETAINED_EDGE && width < MAX_RETAINED_EDGE / 2)
            || (self.capacity_h > MAX_RETAINED_EDGE && height < MAX_RETAINED_EDGE / 2);
        if !(too_small || oversized || self.channels != channels) {
            return false;
        }

        self.capacity_w = width.max(MIN_SCRATCH_EDGE);
        self.capacity_h = height.max(MIN_SCRATCH_EDGE);
        self.channels = channels;
        let len = self.capacity_w as usize * self.capacity_h as usize * channels as usize;
        self.data = vec![0; len];
        self.reallocations += 1;
        log::debug!(
            "Scratch buffer reallocated to {}x{} for a {}x{} region",
            self.capacity_w,
            self.capacity_h,
            width,
            height
        );
        true
    }

    pub fn capacity(&self) -> (u32, u32) {
        (self.capacity_w, self.capacity_h)
    }

    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    /// Copies `rect` out of `frame`, tightly packed, and returns the copy.
    pub fn extract(&mut self, frame: &Frame, rect: PixelRect) -> &mut [u8] {
        let channels = frame.channels();
        self.ensure(rect.width, rect.height, channels);
        let row_len = rect.width as usize * channels as usize;
        let src = frame.data();
        for row in 0..rect.height {
            let src_off = frame.offset(rect.x, rect.y + row);
            let dst_off = row as usize * row_len;
            self.data[dst_off..dst_off + row_len].copy_from_slice(&src[src_off..src_off + row_len]);
        }
        &mut self.data[..row_len * rect.height as usize]
    }

    /// Writes the region last extracted for `rect` back into `frame`.
    pub fn write_back(&self, frame: &mut Frame, rect: PixelRect) {
        let row_len = rect.width as usize * frame.channels() as usize;
        for row in 0..rect.height {
            let dst_off = frame.offset(rect.x, rect.y + row);
            let src_off = row as usize * row_len;
            frame.data_mut()[dst_off..dst_off + row_len].copy_from_slice(&self.data[src_off..src_off + row_len]);
        }
    }

    /// The region last extracted, read-only.
    pub fn region(&self, rect: PixelRect, channels: u8) -> &[u8] {
        &self.data[..rect.width as usize * rect.height as usize * channels as usize]
    }
}

impl Default for ScratchBuffer {
    fn default() -> Self {
        Self::new()
    }
}
