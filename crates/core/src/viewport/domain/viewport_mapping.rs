use super::viewport_state::ViewportState;

/// Target rectangle inside the destination buffer, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DestRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl DestRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Region of the source frame that gets stretched over the destination.
/// May extend past the source bounds when zoomed out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Affine mapping from destination pixels back to source coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMapping {
    pub sample: SampleRect,
    pub dest: DestRect,
    pub mirrored: bool,
    pub passthrough: bool,
}

impl ViewportMapping {
    pub fn compute(
        dest: DestRect,
        source_width: u32,
        source_height: u32,
        state: &ViewportState,
    ) -> Self {
        let src_w = source_width as f64;
        let src_h = source_height as f64;

        let sample = if state.is_passthrough() {
            SampleRect {
                x: 0.0,
                y: 0.0,
                width: src_w,
                height: src_h,
            }
        } else {
            let width = src_w / state.zoom();
            let height = src_h / state.zoom();
            let (off_x, off_y) = state.offset();
            // Whole-pixel origin keeps the sampled grid fixed while panning,
            // otherwise masks shimmer against sub-pixel resampling.
            SampleRect {
                x: ((src_w - width) / 2.0 + off_x).round(),
                y: ((src_h - height) / 2.0 + off_y).round(),
                width,
                height,
            }
        };

        Self {
            sample,
            dest,
            mirrored: state.mirrored(),
            passthrough: state.is_passthrough(),
        }
    }

    /// Source coordinate sampled by the centre of destination pixel
    /// `(col, row)`, both relative to the destination rectangle.
    ///
    /// Mirroring flips columns about the rectangle's vertical centre line.
    pub fn source_point(&self, col: u32, row: u32) -> (f64, f64) {
        let col = if self.mirrored {
            self.dest.width - 1 - col
        } else {
            col
        };
        let sx = self.sample.x
            + (col as f64 + 0.5) * self.sample.width / self.dest.width as f64
            - 0.5;
        let sy = self.sample.y
            + (row as f64 + 0.5) * self.sample.height / self.dest.height as f64
            - 0.5;
        (sx, sy)
    }

    /// Zoom or pan can leave margins that must be filled first.
    pub fn needs_background(&self) -> bool {
        !self.passthrough
    }
}
