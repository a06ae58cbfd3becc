use serde::{Deserialize, Serialize};

/// A detector landmark in frame-relative coordinates: `(0, 0)` is the
/// top-left corner, `(1, 1)` the bottom-right.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLandmark {
    pub x: f64,
    pub y: f64,
}

impl NormalizedLandmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Pixel position in a buffer of the given size.
    pub fn to_pixel(&self, width: u32, height: u32) -> (f64, f64) {
        (self.x * width as f64, self.y * height as f64)
    }
}
