use std::path::PathBuf;

/// Describes a frame stream: native resolution, cadence and length.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub source_path: Option<PathBuf>,
}

impl StreamMetadata {
    /// Presentation timestamp of frame `index` in milliseconds.
    ///
    /// Streams without a cadence (`fps <= 0`, e.g. a single still) report 0.
    pub fn timestamp_ms(&self, index: usize) -> f64 {
        if self.fps > 0.0 {
            index as f64 * 1000.0 / self.fps
        } else {
            0.0
        }
    }
}
