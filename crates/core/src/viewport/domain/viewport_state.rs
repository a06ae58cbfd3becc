use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Smallest zoom factor the viewport accepts.
pub const MIN_ZOOM: f64 = 0.1;

#[derive(Debug, Error, PartialEq)]
pub enum ViewportError {
    #[error("zoom must be a finite value >= {MIN_ZOOM}, got {0}")]
    InvalidZoom(f64),
    #[error("pan offset must be finite, got ({0}, {1})")]
    InvalidOffset(f64, f64),
}

/// Zoom, pan and mirror settings owned by the camera controller.
///
/// The pipeline only reads it. Offsets are in source pixels and shift the
/// sampled rectangle away from the centre of the source frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    zoom: f64,
    offset: (f64, f64),
    mirrored: bool,
}

impl ViewportState {
    pub fn new(zoom: f64, offset: (f64, f64), mirrored: bool) -> Result<Self, ViewportError> {
        if !zoom.is_finite() || zoom < MIN_ZOOM {
            return Err(ViewportError::InvalidZoom(zoom));
        }
        if !offset.0.is_finite() || !offset.1.is_finite() {
            return Err(ViewportError::InvalidOffset(offset.0, offset.1));
        }
        Ok(Self {
            zoom,
            offset,
            mirrored,
        })
    }

    pub fn identity() -> Self {
        Self {
            zoom: 1.0,
            offset: (0.0, 0.0),
            mirrored: false,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    pub fn mirrored(&self) -> bool {
        self.mirrored
    }

    pub fn with_mirrored(mut self, mirrored: bool) -> Self {
        self.mirrored = mirrored;
        self
    }

    /// No zoom and no pan: the full source is copied straight through.
    /// Mirroring does not affect this.
    pub fn is_passthrough(&self) -> bool {
        self.zoom == 1.0 && self.offset == (0.0, 0.0)
    }

    /// Clamps the pan offset so the sampled rectangle stays inside a source of
    /// the given size. When zoomed out (sample larger than source) no offset
    /// keeps it inside, so the offset collapses to zero on that axis.
    pub fn clamped_to(&self, source_width: u32, source_height: u32) -> Self {
        let max_x = max_offset(source_width as f64, self.zoom);
        let max_y = max_offset(source_height as f64, self.zoom);
        Self {
            offset: (
                self.offset.0.clamp(-max_x, max_x),
                self.offset.1.clamp(-max_y, max_y),
            ),
            ..*self
        }
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::identity()
    }
}

fn max_offset(source_size: f64, zoom: f64) -> f64 {
    ((source_size - source_size / zoom) / 2.0).max(0.0)
}

/// Shared viewport settings: the controller writes, the frame loop reads a
/// copy once per frame.
#[derive(Clone, Debug, Default)]
pub struct ViewportHandle {
    state: Arc<Mutex<ViewportState>>,
}

impl ViewportHandle {
    pub fn new(state: ViewportState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn get(&self) -> ViewportState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, state: ViewportState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}
