use thiserror::Error;

use crate::detection::domain::detection_error::DetectionError;
use crate::detection::domain::face_record::LandmarkLayout;
use crate::detection::infrastructure::face_detection_adapter::{
    BackendLoadResult, DetectorBackend, FaceDetectionAdapter,
};
use crate::masking::domain::mask_style::{MaskStyle, EYE_EXTENSION_RANGE};
use crate::shared::constants::{DEFAULT_FRAME_BUDGET_MS, DEFAULT_HOLD_WINDOW_MS, HOLD_WINDOW_RANGE_MS};
use crate::viewport::infrastructure::viewport_renderer::{BackgroundFill, Resampling};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("detection interval must be at least 1")]
    ZeroInterval,
    #[error(
        "hold window must be within {lo}..={hi} ms, got {0}",
        lo = HOLD_WINDOW_RANGE_MS.0,
        hi = HOLD_WINDOW_RANGE_MS.1
    )]
    HoldWindow(f64),
    #[error(
        "eye extension must be within {lo}..={hi}, got {0}",
        lo = EYE_EXTENSION_RANGE.0,
        hi = EYE_EXTENSION_RANGE.1
    )]
    EyeExtension(f64),
    #[error("{name} must be a finite, non-negative coefficient, got {value}")]
    Coefficient { name: &'static str, value: f64 },
    #[error("frame budget must be positive, got {0} ms")]
    FrameBudget(f64),
    #[error("destination must not be empty, got {0}x{1}")]
    EmptyDestination(u32, u32),
    #[error("destination must have 3 or 4 channels, got {0}")]
    Channels(u8),
    #[error(transparent)]
    Detection(#[from] DetectionError),
}

/// Everything the compositor needs to know up front.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositorConfig {
    pub detection_enabled: bool,
    /// Invoke the detector on every n-th frame.
    pub detect_interval: usize,
    pub hold_window_ms: f64,
    /// A frame that takes longer than this skips the next detection call.
    pub frame_budget_ms: f64,
    pub landmark_layout: LandmarkLayout,
    pub mask_style: MaskStyle,
    pub background: BackgroundFill,
    pub resampling: Resampling,
    /// Display size; `None` follows the source frame.
    pub output_size: Option<(u32, u32)>,
    pub output_channels: u8,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            detection_enabled: true,
            detect_interval: 1,
            hold_window_ms: DEFAULT_HOLD_WINDOW_MS,
            frame_budget_ms: DEFAULT_FRAME_BUDGET_MS,
            landmark_layout: LandmarkLayout::default(),
            mask_style: MaskStyle::default(),
            background: BackgroundFill::default(),
            resampling: Resampling::default(),
            output_size: None,
            output_channels: 3,
        }
    }
}

impl CompositorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detect_interval < 1 {
            return Err(ConfigError::ZeroInterval);
        }
        let (lo, hi) = HOLD_WINDOW_RANGE_MS;
        if !(lo..=hi).contains(&self.hold_window_ms) {
            return Err(ConfigError::HoldWindow(self.hold_window_ms));
        }
        let (lo, hi) = EYE_EXTENSION_RANGE;
        if !(lo..=hi).contains(&self.mask_style.eye_extension) {
            return Err(ConfigError::EyeExtension(self.mask_style.eye_extension));
        }
        let style = &self.mask_style;
        for (name, value) in [
            ("eye_thickness", style.eye_thickness),
            ("face_padding", style.face_padding),
            ("blur_radius", style.blur_radius),
            ("mosaic_block", style.mosaic_block),
            ("outline_width", style.outline_width),
            ("label_size", style.label_size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Coefficient { name, value });
            }
        }
        if !(self.frame_budget_ms > 0.0) {
            return Err(ConfigError::FrameBudget(self.frame_budget_ms));
        }
        if let Some((w, h)) = self.output_size {
            if w == 0 || h == 0 {
                return Err(ConfigError::EmptyDestination(w, h));
            }
        }
        if !matches!(self.output_channels, 3 | 4) {
            return Err(ConfigError::Channels(self.output_channels));
        }
        Ok(())
    }

    /// Adapter around a detector that is ready now. Disabled detection
    /// ignores the backend.
    pub fn adapter(&self, backend: DetectorBackend) -> Result<FaceDetectionAdapter, ConfigError> {
        if !self.detection_enabled {
            return Ok(FaceDetectionAdapter::disabled());
        }
        Ok(FaceDetectionAdapter::new(
            backend,
            self.landmark_layout,
            self.detect_interval,
        )?)
    }

    /// Adapter whose detector is loaded in the background.
    pub fn loading_adapter<F>(&self, loader: F) -> Result<FaceDetectionAdapter, ConfigError>
    where
        F: FnOnce() -> BackendLoadResult + Send + 'static,
    {
        if !self.detection_enabled {
            return Ok(FaceDetectionAdapter::disabled());
        }
        Ok(FaceDetectionAdapter::initializing(
            loader,
            self.landmark_layout,
            self.detect_interval,
        )?)
    }
}
