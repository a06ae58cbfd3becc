use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::detection::domain::detection_error::DetectionError;
use crate::detection::domain::face_detector::{LandmarkDetector, RawFace};
use crate::shared::frame::Frame;

/// Frame index to the faces detected in that frame.
pub type DetectionScript = HashMap<usize, Vec<RawFace>>;

/// Replays recorded landmark sets by frame index.
///
/// The script is JSON keyed by frame index:
///
/// ```json
/// { "0": [[{"x": 0.4, "y": 0.4}, {"x": 0.6, "y": 0.4}]], "1": [] }
/// ```
///
/// Frames missing from the script report no faces.
pub struct ReplayLandmarkDetector {
    script: Arc<DetectionScript>,
}

impl ReplayLandmarkDetector {
    pub fn from_script(script: Arc<DetectionScript>) -> Self {
        Self { script }
    }

    pub fn from_json(json: &str) -> Result<Self, DetectionError> {
        let script: DetectionScript = serde_json::from_str(json).map_err(DetectionError::ScriptParse)?;
        Ok(Self::from_script(Arc::new(script)))
    }

    pub fn load(path: &Path) -> Result<Self, DetectionError> {
        let json = std::fs::read_to_string(path).map_err(|source| DetectionError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;
        let detector = Self::from_json(&json)?;
        log::info!(
            "Loaded detection script {} ({} frames)",
            path.display(),
            detector.script.len()
        );
        Ok(detector)
    }
}

impl LandmarkDetector for ReplayLandmarkDetector {
    fn detect(
        &mut self,
        frame: &Frame,
        _timestamp_ms: f64,
    ) -> Result<Vec<RawFace>, Box<dyn std::error::Error>> {
        Ok(self.script.get(&frame.index()).cloned().unwrap_or_default())
    }
}
