use crate::shared::frame::Frame;

use super::landmark::NormalizedLandmark;

/// Landmarks of one face exactly as a detector reported them.
pub type RawFace = Vec<NormalizedLandmark>;

/// Domain interface for a blocking face-landmark detector.
///
/// Implementations may keep tracking state between calls, hence `&mut self`.
/// `timestamp_ms` increases monotonically across calls.
pub trait LandmarkDetector: Send {
    fn detect(
        &mut self,
        frame: &Frame,
        timestamp_ms: f64,
    ) -> Result<Vec<RawFace>, Box<dyn std::error::Error>>;
}

/// Domain interface for a fire-and-forget detector.
///
/// `submit` returns immediately. Results are delivered later through the
/// inbox the detector was constructed with. Returns `Ok(false)` when the
/// detector is still busy and the frame was dropped.
pub trait AsyncLandmarkDetector: Send {
    fn submit(&mut self, frame: &Frame, timestamp_ms: f64)
        -> Result<bool, Box<dyn std::error::Error>>;
}
