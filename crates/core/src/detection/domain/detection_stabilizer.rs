use std::sync::Arc;

use crate::shared::constants::DEFAULT_HOLD_WINDOW_MS;

use super::face_record::FaceRecord;

/// Outcome of offering one candidate set to the stabilizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StabilizerDecision {
    /// Same count as the trusted set; positions refreshed.
    Refreshed,
    /// Count differed and the hold window had elapsed; the new count is trusted.
    Changed,
    /// Count differed inside the hold window; trusted set untouched.
    Rejected,
}

/// Count-based hysteresis over detector output.
///
/// A candidate set with the trusted face count always replaces the trusted
/// set. A candidate set with a different count replaces it only once at
/// least `hold_window_ms` has passed since the last acceptance, so a face
/// that drops out for a few frames stays masked with its last known
/// geometry.
///
/// The trusted set is handed out as an `Arc` snapshot: replacing it never
/// disturbs a renderer still iterating the previous one.
pub struct DetectionStabilizer {
    hold_window_ms: f64,
    trusted: Arc<Vec<FaceRecord>>,
    last_accepted_ms: Option<f64>,
}

impl DetectionStabilizer {
    pub fn new(hold_window_ms: f64) -> Self {
        Self {
            hold_window_ms,
            trusted: Arc::new(Vec::new()),
            last_accepted_ms: None,
        }
    }

    /// Starts from an already-trusted set accepted at `accepted_ms`.
    pub fn with_trusted(hold_window_ms: f64, faces: Vec<FaceRecord>, accepted_ms: f64) -> Self {
        Self {
            hold_window_ms,
            trusted: Arc::new(faces),
            last_accepted_ms: Some(accepted_ms),
        }
    }

    pub fn hold_window_ms(&self) -> f64 {
        self.hold_window_ms
    }

    pub fn offer(&mut self, candidates: &[FaceRecord], now_ms: f64) -> StabilizerDecision {
        let decision = match self.last_accepted_ms {
            None => StabilizerDecision::Changed,
            Some(_) if candidates.len() == self.trusted.len() => StabilizerDecision::Refreshed,
            Some(last) if now_ms - last >= self.hold_window_ms => StabilizerDecision::Changed,
            Some(_) => StabilizerDecision::Rejected,
        };

        match decision {
            StabilizerDecision::Rejected => {
                log::debug!(
                    "Rejected {} candidate face(s), keeping {} trusted",
                    candidates.len(),
                    self.trusted.len()
                );
            }
            StabilizerDecision::Refreshed => {
                self.accept(candidates, now_ms);
            }
            StabilizerDecision::Changed => {
                log::debug!(
                    "Trusted face count {} -> {} at {:.0} ms",
                    self.trusted.len(),
                    candidates.len(),
                    now_ms
                );
                self.accept(candidates, now_ms);
            }
        }
        decision
    }

    fn accept(&mut self, candidates: &[FaceRecord], now_ms: f64) {
        // An unchanged empty set needs no new allocation.
        if !(candidates.is_empty() && self.trusted.is_empty()) {
            self.trusted = Arc::new(candidates.to_vec());
        }
        self.last_accepted_ms = Some(now_ms);
    }

    pub fn snapshot(&self) -> Arc<Vec<FaceRecord>> {
        Arc::clone(&self.trusted)
    }

    pub fn trusted_count(&self) -> usize {
        self.trusted.len()
    }

    pub fn last_accepted_ms(&self) -> Option<f64> {
        self.last_accepted_ms
    }
}

impl Default for DetectionStabilizer {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_WINDOW_MS)
    }
}
