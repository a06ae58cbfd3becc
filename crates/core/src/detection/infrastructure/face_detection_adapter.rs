use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

use crate::detection::domain::detection_error::DetectionError;
use crate::detection::domain::face_detector::{AsyncLandmarkDetector, LandmarkDetector, RawFace};
use crate::detection::domain::face_record::{FaceRecord, LandmarkLayout};
use crate::shared::frame::Frame;

use super::detection_inbox::{Delivery, DetectionInbox};

/// The two ways a detector can be wired in.
pub enum DetectorBackend {
    /// Called inline; returns landmarks for the frame it was given.
    Blocking(Box<dyn LandmarkDetector>),
    /// Fire-and-forget; results show up in `inbox` some frames later.
    Async {
        detector: Box<dyn AsyncLandmarkDetector>,
        inbox: DetectionInbox,
    },
}

pub type BackendLoadResult = Result<DetectorBackend, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdapterStatus {
    Initializing,
    Ready,
    Disabled,
}

enum AdapterState {
    Initializing(Receiver<BackendLoadResult>),
    Ready(DetectorBackend),
    Disabled,
}

/// Feeds frames to a landmark detector and normalises what comes back.
///
/// The detector is invoked on every `interval`-th frame; in between, the
/// last received faces are returned. Detector failures read as "no faces"
/// and faces with too few landmarks are dropped, both with a warning.
pub struct FaceDetectionAdapter {
    state: AdapterState,
    layout: LandmarkLayout,
    interval: usize,
    frame_count: usize,
    latest: Vec<FaceRecord>,
}

impl FaceDetectionAdapter {
    pub fn new(
        backend: DetectorBackend,
        layout: LandmarkLayout,
        interval: usize,
    ) -> Result<Self, DetectionError> {
        Self::with_state(AdapterState::Ready(backend), layout, interval)
    }

    /// Loads the detector on a background thread. Frames analysed before it
    /// reports back get no detection; a failed load disables detection for
    /// the adapter's lifetime.
    pub fn initializing<F>(
        loader: F,
        layout: LandmarkLayout,
        interval: usize,
    ) -> Result<Self, DetectionError>
    where
        F: FnOnce() -> BackendLoadResult + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);
        std::thread::spawn(move || {
            // The adapter may be gone by now; nothing to report to.
            let _ = tx.send(loader());
        });
        Self::with_state(AdapterState::Initializing(rx), layout, interval)
    }

    /// An adapter that never detects anything.
    pub fn disabled() -> Self {
        Self {
            state: AdapterState::Disabled,
            layout: LandmarkLayout::default(),
            interval: 1,
            frame_count: 0,
            latest: Vec::new(),
        }
    }

    fn with_state(
        state: AdapterState,
        layout: LandmarkLayout,
        interval: usize,
    ) -> Result<Self, DetectionError> {
        if interval < 1 {
            return Err(DetectionError::InvalidInterval);
        }
        Ok(Self {
            state,
            layout,
            interval,
            frame_count: 0,
            latest: Vec::new(),
        })
    }

    pub fn status(&self) -> AdapterStatus {
        match self.state {
            AdapterState::Initializing(_) => AdapterStatus::Initializing,
            AdapterState::Ready(_) => AdapterStatus::Ready,
            AdapterState::Disabled => AdapterStatus::Disabled,
        }
    }

    /// Blocks up to `timeout` for a pending load to finish. Returns whether
    /// the adapter ended up ready.
    pub fn wait_until_ready(&mut self, timeout: Duration) -> bool {
        if let AdapterState::Initializing(rx) = &self.state {
            let outcome = match rx.recv_timeout(timeout) {
                Ok(result) => Some(result),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => Some(Err("detector loader exited".into())),
            };
            if let Some(result) = outcome {
                self.finish_initialization(result);
            }
        }
        self.status() == AdapterStatus::Ready
    }

    fn poll_initialization(&mut self) {
        if let AdapterState::Initializing(rx) = &self.state {
            let result = match rx.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => Err("detector loader exited".into()),
            };
            self.finish_initialization(result);
        }
    }

    fn finish_initialization(&mut self, result: BackendLoadResult) {
        self.state = match result {
            Ok(backend) => {
                log::info!("Face detector ready");
                AdapterState::Ready(backend)
            }
            Err(e) => {
                log::warn!("Face detector failed to initialize, running without detection: {e}");
                AdapterState::Disabled
            }
        };
    }

    /// Faces for `frame`, possibly from an earlier frame.
    ///
    /// `allow_invoke = false` skips the detector call for this frame even if
    /// the interval is due; the previous result is returned.
    pub fn analyze(&mut self, frame: &Frame, timestamp_ms: f64, allow_invoke: bool) -> &[FaceRecord] {
        self.poll_initialization();

        let due = self.frame_count % self.interval == 0;
        self.frame_count += 1;

        let layout = self.layout;
        let mut fresh: Option<Result<Vec<RawFace>, String>> = None;

        match &mut self.state {
            AdapterState::Ready(DetectorBackend::Blocking(detector)) => {
                if due && allow_invoke {
                    fresh = Some(detector.detect(frame, timestamp_ms).map_err(|e| e.to_string()));
                }
            }
            AdapterState::Ready(DetectorBackend::Async { detector, inbox }) => {
                if let Some(Delivery { faces, .. }) = inbox.take_latest() {
                    fresh = Some(faces);
                }
                if due && allow_invoke {
                    if let Err(e) = detector.submit(frame, timestamp_ms) {
                        fresh = Some(Err(format!("detector rejected frame {}: {e}", frame.index())));
                    }
                }
            }
            AdapterState::Initializing(_) | AdapterState::Disabled => {}
        }

        if let Some(result) = fresh {
            self.latest = match result {
                Ok(raw) => normalize_faces(raw, &layout),
                Err(e) => {
                    log::warn!("Face detection failed at {timestamp_ms:.0} ms: {e}");
                    Vec::new()
                }
            };
        }
        &self.latest
    }

    /// Last faces handed out by [`analyze`](Self::analyze).
    pub fn latest(&self) -> &[FaceRecord] {
        &self.latest
    }
}

fn normalize_faces(raw: Vec<RawFace>, layout: &LandmarkLayout) -> Vec<FaceRecord> {
    raw.into_iter()
        .filter_map(|landmarks| match FaceRecord::from_raw(landmarks, layout) {
            Ok(face) => Some(face),
            Err(e) => {
                log::warn!("Dropping face: {e}");
                None
            }
        })
        .collect()
}
