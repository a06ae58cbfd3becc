use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError};

use crate::detection::domain::detection_error::DetectionError;
use crate::detection::domain::face_detector::{AsyncLandmarkDetector, LandmarkDetector};
use crate::shared::frame::Frame;

use super::detection_inbox::{Delivery, InboxSender};

/// Runs a blocking detector on a worker thread.
///
/// At most one frame is in flight: while the worker is busy further
/// submissions are dropped, so the caller never waits on detection.
/// Results go to the [`InboxSender`] given at spawn time. A detector that
/// panics is reported once as a failed detection; the worker then stops and
/// every later submit returns [`DetectionError::WorkerDisconnected`].
pub struct ThreadedLandmarkDetector {
    request_tx: Option<Sender<(Frame, f64)>>,
    busy: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadedLandmarkDetector {
    pub fn spawn(detector: Box<dyn LandmarkDetector>, results: InboxSender) -> Self {
        let (request_tx, request_rx) = crossbeam_channel::bounded::<(Frame, f64)>(1);
        let busy = Arc::new(AtomicBool::new(false));
        let worker_busy = busy.clone();

        let handle = std::thread::spawn(move || {
            let mut detector = detector;
            while let Ok((frame, timestamp_ms)) = request_rx.recv() {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    detector.detect(&frame, timestamp_ms).map_err(|e| e.to_string())
                }));
                let faces = match outcome {
                    Ok(faces) => faces,
                    Err(payload) => {
                        let error = DetectionError::Panicked(panic_message(payload.as_ref()));
                        log::error!("Detector worker stopping: {error}");
                        // Disconnect first so later submits fail instead of queueing.
                        drop(request_rx);
                        worker_busy.store(false, Ordering::Release);
                        results.deliver(Delivery {
                            timestamp_ms,
                            faces: Err(error.to_string()),
                        });
                        return;
                    }
                };
                worker_busy.store(false, Ordering::Release);
                if !results.deliver(Delivery {
                    timestamp_ms,
                    faces,
                }) {
                    break;
                }
            }
            log::debug!("Detector worker stopped");
        });

        Self {
            request_tx: Some(request_tx),
            busy,
            handle: Some(handle),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl AsyncLandmarkDetector for ThreadedLandmarkDetector {
    fn submit(
        &mut self,
        frame: &Frame,
        timestamp_ms: f64,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }
        let Some(tx) = &self.request_tx else {
            return Err(DetectionError::WorkerDisconnected.into());
        };
        match tx.try_send((frame.clone(), timestamp_ms)) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Disconnected(_)) => {
                self.busy.store(false, Ordering::Release);
                Err(DetectionError::WorkerDisconnected.into())
            }
        }
    }
}

impl Drop for ThreadedLandmarkDetector {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.request_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Detector worker panicked");
            }
        }
    }
}
