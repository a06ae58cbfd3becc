use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::detection::domain::face_detector::RawFace;

/// One result reported by an asynchronous detector.
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
    /// Timestamp of the frame the result belongs to.
    pub timestamp_ms: f64,
    /// Detector output, or the detector's error message.
    pub faces: Result<Vec<RawFace>, String>,
}

/// Write side of the inbox, handed to the detector's result callback.
#[derive(Clone)]
pub struct InboxSender {
    tx: Sender<Delivery>,
}

impl InboxSender {
    /// Returns `false` once the inbox has been dropped.
    pub fn deliver(&self, delivery: Delivery) -> bool {
        self.tx.send(delivery).is_ok()
    }
}

/// Read side of the inbox, owned by the frame loop.
///
/// Deliveries never touch pipeline state directly; the frame loop drains
/// the inbox once per frame and only the newest delivery counts.
pub struct DetectionInbox {
    rx: Receiver<Delivery>,
}

impl DetectionInbox {
    pub fn channel() -> (InboxSender, DetectionInbox) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (InboxSender { tx }, DetectionInbox { rx })
    }

    /// Drains everything delivered since the last call, keeping the newest.
    pub fn take_latest(&self) -> Option<Delivery> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(delivery) => latest = Some(delivery),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return latest,
            }
        }
    }

    /// Blocks up to `timeout` for a delivery, then drains any that follow.
    pub fn wait_latest(&self, timeout: Duration) -> Option<Delivery> {
        match self.rx.recv_timeout(timeout) {
            Ok(first) => Some(self.take_latest().unwrap_or(first)),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
