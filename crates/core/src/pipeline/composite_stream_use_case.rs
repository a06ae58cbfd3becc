use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::shared::stream_metadata::StreamMetadata;
use crate::video::domain::frame_source::FrameSource;
use crate::viewport::domain::viewport_state::ViewportHandle;

use super::frame_compositor::FrameCompositor;
use super::presentation_sink::PresentationSink;

/// How a stream run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamReport {
    pub frames: usize,
    pub cancelled: bool,
}

/// Drives a compositor over every frame of a source, in capture order,
/// presenting each finished frame to the sink.
///
/// Timestamps come from the stream's frame rate. The viewport is read from
/// a shared handle once per frame, so a controller on another thread can
/// zoom or mirror mid-stream. `on_progress` returning `false` or the
/// `cancelled` flag stop the run after the current frame.
pub struct CompositeStreamUseCase {
    source: Box<dyn FrameSource>,
    compositor: FrameCompositor,
    sink: Box<dyn PresentationSink>,
    viewport: ViewportHandle,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl CompositeStreamUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        compositor: FrameCompositor,
        sink: Box<dyn PresentationSink>,
        viewport: ViewportHandle,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source,
            compositor,
            sink,
            viewport,
            on_progress,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    pub fn execute(&mut self, input: &Path) -> Result<StreamReport, Box<dyn std::error::Error>> {
        let metadata = self.source.open(input)?;
        self.compositor.logger_mut().info(&format!(
            "Streaming {} frame(s) at {}x{}, {:.2} fps",
            metadata.total_frames, metadata.width, metadata.height, metadata.fps
        ));

        let result = self.run(&metadata);
        self.source.close();
        let report = result?;
        self.sink.finish()?;

        if report.cancelled {
            log::info!("Stream cancelled after {} frame(s)", report.frames);
        }
        self.compositor.logger_mut().summary();
        Ok(report)
    }

    fn run(&mut self, metadata: &StreamMetadata) -> Result<StreamReport, Box<dyn std::error::Error>> {
        let total = metadata.total_frames;
        let mut report = StreamReport {
            frames: 0,
            cancelled: false,
        };

        for frame in self.source.frames() {
            if self.cancelled.load(Ordering::Relaxed) {
                report.cancelled = true;
                break;
            }
            let frame = frame?;
            let timestamp_ms = metadata.timestamp_ms(frame.index());
            self.compositor
                .composite(&frame, &self.viewport.get(), timestamp_ms);
            self.compositor.present(self.sink.as_mut())?;

            report.frames += 1;
            self.compositor.logger_mut().progress(report.frames, total);
            if let Some(cb) = &self.on_progress {
                if !cb(report.frames, total) {
                    report.cancelled = true;
                    break;
                }
            }
        }
        Ok(report)
    }
}
