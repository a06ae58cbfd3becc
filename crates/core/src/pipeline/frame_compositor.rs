use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::detection::domain::detection_stabilizer::DetectionStabilizer;
use crate::detection::domain::face_record::FaceRecord;
use crate::detection::infrastructure::face_detection_adapter::{AdapterStatus, FaceDetectionAdapter};
use crate::masking::domain::privacy_mode::PrivacyModeHandle;
use crate::masking::infrastructure::mask_renderer::MaskRenderer;
use crate::shared::frame::Frame;
use crate::viewport::domain::viewport_mapping::{DestRect, ViewportMapping};
use crate::viewport::domain::viewport_state::ViewportState;
use crate::viewport::infrastructure::viewport_renderer::ViewportRenderer;

use super::compositor_config::{CompositorConfig, ConfigError};
use super::frame_overlay::FrameOverlay;
use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use super::presentation_sink::PresentationSink;

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

/// One camera session's frame pipeline.
///
/// Each call to [`composite`](Self::composite) runs viewport, detection,
/// stabilisation, masking and overlays over a destination buffer that lives
/// as long as the compositor. Detection sees the buffer after the viewport
/// transform, mirroring included, so masks are drawn in the same
/// coordinates the detector reported. Overlays are drawn last and unmirrored.
///
/// A frame that runs over `frame_budget_ms` makes the next frame skip its
/// detector call; masking then reuses the trusted faces. At most one frame
/// in a row is skipped, so detection keeps up with a moving face on a slow
/// machine.
pub struct FrameCompositor {
    config: CompositorConfig,
    viewport: ViewportRenderer,
    adapter: FaceDetectionAdapter,
    stabilizer: DetectionStabilizer,
    masks: MaskRenderer,
    privacy: PrivacyModeHandle,
    overlays: Vec<Box<dyn FrameOverlay>>,
    logger: Box<dyn PipelineLogger>,
    dest: Frame,
    skip_detection: bool,
}

impl FrameCompositor {
    pub fn new(
        config: CompositorConfig,
        adapter: FaceDetectionAdapter,
        privacy: PrivacyModeHandle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            viewport: ViewportRenderer::new(config.resampling, config.background),
            stabilizer: DetectionStabilizer::new(config.hold_window_ms),
            masks: MaskRenderer::new(config.mask_style.clone()),
            dest: Frame::blank(0, 0, config.output_channels),
            config,
            adapter,
            privacy,
            overlays: Vec::new(),
            logger: Box::new(NullPipelineLogger),
            skip_detection: false,
        })
    }

    pub fn with_overlay(mut self, overlay: Box<dyn FrameOverlay>) -> Self {
        self.overlays.push(overlay);
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn privacy(&self) -> &PrivacyModeHandle {
        &self.privacy
    }

    pub fn logger_mut(&mut self) -> &mut dyn PipelineLogger {
        self.logger.as_mut()
    }

    pub fn detection_status(&self) -> AdapterStatus {
        self.adapter.status()
    }

    /// Blocks up to `timeout` for a detector that is still loading.
    pub fn wait_for_detector(&mut self, timeout: Duration) -> bool {
        self.adapter.wait_until_ready(timeout)
    }

    /// Renders `source` through `viewport` and masks every trusted face.
    ///
    /// `timestamp_ms` must increase from frame to frame; it drives the hold
    /// window and is passed to the detector and overlays.
    pub fn composite(&mut self, source: &Frame, viewport: &ViewportState, timestamp_ms: f64) -> &Frame {
        let started = Instant::now();

        let (width, height) = self
            .config
            .output_size
            .unwrap_or((source.width(), source.height()));
        if self.dest.reshape(width, height, self.config.output_channels) {
            log::debug!("Destination buffer resized to {width}x{height}");
        }
        self.dest.set_index(source.index());

        let state = viewport.clamped_to(source.width(), source.height());
        let mapping = ViewportMapping::compute(
            DestRect::full(width, height),
            source.width(),
            source.height(),
            &state,
        );
        self.viewport.render(source, &mapping, &mut self.dest);
        let mut stage = Instant::now();
        self.logger.timing("viewport", elapsed_ms(started));

        if self.config.detection_enabled {
            let allow_invoke = !self.skip_detection;
            if !allow_invoke {
                log::debug!("Skipping detection for frame {} after an over-budget frame", source.index());
            }
            let faces = self.adapter.analyze(&self.dest, timestamp_ms, allow_invoke);
            self.logger.metric("faces", faces.len() as f64);
            self.stabilizer.offer(faces, timestamp_ms);
            self.logger.timing("detect", elapsed_ms(stage));
            stage = Instant::now();
        }

        let trusted = self.stabilizer.snapshot();
        self.logger.metric("trusted_faces", trusted.len() as f64);
        self.masks.render(&mut self.dest, &trusted, self.privacy.get());
        self.logger.timing("mask", elapsed_ms(stage));

        if !self.overlays.is_empty() {
            stage = Instant::now();
            for overlay in &mut self.overlays {
                overlay.draw(&mut self.dest, timestamp_ms);
            }
            self.logger.timing("overlay", elapsed_ms(stage));
        }

        let total = elapsed_ms(started);
        // A frame that already skipped never causes another skip.
        self.skip_detection = !self.skip_detection && total > self.config.frame_budget_ms;
        if self.skip_detection {
            log::warn!(
                "Frame {} took {total:.1} ms (budget {:.1} ms); next detection skipped",
                source.index(),
                self.config.frame_budget_ms
            );
        }
        &self.dest
    }

    /// Last composited frame.
    pub fn destination(&self) -> &Frame {
        &self.dest
    }

    /// Hands the last composited frame to `sink`.
    pub fn present(&self, sink: &mut dyn PresentationSink) -> Result<(), Box<dyn std::error::Error>> {
        sink.present(&self.dest)
    }

    /// The faces masked on the last frame.
    pub fn trusted_faces(&self) -> Arc<Vec<FaceRecord>> {
        self.stabilizer.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_detector::{LandmarkDetector, RawFace};
    use crate::detection::domain::face_record::LandmarkLayout;
    use crate::detection::domain::landmark::NormalizedLandmark;
    use crate::detection::infrastructure::face_detection_adapter::DetectorBackend;
    use crate::masking::domain::face_geometry::blackout_ellipse;
    use crate::masking::domain::privacy_mode::PrivacyMode;
    use crate::pipeline::frame_overlay::TimestampOverlay;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const GRAY: [u8; 3] = [128, 128, 128];
    const BLACK: [u8; 3] = [0, 0, 0];

    /// Answers call `n` with `faces(n)` and counts calls.
    struct ScriptedDetector {
        calls: Arc<AtomicUsize>,
        faces: Box<dyn Fn(usize) -> Vec<RawFace> + Send>,
    }

    impl LandmarkDetector for ScriptedDetector {
        fn detect(&mut self, _frame: &Frame, _ts: f64) -> Result<Vec<RawFace>, Box<dyn std::error::Error>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((self.faces)(n))
        }
    }

    struct CollectingSink {
        frames: Vec<Frame>,
    }

    impl PresentationSink for CollectingSink {
        fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    struct StageRecorder {
        stages: Arc<Mutex<Vec<String>>>,
    }

    impl PipelineLogger for StageRecorder {
        fn progress(&mut self, _current: usize, _total: usize) {}
        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.stages.lock().unwrap().push(stage.to_string());
        }
        fn metric(&mut self, _name: &str, _value: f64) {}
        fn info(&mut self, _message: &str) {}
    }

    /// Eye corners at (80, 100) and (120, 100) in a 200x200 frame.
    fn centred_face() -> RawFace {
        vec![NormalizedLandmark::new(0.4, 0.5), NormalizedLandmark::new(0.6, 0.5)]
    }

    fn source(index: usize) -> Frame {
        Frame::new(vec![128; 200 * 200 * 3], 200, 200, 3, index)
    }

    fn config() -> CompositorConfig {
        CompositorConfig {
            landmark_layout: LandmarkLayout::EyeCorners,
            hold_window_ms: 800.0,
            frame_budget_ms: 1.0e9,
            ..Default::default()
        }
    }

    fn compositor_with(
        config: CompositorConfig,
        mode: PrivacyMode,
        faces: impl Fn(usize) -> Vec<RawFace> + Send + 'static,
    ) -> (FrameCompositor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let detector = ScriptedDetector {
            calls: calls.clone(),
            faces: Box::new(faces),
        };
        let adapter = config
            .adapter(DetectorBackend::Blocking(Box::new(detector)))
            .unwrap();
        let compositor = FrameCompositor::new(config, adapter, PrivacyModeHandle::new(mode)).unwrap();
        (compositor, calls)
    }

    fn is_masked(frame: &Frame) -> bool {
        frame.pixel(80, 100) == BLACK
    }

    #[test]
    fn test_blackout_present_on_every_frame() {
        let (mut compositor, _) = compositor_with(config(), PrivacyMode::Blackout, |_| vec![centred_face()]);
        let viewport = ViewportState::identity();

        for i in 0..30 {
            let frame = compositor.composite(&source(i), &viewport, i as f64 * 33.0);
            assert_eq!(frame.pixel(80, 100), BLACK, "frame {i}");
            assert_eq!(frame.pixel(124, 100), BLACK, "frame {i}");
            assert_eq!(frame.pixel(100, 80), GRAY, "frame {i}");
            assert_eq!(frame.pixel(5, 5), GRAY, "frame {i}");

            let trusted = compositor.trusted_faces();
            assert_eq!(trusted.len(), 1);
            let ellipse = blackout_ellipse(&trusted[0], 200, 200, 0.2).unwrap();
            assert_relative_eq!(ellipse.center.x, 100.0, epsilon = 1e-9);
            assert_relative_eq!(ellipse.center.y, 100.0, epsilon = 1e-9);
            assert_relative_eq!(ellipse.radius_x, 28.0, epsilon = 1e-9);
            assert_relative_eq!(ellipse.radius_y, 8.0, epsilon = 1e-9);
            assert_relative_eq!(ellipse.rotation, 0.0);
        }
    }

    #[test]
    fn test_alternating_detections_never_unmask() {
        let (mut compositor, calls) = compositor_with(config(), PrivacyMode::Blackout, |n| {
            if n % 2 == 0 {
                vec![centred_face()]
            } else {
                Vec::new()
            }
        });
        let viewport = ViewportState::identity();

        // Ten frames inside one second.
        for i in 0..10 {
            let frame = compositor.composite(&source(i), &viewport, i as f64 * 100.0);
            assert!(is_masked(frame), "frame {i}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_departed_face_released_after_hold_window() {
        let config = CompositorConfig {
            hold_window_ms: 500.0,
            ..config()
        };
        let (mut compositor, _) = compositor_with(config, PrivacyMode::Blackout, |n| {
            if n < 3 {
                vec![centred_face()]
            } else {
                Vec::new()
            }
        });
        let viewport = ViewportState::identity();

        let masked: Vec<bool> = (0..10)
            .map(|i| is_masked(compositor.composite(&source(i), &viewport, i as f64 * 100.0)))
            .collect();
        // Last acceptance at 200 ms; the empty set is trusted from 700 ms.
        assert_eq!(
            masked,
            vec![true, true, true, true, true, true, true, false, false, false]
        );
    }

    #[test]
    fn test_mode_change_applies_on_next_frame() {
        let (mut compositor, _) = compositor_with(config(), PrivacyMode::Blackout, |_| vec![centred_face()]);
        let viewport = ViewportState::identity();

        let frame = compositor.composite(&source(0), &viewport, 0.0);
        assert_eq!(frame.pixel(100, 90), GRAY);

        compositor.privacy().set(PrivacyMode::EyeMask);
        // The eye bar is 32 px thick around y = 100.
        let frame = compositor.composite(&source(1), &viewport, 33.0);
        assert_eq!(frame.pixel(100, 90), BLACK);
    }

    #[test]
    fn test_masks_follow_detector_coordinates_when_mirrored() {
        let left_face = || {
            vec![vec![
                NormalizedLandmark::new(0.2, 0.5),
                NormalizedLandmark::new(0.3, 0.5),
            ]]
        };
        let (mut compositor, _) = compositor_with(config(), PrivacyMode::EyeMask, move |_| left_face());
        let mirrored = ViewportState::identity().with_mirrored(true);

        let frame = compositor.composite(&source(0), &mirrored, 0.0);
        // Eye bar spans x = 32..68 in destination pixels, not the mirror image.
        assert_eq!(frame.pixel(50, 100), BLACK);
        assert_eq!(frame.pixel(149, 100), GRAY);
    }

    #[test]
    fn test_overlay_is_not_mirrored() {
        let render = |mirrored: bool| {
            let config = CompositorConfig {
                detection_enabled: false,
                ..config()
            };
            let mut compositor = FrameCompositor::new(config, FaceDetectionAdapter::disabled(), PrivacyModeHandle::default())
                .unwrap()
                .with_overlay(Box::new(TimestampOverlay::default()));
            let viewport = ViewportState::identity().with_mirrored(mirrored);
            compositor.composite(&source(0), &viewport, 12_345.0).clone()
        };
        let plain = render(false);
        let mirrored = render(true);
        assert_ne!(plain.data(), source(0).data());
        assert_eq!(plain.data(), mirrored.data());
    }

    #[test]
    fn test_over_budget_frame_skips_next_detection() {
        let config = CompositorConfig {
            frame_budget_ms: f64::MIN_POSITIVE,
            ..config()
        };
        let (mut compositor, calls) = compositor_with(config, PrivacyMode::Blackout, |_| vec![centred_face()]);
        let viewport = ViewportState::identity();

        for i in 0..6 {
            let frame = compositor.composite(&source(i), &viewport, i as f64 * 33.0);
            assert!(is_masked(frame), "frame {i}");
        }
        // Frames 1, 3 and 5 follow an overrun; frames 2 and 4 follow a skip.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    /// Reports the face 0.05 further right on every frame index.
    struct MovingFace {
        calls: Arc<AtomicUsize>,
    }

    impl LandmarkDetector for MovingFace {
        fn detect(&mut self, frame: &Frame, _ts: f64) -> Result<Vec<RawFace>, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let dx = 0.05 * frame.index() as f64;
            Ok(vec![vec![
                NormalizedLandmark::new(0.4 + dx, 0.5),
                NormalizedLandmark::new(0.6 + dx, 0.5),
            ]])
        }
    }

    #[test]
    fn test_slow_frames_keep_detection_tracking_a_moving_face() {
        let config = CompositorConfig {
            frame_budget_ms: 1.0e-6,
            ..config()
        };
        let calls = Arc::new(AtomicUsize::new(0));
        let adapter = config
            .adapter(DetectorBackend::Blocking(Box::new(MovingFace { calls: calls.clone() })))
            .unwrap();
        let mut compositor =
            FrameCompositor::new(config, adapter, PrivacyModeHandle::new(PrivacyMode::EyeMask)).unwrap();
        let viewport = ViewportState::identity();

        for i in 0..8u32 {
            let frame = compositor.composite(&source(i as usize), &viewport, i as f64 * 33.0);
            // Left eye corner moves 10 px per frame; a bar one frame old
            // starts 26 px to its left.
            let left_eye = 80 + 10 * i;
            assert_eq!(frame.pixel(left_eye, 100), BLACK, "frame {i}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_disabled_detection_never_masks() {
        let config = CompositorConfig {
            detection_enabled: false,
            ..config()
        };
        let (mut compositor, calls) = compositor_with(config, PrivacyMode::Blackout, |_| vec![centred_face()]);
        let frame = compositor.composite(&source(0), &ViewportState::identity(), 0.0);
        assert_eq!(frame.data(), source(0).data());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(compositor.detection_status(), AdapterStatus::Disabled);
    }

    #[test]
    fn test_failed_detector_load_runs_without_detection() {
        let config = config();
        let adapter = config
            .loading_adapter(|| Err("model missing".into()))
            .unwrap();
        let mut compositor = FrameCompositor::new(config, adapter, PrivacyModeHandle::default()).unwrap();

        assert!(!compositor.wait_for_detector(Duration::from_secs(5)));
        assert_eq!(compositor.detection_status(), AdapterStatus::Disabled);
        let frame = compositor.composite(&source(0), &ViewportState::identity(), 0.0);
        assert_eq!(frame.data(), source(0).data());
    }

    #[test]
    fn test_destination_buffer_is_reused() {
        let config = CompositorConfig {
            output_size: Some((120, 90)),
            output_channels: 4,
            ..config()
        };
        let (mut compositor, _) = compositor_with(config, PrivacyMode::Mosaic, |_| Vec::new());
        let viewport = ViewportState::identity();

        let first = compositor.composite(&source(0), &viewport, 0.0).data().as_ptr();
        let frame = compositor.composite(&source(7), &viewport, 33.0);
        assert_eq!(frame.data().as_ptr(), first);
        assert_eq!((frame.width(), frame.height(), frame.channels()), (120, 90, 4));
        assert_eq!(frame.index(), 7);
        assert_eq!(frame.pixel(60, 45), &[128, 128, 128, 255]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = CompositorConfig {
            hold_window_ms: 100.0,
            ..config()
        };
        let result = FrameCompositor::new(config, FaceDetectionAdapter::disabled(), PrivacyModeHandle::default());
        assert!(matches!(result, Err(ConfigError::HoldWindow(_))));
    }

    #[test]
    fn test_present_hands_over_last_frame() {
        let (mut compositor, _) = compositor_with(config(), PrivacyMode::Blackout, |_| vec![centred_face()]);
        let mut sink = CollectingSink { frames: Vec::new() };
        compositor.composite(&source(3), &ViewportState::identity(), 0.0);
        compositor.present(&mut sink).unwrap();

        assert_eq!(sink.frames.len(), 1);
        assert_eq!(sink.frames[0].index(), 3);
        assert!(is_masked(&sink.frames[0]));
    }

    #[test]
    fn test_stage_timings_reported_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let (compositor, _) = compositor_with(config(), PrivacyMode::FaceBlur, |_| vec![centred_face()]);
        let mut compositor = compositor
            .with_overlay(Box::new(TimestampOverlay::default()))
            .with_logger(Box::new(StageRecorder { stages: stages.clone() }));
        compositor.composite(&source(0), &ViewportState::identity(), 0.0);

        assert_eq!(*stages.lock().unwrap(), vec!["viewport", "detect", "mask", "overlay"]);
    }
}
