mod settings;

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;

use privacam_core::detection::domain::face_record::LandmarkLayout;
use privacam_core::detection::infrastructure::detection_inbox::DetectionInbox;
use privacam_core::detection::infrastructure::face_detection_adapter::{
    BackendLoadResult, DetectorBackend, FaceDetectionAdapter,
};
use privacam_core::detection::infrastructure::replay_landmark_detector::ReplayLandmarkDetector;
use privacam_core::detection::infrastructure::threaded_landmark_detector::ThreadedLandmarkDetector;
use privacam_core::masking::domain::mask_style::MaskStyle;
use privacam_core::masking::domain::privacy_mode::{PrivacyMode, PrivacyModeHandle};
use privacam_core::pipeline::composite_stream_use_case::CompositeStreamUseCase;
use privacam_core::pipeline::compositor_config::CompositorConfig;
use privacam_core::pipeline::frame_compositor::FrameCompositor;
use privacam_core::pipeline::frame_overlay::TimestampOverlay;
use privacam_core::pipeline::pipeline_logger::SummaryPipelineLogger;
use privacam_core::shared::color::Rgba;
use privacam_core::shared::constants::DEFAULT_HOLD_WINDOW_MS;
use privacam_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;
use privacam_core::video::infrastructure::image_sequence_writer::ImageSequenceWriter;
use privacam_core::viewport::domain::viewport_state::{ViewportHandle, ViewportState};
use privacam_core::viewport::infrastructure::viewport_renderer::{BackgroundFill, Resampling};

use settings::Settings;

/// Face-privacy compositing for image sequences.
#[derive(Parser, Debug)]
#[command(name = "privacam")]
struct Cli {
    /// Input image or directory of frames.
    input: PathBuf,

    /// Directory the composited frames are written to.
    output: PathBuf,

    /// JSON detection script mapping frame index to face landmarks.
    /// Without it frames are composited with no face detection.
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Privacy mode: eyeMask, faceBlur, blackout or mosaic.
    /// Defaults to the last saved choice.
    #[arg(long)]
    mode: Option<PrivacyMode>,

    /// Remember --mode for later runs.
    #[arg(long)]
    save_mode: bool,

    /// Zoom factor (1.0 = full frame).
    #[arg(long, default_value = "1.0")]
    zoom: f64,

    /// Horizontal pan in source pixels.
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pan_x: f64,

    /// Vertical pan in source pixels.
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pan_y: f64,

    /// Flip the picture horizontally.
    #[arg(long)]
    mirror: bool,

    /// Frame rate of a directory of frames.
    #[arg(long, default_value = "30.0")]
    fps: f64,

    /// Run detection every Nth frame (1 = every frame).
    #[arg(long, default_value = "1")]
    detect_every: usize,

    /// How long a changed face count must persist before it is trusted (500-800).
    #[arg(long, default_value_t = DEFAULT_HOLD_WINDOW_MS)]
    hold_window_ms: f64,

    /// Eye bar overshoot past each eye corner (0.1-0.4).
    #[arg(long, default_value = "0.4")]
    eye_extension: f64,

    /// Margin fill when zoomed out: clear, black or white.
    #[arg(long, default_value = "clear")]
    background: String,

    /// Viewport resampling: bilinear or nearest.
    #[arg(long, default_value = "bilinear")]
    resampling: String,

    /// Output size as WIDTHxHEIGHT (defaults to the source size).
    #[arg(long)]
    size: Option<String>,

    /// Write RGBA frames so cleared margins stay transparent.
    #[arg(long)]
    rgba: bool,

    /// Detection script holds only [left eye corner, right eye corner] per face.
    #[arg(long)]
    eye_corners: bool,

    /// Run the detector on a worker thread; results arrive a few frames late.
    #[arg(long)]
    async_detector: bool,

    /// Draw the stream clock in the bottom-right corner.
    #[arg(long)]
    timestamp: bool,

    /// How long to wait for the detector to load before starting.
    #[arg(long, default_value = "5000")]
    detector_timeout_ms: u64,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mode = resolve_mode(&cli);
    let config = build_config(&cli)?;
    let viewport = ViewportState::new(cli.zoom, (cli.pan_x, cli.pan_y), cli.mirror)?;

    let adapter = match &cli.detections {
        Some(script) => {
            let script = script.clone();
            let threaded = cli.async_detector;
            config.loading_adapter(move || load_backend(&script, threaded))?
        }
        None => {
            log::warn!("No --detections script given; faces will not be masked");
            FaceDetectionAdapter::disabled()
        }
    };

    let mut compositor = FrameCompositor::new(config, adapter, PrivacyModeHandle::new(mode))?
        .with_logger(Box::new(SummaryPipelineLogger::default()));
    if cli.timestamp {
        compositor = compositor.with_overlay(Box::new(TimestampOverlay::default()));
    }
    if cli.detections.is_some()
        && !compositor.wait_for_detector(Duration::from_millis(cli.detector_timeout_ms))
    {
        log::warn!("Detector not ready ({:?}); continuing", compositor.detection_status());
    }

    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(|current, total| {
        eprint!("\rCompositing frame {current}/{total}");
        true
    });
    let mut use_case = CompositeStreamUseCase::new(
        Box::new(ImageSequenceReader::new(cli.fps)),
        compositor,
        Box::new(ImageSequenceWriter::new(&cli.output)),
        ViewportHandle::new(viewport),
        Some(progress),
        None,
    );
    let report = use_case.execute(&cli.input)?;
    eprintln!();
    log::info!(
        "{} frame(s) in {} mode written to {}",
        report.frames,
        mode,
        cli.output.display()
    );
    Ok(())
}

/// Explicit --mode wins over the saved one; --save-mode stores it.
fn resolve_mode(cli: &Cli) -> PrivacyMode {
    let settings = Settings::load();
    let mode = cli.mode.unwrap_or(settings.privacy_mode);
    if cli.save_mode {
        let updated = Settings { privacy_mode: mode };
        if let Err(e) = updated.save() {
            log::warn!("Could not save privacy mode: {e}");
        }
    }
    mode
}

fn load_backend(script: &Path, threaded: bool) -> BackendLoadResult {
    let detector = Box::new(ReplayLandmarkDetector::load(script)?);
    if !threaded {
        return Ok(DetectorBackend::Blocking(detector));
    }
    let (sender, inbox) = DetectionInbox::channel();
    Ok(DetectorBackend::Async {
        detector: Box::new(ThreadedLandmarkDetector::spawn(detector, sender)),
        inbox,
    })
}

fn build_config(cli: &Cli) -> Result<CompositorConfig, Box<dyn std::error::Error>> {
    let config = CompositorConfig {
        detection_enabled: cli.detections.is_some(),
        detect_interval: cli.detect_every,
        hold_window_ms: cli.hold_window_ms,
        landmark_layout: if cli.eye_corners {
            LandmarkLayout::EyeCorners
        } else {
            LandmarkLayout::default()
        },
        mask_style: MaskStyle::default().with_eye_extension(cli.eye_extension),
        background: parse_background(&cli.background)?,
        resampling: parse_resampling(&cli.resampling)?,
        output_size: cli.size.as_deref().map(parse_size).transpose()?,
        output_channels: if cli.rgba { 4 } else { 3 },
        ..Default::default()
    };
    config.validate()?;
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    if let Some(script) = &cli.detections {
        if !script.is_file() {
            return Err(format!("Detection script not found: {}", script.display()).into());
        }
    }
    if !(cli.fps > 0.0) {
        return Err(format!("FPS must be positive, got {}", cli.fps).into());
    }
    if cli.save_mode && cli.mode.is_none() {
        return Err("--save-mode requires --mode".into());
    }
    Ok(())
}

fn parse_background(value: &str) -> Result<BackgroundFill, String> {
    match value {
        "clear" => Ok(BackgroundFill::Clear),
        "black" => Ok(BackgroundFill::Solid(Rgba::BLACK)),
        "white" => Ok(BackgroundFill::Solid(Rgba::WHITE)),
        other => Err(format!(
            "Background must be 'clear', 'black' or 'white', got '{other}'"
        )),
    }
}

fn parse_resampling(value: &str) -> Result<Resampling, String> {
    match value {
        "bilinear" => Ok(Resampling::Bilinear),
        "nearest" => Ok(Resampling::Nearest),
        other => Err(format!(
            "Resampling must be 'bilinear' or 'nearest', got '{other}'"
        )),
    }
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let invalid = || format!("Size must look like 640x480, got '{value}'");
    let (w, h) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
    let w: u32 = w.trim().parse().map_err(|_| invalid())?;
    let h: u32 = h.trim().parse().map_err(|_| invalid())?;
    Ok((w, h))
}
