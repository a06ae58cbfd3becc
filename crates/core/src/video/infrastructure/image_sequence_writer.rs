use std::path::{Path, PathBuf};

use crate::pipeline::presentation_sink::PresentationSink;
use crate::shared::frame::Frame;

/// Records presented frames as numbered PNG files (`frame_000000.png`, ...).
///
/// RGB frames are written as RGB, RGBA frames keep their alpha so
/// cleared margins stay transparent.
pub struct ImageSequenceWriter {
    dir: PathBuf,
    prefix: String,
    written: usize,
}

impl ImageSequenceWriter {
    pub fn new(dir: &Path) -> Self {
        Self::with_prefix(dir, "frame")
    }

    pub fn with_prefix(dir: &Path, prefix: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
            written: 0,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn frame_path(&self, n: usize) -> PathBuf {
        self.dir.join(format!("{}_{n:06}.png", self.prefix))
    }
}

impl PresentationSink for ImageSequenceWriter {
    fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if self.written == 0 {
            std::fs::create_dir_all(&self.dir)?;
        }
        let path = self.frame_path(self.written);
        let (w, h) = (frame.width(), frame.height());
        match frame.channels() {
            3 => image::RgbImage::from_raw(w, h, frame.data().to_vec())
                .ok_or("Failed to create image from frame data")?
                .save(&path)?,
            4 => image::RgbaImage::from_raw(w, h, frame.data().to_vec())
                .ok_or("Failed to create image from frame data")?
                .save(&path)?,
            n => return Err(format!("Unsupported channel count: {n}").into()),
        }
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Wrote {} frame(s) to {}", self.written, self.dir.display());
        Ok(())
    }
}
