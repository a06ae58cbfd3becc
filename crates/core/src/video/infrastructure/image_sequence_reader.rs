use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::stream_metadata::StreamMetadata;
use crate::video::domain::frame_source::FrameSource;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source not found: {0}")]
    NotFound(PathBuf),
    #[error("no supported images in {0}")]
    Empty(PathBuf),
    #[error("failed to list {path}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("source has not been opened")]
    NotOpened,
}

/// Plays back still images as a frame stream.
///
/// A file path is a one-frame stream with `fps = 0`. A directory yields
/// every file with a known image extension, sorted by name, at the
/// configured frame rate. Frames are decoded lazily to RGB.
pub struct ImageSequenceReader {
    fps: f64,
    paths: Option<Vec<PathBuf>>,
}

impl ImageSequenceReader {
    pub fn new(fps: f64) -> Self {
        Self { fps, paths: None }
    }

    fn list_images(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
        let entries = std::fs::read_dir(dir).map_err(|source| SourceError::List {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_image_extension(p))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

impl Default for ImageSequenceReader {
    fn default() -> Self {
        Self::new(30.0)
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn decode(path: &Path, index: usize) -> Result<Frame, SourceError> {
    let img = image::open(path)
        .map_err(|source| SourceError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    let (width, height) = img.dimensions();
    Ok(Frame::new(img.into_raw(), width, height, 3, index))
}

impl FrameSource for ImageSequenceReader {
    fn open(&mut self, path: &Path) -> Result<StreamMetadata, Box<dyn std::error::Error>> {
        let (paths, fps) = if path.is_dir() {
            (Self::list_images(path)?, self.fps)
        } else if path.is_file() {
            (vec![path.to_path_buf()], 0.0)
        } else {
            return Err(SourceError::NotFound(path.to_path_buf()).into());
        };
        let first = paths
            .first()
            .ok_or_else(|| SourceError::Empty(path.to_path_buf()))?;
        let (width, height) = image::image_dimensions(first).map_err(|source| SourceError::Decode {
            path: first.clone(),
            source,
        })?;

        log::info!(
            "Opened {} ({} frame(s), {}x{})",
            path.display(),
            paths.len(),
            width,
            height
        );
        let metadata = StreamMetadata {
            width,
            height,
            fps,
            total_frames: paths.len(),
            source_path: Some(path.to_path_buf()),
        };
        self.paths = Some(paths);
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match &self.paths {
            Some(paths) => Box::new(
                paths
                    .iter()
                    .enumerate()
                    .map(|(i, p)| decode(p, i).map_err(Into::into)),
            ),
            None => Box::new(std::iter::once(Err(SourceError::NotOpened.into()))),
        }
    }

    fn close(&mut self) {
        self.paths = None;
    }
}
