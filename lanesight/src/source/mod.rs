use anyhow::{bail, Context, Result};
use lanesight_media::Frame;
use log::info;
use std::path::{Path, PathBuf};

/// Supplies one raw pixel frame per tick. Capture lifecycle stays with the
/// implementation; the pipeline only pulls.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Frame>;
}

/// Cycles through the still images of a directory in name order, standing
/// in for a live capture session.
pub struct ImageDirSource {
    files: Vec<PathBuf>,
    cursor: usize,
}

impl ImageDirSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("reading frame directory {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("png" | "jpg" | "jpeg" | "bmp")
                )
            })
            .collect();
        files.sort();

        if files.is_empty() {
            bail!("no frames found in {}", dir.display());
        }
        info!("frame source ready with {} file(s)", files.len());
        Ok(ImageDirSource { files, cursor: 0 })
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Frame> {
        let path = &self.files[self.cursor];
        self.cursor = (self.cursor + 1) % self.files.len();
        Ok(Frame::open_file(path)?)
    }
}
