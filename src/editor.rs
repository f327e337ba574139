use std::path::Path;

use tracing::debug;

use crate::{
    buffer::{Channels, PixelBuffer},
    error::{ImageError, Result},
};

/// Image lifecycle collaborator: load, save, and a whole-image undo history
///
/// The effect core never retains history; every applied effect produces a new
/// [`PixelBuffer`] which the editor snapshots. Undo/redo shuffle complete
/// buffers, which is cheap enough for single still images.
pub struct Editor {
    original: PixelBuffer,
    current: PixelBuffer,
    undo_stack: Vec<PixelBuffer>,
    redo_stack: Vec<PixelBuffer>,
}

impl Editor {
    /// Start an editing session from an already-decoded buffer
    pub fn new(buffer: PixelBuffer) -> Self {
        Self {
            original: buffer.clone(),
            current: buffer,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Load an image from disk, decoding to RGB or RGBA
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|_| ImageError::LoadFailed {
            path: path.display().to_string(),
        })?;
        debug!("Loaded {}x{} image from {:?}", img.width(), img.height(), path);
        Ok(Self::new(PixelBuffer::from_dynamic(img)?))
    }

    /// The working buffer as of the last committed effect
    pub fn current(&self) -> &PixelBuffer {
        &self.current
    }

    /// The buffer as originally loaded
    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    /// Commit a new working buffer, pushing the previous one onto the history
    pub fn commit(&mut self, buffer: PixelBuffer) {
        self.undo_stack.push(std::mem::replace(&mut self.current, buffer));
        self.redo_stack.clear();
    }

    /// Step back `times` commits; stops silently at the original image
    pub fn undo(&mut self, times: usize) {
        for _ in 0..times {
            match self.undo_stack.pop() {
                Some(previous) => {
                    self.redo_stack.push(std::mem::replace(&mut self.current, previous));
                }
                None => break,
            }
        }
    }

    /// Re-apply previously undone commits
    pub fn redo(&mut self, times: usize) {
        for _ in 0..times {
            match self.redo_stack.pop() {
                Some(next) => {
                    self.undo_stack.push(std::mem::replace(&mut self.current, next));
                }
                None => break,
            }
        }
    }

    /// Drop all history and return to the original image
    pub fn reset(&mut self) {
        self.current = self.original.clone();
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Save the working buffer
    ///
    /// A path without an extension gets `.png`; RGBA buffers must target PNG
    /// since JPEG has no alpha.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut path = path.as_ref().to_path_buf();
        if path.extension().is_none() {
            path.set_extension("png");
        }

        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("png"))
            .unwrap_or(false);

        let result = match self.current.channels() {
            Channels::Rgba if !is_png => {
                return Err(ImageError::SaveFailed {
                    path: path.display().to_string(),
                    reason: "RGBA images must be saved as PNG".to_string(),
                }
                .into());
            }
            Channels::Rgba => self.current.to_rgba_image().save(&path),
            Channels::Rgb => self.current.to_rgb_image().save(&path),
        };

        result.map_err(|e| {
            ImageError::SaveFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
