use std::path::PathBuf;

use image::imageops::{self, FilterType};

use crate::{
    buffer::Mask,
    error::{ImageError, Result},
};

/// Lookup of pre-rendered noise-line masks by integer id
///
/// Masks live in a flat folder as `{id}.png`, decoded to grayscale. A miss is
/// an [`ImageError::AssetNotFound`], not a silent fallback to synthesis.
pub struct NoiseLineAssets {
    folder: PathBuf,
}

impl NoiseLineAssets {
    pub fn new<P: Into<PathBuf>>(folder: P) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// Fetch the mask with the given id
    pub fn get(&self, id: u32) -> Result<Mask> {
        let path = self.folder.join(format!("{}.png", id));
        if !path.is_file() {
            return Err(ImageError::AssetNotFound {
                id,
                folder: self.folder.display().to_string(),
            }
            .into());
        }
        let img = image::open(&path).map_err(|_| ImageError::LoadFailed {
            path: path.display().to_string(),
        })?;
        Ok(img.to_luma8())
    }

    /// Fetch a mask and resize it to the target dimensions
    pub fn get_resized(&self, id: u32, width: u32, height: u32) -> Result<Mask> {
        let mask = self.get(id)?;
        if mask.dimensions() == (width, height) {
            return Ok(mask);
        }
        Ok(imageops::resize(&mask, width, height, FilterType::Triangle))
    }
}
