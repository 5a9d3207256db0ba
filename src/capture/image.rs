//! Screenshot types backed by image files

use std::path::{Path, PathBuf};

use image::RgbaImage;

use super::{CaptureError, CaptureSource};

/// A screenshot persisted on disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screenshot {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Capture source that replays an existing image file
///
/// Used by headless drivers and tests in place of a live screen.
#[derive(Clone, Debug)]
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaptureSource for ImageFileSource {
    fn capture(&self) -> Result<RgbaImage, CaptureError> {
        let rgba = image::open(&self.path)
            .map_err(|source| CaptureError::Load {
                path: self.path.clone(),
                source,
            })?
            .to_rgba8();
        log::debug!(
            "Loaded screenshot {}: {}x{} pixels",
            self.path.display(),
            rgba.width(),
            rgba.height()
        );
        Ok(rgba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_file_source_loads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.png");
        let img = RgbaImage::from_pixel(5, 7, image::Rgba([1, 2, 3, 255]));
        img.save(&path).unwrap();

        let loaded = ImageFileSource::new(&path).capture().unwrap();
        assert_eq!(loaded, img);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let source = ImageFileSource::new("/definitely/not/here.png");
        assert!(matches!(source.capture(), Err(CaptureError::Load { .. })));
    }
}
