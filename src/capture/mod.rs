//! Screen capture
//!
//! Grabbing pixels from the host is the host's business; this module defines
//! the seam (`CaptureSource`) and persists what it returns.

pub mod image;

pub use self::image::{ImageFileSource, Screenshot};

use std::path::{Path, PathBuf};

use ::image::RgbaImage;

use crate::render::{EncodeError, save_png_temp};

/// Why a screenshot could not be produced
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Screen capture unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to load screenshot {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error("Captured screenshot is empty")]
    Empty,

    #[error("Failed to save screenshot: {0}")]
    Save(#[from] EncodeError),
}

/// Something that can produce the pixels currently on screen
pub trait CaptureSource {
    fn capture(&self) -> Result<RgbaImage, CaptureError>;
}

impl<F> CaptureSource for F
where
    F: Fn() -> Result<RgbaImage, CaptureError>,
{
    fn capture(&self) -> Result<RgbaImage, CaptureError> {
        self()
    }
}

/// Capture the screen and store it as a PNG in `dir`
pub fn capture_to_file(source: &dyn CaptureSource, dir: &Path) -> Result<Screenshot, CaptureError> {
    let rgba = source.capture()?;
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(CaptureError::Empty);
    }
    let path = save_png_temp(&rgba, dir)?;
    log::info!(
        "Captured {}x{} screenshot to {}",
        rgba.width(),
        rgba.height(),
        path.display()
    );
    Ok(Screenshot {
        path,
        width: rgba.width(),
        height: rgba.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = || -> Result<RgbaImage, CaptureError> { Ok(RgbaImage::new(4, 3)) };
        let shot = capture_to_file(&source, dir.path()).unwrap();
        assert_eq!((shot.width, shot.height), (4, 3));
        assert!(shot.path.exists());
    }

    #[test]
    fn test_capture_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let source =
            || -> Result<RgbaImage, CaptureError> { Err(CaptureError::Unavailable("no window".into())) };
        let err = capture_to_file(&source, dir.path()).unwrap_err();
        assert!(matches!(err, CaptureError::Unavailable(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_capture_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = || -> Result<RgbaImage, CaptureError> { Ok(RgbaImage::new(0, 0)) };
        assert!(matches!(
            capture_to_file(&source, dir.path()),
            Err(CaptureError::Empty)
        ));
    }
}
