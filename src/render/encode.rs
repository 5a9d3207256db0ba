//! PNG encoding for screenshots and rendered shades

use std::io;
use std::path::{Path, PathBuf};

use image::RgbaImage;

/// Failure to write an encoded image to disk
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// Encode `image` as an 8-bit RGBA PNG
pub fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// Persist `image` as `PNG_<yyyyMMdd_HHmmss>_<random>.png` inside `dir`
pub fn save_png_temp(image: &RgbaImage, dir: &Path) -> Result<PathBuf, EncodeError> {
    std::fs::create_dir_all(dir)?;
    let prefix = chrono::Local::now()
        .format("PNG_%Y%m%d_%H%M%S_")
        .to_string();
    let mut file = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".png")
        .tempfile_in(dir)?;
    write_png(&mut file, image)?;
    let (_, path) = file.keep().map_err(io::Error::from)?;
    log::debug!("Saved {}x{} image to {}", image.width(), image.height(), path.display());
    Ok(path)
}
