//! Shade rendering module
//!
//! This module contains:
//! - Geometry constants for the shade layer
//! - Image rendering using tiny-skia
//! - PNG encoding of rendered images

pub mod encode;
pub mod geometry;
pub mod image;

pub use self::encode::{EncodeError, save_png_temp, write_png};
pub use self::image::render_shade;
