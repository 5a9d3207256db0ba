//! Shade rendering using tiny-skia
//!
//! The shade is the annotation layer laid over the base screenshot: a dimmed
//! sheet with a transparent hole for every marker, an accent ring around each
//! hole, and an extra ring around the marker being edited.

use image::{Rgba, RgbaImage};
use tiny_skia::{BlendMode, Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::geometry::{ACCENT_STROKE, ACTIVE_RING_OFFSET, ACTIVE_STROKE, SHADE_ALPHA};
use crate::config::{FlyTrapConfig, Rgb};
use crate::domain::{Marker, MarkerId};

fn paint(color: Rgb, anti_alias: bool) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = anti_alias;
    paint
}

/// Copy a premultiplied pixmap into a straight-alpha image
fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

/// Render the shade for `markers` on a `width` x `height` canvas
///
/// Returns `None` when either dimension is zero.
pub fn render_shade(
    width: u32,
    height: u32,
    markers: &[Marker],
    active: Option<MarkerId>,
    config: &FlyTrapConfig,
) -> Option<RgbaImage> {
    let mut pixmap = Pixmap::new(width, height)?;
    let anti_alias = config.screenshot_quality.anti_alias();

    pixmap.fill(Color::from_rgba8(0, 0, 0, SHADE_ALPHA));

    // Punch out the marker holes
    let mut clear = Paint::default();
    clear.blend_mode = BlendMode::Clear;
    clear.anti_alias = anti_alias;
    for marker in markers {
        let center = marker.center();
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, marker.radius()) {
            pixmap.fill_path(&path, &clear, FillRule::Winding, Transform::identity(), None);
        }
    }

    let accent_stroke = Stroke {
        width: ACCENT_STROKE,
        ..Default::default()
    };
    for marker in markers {
        let center = marker.center();
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, marker.radius()) {
            pixmap.stroke_path(
                &path,
                &paint(marker.color(), anti_alias),
                &accent_stroke,
                Transform::identity(),
                None,
            );
        }
    }

    if let Some(marker) = active.and_then(|id| markers.iter().find(|m| m.id() == id)) {
        let center = marker.center();
        let radius = marker.radius() + ACTIVE_RING_OFFSET;
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            let stroke = Stroke {
                width: ACTIVE_STROKE,
                ..Default::default()
            };
            pixmap.stroke_path(
                &path,
                &paint(config.active_color, anti_alias),
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }

    log::debug!(
        "Rendered shade {}x{} with {} markers",
        width,
        height,
        markers.len()
    );
    Some(to_rgba_image(&pixmap))
}
