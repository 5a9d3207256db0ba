//! Overlay session
//!
//! An `Overlay` lives from the moment the base screen is captured until the
//! user finishes (producing a `Report`) or cancels. It owns the marker board
//! and turns gestures into board operations.

pub mod messages;

pub use messages::Gesture;

use std::path::Path;

use image::RgbaImage;

use crate::board::MarkerBoard;
use crate::capture::{CaptureError, CaptureSource, Screenshot, capture_to_file};
use crate::config::FlyTrapConfig;
use crate::domain::Point;
use crate::render::{self, EncodeError};
use crate::report::{Report, build_report};

/// Why finishing an overlay failed
#[derive(Debug, thiserror::Error)]
pub enum FinishError {
    #[error("Cannot render shade on a {0}x{1} canvas")]
    EmptyCanvas(u32, u32),

    #[error("Failed to save shade screenshot: {0}")]
    Save(#[from] EncodeError),
}

/// A running annotation overlay
#[derive(Debug)]
pub struct Overlay {
    config: FlyTrapConfig,
    board: MarkerBoard,
    base: Screenshot,
}

impl Overlay {
    /// Capture the screen into `cache_dir` and start annotating it
    ///
    /// If capture fails the overlay does not start.
    pub fn start(
        config: FlyTrapConfig,
        source: &dyn CaptureSource,
        cache_dir: &Path,
    ) -> Result<Self, CaptureError> {
        let base = capture_to_file(source, cache_dir)?;
        Ok(Self::with_screenshot(config, base))
    }

    /// Start annotating a screenshot that is already on disk
    pub fn with_screenshot(config: FlyTrapConfig, base: Screenshot) -> Self {
        let board = MarkerBoard::new(&config);
        Self {
            config,
            board,
            base,
        }
    }

    pub fn config(&self) -> &FlyTrapConfig {
        &self.config
    }

    pub fn board(&self) -> &MarkerBoard {
        &self.board
    }

    pub fn base_screenshot(&self) -> &Screenshot {
        &self.base
    }

    /// Apply a gesture; returns true if it changed or grabbed anything
    pub fn handle(&mut self, gesture: Gesture) -> bool {
        match gesture {
            Gesture::Tap { x, y } => {
                let point = Point::new(x, y);
                if self.board.hit_test(point).is_some() {
                    return false;
                }
                let marker = self.board.next_marker(point);
                self.board.add_or_absorb(marker);
                true
            }
            Gesture::LongPress { x, y } => match self.board.hit_test(Point::new(x, y)) {
                Some(marker) => {
                    let id = marker.id();
                    self.board.begin_edit(id)
                }
                None => {
                    let was_editing = self.board.selection().is_editing();
                    self.board.dismiss_edit();
                    was_editing
                }
            },
            Gesture::Press { x, y } => self.board.press(Point::new(x, y)),
            Gesture::DragTo { x, y } => self.board.drag_to(Point::new(x, y)),
            Gesture::Release => {
                let was_dragging = self.board.drag().is_some();
                self.board.release();
                was_dragging
            }
            Gesture::EditComment { text } => self.board.set_pending_comment(text),
            Gesture::ConfirmComment => match self.board.selection().pending().map(str::to_owned) {
                Some(text) => self.board.end_edit(text),
                None => false,
            },
        }
    }

    /// Render the shade as it currently looks, including the active ring
    pub fn render_shade(&self) -> Option<RgbaImage> {
        render::render_shade(
            self.base.width,
            self.base.height,
            self.board.markers(),
            self.board.selection().active(),
            &self.config,
        )
    }

    /// Commit any open edit, save the shade into `cache_dir`, and build the report
    pub fn finish(mut self, cache_dir: &Path, title: Option<String>) -> Result<Report, FinishError> {
        self.board.dismiss_edit();
        let shade = self
            .render_shade()
            .ok_or(FinishError::EmptyCanvas(self.base.width, self.base.height))?;
        let shade_path = render::save_png_temp(&shade, cache_dir)?;
        let report = build_report(&self.board, &self.base.path, shade_path, title);
        log::info!(
            "Overlay finished: report {} with {} markers",
            report.title(),
            report.markers().len()
        );
        Ok(report)
    }

    /// Discard the overlay and the captured base screenshot
    pub fn cancel(self) {
        if let Err(err) = std::fs::remove_file(&self.base.path) {
            log::warn!(
                "Could not remove base screenshot {}: {}",
                self.base.path.display(),
                err
            );
        }
        log::debug!("Overlay cancelled with {} markers", self.board.len());
    }
}
