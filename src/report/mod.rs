//! Report assembly
//!
//! A `Report` is built once, when the overlay finishes, from a snapshot of the
//! board and the two screenshots. It never changes afterwards.

pub mod package;

pub use package::{
    ApiPayload, BASE_FILE, PackageError, SHADE_FILE, compress, file_name_for,
    generate_api_payload, generate_compressed, write_to_directory,
};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::board::MarkerBoard;
use crate::domain::MarkerRecord;

/// Name of the metadata file inside a packaged report
pub const METADATA_FILE: &str = "metadata.json";

/// Annotated screenshot plus everything needed to describe it
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    title: String,
    timestamp: DateTime<Local>,
    markers: Vec<MarkerRecord>,
    base_screenshot: PathBuf,
    shade_screenshot: PathBuf,
}

/// Serialized form of a report, sent as `metadata.json` or the `meta` part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub title: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub bugs: Vec<MarkerRecord>,
}

/// `TRAP_REPORT_<yyyyMMdd_HHmmss>`
pub fn default_title(now: DateTime<Local>) -> String {
    now.format("TRAP_REPORT_%Y%m%d_%H%M%S").to_string()
}

/// Build a report stamped with the current local time
pub fn build_report(
    board: &MarkerBoard,
    base_screenshot: impl Into<PathBuf>,
    shade_screenshot: impl Into<PathBuf>,
    title: Option<String>,
) -> Report {
    build_report_at(board, base_screenshot, shade_screenshot, title, Local::now())
}

/// Build a report stamped with `now`
///
/// A missing or blank title is replaced by [`default_title`].
pub fn build_report_at(
    board: &MarkerBoard,
    base_screenshot: impl Into<PathBuf>,
    shade_screenshot: impl Into<PathBuf>,
    title: Option<String>,
    now: DateTime<Local>,
) -> Report {
    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| default_title(now));
    Report {
        title,
        timestamp: now,
        markers: board.snapshot(),
        base_screenshot: base_screenshot.into(),
        shade_screenshot: shade_screenshot.into(),
    }
}

impl Report {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn markers(&self) -> &[MarkerRecord] {
        &self.markers
    }

    pub fn base_screenshot(&self) -> &Path {
        &self.base_screenshot
    }

    pub fn shade_screenshot(&self) -> &Path {
        &self.shade_screenshot
    }

    pub fn metadata(&self) -> ReportMetadata {
        ReportMetadata {
            title: self.title.clone(),
            timestamp: self.timestamp.timestamp_millis(),
            bugs: self.markers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlyTrapConfig;
    use crate::domain::Point;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2014, 7, 9, 13, 5, 9).unwrap()
    }

    fn board_with_markers() -> MarkerBoard {
        let mut board = MarkerBoard::new(&FlyTrapConfig::default());
        for x in [0.0, 200.0] {
            let marker = board.next_marker(Point::new(x, 10.0));
            board.add_or_absorb(marker);
        }
        board
    }

    #[test]
    fn test_default_title() {
        assert_eq!(default_title(fixed_time()), "TRAP_REPORT_20140709_130509");
    }

    #[test]
    fn test_build_report_snapshots_board() {
        let board = board_with_markers();
        let report = build_report_at(&board, "base.png", "shade.png", None, fixed_time());
        assert_eq!(report.title(), "TRAP_REPORT_20140709_130509");
        assert_eq!(report.markers(), board.snapshot().as_slice());
        assert_eq!(report.base_screenshot(), Path::new("base.png"));
        assert_eq!(report.shade_screenshot(), Path::new("shade.png"));
    }

    #[test]
    fn test_title_override() {
        let board = board_with_markers();
        let report = build_report_at(
            &board,
            "a.png",
            "b.png",
            Some("Login screen".into()),
            fixed_time(),
        );
        assert_eq!(report.title(), "Login screen");

        let blank = build_report_at(&board, "a.png", "b.png", Some("  ".into()), fixed_time());
        assert_eq!(blank.title(), "TRAP_REPORT_20140709_130509");
    }

    #[test]
    fn test_metadata_json_shape() {
        let board = board_with_markers();
        let report = build_report_at(&board, "a.png", "b.png", None, fixed_time());
        let json = serde_json::to_value(report.metadata()).unwrap();

        assert_eq!(json["title"], "TRAP_REPORT_20140709_130509");
        assert_eq!(json["timestamp"], fixed_time().timestamp_millis());
        let bugs = json["bugs"].as_array().unwrap();
        assert_eq!(bugs.len(), 2);
        assert_eq!(bugs[1]["center"]["x"], 200.0);
        assert_eq!(bugs[0]["accent_color"], "#33B5E5");
        assert_eq!(bugs[0]["comment"], "");
    }
}
