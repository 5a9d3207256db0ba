//! Drop bug markers on a screenshot, comment on them, and ship the
//! annotated report to a developer.

pub mod board;
pub mod capture;
pub mod config;
pub mod delivery;
pub mod domain;
pub mod render;
pub mod report;
pub mod session;

pub use board::{MarkerBoard, Placement, Selection};
pub use config::{FlyTrapConfig, Rgb, ScreenshotQuality};
pub use delivery::{Delivered, Delivery, DeliveryContext, DeliveryError};
pub use domain::{Marker, MarkerId, MarkerRecord, Point};
pub use report::{Report, ReportMetadata, build_report};
pub use session::{Gesture, Overlay};
