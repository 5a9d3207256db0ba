//! Circular bug markers dropped on the captured screen

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::Point;
use crate::config::Rgb;

/// Smallest radius a marker may have
pub const MIN_RADIUS: f32 = 1.0;

/// Identifier of a marker, unique within one board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(pub u32);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A circle on the shade that highlights one bug
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    id: MarkerId,
    center: Point,
    radius: f32,
    color: Rgb,
    comment: String,
}

/// Plain data snapshot of a marker, as written to `metadata.json`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub id: MarkerId,
    pub center: Point,
    pub radius: f32,
    pub accent_color: Rgb,
    #[serde(default)]
    pub comment: String,
}

fn clamp_radius(radius: f32) -> f32 {
    if radius.is_finite() {
        radius.max(MIN_RADIUS)
    } else {
        MIN_RADIUS
    }
}

impl Marker {
    /// Create a marker with an empty comment
    pub fn place(id: MarkerId, center: Point, radius: f32, color: Rgb) -> Self {
        Self {
            id,
            center,
            radius: clamp_radius(radius),
            color,
            comment: String::new(),
        }
    }

    /// Rebuild a marker from its record
    pub fn from_record(record: MarkerRecord) -> Self {
        Self {
            id: record.id,
            center: record.center,
            radius: clamp_radius(record.radius),
            color: record.accent_color,
            comment: record.comment,
        }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: MarkerId) {
        self.id = id;
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    /// Move the marker by the given offset
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.center = self.center.translate(dx, dy);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Set the radius; values below `MIN_RADIUS` (or not finite) are clamped
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = clamp_radius(radius);
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Check if a point lies strictly inside this marker
    pub fn hit_test(&self, point: Point) -> bool {
        point.distance(self.center) < self.radius
    }

    /// Circle-circle intersection; tangent circles do not overlap
    pub fn overlaps(&self, other: &Marker) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) < reach * reach
    }

    pub fn to_record(&self) -> MarkerRecord {
        MarkerRecord {
            id: self.id,
            center: self.center,
            radius: self.radius,
            accent_color: self.color,
            comment: self.comment.clone(),
        }
    }
}
