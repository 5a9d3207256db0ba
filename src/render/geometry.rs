//! Shared constants for drawing the shade layer

/// Alpha of the dimmed area around markers (65% black)
pub const SHADE_ALPHA: u8 = 0xA6;

/// Width of the accent ring drawn around every marker
pub const ACCENT_STROKE: f32 = 5.0;

/// Width of the ring drawn around the marker being edited
pub const ACTIVE_STROKE: f32 = 5.0;

/// Gap between a marker's edge and its active ring
pub const ACTIVE_RING_OFFSET: f32 = 5.0;
