//! Input gestures routed into an overlay

use serde::{Deserialize, Serialize};

/// One user gesture on the overlay, in screen coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum Gesture {
    /// Quick tap: drops a marker on empty space
    Tap { x: f32, y: f32 },
    /// Long press: opens a marker for editing, or closes the editor on empty space
    LongPress { x: f32, y: f32 },
    /// Finger down on a marker, starting a move or resize
    Press { x: f32, y: f32 },
    /// Finger moved while pressed
    DragTo { x: f32, y: f32 },
    /// Finger lifted
    Release,
    /// Text typed into the comment editor
    EditComment { text: String },
    /// Comment editor confirmed
    ConfirmComment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_script_parses() {
        let script = r#"[
            { "gesture": "tap", "x": 10, "y": 20 },
            { "gesture": "long_press", "x": 10, "y": 20 },
            { "gesture": "edit_comment", "text": "broken" },
            { "gesture": "confirm_comment" },
            { "gesture": "release" }
        ]"#;
        let gestures: Vec<Gesture> = serde_json::from_str(script).unwrap();
        assert_eq!(gestures.len(), 5);
        assert_eq!(gestures[0], Gesture::Tap { x: 10.0, y: 20.0 });
        assert_eq!(gestures[1], Gesture::LongPress { x: 10.0, y: 20.0 });
        assert_eq!(
            gestures[2],
            Gesture::EditComment {
                text: "broken".into()
            }
        );
        assert_eq!(gestures[4], Gesture::Release);
    }
}
