use serde::{Deserialize, Serialize};

pub const DEFAULT_CURSOR_NAME: &str = "left_ptr";

/// One image of a (possibly animated) cursor. `delay` is how long the image
/// stays up before the next one, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorFrame {
    pub width: i32,
    pub height: i32,
    pub hotspot_x: i32,
    pub hotspot_y: i32,
    #[serde(default)]
    pub delay: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub name: String,
    pub frames: Vec<CursorFrame>,
    #[serde(default = "default_scale")]
    pub scale: i32,
}

fn default_scale() -> i32 { 1 }

impl Cursor {
    pub fn new(name: impl Into<String>, frames: Vec<CursorFrame>) -> Self {
        Self { name: name.into(), frames, scale: 1 }
    }

    /// The theme's default arrow, used when a window has no cursor of its own.
    pub fn default_for_scale(scale: i32) -> Self {
        let mut cursor = Self::new(DEFAULT_CURSOR_NAME, vec![CursorFrame {
            width: 24,
            height: 24,
            hotspot_x: 4,
            hotspot_y: 4,
            delay: 0,
        }]);
        cursor.set_scale(scale);
        cursor
    }

    pub fn set_scale(&mut self, scale: i32) { self.scale = scale.max(1); }

    pub fn is_animated(&self) -> bool { self.frames.len() > 1 }

    /// Returns the frame to show after `current` and the delay attached to it.
    ///
    /// Single-image cursors stay on `current` with no delay, which callers
    /// read as "stop animating".
    pub fn next_image_index(&self, current: usize) -> (usize, u32) {
        if !self.is_animated() {
            return (current, 0);
        }
        let next = if current + 1 < self.frames.len() { current + 1 } else { 0 };
        (next, self.frames[next].delay)
    }

    pub fn frame(&self, index: usize) -> Option<&CursorFrame> { self.frames.get(index) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    fn frame(delay: u32) -> CursorFrame {
        CursorFrame { width: 16, height: 16, hotspot_x: 0, hotspot_y: 0, delay }
    }

    #[test]
    fn it_wraps_around_animated_frames() {
        let cursor = Cursor::new("watch", vec![frame(50), frame(60), frame(70)]);
        assert_eq!(cursor.next_image_index(0), (1, 60));
        assert_eq!(cursor.next_image_index(1), (2, 70));
        assert_eq!(cursor.next_image_index(2), (0, 50));
    }

    #[test]
    fn it_does_not_advance_static_cursors() {
        let cursor = Cursor::default_for_scale(2);
        assert_eq!(cursor.scale, 2);
        assert_eq!(cursor.next_image_index(0), (0, 0));
    }
}
