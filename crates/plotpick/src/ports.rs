//! Capabilities the host application provides to a [`PickerSession`](crate::PickerSession).

use crate::point::Point;

/// Synchronous request for the plot value at a clicked reference pixel.
///
/// Returning `None` means the user dismissed the prompt; the click is then
/// dropped without touching the calibration.
pub trait ValuePrompt {
    fn request_value(&mut self, pixel: Point) -> Option<Point>;
}

impl<F> ValuePrompt for F
where
    F: FnMut(Point) -> Option<Point>,
{
    fn request_value(&mut self, pixel: Point) -> Option<Point> {
        self(pixel)
    }
}

/// Destination for clicked-pixel text (the system clipboard in a GUI host).
pub trait ClipboardSink {
    fn copy_text(&mut self, text: &str);
}

impl<F> ClipboardSink for F
where
    F: FnMut(&str),
{
    fn copy_text(&mut self, text: &str) {
        self(text)
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

impl ClipboardSink for NoClipboard {
    fn copy_text(&mut self, _text: &str) {}
}

/// Which pixel ordinates are copied on each click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipMode {
    #[default]
    None,
    X,
    Y,
    Both,
}

impl ClipMode {
    /// Clipboard text for `pixel`, or `None` when copying is off.
    pub fn format(self, pixel: Point) -> Option<String> {
        match self {
            Self::None => None,
            Self::X => Some(format!("{}", pixel.x)),
            Self::Y => Some(format!("{}", pixel.y)),
            Self::Both => Some(format!("{}, {}", pixel.x, pixel.y)),
        }
    }
}
