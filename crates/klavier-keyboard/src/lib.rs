//! Scrollable, pinch-zoomable piano keyboard widget for egui.
//!
//! The widget lays out a four-octave keyboard procedurally, tracks a single
//! touch to highlight and report pressed keys, pans and flings horizontally,
//! pinch-zooms between 1x and 2x, and draws overlay markers for a set of
//! pitches supplied by the host.

pub mod access;
mod edge_glow;
mod gesture;
pub mod model;
pub mod state;
pub mod theme;
pub mod ui;

pub use access::KeyInfo;
pub use model::{Key, KeyTable, KEYS_IN_OCTAVE, OCTAVES, START_CODE};
#[cfg(feature = "persistence")]
pub use state::PersistError;
pub use state::{PianoState, SavedState, ScrollMetrics, MAX_SCALE, MIN_SCALE};
pub use theme::Theme;
pub use ui::{Options, OverlayStyle};

/// Props for rendering the keyboard.
pub struct PianoProps<'a> {
    pub state: &'a mut PianoState,
    pub options: &'a Options,
    pub theme: &'a Theme,
    /// Called once per completed tap with the tapped key's pitch code
    /// (UI thread, synchronous).
    pub on_key_pressed: Option<Box<dyn FnMut(i32) + 'a>>,
    /// Called once when a touch is held on a key past the long-press
    /// threshold.
    pub on_key_long_pressed: Option<Box<dyn FnMut(i32) + 'a>>,
}

pub fn render(ui: &mut egui::Ui, props: PianoProps<'_>) -> egui::Response {
    ui::keyboard::render(ui, props)
}
