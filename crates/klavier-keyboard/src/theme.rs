//! Visual design tokens used by the keyboard renderer.

use egui::{Color32, Stroke};

#[derive(Clone, Debug)]
pub struct Theme {
    pub background: Color32,
    pub white_key: Color32,
    pub white_key_pressed: Color32,
    pub black_key: Color32,
    pub black_key_pressed: Color32,
    pub key_outline: Stroke,
    pub overlay_text: Color32,
    pub edge_glow: Color32,
}

impl Theme {
    /// Ivory-and-ebony look of an acoustic instrument.
    pub fn classic() -> Self {
        Self {
            background: Color32::from_rgb(24, 24, 27),
            white_key: Color32::from_rgb(246, 244, 238),
            white_key_pressed: Color32::from_rgb(168, 204, 248),
            black_key: Color32::from_rgb(32, 32, 36),
            black_key_pressed: Color32::from_rgb(78, 120, 178),
            key_outline: Stroke::new(1.0, Color32::from_rgb(58, 58, 64)),
            overlay_text: Color32::from_rgb(16, 16, 16),
            edge_glow: Color32::from_rgb(120, 170, 250),
        }
    }

    /// Muted grays for embedding in a dark editor chrome.
    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(20, 21, 24),
            white_key: Color32::from_rgb(207, 209, 213),
            white_key_pressed: Color32::from_rgb(120, 170, 250),
            black_key: Color32::from_rgb(60, 61, 65),
            black_key_pressed: Color32::from_rgb(90, 130, 190),
            key_outline: Stroke::new(1.0, Color32::from_rgb(44, 45, 50)),
            overlay_text: Color32::from_rgb(20, 20, 22),
            edge_glow: Color32::from_rgb(140, 180, 255),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
