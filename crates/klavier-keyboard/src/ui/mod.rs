use egui::Color32;

pub mod keyboard;

/// How overlay markers render on top of keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayStyle {
    /// A filled disc with the pitch name as centered text.
    Text,
    /// A filled disc with a notehead glyph and an optional accidental sign.
    Glyph,
}

/// Overlay configuration, resolved once by the host.
#[derive(Clone, Debug)]
pub struct Options {
    pub overlay_style: OverlayStyle,
    pub overlay_color: Color32,
    pub overlay_radius: f32,
    pub overlay_text_size: f32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            overlay_style: OverlayStyle::Glyph,
            overlay_color: Color32::from_rgb(80, 200, 120),
            overlay_radius: 24.0,
            overlay_text_size: 12.0,
        }
    }
}

impl Options {
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.overlay_style = style;
        self
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.overlay_color = color;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.overlay_radius = radius.max(4.0);
        self
    }

    pub fn with_text_size(mut self, size: f32) -> Self {
        self.overlay_text_size = size.max(6.0);
        self
    }
}
