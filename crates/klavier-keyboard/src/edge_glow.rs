//! Cosmetic overscroll glow at the viewport edges.
//!
//! Pulling past a scroll boundary feeds intensity in, a fling hitting the
//! boundary absorbs its velocity, and the glow fades out over the following
//! frames. Purely visual; never part of the scroll contract.

use egui::{pos2, Color32, Rect, Shape, Ui};
use epaint::Mesh;

/// Which viewport edge a glow or fling boundary belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Fade rate once the pull stops, in intensity units per second.
const DECAY_PER_SEC: f32 = 2.2;

/// Fling speed (px/s) that maps to a full-intensity glow.
const ABSORB_FULL_SPEED: f32 = 1600.0;

/// Widest glow strip, as a fraction of the viewport width.
const MAX_WIDTH_FRACTION: f32 = 0.14;

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct EdgeGlow {
    intensity: f32,
}

impl EdgeGlow {
    /// Feeds the glow from a drag past the boundary. `amount` is the drag
    /// distance as a fraction of the viewport width.
    pub fn pull(&mut self, amount: f32) {
        self.intensity = (self.intensity + amount.abs() * 2.0).clamp(0.0, 1.0);
    }

    /// Feeds the glow from a fling hitting the boundary at `velocity` px/s.
    pub fn absorb(&mut self, velocity: f32) {
        let target = (velocity.abs() / ABSORB_FULL_SPEED).clamp(0.0, 1.0);
        self.intensity = self.intensity.max(target);
    }

    /// Advances the fade-out. Returns whether the glow still needs frames.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.intensity <= 0.0 {
            return false;
        }
        self.intensity = (self.intensity - DECAY_PER_SEC * dt).max(0.0);
        self.intensity > 0.0
    }

    pub fn is_active(&self) -> bool {
        self.intensity > 0.0
    }

    /// Paints the glow as a horizontal gradient strip fading inward from
    /// the given edge.
    pub fn paint(&self, ui: &Ui, rect: Rect, side: Side, color: Color32) {
        if !self.is_active() {
            return;
        }
        let width = rect.width() * MAX_WIDTH_FRACTION * self.intensity;
        let (outer, inner) = match side {
            Side::Left => (rect.left(), rect.left() + width),
            Side::Right => (rect.right(), rect.right() - width),
        };
        let tint = color.gamma_multiply(self.intensity * 0.6);

        let mut mesh = Mesh::default();
        mesh.colored_vertex(pos2(outer, rect.top()), tint);
        mesh.colored_vertex(pos2(inner, rect.top()), Color32::TRANSPARENT);
        mesh.colored_vertex(pos2(inner, rect.bottom()), Color32::TRANSPARENT);
        mesh.colored_vertex(pos2(outer, rect.bottom()), tint);
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        ui.painter_at(rect).add(Shape::mesh(mesh));
    }
}
