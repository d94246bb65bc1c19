//! Widget state retained by the host across frames: scroll/scale viewport,
//! the overlay note set, and the save/restore snapshot.

use klavier_music::Pitch;
use tracing::debug;

use crate::edge_glow::EdgeGlow;
use crate::gesture::GestureController;
use crate::model::KeyTable;

/// Minimum pinch scale.
pub const MIN_SCALE: f32 = 1.0;
/// Maximum pinch scale.
pub const MAX_SCALE: f32 = 2.0;

/// Scroll snapshot that survives a layout-destroying event.
///
/// Restore it before the first frame after reconstruction; if the instrument
/// is rebuilt at a different width the offset is rescaled proportionally.
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SavedState {
    pub scroll_offset_px: i32,
    pub instrument_width_px: i32,
}

/// Persistence failures for [`SavedState`].
#[cfg(feature = "persistence")]
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("malformed saved state: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "persistence")]
impl SavedState {
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Scroll geometry for host scrollbars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollMetrics {
    /// Total scrollable range: the instrument width.
    pub range: i32,
    /// Viewport extent.
    pub extent: i32,
    /// Current clamped offset.
    pub offset: i32,
}

/// Retained state of one keyboard widget.
pub struct PianoState {
    /// Horizontal scroll offset in instrument pixels. May leave the clamp
    /// range transiently while overscrolling; reads go through
    /// [`PianoState::clamped_offset`].
    pub scroll_px: f32,
    /// Horizontal pinch scale, clamped to `[MIN_SCALE, MAX_SCALE]`.
    pub scale: f32,
    pub(crate) table: Option<KeyTable>,
    pub(crate) gesture: GestureController,
    pub(crate) left_glow: EdgeGlow,
    pub(crate) right_glow: EdgeGlow,
    pub(crate) hovered: Option<usize>,
    pub(crate) visible_window: Option<(f32, f32)>,
    instrument_width: i32,
    viewport_width: f32,
    notes: Vec<Pitch>,
}

impl Default for PianoState {
    fn default() -> Self {
        Self {
            scroll_px: 0.0,
            scale: MIN_SCALE,
            table: None,
            gesture: GestureController::default(),
            left_glow: EdgeGlow::default(),
            right_glow: EdgeGlow::default(),
            hovered: None,
            visible_window: None,
            instrument_width: 0,
            viewport_width: 0.0,
            notes: Vec::new(),
        }
    }
}

impl PianoState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The overlay note set, in insertion order.
    pub fn notes(&self) -> &[Pitch] {
        &self.notes
    }

    /// Adds pitches to the overlay set. Duplicates collapse; enharmonic
    /// spellings of the same semitone are distinct members.
    pub fn add_notes<I: IntoIterator<Item = Pitch>>(&mut self, pitches: I) {
        for pitch in pitches {
            if !self.notes.contains(&pitch) {
                self.notes.push(pitch);
            }
        }
    }

    pub fn remove_notes<I: IntoIterator<Item = Pitch>>(&mut self, pitches: I) {
        for pitch in pitches {
            self.notes.retain(|existing| *existing != pitch);
        }
    }

    pub fn clear_notes(&mut self) {
        self.notes.clear();
    }

    /// The key arena, once a layout pass has run.
    pub fn table(&self) -> Option<&KeyTable> {
        self.table.as_ref()
    }

    pub fn instrument_width(&self) -> i32 {
        self.instrument_width
    }

    /// Rebuilds the key table if the target height changed. The rebuild is a
    /// wholesale replace; a scroll offset carried over from the previous
    /// layout (or from [`PianoState::restore`]) is rescaled to the new
    /// instrument width.
    pub fn ensure_layout(&mut self, height: f32) {
        let needs_rebuild = self
            .table
            .as_ref()
            .map_or(true, |table| (table.height() - height).abs() > 0.5);
        if !needs_rebuild {
            return;
        }

        let table = KeyTable::build(height);
        let old_width = self.instrument_width;
        let new_width = table.width();
        if old_width > 0 && old_width != new_width {
            let ratio = new_width as f32 / old_width as f32;
            self.scroll_px *= ratio;
            debug!(old_width, new_width, "rescaled scroll offset after relayout");
        }
        self.instrument_width = new_width;
        self.table = Some(table);
    }

    /// Offset actually used for drawing and hit testing: clamped to
    /// `[0, instrument_width - viewport_width]`, degenerating to `0` when
    /// the instrument is narrower than the viewport.
    pub fn clamped_offset(&self, viewport_width: f32) -> f32 {
        let max = self.instrument_width as f32 - viewport_width;
        if max <= 0.0 {
            0.0
        } else {
            self.scroll_px.clamp(0.0, max)
        }
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Animates the offset toward `x` over the next frames.
    pub fn smooth_scroll_to(&mut self, x: f32) {
        self.gesture.start_smooth_scroll(x);
    }

    /// Clears any tracked touch and pressed key without firing callbacks.
    /// Hosts call this when the pointer stream is cancelled.
    pub fn cancel_touch(&mut self) {
        self.gesture.cancel();
        if let Some(table) = self.table.as_mut() {
            table.release();
        }
        self.scroll_px = self.clamped_offset(self.viewport_width);
    }

    pub fn save(&self) -> SavedState {
        SavedState {
            scroll_offset_px: self.clamped_offset(self.viewport_width).round() as i32,
            instrument_width_px: self.instrument_width,
        }
    }

    /// Reapplies a saved scroll position. When the current layout width
    /// differs from the saved one (or layout has not run yet), the offset is
    /// rescaled on the next layout pass.
    pub fn restore(&mut self, saved: SavedState) {
        self.scroll_px = saved.scroll_offset_px as f32;
        match self.table.as_ref() {
            None => {
                self.instrument_width = saved.instrument_width_px;
            }
            Some(table) => {
                let new_width = table.width();
                if saved.instrument_width_px > 0 && saved.instrument_width_px != new_width {
                    let ratio = new_width as f32 / saved.instrument_width_px as f32;
                    self.scroll_px *= ratio;
                }
                self.instrument_width = new_width;
            }
        }
    }

    pub fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            range: self.instrument_width,
            extent: self.viewport_width.round() as i32,
            offset: self.clamped_offset(self.viewport_width).round() as i32,
        }
    }

    /// Key index under an idle pointer, for hover-driven accessibility
    /// feedback.
    pub fn hovered_key(&self) -> Option<usize> {
        self.hovered
    }

    /// Code of the first key intersecting the current viewport.
    pub fn first_visible_key(&self) -> Option<i32> {
        let (left, right) = self.visible_window?;
        let table = self.table.as_ref()?;
        let (first, _) = table.visible_range(left, right);
        table.key(first).map(|key| key.code)
    }

    /// Code of the last key intersecting the current viewport.
    pub fn last_visible_key(&self) -> Option<i32> {
        let (left, right) = self.visible_window?;
        let table = self.table.as_ref()?;
        let (_, last) = table.visible_range(left, right);
        table.key(last).map(|key| key.code)
    }

    pub(crate) fn record_viewport(&mut self, viewport_width: f32, left: f32, right: f32) {
        self.viewport_width = viewport_width;
        self.visible_window = Some((left, right));
    }
}

#[cfg(test)]
mod tests {
    use klavier_music::Letter;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn offset_clamps_to_the_scrollable_range() {
        let mut state = PianoState::new();
        state.ensure_layout(180.0);
        let width = state.instrument_width() as f32;

        state.scroll_px = -40.0;
        assert_eq!(state.clamped_offset(300.0), 0.0);

        state.scroll_px = width;
        assert_eq!(state.clamped_offset(300.0), width - 300.0);

        state.scroll_px = 120.0;
        assert_eq!(state.clamped_offset(300.0), 120.0);
    }

    #[test]
    fn narrow_instrument_forces_offset_to_zero() {
        let mut state = PianoState::new();
        state.ensure_layout(180.0);
        state.scroll_px = 50.0;
        let wide_viewport = state.instrument_width() as f32 + 500.0;
        assert_eq!(state.clamped_offset(wide_viewport), 0.0);
    }

    #[test]
    fn relayout_rescales_the_offset() {
        let mut state = PianoState::new();
        state.ensure_layout(180.0);
        state.scroll_px = 100.0;

        // Doubling the height roughly doubles the instrument width.
        let old_width = state.instrument_width();
        state.ensure_layout(360.0);
        let new_width = state.instrument_width();
        assert!(new_width > old_width);
        let expected = 100.0 * new_width as f32 / old_width as f32;
        assert!((state.scroll_px - expected).abs() < 1e-3);
    }

    #[test]
    fn restore_before_layout_rescales_on_first_pass() {
        let mut state = PianoState::new();
        state.restore(SavedState {
            scroll_offset_px: 203,
            instrument_width_px: 812,
        });
        // First layout happens at double the original height: the white key
        // width becomes round(360 / 6.12) = 59, so the instrument spans
        // 59 * 7 * 4 = 1652 and a quarter-width offset stays a quarter.
        state.ensure_layout(360.0);
        assert_eq!(state.instrument_width(), 1652);
        assert!((state.scroll_px - 413.0).abs() < 1e-3);
    }

    #[test]
    fn restore_after_layout_rescales_immediately() {
        let mut state = PianoState::new();
        state.ensure_layout(360.0);
        state.restore(SavedState {
            scroll_offset_px: 203,
            instrument_width_px: 812,
        });
        assert!((state.scroll_px - 413.0).abs() < 1e-3);
    }

    #[test]
    fn overlay_set_collapses_duplicates_but_keeps_spellings() {
        let mut state = PianoState::new();
        let c_sharp = Letter::C.sharp().in_octave(2);
        let d_flat = Letter::D.flat().in_octave(2);
        state.add_notes([c_sharp, c_sharp, d_flat]);
        assert_eq!(state.notes(), &[c_sharp, d_flat]);

        state.remove_notes([c_sharp]);
        assert_eq!(state.notes(), &[d_flat]);

        state.clear_notes();
        assert!(state.notes().is_empty());
    }

    #[test]
    fn scale_setter_clamps() {
        let mut state = PianoState::new();
        state.set_scale(5.0);
        assert_eq!(state.scale, MAX_SCALE);
        state.set_scale(0.2);
        assert_eq!(state.scale, MIN_SCALE);
    }
}
