//! Accessibility-facing descriptors for the keyboard's virtual key
//! children.
//!
//! The widget itself has no accessibility tree; the host feeds these
//! descriptors into whatever platform plumbing it owns, and pairs them with
//! [`PianoState::first_visible_key`]/[`PianoState::last_visible_key`] for
//! traversal windows and [`PianoState::hovered_key`] for touch exploration.

use egui::Rect;
use klavier_music::Pitch;

use crate::model::KeyTable;
use crate::state::PianoState;

/// One virtual key child, in instrument coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyInfo {
    pub index: usize,
    pub code: i32,
    /// Spoken label: the canonical pitch name.
    pub label: String,
    pub bounds: Rect,
    pub pressed: bool,
}

/// Descriptors for every key of the instrument, in pitch order.
pub fn key_descriptors(table: &KeyTable) -> Vec<KeyInfo> {
    table
        .keys()
        .iter()
        .enumerate()
        .map(|(index, key)| KeyInfo {
            index,
            code: key.code,
            label: Pitch::from_code(key.code).to_string(),
            bounds: key.bounds,
            pressed: key.pressed,
        })
        .collect()
}

impl PianoState {
    /// Descriptors for the current layout; empty before the first layout
    /// pass.
    pub fn key_descriptors(&self) -> Vec<KeyInfo> {
        self.table().map(key_descriptors).unwrap_or_default()
    }
}
