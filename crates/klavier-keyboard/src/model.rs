//! Key geometry: procedural layout of the key arena and the O(1)
//! coordinate-to-key index.
//!
//! All coordinates in this module are *instrument* coordinates: x grows with
//! pitch from the left end of the keyboard, unaffected by scrolling or
//! scaling. The render pass owns the transform to screen space.

use egui::{pos2, Pos2, Rect};
use klavier_music::Pitch;
use smallvec::SmallVec;
use tracing::debug;

/// Keys per octave.
pub const KEYS_IN_OCTAVE: usize = 12;

/// Octaves laid out by the instrument.
pub const OCTAVES: usize = 4;

/// Semitone code of the leftmost key (C2).
pub const START_CODE: i32 = 24;

/// White key width is `height / WHITE_KEY_ASPECT`.
const WHITE_KEY_ASPECT: f32 = 6.12;

/// Black key height is `height / BLACK_KEY_HEIGHT_RATIO`.
const BLACK_KEY_HEIGHT_RATIO: f32 = 1.57;

/// Semitones within an octave that fall on white keys, in pitch order.
const WHITE_SEMITONES: [usize; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Semitones within an octave that fall on black keys, in pitch order.
const BLACK_SEMITONES: [usize; 5] = [1, 3, 6, 8, 10];

/// One key of the instrument.
///
/// Keys are plain values owned by the [`KeyTable`]; they are rebuilt
/// wholesale whenever the layout height changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Key {
    pub bounds: Rect,
    pub code: i32,
    pub black: bool,
    pub pressed: bool,
}

impl Key {
    /// Half-open containment: the right and bottom edges belong to the
    /// neighbouring key.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.bounds.left() <= x
            && x < self.bounds.right()
            && self.bounds.top() <= y
            && y < self.bounds.bottom()
    }

    /// Anchor point for overlay markers: horizontally centered, pushed below
    /// the black-key band on white keys.
    pub fn overlay_pivot(&self) -> Pos2 {
        let x = self.bounds.center().x;
        let y = if self.black {
            self.bounds.center().y
        } else {
            self.bounds.top() + self.bounds.height() * 0.85
        };
        pos2(x, y)
    }

    pub fn pitch(&self) -> Pitch {
        Pitch::from_code(self.code)
    }
}

fn is_white_semitone(semitone: usize) -> bool {
    WHITE_SEMITONES.contains(&semitone)
}

/// The key arena: every key of the instrument, indexed by
/// `code - START_CODE`, plus the layout constants derived from the last
/// build height.
#[derive(Clone, Debug)]
pub struct KeyTable {
    keys: Vec<Key>,
    height: f32,
    white_key_width: i32,
    octave_width: i32,
    black_key_height: i32,
    pressed: Option<usize>,
}

impl KeyTable {
    /// Lays out `OCTAVES` octaves of keys for the given pixel height.
    ///
    /// The first octave is laid out explicitly; the remaining octaves are
    /// copies translated by whole octave widths with shifted codes.
    pub fn build(height: f32) -> Self {
        let white_key_width = (height / WHITE_KEY_ASPECT).round() as i32;
        let octave_width = white_key_width * 7;
        let black_half_width = octave_width / 20;
        let black_key_height = (height / BLACK_KEY_HEIGHT_RATIO).round() as i32;

        let mut keys = Vec::with_capacity(KEYS_IN_OCTAVE * OCTAVES);
        let mut white_index = 0;
        let mut black_index = 0;
        for semitone in 0..KEYS_IN_OCTAVE {
            let key = if is_white_semitone(semitone) {
                let left = (white_key_width * white_index) as f32;
                white_index += 1;
                Key {
                    bounds: Rect::from_min_max(
                        pos2(left, 0.0),
                        pos2(left + white_key_width as f32, height),
                    ),
                    code: START_CODE + semitone as i32,
                    black: false,
                    pressed: false,
                }
            } else {
                // The pair after C/D sits one white-key slot past its
                // ordinal, the triple after F/G/A two slots past.
                let displacement = if semitone == 1 || semitone == 3 { 1 } else { 2 };
                let center = white_key_width * (black_index + displacement);
                black_index += 1;
                Key {
                    bounds: Rect::from_min_max(
                        pos2((center - black_half_width) as f32, 0.0),
                        pos2((center + black_half_width) as f32, black_key_height as f32),
                    ),
                    code: START_CODE + semitone as i32,
                    black: true,
                    pressed: false,
                }
            };
            keys.push(key);
        }
        for index in KEYS_IN_OCTAVE..KEYS_IN_OCTAVE * OCTAVES {
            let mut key = keys[index % KEYS_IN_OCTAVE];
            let octave = (index / KEYS_IN_OCTAVE) as i32;
            key.bounds = key
                .bounds
                .translate(egui::vec2((octave * octave_width) as f32, 0.0));
            key.code = START_CODE + index as i32;
            keys.push(key);
        }

        debug!(
            height,
            white_key_width, octave_width, black_key_height, "rebuilt key table"
        );

        Self {
            keys,
            height,
            white_key_width,
            octave_width,
            black_key_height,
            pressed: None,
        }
    }

    /// Total instrument width in pixels.
    pub fn width(&self) -> i32 {
        self.octave_width * OCTAVES as i32
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn white_key_width(&self) -> i32 {
        self.white_key_width
    }

    pub fn octave_width(&self) -> i32 {
        self.octave_width
    }

    pub fn black_key_height(&self) -> i32 {
        self.black_key_height
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    /// Index of the key holding the given semitone code, if it is on the
    /// instrument.
    pub fn index_of_code(&self, code: i32) -> Option<usize> {
        let index = code - START_CODE;
        if (0..self.keys.len() as i32).contains(&index) {
            Some(index as usize)
        } else {
            None
        }
    }

    /// Marks the key at `index` pressed, releasing any other pressed key.
    /// At most one key is pressed at a time.
    pub fn press(&mut self, index: usize) {
        if index >= self.keys.len() {
            return;
        }
        self.release();
        self.keys[index].pressed = true;
        self.pressed = Some(index);
    }

    /// Clears the pressed key, if any. Returns whether anything changed.
    pub fn release(&mut self) -> bool {
        match self.pressed.take() {
            Some(index) => {
                self.keys[index].pressed = false;
                true
            }
            None => false,
        }
    }

    pub fn pressed(&self) -> Option<usize> {
        self.pressed
    }

    /// Maps an instrument-space point to the key under it.
    ///
    /// Black keys overlap the upper band of white keys and are tested
    /// first; outside the black band the white slot is computed directly
    /// from the x coordinate. Out-of-range coordinates miss.
    pub fn key_at(&self, x: f32, y: f32) -> Option<usize> {
        if x < 0.0 {
            return None;
        }
        let octave_index = (x / self.octave_width as f32) as usize;

        if y <= self.black_key_height as f32 {
            for semitone in BLACK_SEMITONES {
                let index = octave_index * KEYS_IN_OCTAVE + semitone;
                if self.check_key_at(x, y, index) {
                    return Some(index);
                }
            }
        }

        let local_x = x - (octave_index as i32 * self.octave_width) as f32;
        let white_slot = (local_x / self.white_key_width as f32) as usize;
        if white_slot >= WHITE_SEMITONES.len() {
            return None;
        }
        let index = octave_index * KEYS_IN_OCTAVE + WHITE_SEMITONES[white_slot];
        if self.check_key_at(x, y, index) {
            return Some(index);
        }

        None
    }

    /// First and last key index intersecting the instrument-space window
    /// `[left, right]`.
    ///
    /// Each edge resolves through both key layers; the left edge takes the
    /// smallest match and the right edge the largest, so a key that is only
    /// partially inside the window is always included. Edges that resolve to
    /// nothing fall back to the ends of the instrument.
    pub fn visible_range(&self, left: f32, right: f32) -> (usize, usize) {
        let first = self.edge_key(left, Edge::Left).unwrap_or(0);
        let last = self
            .edge_key(right, Edge::Right)
            .unwrap_or(self.keys.len().saturating_sub(1));
        (first, last)
    }

    fn edge_key(&self, x: f32, edge: Edge) -> Option<usize> {
        if x < 0.0 {
            return None;
        }
        let octave_index = (x / self.octave_width as f32) as usize;

        let mut candidates: SmallVec<[usize; 2]> = SmallVec::new();
        for semitone in BLACK_SEMITONES {
            let index = octave_index * KEYS_IN_OCTAVE + semitone;
            if self.check_key_column(x, index) {
                candidates.push(index);
            }
        }

        let local_x = x - (octave_index as i32 * self.octave_width) as f32;
        let white_slot = (local_x / self.white_key_width as f32) as usize;
        if white_slot < WHITE_SEMITONES.len() {
            let index = octave_index * KEYS_IN_OCTAVE + WHITE_SEMITONES[white_slot];
            if self.check_key_column(x, index) {
                candidates.push(index);
            }
        }

        match edge {
            Edge::Left => candidates.iter().min().copied(),
            Edge::Right => candidates.iter().max().copied(),
        }
    }

    fn check_key_at(&self, x: f32, y: f32, index: usize) -> bool {
        self.keys.get(index).is_some_and(|key| key.contains(x, y))
    }

    /// Column test for viewport edges: a vertical line at `x` crosses the
    /// key if it is inside the key's x extent, regardless of y.
    fn check_key_column(&self, x: f32, index: usize) -> bool {
        self.keys
            .get(index)
            .is_some_and(|key| key.bounds.left() <= x && x < key.bounds.right())
    }

    /// Paint order: every white key of every octave first, then every black
    /// key, so the black layer always ends up on top.
    pub fn draw_order(&self) -> impl Iterator<Item = usize> + '_ {
        let whites = (0..OCTAVES).flat_map(|octave| {
            WHITE_SEMITONES
                .iter()
                .map(move |semitone| octave * KEYS_IN_OCTAVE + semitone)
        });
        let blacks = (0..OCTAVES).flat_map(|octave| {
            BLACK_SEMITONES
                .iter()
                .map(move |semitone| octave * KEYS_IN_OCTAVE + semitone)
        });
        whites.chain(blacks)
    }
}

#[derive(Clone, Copy)]
enum Edge {
    Left,
    Right,
}

#[cfg(test)]
mod tests {
    use klavier_music::Letter;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn start_code_is_c2() {
        assert_eq!(Letter::C.in_octave(2).code(), START_CODE);
    }

    #[test]
    fn layout_constants_for_height_180() {
        let table = KeyTable::build(180.0);
        assert_eq!(table.white_key_width(), 29);
        assert_eq!(table.octave_width(), 203);
        assert_eq!(table.black_key_height(), 115);
        assert_eq!(table.width(), 812);
    }

    #[test]
    fn one_key_per_semitone_sorted_by_code() {
        let table = KeyTable::build(180.0);
        assert_eq!(table.len(), KEYS_IN_OCTAVE * OCTAVES);
        for (index, key) in table.keys().iter().enumerate() {
            assert_eq!(key.code, START_CODE + index as i32);
        }
    }

    #[test]
    fn octave_clones_translate_by_octave_width() {
        let table = KeyTable::build(180.0);
        let octave_width = table.octave_width() as f32;
        for index in 0..table.len() - KEYS_IN_OCTAVE {
            let lower = table.keys()[index].bounds;
            let upper = table.keys()[index + KEYS_IN_OCTAVE].bounds;
            assert_eq!(upper.left(), lower.left() + octave_width);
            assert_eq!(upper.top(), lower.top());
            assert_eq!(upper.height(), lower.height());
        }
    }

    #[test]
    fn black_keys_cluster_in_pair_and_triple() {
        let table = KeyTable::build(180.0);
        let white = table.white_key_width();
        let half = table.octave_width() / 20;
        // Black key centers sit on white-key boundaries 1, 2, 4, 5, 6.
        let expected_centers = [1, 2, 4, 5, 6];
        for (ordinal, semitone) in [1usize, 3, 6, 8, 10].iter().enumerate() {
            let key = table.keys()[*semitone];
            assert!(key.black);
            let center = white * expected_centers[ordinal];
            assert_eq!(key.bounds.left(), (center - half) as f32);
            assert_eq!(key.bounds.right(), (center + half) as f32);
        }
    }

    #[test]
    fn every_key_center_hits_itself() {
        let table = KeyTable::build(180.0);
        for (index, key) in table.keys().iter().enumerate() {
            let center = key.bounds.center();
            assert_eq!(
                table.key_at(center.x, center.y),
                Some(index),
                "center of key {index} (code {})",
                key.code
            );
        }
    }

    #[test]
    fn touch_in_the_white_band_of_the_first_key() {
        let table = KeyTable::build(180.0);
        let hit = table.key_at(0.0, 170.0);
        assert_eq!(hit, Some(0));
        assert_eq!(table.keys()[0].code, 24);
        assert_eq!(table.keys()[0].pitch().to_string(), "C");
    }

    #[test]
    fn touch_above_a_white_key_between_black_keys_hits_the_white_key() {
        let table = KeyTable::build(180.0);
        // x in the gap between C# and D#, y inside the black band.
        let white_d = &table.keys()[2];
        let x = white_d.bounds.center().x;
        assert_eq!(table.key_at(x, 10.0), Some(2));
    }

    #[test]
    fn out_of_range_touches_miss() {
        let table = KeyTable::build(180.0);
        assert_eq!(table.key_at(-4.0, 20.0), None);
        assert_eq!(table.key_at(table.width() as f32 + 1.0, 20.0), None);
        assert_eq!(table.key_at(10.0, table.height() + 1.0), None);
    }

    #[test]
    fn visible_range_is_monotonic() {
        let table = KeyTable::build(180.0);
        let width = table.width() as f32;
        let mut left = 0.0f32;
        while left < width {
            let mut right = left;
            while right < width {
                let (first, last) = table.visible_range(left, right);
                assert!(first <= last, "window [{left}, {right}]");
                right += 37.0;
            }
            left += 53.0;
        }
    }

    #[test]
    fn visible_range_keeps_partially_visible_edge_keys() {
        let table = KeyTable::build(180.0);
        // A window whose left edge is inside the C#2 key: the black key has
        // the smaller index and must win the left edge.
        let c_sharp = table.keys()[1].bounds;
        let (first, _) = table.visible_range(c_sharp.center().x, table.width() as f32 - 1.0);
        assert_eq!(first, 1);

        // Right edge just inside the left half of the same black key, over
        // white key C: the black key has the larger index and must win.
        let x = c_sharp.left() + 1.0;
        let (_, last) = table.visible_range(0.0, x);
        assert_eq!(last, 1);
    }

    #[test]
    fn visible_range_defaults_to_full_instrument() {
        let table = KeyTable::build(180.0);
        let (first, last) = table.visible_range(-10.0, table.width() as f32 + 10.0);
        assert_eq!(first, 0);
        assert_eq!(last, table.len() - 1);
    }

    #[test]
    fn press_is_exclusive() {
        let mut table = KeyTable::build(180.0);
        table.press(3);
        table.press(17);
        table.press(5);
        let pressed: Vec<usize> = table
            .keys()
            .iter()
            .enumerate()
            .filter(|(_, key)| key.pressed)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(pressed, vec![5]);
        assert_eq!(table.pressed(), Some(5));

        assert!(table.release());
        assert!(!table.release());
        assert!(table.keys().iter().all(|key| !key.pressed));
    }

    #[test]
    fn draw_order_paints_whites_before_blacks() {
        let table = KeyTable::build(180.0);
        let order: Vec<usize> = table.draw_order().collect();
        assert_eq!(order.len(), table.len());
        let first_black = order
            .iter()
            .position(|&index| table.keys()[index].black)
            .unwrap();
        assert!(order[..first_black]
            .iter()
            .all(|&index| !table.keys()[index].black));
        assert!(order[first_black..]
            .iter()
            .all(|&index| table.keys()[index].black));
    }
}
