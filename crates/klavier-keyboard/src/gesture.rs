//! Single-touch gesture coordination: press tracking, panning, kinetic
//! fling, pinch scale and the smooth-scroll animation.
//!
//! The coordinator owns the raw scroll offset and scale mutations; the rest
//! of the widget only ever reads the clamped viewport. Touch coordinates are
//! divided by the scale and offset-adjusted before they reach the key table.

use egui::{pos2, Pos2, Rect, Response, Ui};
use tracing::{debug, trace};

use crate::edge_glow::Side;
use crate::state::PianoState;

/// Movement past this radius turns a touch into a pan.
const TOUCH_SLOP: f32 = 8.0;

/// Hold duration that upgrades a touch to a long press.
const LONG_PRESS_SECS: f64 = 0.6;

/// Exponential fling decay per second.
const FLING_FRICTION: f32 = 4.0;

/// Fling speed below which the scroll comes to rest, px/s.
const MIN_FLING_SPEED: f32 = 60.0;

/// Release speed needed to start a fling, px/s.
const MIN_FLING_START_SPEED: f32 = 180.0;

/// Approach rate of the smooth-scroll animation per second.
const SCROLL_APPROACH_RATE: f32 = 12.0;

#[derive(Clone, Copy, Debug)]
enum Phase {
    /// Finger down, not yet moved past the slop. `key` is the pressed key
    /// (index, code) if the touch landed on one.
    Touch {
        key: Option<(usize, i32)>,
        origin: Pos2,
        started: f64,
        long_fired: bool,
    },
    /// Finger is panning the keyboard.
    Pan,
}

/// Host-visible events produced by one frame of gesture processing.
#[derive(Debug, Default)]
pub(crate) struct GestureOutput {
    pub tapped: Option<i32>,
    pub long_pressed: Option<i32>,
    pub repaint: bool,
}

#[derive(Debug, Default)]
pub(crate) struct GestureController {
    phase: Option<Phase>,
    fling: Option<f32>,
    scroll_target: Option<f32>,
}

impl GestureController {
    pub fn start_smooth_scroll(&mut self, x: f32) {
        self.scroll_target = Some(x);
        self.fling = None;
    }

    pub fn cancel(&mut self) {
        self.phase = None;
        self.fling = None;
    }
}

/// Outcome of one animation step of a fling.
struct FlingStep {
    offset: f32,
    velocity: Option<f32>,
    hit: Option<Side>,
}

fn fling_step(offset: f32, velocity: f32, dt: f32, max_offset: f32) -> FlingStep {
    let next = offset + velocity * dt;
    if next <= 0.0 && velocity < 0.0 {
        return FlingStep {
            offset: 0.0,
            velocity: None,
            hit: Some(Side::Left),
        };
    }
    if next >= max_offset && velocity > 0.0 {
        return FlingStep {
            offset: max_offset,
            velocity: None,
            hit: Some(Side::Right),
        };
    }
    let decayed = velocity * (-FLING_FRICTION * dt).exp();
    FlingStep {
        offset: next,
        velocity: (decayed.abs() >= MIN_FLING_SPEED).then_some(decayed),
        hit: None,
    }
}

/// Screen position to instrument coordinates: undo the widget origin, the
/// pinch scale, then the scroll offset.
fn to_world(pos: Pos2, rect: Rect, offset: f32, scale: f32) -> Pos2 {
    pos2((pos.x - rect.left()) / scale + offset, pos.y - rect.top())
}

pub(crate) fn process(
    state: &mut PianoState,
    ui: &Ui,
    response: &Response,
    rect: Rect,
) -> GestureOutput {
    let mut out = GestureOutput::default();
    let (now, dt, pointer_delta, velocity, zoom) = ui.input(|input| {
        (
            input.time,
            input.stable_dt.min(0.1),
            input.pointer.delta(),
            input.pointer.velocity(),
            input.zoom_delta(),
        )
    });

    let viewport_width = rect.width();
    let max_offset = (state.instrument_width() as f32 - viewport_width).max(0.0);
    let down = response.is_pointer_button_down_on();

    if zoom != 1.0 && (response.hovered() || down) {
        state.set_scale(state.scale * zoom);
        out.repaint = true;
    }
    let scale = state.scale;
    let offset = state.clamped_offset(viewport_width);
    let pos = response.interact_pointer_pos();

    let mut phase = state.gesture.phase;
    match phase {
        None => {
            if down {
                if let Some(pos) = pos {
                    state.gesture.fling = None;
                    state.gesture.scroll_target = None;
                    let world = to_world(pos, rect, offset, scale);
                    let hit = state
                        .table
                        .as_ref()
                        .and_then(|table| table.key_at(world.x, world.y));
                    let key = match (state.table.as_mut(), hit) {
                        (Some(table), Some(index)) => {
                            table.press(index);
                            out.repaint = true;
                            table.key(index).map(|key| (index, key.code))
                        }
                        _ => None,
                    };
                    trace!(?key, "touch down");
                    phase = Some(Phase::Touch {
                        key,
                        origin: pos,
                        started: now,
                        long_fired: false,
                    });
                }
            }
        }
        Some(Phase::Touch {
            key,
            origin,
            started,
            long_fired,
        }) => {
            if !down {
                if !long_fired {
                    if let Some((_, code)) = key {
                        debug!(code, "key tapped");
                        out.tapped = Some(code);
                    }
                }
                end_touch(state, viewport_width, &mut out);
                phase = None;
            } else if let Some(pos) = pos {
                if (pos - origin).length() > TOUCH_SLOP {
                    release_pressed(state, &mut out);
                    phase = Some(Phase::Pan);
                } else if !long_fired && now - started >= LONG_PRESS_SECS {
                    if let Some((_, code)) = key {
                        debug!(code, "key long-pressed");
                        out.long_pressed = Some(code);
                    }
                    release_pressed(state, &mut out);
                    phase = Some(Phase::Touch {
                        key,
                        origin,
                        started,
                        long_fired: true,
                    });
                }
            }
        }
        Some(Phase::Pan) => {
            if !down {
                let speed = velocity.x / scale;
                if speed.abs() >= MIN_FLING_START_SPEED {
                    state.gesture.fling = Some(-speed);
                }
                end_touch(state, viewport_width, &mut out);
                phase = None;
            } else if pointer_delta.x != 0.0 {
                state.scroll_px -= pointer_delta.x / scale;
                if state.scroll_px < 0.0 {
                    state.left_glow.pull(pointer_delta.x / viewport_width);
                } else if state.scroll_px > max_offset {
                    state.right_glow.pull(pointer_delta.x / viewport_width);
                }
                out.repaint = true;
            }
        }
    }
    state.gesture.phase = phase;

    if let Some(current) = state.gesture.fling {
        let step = fling_step(state.scroll_px, current, dt, max_offset);
        state.scroll_px = step.offset;
        state.gesture.fling = step.velocity;
        match step.hit {
            Some(Side::Left) => state.left_glow.absorb(current),
            Some(Side::Right) => state.right_glow.absorb(current),
            None => {}
        }
        out.repaint = true;
    }

    if let Some(target) = state.gesture.scroll_target {
        let target = target.clamp(0.0, max_offset);
        let diff = target - state.scroll_px;
        if diff.abs() < 0.5 {
            state.scroll_px = target;
            state.gesture.scroll_target = None;
        } else {
            state.scroll_px += diff * (SCROLL_APPROACH_RATE * dt).min(1.0);
        }
        out.repaint = true;
    }

    if state.left_glow.tick(dt) | state.right_glow.tick(dt) {
        out.repaint = true;
    }

    let hovered = if !down && response.hovered() {
        ui.input(|input| input.pointer.hover_pos()).and_then(|pos| {
            let world = to_world(pos, rect, state.clamped_offset(viewport_width), scale);
            state
                .table
                .as_ref()
                .and_then(|table| table.key_at(world.x, world.y))
        })
    } else {
        None
    };
    state.hovered = hovered;

    out
}

fn release_pressed(state: &mut PianoState, out: &mut GestureOutput) {
    if let Some(table) = state.table.as_mut() {
        if table.release() {
            out.repaint = true;
        }
    }
}

/// Touch ended, by release or by upgrade to long press: clear the pressed
/// key and snap any overscrolled offset back inside the bounds.
fn end_touch(state: &mut PianoState, viewport_width: f32, out: &mut GestureOutput) {
    release_pressed(state, out);
    state.scroll_px = state.clamped_offset(viewport_width);
    out.repaint = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fling_decays_to_rest_inside_the_range() {
        let mut offset = 400.0;
        let mut velocity = 500.0;
        let mut steps = 0;
        loop {
            let step = fling_step(offset, velocity, 1.0 / 60.0, 2000.0);
            offset = step.offset;
            assert!(step.hit.is_none());
            match step.velocity {
                Some(next) => velocity = next,
                None => break,
            }
            steps += 1;
            assert!(steps < 1000, "fling never settled");
        }
        assert!(offset > 400.0 && offset < 2000.0);
    }

    #[test]
    fn fling_absorbs_into_the_right_edge() {
        let step = fling_step(1990.0, 3000.0, 1.0 / 60.0, 2000.0);
        assert_eq!(step.offset, 2000.0);
        assert!(step.velocity.is_none());
        assert_eq!(step.hit, Some(Side::Right));
    }

    #[test]
    fn fling_absorbs_into_the_left_edge() {
        let step = fling_step(5.0, -3000.0, 1.0 / 60.0, 2000.0);
        assert_eq!(step.offset, 0.0);
        assert!(step.velocity.is_none());
        assert_eq!(step.hit, Some(Side::Left));
    }

    #[test]
    fn world_mapping_undoes_scale_and_offset() {
        let rect = Rect::from_min_size(pos2(10.0, 20.0), egui::vec2(400.0, 180.0));
        let world = to_world(pos2(110.0, 50.0), rect, 300.0, 2.0);
        assert_eq!(world, pos2(350.0, 30.0));
    }
}
