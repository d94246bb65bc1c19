use egui::{pos2, vec2, Align2, FontId, Pos2, Rect, Response, Rounding, Sense, Stroke, Ui};
use klavier_music::Pitch;

use super::{Options, OverlayStyle};
use crate::edge_glow::Side;
use crate::gesture;
use crate::theme::Theme;
use crate::PianoProps;

/// Instrument-space rectangle to screen space: horizontal scroll offset and
/// pinch scale apply to x only.
fn to_screen(bounds: Rect, rect: Rect, offset: f32, scale: f32) -> Rect {
    Rect::from_min_max(
        to_screen_pos(bounds.min, rect, offset, scale),
        to_screen_pos(bounds.max, rect, offset, scale),
    )
}

fn to_screen_pos(pos: Pos2, rect: Rect, offset: f32, scale: f32) -> Pos2 {
    pos2(rect.left() + (pos.x - offset) * scale, rect.top() + pos.y)
}

pub(crate) fn render(ui: &mut Ui, props: PianoProps<'_>) -> Response {
    let PianoProps {
        state,
        options,
        theme,
        mut on_key_pressed,
        mut on_key_long_pressed,
    } = props;

    let available = ui.available_size();
    let desired = vec2(available.x.max(64.0), available.y.max(48.0));
    let (rect, response) = ui.allocate_exact_size(desired, Sense::click_and_drag());

    state.ensure_layout(rect.height());

    let scale = state.scale;
    let offset = state.clamped_offset(rect.width());
    let world_right = offset + rect.width() / scale;
    state.record_viewport(rect.width(), offset, world_right);

    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, theme.background);

    if let Some(table) = state.table() {
        let (first, last) = table.visible_range(offset, world_right);

        for index in table.draw_order() {
            if index < first || index > last {
                continue;
            }
            let key = &table.keys()[index];
            let screen = to_screen(key.bounds, rect, offset, scale);
            let fill = match (key.black, key.pressed) {
                (false, false) => theme.white_key,
                (false, true) => theme.white_key_pressed,
                (true, false) => theme.black_key,
                (true, true) => theme.black_key_pressed,
            };
            painter.rect_filled(screen, Rounding::same(2.0), fill);
            painter.rect_stroke(screen, Rounding::same(2.0), theme.key_outline);
        }

        for pitch in state.notes() {
            let Some(index) = table.index_of_code(pitch.code()) else {
                continue;
            };
            if index < first || index > last {
                continue;
            }
            let key = &table.keys()[index];
            let pivot = to_screen_pos(key.overlay_pivot(), rect, offset, scale);
            match options.overlay_style {
                OverlayStyle::Text => draw_text_marker(&painter, pivot, *pitch, options, theme),
                OverlayStyle::Glyph => draw_glyph_marker(&painter, pivot, *pitch, options, theme),
            }
        }
    }

    let output = gesture::process(state, ui, &response, rect);
    if let Some(code) = output.tapped {
        if let Some(callback) = on_key_pressed.as_mut() {
            callback(code);
        }
    }
    if let Some(code) = output.long_pressed {
        if let Some(callback) = on_key_long_pressed.as_mut() {
            callback(code);
        }
    }

    state.left_glow.paint(ui, rect, Side::Left, theme.edge_glow);
    state.right_glow.paint(ui, rect, Side::Right, theme.edge_glow);

    if output.repaint {
        ui.ctx().request_repaint();
    }
    response
}

fn draw_text_marker(
    painter: &egui::Painter,
    pivot: Pos2,
    pitch: Pitch,
    options: &Options,
    theme: &Theme,
) {
    painter.circle_filled(pivot, options.overlay_radius, options.overlay_color);
    painter.text(
        pivot,
        Align2::CENTER_CENTER,
        pitch.to_string(),
        FontId::proportional(options.overlay_text_size),
        theme.overlay_text,
    );
}

/// Disc with a notehead, stem and optional accidental sign. The head shifts
/// left when a sign is present so the pair stays centered on the pivot.
fn draw_glyph_marker(
    painter: &egui::Painter,
    pivot: Pos2,
    pitch: Pitch,
    options: &Options,
    theme: &Theme,
) {
    let radius = options.overlay_radius;
    painter.circle_filled(pivot, radius, options.overlay_color);

    let sign = pitch.accidental().sign();
    let head_shift = if sign.is_some() { -radius * 0.2 } else { 0.0 };
    let head = pivot + vec2(head_shift, radius * 0.28);
    let head_radius = radius * 0.26;
    painter.circle_filled(head, head_radius, theme.overlay_text);

    let stem_x = head.x + head_radius - 0.5;
    painter.line_segment(
        [
            pos2(stem_x, head.y),
            pos2(stem_x, head.y - radius * 0.95),
        ],
        Stroke::new(1.5, theme.overlay_text),
    );

    if let Some(sign) = sign {
        painter.text(
            pos2(head.x + radius * 0.5, head.y - radius * 0.2),
            Align2::CENTER_CENTER,
            sign,
            FontId::proportional(options.overlay_text_size),
            theme.overlay_text,
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn screen_transform_scales_x_only() {
        let rect = Rect::from_min_size(pos2(100.0, 50.0), vec2(400.0, 180.0));
        let world = Rect::from_min_max(pos2(300.0, 0.0), pos2(329.0, 180.0));
        let screen = to_screen(world, rect, 250.0, 2.0);
        assert_eq!(screen.left(), 200.0);
        assert_eq!(screen.right(), 258.0);
        assert_eq!(screen.top(), 50.0);
        assert_eq!(screen.bottom(), 230.0);
    }
}
