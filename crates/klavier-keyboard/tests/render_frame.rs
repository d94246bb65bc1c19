use klavier_keyboard::{Options, PianoProps, PianoState, Theme, START_CODE};
use klavier_music::Letter;

fn run_frame(state: &mut PianoState, options: &Options) {
    let ctx = egui::Context::default();
    let theme = Theme::classic();
    let mut input = egui::RawInput::default();
    input.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(800.0, 240.0),
    ));
    let _ = ctx.run(input, |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            let props = PianoProps {
                state: &mut *state,
                options,
                theme: &theme,
                on_key_pressed: None,
                on_key_long_pressed: None,
            };
            klavier_keyboard::render(ui, props);
        });
    });
}

#[test]
fn one_frame_builds_the_layout_and_visible_window() {
    let mut state = PianoState::new();
    run_frame(&mut state, &Options::default());

    assert!(state.table().is_some());
    assert!(state.instrument_width() > 0);
    assert_eq!(state.first_visible_key(), Some(START_CODE));
    let last = state.last_visible_key().expect("window recorded");
    assert!(last > START_CODE);

    let metrics = state.scroll_metrics();
    assert_eq!(metrics.range, state.instrument_width());
    assert!(metrics.extent > 0);
    assert_eq!(metrics.offset, 0);
}

#[test]
fn overlays_render_in_both_marker_styles() {
    for options in [
        Options::default().with_style(klavier_keyboard::OverlayStyle::Text),
        Options::default().with_style(klavier_keyboard::OverlayStyle::Glyph),
    ] {
        let mut state = PianoState::new();
        state.add_notes([
            Letter::C.in_octave(2),
            Letter::C.sharp().in_octave(2),
            Letter::B.flat().in_octave(3),
            // Outside the instrument: must be skipped, not drawn.
            Letter::C.in_octave(9),
        ]);
        run_frame(&mut state, &options);
        assert_eq!(state.notes().len(), 4);
    }
}

#[test]
fn scrolled_window_reports_interior_keys() {
    let mut state = PianoState::new();
    run_frame(&mut state, &Options::default());

    state.scroll_px = 150.0;
    run_frame(&mut state, &Options::default());

    let first = state.first_visible_key().expect("window recorded");
    assert!(first > START_CODE);
}
