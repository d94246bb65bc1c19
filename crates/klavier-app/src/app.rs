use klavier_keyboard::{Options, PianoProps, PianoState, Theme};
use klavier_music::Pitch;
use tracing::info;

/// Rate at which the keyboard height eases toward its target, per second.
const RESIZE_RATE: f32 = 8.0;

pub struct DemoApp {
    state: PianoState,
    options: Options,
    theme: Theme,
    half_height: bool,
    height_frac: f32,
    status: String,
}

impl DemoApp {
    pub fn new(options: Options) -> Self {
        Self {
            state: PianoState::new(),
            options,
            theme: Theme::classic(),
            half_height: false,
            height_frac: 1.0,
            status: "Tap a key to pin its note".to_owned(),
        }
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Clear notes").clicked() {
                    self.state.clear_notes();
                    self.status = "Cleared".to_owned();
                }
                let resize_label = if self.half_height {
                    "Full size"
                } else {
                    "Half size"
                };
                if ui.button(resize_label).clicked() {
                    self.half_height = !self.half_height;
                }
                if ui.button("Rewind").clicked() {
                    self.state.smooth_scroll_to(0.0);
                }
                ui.separator();
                ui.label(&self.status);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let target = if self.half_height { 0.5 } else { 1.0 };
            let dt = ui.input(|input| input.stable_dt).min(0.1);
            let diff = target - self.height_frac;
            if diff.abs() > 0.002 {
                self.height_frac += diff * (RESIZE_RATE * dt).min(1.0);
                ui.ctx().request_repaint();
            } else {
                self.height_frac = target;
            }

            let available = ui.available_size();
            let keyboard_size = egui::vec2(available.x, available.y * self.height_frac);

            let mut tapped = None;
            let mut held = None;
            ui.allocate_ui(keyboard_size, |ui| {
                let props = PianoProps {
                    state: &mut self.state,
                    options: &self.options,
                    theme: &self.theme,
                    on_key_pressed: Some(Box::new(|code| tapped = Some(code))),
                    on_key_long_pressed: Some(Box::new(|code| held = Some(code))),
                };
                klavier_keyboard::render(ui, props);
            });

            if let Some(code) = tapped {
                let pitch = Pitch::from_code(code);
                info!(code, %pitch, "key tapped");
                self.state.add_notes([pitch]);
                self.status = format!("Added {pitch}");
            }
            if let Some(code) = held {
                let pitch = Pitch::from_code(code);
                info!(code, %pitch, "key held");
                self.state.remove_notes([pitch]);
                self.status = format!("Removed {pitch}");
            }
        });
    }
}
