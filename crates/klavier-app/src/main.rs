use clap::{Parser, ValueEnum};
use klavier_keyboard::{Options, OverlayStyle};
use tracing_subscriber::EnvFilter;

mod app;

use app::DemoApp;

#[derive(Parser, Debug)]
#[command(name = "klavier", about = "Scrollable piano keyboard widget demo")]
struct Cli {
    /// Overlay marker style.
    #[arg(long, value_enum, default_value_t = MarkerStyle::Glyph)]
    markers: MarkerStyle,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 900.0)]
    width: f32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 320.0)]
    height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MarkerStyle {
    /// Pitch names in a disc.
    Text,
    /// Notehead glyphs in a disc.
    Glyph,
}

impl From<MarkerStyle> for OverlayStyle {
    fn from(style: MarkerStyle) -> Self {
        match style {
            MarkerStyle::Text => OverlayStyle::Text,
            MarkerStyle::Glyph => OverlayStyle::Glyph,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .ok();

    let cli = Cli::parse();
    let options = Options::default().with_style(cli.markers.into());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Klavier")
            .with_inner_size([cli.width, cli.height]),
        ..Default::default()
    };
    eframe::run_native(
        "klavier",
        native_options,
        Box::new(move |_cc| Ok(Box::new(DemoApp::new(options)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to start the demo UI: {err}"))
}
