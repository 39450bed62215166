// GUI-subsystem binary on Windows: no console window for the editor.
// The headless replay mode prints through whatever console launched it.
#![cfg_attr(not(test), windows_subsystem = "windows")]

use eframe::egui;
use gridpaint::app::GridPaintApp;
use gridpaint::settings::AppSettings;
use gridpaint::{cli, logger};

fn main() -> Result<(), eframe::Error> {
    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        let args = cli::CliArgs::parse();
        let code = cli::run(args);
        std::process::exit(if code == std::process::ExitCode::SUCCESS {
            0
        } else {
            1
        });
    }

    // -- GUI mode -----------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();

    let settings = AppSettings::load();
    // First launch: leave an editable settings file behind
    if AppSettings::settings_path().is_some_and(|p| !p.exists()) {
        settings.save();
    }
    let (w, h) = (settings.window_width as f32, settings.window_height as f32);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([w, h])
            .with_min_inner_size([320.0, 240.0])
            .with_title("GridPaint"),
        ..Default::default()
    };

    eframe::run_native(
        "GridPaint",
        options,
        Box::new(move |cc| Box::new(GridPaintApp::new(cc, settings))),
    )
}
