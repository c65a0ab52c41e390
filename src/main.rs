#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod api;
mod config;
mod debug_log;
pub mod gui;
mod playback;
mod tts;

use config::load_config;

// Window dimensions
const WINDOW_WIDTH: f32 = 520.0;
const WINDOW_HEIGHT: f32 = 420.0;

fn main() -> eframe::Result<()> {
    crate::log_info!("========================================");
    crate::log_info!("VoicePad v{} STARTUP", env!("CARGO_PKG_VERSION"));
    crate::log_info!("========================================");

    // The key is read once here; a missing key is fatal before any UI opens
    let credentials = match api::Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            crate::log_error!("{:#}", e);
            std::process::exit(1);
        }
    };

    // Cleanup scratch audio from previous runs
    tts::prepare_scratch_dir();

    let config = load_config();

    // Detect system theme
    let system_dark = matches!(dark_light::detect(), Ok(dark_light::Mode::Dark));

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
        .with_min_inner_size([420.0, 360.0]);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "VoicePad",
        options,
        Box::new(move |cc| {
            // Workers request repaints through this handle
            *gui::GUI_CONTEXT.lock().unwrap() = Some(cc.egui_ctx.clone());

            if system_dark {
                cc.egui_ctx.set_visuals(eframe::egui::Visuals::dark());
            } else {
                cc.egui_ctx.set_visuals(eframe::egui::Visuals::light());
            }

            Ok(Box::new(gui::PlayerApp::new(config, credentials)))
        }),
    )
}
