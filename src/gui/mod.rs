pub mod app;
pub mod state;

pub use app::PlayerApp;

lazy_static::lazy_static! {
    /// Set once at startup so worker threads can request repaints.
    pub static ref GUI_CONTEXT: std::sync::Mutex<Option<eframe::egui::Context>> =
        std::sync::Mutex::new(None);
}
