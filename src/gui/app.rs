//! Main window: text input, generation, transport and export.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use eframe::egui;

use crate::api::{Credentials, SpeechRequest};
use crate::config::{save_config, Config, PlaybackRate};
use crate::gui::state::{NoticeKind, Phase, Session};
use crate::playback::Player;
use crate::tts::{self, SynthesisOutcome};

const NO_DEVICE_NOTICE: &str = "No audio output device. Clips can still be generated and saved.";

pub struct PlayerApp {
    config: Config,
    credentials: Credentials,
    session: Session,
    input_text: String,
    player: Option<Player>,
    result_rx: Option<Receiver<SynthesisOutcome>>,
    slider_pos: f32,
    slider_dragging: bool,
    show_export_modal: bool,
    export_destination: String,
    needs_input_focus: bool,
}

impl PlayerApp {
    pub fn new(config: Config, credentials: Credentials) -> Self {
        let player = match Player::new() {
            Ok(player) => Some(player),
            Err(e) => {
                crate::log_error!("Audio output unavailable: {:#}", e);
                None
            }
        };

        let mut session = Session::new();
        if player.is_none() {
            session.set_notice(NoticeKind::Error, NO_DEVICE_NOTICE);
        }

        Self {
            config,
            credentials,
            session,
            input_text: String::new(),
            player,
            result_rx: None,
            slider_pos: 0.0,
            slider_dragging: false,
            show_export_modal: false,
            export_destination: String::new(),
            needs_input_focus: true,
        }
    }

    /// Drains the worker channel. A dropped sender without a result means
    /// the worker died, which counts as a failed generation.
    fn poll_worker(&mut self) {
        let Some(rx) = &self.result_rx else { return };
        match rx.try_recv() {
            Ok(outcome) => {
                self.result_rx = None;
                self.session.finish_generation(&outcome);
                if let SynthesisOutcome::Ready(path) = outcome {
                    self.autoplay(&path);
                }
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.result_rx = None;
                crate::log_error!("Generation worker exited without reporting a result");
                self.session.finish_generation(&SynthesisOutcome::Failed);
            }
        }
    }

    /// Keeps the session and the slider in step with the output stream.
    /// The stream callback clears the playing flag when the clip runs out.
    fn sync_playback(&mut self) {
        let Some(player) = &self.player else { return };
        if self.session.phase == Phase::Playing && !player.is_playing() {
            self.session.mark_paused();
        }
        if !self.slider_dragging && player.has_clip() {
            self.slider_pos = player.position_percent();
        }
    }

    fn submit(&mut self) {
        if !self.session.can_submit(&self.input_text) {
            return;
        }

        if self.session.phase == Phase::Playing {
            if let Some(player) = &self.player {
                player.pause();
            }
            self.session.mark_paused();
        }
        self.session.begin_generation();

        let request = SpeechRequest {
            model: self.config.model,
            voice: self.config.voice,
            input: self.input_text.trim().to_string(),
        };
        let (tx, rx) = mpsc::channel();
        self.result_rx = Some(rx);
        tts::spawn_generation(self.credentials.clone(), request, tx);
    }

    /// Loads the fresh clip and starts it from the top. A decode failure
    /// leaves the artifact bound so it can still be exported.
    fn autoplay(&mut self, path: &Path) {
        let Some(player) = &self.player else {
            // Restated on every cycle; begin_generation wipes the startup notice
            self.session.set_notice(NoticeKind::Error, NO_DEVICE_NOTICE);
            return;
        };
        match player.load(path) {
            Ok(()) => {
                player.set_rate(self.config.playback_rate);
                player.play();
                self.slider_pos = 0.0;
                self.session.mark_playing();
            }
            Err(e) => {
                crate::log_error!("Could not decode the generated clip: {:#}", e);
                self.session
                    .set_notice(NoticeKind::Error, "Generated audio could not be decoded.");
            }
        }
    }

    fn toggle_playback(&mut self) {
        if self.session.phase == Phase::Playing {
            if let Some(player) = &self.player {
                player.pause();
            }
            self.session.mark_paused();
            return;
        }

        if !self.session.has_audio() {
            return;
        }
        let Some(player) = &self.player else {
            self.session.set_notice(NoticeKind::Error, NO_DEVICE_NOTICE);
            return;
        };

        if player.has_clip() {
            player.play();
            self.slider_pos = player.position_percent();
            self.session.mark_playing();
        } else if let Some(path) = self.session.artifact().map(Path::to_path_buf) {
            // The earlier load failed or never ran; retry on demand
            self.autoplay(&path);
        }
    }

    /// A rate change applies in place and resumes playback from the current
    /// position. A clip that has already finished stays parked at the end
    /// instead of restarting.
    fn apply_rate(&mut self) {
        save_config(&self.config);
        let Some(player) = &self.player else { return };
        player.set_rate(self.config.playback_rate);
        if self.session.has_audio() && player.resume() {
            self.session.mark_playing();
        }
    }

    fn open_export_modal(&mut self) {
        if !self.session.has_audio() {
            return;
        }
        let dir = self
            .config
            .export_dir
            .clone()
            .or_else(dirs::download_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_default();
        let name = format!(
            "voicepad-{}.mp3",
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        self.export_destination = dir.join(name).display().to_string();
        self.show_export_modal = true;
    }

    fn run_export(&mut self) {
        self.show_export_modal = false;
        let Some(artifact) = self.session.artifact().map(Path::to_path_buf) else {
            return;
        };
        let destination = PathBuf::from(self.export_destination.trim());
        match tts::export_copy(&artifact, &destination) {
            Ok(written) => {
                crate::log_info!("Exported clip to {}", written.display());
                if let Some(parent) = written.parent() {
                    self.config.export_dir = Some(parent.to_path_buf());
                    save_config(&self.config);
                }
                self.session
                    .set_notice(NoticeKind::Info, format!("Saved to {}", written.display()));
            }
            Err(e) => {
                crate::log_error!("Export failed: {:#}", e);
                self.session
                    .set_notice(NoticeKind::Error, format!("Could not save the file: {}", e));
            }
        }
    }

    fn render_input(&mut self, ui: &mut egui::Ui) {
        let input_id = egui::Id::new("speech_input");

        // Enter submits; Shift+Enter falls through and inserts a newline.
        // Consumed before the editor runs so no newline leaks into the text.
        let submit_via_enter = ui.ctx().memory(|m| m.has_focus(input_id))
            && ui.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Enter));

        let response = ui.add(
            egui::TextEdit::multiline(&mut self.input_text)
                .id(input_id)
                .hint_text("Type text to speak (Enter generates, Shift+Enter for a newline)")
                .desired_rows(6)
                .desired_width(f32::INFINITY),
        );
        if self.needs_input_focus {
            response.request_focus();
            self.needs_input_focus = false;
        }

        if submit_via_enter {
            self.submit();
        }
    }

    fn render_submit_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let generating = self.session.is_generating();
            if ui
                .add_enabled(!generating, egui::Button::new("Generate & Play"))
                .clicked()
            {
                self.submit();
            }
            if generating {
                ui.spinner();
                ui.label("Generating...");
            }
        });
    }

    fn render_transport(&mut self, ui: &mut egui::Ui) {
        let has_audio = self.session.has_audio();
        ui.horizontal(|ui| {
            let label = if self.session.phase == Phase::Playing {
                "Pause"
            } else {
                "Play"
            };
            if ui
                .add_enabled(has_audio, egui::Button::new(label))
                .clicked()
            {
                self.toggle_playback();
            }
            if ui
                .add_enabled(has_audio, egui::Button::new("Download"))
                .clicked()
            {
                self.open_export_modal();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let original_rate = self.config.playback_rate;
                egui::ComboBox::from_id_salt("rate_select")
                    .width(70.0)
                    .selected_text(self.config.playback_rate.label())
                    .show_ui(ui, |ui| {
                        for rate in PlaybackRate::ALL {
                            ui.selectable_value(&mut self.config.playback_rate, rate, rate.label());
                        }
                    });
                ui.label("Speed");
                if self.config.playback_rate != original_rate {
                    self.apply_rate();
                }
            });
        });
    }

    fn render_seek_slider(&mut self, ui: &mut egui::Ui) {
        let has_audio = self.session.has_audio();
        ui.spacing_mut().slider_width = ui.available_width();
        let response = ui.add_enabled(
            has_audio,
            egui::Slider::new(&mut self.slider_pos, 0.0..=100.0).show_value(false),
        );
        if response.dragged() {
            self.slider_dragging = true;
        }
        if response.drag_stopped() {
            self.slider_dragging = false;
        }
        if response.changed() {
            if let Some(player) = &self.player {
                player.seek_percent(self.slider_pos);
            }
        }
    }

    fn render_notice_footer(&self, ctx: &egui::Context) {
        let Some((kind, text)) = self.session.notice() else {
            return;
        };
        egui::TopBottomPanel::bottom("notice_footer").show(ctx, |ui| {
            let color = match kind {
                NoticeKind::Info => ui.visuals().weak_text_color(),
                NoticeKind::Error => ui.visuals().error_fg_color,
            };
            ui.add_space(2.0);
            ui.label(egui::RichText::new(text).color(color));
            ui.add_space(2.0);
        });
    }

    fn render_export_modal(&mut self, ctx: &egui::Context) {
        if !self.show_export_modal {
            return;
        }

        let modal_id = egui::Id::new("export_modal");
        // Register as an open popup so any_popup_open() reflects it
        egui::Popup::open_id(ctx, modal_id);

        egui::Area::new(modal_id)
            .order(egui::Order::Tooltip)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .inner_margin(egui::Margin::same(16))
                    .show(ui, |ui| {
                        ui.set_width(360.0);
                        ui.heading("Save audio");
                        ui.add_space(8.0);
                        ui.label("Destination");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.export_destination)
                                .desired_width(f32::INFINITY),
                        );
                        ui.add_space(12.0);
                        ui.horizontal(|ui| {
                            let can_save = !self.export_destination.trim().is_empty();
                            if ui.add_enabled(can_save, egui::Button::new("Save")).clicked() {
                                self.run_export();
                            }
                            if ui.button("Cancel").clicked() {
                                self.show_export_modal = false;
                            }
                        });
                    });
            });

        // Close on Escape
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.show_export_modal = false;
        }
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();
        self.sync_playback();

        self.render_notice_footer(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_input(ui);
            ui.add_space(8.0);
            self.render_submit_row(ui);
            ui.add_space(12.0);
            ui.separator();
            ui.add_space(8.0);
            self.render_transport(ui);
            ui.add_space(6.0);
            self.render_seek_slider(ui);
        });

        self.render_export_modal(ctx);

        // Position polling: one repaint a second while something is playing
        if self.session.phase == Phase::Playing {
            ctx.request_repaint_after(Duration::from_secs(1));
        }
    }
}
