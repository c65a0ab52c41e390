//! The one-shot generation thread.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::Instant;

use anyhow::Result;

use super::{write_scratch, SynthesisOutcome};
use crate::api::{synthesize, Credentials, SpeechRequest};

/// Runs one synthesis on a background thread and posts the outcome back
/// over the channel. The UI disables submission while a request is in
/// flight, so at most one of these threads ever exists.
pub fn spawn_generation(
    credentials: Credentials,
    request: SpeechRequest,
    sender: Sender<SynthesisOutcome>,
) {
    std::thread::spawn(move || {
        let started = Instant::now();
        crate::log_info!(
            "Generating speech: {} chars, voice={}, model={}",
            request.input.chars().count(),
            request.voice.wire_name(),
            request.model.wire_name()
        );

        let outcome = match generate_to_scratch(&credentials, &request) {
            Ok(path) => {
                crate::log_info!("Speech ready in {} ms", started.elapsed().as_millis());
                SynthesisOutcome::Ready(path)
            }
            Err(e) => {
                crate::log_error!("Speech generation failed: {:#}", e);
                SynthesisOutcome::Failed
            }
        };

        let _ = sender.send(outcome);

        // Wake the UI so the result is picked up without user input
        if let Some(ctx) = crate::gui::GUI_CONTEXT.lock().unwrap().as_ref() {
            ctx.request_repaint();
        }
    });
}

/// Fetches the audio and swaps it into the scratch slot.
fn generate_to_scratch(credentials: &Credentials, request: &SpeechRequest) -> Result<PathBuf> {
    let bytes = synthesize(credentials, request)?;
    let path = write_scratch(&bytes)?;
    crate::log_info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}
