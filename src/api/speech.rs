//! One-shot speech synthesis against the OpenAI speech endpoint.

use std::io::Read;

use anyhow::Result;
use serde::Serialize;

use super::client::{Credentials, UREQ_AGENT};
use crate::config::{SpeechModel, Voice};

const SPEECH_ENDPOINT: &str = "https://api.openai.com/v1/audio/speech";

/// Request body for `/v1/audio/speech`. Serializes directly to the wire
/// shape `{"model": ..., "voice": ..., "input": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechRequest {
    pub model: SpeechModel,
    pub voice: Voice,
    pub input: String,
}

/// Performs one synthesis round trip and returns the raw MP3 bytes.
///
/// No retry and no timeout beyond the agent defaults. Errors carry enough
/// detail for the log; callers only ever forward success/failure to the UI.
pub fn synthesize(credentials: &Credentials, request: &SpeechRequest) -> Result<Vec<u8>> {
    if request.input.trim().is_empty() {
        return Err(anyhow::anyhow!("Speech input is empty"));
    }

    let response = UREQ_AGENT
        .post(SPEECH_ENDPOINT)
        .header("Authorization", &credentials.bearer())
        .send_json(request)
        .map_err(|e| {
            let err_str = e.to_string();
            if err_str.contains("401") || err_str.contains("403") {
                anyhow::anyhow!("INVALID_API_KEY: {}", err_str)
            } else {
                anyhow::anyhow!("Speech API error: {}", err_str)
            }
        })?;

    let mut bytes = Vec::new();
    response
        .into_body()
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| anyhow::anyhow!("Failed to read audio body: {}", e))?;

    if bytes.is_empty() {
        return Err(anyhow::anyhow!("Speech API returned an empty audio body"));
    }

    Ok(bytes)
}
