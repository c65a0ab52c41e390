//! Configuration module for voicepad.
//!
//! - `types`: closed option sets (model, voice, playback rate)
//! - `io`: config loading and saving

mod io;
mod types;

pub use io::{get_config_path, load_config, save_config};
pub use types::{PlaybackRate, SpeechModel, Voice};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persistent settings. Voice and model have no UI surface; power users
/// edit the JSON file directly. The rate selector and export destination
/// remember their last values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub voice: Voice,
    pub model: SpeechModel,
    pub playback_rate: PlaybackRate,
    pub export_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_tts1_alloy() {
        let config = Config::default();
        assert_eq!(config.model, SpeechModel::Tts1);
        assert_eq!(config.voice, Voice::Alloy);
        assert_eq!(config.playback_rate, PlaybackRate::Normal);
        assert!(config.export_dir.is_none());
    }

    #[test]
    fn partial_config_files_fill_in_defaults() {
        let config: Config = serde_json::from_str(r#"{"voice":"nova"}"#).unwrap();
        assert_eq!(config.voice, Voice::Nova);
        assert_eq!(config.model, SpeechModel::Tts1, "missing field should default");
        assert_eq!(config.playback_rate, PlaybackRate::Normal);
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let config: Config =
            serde_json::from_str(r#"{"playback_rate":"2.0x","line_height":3}"#).unwrap();
        assert_eq!(config.playback_rate, PlaybackRate::Double);
    }

    #[test]
    fn config_round_trips_as_json() {
        let mut config = Config::default();
        config.voice = Voice::Onyx;
        config.model = SpeechModel::Tts1Hd;
        config.playback_rate = PlaybackRate::Half;
        config.export_dir = Some(PathBuf::from("/tmp/audio"));

        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.voice, Voice::Onyx);
        assert_eq!(back.model, SpeechModel::Tts1Hd);
        assert_eq!(back.playback_rate, PlaybackRate::Half);
        assert_eq!(back.export_dir.as_deref(), Some(std::path::Path::new("/tmp/audio")));
    }
}
