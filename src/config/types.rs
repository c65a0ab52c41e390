//! Closed option sets for synthesis and playback.
//!
//! Every value the app ever sends to the speech endpoint or applies to the
//! player comes from one of these enums, so unsupported wire strings are
//! unrepresentable.

use serde::{Deserialize, Serialize};

/// Speech synthesis model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeechModel {
    #[default]
    #[serde(rename = "tts-1")]
    Tts1,
    #[serde(rename = "tts-1-hd")]
    Tts1Hd,
}

impl SpeechModel {
    pub fn wire_name(self) -> &'static str {
        match self {
            SpeechModel::Tts1 => "tts-1",
            SpeechModel::Tts1Hd => "tts-1-hd",
        }
    }
}

/// Built-in voices offered by the speech endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub fn wire_name(self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

/// Playback speed presets. The player only ever runs at one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlaybackRate {
    #[serde(rename = "0.5x")]
    Half,
    #[default]
    #[serde(rename = "1.0x")]
    Normal,
    #[serde(rename = "1.5x")]
    OneAndHalf,
    #[serde(rename = "2.0x")]
    Double,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 4] = [
        PlaybackRate::Half,
        PlaybackRate::Normal,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    /// Speed multiplier applied to the sample cursor.
    pub fn factor(self) -> f32 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }

    /// Text shown in the rate selector.
    pub fn label(self) -> &'static str {
        match self {
            PlaybackRate::Half => "0.5x",
            PlaybackRate::Normal => "1.0x",
            PlaybackRate::OneAndHalf => "1.5x",
            PlaybackRate::Double => "2.0x",
        }
    }
}
