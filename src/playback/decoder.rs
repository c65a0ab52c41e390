//! MP3 decoding to mono PCM.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use minimp3::{Decoder, Error as Mp3Error, Frame};

/// A fully decoded clip: mono samples in [-1, 1] at the source rate.
pub struct DecodedClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedClip {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decodes the whole file up front. Generated clips are short (spoken
/// text), so holding the PCM in memory keeps position and seek exact.
pub fn decode_mp3(path: &Path) -> Result<DecodedClip> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut decoder = Decoder::new(file);
    let mut samples = Vec::new();
    let mut sample_rate = 0u32;

    loop {
        match decoder.next_frame() {
            Ok(Frame {
                data,
                sample_rate: rate,
                channels,
                ..
            }) => {
                if sample_rate == 0 {
                    sample_rate = rate.max(0) as u32;
                }
                mix_to_mono(&data, channels.max(1), &mut samples);
            }
            Err(Mp3Error::Eof) => break,
            Err(e) => return Err(anyhow::anyhow!("MP3 decode error: {:?}", e)),
        }
    }

    if samples.is_empty() || sample_rate == 0 {
        return Err(anyhow::anyhow!(
            "No audio frames decoded from {}",
            path.display()
        ));
    }

    Ok(DecodedClip {
        samples,
        sample_rate,
    })
}

/// Averages interleaved channels down to one and rescales i16 to [-1, 1].
fn mix_to_mono(data: &[i16], channels: usize, out: &mut Vec<f32>) {
    out.reserve(data.len() / channels);
    for frame in data.chunks_exact(channels) {
        let sum: i32 = frame.iter().map(|&s| s as i32).sum();
        let avg = sum as f32 / channels as f32;
        out.push(avg / 32768.0);
    }
}
