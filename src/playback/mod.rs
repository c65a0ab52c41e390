//! Audio playback over the default output device.
//!
//! The generated MP3 is decoded whole into memory and the stream callback
//! walks a fractional cursor through the samples. Position, seek, and rate
//! all operate on that cursor, so they stay exact under pause and rate
//! changes and need no wall-clock bookkeeping.

mod decoder;

pub use decoder::{decode_mp3, DecodedClip};

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::config::PlaybackRate;

struct ClipState {
    samples: Vec<f32>,
    sample_rate: u32,
    cursor: f64,
}

impl ClipState {
    fn at_end(&self) -> bool {
        self.cursor as usize + 1 >= self.samples.len()
    }

    /// Next interpolated sample, advancing the cursor by `step` source
    /// frames. Returns None at the end of the clip with the cursor pinned
    /// past the last frame, so position reads 100 afterwards.
    fn next_sample(&mut self, step: f64) -> Option<f32> {
        let idx = self.cursor as usize;
        if idx + 1 >= self.samples.len() {
            self.cursor = self.samples.len() as f64;
            return None;
        }
        let frac = (self.cursor - idx as f64) as f32;
        let a = self.samples[idx];
        let b = self.samples[idx + 1];
        self.cursor += step;
        Some(a + (b - a) * frac)
    }
}

fn seek_target(total_samples: usize, percent: f64) -> f64 {
    total_samples as f64 * percent.clamp(0.0, 100.0) / 100.0
}

fn position_of(cursor: f64, total_samples: usize) -> f64 {
    if total_samples == 0 {
        return 0.0;
    }
    (cursor * 100.0 / total_samples as f64).clamp(0.0, 100.0)
}

struct SharedPlayback {
    clip: Mutex<Option<ClipState>>,
    playing: AtomicBool,
    rate_bits: AtomicU32,
}

impl SharedPlayback {
    fn rate_factor(&self) -> f32 {
        f32::from_bits(self.rate_bits.load(Ordering::Relaxed))
    }
}

/// Owns the output stream for the lifetime of the app. The UI thread talks
/// to the stream callback only through `SharedPlayback`.
pub struct Player {
    shared: Arc<SharedPlayback>,
    _stream: cpal::Stream,
}

impl Player {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("No audio output device available"))?;
        let supported = device
            .default_output_config()
            .map_err(|e| anyhow::anyhow!("No default output config: {}", e))?;

        let device_rate = u32::from(supported.sample_rate()) as f64;
        let channels = supported.channels() as usize;
        let stream_config: cpal::StreamConfig = supported.into();

        let shared = Arc::new(SharedPlayback {
            clip: Mutex::new(None),
            playing: AtomicBool::new(false),
            rate_bits: AtomicU32::new(1.0f32.to_bits()),
        });

        // Try f32 output first, fall back to i16 when the device rejects it.
        let shared_f32 = Arc::clone(&shared);
        let stream = match device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if !shared_f32.playing.load(Ordering::Relaxed) {
                    for x in data.iter_mut() {
                        *x = 0.0;
                    }
                    return;
                }
                let factor = shared_f32.rate_factor() as f64;
                // Never block in the callback; a busy lock means one quiet buffer
                if let Ok(mut guard) = shared_f32.clip.try_lock() {
                    if let Some(clip) = guard.as_mut() {
                        let step = factor * clip.sample_rate as f64 / device_rate;
                        for frame in data.chunks_mut(channels) {
                            match clip.next_sample(step) {
                                Some(s) => {
                                    for out in frame.iter_mut() {
                                        *out = s;
                                    }
                                }
                                None => {
                                    shared_f32.playing.store(false, Ordering::Relaxed);
                                    for out in frame.iter_mut() {
                                        *out = 0.0;
                                    }
                                }
                            }
                        }
                        return;
                    }
                }
                for x in data.iter_mut() {
                    *x = 0.0;
                }
            },
            |err| crate::log_error!("Audio stream error: {}", err),
            None,
        ) {
            Ok(stream) => stream,
            Err(e) => {
                crate::log_info!("f32 output stream rejected ({}), trying i16", e);
                let shared_i16 = Arc::clone(&shared);
                device
                    .build_output_stream(
                        &stream_config,
                        move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                            if !shared_i16.playing.load(Ordering::Relaxed) {
                                for x in data.iter_mut() {
                                    *x = 0;
                                }
                                return;
                            }
                            let factor = shared_i16.rate_factor() as f64;
                            if let Ok(mut guard) = shared_i16.clip.try_lock() {
                                if let Some(clip) = guard.as_mut() {
                                    let step = factor * clip.sample_rate as f64 / device_rate;
                                    for frame in data.chunks_mut(channels) {
                                        match clip.next_sample(step) {
                                            Some(s) => {
                                                let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
                                                for out in frame.iter_mut() {
                                                    *out = v;
                                                }
                                            }
                                            None => {
                                                shared_i16.playing.store(false, Ordering::Relaxed);
                                                for out in frame.iter_mut() {
                                                    *out = 0;
                                                }
                                            }
                                        }
                                    }
                                    return;
                                }
                            }
                            for x in data.iter_mut() {
                                *x = 0;
                            }
                        },
                        |err| crate::log_error!("Audio stream error: {}", err),
                        None,
                    )
                    .map_err(|e2| anyhow::anyhow!("Failed to open output stream: {}", e2))?
            }
        };

        stream
            .play()
            .map_err(|e| anyhow::anyhow!("Failed to start output stream: {}", e))?;

        Ok(Self {
            shared,
            _stream: stream,
        })
    }

    /// Decodes and binds a new clip, resetting position to 0. If the stream
    /// is currently playing it switches to the new clip immediately.
    pub fn load(&self, path: &Path) -> Result<()> {
        let clip = decode_mp3(path)?;
        crate::log_info!(
            "Loaded clip: {:.2}s at {} Hz ({} samples)",
            clip.duration_secs(),
            clip.sample_rate,
            clip.samples.len()
        );
        let mut guard = self.shared.clip.lock().unwrap();
        *guard = Some(ClipState {
            samples: clip.samples,
            sample_rate: clip.sample_rate,
            cursor: 0.0,
        });
        Ok(())
    }

    /// Starts or resumes playback. At the end of the clip this rewinds to
    /// the start, the way media players replay a finished track.
    pub fn play(&self) {
        let has_clip = {
            let mut guard = self.shared.clip.lock().unwrap();
            match guard.as_mut() {
                Some(clip) => {
                    if clip.at_end() {
                        clip.cursor = 0.0;
                    }
                    true
                }
                None => false,
            }
        };
        if has_clip {
            self.shared.playing.store(true, Ordering::SeqCst);
        }
    }

    /// Resumes playback unless the cursor already sits at the end of the
    /// clip. Returns whether playback started; a finished clip stays
    /// parked until an explicit `play` rewinds it.
    pub fn resume(&self) -> bool {
        let mid_clip = {
            let guard = self.shared.clip.lock().unwrap();
            guard.as_ref().map_or(false, |clip| !clip.at_end())
        };
        if mid_clip {
            self.shared.playing.store(true, Ordering::SeqCst);
        }
        mid_clip
    }

    pub fn pause(&self) {
        self.shared.playing.store(false, Ordering::SeqCst);
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::SeqCst)
    }

    /// Maps a 0-100 fraction onto the clip. No-op while nothing (or an
    /// effectively empty clip) is loaded.
    pub fn seek_percent(&self, percent: f32) {
        let mut guard = self.shared.clip.lock().unwrap();
        if let Some(clip) = guard.as_mut() {
            if clip.samples.len() > 1 {
                clip.cursor = seek_target(clip.samples.len(), percent as f64);
            }
        }
    }

    /// Applies immediately; playback continues from the same position.
    pub fn set_rate(&self, rate: PlaybackRate) {
        self.shared
            .rate_bits
            .store(rate.factor().to_bits(), Ordering::SeqCst);
    }

    pub fn position_percent(&self) -> f32 {
        let guard = self.shared.clip.lock().unwrap();
        match guard.as_ref() {
            Some(clip) => position_of(clip.cursor, clip.samples.len()) as f32,
            None => 0.0,
        }
    }

    pub fn has_clip(&self) -> bool {
        self.shared.clip.lock().unwrap().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_clip(len: usize) -> ClipState {
        ClipState {
            samples: (0..len).map(|i| i as f32).collect(),
            sample_rate: 1000,
            cursor: 0.0,
        }
    }

    #[test]
    fn seek_maps_fraction_onto_sample_range() {
        assert_eq!(seek_target(1000, 0.0), 0.0);
        assert_eq!(seek_target(1000, 50.0), 500.0);
        assert_eq!(seek_target(1000, 100.0), 1000.0);
    }

    #[test]
    fn seek_clamps_out_of_range_fractions() {
        assert_eq!(seek_target(1000, -12.0), 0.0);
        assert_eq!(seek_target(1000, 250.0), 1000.0);
    }

    #[test]
    fn position_guards_zero_duration() {
        assert_eq!(position_of(0.0, 0), 0.0);
        assert_eq!(position_of(42.0, 0), 0.0, "no divide by zero on empty clip");
    }

    #[test]
    fn position_tracks_cursor_fraction() {
        assert_eq!(position_of(250.0, 1000), 25.0);
        assert_eq!(position_of(1000.0, 1000), 100.0);
        assert_eq!(position_of(2000.0, 1000), 100.0, "position is capped at 100");
    }

    #[test]
    fn cursor_advances_by_step_and_interpolates() {
        let mut clip = ramp_clip(100);
        // Half-way between samples 0 and 1 on a ramp is 0.5
        clip.cursor = 0.5;
        let s = clip.next_sample(1.0).unwrap();
        assert!((s - 0.5).abs() < 1e-6);
        assert!((clip.cursor - 1.5).abs() < 1e-9);
    }

    #[test]
    fn double_rate_steps_twice_as_far() {
        let mut slow = ramp_clip(100);
        let mut fast = ramp_clip(100);
        for _ in 0..10 {
            slow.next_sample(1.0);
            fast.next_sample(2.0);
        }
        assert!((slow.cursor - 10.0).abs() < 1e-9);
        assert!((fast.cursor - 20.0).abs() < 1e-9);
    }

    #[test]
    fn end_of_clip_pins_cursor_and_returns_none() {
        let mut clip = ramp_clip(10);
        clip.cursor = 9.5;
        assert!(clip.next_sample(1.0).is_none());
        assert_eq!(clip.cursor, 10.0, "cursor pinned so position reads 100");
        assert!(clip.next_sample(1.0).is_none(), "stays ended");
    }

    #[test]
    fn rate_switch_resumes_from_the_same_position() {
        let mut clip = ramp_clip(100);
        for _ in 0..5 {
            clip.next_sample(1.0);
        }
        assert!((clip.cursor - 5.0).abs() < 1e-9);
        // A new rate only changes the step; the cursor is untouched
        clip.next_sample(2.0);
        assert!(
            (clip.cursor - 7.0).abs() < 1e-9,
            "rate change must not reset position"
        );
    }

    #[test]
    fn finished_clip_stays_parked_for_a_rate_change() {
        let mut clip = ramp_clip(10);
        assert!(!clip.at_end(), "fresh clip starts mid-range");

        while clip.next_sample(3.0).is_some() {}
        assert!(clip.at_end());
        assert_eq!(position_of(clip.cursor, clip.samples.len()), 100.0);

        // A new step only changes speed; it must not move a pinned cursor
        assert!(clip.next_sample(0.5).is_none());
        assert_eq!(
            position_of(clip.cursor, clip.samples.len()),
            100.0,
            "rate change at the end must not reset position"
        );
    }

    #[test]
    fn position_increases_monotonically_while_playing() {
        let mut clip = ramp_clip(50);
        let mut last = position_of(clip.cursor, clip.samples.len());
        while clip.next_sample(1.5).is_some() {
            let now = position_of(clip.cursor, clip.samples.len());
            assert!(now >= last, "position went backwards: {} -> {}", last, now);
            last = now;
        }
        assert_eq!(position_of(clip.cursor, clip.samples.len()), 100.0);
    }

    #[test]
    fn single_sample_clip_acts_as_zero_duration() {
        let mut clip = ramp_clip(1);
        assert!(clip.next_sample(1.0).is_none());
        assert_eq!(position_of(clip.cursor, clip.samples.len()), 100.0);
    }
}
