//! Interaction state machine for the generate-and-play cycle.
//!
//! The window logic is a thin shell around this: every control decides its
//! enabled state and every transition runs through `Session`, which keeps
//! the cycle testable without a GUI or an audio device.

use std::path::{Path, PathBuf};

use crate::tts::SynthesisOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating,
    Ready,
    Playing,
    Paused,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Where the app is in the cycle, the artifact the last successful cycle
/// produced, and the notice shown in the footer.
#[derive(Debug)]
pub struct Session {
    pub phase: Phase,
    artifact: Option<PathBuf>,
    notice: Option<(NoticeKind, String)>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            artifact: None,
            notice: None,
        }
    }

    /// Submission is accepted from every phase except `Generating`, and
    /// only with non-blank text.
    pub fn can_submit(&self, text: &str) -> bool {
        self.phase != Phase::Generating && !text.trim().is_empty()
    }

    pub fn is_generating(&self) -> bool {
        self.phase == Phase::Generating
    }

    /// Transport and export operate on the artifact whenever one exists and
    /// no generation is in flight. A failed generation keeps the prior clip,
    /// so these stay available in `Failed` too.
    pub fn has_audio(&self) -> bool {
        self.artifact.is_some() && self.phase != Phase::Generating
    }

    pub fn artifact(&self) -> Option<&Path> {
        self.artifact.as_deref()
    }

    pub fn notice(&self) -> Option<(NoticeKind, &str)> {
        self.notice.as_ref().map(|(kind, text)| (*kind, text.as_str()))
    }

    pub fn set_notice(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notice = Some((kind, text.into()));
    }

    /// Starts a new cycle: clears the notice and keeps the prior artifact
    /// until the worker replaces it.
    pub fn begin_generation(&mut self) {
        self.phase = Phase::Generating;
        self.notice = None;
    }

    pub fn finish_generation(&mut self, outcome: &SynthesisOutcome) {
        match outcome {
            SynthesisOutcome::Ready(path) => {
                self.artifact = Some(path.clone());
                self.phase = Phase::Ready;
            }
            SynthesisOutcome::Failed => {
                // The prior artifact stays playable and exportable
                self.phase = Phase::Failed;
                self.set_notice(
                    NoticeKind::Error,
                    "Audio generation failed. See the log for details.",
                );
            }
        }
    }

    /// No-op unless an artifact is available (`Ready`, `Paused`, or
    /// `Failed` with a prior clip).
    pub fn mark_playing(&mut self) {
        if self.has_audio() {
            self.phase = Phase::Playing;
        }
    }

    pub fn mark_paused(&mut self) {
        if self.phase == Phase::Playing {
            self.phase = Phase::Paused;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
