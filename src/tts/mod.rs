//! Background speech generation and the scratch artifact it produces.

mod worker;

pub use worker::spawn_generation;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// What the worker reports back over the channel. Anything richer than
/// ready-or-failed stays in the log.
pub enum SynthesisOutcome {
    Ready(PathBuf),
    Failed,
}

const SCRATCH_FILE: &str = "speech.mp3";
const STAGING_FILE: &str = "speech.mp3.part";

/// Process-lifetime scratch directory for generated audio.
pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join("voicepad")
}

/// The single scratch artifact. Every generation overwrites this path, so
/// an export has to copy it out before the next submission.
pub fn scratch_path() -> PathBuf {
    scratch_dir().join(SCRATCH_FILE)
}

/// Clears leftovers from previous runs and recreates the directory.
/// Called once at startup.
pub fn prepare_scratch_dir() {
    let dir = scratch_dir();
    if dir.exists() {
        let _ = std::fs::remove_dir_all(&dir);
    }
    if let Err(e) = std::fs::create_dir_all(&dir) {
        crate::log_error!("Could not prepare scratch dir {}: {}", dir.display(), e);
    }
}

/// Replaces the scratch artifact with a freshly generated clip. The bytes
/// land in a staging file that is renamed over the artifact, so a failure
/// at any point leaves the previous clip untouched.
pub fn write_scratch(bytes: &[u8]) -> Result<PathBuf> {
    let dir = scratch_dir();
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    write_clip_into(&dir, bytes)
}

fn write_clip_into(dir: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let path = dir.join(SCRATCH_FILE);
    let staging = dir.join(STAGING_FILE);

    if let Err(e) = std::fs::write(&staging, bytes) {
        let _ = std::fs::remove_file(&staging);
        return Err(e).with_context(|| format!("write {}", staging.display()));
    }
    if let Err(e) = std::fs::rename(&staging, &path) {
        let _ = std::fs::remove_file(&staging);
        return Err(e).with_context(|| format!("rename into {}", path.display()));
    }
    Ok(path)
}

/// Copies the artifact to the user's destination, appending `.mp3` when the
/// chosen name does not already carry it. Returns the path actually written.
pub fn export_copy(artifact: &Path, destination: &Path) -> Result<PathBuf> {
    let final_path = if has_mp3_extension(destination) {
        destination.to_path_buf()
    } else {
        append_mp3_extension(destination)
    };

    if let Some(parent) = final_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }

    std::fs::copy(artifact, &final_path).with_context(|| {
        format!(
            "copy {} to {}",
            artifact.display(),
            final_path.display()
        )
    })?;

    Ok(final_path)
}

fn has_mp3_extension(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("mp3"))
}

fn append_mp3_extension(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".mp3");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_path_is_stable_across_calls() {
        assert_eq!(scratch_path(), scratch_path());
        assert_eq!(
            scratch_path().parent(),
            Some(scratch_dir().as_path()),
            "artifact lives directly inside the scratch dir"
        );
    }

    #[test]
    fn scratch_writes_overwrite_a_single_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_clip_into(dir.path(), b"first-take").unwrap();
        let second = write_clip_into(dir.path(), b"second-take").unwrap();

        assert_eq!(first, second, "every generation lands on the same path");
        assert_eq!(std::fs::read(&second).unwrap(), b"second-take");
        assert_eq!(
            std::fs::read_dir(dir.path()).unwrap().count(),
            1,
            "one artifact, no staging leftovers"
        );
    }

    #[test]
    fn failed_scratch_write_keeps_the_previous_clip() {
        let dir = tempfile::tempdir().unwrap();
        write_clip_into(dir.path(), b"keep-me").unwrap();

        // A directory squatting on the staging path makes the write fail
        std::fs::create_dir(dir.path().join(STAGING_FILE)).unwrap();
        assert!(write_clip_into(dir.path(), b"never-lands").is_err());

        assert_eq!(
            std::fs::read(dir.path().join(SCRATCH_FILE)).unwrap(),
            b"keep-me",
            "a failed generation must not touch the previous clip"
        );
    }

    #[test]
    fn failed_swap_removes_the_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the artifact path makes the rename fail
        std::fs::create_dir(dir.path().join(SCRATCH_FILE)).unwrap();

        assert!(write_clip_into(dir.path(), b"audio").is_err());
        assert!(
            !dir.path().join(STAGING_FILE).exists(),
            "staging file must not linger after a failure"
        );
    }

    #[test]
    fn export_appends_extension_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("speech.mp3");
        std::fs::write(&artifact, b"mp3-bytes").unwrap();

        let written = export_copy(&artifact, &dir.path().join("my clip")).unwrap();
        assert_eq!(written, dir.path().join("my clip.mp3"));
        assert_eq!(std::fs::read(&written).unwrap(), b"mp3-bytes");
    }

    #[test]
    fn export_keeps_an_existing_mp3_extension() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("speech.mp3");
        std::fs::write(&artifact, b"x").unwrap();

        let written = export_copy(&artifact, &dir.path().join("clip.mp3")).unwrap();
        assert_eq!(written, dir.path().join("clip.mp3"));

        let upper = export_copy(&artifact, &dir.path().join("LOUD.MP3")).unwrap();
        assert_eq!(upper, dir.path().join("LOUD.MP3"), "extension match is case-insensitive");
    }

    #[test]
    fn export_appends_after_a_foreign_extension() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("speech.mp3");
        std::fs::write(&artifact, b"x").unwrap();

        let written = export_copy(&artifact, &dir.path().join("notes.wav")).unwrap();
        assert_eq!(written, dir.path().join("notes.wav.mp3"));
    }

    #[test]
    fn export_overwrites_an_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("speech.mp3");
        std::fs::write(&artifact, b"new").unwrap();
        let dest = dir.path().join("out.mp3");
        std::fs::write(&dest, b"old-old-old").unwrap();

        export_copy(&artifact, &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn export_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("speech.mp3");
        std::fs::write(&artifact, b"x").unwrap();

        let nested = dir.path().join("a").join("b").join("clip");
        let written = export_copy(&artifact, &nested).unwrap();
        assert!(written.exists());
        assert_eq!(written, dir.path().join("a").join("b").join("clip.mp3"));
    }

    #[test]
    fn export_with_no_artifact_reports_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-generated.mp3");
        let err = export_copy(&missing, &dir.path().join("out")).unwrap_err();
        assert!(
            err.to_string().contains("copy"),
            "error should name the copy step: {:#}",
            err
        );
        assert!(
            !dir.path().join("out.mp3").exists(),
            "failed export must not leave a destination file"
        );
    }
}
