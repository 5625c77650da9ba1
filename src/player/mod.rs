//! Player module for Playdeck
//!
//! This module owns the playback core: the track and state types shared
//! across the crate and the [`PlaybackController`] state machine that
//! drives a [`MediaBackend`](crate::backend::MediaBackend) and publishes
//! the observable playback protocol as a typed event stream.

mod controller;

pub use controller::PlaybackController;

use std::path::{Path, PathBuf};
use std::time::Duration;

/// A reference to a playable media item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    path: PathBuf,
}

impl Track {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Human-readable name: the file stem, or the whole path when there
    /// is no stem to take.
    pub fn display_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

impl From<&str> for Track {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for Track {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

/// Playback session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing playing; also the state right after a track was loaded
    #[default]
    Stopped,

    /// Currently playing
    Playing,

    /// Playback paused, resume position remembered
    Paused,
}

/// Policy governing what happens when the current track finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Advance through the playlist once, then stop
    #[default]
    None,

    /// Replay the current track forever
    One,

    /// Cycle through the whole playlist forever
    All,
}

/// Recoverable, expected conditions reported to the user
///
/// Warnings are toast/status feedback; anything blocking travels as
/// [`PlayerEvent::Error`] instead. The split is part of the UI contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerWarning {
    /// play() without a loaded source
    NoSourceLoaded,

    /// play() while already playing
    AlreadyPlaying,

    /// pause() while not playing
    NotPlaying,

    /// play_next() at the end of the playlist
    NoNextTrack,

    /// play_previous() at the start of the playlist
    NoPreviousTrack,
}

impl std::fmt::Display for PlayerWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            PlayerWarning::NoSourceLoaded => "You must first open a music file.",
            PlayerWarning::AlreadyPlaying => "There's already a music playing.",
            PlayerWarning::NotPlaying => "There isn't any music playing.",
            PlayerWarning::NoNextTrack => "There's no next music to play.",
            PlayerWarning::NoPreviousTrack => "There's no previous music to play.",
        };
        f.write_str(msg)
    }
}

/// Player event for external consumers
///
/// The controller fans these out to every subscriber; the UI (or the CLI
/// loop) reacts without the controller knowing anything about it.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Recoverable user feedback
    Warning(PlayerWarning),

    /// Blocking failure, surfaced verbatim when backend-reported
    Error(String),

    /// Duration of the loaded track became known
    DurationChanged(Duration),

    /// Periodic position report while playing
    PositionChanged(Duration),

    /// A track started playing after the current selection changed
    NowPlaying(Track),

    /// The playlist is exhausted and the session went idle
    Finished,
}
