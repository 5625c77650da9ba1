//! Media backend seam for Playdeck
//!
//! The decode/output engine is opaque to the playback core. The controller
//! commands it through the [`MediaBackend`] trait and learns about progress
//! through [`BackendEvent`]s, which the driver loop polls and feeds back in
//! on a single thread. A backend that never reports [`BackendEvent::EndOfMedia`]
//! leaves the session playing indefinitely; that is the backend's problem,
//! not the controller's.

mod rodio_backend;

pub use rodio_backend::RodioBackend;

use crate::player::Track;
use crate::utils::error::Result;
use std::time::Duration;

/// Discrete events reported by a media backend
///
/// Delivery is serialized: the driver loop polls the backend and hands each
/// event to the controller before polling again, so the controller needs no
/// internal locking.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// A source was loaded successfully
    Opened,

    /// Total duration of the loaded source became known
    DurationKnown(Duration),

    /// Periodic position report while playing
    PositionTick(Duration),

    /// The loaded source played to its end
    EndOfMedia,

    /// Decode or I/O failure, message passed through verbatim
    Error(String),
}

/// Opaque media decode/output engine
pub trait MediaBackend {
    /// Load a track as the current source. Does not start playback.
    fn load(&mut self, track: &Track) -> Result<()>;

    /// Unload the current source
    fn clear(&mut self);

    /// Whether a source is currently loaded
    fn has_source(&self) -> bool;

    /// Start or resume playback of the loaded source
    fn play(&mut self) -> Result<()>;

    /// Pause playback. Position after pause is not reliable; callers
    /// snapshot it beforehand.
    fn pause(&mut self);

    /// Stop playback unconditionally
    fn stop(&mut self);

    /// Seek to an absolute position. The backend serializes overlapping
    /// seeks itself.
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Set output volume, 0.0 - 1.0
    fn set_volume(&mut self, volume: f32);

    /// Current playback position as reported by the engine
    fn position(&self) -> Duration;

    /// Total duration of the loaded source, when known
    fn duration(&self) -> Option<Duration>;

    /// Drain pending backend events
    fn poll(&mut self) -> Vec<BackendEvent>;
}
