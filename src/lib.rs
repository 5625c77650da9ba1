//! Playdeck - a playlist-driven audio player
//!
//! The crate is built around two components:
//!
//! - [`backend::MediaBackend`]: the opaque decode/output engine. The
//!   bundled [`backend::RodioBackend`] plays through the default audio
//!   device; tests substitute scripted backends.
//! - [`player::PlaybackController`]: the playback core. It owns the
//!   playlist, the cursor, the auto-repeat mode and the session state,
//!   commands the backend, and publishes a typed event stream.
//!
//! Everything else (config, the named-playlist store, the CLI binary) is
//! plumbing around those two.

pub mod backend;
pub mod player;
pub mod playlist;
pub mod utils;

pub use player::{PlaybackController, PlaybackState, PlayerEvent, PlayerWarning, RepeatMode, Track};
pub use playlist::{Playlist, PlaylistStore};
pub use utils::{Config, PlaydeckError, Result};
