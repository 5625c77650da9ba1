//! Playback controller implementation for Playdeck
//!
//! The controller owns the ordered playlist, the current-index cursor, the
//! auto-repeat mode and the play/pause/stop session state. It drives the
//! media backend and fans typed [`PlayerEvent`]s out to subscribers.
//!
//! Everything here runs on one thread: backend events are polled and handed
//! to [`PlaybackController::handle_backend_event`] by the driver loop, so no
//! locking is needed.

use crate::backend::{BackendEvent, MediaBackend};
use crate::player::{PlaybackState, PlayerEvent, PlayerWarning, RepeatMode, Track};
use crate::playlist::Playlist;
use crate::utils::error::{PlaydeckError, Result};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};
use std::time::Duration;

/// Main playback controller
pub struct PlaybackController {
    backend: Box<dyn MediaBackend>,

    playlist: Playlist,

    /// Index of the current track. Invariant: always within the playlist
    /// bounds when `Some`; candidate indices are checked before the cursor
    /// moves, so it can never end up one-past-the-end.
    cursor: Option<usize>,

    repeat_mode: RepeatMode,

    state: PlaybackState,

    /// Position snapshotted right before pausing. The backend's reported
    /// position after a pause is not reliable, so play() re-seeks here
    /// when resuming.
    resume_position: Duration,

    /// Duration of the loaded track, once the backend reported it
    duration: Option<Duration>,

    /// The track currently loaded into the backend. May not be in the
    /// playlist at all when selected by identity.
    current_track: Option<Track>,

    /// Set when the selection changed since the last play(), so that
    /// NowPlaying fires once per new track rather than on every resume
    current_changed: bool,

    subscribers: Vec<Sender<PlayerEvent>>,
}

impl PlaybackController {
    /// Create a controller over the given backend with an initial volume
    /// in the backend's 0.0 - 1.0 range
    pub fn new(mut backend: Box<dyn MediaBackend>, volume: f32) -> Self {
        backend.set_volume(volume.clamp(0.0, 1.0));

        Self {
            backend,
            playlist: Playlist::new(),
            cursor: None,
            repeat_mode: RepeatMode::None,
            state: PlaybackState::Stopped,
            resume_position: Duration::ZERO,
            duration: None,
            current_track: None,
            current_changed: false,
            subscribers: Vec::new(),
        }
    }

    /// Subscribe to the player event stream
    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    // --- Playlist bookkeeping ---------------------------------------------

    /// Replace the playlist wholesale
    ///
    /// The cursor is reset to unset and nothing is auto-selected; callers
    /// establish a cursor with [`set_current`](Self::set_current). The
    /// backend source is left untouched.
    pub fn set_playlist(&mut self, tracks: Vec<Track>) {
        debug!("Replacing playlist with {} tracks", tracks.len());
        self.playlist.replace(tracks);
        self.cursor = None;
    }

    /// Append tracks to the playlist without touching the cursor
    pub fn add_tracks(&mut self, tracks: Vec<Track>) {
        for track in tracks {
            self.playlist.push(track);
        }
    }

    /// Remove the track at `index` from the playlist
    ///
    /// Removing the current track leaves the cursor unset; the backend
    /// keeps whatever source it has. Removing an earlier track shifts the
    /// cursor down so it keeps pointing at the same track.
    pub fn remove_track(&mut self, index: usize) -> Result<()> {
        if index >= self.playlist.len() {
            return Err(PlaydeckError::IndexOutOfRange {
                index,
                len: self.playlist.len(),
            });
        }

        self.playlist.remove(index);
        self.cursor = match self.cursor {
            Some(c) if c == index => None,
            Some(c) if c > index => Some(c - 1),
            other => other,
        };
        Ok(())
    }

    /// Drop every track from the playlist; the session resets to stopped
    pub fn clear_playlist(&mut self) {
        self.playlist.clear();
        self.cursor = None;
        self.stop();
    }

    /// Name the active playlist
    pub fn set_playlist_name<S: Into<String>>(&mut self, name: S) {
        self.playlist.set_name(Some(name.into()));
    }

    pub fn playlist_name(&self) -> Option<&str> {
        self.playlist.name()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    // --- Cursor -----------------------------------------------------------

    /// Select the playlist slot at `index` and load it. Does not start
    /// playback.
    pub fn set_current(&mut self, index: usize) -> Result<()> {
        match self.playlist.get(index).cloned() {
            Some(track) => {
                self.cursor = Some(index);
                self.load_track(track)
            }
            None => {
                let err = PlaydeckError::IndexOutOfRange {
                    index,
                    len: self.playlist.len(),
                };
                self.emit(PlayerEvent::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Load the given track directly, whether or not it is in the playlist
    ///
    /// When the track also exists in the playlist the cursor moves to its
    /// index; otherwise the cursor is left where it was.
    pub fn set_current_track(&mut self, track: &Track) -> Result<()> {
        if let Some(index) = self.playlist.position(track) {
            self.cursor = Some(index);
        }
        self.load_track(track.clone())
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    // --- Session ----------------------------------------------------------

    /// Start or resume playback
    ///
    /// Returns false (with a warning event) when already playing or when
    /// no source is loaded. Resuming after a pause re-seeks to the
    /// position captured at pause time first.
    pub fn play(&mut self) -> bool {
        if self.state == PlaybackState::Playing {
            self.warn(PlayerWarning::AlreadyPlaying);
            return false;
        }

        if !self.backend.has_source() {
            self.warn(PlayerWarning::NoSourceLoaded);
            return false;
        }

        if self.state == PlaybackState::Paused && self.resume_position > Duration::ZERO {
            if let Err(e) = self.backend.seek(self.resume_position) {
                warn!("Resume seek failed: {}", e);
            }
        }

        if let Err(e) = self.backend.play() {
            self.emit(PlayerEvent::Error(e.to_string()));
            return false;
        }

        self.state = PlaybackState::Playing;
        self.resume_position = Duration::ZERO;

        if self.current_changed {
            self.current_changed = false;
            if let Some(track) = self.current_track.clone() {
                info!("Now playing: {}", track.display_name());
                self.emit(PlayerEvent::NowPlaying(track));
            }
        }

        true
    }

    /// Pause playback, remembering the current position for resume
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            self.warn(PlayerWarning::NotPlaying);
            return false;
        }

        // Snapshot before pausing; afterwards the backend's report is junk.
        self.resume_position = self.backend.position();
        self.backend.pause();
        self.state = PlaybackState::Paused;
        true
    }

    /// Stop playback unconditionally
    pub fn stop(&mut self) {
        self.backend.stop();
        self.state = PlaybackState::Stopped;
        self.resume_position = Duration::ZERO;
    }

    /// Toggle between playing and paused/stopped
    pub fn toggle_play(&mut self) -> bool {
        if self.state == PlaybackState::Playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Seek to an absolute position
    ///
    /// Positions past the known duration (or any nonzero position while
    /// the duration is unknown) are silently ignored.
    pub fn seek(&mut self, position: Duration) {
        let in_range = match self.duration.or_else(|| self.backend.duration()) {
            Some(duration) => position <= duration,
            None => position == Duration::ZERO,
        };
        if !in_range {
            return;
        }

        if let Err(e) = self.backend.seek(position) {
            warn!("Seek to {:?} failed: {}", position, e);
            return;
        }

        // A seek while paused retargets the resume position.
        if self.state == PlaybackState::Paused {
            self.resume_position = position;
        }
    }

    /// Advance to the next playlist slot and play it
    ///
    /// With the cursor unset this starts at index 0. Returns false without
    /// touching the backend when the playlist is exhausted.
    pub fn play_next(&mut self) -> bool {
        if self.try_advance() {
            return true;
        }
        self.warn(PlayerWarning::NoNextTrack);
        false
    }

    /// Step back to the previous playlist slot and play it
    pub fn play_previous(&mut self) -> bool {
        match self.cursor {
            Some(index) if index > 0 => {
                if self.set_current(index - 1).is_err() {
                    return false;
                }
                self.play()
            }
            _ => {
                self.warn(PlayerWarning::NoPreviousTrack);
                false
            }
        }
    }

    /// Unload the backend source and forget the active playlist name
    ///
    /// The playlist contents stay; closing the playlist is a separate
    /// operation.
    pub fn clear_source(&mut self) {
        self.backend.clear();
        self.playlist.set_name(None);
        self.current_track = None;
        self.current_changed = false;
        self.duration = None;
        self.state = PlaybackState::Stopped;
        self.resume_position = Duration::ZERO;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.backend.set_volume(volume.clamp(0.0, 1.0));
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        debug!("Auto-repeat mode: {:?}", mode);
        self.repeat_mode = mode;
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current position; while paused this is the remembered resume
    /// position rather than the backend's unreliable report
    pub fn position(&self) -> Duration {
        if self.state == PlaybackState::Paused {
            self.resume_position
        } else {
            self.backend.position()
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    // --- Backend event handling -------------------------------------------

    /// Drain the backend's pending events and process them
    pub fn poll(&mut self) {
        for event in self.backend.poll() {
            self.handle_backend_event(event);
        }
    }

    /// Process one backend event
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Opened => debug!("Backend opened source"),
            BackendEvent::DurationKnown(duration) => {
                self.duration = Some(duration);
                self.emit(PlayerEvent::DurationChanged(duration));
            }
            BackendEvent::PositionTick(position) => {
                self.emit(PlayerEvent::PositionChanged(position));
            }
            BackendEvent::EndOfMedia => self.on_track_finished(),
            BackendEvent::Error(message) => {
                self.state = PlaybackState::Stopped;
                self.emit(PlayerEvent::Error(message));
            }
        }
    }

    /// The end-of-track transition
    ///
    /// | mode | playlist | action                                          |
    /// |------|----------|-------------------------------------------------|
    /// | None | any      | advance; when exhausted go idle, emit Finished  |
    /// | One  | any      | replay the current track from the start         |
    /// | All  | len 1    | same as One                                     |
    /// | All  | len > 1  | advance; when exhausted wrap to index 0         |
    fn on_track_finished(&mut self) {
        self.state = PlaybackState::Stopped;
        self.resume_position = Duration::ZERO;

        match self.repeat_mode {
            RepeatMode::None => {
                if !self.try_advance() {
                    info!("End of playlist reached");
                    self.emit(PlayerEvent::Finished);
                }
            }
            RepeatMode::One => self.replay_current(),
            RepeatMode::All => {
                if self.playlist.len() <= 1 {
                    self.replay_current();
                } else if !self.try_advance() {
                    // Reached the end of the playlist, start again.
                    if self.set_current(0).is_ok() {
                        self.play();
                    }
                }
            }
        }
    }

    /// Advance the cursor and play, without emitting a warning on failure
    ///
    /// The candidate index is computed first and the cursor only moves on
    /// success, so exhaustion leaves all state untouched.
    fn try_advance(&mut self) -> bool {
        let candidate = self.cursor.map_or(0, |index| index + 1);
        if candidate >= self.playlist.len() {
            return false;
        }

        if self.set_current(candidate).is_err() {
            return false;
        }
        self.play()
    }

    /// Reload and play the current track from the start, cursor untouched
    fn replay_current(&mut self) {
        let Some(track) = self.current_track.clone() else {
            return;
        };

        if self.load_track(track).is_ok() {
            // Same song again, no fresh NowPlaying notification.
            self.current_changed = false;
            self.play();
        }
    }

    /// Stop-then-switch: load a track as the current source
    fn load_track(&mut self, track: Track) -> Result<()> {
        self.backend.stop();
        self.state = PlaybackState::Stopped;
        self.resume_position = Duration::ZERO;
        self.current_track = Some(track.clone());
        self.current_changed = true;

        if let Err(e) = self.backend.load(&track) {
            self.duration = None;
            self.emit(PlayerEvent::Error(e.to_string()));
            return Err(e);
        }

        self.duration = self.backend.duration();
        Ok(())
    }

    fn warn(&mut self, warning: PlayerWarning) {
        debug!("{}", warning);
        self.emit(PlayerEvent::Warning(warning));
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    /// Backend double that records commands and plays along
    #[derive(Default)]
    struct FakeBackend {
        source: Option<Track>,
        playing: bool,
        position: Duration,
        duration: Option<Duration>,
        pending: VecDeque<BackendEvent>,
        commands: Vec<String>,
        fail_load: bool,
    }

    impl FakeBackend {
        fn with_duration(duration: Duration) -> Self {
            Self {
                duration: Some(duration),
                ..Default::default()
            }
        }
    }

    impl MediaBackend for FakeBackend {
        fn load(&mut self, track: &Track) -> crate::utils::error::Result<()> {
            if self.fail_load {
                return Err(PlaydeckError::Decode("cannot open".to_string()));
            }
            self.commands.push(format!("load {}", track.path().display()));
            self.source = Some(track.clone());
            self.position = Duration::ZERO;
            Ok(())
        }

        fn clear(&mut self) {
            self.commands.push("clear".to_string());
            self.source = None;
            self.playing = false;
        }

        fn has_source(&self) -> bool {
            self.source.is_some()
        }

        fn play(&mut self) -> crate::utils::error::Result<()> {
            self.commands.push("play".to_string());
            self.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.commands.push("pause".to_string());
            self.playing = false;
            // Simulate the unreliable post-pause position report.
            self.position = Duration::ZERO;
        }

        fn stop(&mut self) {
            self.commands.push("stop".to_string());
            self.playing = false;
            self.position = Duration::ZERO;
        }

        fn seek(&mut self, position: Duration) -> crate::utils::error::Result<()> {
            self.commands.push(format!("seek {}", position.as_millis()));
            self.position = position;
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) {
            self.commands.push(format!("volume {:.2}", volume));
        }

        fn position(&self) -> Duration {
            self.position
        }

        fn duration(&self) -> Option<Duration> {
            self.duration
        }

        fn poll(&mut self) -> Vec<BackendEvent> {
            self.pending.drain(..).collect()
        }
    }

    fn tracks(names: &[&str]) -> Vec<Track> {
        names.iter().map(|n| Track::new(*n)).collect()
    }

    fn controller_with(names: &[&str]) -> PlaybackController {
        let backend = Box::new(FakeBackend::with_duration(Duration::from_secs(180)));
        let mut controller = PlaybackController::new(backend, 0.5);
        controller.set_playlist(tracks(names));
        controller
    }

    fn drain(rx: &Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_set_playlist_resets_cursor() {
        let mut c = controller_with(&["a.mp3", "b.mp3"]);
        c.set_current(1).unwrap();
        assert_eq!(c.cursor(), Some(1));

        c.set_playlist(tracks(&["x.mp3"]));
        assert_eq!(c.cursor(), None);
    }

    #[test]
    fn test_set_current_out_of_range() {
        let mut c = controller_with(&["a.mp3", "b.mp3", "c.mp3"]);
        c.set_current(1).unwrap();
        let rx = c.subscribe();

        let err = c.set_current(3).unwrap_err();
        assert!(matches!(err, PlaydeckError::IndexOutOfRange { index: 3, len: 3 }));
        // Cursor untouched by the failure.
        assert_eq!(c.cursor(), Some(1));
        assert!(matches!(drain(&rx).as_slice(), [PlayerEvent::Error(_)]));
    }

    #[test]
    fn test_set_current_by_identity() {
        let mut c = controller_with(&["a.mp3", "b.mp3"]);
        c.set_current_track(&Track::new("b.mp3")).unwrap();
        assert_eq!(c.cursor(), Some(1));

        // Not in the playlist: loads anyway, cursor stays.
        c.set_current_track(&Track::new("elsewhere.mp3")).unwrap();
        assert_eq!(c.cursor(), Some(1));
        assert_eq!(c.current_track().unwrap().display_name(), "elsewhere");
    }

    #[test]
    fn test_play_without_source_warns() {
        let backend = Box::new(FakeBackend::default());
        let mut c = PlaybackController::new(backend, 0.5);
        let rx = c.subscribe();

        assert!(!c.play());
        assert_eq!(c.state(), PlaybackState::Stopped);
        assert_eq!(
            drain(&rx),
            vec![PlayerEvent::Warning(PlayerWarning::NoSourceLoaded)]
        );
    }

    #[test]
    fn test_play_while_playing_warns() {
        let mut c = controller_with(&["a.mp3"]);
        c.set_current(0).unwrap();
        assert!(c.play());

        let rx = c.subscribe();
        assert!(!c.play());
        assert_eq!(
            drain(&rx),
            vec![PlayerEvent::Warning(PlayerWarning::AlreadyPlaying)]
        );
    }

    #[test]
    fn test_pause_while_stopped_warns() {
        let mut c = controller_with(&["a.mp3"]);
        let rx = c.subscribe();

        assert!(!c.pause());
        assert_eq!(
            drain(&rx),
            vec![PlayerEvent::Warning(PlayerWarning::NotPlaying)]
        );
    }

    #[test]
    fn test_pause_resume_restores_position() {
        let mut c = controller_with(&["a.mp3"]);
        c.set_current(0).unwrap();
        assert!(c.play());

        // Simulate progress, then pause.
        c.backend.seek(Duration::from_secs(42)).unwrap();
        assert!(c.pause());
        assert_eq!(c.position(), Duration::from_secs(42));

        // The fake backend zeroed its position on pause; resume must
        // re-seek to the snapshot.
        assert!(c.play());
        assert_eq!(c.backend.position(), Duration::from_secs(42));
        assert_eq!(c.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_seek_while_paused_retargets_resume() {
        let mut c = controller_with(&["a.mp3"]);
        c.set_current(0).unwrap();
        c.play();
        c.pause();

        c.seek(Duration::from_secs(90));
        assert_eq!(c.position(), Duration::from_secs(90));

        c.play();
        assert_eq!(c.backend.position(), Duration::from_secs(90));
    }

    #[test]
    fn test_seek_past_duration_is_noop() {
        let mut c = controller_with(&["a.mp3"]);
        c.set_current(0).unwrap();
        c.play();
        c.seek(Duration::from_secs(30));
        assert_eq!(c.backend.position(), Duration::from_secs(30));

        // Duration is 180s; anything past that is ignored.
        c.seek(Duration::from_secs(1000));
        assert_eq!(c.backend.position(), Duration::from_secs(30));
    }

    #[test]
    fn test_play_next_from_unset_cursor_starts_at_zero() {
        let mut c = controller_with(&["a.mp3", "b.mp3"]);
        assert!(c.play_next());
        assert_eq!(c.cursor(), Some(0));
        assert_eq!(c.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_play_next_exhaustion_leaves_state() {
        let mut c = controller_with(&["a.mp3", "b.mp3"]);
        c.set_current(1).unwrap();
        c.play();
        let rx = c.subscribe();

        assert!(!c.play_next());
        assert_eq!(c.cursor(), Some(1));
        assert_eq!(
            drain(&rx),
            vec![PlayerEvent::Warning(PlayerWarning::NoNextTrack)]
        );
    }

    #[test]
    fn test_play_previous_at_start_fails() {
        let mut c = controller_with(&["a.mp3", "b.mp3"]);
        c.set_current(0).unwrap();
        let rx = c.subscribe();

        assert!(!c.play_previous());
        assert_eq!(c.cursor(), Some(0));
        assert_eq!(
            drain(&rx),
            vec![PlayerEvent::Warning(PlayerWarning::NoPreviousTrack)]
        );
    }

    #[test]
    fn test_play_previous_steps_back() {
        let mut c = controller_with(&["a.mp3", "b.mp3", "c.mp3"]);
        c.set_current(2).unwrap();
        assert!(c.play_previous());
        assert_eq!(c.cursor(), Some(1));
        assert_eq!(c.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_finished_none_mode_advances_then_stops() {
        let mut c = controller_with(&["a.mp3", "b.mp3", "c.mp3"]);
        c.set_current(0).unwrap();
        c.play();
        let rx = c.subscribe();

        c.handle_backend_event(BackendEvent::EndOfMedia);
        assert_eq!(c.cursor(), Some(1));
        assert_eq!(c.state(), PlaybackState::Playing);

        c.handle_backend_event(BackendEvent::EndOfMedia);
        assert_eq!(c.cursor(), Some(2));

        c.handle_backend_event(BackendEvent::EndOfMedia);
        assert_eq!(c.state(), PlaybackState::Stopped);
        assert_eq!(c.cursor(), Some(2));
        assert!(drain(&rx).contains(&PlayerEvent::Finished));
    }

    #[test]
    fn test_finished_repeat_one_replays_same_index() {
        let mut c = controller_with(&["a.mp3", "b.mp3"]);
        c.set_repeat_mode(RepeatMode::One);
        c.set_current(1).unwrap();
        c.play();

        for _ in 0..5 {
            c.handle_backend_event(BackendEvent::EndOfMedia);
            assert_eq!(c.cursor(), Some(1));
            assert_eq!(c.state(), PlaybackState::Playing);
        }
    }

    #[test]
    fn test_finished_repeat_all_wraps() {
        let mut c = controller_with(&["a.mp3", "b.mp3", "c.mp3"]);
        c.set_repeat_mode(RepeatMode::All);
        c.set_current(2).unwrap();
        c.play();

        c.handle_backend_event(BackendEvent::EndOfMedia);
        assert_eq!(c.cursor(), Some(0));
        assert_eq!(c.state(), PlaybackState::Playing);
        assert_eq!(c.current_track().unwrap().display_name(), "a");
    }

    #[test]
    fn test_finished_repeat_all_cycles_forever() {
        let mut c = controller_with(&["a.mp3", "b.mp3", "c.mp3"]);
        c.set_repeat_mode(RepeatMode::All);
        c.set_current(1).unwrap();
        c.play();

        let mut visited = Vec::new();
        for _ in 0..7 {
            c.handle_backend_event(BackendEvent::EndOfMedia);
            visited.push(c.cursor().unwrap());
        }
        assert_eq!(visited, vec![2, 0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_finished_repeat_all_single_track() {
        let mut c = controller_with(&["only.mp3"]);
        c.set_repeat_mode(RepeatMode::All);
        c.set_current(0).unwrap();
        c.play();

        c.handle_backend_event(BackendEvent::EndOfMedia);
        assert_eq!(c.cursor(), Some(0));
        assert_eq!(c.state(), PlaybackState::Playing);
        assert_eq!(c.current_track().unwrap().display_name(), "only");
    }

    #[test]
    fn test_backend_error_passes_through() {
        let mut c = controller_with(&["a.mp3"]);
        c.set_current(0).unwrap();
        c.play();
        let rx = c.subscribe();

        c.handle_backend_event(BackendEvent::Error("demuxer choked".to_string()));
        assert_eq!(c.state(), PlaybackState::Stopped);
        assert_eq!(
            drain(&rx),
            vec![PlayerEvent::Error("demuxer choked".to_string())]
        );
    }

    #[test]
    fn test_duration_and_position_events() {
        let mut c = controller_with(&["a.mp3"]);
        let rx = c.subscribe();

        c.handle_backend_event(BackendEvent::DurationKnown(Duration::from_secs(200)));
        c.handle_backend_event(BackendEvent::PositionTick(Duration::from_secs(3)));

        assert_eq!(c.duration(), Some(Duration::from_secs(200)));
        assert_eq!(
            drain(&rx),
            vec![
                PlayerEvent::DurationChanged(Duration::from_secs(200)),
                PlayerEvent::PositionChanged(Duration::from_secs(3)),
            ]
        );
    }

    #[test]
    fn test_now_playing_fires_once_per_track() {
        let mut c = controller_with(&["a.mp3"]);
        let rx = c.subscribe();

        c.set_current(0).unwrap();
        c.play();
        c.pause();
        c.play();

        let now_playing: Vec<_> = drain(&rx)
            .into_iter()
            .filter(|e| matches!(e, PlayerEvent::NowPlaying(_)))
            .collect();
        assert_eq!(now_playing.len(), 1);
    }

    #[test]
    fn test_clear_source_forgets_name_keeps_playlist() {
        let mut c = controller_with(&["a.mp3", "b.mp3"]);
        c.set_playlist_name("road trip");
        c.set_current(0).unwrap();
        c.play();

        c.clear_source();
        assert_eq!(c.playlist_name(), None);
        assert_eq!(c.playlist().len(), 2);
        assert_eq!(c.state(), PlaybackState::Stopped);
        assert!(c.current_track().is_none());
    }

    #[test]
    fn test_remove_track_adjusts_cursor() {
        let mut c = controller_with(&["a.mp3", "b.mp3", "c.mp3"]);
        c.set_current(2).unwrap();

        c.remove_track(0).unwrap();
        assert_eq!(c.cursor(), Some(1));

        c.remove_track(1).unwrap();
        assert_eq!(c.cursor(), None);
    }

    #[test]
    fn test_failed_load_surfaces_error() {
        let backend = Box::new(FakeBackend {
            fail_load: true,
            ..Default::default()
        });
        let mut c = PlaybackController::new(backend, 0.5);
        c.set_playlist(tracks(&["broken.mp3"]));
        let rx = c.subscribe();

        assert!(c.set_current(0).is_err());
        assert!(matches!(drain(&rx).as_slice(), [PlayerEvent::Error(_)]));
        // No source loaded, so play keeps failing recoverably.
        assert!(!c.play());
    }

    proptest! {
        /// From start index i in a playlist of N, play_next succeeds
        /// exactly N - 1 - i times before the first failure, and the cursor
        /// never leaves [0, N).
        #[test]
        fn prop_play_next_succeeds_exactly_n_minus_one_minus_i(
            n in 1usize..12,
            offset in 0usize..12,
        ) {
            let i = offset % n;
            let names: Vec<String> = (0..n).map(|k| format!("t{}.mp3", k)).collect();
            let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();

            let mut c = controller_with(&name_refs);
            c.set_current(i).unwrap();

            let mut successes = 0;
            while c.play_next() {
                successes += 1;
                prop_assert!(c.cursor().unwrap() < n);
            }

            prop_assert_eq!(successes, n - 1 - i);
            prop_assert_eq!(c.cursor(), Some(n - 1));
        }
    }
}
