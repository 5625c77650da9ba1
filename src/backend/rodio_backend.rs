//! Rodio-based media backend
//!
//! Wraps a rodio `Sink` on the default output device. Rodio exposes no
//! playback state of its own, so the backend tracks whether it started a
//! source and turns the sink draining into an end-of-media event. A stopped
//! or drained source is re-decoded from the stored path on the next play().

use crate::backend::{BackendEvent, MediaBackend};
use crate::player::Track;
use crate::utils::error::{IntoPlaydeckError, PlaydeckError, Result};

use log::{debug, trace};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

pub struct RodioBackend {
    // Keeps the OS audio connection open; dropping it kills the sink.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Sink,

    source_path: Option<PathBuf>,
    duration: Option<Duration>,
    volume: f32,

    /// True between play() and the sink draining or being paused/stopped
    playing: bool,

    pending: Vec<BackendEvent>,
}

impl RodioBackend {
    /// Open the default output device
    pub fn new() -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().backend_err("Opening default output device")?;
        let sink = Sink::try_new(&handle).backend_err("Creating audio sink")?;
        sink.pause();

        Ok(Self {
            _stream: stream,
            handle,
            sink,
            source_path: None,
            duration: None,
            volume: 1.0,
            playing: false,
            pending: Vec::new(),
        })
    }

    /// Decode the stored path and queue it on a fresh, paused sink
    fn queue_source(&mut self) -> Result<()> {
        let path = self
            .source_path
            .clone()
            .ok_or_else(|| PlaydeckError::Backend("No source loaded".to_string()))?;

        let file = File::open(&path)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| PlaydeckError::Decode(format!("{}: {}", path.display(), e)))?;
        self.duration = source.total_duration();

        // Replace the sink rather than reuse it; a stopped rodio sink
        // starts appended sources immediately.
        let sink = Sink::try_new(&self.handle).backend_err("Creating audio sink")?;
        sink.pause();
        sink.set_volume(self.volume);
        sink.append(source);
        self.sink.stop();
        self.sink = sink;

        Ok(())
    }
}

impl MediaBackend for RodioBackend {
    fn load(&mut self, track: &Track) -> Result<()> {
        debug!("Loading source: {}", track.path().display());
        self.source_path = Some(track.path().to_path_buf());
        self.playing = false;

        if let Err(e) = self.queue_source() {
            self.source_path = None;
            self.duration = None;
            return Err(e);
        }

        self.pending.push(BackendEvent::Opened);
        if let Some(duration) = self.duration {
            self.pending.push(BackendEvent::DurationKnown(duration));
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.sink.stop();
        self.source_path = None;
        self.duration = None;
        self.playing = false;
    }

    fn has_source(&self) -> bool {
        self.source_path.is_some()
    }

    fn play(&mut self) -> Result<()> {
        // After a stop or a completed track the queue is empty; re-decode
        // so play() restarts the same source.
        if self.sink.empty() {
            self.queue_source()?;
        }

        self.sink.play();
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
        self.playing = false;
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.sink
            .try_seek(position)
            .map_err(|e| PlaydeckError::Backend(format!("Seek failed: {}", e)))
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.sink.set_volume(self.volume);
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn poll(&mut self) -> Vec<BackendEvent> {
        let mut events = std::mem::take(&mut self.pending);

        if self.playing {
            if self.sink.empty() {
                trace!("Sink drained, end of media");
                self.playing = false;
                events.push(BackendEvent::EndOfMedia);
            } else {
                events.push(BackendEvent::PositionTick(self.sink.get_pos()));
            }
        }

        events
    }
}
