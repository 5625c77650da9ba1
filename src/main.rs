use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use crossbeam_channel::{unbounded, Receiver};
use env_logger::Env;
use log::{error, info, warn};
use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use playdeck::backend::RodioBackend;
use playdeck::utils::format_duration;
use playdeck::{Config, PlaybackController, PlaybackState, PlayerEvent, PlaylistStore, RepeatMode, Track};

/// Playdeck - a playlist-driven audio player
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Media files to play
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Comma-separated list of music files to be played
    #[arg(short = 'f', long = "files", value_name = "LIST")]
    file_list: Option<String>,

    /// Play a saved playlist by name
    #[arg(short, long, value_name = "NAME")]
    playlist: Option<String>,

    /// List saved playlists and exit
    #[arg(long)]
    list_playlists: bool,

    /// Set initial volume (0-100)
    #[arg(short, long, value_name = "VOLUME")]
    volume: Option<u8>,

    /// Auto-repeat mode
    #[arg(short, long, value_enum, default_value_t = RepeatArg::None)]
    repeat: RepeatArg,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RepeatArg {
    None,
    One,
    All,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::None => RepeatMode::None,
            RepeatArg::One => RepeatMode::One,
            RepeatArg::All => RepeatMode::All,
        }
    }
}

/// Remote commands accepted on stdin while playing
enum Command {
    Next,
    Previous,
    TogglePlay,
    Stop,
    Quit,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load().context("Loading configuration")?;

    let log_level = if args.debug {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting Playdeck v{}", env!("CARGO_PKG_VERSION"));

    let store_path = Config::playlist_store_path()
        .context("Cannot determine the playlist store path")?;
    let store = PlaylistStore::new(store_path);

    if args.list_playlists {
        for name in store.names()? {
            println!("{}", name);
        }
        return Ok(());
    }

    // Assemble the playlist: a named group, or the files from the command
    // line, or the configured default playlist.
    let mut playlist_name = args.playlist.clone();
    let mut tracks = match &args.playlist {
        Some(name) => store
            .load_group(name)
            .with_context(|| format!("Loading playlist '{}'", name))?,
        None => {
            let mut tracks: Vec<Track> = Vec::new();
            if let Some(list) = &args.file_list {
                tracks.extend(
                    list.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(Track::new),
                );
            }
            tracks.extend(args.files.iter().map(Track::new));
            tracks
        }
    };

    if tracks.is_empty() && !config.general.default_playlist.is_empty() {
        let name = config.general.default_playlist.clone();
        tracks = store
            .load_group(&name)
            .with_context(|| format!("Loading default playlist '{}'", name))?;
        playlist_name = Some(name);
    }

    if tracks.is_empty() {
        bail!("Nothing to play. Pass files, --files or --playlist.");
    }

    let backend = RodioBackend::new().context("Opening audio output")?;
    let volume = match args.volume {
        Some(v) => f32::from(v.min(100)) / 100.0,
        None => config.volume_level(),
    };

    let mut controller = PlaybackController::new(Box::new(backend), volume);
    controller.set_repeat_mode(args.repeat.into());
    controller.set_playlist(tracks);
    if let Some(name) = playlist_name {
        controller.set_playlist_name(name);
    }

    let events = controller.subscribe();

    // Re-select the remembered song, but do not auto-play it from there
    // unless it is actually in this playlist.
    let mut resumed = false;
    if config.general.remember_last_song {
        if let Some(last) = &config.general.last_song {
            let track = Track::new(last.clone());
            if controller.playlist().position(&track).is_some()
                && controller.set_current_track(&track).is_ok()
            {
                resumed = controller.play();
            }
        }
    }
    if !resumed && !controller.play_next() {
        bail!("Could not start playback");
    }

    let commands = spawn_stdin_reader();
    let result = run_loop(&mut controller, &events, &commands, &mut config);

    if config.general.remember_last_song {
        if let Err(e) = config.save() {
            warn!("Could not save configuration: {}", e);
        }
    }

    result
}

/// Reads remote commands from stdin on a separate thread
fn spawn_stdin_reader() -> Receiver<Command> {
    let (tx, rx) = unbounded();

    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim() {
                "next" | "n" => Command::Next,
                "prev" | "previous" | "b" => Command::Previous,
                "toggle" | "play" | "pause" | "p" => Command::TogglePlay,
                "stop" | "s" => Command::Stop,
                "quit" | "q" => Command::Quit,
                "" => continue,
                other => {
                    warn!("Unknown command: {}", other);
                    continue;
                }
            };
            if tx.send(command).is_err() {
                break;
            }
        }
    });

    rx
}

/// Single-threaded driver loop: poll the backend, dispatch player events,
/// apply stdin commands
fn run_loop(
    controller: &mut PlaybackController,
    events: &Receiver<PlayerEvent>,
    commands: &Receiver<Command>,
    config: &mut Config,
) -> Result<()> {
    loop {
        controller.poll();

        for event in events.try_iter() {
            match event {
                PlayerEvent::NowPlaying(track) => {
                    info!("Now playing: {}", track.display_name());
                    config.general.last_song = Some(track.path().to_path_buf());
                }
                PlayerEvent::DurationChanged(duration) => {
                    info!("Duration: {}", format_duration(duration));
                }
                PlayerEvent::Warning(warning) => warn!("{}", warning),
                PlayerEvent::Error(message) => {
                    error!("{}", message);
                    bail!("Playback failed: {}", message);
                }
                PlayerEvent::Finished => {
                    info!("Playlist finished");
                    return Ok(());
                }
                PlayerEvent::PositionChanged(_) => {}
            }
        }

        for command in commands.try_iter() {
            match command {
                Command::Next => {
                    controller.play_next();
                }
                Command::Previous => {
                    controller.play_previous();
                }
                Command::TogglePlay => {
                    controller.toggle_play();
                }
                Command::Stop => controller.stop(),
                Command::Quit => {
                    controller.stop();
                    return Ok(());
                }
            }
        }

        // Stopped with nothing queued and no way forward: idle until a
        // command arrives rather than busy-spin.
        let sleep = if controller.state() == PlaybackState::Playing {
            Duration::from_millis(100)
        } else {
            Duration::from_millis(250)
        };
        thread::sleep(sleep);
    }
}
