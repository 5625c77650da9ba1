//! Named-playlist persistence
//!
//! Playlists are stored in a single TOML file mapping each playlist name to
//! an ordered array of track paths:
//!
//! ```toml
//! [playlists]
//! chill = ["/music/a.flac", "/music/b.mp3"]
//! ```
//!
//! Arrays keep insertion order, so a reloaded playlist always comes back in
//! the order it was saved.

use crate::player::Track;
use crate::utils::error::{PlaydeckError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    playlists: BTreeMap<String, Vec<PathBuf>>,
}

/// TOML-backed store of named playlists
pub struct PlaylistStore {
    path: PathBuf,
}

impl PlaylistStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Load the tracks of a named playlist, in saved order
    pub fn load_group(&self, name: &str) -> Result<Vec<Track>> {
        let file = self.read()?;
        file.playlists
            .get(name)
            .map(|paths| paths.iter().map(Track::new).collect())
            .ok_or_else(|| PlaydeckError::Store(format!("No playlist named '{}'", name)))
    }

    /// Save (or overwrite) a named playlist
    pub fn save_group(&self, name: &str, tracks: &[Track]) -> Result<()> {
        let mut file = self.read()?;
        file.playlists.insert(
            name.to_string(),
            tracks.iter().map(|t| t.path().to_path_buf()).collect(),
        );
        self.write(&file)
    }

    /// Remove a named playlist; missing names are not an error
    pub fn remove_group(&self, name: &str) -> Result<()> {
        let mut file = self.read()?;
        file.playlists.remove(name);
        self.write(&file)
    }

    /// Remove a track path from every playlist it appears in
    ///
    /// Playlists left empty by the removal are dropped entirely.
    pub fn remove_track(&self, path: &Path) -> Result<()> {
        let mut file = self.read()?;
        for tracks in file.playlists.values_mut() {
            tracks.retain(|p| p != path);
        }
        file.playlists.retain(|_, tracks| !tracks.is_empty());
        self.write(&file)
    }

    /// Names of all stored playlists
    pub fn names(&self) -> Result<Vec<String>> {
        let file = self.read()?;
        Ok(file.playlists.keys().cloned().collect())
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.playlists.contains_key(name))
    }

    fn read(&self) -> Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| PlaydeckError::Store(format!("Failed to read playlist file: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| PlaydeckError::Store(format!("Failed to parse playlist file: {}", e)))
    }

    fn write(&self, file: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PlaydeckError::Store(format!("Failed to create playlist directory: {}", e))
            })?;
        }

        let toml = toml::to_string_pretty(file)
            .map_err(|e| PlaydeckError::Store(format!("Failed to serialize playlists: {}", e)))?;

        std::fs::write(&self.path, toml)
            .map_err(|e| PlaydeckError::Store(format!("Failed to write playlist file: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, PlaylistStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().join("playlists.toml"));
        (dir, store)
    }

    fn tracks(names: &[&str]) -> Vec<Track> {
        names.iter().map(|n| Track::new(*n)).collect()
    }

    #[test]
    fn test_save_and_load_preserves_order() {
        let (_dir, store) = store();
        let saved = tracks(&["/m/z.mp3", "/m/a.mp3", "/m/q.mp3"]);
        store.save_group("mix", &saved).unwrap();

        let loaded = store.load_group("mix").unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_load_missing_group_fails() {
        let (_dir, store) = store();
        assert!(store.load_group("nope").is_err());
    }

    #[test]
    fn test_names_and_remove_group() {
        let (_dir, store) = store();
        store.save_group("one", &tracks(&["/m/a.mp3"])).unwrap();
        store.save_group("two", &tracks(&["/m/b.mp3"])).unwrap();
        assert_eq!(store.names().unwrap(), vec!["one", "two"]);

        store.remove_group("one").unwrap();
        assert_eq!(store.names().unwrap(), vec!["two"]);
        assert!(!store.contains("one").unwrap());
    }

    #[test]
    fn test_overwrite_group() {
        let (_dir, store) = store();
        store.save_group("mix", &tracks(&["/m/a.mp3", "/m/b.mp3"])).unwrap();
        store.save_group("mix", &tracks(&["/m/c.mp3"])).unwrap();

        assert_eq!(store.load_group("mix").unwrap(), tracks(&["/m/c.mp3"]));
    }

    #[test]
    fn test_remove_track_everywhere() {
        let (_dir, store) = store();
        store
            .save_group("one", &tracks(&["/m/shared.mp3", "/m/a.mp3"]))
            .unwrap();
        store.save_group("two", &tracks(&["/m/shared.mp3"])).unwrap();

        store.remove_track(Path::new("/m/shared.mp3")).unwrap();

        assert_eq!(store.load_group("one").unwrap(), tracks(&["/m/a.mp3"]));
        // "two" became empty and was dropped.
        assert!(!store.contains("two").unwrap());
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let (_dir, store) = store();
        assert!(store.names().unwrap().is_empty());
    }
}
