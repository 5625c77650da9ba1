//! Playlist management for Playdeck
//!
//! An ordered sequence of tracks plus an optional name. Order is meaningful,
//! it defines next/previous adjacency, and duplicates are allowed. The
//! controller owns the playlist exclusively; consumers get read-only access.

mod store;

pub use store::PlaylistStore;

use crate::player::Track;

/// Ordered track list with an optional name
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    name: Option<String>,
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self { name: None, tracks }
    }

    /// Replace the contents wholesale, keeping the name
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index < self.tracks.len() {
            Some(self.tracks.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Index of the first occurrence of `track`
    pub fn position(&self, track: &Track) -> Option<usize> {
        self.tracks.iter().position(|t| t == track)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Playlist {
        Playlist::from_tracks(vec![
            Track::new("a.mp3"),
            Track::new("b.mp3"),
            Track::new("a.mp3"),
        ])
    }

    #[test]
    fn test_order_and_duplicates() {
        let playlist = sample();
        assert_eq!(playlist.len(), 3);
        assert_eq!(playlist.get(2), Some(&Track::new("a.mp3")));
        // position finds the first occurrence
        assert_eq!(playlist.position(&Track::new("a.mp3")), Some(0));
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut playlist = sample();
        assert!(playlist.remove(5).is_none());
        assert_eq!(playlist.remove(1), Some(Track::new("b.mp3")));
        assert_eq!(playlist.len(), 2);
    }

    #[test]
    fn test_replace_keeps_name() {
        let mut playlist = sample();
        playlist.set_name(Some("mix".to_string()));
        playlist.replace(vec![Track::new("x.mp3")]);
        assert_eq!(playlist.name(), Some("mix"));
        assert_eq!(playlist.len(), 1);
    }
}
