//! core/resolve/catalog.rs
//! The Artist -> Album -> Track hierarchy.
//!
//! Ownership:
//! - `Catalog` owns every Artist and Album (two arenas).
//! - An Artist lists its Albums by `AlbumId`.
//! - An Album points back at its Artist by `ArtistId` (non-owning).
//!
//! Names match case-insensitively. Two Artists may both have an Album
//! called "Greatest Hits"; they are different Albums.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::types::TrackId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtistId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlbumId(usize);

/// Result of a rating rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollup {
    /// Not enough rated tracks to say anything.
    Unrated,
    /// 1..=5 stars.
    Stars(u8),
}

impl fmt::Display for Rollup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rollup::Unrated => f.write_str("Unrated"),
            Rollup::Stars(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Artist {
    pub name: String,
    /// `None` until a rollup has run.
    pub rating: Option<Rollup>,
    albums: Vec<AlbumId>,
}

impl Artist {
    pub fn albums(&self) -> &[AlbumId] {
        &self.albums
    }
}

/// Marker that some member track carries artwork. We keep the file it came
/// from, not the image bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub source: PathBuf,
}

/// Descriptive fields shared by an Album's tracks. `None` = not known yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumFields {
    pub genre: Option<String>,
    pub composer: Option<String>,
    pub grouping: Option<String>,
    pub comments: Option<String>,
    pub disc_count: Option<u32>,
    pub track_count: Option<u32>,
    pub year: Option<i32>,
    /// Raw 0..=100 rating of the first rated member track.
    pub rating: Option<u8>,
    pub artwork: Option<Artwork>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumTrack {
    pub id: TrackId,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Album {
    pub name: String,
    pub fields: AlbumFields,
    /// Star rollup; `None` until a rollup has run.
    pub rating: Option<Rollup>,
    artist: ArtistId,
    tracks: Vec<AlbumTrack>,
}

impl Album {
    pub fn artist(&self) -> ArtistId {
        self.artist
    }

    /// Member tracks in the order they were assigned.
    pub fn tracks(&self) -> &[AlbumTrack] {
        &self.tracks
    }

    pub fn track_paths(&self) -> impl Iterator<Item = &Path> {
        self.tracks.iter().map(|t| t.path.as_path())
    }

    pub fn add_track(&mut self, id: TrackId, path: PathBuf) {
        if self.tracks.iter().any(|t| t.id == id) {
            return;
        }
        self.tracks.push(AlbumTrack { id, path });
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    artists: Vec<Artist>,
    albums: Vec<Album>,
    by_name: HashMap<String, ArtistId>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    pub fn artist_count(&self) -> usize {
        self.artists.len()
    }

    pub fn album_count(&self) -> usize {
        self.albums.len()
    }

    pub fn track_count(&self) -> usize {
        self.albums.iter().map(|a| a.tracks.len()).sum()
    }

    pub fn artist(&self, id: ArtistId) -> &Artist {
        &self.artists[id.0]
    }

    pub fn artist_mut(&mut self, id: ArtistId) -> &mut Artist {
        &mut self.artists[id.0]
    }

    pub fn album(&self, id: AlbumId) -> &Album {
        &self.albums[id.0]
    }

    pub fn album_mut(&mut self, id: AlbumId) -> &mut Album {
        &mut self.albums[id.0]
    }

    /// Artists in creation order.
    pub fn artists(&self) -> impl Iterator<Item = (ArtistId, &Artist)> {
        self.artists.iter().enumerate().map(|(i, a)| (ArtistId(i), a))
    }

    pub fn artist_ids(&self) -> impl Iterator<Item = ArtistId> + use<> {
        (0..self.artists.len()).map(ArtistId)
    }

    /// All albums, grouped by artist in creation order.
    pub fn album_ids(&self) -> Vec<AlbumId> {
        self.artists
            .iter()
            .flat_map(|a| a.albums.iter().copied())
            .collect()
    }

    pub fn albums_of(&self, artist: ArtistId) -> impl Iterator<Item = (AlbumId, &Album)> {
        self.artists[artist.0]
            .albums
            .iter()
            .map(|&id| (id, &self.albums[id.0]))
    }

    pub fn find_artist(&self, name: &str) -> Option<ArtistId> {
        self.by_name.get(&fold(name)).copied()
    }

    pub fn find_album(&self, artist: ArtistId, name: &str) -> Option<AlbumId> {
        let key = fold(name);
        self.artists[artist.0]
            .albums
            .iter()
            .copied()
            .find(|&id| fold(&self.albums[id.0].name) == key)
    }

    /// First album named `name` under ANY artist, scanning artists in
    /// creation order. No disambiguation beyond that.
    pub fn find_album_anywhere(&self, name: &str) -> Option<AlbumId> {
        self.artist_ids().find_map(|artist| self.find_album(artist, name))
    }

    pub fn add_artist(&mut self, name: &str) -> ArtistId {
        if let Some(id) = self.find_artist(name) {
            return id;
        }
        let id = ArtistId(self.artists.len());
        self.artists.push(Artist {
            name: name.to_string(),
            rating: None,
            albums: Vec::new(),
        });
        self.by_name.insert(fold(name), id);
        id
    }

    pub fn add_album(&mut self, artist: ArtistId, name: &str) -> AlbumId {
        if let Some(id) = self.find_album(artist, name) {
            return id;
        }
        let id = AlbumId(self.albums.len());
        self.albums.push(Album {
            name: name.to_string(),
            fields: AlbumFields::default(),
            rating: None,
            artist,
            tracks: Vec::new(),
        });
        self.artists[artist.0].albums.push(id);
        id
    }
}

/// Case-insensitive key for name matching.
fn fold(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_ignoring_case() {
        let mut c = Catalog::default();
        let low = c.add_artist("Low");
        assert_eq!(c.add_artist("LOW"), low);
        assert_eq!(c.find_artist("low"), Some(low));

        let album = c.add_album(low, "Secret Name");
        assert_eq!(c.find_album(low, "secret name"), Some(album));
        assert_eq!(c.artist_count(), 1);
        assert_eq!(c.album_count(), 1);
    }

    #[test]
    fn same_album_name_under_two_artists() {
        let mut c = Catalog::default();
        let a = c.add_artist("A");
        let b = c.add_artist("B");
        let a_hits = c.add_album(a, "Greatest Hits");
        let b_hits = c.add_album(b, "Greatest Hits");

        assert_ne!(a_hits, b_hits);
        assert_eq!(c.album(b_hits).artist(), b);
        // First artist wins when searching everywhere.
        assert_eq!(c.find_album_anywhere("greatest hits"), Some(a_hits));
    }

    #[test]
    fn tracks_register_once() {
        let mut c = Catalog::default();
        let a = c.add_artist("A");
        let album = c.add_album(a, "X");
        c.album_mut(album).add_track("1".into(), PathBuf::from("/m/1.mp3"));
        c.album_mut(album).add_track("1".into(), PathBuf::from("/m/1.mp3"));
        assert_eq!(c.album(album).tracks().len(), 1);
        assert_eq!(c.track_count(), 1);
    }

    #[test]
    fn rollup_display() {
        assert_eq!(Rollup::Unrated.to_string(), "Unrated");
        assert_eq!(Rollup::Stars(4).to_string(), "4");
    }
}
