//! core/missing.rs
//! Missing-file locator.
//!
//! Every track whose `Location` doesn't exist on disk becomes a
//! [`MissingEntry`]. With discovery on, we look for a similarly named file
//! where the library would have put it:
//! - `<music folder>/<artist>/<album>/`, else
//! - `<music folder>/<artist>/`
//!
//! The first file (in name order) scoring above [`DISCOVERY_THRESHOLD`] is
//! taken, not the best one.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use super::distance;
use super::library::TrackStore;
use super::progress::Progress;
use super::types::field;

/// Similarity a candidate must exceed to be accepted.
pub const DISCOVERY_THRESHOLD: f32 = 0.85;

/// Characters replaced by `_` in artist/album directory names.
const ILLEGAL_PATH_CHARS: &[char] = &[
    '\\', ':', '/', '*', '?', '"', '<', '>', '|', ';', '+', '`', '~', '{', '}', '[', ']', '=',
    '!', '@', '#', '$', '%', '^', '&',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingStatus {
    Missing,
    /// Not at its recorded path, but a likely match exists nearby.
    MappedIncorrectly,
}

impl fmt::Display for MissingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingStatus::Missing => f.write_str("Missing"),
            MissingStatus::MappedIncorrectly => f.write_str("Mapped Incorrectly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEntry {
    pub file_name: String,
    pub artist: String,
    pub album: String,
    /// Where the library says the file is.
    pub path: PathBuf,
    pub status: MissingStatus,
    /// Set only for `MappedIncorrectly`.
    pub discovered_path: Option<PathBuf>,
}

/// Make a name safe to use as a single path component.
pub fn sanitize_path_component(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_PATH_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// First candidate scoring above the threshold, in the given order.
pub fn first_match_above<'a, I>(candidates: I, file_name: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates.into_iter().find(|name| {
        let score = distance::compare(Some(name), Some(file_name));
        trace!(candidate = %name, score, "similarity");
        score > DISCOVERY_THRESHOLD
    })
}

/// Directory the file would most likely be in, if any exists.
fn search_dir(music_folder: Option<&Path>, artist: &str, album: &str) -> Option<PathBuf> {
    if artist.trim().is_empty() {
        return None;
    }
    let artist_dir = music_folder?.join(sanitize_path_component(artist));
    let album_dir = artist_dir.join(sanitize_path_component(album));
    if !album.trim().is_empty() && album_dir.is_dir() {
        Some(album_dir)
    } else if artist_dir.is_dir() {
        Some(artist_dir)
    } else {
        None
    }
}

/// Entry names of `dir`, sorted so scans are reproducible.
fn sorted_listing(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

fn discover(entry: &mut MissingEntry, music_folder: Option<&Path>) {
    let Some(dir) = search_dir(music_folder, &entry.artist, &entry.album) else {
        debug!(path = %entry.path.display(), "no artist directory, file missing");
        return;
    };

    let names = match sorted_listing(&dir) {
        Ok(names) => names,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list directory");
            return;
        }
    };

    if let Some(name) = first_match_above(names.iter().map(String::as_str), &entry.file_name) {
        let found = dir.join(name);
        debug!(missing = %entry.path.display(), found = %found.display(), "possible match");
        entry.status = MissingStatus::MappedIncorrectly;
        entry.discovered_path = Some(found);
    }
}

/// List every track whose file is gone, in store order.
pub fn locate_missing(
    store: &TrackStore,
    attempt_discovery: bool,
    progress: &Progress,
) -> Vec<MissingEntry> {
    let mut missing = Vec::new();
    progress.start("Finding missing tracks", store.len());

    for (n, (id, record)) in store.iter().enumerate() {
        progress.advance(n + 1);

        let path = store.track_path(id).unwrap_or_default();
        if !path.as_os_str().is_empty() && path.exists() {
            continue;
        }

        let mut entry = MissingEntry {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            artist: record.text_or(field::ARTIST, "").to_string(),
            album: record.text_or(field::ALBUM, "").to_string(),
            path,
            status: MissingStatus::Missing,
            discovered_path: None,
        };

        if attempt_discovery {
            discover(&mut entry, store.music_folder());
        }
        missing.push(entry);
    }

    progress.finish();
    let remapped = missing
        .iter()
        .filter(|e| e.status == MissingStatus::MappedIncorrectly)
        .count();
    info!(missing = missing.len(), remapped, "missing-file scan done");
    missing
}
