//! core/resolve/mod.rs
//!
//! Identity resolution: flat track records -> Artist -> Album -> Track.
//!
//! Per track, strictly in store order:
//! 1. Read Artist/Album; blank ones get a synthetic name, written back onto
//!    the record right away.
//! 2. Unknown artist + known album: borrow the artist of the first album
//!    already seen with that name (case-insensitive).
//! 3. Find or create the Artist, then the Album under it.
//! 4. Register the track on the Album.
//! 5. Impute the Album's unknown fields from this track.
//!
//! Nothing is re-linked after the fact: a track processed before its
//! album's artist was discovered keeps its synthetic artist.

mod catalog;
mod impute;

use std::path::PathBuf;
use std::sync::LazyLock;

use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;
use tracing::{debug, info};

use super::library::{TrackStore, record_path};
use super::progress::Progress;
use super::tags::TagAccess;
use super::types::{TrackRecord, field};

pub use catalog::{
    Album, AlbumFields, AlbumId, AlbumTrack, Artist, ArtistId, Artwork, Catalog, Rollup,
};
pub use impute::impute;

/// Prefix of every synthetic name.
pub const SYNTHETIC_PREFIX: &str = "aa";

static SYNTHETIC_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^aa[a-zA-Z0-9]{5}$").expect("valid synthetic-name regex"));

/// Does `name` look like a placeholder we generated?
pub fn is_synthetic(name: &str) -> bool {
    SYNTHETIC_NAME.is_match(name)
}

/// `aa` + 5 random alphanumerics, e.g. `aaX3k9Q`.
pub fn synthesize_name() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(char::from)
        .collect();
    format!("{SYNTHETIC_PREFIX}{suffix}")
}

/// Build the hierarchy from every record in `store`.
///
/// Mutates the store only to write synthetic/inferred names back. The
/// catalog is built locally, so abandoning this call never leaves a
/// half-built catalog behind.
pub fn resolve(store: &mut TrackStore, tags: &dyn TagAccess, progress: &Progress) -> Catalog {
    let ids: Vec<String> = store.ids().cloned().collect();
    let mut catalog = Catalog::default();
    let mut inferred = 0usize;

    progress.start("Scanning artists", ids.len());

    for (n, id) in ids.iter().enumerate() {
        let Some(record) = store.get_mut(id) else {
            continue;
        };

        let path: PathBuf = record_path(record).unwrap_or_default();
        let mut artist_name = name_or_synthesize(record, field::ARTIST);
        let album_name = name_or_synthesize(record, field::ALBUM);

        if is_synthetic(&artist_name) && !is_synthetic(&album_name) {
            if let Some(album) = catalog.find_album_anywhere(&album_name) {
                let owner = catalog.album(album).artist();
                artist_name = catalog.artist(owner).name.clone();
                record.set_text(field::ARTIST, artist_name.clone());
                inferred += 1;
                debug!(track = %id, artist = %artist_name, album = %album_name, "artist inferred from album");
            }
        }

        // Both lookups are find-or-create.
        let artist = catalog.add_artist(&artist_name);
        // A new album starts with every field unknown; imputing from its
        // first track captures that track's values.
        let album = catalog.add_album(artist, &album_name);

        let entry = catalog.album_mut(album);
        entry.add_track(id.clone(), path.clone());
        impute(&mut entry.fields, record, &path, tags);

        progress.advance(n + 1);
    }

    progress.finish();
    info!(
        artists = catalog.artist_count(),
        albums = catalog.album_count(),
        tracks = catalog.track_count(),
        inferred,
        "artists resolved"
    );
    catalog
}

/// Non-blank name from the record, or a fresh synthetic one written back.
fn name_or_synthesize(record: &mut TrackRecord, key: &str) -> String {
    if let Some(name) = record.non_empty_text(key) {
        return name.to_string();
    }
    let name = synthesize_name();
    record.set_text(key, name.clone());
    debug!(field = key, name = %name, "synthetic name assigned");
    name
}
