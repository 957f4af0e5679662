//! core/backfill.rs
//! Push album-level knowledge back down onto member tracks.
//!
//! - [`fill_missing`]: copy an Album's imputed fields into tracks whose tag
//!   field is still empty.
//! - [`write_track_counts`]: tag every track with how many tracks its Album
//!   actually has.
//!
//! Tags that already hold a value are left alone (unless told otherwise).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info, warn};

use super::progress::Progress;
use super::resolve::{Album, Catalog, is_synthetic};
use super::tags::{TagAccess, TagField};
use super::types::WriteSummary;

/// Album fields that can be backfilled onto tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackfillField {
    AlbumArtist,
    Genre,
    Composer,
    Grouping,
    Comment,
    Year,
    DiscTotal,
    Artwork,
}

impl BackfillField {
    pub const ALL: [BackfillField; 8] = [
        BackfillField::AlbumArtist,
        BackfillField::Genre,
        BackfillField::Composer,
        BackfillField::Grouping,
        BackfillField::Comment,
        BackfillField::Year,
        BackfillField::DiscTotal,
        BackfillField::Artwork,
    ];

    /// Tag field written; `None` for artwork, which is copied instead.
    pub fn tag_field(self) -> Option<TagField> {
        match self {
            BackfillField::AlbumArtist => Some(TagField::AlbumArtist),
            BackfillField::Genre => Some(TagField::Genre),
            BackfillField::Composer => Some(TagField::Composer),
            BackfillField::Grouping => Some(TagField::Grouping),
            BackfillField::Comment => Some(TagField::Comment),
            BackfillField::Year => Some(TagField::Year),
            BackfillField::DiscTotal => Some(TagField::DiscTotal),
            BackfillField::Artwork => None,
        }
    }

    /// The Album's value for this field, if it has a meaningful one.
    fn album_value(self, catalog: &Catalog, album: &Album) -> Option<String> {
        let f = &album.fields;
        let value = match self {
            BackfillField::AlbumArtist => Some(catalog.artist(album.artist()).name.clone()),
            BackfillField::Genre => f.genre.clone(),
            BackfillField::Composer => f.composer.clone(),
            BackfillField::Grouping => f.grouping.clone(),
            BackfillField::Comment => f.comments.clone(),
            BackfillField::Year => f.year.map(|y| y.to_string()),
            BackfillField::DiscTotal => f.disc_count.map(|n| n.to_string()),
            BackfillField::Artwork => None,
        };
        value.filter(|v| !v.trim().is_empty() && !is_synthetic(v))
    }
}

impl fmt::Display for BackfillField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag_field() {
            Some(field) => fmt::Display::fmt(&field, f),
            None => f.write_str("artwork"),
        }
    }
}

impl FromStr for BackfillField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        let wanted = match wanted.as_str() {
            "comments" => "comment",
            "art" => "artwork",
            other => other,
        }
        .to_string();

        BackfillField::ALL
            .into_iter()
            .find(|f| f.to_string() == wanted)
            .ok_or_else(|| format!("unknown field `{s}`"))
    }
}

/// Fill empty tag fields on every track from its Album's values.
pub fn fill_missing(
    catalog: &Catalog,
    tags: &dyn TagAccess,
    fields: &[BackfillField],
    progress: &Progress,
) -> WriteSummary {
    let mut summary = WriteSummary::default();
    let albums = catalog.album_ids();
    progress.start("Filling missing fields", albums.len());

    for (n, id) in albums.into_iter().enumerate() {
        let album = catalog.album(id);
        for &field in fields {
            summary.merge(fill_album_field(catalog, album, field, tags));
        }
        progress.advance(n + 1);
    }

    progress.finish();
    info!(?summary, "missing fields filled");
    summary
}

fn fill_album_field(
    catalog: &Catalog,
    album: &Album,
    field: BackfillField,
    tags: &dyn TagAccess,
) -> WriteSummary {
    let mut summary = WriteSummary::default();

    let Some(target) = field.tag_field() else {
        return fill_artwork(album, tags);
    };
    let Some(value) = field.album_value(catalog, album) else {
        summary.skipped += album.tracks().len();
        return summary;
    };

    for path in album.track_paths() {
        match tags.read_field(path, &target) {
            Ok(Some(_)) => summary.skipped += 1,
            Ok(None) => match tags.write_field(path, &target, &value) {
                Ok(()) => {
                    debug!(path = %path.display(), field = %target, value = %value, "filled missing field");
                    summary.written += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), field = %target, error = %e, "failed to fill field");
                    summary.failed += 1;
                }
            },
            Err(e) => {
                warn!(path = %path.display(), field = %target, error = %e, "failed to read field");
                summary.failed += 1;
            }
        }
    }
    summary
}

fn fill_artwork(album: &Album, tags: &dyn TagAccess) -> WriteSummary {
    let mut summary = WriteSummary::default();
    let Some(artwork) = &album.fields.artwork else {
        summary.skipped += album.tracks().len();
        return summary;
    };

    for path in album.track_paths() {
        if path == artwork.source || tags.has_artwork(path) {
            summary.skipped += 1;
            continue;
        }
        match tags.copy_artwork(&artwork.source, path) {
            Ok(true) => {
                debug!(path = %path.display(), from = %artwork.source.display(), "artwork copied");
                summary.written += 1;
            }
            Ok(false) => summary.skipped += 1,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to copy artwork");
                summary.failed += 1;
            }
        }
    }
    summary
}

/// Write each Album's assigned track count into its tracks' track-total.
///
/// Without `overwrite`, only tracks with no total yet are touched. Tracks
/// already carrying the right count are never rewritten.
pub fn write_track_counts(
    catalog: &Catalog,
    tags: &dyn TagAccess,
    overwrite: bool,
    progress: &Progress,
) -> WriteSummary {
    let mut summary = WriteSummary::default();
    let albums = catalog.album_ids();
    progress.start("Writing track counts", albums.len());

    for (n, id) in albums.into_iter().enumerate() {
        let album = catalog.album(id);
        let count = album.tracks().len().to_string();
        for path in album.track_paths() {
            write_count(tags, path, &count, overwrite, &mut summary);
        }
        progress.advance(n + 1);
    }

    progress.finish();
    info!(?summary, "track counts written");
    summary
}

fn write_count(
    tags: &dyn TagAccess,
    path: &Path,
    count: &str,
    overwrite: bool,
    summary: &mut WriteSummary,
) {
    let current = match tags.read_field(path, &TagField::TrackTotal) {
        Ok(current) => current,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read track total");
            summary.failed += 1;
            return;
        }
    };

    match current.as_deref() {
        Some(c) if c == count => {
            summary.skipped += 1;
            return;
        }
        Some(_) if !overwrite => {
            summary.skipped += 1;
            return;
        }
        _ => {}
    }

    match tags.write_field(path, &TagField::TrackTotal, count) {
        Ok(()) => summary.written += 1,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to write track total");
            summary.failed += 1;
        }
    }
}
