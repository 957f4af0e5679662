//! core/resolve/impute.rs
//! Fill an Album's unknown fields from one of its tracks.
//!
//! First non-empty value wins: a field that already holds a value is never
//! touched again, whatever later tracks say.

use std::path::Path;

use crate::core::tags::TagAccess;
use crate::core::types::{TrackRecord, field};

use super::catalog::{AlbumFields, Artwork};

/// Adopt `record`'s values for every field `fields` doesn't know yet.
/// Returns how many fields were filled.
pub fn impute(
    fields: &mut AlbumFields,
    record: &TrackRecord,
    path: &Path,
    tags: &dyn TagAccess,
) -> usize {
    let mut filled = 0;

    filled += fill(&mut fields.genre, || text(record, field::GENRE));
    filled += fill(&mut fields.composer, || text(record, field::COMPOSER));
    filled += fill(&mut fields.grouping, || text(record, field::GROUPING));
    filled += fill(&mut fields.comments, || text(record, field::COMMENTS));
    filled += fill(&mut fields.disc_count, || count(record, field::DISC_COUNT));
    filled += fill(&mut fields.track_count, || count(record, field::TRACK_COUNT));
    filled += fill(&mut fields.year, || {
        record
            .int(field::YEAR)
            .filter(|y| *y > 0)
            .and_then(|y| i32::try_from(y).ok())
    });
    filled += fill(&mut fields.rating, || {
        record
            .int(field::RATING)
            .filter(|r| (0..=100).contains(r))
            .map(|r| r as u8)
    });

    // Reads the tag, so only when still unknown.
    filled += fill(&mut fields.artwork, || {
        tags.has_artwork(path).then(|| Artwork {
            source: path.to_path_buf(),
        })
    });

    filled
}

fn fill<T>(slot: &mut Option<T>, value: impl FnOnce() -> Option<T>) -> usize {
    if slot.is_some() {
        return 0;
    }
    *slot = value();
    usize::from(slot.is_some())
}

fn text(record: &TrackRecord, key: &str) -> Option<String> {
    record.non_empty_text(key).map(str::to_owned)
}

fn count(record: &TrackRecord, key: &str) -> Option<u32> {
    record.int(key).and_then(|n| u32::try_from(n).ok())
}
