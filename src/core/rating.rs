//! core/rating.rs
//! Artist and album rating rollups.
//!
//! Track ratings in the export are raw 0..=100 (20 per star). Stars are
//! taken with integer division, so a raw 30 counts as 1 star.
//!
//! Two artist policies (see [`RatingMode`]):
//! - Average: mean star value over tracks with at least one star.
//! - Bracket: share of 4+ star tracks, mapped through [`Brackets`]. A raw
//!   rating of exactly 20 is left out of this policy's counts entirely.
//!
//! Albums always use the average policy, gated by how many tracks are
//! rated. Computing and writing are separate: `rate_*` fill the catalog,
//! `write_*` push the result into every member track's tag.

use tracing::{debug, info, warn};

use super::config::{Brackets, RatingConfig, RatingMode};
use super::library::TrackStore;
use super::progress::Progress;
use super::resolve::{Album, Catalog, Rollup};
use super::tags::{TagAccess, TagField};
use super::types::{WriteSummary, field};

const RAW_PER_STAR: i64 = 20;
const ONE_STAR_RAW: i64 = 20;
const FOUR_STAR_RAW: i64 = 80;

/// Whole stars for a raw rating; out-of-range values are clamped first.
pub fn star_value(raw: i64) -> i64 {
    raw.clamp(0, 100) / RAW_PER_STAR
}

/// `(x + 0.5)` truncated, as a star count.
fn round_stars(sum: i64, count: i64) -> i64 {
    (sum as f64 / count as f64 + 0.5) as i64
}

/// Average policy over raw ratings.
pub fn average_rollup(raw_ratings: impl IntoIterator<Item = i64>) -> Rollup {
    let mut sum = 0i64;
    let mut rated = 0i64;
    for raw in raw_ratings {
        let stars = star_value(raw);
        if stars != 0 {
            rated += 1;
        }
        sum += stars;
    }

    if rated == 0 {
        return Rollup::Unrated;
    }
    Rollup::Stars(round_stars(sum, rated).clamp(1, 5) as u8)
}

/// Counts feeding the bracket policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BracketCounts {
    /// Rated 4 stars or better.
    pub high: u32,
    /// Rated, excluding raw 20.
    pub rated: u32,
    pub unrated: u32,
}

impl BracketCounts {
    pub fn tally(raw_ratings: impl IntoIterator<Item = i64>) -> Self {
        let mut counts = Self::default();
        for raw in raw_ratings {
            if raw <= 0 {
                counts.unrated += 1;
            } else if raw == ONE_STAR_RAW {
                // One star is "not really rated" for this policy.
                continue;
            } else {
                counts.rated += 1;
                if raw >= FOUR_STAR_RAW {
                    counts.high += 1;
                }
            }
        }
        counts
    }

    pub fn total(&self) -> u32 {
        self.rated + self.unrated
    }

    /// Share of rated tracks that are 4+ stars.
    pub fn percent_high(&self) -> f64 {
        if self.high == 0 {
            return 0.0;
        }
        f64::from(self.high) / f64::from(self.rated)
    }

    pub fn qualifies(&self, config: &RatingConfig) -> bool {
        let total = self.total();
        if total == 0 {
            return false;
        }
        f64::from(self.rated) / f64::from(total) >= config.rated_songs_min
            && total >= config.total_songs_min
    }
}

/// Map a 4+ star share onto 1..=5 stars.
pub fn bracket_stars(percent_high: f64, brackets: &Brackets) -> u8 {
    if percent_high == 0.0 || percent_high < brackets.one_star_max {
        1
    } else if percent_high >= brackets.five_star_min {
        5
    } else if percent_high >= brackets.four_star_min {
        4
    } else if percent_high >= brackets.three_star_min {
        3
    } else if percent_high >= brackets.two_star_min {
        2
    } else {
        1
    }
}

/// Bracket policy over raw ratings.
pub fn bracket_rollup(raw_ratings: impl IntoIterator<Item = i64>, config: &RatingConfig) -> Rollup {
    let counts = BracketCounts::tally(raw_ratings);
    if !counts.qualifies(config) {
        return Rollup::Unrated;
    }
    debug!(high = counts.high, rated = counts.rated, "bracket counts");
    Rollup::Stars(bracket_stars(counts.percent_high(), &config.brackets))
}

/// Album policy: average over rated tracks, where "rated" is measured
/// against the album's declared track count.
pub fn album_rollup(
    raw_ratings: impl IntoIterator<Item = i64>,
    track_count: i64,
    min_percent_rated: u32,
) -> Rollup {
    let mut sum = 0i64;
    let mut unrated = 0i64;
    for raw in raw_ratings {
        if raw > 0 {
            sum += star_value(raw);
        } else {
            unrated += 1;
        }
    }

    let rated = track_count - unrated;
    let min_rated = track_count as f64 * f64::from(min_percent_rated) / 100.0;
    if rated <= 0 || (rated as f64) <= min_rated {
        return Rollup::Unrated;
    }

    match round_stars(sum, rated) {
        0 => Rollup::Unrated,
        n => Rollup::Stars(n.min(5) as u8),
    }
}

fn raw_ratings<'a>(store: &'a TrackStore, album: &'a Album) -> impl Iterator<Item = i64> + 'a {
    album
        .tracks()
        .iter()
        .map(move |t| store.int_field(&t.id, field::RATING, 0))
}

/// Compute every artist's rating under `config.mode`.
pub fn rate_artists(catalog: &mut Catalog, store: &TrackStore, config: &RatingConfig, progress: &Progress) {
    progress.start("Rating artists", catalog.artist_count());

    for (n, artist) in catalog.artist_ids().enumerate() {
        let ratings: Vec<i64> = catalog
            .albums_of(artist)
            .flat_map(|(_, album)| raw_ratings(store, album))
            .collect();

        let rollup = match config.mode {
            RatingMode::Average => average_rollup(ratings),
            RatingMode::Bracket => bracket_rollup(ratings, config),
        };

        let entry = catalog.artist_mut(artist);
        entry.rating = Some(rollup);
        debug!(artist = %entry.name, rating = %rollup, "artist rated");
        progress.advance(n + 1);
    }

    progress.finish();
    info!(artists = catalog.artist_count(), mode = ?config.mode, "artist ratings computed");
}

/// Compute every album's rating.
pub fn rate_albums(catalog: &mut Catalog, store: &TrackStore, config: &RatingConfig, progress: &Progress) {
    let albums = catalog.album_ids();
    progress.start("Rating albums", albums.len());

    for (n, id) in albums.into_iter().enumerate() {
        let album = catalog.album(id);
        let track_count = album
            .fields
            .track_count
            .map(i64::from)
            .unwrap_or(album.tracks().len() as i64);
        let rollup = album_rollup(
            raw_ratings(store, album),
            track_count,
            config.album_min_percent_rated,
        );

        let album = catalog.album_mut(id);
        album.rating = Some(rollup);
        debug!(album = %album.name, rating = %rollup, "album rated");
        progress.advance(n + 1);
    }

    progress.finish();
}

/// Text written into the tag field, e.g. `Artist Rating: 4`.
pub fn rating_text(label: &str, rollup: Rollup) -> String {
    format!("{label} Rating: {rollup}")
}

/// Write `Artist Rating: N` onto every track of every rated artist.
pub fn write_artist_ratings(
    catalog: &Catalog,
    tags: &dyn TagAccess,
    target: &TagField,
    progress: &Progress,
) -> WriteSummary {
    let mut summary = WriteSummary::default();
    progress.start("Writing artist ratings", catalog.artist_count());

    for (n, (artist_id, artist)) in catalog.artists().enumerate() {
        let tracks = catalog.albums_of(artist_id).flat_map(|(_, a)| a.tracks());
        match artist.rating {
            Some(rollup) => {
                let text = rating_text("Artist", rollup);
                for track in tracks {
                    write_one(tags, &track.path, target, &text, &mut summary);
                }
            }
            None => summary.skipped += tracks.count(),
        }
        progress.advance(n + 1);
    }

    progress.finish();
    info!(?summary, field = %target, "artist ratings written");
    summary
}

/// Write `Album Rating: N` onto every track of every rated album.
pub fn write_album_ratings(
    catalog: &Catalog,
    tags: &dyn TagAccess,
    target: &TagField,
    progress: &Progress,
) -> WriteSummary {
    let mut summary = WriteSummary::default();
    let albums = catalog.album_ids();
    progress.start("Writing album ratings", albums.len());

    for (n, id) in albums.into_iter().enumerate() {
        let album = catalog.album(id);
        match album.rating {
            Some(rollup) => {
                let text = rating_text("Album", rollup);
                for track in album.tracks() {
                    write_one(tags, &track.path, target, &text, &mut summary);
                }
            }
            None => summary.skipped += album.tracks().len(),
        }
        progress.advance(n + 1);
    }

    progress.finish();
    info!(?summary, field = %target, "album ratings written");
    summary
}

fn write_one(
    tags: &dyn TagAccess,
    path: &std::path::Path,
    target: &TagField,
    text: &str,
    summary: &mut WriteSummary,
) {
    match tags.write_field(path, target, text) {
        Ok(()) => summary.written += 1,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to write rating");
            summary.failed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bracket_config(rated_min: f64, total_min: u32) -> RatingConfig {
        RatingConfig {
            mode: RatingMode::Bracket,
            rated_songs_min: rated_min,
            total_songs_min: total_min,
            ..RatingConfig::default()
        }
    }

    #[test]
    fn average_truncates_then_rounds() {
        // 5 + 4 + 3, the zero is excluded: 12 / 3 = 4
        assert_eq!(average_rollup([100, 80, 0, 60]), Rollup::Stars(4));
        // 30 -> 1 star, 100 -> 5 stars: 3.0
        assert_eq!(average_rollup([30, 100]), Rollup::Stars(3));
        // 4 + 5 = 4.5 -> rounds up
        assert_eq!(average_rollup([80, 100]), Rollup::Stars(5));
        // 3 + 4 + 4 = 3.67 -> 4
        assert_eq!(average_rollup([60, 80, 80]), Rollup::Stars(4));
    }

    #[test]
    fn average_without_stars_is_unrated() {
        assert_eq!(average_rollup([0, 0, 10]), Rollup::Unrated);
        assert_eq!(average_rollup(std::iter::empty()), Rollup::Unrated);
    }

    #[test]
    fn one_star_counts_differ_between_policies() {
        let ratings = [20, 80, 0];

        // Average: 1 + 4 over two rated tracks = 2.5 -> 3
        assert_eq!(average_rollup(ratings), Rollup::Stars(3));

        // Bracket: the 20 vanishes; one rated (and high), one unrated.
        let counts = BracketCounts::tally(ratings);
        assert_eq!(
            counts,
            BracketCounts {
                high: 1,
                rated: 1,
                unrated: 1
            }
        );
        assert_eq!(counts.percent_high(), 1.0);
        assert_eq!(bracket_rollup(ratings, &bracket_config(0.5, 1)), Rollup::Stars(5));
    }

    #[test]
    fn bracket_needs_enough_rated_and_total_tracks() {
        // 1 rated of 3 counted: 0.33 < 0.5
        assert_eq!(
            bracket_rollup([100, 0, 0], &bracket_config(0.5, 1)),
            Rollup::Unrated
        );
        // Enough share, but too few tracks.
        assert_eq!(
            bracket_rollup([100, 100], &bracket_config(0.5, 5)),
            Rollup::Unrated
        );
        // Only one-star tracks: nothing counted at all.
        assert_eq!(bracket_rollup([20, 20], &bracket_config(0.0, 0)), Rollup::Unrated);
    }

    #[test]
    fn bracket_mapping() {
        let b = Brackets::default();
        assert_eq!(bracket_stars(0.0, &b), 1);
        assert_eq!(bracket_stars(0.05, &b), 1);
        assert_eq!(bracket_stars(0.10, &b), 2);
        assert_eq!(bracket_stars(0.30, &b), 3);
        assert_eq!(bracket_stars(0.45, &b), 4);
        assert_eq!(bracket_stars(0.70, &b), 5);
        assert_eq!(bracket_stars(1.0, &b), 5);
    }

    #[test]
    fn zero_share_is_one_star_even_with_zero_brackets() {
        let b = Brackets {
            one_star_max: 0.0,
            two_star_min: 0.0,
            three_star_min: 0.1,
            four_star_min: 0.2,
            five_star_min: 0.3,
        };
        assert_eq!(bracket_stars(0.0, &b), 1);

        let config = RatingConfig {
            brackets: b,
            ..bracket_config(0.5, 1)
        };
        // Rated, but nothing at 4+ stars.
        assert_eq!(bracket_rollup([60, 60, 60], &config), Rollup::Stars(1));
        // 1 of 4 high: 0.25 lands in the 4-star band
        assert_eq!(bracket_rollup([60, 60, 60, 100], &config), Rollup::Stars(4));
    }

    #[test]
    fn album_gate_uses_declared_track_count() {
        // 2 of 4 rated, need more than 50%
        assert_eq!(album_rollup([100, 80, 0, 0], 4, 50), Rollup::Unrated);
        // 3 of 4 rated: (5 + 4 + 3) / 3 = 4
        assert_eq!(album_rollup([100, 80, 60, 0], 4, 50), Rollup::Stars(4));
        // Declared 10 tracks, only 3 listed and rated: 10 - 0 = 10 rated,
        // 12 / 10 = 1.2 -> 1
        assert_eq!(album_rollup([100, 80, 60], 10, 50), Rollup::Stars(1));
        // No tracks at all
        assert_eq!(album_rollup(std::iter::empty(), 0, 0), Rollup::Unrated);
    }

    fn library(rows: &[(&str, &str, i64)]) -> (TrackStore, Catalog) {
        let mut store = TrackStore::default();
        let mut catalog = Catalog::default();
        for (n, (artist, album, raw)) in rows.iter().enumerate() {
            let id = (n + 1).to_string();
            let mut rec = crate::core::types::TrackRecord::new();
            rec.set(field::RATING, crate::core::types::FieldValue::Integer(*raw));
            store.insert(id.clone(), rec);

            let a = catalog.add_artist(artist);
            let al = catalog.add_album(a, album);
            catalog
                .album_mut(al)
                .add_track(id.clone(), std::path::PathBuf::from(format!("/m/{id}.mp3")));
        }
        (store, catalog)
    }

    #[test]
    fn artist_rollup_spans_all_albums() {
        let (store, mut catalog) = library(&[
            ("Low", "Secret Name", 100),
            ("Low", "Secret Name", 80),
            ("Low", "Things We Lost", 0),
            ("Low", "Things We Lost", 60),
            ("Other", "X", 0),
        ]);
        rate_artists(&mut catalog, &store, &RatingConfig::default(), &Progress::none());

        let ratings: Vec<_> = catalog.artists().map(|(_, a)| a.rating).collect();
        assert_eq!(ratings, vec![Some(Rollup::Stars(4)), Some(Rollup::Unrated)]);
    }

    #[test]
    fn album_rollup_prefers_declared_track_count() {
        let (store, mut catalog) = library(&[
            ("Low", "Secret Name", 100),
            ("Low", "Secret Name", 100),
            ("Low", "Short", 100),
        ]);
        let short = catalog.album_ids()[1];
        catalog.album_mut(short).fields.track_count = Some(4);

        rate_albums(&mut catalog, &store, &RatingConfig::default(), &Progress::none());
        let ids = catalog.album_ids();
        assert_eq!(catalog.album(ids[0]).rating, Some(Rollup::Stars(5)));
        // 1 listed track, 4 declared: 4 counted as rated, 5 / 4 -> 1
        assert_eq!(catalog.album(ids[1]).rating, Some(Rollup::Stars(1)));
    }

    #[test]
    fn writes_go_to_every_member_track() {
        use crate::core::tags::testing::MemoryTags;

        let (store, mut catalog) = library(&[
            ("Low", "Secret Name", 100),
            ("Low", "Things We Lost", 80),
            ("Other", "X", 60),
        ]);
        let tags = MemoryTags::new().failing_on("/m/3.mp3");

        // Nothing computed yet: everything skipped.
        let summary = write_artist_ratings(&catalog, &tags, &TagField::Grouping, &Progress::none());
        assert_eq!(summary.skipped, 3);
        assert!(tags.writes().is_empty());

        rate_artists(&mut catalog, &store, &RatingConfig::default(), &Progress::none());
        let summary = write_artist_ratings(&catalog, &tags, &TagField::Grouping, &Progress::none());
        assert_eq!(
            summary,
            WriteSummary {
                written: 2,
                skipped: 0,
                failed: 1
            }
        );
        assert_eq!(
            tags.value(std::path::Path::new("/m/2.mp3"), &TagField::Grouping)
                .as_deref(),
            Some("Artist Rating: 5")
        );
    }

    #[test]
    fn album_ratings_written_as_text() {
        use crate::core::tags::testing::MemoryTags;

        let (store, mut catalog) = library(&[("Low", "Secret Name", 0)]);
        rate_albums(&mut catalog, &store, &RatingConfig::default(), &Progress::none());

        let tags = MemoryTags::new();
        let target = TagField::Custom("ALBUM RATING".into());
        let summary = write_album_ratings(&catalog, &tags, &target, &Progress::none());
        assert_eq!(summary.written, 1);
        assert_eq!(
            tags.writes()[0].2,
            "Album Rating: Unrated"
        );
    }

    #[test]
    fn rating_text_format() {
        assert_eq!(rating_text("Artist", Rollup::Stars(4)), "Artist Rating: 4");
        assert_eq!(rating_text("Album", Rollup::Unrated), "Album Rating: Unrated");
    }
}
