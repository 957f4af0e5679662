//! Tunekeeper CLI
//!
//! # What this program is
//! A small command-line tool that reads a media-library export (XML plist),
//! groups its tracks into Artists and Albums, and writes derived data back
//! into the audio files' tags.
//!
//! # Commands
//! - `artists`: print the resolved Artist -> Album tree
//! - `rate-artists` / `rate-albums`: roll track ratings up and tag every
//!   member track with the result
//! - `missing`: list tracks whose files are gone (optionally look for them)
//! - `unlisted`: list files in the music folder that no track points to
//! - `fill-missing`: copy album-level fields onto tracks that lack them
//! - `track-counts`: write the real per-album track count
//!
//! # Concurrency model
//! - The whole pipeline runs on one worker thread.
//! - The main thread only drains progress events and logs them.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::thread;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tunekeeper::core::backfill::{self, BackfillField};
use tunekeeper::core::config::{RatingMode, Settings};
use tunekeeper::core::library::Library;
use tunekeeper::core::missing;
use tunekeeper::core::progress::{Progress, ProgressEvent};
use tunekeeper::core::rating;
use tunekeeper::core::report;
use tunekeeper::core::resolve::Catalog;
use tunekeeper::core::tags::{Id3Tags, TagField};
use tunekeeper::core::types::WriteSummary;
use tunekeeper::core::unlisted;

const DEFAULT_CONFIG: &str = "tunekeeper.toml";

#[derive(Parser, Debug)]
#[command(name = "tunekeeper", version)]
struct Args {
    /// Library export (XML property list)
    library: PathBuf,

    /// Settings file (TOML); missing file means defaults
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Log tag writes instead of performing them
    #[arg(long)]
    dry_run: bool,

    /// Override the export's music folder
    #[arg(long)]
    music_folder: Option<PathBuf>,

    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved Artist -> Album tree
    Artists,

    /// Compute artist ratings and write them to every track
    RateArtists {
        /// Tag field receiving "Artist Rating: N"
        #[arg(long, default_value = "grouping")]
        field: TagField,

        /// Override the configured rating mode
        #[arg(long)]
        mode: Option<Mode>,
    },

    /// Compute album ratings and write them to every track
    RateAlbums {
        /// Tag field receiving "Album Rating: N"
        #[arg(long, default_value = "txxx:Album Rating")]
        field: TagField,
    },

    /// List tracks whose files no longer exist
    Missing {
        /// Look for renamed files next to where the track should be
        #[arg(long)]
        discover: bool,

        /// Also write the list as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// List files in the music folder that no track points to
    Unlisted {
        /// Skip image files (linked artwork may depend on them)
        #[arg(long)]
        ignore_images: bool,
    },

    /// Fill empty tag fields from the album's known values
    FillMissing {
        /// Comma-separated; defaults to every supported field
        #[arg(long, value_delimiter = ',')]
        fields: Vec<BackfillField>,
    },

    /// Write each album's track count into its tracks
    TrackCounts {
        /// Replace existing track totals too
        #[arg(long)]
        overwrite: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Average,
    Bracket,
}

impl From<Mode> for RatingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Average => RatingMode::Average,
            Mode::Bracket => RatingMode::Bracket,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut settings = Settings::load(&args.config)
        .with_context(|| format!("load settings {}", args.config.display()))?;
    if args.dry_run {
        settings.dry_run = true;
    }
    if let Some(folder) = &args.music_folder {
        settings.music_folder = Some(folder.clone());
    }

    let (progress, rx) = Progress::channel();
    let worker = thread::spawn(move || run(args, settings, progress));

    drain_progress(rx);

    worker
        .join()
        .map_err(|_| anyhow!("worker thread panicked"))?
}

/// Log progress until the worker drops its sender.
fn drain_progress(rx: Receiver<ProgressEvent>) {
    let mut current: Option<(&'static str, usize)> = None;
    for event in rx {
        match event {
            ProgressEvent::Started { label, total } => {
                info!("{label} ({total})");
                current = Some((label, total));
            }
            ProgressEvent::Advanced { done } => {
                if let Some((label, total)) = current {
                    debug!("{label}: {done}/{total}");
                }
            }
            ProgressEvent::Finished => current = None,
        }
    }
}

fn run(args: Args, settings: Settings, progress: Progress) -> Result<()> {
    let tags = if settings.dry_run {
        Id3Tags::dry_run()
    } else {
        Id3Tags::new()
    };

    let mut library = Library::load(&args.library)
        .with_context(|| format!("load library {}", args.library.display()))?;
    if let Some(folder) = settings.music_folder {
        library.store_mut().set_music_folder(folder);
    }

    match args.command {
        Command::Artists => {
            let catalog = library.resolve(&tags, &progress);
            print_tree(catalog, false);
        }
        Command::RateArtists { field, mode } => {
            let mut config = settings.rating;
            if let Some(mode) = mode {
                config.mode = mode.into();
            }
            library.resolve(&tags, &progress);
            let (store, catalog) = library.parts_mut();
            rating::rate_artists(catalog, store, &config, &progress);
            let summary = rating::write_artist_ratings(catalog, &tags, &field, &progress);
            print_tree(catalog, true);
            print_summary(&summary);
        }
        Command::RateAlbums { field } => {
            library.resolve(&tags, &progress);
            let (store, catalog) = library.parts_mut();
            rating::rate_albums(catalog, store, &settings.rating, &progress);
            let summary = rating::write_album_ratings(catalog, &tags, &field, &progress);
            print_tree(catalog, true);
            print_summary(&summary);
        }
        Command::Missing { discover, csv } => {
            let entries = missing::locate_missing(library.store(), discover, &progress);
            for e in &entries {
                match &e.discovered_path {
                    Some(found) => println!("{}\t{}\t{}", e.status, e.path.display(), found.display()),
                    None => println!("{}\t{}", e.status, e.path.display()),
                }
            }
            if let Some(csv) = csv {
                report::save_missing_csv(&entries, &csv)?;
                info!(path = %csv.display(), rows = entries.len(), "missing tracks saved");
            }
        }
        Command::Unlisted { ignore_images } => {
            let entries = unlisted::locate_unlisted(library.store(), ignore_images, &progress)?;
            for e in &entries {
                println!("{}\t{}", e.status, e.path.display());
            }
        }
        Command::FillMissing { fields } => {
            let fields = if fields.is_empty() {
                BackfillField::ALL.to_vec()
            } else {
                fields
            };
            let catalog = library.resolve(&tags, &progress);
            let summary = backfill::fill_missing(catalog, &tags, &fields, &progress);
            print_summary(&summary);
        }
        Command::TrackCounts { overwrite } => {
            let catalog = library.resolve(&tags, &progress);
            let summary = backfill::write_track_counts(catalog, &tags, overwrite, &progress);
            print_summary(&summary);
        }
    }

    Ok(())
}

fn print_tree(catalog: &Catalog, with_ratings: bool) {
    for (artist_id, artist) in catalog.artists() {
        match artist.rating.filter(|_| with_ratings) {
            Some(r) => println!("{} [{}]", artist.name, r),
            None => println!("{}", artist.name),
        }
        for (_, album) in catalog.albums_of(artist_id) {
            let tracks = album.tracks().len();
            match album.rating.filter(|_| with_ratings) {
                Some(r) => println!("  {} ({tracks} tracks) [{}]", album.name, r),
                None => println!("  {} ({tracks} tracks)", album.name),
            }
        }
    }
}

fn print_summary(summary: &WriteSummary) {
    println!(
        "written: {}, skipped: {}, failed: {}",
        summary.written, summary.skipped, summary.failed
    );
}
