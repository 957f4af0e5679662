//! core/mod.rs
//!
//! The brain of the app:
//! - Load the library export into flat track records
//! - Resolve records into Artist -> Album -> Track
//! - Roll track ratings up to artists and albums
//! - Find tracks whose files went missing, and files no track lists
//! - Write results back into the files' tags
//!
//! The pipeline is explicit and modular:
//!   (A) load export -> `TrackStore`
//!   (B) resolve -> `Catalog` (once per store)
//!   (C) rate / backfill / locate, each reading the catalog or the store
//!
//! Nothing here spawns threads. Callers that want a responsive UI run the
//! whole pipeline on a worker and listen on a `Progress` channel.

pub mod backfill;
pub mod config;
pub mod distance;
pub mod error;
pub mod library;
pub mod missing;
pub mod progress;
pub mod rating;
pub mod report;
pub mod resolve;
pub mod tags;
pub mod types;
pub mod unlisted;

use std::path::Path;

pub use error::{Error, Result};

use library::Library;
use progress::Progress;
use tags::TagAccess;

/// Convenience: load an export and resolve it in one go.
///
/// Internally, this is just:
/// - `Library::load(path)`
/// - `Library::resolve(tags, progress)`
pub fn load_and_resolve(path: &Path, tags: &dyn TagAccess, progress: &Progress) -> Result<Library> {
    let mut library = Library::load(path)?;
    library.resolve(tags, progress);
    Ok(library)
}
