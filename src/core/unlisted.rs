//! core/unlisted.rs
//! Files under the music folder that no track points to.
//!
//! The reverse of [`super::missing`]: walk the music folder, drop every path
//! some track's `Location` resolves to, and report what is left. Paths with
//! non-ASCII characters are flagged for a manual look, since the export and
//! the filesystem may disagree on their normalization.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::{Error, Result};
use super::library::TrackStore;
use super::progress::Progress;

/// Extensions treated as artwork when images are ignored.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "jpe", "png", "gif", "bmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlistedStatus {
    /// Not in the library; re-add it or delete it.
    FindAndMove,
    /// Non-ASCII path: may be listed under a differently normalized name.
    CheckManually,
}

impl fmt::Display for UnlistedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnlistedStatus::FindAndMove => f.write_str("Find + Move"),
            UnlistedStatus::CheckManually => f.write_str("Check Manually"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlistedEntry {
    pub path: PathBuf,
    pub status: UnlistedStatus,
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|i| ext.eq_ignore_ascii_case(i)))
        .unwrap_or(false)
}

/// Every regular file under `dir`, recursively, in name order.
fn walk_dir(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        entries.push(entry.map_err(|e| Error::io(dir, e))?.path());
    }
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk_dir(&path, out)?;
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// List files in the music folder that no track references.
///
/// Fails only when the music folder is unset or can't be walked.
pub fn locate_unlisted(
    store: &TrackStore,
    ignore_images: bool,
    progress: &Progress,
) -> Result<Vec<UnlistedEntry>> {
    let Some(root) = store.music_folder() else {
        return Err(Error::io(
            store.source(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "library has no music folder"),
        ));
    };
    if !root.is_dir() {
        return Err(Error::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "music folder does not exist"),
        ));
    }

    let mut files = Vec::new();
    walk_dir(root, &mut files)?;
    if ignore_images {
        files.retain(|p| !is_image(p));
    }

    progress.start("Finding unlisted files", store.len());
    let mut listed = HashSet::with_capacity(store.len());
    for (n, id) in store.ids().enumerate() {
        if let Some(path) = store.track_path(id) {
            listed.insert(path);
        }
        progress.advance(n + 1);
    }
    progress.finish();

    let unlisted: Vec<UnlistedEntry> = files
        .into_iter()
        .filter(|p| !listed.contains(p))
        .map(|path| {
            let status = if path.to_string_lossy().is_ascii() {
                UnlistedStatus::FindAndMove
            } else {
                debug!(path = %path.display(), "non-ASCII path");
                UnlistedStatus::CheckManually
            };
            UnlistedEntry { path, status }
        })
        .collect();

    info!(unlisted = unlisted.len(), listed = listed.len(), "unlisted-file scan done");
    Ok(unlisted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{TrackRecord, field};
    use std::fs;
    use url::Url;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn listed(path: &Path) -> TrackRecord {
        let mut rec = TrackRecord::new();
        rec.set_text(field::LOCATION, Url::from_file_path(path).unwrap().as_str());
        rec
    }

    fn paths(entries: &[UnlistedEntry]) -> Vec<&Path> {
        entries.iter().map(|e| e.path.as_path()).collect()
    }

    #[test]
    fn reports_only_files_no_track_points_to() {
        let dir = tempfile::tempdir().unwrap();
        let known = dir.path().join("Low/Secret Name/01 Known.mp3");
        let stray = dir.path().join("Low/Secret Name/02 Stray.mp3");
        let loose = dir.path().join("loose.flac");
        for p in [&known, &stray, &loose] {
            touch(p);
        }

        let mut store = TrackStore::default();
        store.set_music_folder(dir.path());
        store.insert("1", listed(&known));
        // Listed but gone: irrelevant here.
        store.insert("2", listed(&dir.path().join("Low/gone.mp3")));

        let unlisted = locate_unlisted(&store, false, &Progress::none()).unwrap();
        assert_eq!(paths(&unlisted), vec![stray.as_path(), loose.as_path()]);
        assert!(unlisted.iter().all(|e| e.status == UnlistedStatus::FindAndMove));
    }

    #[test]
    fn images_can_be_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cover = dir.path().join("Low/Secret Name/Cover.JPG");
        let song = dir.path().join("Low/Secret Name/01.mp3");
        touch(&cover);
        touch(&song);

        let mut store = TrackStore::default();
        store.set_music_folder(dir.path());

        let all = locate_unlisted(&store, false, &Progress::none()).unwrap();
        assert_eq!(all.len(), 2);
        let no_images = locate_unlisted(&store, true, &Progress::none()).unwrap();
        assert_eq!(paths(&no_images), vec![song.as_path()]);
    }

    #[test]
    fn non_ascii_paths_need_a_manual_check() {
        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join("Björk/Post/01 Army of Me.mp3");
        touch(&odd);

        let mut store = TrackStore::default();
        store.set_music_folder(dir.path());

        let unlisted = locate_unlisted(&store, false, &Progress::none()).unwrap();
        assert_eq!(unlisted.len(), 1);
        assert_eq!(unlisted[0].status, UnlistedStatus::CheckManually);
        assert_eq!(unlisted[0].status.to_string(), "Check Manually");
    }

    #[test]
    fn absent_music_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TrackStore::default();
        assert!(matches!(
            locate_unlisted(&store, false, &Progress::none()),
            Err(Error::Io { .. })
        ));

        store.set_music_folder(dir.path().join("nope"));
        assert!(matches!(
            locate_unlisted(&store, false, &Progress::none()),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn image_extensions() {
        assert!(is_image(Path::new("a/cover.jpeg")));
        assert!(is_image(Path::new("a/Folder.PNG")));
        assert!(!is_image(Path::new("a/01.mp3")));
        assert!(!is_image(Path::new("a/jpg")));
    }
}
