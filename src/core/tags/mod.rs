//! core/tags/mod.rs
//!
//! Per-file tag access. The rest of the core only sees [`TagAccess`];
//! [`Id3Tags`] is the real implementation backed by the `id3` crate.
//!
//! Public API:
//! - [`TagAccess::has_artwork`] answers "does the tag carry any picture".
//! - [`TagAccess::read_field`] / [`TagAccess::write_field`] move one field.
//! - [`TagAccess::copy_artwork`] copies the first picture between files.

mod art;
mod field;
mod read;
mod util;
mod write;

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;

use id3::{Tag, TagLike, Version};
use tracing::debug;

use super::error::{Error, Result};

pub use field::TagField;

pub trait TagAccess {
    /// Presence only; unreadable or tagless files have no artwork.
    fn has_artwork(&self, path: &Path) -> bool;

    /// `Ok(None)` when the file has no tag or the field is empty.
    fn read_field(&self, path: &Path, field: &TagField) -> Result<Option<String>>;

    fn write_field(&self, path: &Path, field: &TagField, value: &str) -> Result<()>;

    /// Returns `false` when `from` has no picture to copy.
    fn copy_artwork(&self, from: &Path, to: &Path) -> Result<bool>;
}

/// ID3v2 tags via the `id3` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Id3Tags {
    dry_run: bool,
}

impl Id3Tags {
    pub fn new() -> Self {
        Self { dry_run: false }
    }

    /// Writes are logged and reported as done, but never hit the disk.
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    fn load(path: &Path) -> Result<Option<Tag>> {
        if !path.exists() {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }
        // ID3 in front of an MP4/FLAC/etc. stream corrupts it.
        if !is_mp3(path) {
            return Err(Error::field(path, "tag", "not an MP3 file"));
        }
        match Tag::read_from_path(path) {
            Ok(tag) => Ok(Some(tag)),
            Err(e) if matches!(e.kind, id3::ErrorKind::NoTag) => Ok(None),
            Err(e) => Err(Error::field(path, "tag", e.to_string())),
        }
    }

    fn commit(&self, path: &Path, tag: &Tag, what: &dyn std::fmt::Display) -> Result<()> {
        if self.dry_run {
            debug!(path = %path.display(), field = %what, "dry run: tag not written");
            return Ok(());
        }

        // Write back to file (v2.4 consistently)
        tag.write_to_path(path, Version::Id3v24).map_err(|e| {
            let reason = format!("write_to_path failed: {e}");
            match e.kind {
                id3::ErrorKind::Io(source) => Error::io(path, source),
                _ => Error::field(path, what, reason),
            }
        })
    }
}

/// Only MP3s carry ID3 tags we may rewrite.
pub fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mp3"))
        .unwrap_or(false)
}

impl TagAccess for Id3Tags {
    fn has_artwork(&self, path: &Path) -> bool {
        match Self::load(path) {
            Ok(Some(tag)) => art::artwork_count(&tag) > 0,
            _ => false,
        }
    }

    fn read_field(&self, path: &Path, field: &TagField) -> Result<Option<String>> {
        Ok(Self::load(path)?.and_then(|tag| read::read_field(&tag, field)))
    }

    fn write_field(&self, path: &Path, field: &TagField, value: &str) -> Result<()> {
        // Load existing tag if possible; otherwise start fresh.
        let mut tag = Self::load(path)?.unwrap_or_else(Tag::new);
        write::apply_field(&mut tag, field, value).map_err(|reason| Error::field(path, field, reason))?;
        self.commit(path, &tag, field)
    }

    fn copy_artwork(&self, from: &Path, to: &Path) -> Result<bool> {
        let Some(source) = Self::load(from)? else {
            return Ok(false);
        };
        let Some(picture) = art::first_picture(&source) else {
            return Ok(false);
        };

        let mut tag = Self::load(to)?.unwrap_or_else(Tag::new);
        let _ = tag.add_frame(picture);
        self.commit(to, &tag, &"artwork")?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_file(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        // Not real audio; id3 only cares about the tag region.
        f.write_all(&[0u8; 64]).unwrap();
        path
    }

    #[test]
    fn untagged_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = scratch_file(&dir, "a.mp3");
        let tags = Id3Tags::new();

        assert!(!tags.has_artwork(&path));
        assert_eq!(tags.read_field(&path, &TagField::Genre).unwrap(), None);
    }

    #[test]
    fn write_then_read_text_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = scratch_file(&dir, "a.mp3");
        let tags = Id3Tags::new();

        tags.write_field(&path, &TagField::Grouping, "Artist Rating: 4")
            .unwrap();
        assert_eq!(
            tags.read_field(&path, &TagField::Grouping).unwrap().as_deref(),
            Some("Artist Rating: 4")
        );
    }

    #[test]
    fn dry_run_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = scratch_file(&dir, "a.mp3");

        Id3Tags::dry_run()
            .write_field(&path, &TagField::Genre, "Slowcore")
            .unwrap();
        assert_eq!(Id3Tags::new().read_field(&path, &TagField::Genre).unwrap(), None);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.mp3");
        let err = Id3Tags::new()
            .write_field(&path, &TagField::Genre, "x")
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn non_mp3_files_are_refused_and_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.m4a");
        let mut original = vec![0u8; 64];
        original[4..12].copy_from_slice(b"ftypM4A ");
        std::fs::write(&path, &original).unwrap();
        let tags = Id3Tags::new();

        let err = tags
            .write_field(&path, &TagField::Grouping, "Artist Rating: 4")
            .unwrap_err();
        assert!(matches!(err, Error::FieldAccess { .. }));
        assert!(matches!(
            tags.read_field(&path, &TagField::Grouping),
            Err(Error::FieldAccess { .. })
        ));
        assert!(!tags.has_artwork(&path));
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }

    #[test]
    fn mp3_extension_is_case_insensitive() {
        assert!(is_mp3(Path::new("/m/a.MP3")));
        assert!(is_mp3(Path::new("/m/a.mp3")));
        assert!(!is_mp3(Path::new("/m/a.m4a")));
        assert!(!is_mp3(Path::new("/m/mp3")));
    }

    #[test]
    fn artwork_copies_between_files() {
        use id3::frame::{Picture, PictureType};

        let dir = tempfile::tempdir().unwrap();
        let from = scratch_file(&dir, "a.mp3");
        let to = scratch_file(&dir, "b.mp3");
        let tags = Id3Tags::new();

        // Nothing to copy yet.
        assert!(!tags.copy_artwork(&from, &to).unwrap());

        let mut tag = Tag::new();
        tag.add_frame(Picture {
            mime_type: "image/jpeg".to_string(),
            picture_type: PictureType::CoverFront,
            description: String::new(),
            data: vec![0xFF, 0xD8, 0xFF],
        });
        tag.write_to_path(&from, Version::Id3v24).unwrap();

        assert!(tags.has_artwork(&from));
        assert!(tags.copy_artwork(&from, &to).unwrap());
        assert!(tags.has_artwork(&to));
    }

    #[test]
    fn bad_year_is_field_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = scratch_file(&dir, "a.mp3");
        let err = Id3Tags::new()
            .write_field(&path, &TagField::Year, "nineteen")
            .unwrap_err();
        assert!(matches!(err, Error::FieldAccess { .. }));
    }
}
