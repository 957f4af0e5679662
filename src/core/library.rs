//! core/library.rs
//! Metadata store: the library export, decoded into track records.
//!
//! The export is an XML property list:
//! - `Tracks`: dict of track id -> dict of fields
//! - `Music Folder`: `file://` URL of the managed media folder
//!
//! Decoding is done by the `plist` crate; this module only reshapes the
//! decoded tree into `TrackStore`.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use url::Url;

use super::error::{Error, Result};
use super::progress::Progress;
use super::resolve::{self, Catalog};
use super::tags::TagAccess;
use super::types::{FieldValue, TrackId, TrackRecord, field};

/// Folder names a consolidated library may use next to the export file.
const MEDIA_DIR_NAMES: [&str; 2] = ["iTunes Media", "iTunes Music"];

/// Flat mapping of track id -> record, in export order.
#[derive(Debug, Clone, Default)]
pub struct TrackStore {
    source: PathBuf,
    music_folder: Option<PathBuf>,
    order: Vec<TrackId>,
    records: HashMap<TrackId, TrackRecord>,
}

impl TrackStore {
    /// Parse a library export from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let value = plist::Value::from_file(path).map_err(|e| Error::parse(path, e.to_string()))?;
        let store = Self::from_plist(value, path)?;
        info!(
            tracks = store.len(),
            music_folder = ?store.music_folder,
            "library parsed"
        );
        Ok(store)
    }

    /// Parse from any seekable reader. `source` is only used for error
    /// messages and the music-folder fallback.
    pub fn from_reader<R: Read + Seek>(reader: R, source: &Path) -> Result<Self> {
        let value =
            plist::Value::from_reader(reader).map_err(|e| Error::parse(source, e.to_string()))?;
        Self::from_plist(value, source)
    }

    fn from_plist(value: plist::Value, source: &Path) -> Result<Self> {
        let plist::Value::Dictionary(root) = value else {
            return Err(Error::parse(source, "top level is not a dict"));
        };

        let Some(tracks) = root.get("Tracks") else {
            return Err(Error::parse(source, "no `Tracks` dict"));
        };
        let Some(tracks) = tracks.as_dictionary() else {
            return Err(Error::parse(source, "`Tracks` is not a dict"));
        };

        let music_folder = root
            .get("Music Folder")
            .and_then(plist::Value::as_string)
            .and_then(location_to_path)
            .or_else(|| relative_music_folder(source));

        let mut store = TrackStore {
            source: source.to_path_buf(),
            music_folder,
            order: Vec::with_capacity(tracks.len()),
            records: HashMap::with_capacity(tracks.len()),
        };

        let mut skipped = 0usize;
        for (id, entry) in tracks.iter() {
            let Some(entry) = entry.as_dictionary() else {
                return Err(Error::parse(source, format!("track {id} is not a dict")));
            };

            let record: TrackRecord = entry
                .iter()
                .filter_map(|(k, v)| convert(v).map(|v| (k.clone(), v)))
                .collect();

            if !is_local_file(&record) {
                skipped += 1;
                continue;
            }
            store.insert(id.clone(), record);
        }

        if skipped > 0 {
            debug!(skipped, "ignored non-file tracks");
        }
        Ok(store)
    }

    /// Add (or replace) a record. New ids go to the end of the order.
    pub fn insert(&mut self, id: impl Into<TrackId>, record: TrackRecord) {
        let id = id.into();
        if self.records.insert(id.clone(), record).is_none() {
            self.order.push(id);
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn music_folder(&self) -> Option<&Path> {
        self.music_folder.as_deref()
    }

    pub fn set_music_folder(&mut self, folder: impl Into<PathBuf>) {
        self.music_folder = Some(folder.into());
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Track ids in export order.
    pub fn ids(&self) -> impl Iterator<Item = &TrackId> {
        self.order.iter()
    }

    /// (id, record) pairs in export order.
    pub fn iter(&self) -> impl Iterator<Item = (&TrackId, &TrackRecord)> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| (id, r)))
    }

    pub fn get(&self, id: &str) -> Option<&TrackRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TrackRecord> {
        self.records.get_mut(id)
    }

    /// Default-valued field access; never fails, even for unknown ids.
    pub fn get_field(&self, id: &str, key: &str, default: FieldValue) -> FieldValue {
        match self.records.get(id) {
            Some(record) => record.get_or_default(key, default),
            None => default,
        }
    }

    pub fn int_field(&self, id: &str, key: &str, default: i64) -> i64 {
        self.records
            .get(id)
            .map(|r| r.int_or(key, default))
            .unwrap_or(default)
    }

    /// Decoded filesystem path of a track's `Location`.
    pub fn track_path(&self, id: &str) -> Option<PathBuf> {
        self.records.get(id).and_then(record_path)
    }
}

/// Store + the Artist/Album hierarchy derived from it.
#[derive(Debug, Default)]
pub struct Library {
    store: TrackStore,
    catalog: Catalog,
}

impl Library {
    pub fn new(store: TrackStore) -> Self {
        Self {
            store,
            catalog: Catalog::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(TrackStore::load(path)?))
    }

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TrackStore {
        &mut self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Store (read-only) and catalog (mutable) at the same time.
    pub fn parts_mut(&mut self) -> (&TrackStore, &mut Catalog) {
        (&self.store, &mut self.catalog)
    }

    /// Build the Artist -> Album -> Track hierarchy once.
    ///
    /// A second call returns the existing result untouched: rerunning would
    /// mint fresh synthetic names and silently regroup tracks.
    pub fn resolve(&mut self, tags: &dyn TagAccess, progress: &Progress) -> &Catalog {
        if !self.catalog.is_empty() {
            debug!("artists already resolved");
            return &self.catalog;
        }
        self.catalog = resolve::resolve(&mut self.store, tags, progress);
        &self.catalog
    }
}

/// Decode a `file://` URL (percent-encoded, optional `localhost` host).
pub fn location_to_path(location: &str) -> Option<PathBuf> {
    let url = Url::parse(location).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

pub(crate) fn record_path(record: &TrackRecord) -> Option<PathBuf> {
    record.text(field::LOCATION).and_then(location_to_path)
}

/// Only tracks backed by a local file are kept (no streams, no podcasts
/// by URL). Exports without `Track Type` fall back to the URL scheme.
fn is_local_file(record: &TrackRecord) -> bool {
    match record.text(field::TRACK_TYPE) {
        Some(kind) => kind == "File",
        None => record
            .text(field::LOCATION)
            .is_some_and(|loc| loc.starts_with("file://")),
    }
}

fn relative_music_folder(library_file: &Path) -> Option<PathBuf> {
    let parent = library_file.parent()?;
    MEDIA_DIR_NAMES
        .iter()
        .map(|name| parent.join(name))
        .find(|dir| dir.is_dir())
}

/// plist -> FieldValue. Binary data and UIDs carry nothing the core reads.
fn convert(value: &plist::Value) -> Option<FieldValue> {
    match value {
        plist::Value::String(s) => Some(FieldValue::Text(s.clone())),
        plist::Value::Integer(n) => n
            .as_signed()
            .or_else(|| n.as_unsigned().map(|u| u as i64))
            .map(FieldValue::Integer),
        plist::Value::Real(r) => Some(FieldValue::Real(*r)),
        plist::Value::Boolean(b) => Some(FieldValue::Boolean(*b)),
        plist::Value::Date(d) => Some(FieldValue::Date(d.to_xml_format())),
        plist::Value::Array(items) => Some(FieldValue::List(
            items.iter().filter_map(convert).collect(),
        )),
        plist::Value::Dictionary(dict) => Some(FieldValue::Dict(
            dict.iter()
                .filter_map(|(k, v)| convert(v).map(|v| (k.clone(), v)))
                .collect::<BTreeMap<_, _>>(),
        )),
        _ => None,
    }
}
