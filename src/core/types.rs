//! Core data types shared between the pipeline stages.
//!
//! Rule of thumb:
//! - These structs should be "boring bags of data"
//! - No filesystem code
//! - No tag parsing code
//!
//! `TrackRecord` represents ONE entry of the library export: a loose map of
//! field name -> value, exactly as the export stored it.

use std::collections::BTreeMap;

/// Library-assigned track id (the key of the export's `Tracks` dict).
/// Opaque: we never do arithmetic on it.
pub type TrackId = String;

/// Field names the core reads or writes.
pub mod field {
    pub const LOCATION: &str = "Location";
    pub const NAME: &str = "Name";
    pub const ARTIST: &str = "Artist";
    pub const ALBUM: &str = "Album";
    pub const GENRE: &str = "Genre";
    pub const COMPOSER: &str = "Composer";
    pub const GROUPING: &str = "Grouping";
    pub const COMMENTS: &str = "Comments";
    pub const DISC_COUNT: &str = "Disc Count";
    pub const TRACK_COUNT: &str = "Track Count";
    pub const YEAR: &str = "Year";
    pub const RATING: &str = "Rating";
    pub const TRACK_TYPE: &str = "Track Type";
}

/// One dynamically-typed value from the export.
///
/// The export tags every value with a type (`<string>`, `<integer>`, ...),
/// so we keep that tag instead of guessing later.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    /// Dates are kept in their XML text form; the core never interprets them.
    Date(String),
    List(Vec<FieldValue>),
    Dict(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// One track entry: field name -> value.
///
/// Lookups never fail: a missing field (or one of the wrong type) just means
/// "use the default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl TrackRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Default-valued lookup: clone of the stored value, or `default`.
    pub fn get_or_default(&self, key: &str, default: FieldValue) -> FieldValue {
        self.fields.get(key).cloned().unwrap_or(default)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    /// Text value with blanks folded into "absent".
    pub fn non_empty_text(&self, key: &str) -> Option<&str> {
        self.text(key).filter(|s| !s.trim().is_empty())
    }

    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.text(key).unwrap_or(default)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(FieldValue::as_int)
    }

    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.int(key).unwrap_or(default)
    }

    pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, FieldValue::Text(value.into()));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for TrackRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Outcome of a pass that writes to many files.
/// Per-file failures are counted here instead of aborting the pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: usize,
    /// Nothing to write (value unknown, or already present).
    pub skipped: usize,
    pub failed: usize,
}

impl WriteSummary {
    pub fn merge(&mut self, other: WriteSummary) {
        self.written += other.written;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}
