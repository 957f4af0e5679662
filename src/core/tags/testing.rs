//! In-memory `TagAccess` for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::core::error::{Error, Result};

use super::{TagAccess, TagField};

/// Records every write; values written are visible to later reads.
#[derive(Debug, Default)]
pub struct MemoryTags {
    values: RefCell<HashMap<(PathBuf, String), String>>,
    writes: RefCell<Vec<(PathBuf, TagField, String)>>,
    artwork: RefCell<HashSet<PathBuf>>,
    failing: HashSet<PathBuf>,
}

impl MemoryTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes to `path` fail with an I/O error.
    pub fn failing_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    pub fn with_artwork(self, path: impl Into<PathBuf>) -> Self {
        self.artwork.borrow_mut().insert(path.into());
        self
    }

    pub fn with_value(self, path: impl Into<PathBuf>, field: &TagField, value: &str) -> Self {
        self.values
            .borrow_mut()
            .insert((path.into(), field.to_string()), value.to_string());
        self
    }

    pub fn writes(&self) -> Vec<(PathBuf, TagField, String)> {
        self.writes.borrow().clone()
    }

    pub fn value(&self, path: &Path, field: &TagField) -> Option<String> {
        self.values
            .borrow()
            .get(&(path.to_path_buf(), field.to_string()))
            .cloned()
    }

    fn check(&self, path: &Path) -> Result<()> {
        if self.failing.contains(path) {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            ));
        }
        Ok(())
    }
}

impl TagAccess for MemoryTags {
    fn has_artwork(&self, path: &Path) -> bool {
        self.artwork.borrow().contains(path)
    }

    fn read_field(&self, path: &Path, field: &TagField) -> Result<Option<String>> {
        Ok(self.value(path, field))
    }

    fn write_field(&self, path: &Path, field: &TagField, value: &str) -> Result<()> {
        self.check(path)?;
        self.values
            .borrow_mut()
            .insert((path.to_path_buf(), field.to_string()), value.to_string());
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), field.clone(), value.to_string()));
        Ok(())
    }

    fn copy_artwork(&self, from: &Path, to: &Path) -> Result<bool> {
        self.check(to)?;
        if !self.has_artwork(from) {
            return Ok(false);
        }
        self.artwork.borrow_mut().insert(to.to_path_buf());
        Ok(true)
    }
}
