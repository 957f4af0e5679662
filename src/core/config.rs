//! core/config.rs
//! Settings file (TOML) and the rating configuration passed to the engine.
//!
//! Every key is optional; a missing file means all defaults.
//!
//! ```toml
//! music_folder = "/srv/music/iTunes Media"
//! dry_run = false
//!
//! [rating]
//! mode = "bracket"
//! rated_songs_min = 0.5
//! total_songs_min = 5
//! album_min_percent_rated = 50
//!
//! [rating.brackets]
//! one_star_max = 0.10
//! two_star_min = 0.10
//! three_star_min = 0.25
//! four_star_min = 0.45
//! five_star_min = 0.70
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Overrides the export's `Music Folder`.
    pub music_folder: Option<PathBuf>,
    /// Log tag writes instead of performing them.
    pub dry_run: bool,
    pub rating: RatingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingMode {
    /// Mean star value over rated tracks.
    #[default]
    Average,
    /// Share of 4+ star tracks mapped through `Brackets`.
    Bracket,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatingConfig {
    pub mode: RatingMode,
    /// Fraction (0..=1) of an artist's counted tracks that must be rated.
    pub rated_songs_min: f64,
    /// Minimum counted tracks before an artist gets a bracket rating.
    pub total_songs_min: u32,
    /// Percent (0..=100) of an album's tracks that must be rated.
    pub album_min_percent_rated: u32,
    pub brackets: Brackets,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            mode: RatingMode::Average,
            rated_songs_min: 0.5,
            total_songs_min: 5,
            album_min_percent_rated: 50,
            brackets: Brackets::default(),
        }
    }
}

/// Lower bounds on the share of 4+ star tracks, as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Brackets {
    pub one_star_max: f64,
    pub two_star_min: f64,
    pub three_star_min: f64,
    pub four_star_min: f64,
    pub five_star_min: f64,
}

impl Default for Brackets {
    fn default() -> Self {
        Self {
            one_star_max: 0.10,
            two_star_min: 0.10,
            three_star_min: 0.25,
            four_star_min: 0.45,
            five_star_min: 0.70,
        }
    }
}

impl Brackets {
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            ("one_star_max", self.one_star_max),
            ("two_star_min", self.two_star_min),
            ("three_star_min", self.three_star_min),
            ("four_star_min", self.four_star_min),
            ("five_star_min", self.five_star_min),
        ];
        for (name, v) in bounds {
            if !(0.0..=1.0).contains(&v) {
                return Err(Error::Config(format!("{name} must be within 0..=1, got {v}")));
            }
        }
        if self.one_star_max > self.two_star_min {
            return Err(Error::Config(
                "one_star_max must not exceed two_star_min".to_string(),
            ));
        }
        for pair in bounds[1..].windows(2) {
            let ((lo_name, lo), (hi_name, hi)) = (pair[0], pair[1]);
            if lo >= hi {
                return Err(Error::Config(format!(
                    "{hi_name} ({hi}) must be greater than {lo_name} ({lo})"
                )));
            }
        }
        Ok(())
    }
}

impl RatingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.rated_songs_min) {
            return Err(Error::Config(format!(
                "rated_songs_min must be within 0..=1, got {}",
                self.rated_songs_min
            )));
        }
        if self.album_min_percent_rated > 100 {
            return Err(Error::Config(format!(
                "album_min_percent_rated must be within 0..=100, got {}",
                self.album_min_percent_rated
            )));
        }
        self.brackets.validate()
    }
}

impl Settings {
    /// Parse and validate a TOML settings string.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        settings.rating.validate()?;
        Ok(settings)
    }

    /// Load from `path`. A missing file is not an error: defaults apply.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "loading settings");
                Self::from_toml(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "settings file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }
}
