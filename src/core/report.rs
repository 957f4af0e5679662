//! core/report.rs
//! Missing-tracks CSV.

use std::io::Write;
use std::path::Path;

use super::error::{Error, Result};
use super::missing::MissingEntry;

pub const MISSING_CSV_HEADER: &str = "TITLE,ARTIST,ALBUM,LOCATION,STATUS,ACTUAL LOCATION";

/// One row per entry, CRLF line endings.
pub fn write_missing_csv<W: Write>(entries: &[MissingEntry], mut out: W) -> std::io::Result<()> {
    write!(out, "{MISSING_CSV_HEADER}\r\n")?;
    for e in entries {
        let discovered = e
            .discovered_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let row = [
            cell(&e.file_name),
            cell(&e.artist),
            cell(&e.album),
            cell(&e.path.display().to_string()),
            cell(&e.status.to_string()),
            cell(&discovered),
        ];
        write!(out, "{}\r\n", row.join(","))?;
    }
    out.flush()
}

/// Write the CSV to `path`, replacing any existing file.
pub fn save_missing_csv(entries: &[MissingEntry], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    write_missing_csv(entries, std::io::BufWriter::new(file)).map_err(|e| Error::io(path, e))
}

/// Quote cells that would otherwise break the row.
fn cell(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
