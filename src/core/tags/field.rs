//! core/tags/field.rs
//! Names for the tag fields the core reads and writes.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagField {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Composer,
    Genre,
    Grouping,
    Comment,
    Subtitle,
    Year,
    TrackTotal,
    DiscTotal,
    /// User-defined text frame (TXXX) with this description.
    Custom(String),
}

impl TagField {
    /// ID3v2 frame id backing this field.
    pub fn frame_id(&self) -> &'static str {
        match self {
            TagField::Title => "TIT2",
            TagField::Artist => "TPE1",
            TagField::Album => "TALB",
            TagField::AlbumArtist => "TPE2",
            TagField::Composer => "TCOM",
            TagField::Genre => "TCON",
            TagField::Grouping => "TIT1",
            TagField::Comment => "COMM",
            TagField::Subtitle => "TIT3",
            TagField::Year => "TDRC",
            TagField::TrackTotal => "TRCK",
            TagField::DiscTotal => "TPOS",
            TagField::Custom(_) => "TXXX",
        }
    }
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagField::Title => "title",
            TagField::Artist => "artist",
            TagField::Album => "album",
            TagField::AlbumArtist => "album-artist",
            TagField::Composer => "composer",
            TagField::Genre => "genre",
            TagField::Grouping => "grouping",
            TagField::Comment => "comment",
            TagField::Subtitle => "subtitle",
            TagField::Year => "year",
            TagField::TrackTotal => "track-total",
            TagField::DiscTotal => "disc-total",
            TagField::Custom(desc) => return write!(f, "txxx:{desc}"),
        };
        f.write_str(name)
    }
}

impl FromStr for TagField {
    type Err = String;

    /// Accepts the `Display` names (any case, `_` or `-`), plus `txxx:<desc>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((prefix, desc)) = s.split_once(':') {
            if prefix.eq_ignore_ascii_case("txxx") && !desc.is_empty() {
                return Ok(TagField::Custom(desc.to_string()));
            }
            return Err(format!("unknown tag field `{s}`"));
        }

        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "title" => Ok(TagField::Title),
            "artist" => Ok(TagField::Artist),
            "album" => Ok(TagField::Album),
            "album-artist" => Ok(TagField::AlbumArtist),
            "composer" => Ok(TagField::Composer),
            "genre" => Ok(TagField::Genre),
            "grouping" => Ok(TagField::Grouping),
            "comment" | "comments" => Ok(TagField::Comment),
            "subtitle" => Ok(TagField::Subtitle),
            "year" => Ok(TagField::Year),
            "track-total" => Ok(TagField::TrackTotal),
            "disc-total" => Ok(TagField::DiscTotal),
            _ => Err(format!("unknown tag field `{s}`")),
        }
    }
}
