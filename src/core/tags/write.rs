//! Write single fields into an ID3 tag (in memory; the caller saves).
//!
//! Semantics:
//! - empty/whitespace value => remove that frame
//! - numeric fields reject values that don't parse

use id3::frame::{Comment, ExtendedText};
use id3::{Tag, TagLike};

use super::field::TagField;

/// Helper: set/remove a plain text frame (T***)
fn set_text_opt(tag: &mut Tag, id: &str, v: Option<&str>) {
    match v.map(str::trim) {
        Some(s) if !s.is_empty() => tag.set_text(id, s.to_string()),
        _ => {
            let _ = tag.remove(id); // TagLike::remove returns Vec<Frame>; discard it
        }
    }
}

fn parse_number<T: std::str::FromStr>(field: &TagField, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| format!("`{value}` is not a valid {field}"))
}

pub(crate) fn apply_field(tag: &mut Tag, field: &TagField, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    let clear = trimmed.is_empty();

    match field {
        TagField::Comment => {
            // Replace with a single "eng" comment
            let _ = tag.remove("COMM");
            if !clear {
                let _ = tag.add_frame(Comment {
                    lang: "eng".to_string(),
                    description: "".to_string(),
                    text: trimmed.to_string(),
                });
            }
        }
        TagField::Custom(desc) => {
            tag.remove_extended_text(Some(desc.as_str()), None);
            if !clear {
                let _ = tag.add_frame(ExtendedText {
                    description: desc.clone(),
                    value: trimmed.to_string(),
                });
            }
        }
        TagField::Year => {
            if clear {
                tag.remove_year();
                let _ = tag.remove("TDRC");
            } else {
                let year: i32 = parse_number(field, trimmed)?;
                let _ = tag.remove("TDRC");
                tag.set_year(year);
            }
        }
        TagField::TrackTotal => {
            if clear {
                tag.remove_total_tracks();
            } else {
                tag.set_total_tracks(parse_number(field, trimmed)?);
            }
        }
        TagField::DiscTotal => {
            if clear {
                tag.remove_total_discs();
            } else {
                tag.set_total_discs(parse_number(field, trimmed)?);
            }
        }
        plain => set_text_opt(tag, plain.frame_id(), Some(trimmed)),
    }

    Ok(())
}
