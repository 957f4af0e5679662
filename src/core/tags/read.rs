//! core/tags/read.rs
//! Read single fields out of an ID3 tag.
//!
//! Blank values read as `None`: for the core, an empty frame and a missing
//! frame both mean "nothing here yet".

use id3::frame::Content;
use id3::{Tag, TagLike};

use super::field::TagField;
use super::util::{non_blank, parse_slash_pair_u32, text_frame};

pub(crate) fn read_field(tag: &Tag, field: &TagField) -> Option<String> {
    let value = match field {
        TagField::Title => tag
            .title()
            .map(str::to_owned)
            .or_else(|| text_frame(tag, "TIT2")),
        TagField::Artist => tag
            .artist()
            .map(str::to_owned)
            .or_else(|| text_frame(tag, "TPE1")),
        TagField::Album => tag
            .album()
            .map(str::to_owned)
            .or_else(|| text_frame(tag, "TALB")),
        TagField::Comment => first_comment(tag),
        TagField::Year => tag
            .year()
            .map(|y| y.to_string())
            .or_else(|| text_frame(tag, "TDRC"))
            .or_else(|| text_frame(tag, "TYER")),
        TagField::TrackTotal => {
            let (_, total) = parse_slash_pair_u32(text_frame(tag, "TRCK").as_deref());
            total.map(|t| t.to_string())
        }
        TagField::DiscTotal => {
            let (_, total) = parse_slash_pair_u32(text_frame(tag, "TPOS").as_deref());
            total.map(|t| t.to_string())
        }
        TagField::Custom(desc) => user_text(tag, desc),
        plain => text_frame(tag, plain.frame_id()),
    };
    non_blank(value)
}

fn first_comment(tag: &Tag) -> Option<String> {
    for frame in tag.frames() {
        if frame.id() != "COMM" {
            continue;
        }
        if let Content::Comment(c) = frame.content() {
            return Some(c.text.clone());
        }
    }
    None
}

fn user_text(tag: &Tag, description: &str) -> Option<String> {
    for frame in tag.frames() {
        if frame.id() != "TXXX" {
            continue;
        }
        if let Content::ExtendedText(et) = frame.content() {
            if et.description == description {
                return Some(et.value.clone());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3::frame::{Comment, ExtendedText};

    #[test]
    fn reads_plain_and_special_frames() {
        let mut tag = Tag::new();
        tag.set_text("TCON", "Slowcore");
        tag.set_text("TRCK", "3/12");
        tag.set_text("TPOS", "1");
        tag.add_frame(Comment {
            lang: "eng".to_string(),
            description: String::new(),
            text: "first pressing".to_string(),
        });
        tag.add_frame(ExtendedText {
            description: "Artist Rating".to_string(),
            value: "Artist Rating: 4".to_string(),
        });

        assert_eq!(read_field(&tag, &TagField::Genre).as_deref(), Some("Slowcore"));
        assert_eq!(read_field(&tag, &TagField::TrackTotal).as_deref(), Some("12"));
        assert_eq!(read_field(&tag, &TagField::DiscTotal), None);
        assert_eq!(
            read_field(&tag, &TagField::Comment).as_deref(),
            Some("first pressing")
        );
        assert_eq!(
            read_field(&tag, &TagField::Custom("Artist Rating".into())).as_deref(),
            Some("Artist Rating: 4")
        );
        assert_eq!(read_field(&tag, &TagField::Composer), None);
    }

    #[test]
    fn blank_frames_read_as_none() {
        let mut tag = Tag::new();
        tag.set_text("TIT1", "  ");
        assert_eq!(read_field(&tag, &TagField::Grouping), None);
    }
}
