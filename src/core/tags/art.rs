use id3::{Tag, TagLike};
use id3::frame::{Content, Picture};

/// Count APIC (v2.3/2.4) and PIC (old v2.2) frames.
pub(crate) fn artwork_count(tag: &Tag) -> usize {
    tag.frames()
        .filter(|f| f.id() == "APIC" || f.id() == "PIC")
        .count()
}

/// First embedded picture (APIC/PIC), if any.
pub(crate) fn first_picture(tag: &Tag) -> Option<Picture> {
    for f in tag.frames() {
        if f.id() != "APIC" && f.id() != "PIC" {
            continue;
        }
        if let Content::Picture(p) = f.content() {
            return Some(p.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3::frame::PictureType;

    #[test]
    fn finds_front_cover() {
        let mut tag = Tag::new();
        assert_eq!(artwork_count(&tag), 0);
        assert!(first_picture(&tag).is_none());

        tag.add_frame(Picture {
            mime_type: "image/jpeg".to_string(),
            picture_type: PictureType::CoverFront,
            description: String::new(),
            data: vec![0xFF, 0xD8, 0xFF],
        });

        assert_eq!(artwork_count(&tag), 1);
        assert_eq!(first_picture(&tag).map(|p| p.data), Some(vec![0xFF, 0xD8, 0xFF]));
    }
}
