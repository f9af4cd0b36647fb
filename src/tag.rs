//! Embedding track metadata & cover art into saved files.

use std::{io::Cursor, path::Path};

use bytes::Bytes;
use id3::{
    frame::{Picture, PictureType},
    ErrorKind, Tag, TagLike, Version,
};
use image::ImageFormat;

use crate::tracks::Result;

/// Everything that ends up in a track's tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Written as `TIT2`.
    pub title: String,

    /// Written as `TPE1`.
    pub artist: String,

    /// Written as `TALB`, only if present.
    pub album: Option<String>,

    /// PNG encoded front cover, written as `APIC`.
    pub cover: Option<Vec<u8>>,
}

/// Re-encodes artwork in any supported image format as PNG.
pub fn cover_png(data: &Bytes) -> Result<Vec<u8>> {
    let image = image::load_from_memory(data)?;

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(png)
}

/// Writes `metadata` into the file at `path`, keeping any
/// frames of an existing tag that aren't being replaced.
pub fn write(path: &Path, metadata: &Metadata) -> Result<()> {
    let mut tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(error) => {
            if !matches!(error.kind, ErrorKind::NoTag) {
                tracing::debug!(path = %path.display(), %error, "discarding unreadable tag");
            }

            error.partial_tag.unwrap_or_else(Tag::new)
        }
    };

    tag.set_artist(&metadata.artist);
    tag.set_title(&metadata.title);
    if let Some(album) = &metadata.album {
        tag.set_album(album);
    }

    if let Some(cover) = &metadata.cover {
        tag.remove_picture_by_type(PictureType::CoverFront);
        tag.add_frame(Picture {
            mime_type: String::from("image/png"),
            picture_type: PictureType::CoverFront,
            description: String::from("Cover"),
            data: cover.clone(),
        });
    }

    tag.write_to_path(path, Version::Id3v24)?;
    Ok(())
}
