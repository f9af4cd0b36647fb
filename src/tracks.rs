//! Has the records describing each track on an artist page,
//! as well as the naming rules used for the files they're saved to.
//!
//! A [`Track`] is built while scraping, and keeps the title, stream URL
//! and artwork of a single catalog entry together, so that they can't
//! drift apart when one of them is missing on the page.

use std::path::{Path, PathBuf};

pub mod error;
pub mod format;
pub use error::{Error, Kind, Result};

/// A single track scraped from an artist page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// The file-safe display name, also used as the title tag.
    pub name: String,

    /// The URL which serves the raw audio.
    pub stream_url: String,

    /// The URL of the artwork, if the card had an image.
    pub artwork: Option<String>,
}

impl Track {
    /// Where the track will be saved inside of `dir`.
    pub fn path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.mp3", self.name))
    }

    /// Where the track is written to before it's been tagged.
    pub fn partial_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.mp3.part", self.name))
    }

    /// The URLs the audio may be fetched from.
    ///
    /// These are tried from last to first.
    pub fn mirrors(&self) -> Vec<String> {
        vec![self.stream_url.clone()]
    }
}

/// The artwork URLs of every track, in page order.
///
/// This is what's used to find a replacement when a track's own artwork is
/// unavailable.
pub fn artwork(tracks: &[Track]) -> Vec<Option<String>> {
    tracks.iter().map(|x| x.artwork.clone()).collect()
}
