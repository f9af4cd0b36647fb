//! Helpers for telling apart, normalizing & deriving the URLs
//! that the downloader works with.

use std::path::{Path, PathBuf};

use url::Url;

/// The default endpoint which serves raw track audio.
pub const STREAM_BASE: &str = "https://main.v2.beatstars.com/stream";

/// The site root, used for bare artist names.
const SITE: &str = "https://www.beatstars.com";

/// Checks whether `input` refers to a local file rather than a web URL.
///
/// Only inputs without a scheme, or with a `file` scheme, are considered,
/// and even then the path actually has to exist.
pub fn is_local(input: &str) -> bool {
    let path = match Url::parse(input) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
        Ok(_) => None,
        Err(_) => Some(PathBuf::from(input)),
    };

    path.is_some_and(|x| Path::new(&x).exists())
}

/// Checks whether a URL points at beatstars.com.
pub fn is_bs_url(url: &str) -> bool {
    url.starts_with("https://beatstars.com/") || url.starts_with("https://www.beatstars.com/")
}

/// Turns user input into the URL of an artist's track listing.
///
/// Anything which isn't already an absolute URL is treated as an artist
/// name, for example `someone` becomes `https://www.beatstars.com/someone/tracks`.
pub fn artist_page(input: &str) -> crate::Result<String> {
    let input = input.trim();
    let url = match Url::parse(input) {
        Ok(url) if url.has_host() => input.to_owned(),
        _ => format!("{SITE}/{input}/tracks"),
    };

    if !is_bs_url(&url) {
        return Err(crate::Error::NotBeatStars(url));
    }

    Ok(url)
}

/// Derives the stream URL of a track from the `href` of its link.
///
/// Links look like `/TK12345678`, and the leading `/`, `T` & `K` characters
/// are all stripped to get the bare id.
pub fn stream_url(base: &str, href: &str) -> Option<String> {
    let id = href
        .trim()
        .trim_start_matches(|c| matches!(c, '/' | 'T' | 'K'));

    if id.is_empty() {
        return None;
    }

    Some(format!("{base}?id={id}&return=audio"))
}
