//! Fetching track audio & artwork, falling back across mirrors.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderValue, ORIGIN, REFERER},
    Client,
};

use crate::tracks::{self, Kind};

/// The site, sent as both the origin and referer so that the stream
/// endpoint doesn't serve its hotlinking page instead of audio.
const SITE: &str = "https://www.beatstars.com";

/// Holds the [`reqwest`] client used for every download.
#[derive(Clone)]
pub struct Fetcher {
    /// The shared client.
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher with a browser-like user agent.
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_static(SITE));
        headers.insert(REFERER, HeaderValue::from_static("https://www.beatstars.com/"));

        let client = Client::builder()
            .user_agent("Mozilla/5.0")
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Downloads the body of a URL, treating any non-success status as an error.
    pub async fn get(&self, url: &str) -> reqwest::Result<Bytes> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.bytes().await
    }

    /// Tries each URL starting from the *last* one, and returns the
    /// first body that could be downloaded.
    ///
    /// Some tracks just aren't available from every server, so failures
    /// here are expected and only logged. If none work, the error of the
    /// last attempt is kept so that timeouts can be told apart.
    pub async fn test_urls(&self, urls: &[String]) -> tracks::Result<Bytes> {
        let mut last = None;
        for url in urls.iter().rev() {
            match self.get(url).await {
                Ok(data) => return Ok(data),
                Err(error) => {
                    tracing::debug!(url = %url, %error, "mirror failed");
                    last = Some(error.without_url());
                }
            }
        }

        Err(Kind::Unavailable(last).into())
    }

    /// Downloads artwork for the track at `index`.
    ///
    /// If its own artwork fails, the artwork of the following tracks is
    /// tried in turn, wrapping around to the start of the list.
    pub async fn artwork(&self, artwork: &[Option<String>], index: usize) -> Option<Bytes> {
        for url in rotate(artwork, index) {
            match self.get(url).await {
                Ok(data) => return Some(data),
                Err(error) => tracing::debug!(url = %url, %error, "artwork failed"),
            }
        }

        None
    }
}

/// Iterates over the present entries of `items`, beginning at `start` and wrapping around.
pub fn rotate(items: &[Option<String>], start: usize) -> impl Iterator<Item = &str> {
    let start = if items.is_empty() { 0 } else { start % items.len() };
    let (before, after) = items.split_at(start);

    after.iter().chain(before).filter_map(|x| x.as_deref())
}
