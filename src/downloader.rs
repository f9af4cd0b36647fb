//! The pipeline which takes an artist page all the way to tagged files on disk.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{
    audio,
    fetch::Fetcher,
    links,
    render::Render,
    report::Reporter,
    scrape::Page,
    tag::{self, Metadata},
    tracks::{self, error::WithTrackContext as _, Track},
};

/// Settings which apply to every artist in a run.
#[derive(Debug, Clone)]
pub struct Options {
    /// The directory containing each artist's folder.
    pub output: PathBuf,

    /// An album name to tag every track with, mostly for sorting.
    pub album: Option<String>,

    /// Whether existing files are downloaded again.
    pub overwrite: bool,

    /// The endpoint tracks are streamed from.
    pub stream_base: String,
}

/// What happened to a track that didn't fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Downloaded, tagged & written.
    Saved(PathBuf),

    /// Already present, and left alone.
    Skipped(PathBuf),
}

/// Counts of what happened to an artist's tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    /// Adds the counts of another summary to this one.
    pub fn merge(&mut self, other: Self) {
        self.saved += other.saved;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// A scraped artist page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    /// The file-safe artist name, also used for their folder.
    pub name: String,

    /// Every track found on the page.
    pub tracks: Vec<Track>,
}

impl Artist {
    /// Extracts the artist from a rendered page at `url`.
    pub fn parse(url: &str, html: &str, stream_base: &str) -> crate::Result<Self> {
        let page = Page::parse(html);
        if page.not_found() {
            return Err(crate::Error::NotFound(url.to_owned()));
        }

        Ok(Self {
            name: page.artist()?,
            tracks: page.tracks(stream_base),
        })
    }
}

/// Has everything needed to download artists.
pub struct Downloader<R> {
    /// Renders artist pages.
    renderer: R,

    /// Downloads audio & artwork.
    fetcher: Fetcher,

    /// Run-wide settings.
    options: Options,

    /// Where progress is reported.
    reporter: Reporter,
}

impl<R: Render> Downloader<R> {
    pub const fn new(renderer: R, fetcher: Fetcher, options: Options, reporter: Reporter) -> Self {
        Self {
            renderer,
            fetcher,
            options,
            reporter,
        }
    }

    /// Loads an artist's page, from either a URL or just their name.
    ///
    /// Anything that doesn't end up pointing at beatstars.com is
    /// rejected before the browser is even started.
    pub async fn load(&self, input: &str) -> crate::Result<Artist> {
        let url = links::artist_page(input)?;
        let html = self.renderer.render(&url).await?;

        Artist::parse(&url, &html, &self.options.stream_base)
    }

    /// Downloads every track by an artist.
    pub async fn artist(&self, input: &str) -> crate::Result<Summary> {
        let artist = self.load(input).await?;
        let dir = self.options.output.join(&artist.name);
        fs::create_dir_all(&dir).await?;

        Ok(self.download_tracks(&artist, &dir).await)
    }

    /// Downloads the tracks of an already loaded artist into `dir`.
    pub async fn download_tracks(&self, artist: &Artist, dir: &Path) -> Summary {
        let total = artist.tracks.len();
        self.reporter
            .heading(&format!("Downloading {total} tracks by {}:", artist.name));

        let mut summary = Summary::default();
        for (index, track) in artist.tracks.iter().enumerate() {
            let number = index + 1;
            let spinner = self.reporter.spinner(format!(
                "Downloading track {number} of {total}: {}...",
                track.name
            ));

            match self.download_track(artist, index, dir).await {
                Ok(Outcome::Saved(path)) => {
                    summary.saved += 1;
                    spinner.success(format!("{number} Saved {} {}", track.name, path.display()));
                }
                Ok(Outcome::Skipped(path)) => {
                    summary.skipped += 1;
                    spinner.skip(format!("{number} • {} already exists, skipping...", path.display()));
                }
                Err(error) => {
                    summary.failed += 1;
                    let hint = if error.timeout() { " (timed out)" } else { "" };
                    spinner.fail(format!("{number} Error{hint}, skipping {}", track.name));
                    self.reporter.debug_track_error(
                        &track.name,
                        number,
                        total,
                        &error,
                        Some(&track.stream_url),
                    );
                }
            }
        }

        summary
    }

    /// Downloads, tags & saves a single track.
    ///
    /// The artwork of other tracks is used as a replacement when the
    /// track's own artwork can't be fetched.
    pub async fn download_track(
        &self,
        artist: &Artist,
        index: usize,
        dir: &Path,
    ) -> tracks::Result<Outcome> {
        let track = &artist.tracks[index];
        let path = track.path(dir);

        if !self.options.overwrite && fs::try_exists(&path).await.track(&track.name)? {
            return Ok(Outcome::Skipped(path));
        }

        let data = self
            .fetcher
            .test_urls(&track.mirrors())
            .await
            .map_err(|e| e.named(&track.name))?;

        let data = audio::prepare(data)
            .await
            .map_err(|e| e.named(&track.name))?;

        let cover = match self
            .fetcher
            .artwork(&tracks::artwork(&artist.tracks), index)
            .await
        {
            Some(art) => tag::cover_png(&art)
                .inspect_err(|error| {
                    self.reporter
                        .debug_error(&format!("unusable artwork for {}", track.name), Some(error));
                })
                .ok(),
            None => None,
        };

        let metadata = Metadata {
            title: track.name.clone(),
            artist: artist.name.clone(),
            album: self.options.album.clone(),
            cover,
        };

        let partial = track.partial_path(dir);
        let saved = Self::save(&partial, &path, &data, &metadata).await;
        if saved.is_err() {
            if let Err(error) = fs::remove_file(&partial).await {
                tracing::debug!(path = %partial.display(), %error, "couldn't remove partial file");
            }
        }

        saved.map_err(|e| e.named(&track.name))?;
        Ok(Outcome::Saved(path))
    }

    /// Writes & tags the audio next to `path`, and only moves it into
    /// place once it's complete.
    ///
    /// This way a failed write never leaves a file which later runs
    /// would skip.
    async fn save(
        partial: &Path,
        path: &Path,
        data: &[u8],
        metadata: &Metadata,
    ) -> tracks::Result<()> {
        fs::write(partial, data).await?;
        tag::write(partial, metadata)?;
        fs::rename(partial, path).await?;

        Ok(())
    }
}
