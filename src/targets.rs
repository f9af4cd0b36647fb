//! Working out what the user asked to download: a single artist, or a
//! text file listing several of them.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use tokio::fs;

use crate::{
    downloader::{Downloader, Summary},
    links,
    render::Render,
    report::Reporter,
};

/// What a run downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An artist URL or name.
    Artist(String),

    /// A `.txt` file with one artist per line.
    List(PathBuf),
}

impl Target {
    /// Parses user input into a [`Target`].
    ///
    /// Local files are only accepted if they're `.txt` files.
    pub fn parse(input: &str) -> crate::Result<Self> {
        let input = input.trim();
        if !links::is_local(input) {
            return Ok(Self::Artist(input.to_owned()));
        }

        let path = input.strip_prefix("file://").unwrap_or(input);
        if Path::new(path).extension().is_some_and(|x| x == "txt") {
            Ok(Self::List(PathBuf::from(path)))
        } else {
            Err(crate::Error::ListFile(input.to_owned()))
        }
    }
}

/// Parses the contents of a list file, skipping blank & repeated lines.
pub fn parse_list(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    text.lines()
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .filter(|x| seen.insert(*x))
        .map(ToOwned::to_owned)
        .collect()
}

/// Reads a list file from disk.
pub async fn read_list(path: &Path) -> crate::Result<Vec<String>> {
    let text = fs::read_to_string(path).await?;
    Ok(parse_list(&text))
}

/// Downloads everything a [`Target`] refers to.
///
/// A single artist fails the whole run, but a failure on one artist from a
/// list is only reported, so that the rest can still be downloaded.
pub async fn run<R: Render>(
    target: &Target,
    downloader: &Downloader<R>,
    reporter: &Reporter,
) -> crate::Result<Summary> {
    match target {
        Target::Artist(input) => downloader.artist(input).await,
        Target::List(path) => {
            let mut summary = Summary::default();
            for artist in read_list(path).await? {
                match downloader.artist(&artist).await {
                    Ok(result) => summary.merge(result),
                    Err(error) => reporter.error(format!("{artist}: {error}")),
                }
            }

            Ok(summary)
        }
    }
}
