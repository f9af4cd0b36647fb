//! Downloads every track on a BeatStars artist page as a tagged mp3.
pub mod error;
use std::{path::PathBuf, time::Duration};

use clap::Parser;
pub use error::{Error, Result};
use tracing_subscriber::EnvFilter;

pub mod audio;
pub mod downloader;
pub mod fetch;
pub mod links;
pub mod render;
pub mod report;
pub mod scrape;
pub mod tag;
pub mod targets;
pub mod tracks;

use crate::{
    downloader::{Downloader, Options},
    fetch::Fetcher,
    render::{probe, Browser, Scroll},
    report::Reporter,
    targets::Target,
};

/// Downloads every track on a BeatStars artist page as a tagged mp3.
#[derive(Parser, Clone)]
#[command(about, version)]
pub struct Args {
    /// Artist name, artist page URL, or a .txt file with one per line.
    target: String,

    /// Directory to save to, as <dir>/<artist>/<track>.mp3.
    #[clap(long, short = 'd', alias = "directory")]
    dir: Option<PathBuf>,

    /// Album name for the ID3 tags, for sorting.
    #[clap(long, short)]
    album: Option<String>,

    /// Download tracks again even if they already exist.
    #[clap(long, short)]
    overwrite: bool,

    /// Timeout in seconds for downloads.
    #[clap(long, default_value_t = 30)]
    timeout: u64,

    /// WebDriver server to use instead of the usual geckodriver/chromedriver ports.
    #[clap(long, env = "BEATSTARS_WEBDRIVER")]
    webdriver: Option<String>,

    /// Seconds to wait for more tracks to load after each scroll.
    #[clap(long, default_value_t = 3)]
    scroll_delay: u64,

    /// Print debug information about failures.
    #[clap(long)]
    debug: bool,
}

/// Gets the default output directory, `~/beatstarsdownloader`.
pub fn output_dir() -> crate::Result<PathBuf> {
    let dir = dirs::home_dir()
        .ok_or(Error::Directory)?
        .join("beatstarsdownloader");

    Ok(dir)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();

    let debug = args.debug || report::debug_enabled(std::env::var(report::DEBUG_VAR).ok().as_deref());
    let reporter = Reporter::new(debug);
    if debug {
        let output = reporter.clone();
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("beatstarsdownloader=debug"))
            .with_writer(move || output.writer())
            .init();
    }

    let target = Target::parse(&args.target)?;

    let output = match args.dir {
        Some(dir) => dir,
        None => output_dir()?,
    };

    let options = Options {
        output,
        album: args.album.filter(|x| !x.trim().is_empty()),
        overwrite: args.overwrite,
        stream_base: String::from(links::STREAM_BASE),
    };

    let scroll = Scroll {
        delay: Duration::from_secs(args.scroll_delay),
        ..Scroll::default()
    };

    let browser = Browser::new(
        probe::defaults(args.webdriver.as_deref()),
        scroll,
        reporter.clone(),
    );

    let fetcher = Fetcher::new(Duration::from_secs(args.timeout))?;
    let downloader = Downloader::new(browser, fetcher, options, reporter.clone());

    let summary = targets::run(&target, &downloader, &reporter).await?;
    tracing::debug!(?summary, "finished");
    reporter.heading(&format!(
        "Done: {} saved, {} skipped, {} failed",
        summary.saved, summary.skipped, summary.failed
    ));

    Ok(())
}
