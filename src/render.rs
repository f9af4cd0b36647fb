//! Rendering artist pages, which need JavaScript to show their tracks.
//!
//! The catalog is lazily loaded as the page is scrolled, so the page is
//! scrolled to the bottom repeatedly until its height stops changing before
//! the DOM is captured.

use std::time::Duration;

use fantoccini::Client;

use crate::report::Reporter;

pub mod probe;
pub use probe::Probe;

/// Anything which can turn a URL into a fully rendered HTML snapshot.
#[allow(async_fn_in_trait)]
pub trait Render {
    async fn render(&self, url: &str) -> crate::Result<String>;
}

/// How the lazily loaded catalog is scrolled through.
#[derive(Debug, Clone, Copy)]
pub struct Scroll {
    /// How long to wait for more tracks after each scroll.
    pub delay: Duration,

    /// The most times the page will be scrolled.
    pub rounds: usize,
}

impl Default for Scroll {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(3),
            rounds: 200,
        }
    }
}

/// Renders pages with a real browser over WebDriver.
pub struct Browser {
    /// The setups to try, in order.
    probes: Vec<Probe>,

    /// Scrolling behaviour.
    scroll: Scroll,

    /// Where progress is reported.
    reporter: Reporter,
}

impl Browser {
    pub const fn new(probes: Vec<Probe>, scroll: Scroll, reporter: Reporter) -> Self {
        Self {
            probes,
            scroll,
            reporter,
        }
    }

    /// Gets the current height of the document.
    async fn height(client: &Client) -> crate::Result<i64> {
        let value = client
            .execute("return document.body.scrollHeight", vec![])
            .await?;

        Ok(value.as_f64().unwrap_or_default().round() as i64)
    }

    /// Scrolls to the bottom until no new content shows up.
    async fn scroll_down(&self, client: &Client) -> crate::Result<()> {
        let mut last = Self::height(client).await?;

        for _ in 0..self.scroll.rounds {
            client
                .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
                .await?;
            tokio::time::sleep(self.scroll.delay).await;

            let height = Self::height(client).await?;
            if height == last {
                break;
            }

            last = height;
        }

        Ok(())
    }

    /// Loads `url` in an open session and captures the DOM.
    async fn snapshot(&self, client: &Client, url: &str) -> crate::Result<String> {
        client.goto(url).await?;
        self.scroll_down(client).await?;

        Ok(client.source().await?)
    }
}

impl Render for Browser {
    async fn render(&self, url: &str) -> crate::Result<String> {
        let spinner = self.reporter.spinner("Starting WebDriver...");
        let client = match probe::connect(&self.probes, &self.reporter).await {
            Ok(client) => client,
            Err(error) => {
                spinner.fail("Couldn't start a WebDriver session...");
                return Err(error);
            }
        };

        let result = self.snapshot(&client, url).await;
        if let Err(error) = client.close().await {
            self.reporter
                .debug_error("couldn't close webdriver session", Some(&error));
        }

        match &result {
            Ok(_) => spinner.success("WebDriver page loaded..."),
            Err(error) => spinner.fail(format!("Couldn't load {url}: {error}")),
        }

        result
    }
}
