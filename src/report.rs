//! User facing output: spinners for long running steps and debug lines.
//!
//! A [`Reporter`] is created once in `main` and cloned into everything that
//! prints, so whether debug output is shown is decided in a single place.

use std::{
    fmt::Display,
    io::{self, Write},
    time::Duration,
};

use crossterm::style::Stylize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// The environment variable which enables debug output.
pub const DEBUG_VAR: &str = "BEATSTARS_DEBUG";

/// Checks if a value of [`DEBUG_VAR`] means debug output should be shown.
pub fn debug_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|x| matches!(x.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

/// The explicitly passed around output context.
///
/// Every spinner is drawn through the same [`MultiProgress`], and lines are
/// printed with it suspended, so the two never draw over each other.
#[derive(Clone, Debug)]
pub struct Reporter {
    /// Whether debug lines are printed.
    debug: bool,

    /// Whether anything is printed at all, used by tests.
    quiet: bool,

    /// Draws the running spinners.
    bars: MultiProgress,
}

impl Reporter {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            quiet: false,
            bars: MultiProgress::new(),
        }
    }

    /// A reporter which never prints anything.
    pub fn quiet() -> Self {
        Self {
            debug: false,
            quiet: true,
            bars: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        }
    }

    /// Prints a persistent line above any running spinners.
    fn line(&self, text: impl Display) {
        if !self.quiet {
            self.bars.suspend(|| println!("{text}"));
        }
    }

    /// A writer to stderr which keeps clear of the spinners, for log output.
    pub fn writer(&self) -> Suspended {
        Suspended(self.bars.clone())
    }

    /// Starts a spinner, which stays until one of the [`Spinner`]
    /// methods replaces it with a final line.
    pub fn spinner(&self, message: impl Into<String>) -> Spinner {
        let bar = self.bars.add(ProgressBar::new_spinner());
        bar.set_style(ProgressStyle::default_spinner());
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));

        Spinner {
            bar,
            reporter: self.clone(),
        }
    }

    /// Prints the heading shown before an artist's tracks are downloaded.
    pub fn heading(&self, text: &str) {
        self.line("-".repeat(10).white().bold());
        self.line(text.white().bold());
    }

    /// Prints a failure that isn't attached to any spinner.
    pub fn error(&self, text: impl Display) {
        self.line(format!("{} {}", "✖".red(), text.to_string().red().bold()));
    }

    /// Prints a debug line about an error, if debug output is enabled.
    pub fn debug_error(&self, message: &str, error: Option<&dyn Display>) {
        if !self.debug {
            return;
        }

        let mut text = format!("DEBUG: {message}");
        if let Some(error) = error {
            text.push_str(&format!(" - {error}"));
        }

        self.line(format!("{} {}", "🐛".yellow(), text.yellow().dim()));
    }

    /// Prints debug details of a failed track, if debug output is enabled.
    pub fn debug_track_error(
        &self,
        track: &str,
        number: usize,
        total: usize,
        error: &dyn Display,
        url: Option<&str>,
    ) {
        if !self.debug {
            return;
        }

        let mut details = vec![
            format!("Track {number}/{total}: {track}"),
            format!("Error: {error}"),
        ];

        if let Some(url) = url {
            details.push(format!("URL: {url}"));
        }

        let text = format!("DEBUG: Track download error - {}", details.join(" | "));
        self.line(format!("{} {}", "🐛".yellow().dim(), text.yellow().dim()));
    }
}

/// A running spinner.
pub struct Spinner {
    /// The underlying [`indicatif`] spinner.
    bar: ProgressBar,

    /// Where the final line goes.
    reporter: Reporter,
}

impl Spinner {
    /// Stops the spinner, leaving `symbol` and `text` in its place.
    fn persist(self, symbol: impl Display, text: impl Display) {
        self.bar.finish_and_clear();
        self.reporter.bars.remove(&self.bar);
        self.reporter.line(format!("{symbol} {text}"));
    }

    pub fn success(self, text: impl Display) {
        self.persist("✔".green(), text.to_string().green().dim());
    }

    pub fn skip(self, text: impl Display) {
        self.persist("〰".yellow(), text.to_string().yellow().dim());
    }

    pub fn fail(self, text: impl Display) {
        self.persist("✖".red(), text.to_string().red().dim());
    }
}

/// Writes to stderr with the spinners hidden for the duration of each write.
pub struct Suspended(MultiProgress);

impl Write for Suspended {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.suspend(|| io::stderr().write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.suspend(|| io::stderr().flush())
    }
}
