//! The browser setups which are tried, in order, when starting a WebDriver session.

use fantoccini::{wd::Capabilities, Client, ClientBuilder};
use serde_json::{json, Value};

use crate::report::Reporter;

/// Where geckodriver listens by default.
pub const GECKODRIVER: &str = "http://localhost:4444";

/// Where chromedriver listens by default.
pub const CHROMEDRIVER: &str = "http://localhost:9515";

/// A single browser setup that may or may not be available.
#[derive(Debug, Clone)]
pub struct Probe {
    /// A short description, used in logs & errors.
    pub name: &'static str,

    /// The WebDriver server to connect to.
    pub endpoint: String,

    /// The capabilities requested for the session.
    pub capabilities: Capabilities,
}

impl Probe {
    /// Creates a probe from a JSON capabilities object.
    fn new(name: &'static str, endpoint: &str, capabilities: Value) -> Self {
        let capabilities = match capabilities {
            Value::Object(map) => map,
            _ => Capabilities::new(),
        };

        Self {
            name,
            endpoint: endpoint.to_owned(),
            capabilities,
        }
    }

    /// Headless Firefox, through geckodriver.
    pub fn firefox(endpoint: &str) -> Self {
        Self::new(
            "headless firefox",
            endpoint,
            json!({
                "browserName": "firefox",
                "moz:firefoxOptions": { "args": ["-headless"] },
            }),
        )
    }

    /// Headless Chrome through chromedriver, using either the
    /// current headless mode or the legacy one.
    pub fn chrome(endpoint: &str, legacy: bool) -> Self {
        let (name, headless) = if legacy {
            ("headless chrome (legacy)", "--headless")
        } else {
            ("headless chrome", "--headless=new")
        };

        Self::new(
            name,
            endpoint,
            json!({
                "browserName": "chrome",
                "goog:chromeOptions": { "args": [headless, "--disable-gpu", "--no-sandbox"] },
            }),
        )
    }

    /// Attempts to open a session with this setup.
    pub async fn connect(&self) -> Result<Client, fantoccini::error::NewSessionError> {
        ClientBuilder::native()
            .capabilities(self.capabilities.clone())
            .connect(&self.endpoint)
            .await
    }
}

/// The default probe order.
///
/// If `endpoint` is given, every probe connects there instead
/// of the usual driver port.
pub fn defaults(endpoint: Option<&str>) -> Vec<Probe> {
    vec![
        Probe::firefox(endpoint.unwrap_or(GECKODRIVER)),
        Probe::chrome(endpoint.unwrap_or(CHROMEDRIVER), false),
        Probe::chrome(endpoint.unwrap_or(CHROMEDRIVER), true),
    ]
}

/// Goes through `probes` in order and returns the first session which could be opened.
pub async fn connect(probes: &[Probe], reporter: &Reporter) -> crate::Result<Client> {
    let mut failures = Vec::with_capacity(probes.len());

    for probe in probes {
        match probe.connect().await {
            Ok(client) => {
                tracing::debug!(probe = probe.name, endpoint = %probe.endpoint, "webdriver session started");
                return Ok(client);
            }
            Err(error) => {
                reporter.debug_error(
                    &format!("{} at {} unavailable", probe.name, probe.endpoint),
                    Some(&error),
                );
                failures.push(format!("{} at {}: {error}", probe.name, probe.endpoint));
            }
        }
    }

    Err(crate::Error::NoBrowser(failures))
}
