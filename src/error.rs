pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("doesn't look like a beatstars.com url: {0}")]
    NotBeatStars(String),

    #[error("the url {0} returns 404")]
    NotFound(String),

    #[error("artist name not found")]
    ArtistName,

    #[error("please supply a txt file: {0}")]
    ListFile(String),

    #[error("no webdriver session could be started ({})", .0.join("; "))]
    NoBrowser(Vec<String>),

    #[error("webdriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("unable to fetch data: {0}")]
    Request(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("home directory not found")]
    Directory,
}
