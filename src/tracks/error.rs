pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Kind {
    /// Every mirror failed, holding the error of the last one tried.
    #[error("no mirror returned the track{}", .0.as_ref().map_or(String::new(), |e| format!(": {e}")))]
    Unavailable(Option<reqwest::Error>),

    #[error("payload isn't audio")]
    NotAudio,

    #[error("transcoding failed: {0}")]
    Transcode(String),

    #[error("unable to read or write file: {0}")]
    File(#[from] std::io::Error),

    #[error("unable to tag file: {0}")]
    Tag(#[from] id3::Error),

    #[error("unable to convert artwork: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, thiserror::Error)]
#[error("{kind}{}", self.track.as_ref().map_or(String::new(), |t| format!(" (track: {t:?})")))]
pub struct Error {
    pub track: Option<String>,
    pub kind: Kind,
}

impl Error {
    /// Sets the track this error happened on.
    #[must_use]
    pub fn named(self, track: impl Into<String>) -> Self {
        Self {
            track: Some(track.into()),
            kind: self.kind,
        }
    }

    /// Whether the last mirror gave up because of the timeout.
    pub fn timeout(&self) -> bool {
        if let Kind::Unavailable(Some(x)) = &self.kind {
            x.is_timeout()
        } else {
            false
        }
    }
}

impl<E> From<E> for Error
where
    Kind: From<E>,
{
    fn from(err: E) -> Self {
        Self {
            track: None,
            kind: Kind::from(err),
        }
    }
}

/// Attaches the name of the track being processed to an error.
pub trait WithTrackContext<T> {
    fn track(self, name: impl Into<String>) -> Result<T>;
}

impl<T, E> WithTrackContext<T> for std::result::Result<T, E>
where
    E: Into<Kind>,
{
    fn track(self, name: impl Into<String>) -> std::result::Result<T, Error> {
        self.map_err(|e| Error {
            track: Some(name.into()),
            kind: e.into(),
        })
    }
}
