use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The upstream byte stream was absent or unusable. This is the one
    /// fatal condition: a turn cannot start without a readable body.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
