use thiserror::Error;

use crate::question::QuizError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("could not write configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error(transparent)]
    InvalidQuiz(#[from] QuizError),

    #[error("unsupported media: {0}")]
    UnsupportedMedia(String),

    #[error("could not decode media: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("audio output failed: {0}")]
    Audio(String),
}
