//! A media player for egui that stops at timestamped multiple-choice questions.
//!
//! [`QuizPlayer`] wraps a [`player::Player`] and a [`QuizController`]: once the
//! media is ready the position is polled every second, each question pauses
//! playback when its timestamp is reached, the learner's answer is scored and
//! playback resumes after a short feedback delay. When the media ends a
//! results window shows the score.
//!
//! ``` no_run
//! use egui_quiz_player::{config::QuizConfig, QuizPlayer};
//!
//! # fn build() -> egui_quiz_player::Result<QuizPlayer> {
//! let config = QuizConfig::default();
//! let quiz_player = QuizPlayer::from_path("lions.mp4", &config)?;
//! # Ok(quiz_player)
//! # }
//! ```
//! Then call `quiz_player.ui(ui)` from your `eframe::App::update`.

pub mod config;
pub mod controller;
mod error;
pub mod media_information;
pub mod notification;
pub mod player;
pub mod poller;
pub mod question;
pub mod quiz_player;
pub mod session;

pub use controller::{PlaybackHandle, QuizController, SessionSettings};
pub use error::{Error, Result};
pub use question::{Question, QuestionId, Quiz, QuizError};
pub use quiz_player::QuizPlayer;
pub use session::{CompletionPolicy, Summary};

/// Kind of media, decided from the file extension or the leading bytes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MediaType {
    Audio,
    /// Played through its audio track
    Video,
    Unsupported,
}

/// Where the media comes from
#[derive(Debug, Clone)]
pub enum InputMode {
    FilePath(String),
    Bytes(Vec<u8>),
}

impl InputMode {
    /// Short description for logs and error messages
    pub fn describe(&self) -> String {
        match self {
            InputMode::FilePath(file_path) => file_path.clone(),
            InputMode::Bytes(bytes) => format!("{} bytes of media", bytes.len()),
        }
    }
}
