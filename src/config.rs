//! Loading and saving the quiz configuration as TOML.
//!
//! Every field is optional in the file; a missing `questions` array means the
//! built-in lionesses question set.
//!
//! ```toml
//! media = "lions.mp4"
//! duration_secs = 335
//! completion = "require-all"
//!
//! [[questions]]
//! id = 1
//! timestamp = 42.0
//! prompt = "¿Qué estrategia están usando las leonas para cazar?"
//! choices = ["Caza en solitario", "Caza en grupo coordinado"]
//! correct_choice = 1
//! ```

use crate::{
    controller::SessionSettings,
    question::{default_questions, Question, Quiz},
    session::CompletionPolicy,
    Result,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

pub const DEFAULT_DURATION_SECS: f64 = 335.0;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_FEEDBACK_DELAY_MS: u64 = 2000;
pub const DEFAULT_TOAST_LIFETIME_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Media to open when none is given on the command line
    pub media: Option<String>,
    /// Timeline length used when the media does not report one
    pub duration_secs: f64,
    pub poll_interval_ms: u64,
    pub feedback_delay_ms: u64,
    pub toast_lifetime_ms: u64,
    pub autoplay: bool,
    pub completion: CompletionPolicy,
    pub questions: Vec<Question>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            media: None,
            duration_secs: DEFAULT_DURATION_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            feedback_delay_ms: DEFAULT_FEEDBACK_DELAY_MS,
            toast_lifetime_ms: DEFAULT_TOAST_LIFETIME_MS,
            autoplay: true,
            completion: CompletionPolicy::default(),
            questions: default_questions(),
        }
    }
}

impl QuizConfig {
    /// Validated question set
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidQuiz`] when the questions break the ordering or choice rules.
    pub fn quiz(&self) -> Result<Quiz> {
        Ok(Quiz::new(self.questions.clone())?)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            feedback_delay: Duration::from_millis(self.feedback_delay_ms),
            toast_lifetime: Duration::from_millis(self.toast_lifetime_ms),
            completion: self.completion,
        }
    }

    /// `duration_secs` as a [`Duration`], or the default when it is not a usable length
    pub fn fallback_duration(&self) -> Duration {
        match Duration::try_from_secs_f64(self.duration_secs)
            .ok()
            .filter(|duration| !duration.is_zero())
        {
            Some(duration) => duration,
            None => {
                warn!(
                    "duration_secs = {} is not a usable length, using {DEFAULT_DURATION_SECS}",
                    self.duration_secs
                );
                Duration::from_secs_f64(DEFAULT_DURATION_SECS)
            }
        }
    }
}

pub fn load_from_path(path: &Path) -> Result<QuizConfig> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

pub fn save_to_path(config: &QuizConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
