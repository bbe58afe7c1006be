use rodio::{source::Source, Decoder};
use std::{
    fs::File,
    io::{BufReader, Cursor},
    path::Path,
    time::Duration,
};

use crate::{Error, InputMode, MediaType, Result};

/// Formats [`Duration`] into a [`String`] with HH:MM:SS or MM:SS depending on inputted [`Duration`]
///
/// # Examples
///
/// ``` rust
/// use egui_quiz_player::media_information;
/// use std::time::Duration;
///
/// assert_eq!(media_information::format_duration(Duration::from_secs(64)), "01:04");
/// assert_eq!(media_information::format_duration(Duration::from_secs(5422)), "01:30:22");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs() % 60;
    let minutes = (duration.as_secs() / 60) % 60;
    let hours = (duration.as_secs() / 60) / 60;
    if hours >= 1 {
        format!("{hours:0>2}:{minutes:0>2}:{seconds:0>2}")
    } else {
        format!("{minutes:0>2}:{seconds:0>2}")
    }
}

/// Checks file extension of passed in file path / extension to determine if it is an audio or video file
///
/// # Examples
///
/// ``` rust
/// use egui_quiz_player::{media_information, MediaType};
///
/// assert_eq!(media_information::get_media_type("lions.mp4"), MediaType::Video);
/// assert_eq!(media_information::get_media_type("mp3"), MediaType::Audio);
/// ```
pub fn get_media_type(file_path: &str) -> MediaType {
    let mut ext = Some(file_path);
    if file_path.contains('.') {
        ext = Path::new(&file_path)
            .extension()
            .and_then(|ext| ext.to_str());
    }

    match ext {
        Some(extension) => match extension.to_lowercase().as_str() {
            "mp4" | "m4v" | "mov" | "mkv" | "webm" => MediaType::Video,
            "mp3" | "wav" | "m4a" | "flac" | "ogg" => MediaType::Audio,
            _ => MediaType::Unsupported,
        },
        None => MediaType::Unsupported,
    }
}

/// Detects the media type of an [`InputMode`], sniffing magic numbers for raw bytes
pub fn detect_media_type(input: &InputMode) -> MediaType {
    match input {
        InputMode::FilePath(file_path) => get_media_type(file_path),
        InputMode::Bytes(bytes) => match infer::get(bytes) {
            Some(kind) => get_media_type(kind.extension()),
            None => MediaType::Unsupported,
        },
    }
}

fn is_mp3(input: &InputMode) -> bool {
    match input {
        InputMode::FilePath(file_path) => Path::new(file_path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3")),
        InputMode::Bytes(bytes) => infer::get(bytes).is_some_and(|kind| kind.extension() == "mp3"),
    }
}

/// Gets the length of a supported media in [`Duration`] format
///
/// Video files are measured through their audio track. Returns [`Duration::ZERO`]
/// when the container does not report a length.
///
/// # Errors
///
/// Fails when the media type is unsupported, the file cannot be read or no
/// decoder accepts the data.
pub fn get_total_time(media_type: MediaType, input: &InputMode) -> Result<Duration> {
    if media_type == MediaType::Unsupported {
        return Err(Error::UnsupportedMedia(input.describe()));
    }

    let mp3_duration = if is_mp3(input) {
        match input {
            InputMode::FilePath(file_path) => mp3_duration::from_path(file_path).ok(),
            InputMode::Bytes(bytes) => mp3_duration::from_read(&mut Cursor::new(bytes)).ok(),
        }
    } else {
        None
    };

    let mut duration = match mp3_duration {
        Some(duration) => duration,
        None => match input {
            InputMode::FilePath(file_path) => {
                let file = BufReader::new(File::open(file_path)?);
                Decoder::new(file)?.total_duration().unwrap_or(Duration::ZERO)
            }
            InputMode::Bytes(bytes) => Decoder::new(Cursor::new(bytes.clone()))?
                .total_duration()
                .unwrap_or(Duration::ZERO),
        },
    };

    if duration != Duration::ZERO {
        duration += Duration::from_secs(1);
    }
    Ok(duration)
}
