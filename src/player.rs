use eframe::egui::{Align2, Button, Color32, FontId, Response, Sense, Slider, Ui, Vec2};
use log::{error, info, warn};
use rodio::{Decoder, OutputStream, Sink};
use std::{
    fs::File,
    io::{BufReader, Cursor},
    sync::{
        atomic::{AtomicBool, AtomicI32, Ordering},
        Arc,
    },
    thread::{self},
    time::{Duration, Instant},
};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};

use crate::{controller::PlaybackHandle, media_information, Error, InputMode, MediaType, Result};

/// Reflects the current form of the [`Player`]
///
/// Loading: the media is still being probed and cannot play yet
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PlayerState {
    Loading,
    Playing,
    Paused,
    Ended,
    Failed,
}

/// Signals a [`Player`] raises for its owner, drained with [`Player::take_events`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The media was probed and the player takes commands
    Ready,
    /// Playback reached the end of the media
    Ended,
}

/// Holds relevant info to run the player
#[derive(Debug)]
pub struct Player {
    /// Meta data information
    pub media_type: MediaType,
    pub file_input: InputMode,

    /// Player settings
    pub player_state: PlayerState,
    pub autoplay: bool,

    /// Info related to control bar
    pub elapsed_time: Duration,
    pub total_time: Duration,
    fallback_duration: Duration,

    /// Playback information
    stop_playback: Arc<AtomicBool>,
    stopwatch_instant: Option<Instant>,
    start_time: Duration,

    /// Audio related info
    pub volume: Arc<AtomicI32>,

    probe_receiver: Option<UnboundedReceiver<Result<Duration>>>,
    load_error: Option<String>,
    events: Vec<PlayerEvent>,
}

impl Player {
    /// Initializes the [`Player`] from a file on disk
    ///
    /// ``` no_run
    /// use egui_quiz_player::player::Player;
    ///
    /// let player = Player::from_path("your_path_here.mp3");
    /// ```
    /// Use the ``Player.ui()`` function to display it
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnsupportedMedia`] when the extension is not a known audio or video type.
    pub fn from_path(file_path: &str) -> Result<Self> {
        Self::new(InputMode::FilePath(file_path.to_string()))
    }

    /// Initializes the [`Player`] from bytes (``Vec<u8>``), detecting the format from the data
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnsupportedMedia`] when the data is not a known audio or video type.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::new(InputMode::Bytes(bytes))
    }

    fn new(file: InputMode) -> Result<Self> {
        let media_type = media_information::detect_media_type(&file);
        if media_type == MediaType::Unsupported {
            return Err(Error::UnsupportedMedia(file.describe()));
        }
        let mut player = Self {
            media_type,
            file_input: file,
            player_state: PlayerState::Loading,
            autoplay: true,
            elapsed_time: Duration::ZERO,
            total_time: Duration::ZERO,
            fallback_duration: Duration::ZERO,
            stop_playback: Arc::new(AtomicBool::new(true)),
            stopwatch_instant: None,
            start_time: Duration::ZERO,
            volume: Arc::new(AtomicI32::new(100)),
            probe_receiver: None,
            load_error: None,
            events: vec![],
        };
        player.start_probe();
        Ok(player)
    }

    /// Length used when the media does not report its own
    pub fn set_fallback_duration(&mut self, duration: Duration) {
        self.fallback_duration = duration;
    }

    /// Drains the signals raised since the last call
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Why loading failed, when [`PlayerState::Failed`]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Probes the media length off the UI thread when a tokio runtime is around
    fn start_probe(&mut self) {
        let media_type = self.media_type;
        let file_input = self.file_input.clone();
        let (tx_probe, rx_probe) = mpsc::unbounded_channel();
        self.probe_receiver = Some(rx_probe);

        let probe = move || {
            let _ = tx_probe.send(media_information::get_total_time(media_type, &file_input));
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(probe);
            }
            Err(_) => probe(),
        }
    }

    fn poll_probe(&mut self) {
        let received = match self.probe_receiver.as_mut() {
            Some(receiver) => receiver.try_recv(),
            None => return,
        };
        let probe = match received {
            Ok(probe) => probe,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(Error::Audio("media probe was dropped".into())),
        };
        self.probe_receiver = None;

        match probe {
            Ok(duration) => {
                self.total_time = if duration.is_zero() {
                    warn!(
                        "{} does not report its length, using {}",
                        self.file_input.describe(),
                        media_information::format_duration(self.fallback_duration)
                    );
                    self.fallback_duration
                } else {
                    duration
                };
                info!(
                    "{} ready ({})",
                    self.file_input.describe(),
                    media_information::format_duration(self.total_time)
                );
                self.player_state = PlayerState::Paused;
                self.events.push(PlayerEvent::Ready);
                if self.autoplay {
                    self.play_player();
                }
            }
            Err(err) => {
                error!("could not load {}: {err}", self.file_input.describe());
                self.player_state = PlayerState::Failed;
                self.load_error = Some(err.to_string());
            }
        }
    }

    /// Displays bar containing pause/play, video time, draggable bar and volume control
    fn control_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let pause_icon = match self.player_state {
                PlayerState::Playing => "⏸",
                PlayerState::Ended => "↺",
                PlayerState::Paused | PlayerState::Loading | PlayerState::Failed => "▶",
            };
            let controllable = !matches!(
                self.player_state,
                PlayerState::Loading | PlayerState::Failed
            );
            if ui
                .add_enabled(controllable, Button::new(pause_icon))
                .clicked()
            {
                match self.player_state {
                    PlayerState::Playing => self.pause_player(),
                    PlayerState::Paused => self.play_player(),
                    // Restarting the player
                    PlayerState::Ended => {
                        self.elapsed_time = Duration::ZERO;
                        self.play_player();
                    }
                    PlayerState::Loading | PlayerState::Failed => {}
                }
            }

            ui.label(
                media_information::format_duration(self.elapsed_time)
                    + " / "
                    + &media_information::format_duration(self.total_time),
            );

            let mut slider_value = self.elapsed_time.as_secs_f32();
            let slider = Slider::new(&mut slider_value, 0.0..=self.total_time.as_secs_f32())
                .show_value(false);
            let slider_response = ui.add_enabled(controllable, slider);
            if slider_response.drag_started() {
                self.pause_player();
            }
            if slider_response.dragged() {
                self.elapsed_time = Duration::from_secs_f32(slider_value);
            }

            let mut volume = self.volume.load(Ordering::Acquire);

            let volume_icon = if volume > 70 {
                "🔊"
            } else if volume > 40 {
                "🔉"
            } else if volume > 0 {
                "🔈"
            } else {
                "🔇"
            };

            ui.menu_button(volume_icon, |ui| {
                ui.add(Slider::new(&mut volume, 0..=100).vertical())
            });

            self.volume.store(volume, Ordering::Relaxed);

            match self.player_state {
                PlayerState::Loading => {
                    ui.spinner();
                    ui.label("Loading media");
                }
                PlayerState::Failed => {
                    ui.colored_label(Color32::LIGHT_RED, "Could not load media");
                }
                _ => {}
            }
        });
    }

    /// Picture area for video files; frames are not decoded, only the audio track plays
    fn video_panel(&self, ui: &mut Ui) {
        let width = ui.available_width();
        let (rect, _) = ui.allocate_exact_size(Vec2::new(width, width * 9.0 / 16.0), Sense::hover());
        if ui.is_rect_visible(rect) {
            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 8.0, Color32::from_gray(20));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "🎬",
                FontId::proportional(48.0),
                Color32::from_gray(160),
            );
        }
    }

    /// Audio playback
    ///
    /// A stream to play audio is started. It is only stopped when the file reaches the end or the [`Player`] is paused
    fn audio_stream(&mut self) {
        let start_at = self.elapsed_time;
        let file_input = self.file_input.clone();
        let stop_audio = Arc::clone(&self.stop_playback);
        let volume = Arc::clone(&self.volume);
        thread::spawn(move || {
            if let Err(err) = play_audio(file_input, start_at, &stop_audio, &volume) {
                error!("audio playback stopped: {err}");
            }
        });
    }

    fn play_player(&mut self) {
        self.player_state = PlayerState::Playing;
        self.stop_playback = Arc::new(AtomicBool::new(false));
        self.start_time = self.elapsed_time;
        self.stopwatch_instant = Some(Instant::now());
        self.audio_stream();
    }

    fn pause_player(&mut self) {
        self.elapsed_time = self.get_elapsed_time();
        self.player_state = PlayerState::Paused;
        self.stopwatch_instant = None;
        self.stop_playback.store(true, Ordering::Release);
    }

    fn get_elapsed_time(&self) -> Duration {
        let elapsed = match self.stopwatch_instant {
            Some(instant) => instant.elapsed() + self.start_time,
            None => self.elapsed_time,
        };
        if self.total_time.is_zero() {
            elapsed
        } else {
            elapsed.min(self.total_time)
        }
    }

    /// Responsible for keeping track of [`Player::elapsed_time`] and noticing the end of the media
    fn update_clock(&mut self) {
        self.elapsed_time = self.get_elapsed_time();
        if self.player_state == PlayerState::Playing
            && !self.total_time.is_zero()
            && self.elapsed_time >= self.total_time
        {
            self.pause_player();
            self.player_state = PlayerState::Ended;
            info!("{} ended", self.file_input.describe());
            self.events.push(PlayerEvent::Ended);
        }
    }

    /// Advances loading and the playback clock without drawing anything
    pub fn update(&mut self) {
        self.poll_probe();
        self.update_clock();
    }

    /// Call this to show the player on screen
    pub fn ui(&mut self, ui: &mut Ui) -> Response {
        self.update();
        let response = ui
            .vertical(|ui| {
                if self.media_type == MediaType::Video {
                    self.video_panel(ui);
                }
                self.control_bar(ui);
            })
            .response;
        if matches!(self.player_state, PlayerState::Loading | PlayerState::Playing) {
            ui.ctx().request_repaint_after(Duration::from_millis(10));
        }
        response
    }
}

impl PlaybackHandle for Player {
    fn pause(&mut self) {
        if self.player_state == PlayerState::Playing {
            self.pause_player();
        }
    }

    fn resume(&mut self) {
        if self.player_state == PlayerState::Paused {
            self.play_player();
        }
    }

    fn current_position(&self) -> Duration {
        self.get_elapsed_time()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop_playback.store(true, Ordering::Release);
    }
}

/// Runs on the audio thread until `stop_audio` is raised or the media runs out
fn play_audio(
    file_input: InputMode,
    start_at: Duration,
    stop_audio: &AtomicBool,
    volume: &AtomicI32,
) -> Result<()> {
    let (_stream, stream_handle) =
        OutputStream::try_default().map_err(|err| Error::Audio(err.to_string()))?;
    let sink = Sink::try_new(&stream_handle).map_err(|err| Error::Audio(err.to_string()))?;
    match file_input {
        InputMode::FilePath(file_path) => {
            let file = BufReader::new(File::open(file_path)?);
            sink.append(Decoder::new(file)?);
        }
        InputMode::Bytes(bytes) => sink.append(Decoder::new(Cursor::new(bytes))?),
    }
    if let Err(err) = sink.try_seek(start_at) {
        warn!("could not seek to {start_at:?}: {err}");
    }
    while !stop_audio.load(Ordering::Acquire) && !sink.empty() {
        sink.set_volume(volume.load(Ordering::Acquire) as f32 / 100.0);
        thread::sleep(Duration::from_millis(10));
    }
    sink.stop();
    Ok(())
}
