use eframe::egui::{
    self, Align2, Button, Color32, Context, Frame, Id, Order, Response, RichText, Sense, Ui, Vec2,
};
use log::debug;
use std::time::{Duration, Instant};

use crate::{
    config::QuizConfig,
    controller::QuizController,
    notification::NotificationStyle,
    player::{Player, PlayerEvent},
    question::Quiz,
    session::MarkerStatus,
    Result,
};

const GOLD: Color32 = Color32::from_rgb(212, 160, 23);
const SAND: Color32 = Color32::from_rgb(221, 205, 170);
const GREEN: Color32 = Color32::from_rgb(34, 197, 94);
const RED: Color32 = Color32::from_rgb(239, 68, 68);

/// A [`Player`] that stops at the questions of a [`Quiz`]
///
/// Drop it to end the session: polling stops and the audio thread is told to quit.
#[derive(Debug)]
pub struct QuizPlayer {
    player: Player,
    controller: QuizController,
    fallback_duration: Duration,
}

impl QuizPlayer {
    pub fn new(mut player: Player, quiz: Quiz, config: &QuizConfig) -> Self {
        let fallback_duration = config.fallback_duration();
        player.set_fallback_duration(fallback_duration);
        player.autoplay = config.autoplay;
        Self {
            player,
            controller: QuizController::new(quiz, config.session_settings()),
            fallback_duration,
        }
    }

    /// # Errors
    ///
    /// Fails when the media type is unsupported or the configured questions are invalid.
    pub fn from_path(file_path: &str, config: &QuizConfig) -> Result<Self> {
        let quiz = config.quiz()?;
        Ok(Self::new(Player::from_path(file_path)?, quiz, config))
    }

    /// # Errors
    ///
    /// Fails when the media type is unsupported or the configured questions are invalid.
    pub fn from_bytes(bytes: Vec<u8>, config: &QuizConfig) -> Result<Self> {
        let quiz = config.quiz()?;
        Ok(Self::new(Player::from_bytes(bytes)?, quiz, config))
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn controller(&self) -> &QuizController {
        &self.controller
    }

    fn timeline_duration(&self) -> Duration {
        if self.player.total_time.is_zero() {
            self.fallback_duration
        } else {
            self.player.total_time
        }
    }

    fn route_player_events(&mut self, now: Instant) {
        for event in self.player.take_events() {
            debug!("player event {event:?}");
            match event {
                PlayerEvent::Ready => self.controller.player_ready(now, &mut self.player),
                PlayerEvent::Ended => self.controller.player_ended(now, &mut self.player),
            }
        }
    }

    /// Progress bar with a marker for every question
    fn timeline(&self, ui: &mut Ui) {
        let width = ui.available_width();
        let (rect, _) = ui.allocate_exact_size(Vec2::new(width, 16.0), Sense::hover());
        if !ui.is_rect_visible(rect) {
            return;
        }
        let painter = ui.painter_at(rect);
        let bar = rect.shrink2(Vec2::new(6.0, 4.0));
        painter.rect_filled(bar, 4.0, SAND.gamma_multiply(0.3));

        let duration = self.timeline_duration();
        let state = self.controller.state();
        let progress = (state.current_time() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32;
        let mut filled = bar;
        filled.set_width(bar.width() * progress);
        painter.rect_filled(filled, 4.0, GOLD);

        for question in self.controller.quiz().questions() {
            let x = bar.left() + bar.width() * Quiz::marker_fraction(question, duration);
            let colour = match state.marker_status(question.id) {
                MarkerStatus::Completed => GREEN,
                MarkerStatus::Active => GOLD,
                MarkerStatus::Pending => SAND,
            };
            painter.circle_filled(egui::pos2(x, bar.center().y), 6.0, colour);
        }
    }

    fn question_card(&mut self, ui: &mut Ui, now: Instant) {
        let state = self.controller.state();
        if state.is_finished() {
            return;
        }
        let Some(question) = state
            .active()
            .and_then(|id| self.controller.quiz().get(id))
            .cloned()
        else {
            return;
        };
        let selected = state.selected();

        let mut picked = None;
        Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading(question.prompt.as_str());
            ui.add_space(8.0);
            for (index, choice) in question.choices.iter().enumerate() {
                let mut button = Button::new(choice.as_str())
                    .min_size(Vec2::new(ui.available_width(), 32.0));
                if selected == Some(index) {
                    button = button.fill(if question.is_correct(index) { GREEN } else { RED });
                }
                if ui.add_enabled(selected.is_none(), button).clicked() {
                    picked = Some(index);
                }
            }
        });

        if let Some(choice) = picked {
            self.controller.submit(choice, now, &mut self.player);
        }
    }

    fn results_window(&mut self, ctx: &Context) {
        let Some(summary) = self.controller.state().summary(self.controller.quiz()) else {
            return;
        };
        let mut open = self.controller.results_open();
        if !open {
            return;
        }
        egui::Window::new("Resultados del Quiz")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(summary.headline());
                let colour = if summary.is_perfect() { GREEN } else { GOLD };
                ui.colored_label(colour, summary.message());
            });
        if !open {
            self.controller.dismiss_results();
        }
    }

    fn toasts(&self, ctx: &Context) {
        let toasts = self.controller.toasts();
        if toasts.is_empty() {
            return;
        }
        egui::Area::new(Id::new("quiz_player_toasts"))
            .anchor(Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .order(Order::Foreground)
            .show(ctx, |ui| {
                for notification in toasts.iter() {
                    let fill = match notification.style {
                        NotificationStyle::Prompt => GOLD,
                        NotificationStyle::Success => GREEN,
                        NotificationStyle::Failure => RED,
                    };
                    Frame::none()
                        .fill(fill)
                        .rounding(6.0)
                        .inner_margin(8.0)
                        .show(ui, |ui| {
                            ui.label(
                                RichText::new(&notification.title)
                                    .strong()
                                    .color(Color32::WHITE),
                            );
                            ui.label(
                                RichText::new(&notification.description).color(Color32::WHITE),
                            );
                        });
                    ui.add_space(4.0);
                }
            });
    }

    /// Call this to show the player, the timeline and the quiz overlays on screen
    pub fn ui(&mut self, ui: &mut Ui) -> Response {
        let now = Instant::now();
        let response = self.player.ui(ui);
        self.route_player_events(now);
        self.controller.update(now, &mut self.player);

        ui.add_space(8.0);
        self.timeline(ui);
        ui.add_space(8.0);
        self.question_card(ui, now);
        self.results_window(ui.ctx());
        self.toasts(ui.ctx());

        if let Some(wait) = self.controller.next_wakeup(now) {
            ui.ctx().request_repaint_after(wait);
        }
        response
    }
}

impl Drop for QuizPlayer {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}
