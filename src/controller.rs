use std::time::{Duration, Instant};

use log::debug;

use crate::{
    notification::Toasts,
    poller::{Deadlines, Poller},
    question::{QuestionId, Quiz},
    session::{CompletionPolicy, Effect, Event, SessionState, Transition},
};

/// Commands the quiz needs from whatever is playing the media
pub trait PlaybackHandle {
    fn pause(&mut self);
    fn resume(&mut self);
    fn current_position(&self) -> Duration;
}

/// Timing knobs of a quiz session
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    pub feedback_delay: Duration,
    pub toast_lifetime: Duration,
    pub completion: CompletionPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            feedback_delay: Duration::from_secs(2),
            toast_lifetime: Duration::from_secs(3),
            completion: CompletionPolicy::default(),
        }
    }
}

/// Drives a [`SessionState`] against a player.
///
/// Owns the poll timer, the pending feedback timers and the toasts, and turns
/// every [`Effect`] of a transition into a call on the [`PlaybackHandle`] or
/// one of those. The caller supplies `now`, so the controller works the same
/// under egui and in tests.
#[derive(Debug)]
pub struct QuizController {
    quiz: Quiz,
    state: SessionState,
    poller: Poller,
    feedback: Deadlines<QuestionId>,
    feedback_delay: Duration,
    toasts: Toasts,
    results_open: bool,
}

impl QuizController {
    pub fn new(quiz: Quiz, settings: SessionSettings) -> Self {
        Self {
            quiz,
            state: SessionState::new(settings.completion),
            poller: Poller::new(settings.poll_interval),
            feedback: Deadlines::default(),
            feedback_delay: settings.feedback_delay,
            toasts: Toasts::new(settings.toast_lifetime),
            results_open: false,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// Whether the results window should be on screen
    pub fn results_open(&self) -> bool {
        self.results_open
    }

    /// Closes the results window; the session itself is left as it is
    pub fn dismiss_results(&mut self) {
        self.results_open = false;
    }

    pub fn player_ready(&mut self, now: Instant, player: &mut dyn PlaybackHandle) {
        self.handle(Event::PlayerReady, now, player);
    }

    pub fn player_ended(&mut self, now: Instant, player: &mut dyn PlaybackHandle) {
        self.handle(Event::PlayerEnded, now, player);
    }

    pub fn submit(&mut self, choice: usize, now: Instant, player: &mut dyn PlaybackHandle) {
        self.handle(Event::Submit { choice }, now, player);
    }

    /// Fires whatever timers are due at `now`
    pub fn update(&mut self, now: Instant, player: &mut dyn PlaybackHandle) {
        while let Some(question) = self.feedback.expired(now) {
            self.handle(Event::FeedbackElapsed { question }, now, player);
        }
        if self.poller.due(now) {
            let position = player.current_position();
            self.handle(Event::Tick { position }, now, player);
        }
        self.toasts.prune(now);
    }

    /// How long until a timer needs attention again
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        [
            self.poller.remaining(now),
            self.feedback.remaining(now),
            self.toasts.remaining(now),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Stops every timer
    pub fn shutdown(&mut self) {
        self.poller.stop();
        self.feedback.clear();
    }

    pub fn handle(&mut self, event: Event, now: Instant, player: &mut dyn PlaybackHandle) {
        debug!("session event {event:?}");
        let Transition { state, effects } = self.state.clone().apply(&self.quiz, event);
        self.state = state;
        for effect in effects {
            self.execute(effect, now, player);
        }
    }

    fn execute(&mut self, effect: Effect, now: Instant, player: &mut dyn PlaybackHandle) {
        match effect {
            Effect::StartPolling => self.poller.start(now),
            Effect::StopPolling => self.poller.stop(),
            Effect::Pause => player.pause(),
            Effect::Resume => player.resume(),
            Effect::Notify(notification) => self.toasts.push(notification, now),
            Effect::ScheduleFeedback { question } => {
                self.feedback.arm(question, now + self.feedback_delay)
            }
            Effect::ShowResults => self.results_open = true,
        }
    }
}
