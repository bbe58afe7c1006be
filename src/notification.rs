use std::time::{Duration, Instant};

/// How a toast is coloured
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NotificationStyle {
    /// A question interrupted playback
    Prompt,
    Success,
    Failure,
}

/// A short-lived message emitted by the quiz session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub style: NotificationStyle,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        style: NotificationStyle,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            style,
        }
    }

    pub fn question_available() -> Self {
        Self::new(
            "Nueva pregunta disponible",
            "¡Responde para continuar viendo el video!",
            NotificationStyle::Prompt,
        )
    }

    pub fn correct_answer() -> Self {
        Self::new(
            "¡Correcto!",
            "¡Muy bien! Continúa viendo el video.",
            NotificationStyle::Success,
        )
    }

    pub fn wrong_answer() -> Self {
        Self::new(
            "Incorrecto",
            "No te preocupes, sigue aprendiendo.",
            NotificationStyle::Failure,
        )
    }
}

/// Notifications currently on screen, each dropped once its lifetime runs out
#[derive(Debug)]
pub struct Toasts {
    lifetime: Duration,
    shown: Vec<(Notification, Instant)>,
}

impl Toasts {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            shown: vec![],
        }
    }

    pub fn push(&mut self, notification: Notification, now: Instant) {
        self.shown.push((notification, now + self.lifetime));
    }

    /// Drops expired toasts
    pub fn prune(&mut self, now: Instant) {
        self.shown.retain(|(_, expires_at)| *expires_at > now);
    }

    /// Time left until the soonest toast expires
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.shown
            .iter()
            .map(|(_, expires_at)| expires_at.saturating_duration_since(now))
            .min()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.shown.iter().map(|(notification, _)| notification)
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }
}
