use std::time::{Duration, Instant};

/// Repeating timer checked once per frame.
///
/// Fires at most once per [`Poller::due`] call; missed intervals are not
/// replayed, the next tick is scheduled one interval after the call that fired.
#[derive(Debug)]
pub struct Poller {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_tick = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(tick) if now >= tick => {
                self.next_tick = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time left until the next tick, used to schedule a repaint
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_tick
            .map(|tick| tick.saturating_duration_since(now))
    }
}

/// One-shot timers, each carrying a value until it expires
#[derive(Debug)]
pub struct Deadlines<T> {
    pending: Vec<(T, Instant)>,
}

impl<T> Default for Deadlines<T> {
    fn default() -> Self {
        Self { pending: vec![] }
    }
}

impl<T> Deadlines<T> {
    pub fn arm(&mut self, value: T, at: Instant) {
        self.pending.push((value, at));
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Takes the earliest armed value whose deadline `now` has reached
    pub fn expired(&mut self, now: Instant) -> Option<T> {
        let index = self.pending.iter().position(|(_, at)| now >= *at)?;
        Some(self.pending.remove(index).0)
    }

    /// Time left until the soonest deadline
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .iter()
            .map(|(_, at)| at.saturating_duration_since(now))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poller_ticks_once_per_interval() {
        let start = Instant::now();
        let second = Duration::from_secs(1);
        let mut poller = Poller::new(second);
        assert!(!poller.due(start + second));

        poller.start(start);
        assert!(!poller.due(start + Duration::from_millis(500)));
        assert!(poller.due(start + second));
        assert!(!poller.due(start + second));
        assert!(poller.due(start + Duration::from_millis(2500)));
        assert_eq!(
            poller.remaining(start + Duration::from_millis(3000)),
            Some(Duration::from_millis(500))
        );

        poller.stop();
        assert!(!poller.is_running());
        assert!(!poller.due(start + Duration::from_secs(10)));
    }

    #[test]
    fn deadlines_yield_each_value_once() {
        let start = Instant::now();
        let mut deadlines = Deadlines::default();
        deadlines.arm(7, start + Duration::from_secs(2));
        deadlines.arm(8, start + Duration::from_secs(3));

        assert_eq!(deadlines.expired(start + Duration::from_secs(1)), None);
        assert_eq!(
            deadlines.remaining(start + Duration::from_secs(1)),
            Some(Duration::from_secs(1))
        );
        assert_eq!(deadlines.expired(start + Duration::from_secs(2)), Some(7));
        assert_eq!(deadlines.expired(start + Duration::from_secs(2)), None);
        assert_eq!(deadlines.expired(start + Duration::from_secs(4)), Some(8));
        assert_eq!(deadlines.remaining(start + Duration::from_secs(4)), None);
    }
}
