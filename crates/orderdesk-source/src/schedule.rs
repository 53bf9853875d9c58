use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

/// Shared flag a worker checks before delivering its result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Fixed-interval refresh timer driven by the host loop.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval: Option<Duration>,
    next_due: Option<Instant>,
}

impl PollSchedule {
    pub fn new(interval: Option<Duration>, now: Instant) -> Self {
        Self {
            interval,
            next_due: interval.map(|interval| now + interval),
        }
    }

    pub fn disabled() -> Self {
        Self {
            interval: None,
            next_due: None,
        }
    }

    /// Returns true at most once per elapsed interval and re-arms from `now`.
    pub fn due(&mut self, now: Instant) -> bool {
        match (self.interval, self.next_due) {
            (Some(interval), Some(next)) if now >= next => {
                self.next_due = Some(now + interval);
                true
            }
            _ => false,
        }
    }

    /// Upper bound for how long the host loop may block before `due` fires.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due
            .map(|next| next.saturating_duration_since(now))
    }
}
