//! Rate-limit schedulers for the shared dispatch handler.
//!
//! Debounce and throttle are modeled as small stateful schedulers behind a
//! common trait, so the dispatch coordinator never cares which policy is
//! active. None of them sleep: callers feed in the current [`Instant`] and
//! drive deferred deadlines through [`RateLimiter::poll`], scheduling their
//! own wakeup from [`RateLimiter::deadline`] (`WaitUntil`-style).

use web_time::{Duration, Instant};

use crate::config::WatchConfig;

/// Shared-handler policy derived from a mounting element's configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitMode {
    /// Every event fires a dispatch pass immediately.
    Immediate,
    /// Trailing-edge coalescing: fire once, `delay` after the last event of
    /// a burst.
    Debounce(Duration),
    /// At most one fire per `delay`; events in the cooldown window defer a
    /// single trailing fire at window end.
    Throttle(Duration),
}

impl RateLimitMode {
    /// Maps a validated config to the handler mode. Debounce and throttle
    /// are mutually exclusive by validation, so order here is cosmetic.
    pub fn from_config(config: &WatchConfig) -> Self {
        if let Some(delay) = config.debounce {
            RateLimitMode::Debounce(delay)
        } else if let Some(interval) = config.throttle {
            RateLimitMode::Throttle(interval)
        } else {
            RateLimitMode::Immediate
        }
    }
}

/// Common interface of the rate-limit schedulers.
pub trait RateLimiter {
    /// Feeds one native event. Returns `true` when a dispatch pass should
    /// run right now.
    fn on_event(&mut self, now: Instant) -> bool;

    /// Checks the deferred deadline. Returns `true` exactly once when a
    /// deferred dispatch has come due.
    fn poll(&mut self, now: Instant) -> bool;

    /// Next instant at which [`poll`](Self::poll) would fire, if any.
    fn deadline(&self) -> Option<Instant>;

    /// The policy this scheduler implements.
    fn mode(&self) -> RateLimitMode;
}

/// Builds the scheduler for a mode.
pub fn limiter_for(mode: RateLimitMode) -> Box<dyn RateLimiter> {
    match mode {
        RateLimitMode::Immediate => Box::new(Immediate),
        RateLimitMode::Debounce(delay) => Box::new(Debounce::new(delay)),
        RateLimitMode::Throttle(interval) => Box::new(Throttle::new(interval)),
    }
}

/// Pass-through scheduler.
pub struct Immediate;

impl RateLimiter for Immediate {
    fn on_event(&mut self, _now: Instant) -> bool {
        true
    }

    fn poll(&mut self, _now: Instant) -> bool {
        false
    }

    fn deadline(&self) -> Option<Instant> {
        None
    }

    fn mode(&self) -> RateLimitMode {
        RateLimitMode::Immediate
    }
}

/// Trailing-edge coalescer. A new event replaces any pending deadline.
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }
}

impl RateLimiter for Debounce {
    fn on_event(&mut self, now: Instant) -> bool {
        self.deadline = Some(now + self.delay);
        false
    }

    fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn mode(&self) -> RateLimitMode {
        RateLimitMode::Debounce(self.delay)
    }
}

/// Fixed-interval limiter: first event fires immediately, events inside the
/// cooldown defer exactly one trailing fire at window end.
pub struct Throttle {
    interval: Duration,
    last_fire: Option<Instant>,
    deadline: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
            deadline: None,
        }
    }
}

impl RateLimiter for Throttle {
    fn on_event(&mut self, now: Instant) -> bool {
        match self.last_fire {
            Some(last) if now.duration_since(last) < self.interval => {
                // Inside the cooldown: defer to window end, never drop.
                self.deadline = Some(last + self.interval);
                false
            }
            _ => {
                self.last_fire = Some(now);
                self.deadline = None;
                true
            }
        }
    }

    fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.last_fire = Some(deadline);
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn mode(&self) -> RateLimitMode {
        RateLimitMode::Throttle(self.interval)
    }
}
