//! Time as seen by the map controller.
//!
//! The controller never sleeps. Deferred work is kept as a [`PendingTimer`]
//! holding a token and a due instant, and is fired by whoever drives the
//! controller once [`Clock::now`] has passed it.

use std::{
  cell::Cell,
  time::{Duration, Instant},
};

pub trait Clock {
  fn now(&self) -> Instant;
}

/// Wall clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Instant {
    Instant::now()
  }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
  now: Cell<Instant>,
}

impl Default for ManualClock {
  fn default() -> Self {
    Self::new()
  }
}

impl ManualClock {
  #[must_use]
  pub fn new() -> Self {
    Self {
      now: Cell::new(Instant::now()),
    }
  }

  pub fn advance(&self, by: Duration) {
    self.now.set(self.now.get() + by);
  }
}

impl Clock for ManualClock {
  fn now(&self) -> Instant {
    self.now.get()
  }
}

/// Identifies one scheduled operation. A newer schedule invalidates older tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug, Clone, Copy)]
struct Deadline {
  token: TimerToken,
  due: Instant,
}

/// At most one pending operation. Scheduling replaces whatever was pending.
#[derive(Debug, Default)]
pub struct PendingTimer {
  next_token: u64,
  pending: Option<Deadline>,
}

impl PendingTimer {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn schedule(&mut self, due: Instant) -> TimerToken {
    let token = TimerToken(self.next_token);
    self.next_token += 1;
    self.pending = Some(Deadline { token, due });
    token
  }

  #[must_use]
  pub fn due(&self) -> Option<Instant> {
    self.pending.map(|d| d.due)
  }

  /// Removes and returns the pending token if it is due at `now`.
  pub fn take_due(&mut self, now: Instant) -> Option<TimerToken> {
    match self.pending {
      Some(Deadline { token, due }) if due <= now => {
        self.pending = None;
        Some(token)
      }
      _ => None,
    }
  }
}

/// Accepts an action at most once per `window`.
#[derive(Debug, Clone, Copy)]
pub struct Cooldown {
  window: Duration,
  last_accepted: Option<Instant>,
}

impl Cooldown {
  #[must_use]
  pub fn new(window: Duration) -> Self {
    Self {
      window,
      last_accepted: None,
    }
  }

  #[must_use]
  pub fn is_ready(&self, now: Instant) -> bool {
    self
      .last_accepted
      .is_none_or(|last| now.saturating_duration_since(last) >= self.window)
  }

  /// Marks an accepted action if the cooldown has expired.
  pub fn try_accept(&mut self, now: Instant) -> bool {
    if self.is_ready(now) {
      self.last_accepted = Some(now);
      true
    } else {
      false
    }
  }
}
