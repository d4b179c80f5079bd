//! Countdown for work sessions and breaks.
//!
//! Only one countdown exists at a time. A session runs one tick past zero
//! before it expires, a break expires on reaching zero.

use std::time::{Duration, Instant};

use thiserror::Error;

pub const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Session,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerStatus {
    #[default]
    None,
    Running,
    Paused,
    Expired,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimerError {
    #[error("A timer is already active")]
    AlreadyActive,
    #[error("No timer is active")]
    NotActive,
    #[error("A timer needs at least one second")]
    ZeroDuration,
}

#[derive(Debug, Default)]
pub struct IntervalTimer {
    kind: Option<TimerKind>,
    total: u32,
    remaining: i64,
    status: TimerStatus,
    next_tick: Option<Instant>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> Option<TimerKind> {
        self.kind
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    #[cfg(test)]
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Running or paused.
    pub fn is_active(&self) -> bool {
        matches!(self.status, TimerStatus::Running | TimerStatus::Paused)
    }

    pub fn start(&mut self, kind: TimerKind, seconds: u32, now: Instant) -> Result<(), TimerError> {
        if self.is_active() {
            return Err(TimerError::AlreadyActive);
        }
        if seconds == 0 {
            return Err(TimerError::ZeroDuration);
        }
        self.kind = Some(kind);
        self.total = seconds;
        self.remaining = i64::from(seconds);
        self.status = TimerStatus::Running;
        self.next_tick = Some(now + TICK);
        tracing::info!(?kind, seconds, "timer started");
        Ok(())
    }

    /// One step of the countdown. Returns the kind that just expired, if any.
    pub fn tick(&mut self) -> Option<TimerKind> {
        if self.status != TimerStatus::Running {
            return None;
        }
        let kind = self.kind?;
        self.remaining -= 1;
        let expired = match kind {
            TimerKind::Session => self.remaining < 0,
            TimerKind::Break => self.remaining <= 0,
        };
        if expired {
            self.status = TimerStatus::Expired;
            self.next_tick = None;
            tracing::info!(?kind, "timer expired");
            return Some(kind);
        }
        None
    }

    /// Runs every tick that fell due by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<TimerKind> {
        while let Some(due) = self.next_tick {
            if due > now {
                break;
            }
            self.next_tick = Some(due + TICK);
            if let Some(kind) = self.tick() {
                return Some(kind);
            }
        }
        None
    }

    pub fn pause_or_resume(&mut self, now: Instant) -> Result<TimerStatus, TimerError> {
        match self.status {
            TimerStatus::Running => {
                self.status = TimerStatus::Paused;
                self.next_tick = None;
                tracing::debug!(remaining = self.remaining, "timer paused");
            }
            TimerStatus::Paused => {
                self.status = TimerStatus::Running;
                self.next_tick = Some(now + TICK);
                tracing::debug!(remaining = self.remaining, "timer resumed");
            }
            TimerStatus::None | TimerStatus::Expired => return Err(TimerError::NotActive),
        }
        Ok(self.status)
    }

    /// Back to the full duration, and keep running.
    pub fn reset(&mut self, now: Instant) -> Result<(), TimerError> {
        if !self.is_active() {
            return Err(TimerError::NotActive);
        }
        self.remaining = i64::from(self.total);
        self.status = TimerStatus::Running;
        self.next_tick = Some(now + TICK);
        tracing::debug!(total = self.total, "timer reset");
        Ok(())
    }

    pub fn cancel(&mut self) {
        if self.is_active() {
            tracing::info!(kind = ?self.kind, remaining = self.remaining, "timer cancelled");
        }
        *self = Self::default();
    }

    pub fn fraction_remaining(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.remaining as f64 / f64::from(self.total)).clamp(0.0, 1.0)
    }

    pub fn display(&self) -> String {
        format_time(self.remaining)
    }
}

/// `M:SS`, with negative values shown as zero.
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
