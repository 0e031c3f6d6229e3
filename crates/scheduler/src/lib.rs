//! # Scheduler Crate
//!
//! Deterministic timer and animation-frame scheduling for the agent.
//!
//! Every timer is keyed by a caller-defined *kind*. Scheduling a kind that is
//! already pending replaces it, which gives debounce semantics for free. The
//! clock is never read here; callers pass `now` in.

#![forbid(unsafe_code)]

use std::fmt::Debug;
use std::time::{Duration, Instant};

use tracing::trace;

// ─────────────────────────────────────────────────────────────────────────────
// TimerEntry
// ─────────────────────────────────────────────────────────────────────────────

/// Internal representation of a scheduled timer (timeout or interval).
#[derive(Debug)]
struct TimerEntry<K> {
    kind: K,
    /// Absolute instant at which the timer should fire.
    fire_at: Instant,
    /// If `Some`, the timer repeats at this period.
    interval: Option<Duration>,
    /// Breaks ties between timers due at the same instant.
    seq: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// EventLoop
// ─────────────────────────────────────────────────────────────────────────────

/// A single-threaded timer loop.
///
/// Each call to [`tick`](EventLoop::tick) returns, in order:
/// 1. every timer whose deadline is `<= now`, earliest first;
/// 2. the pending animation frame, if one was requested.
#[derive(Debug)]
pub struct EventLoop<K> {
    timers: Vec<TimerEntry<K>>,
    frame: Option<K>,
    next_seq: u64,
}

impl<K: Copy + Eq + Debug> EventLoop<K> {
    /// Create a new, empty event loop.
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            frame: None,
            next_seq: 0,
        }
    }

    /// Schedule a one-shot timer `delay` after `now`, replacing any pending
    /// timer of the same kind.
    pub fn set_timeout(&mut self, kind: K, delay: Duration, now: Instant) {
        self.set_timeout_at(kind, now + delay);
    }

    /// Schedule a one-shot timer at a specific instant, replacing any pending
    /// timer of the same kind.
    pub fn set_timeout_at(&mut self, kind: K, fire_at: Instant) {
        self.insert(kind, fire_at, None);
    }

    /// Schedule a repeating timer, first firing one `period` after `now`.
    pub fn set_interval(&mut self, kind: K, period: Duration, now: Instant) {
        self.insert(kind, now + period, Some(period));
    }

    fn insert(&mut self, kind: K, fire_at: Instant, interval: Option<Duration>) {
        self.clear(kind);
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!(?kind, ?interval, "timer scheduled");
        self.timers.push(TimerEntry {
            kind,
            fire_at,
            interval,
            seq,
        });
    }

    /// Cancel the pending timer of `kind`. Returns whether one existed.
    pub fn clear(&mut self, kind: K) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.kind != kind);
        before != self.timers.len()
    }

    pub fn is_scheduled(&self, kind: K) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// Request an animation frame for the next tick, replacing any pending
    /// request.
    pub fn request_animation_frame(&mut self, kind: K) {
        self.frame = Some(kind);
    }

    /// Cancel the pending animation frame, returning it.
    pub fn cancel_animation_frame(&mut self) -> Option<K> {
        self.frame.take()
    }

    pub fn has_animation_frame(&self) -> bool {
        self.frame.is_some()
    }

    /// Advance the loop to `now`.
    ///
    /// Repeating timers fire at most once per tick and are rescheduled one
    /// period after their previous deadline (or after `now`, if they fell
    /// more than a period behind).
    pub fn tick(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(Instant, u64, K)> = Vec::new();

        self.timers.retain_mut(|timer| {
            if timer.fire_at > now {
                return true;
            }
            due.push((timer.fire_at, timer.seq, timer.kind));
            match timer.interval {
                Some(period) => {
                    let next = timer.fire_at + period;
                    timer.fire_at = if next > now { next } else { now + period };
                    true
                }
                None => false,
            }
        });

        due.sort_by_key(|&(at, seq, _)| (at, seq));
        let mut fired: Vec<K> = due.into_iter().map(|(_, _, kind)| kind).collect();
        fired.extend(self.frame.take());

        if !fired.is_empty() {
            trace!(?fired, "tick");
        }
        fired
    }

    /// Returns `true` if any timer or animation frame is pending.
    pub fn has_pending_work(&self) -> bool {
        !self.timers.is_empty() || self.frame.is_some()
    }

    /// Returns the earliest timer deadline, if any timers are active.
    pub fn next_timer_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.fire_at).min()
    }

    /// Number of active timers.
    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Drop every timer and the pending frame.
    pub fn clear_all(&mut self) {
        self.timers.clear();
        self.frame = None;
    }
}

impl<K: Copy + Eq + Debug> Default for EventLoop<K> {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
