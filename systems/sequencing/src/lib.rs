#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deferred single-shot tasks driven by simulated time.
//!
//! Timed steps such as the launcher reload or the delay between a burst cue
//! and bubble removal are queued here instead of blocking. Every task carries
//! a [`CancellationToken`]; cancelling the token drops the task when it comes
//! due, so overlapping timers never race.

use std::{cell::Cell, rc::Rc, time::Duration};

/// Shared flag that cancels every task scheduled with it.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    /// Creates a live token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels every task holding a clone of this token.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Reports whether the token was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[derive(Debug)]
struct Task<T> {
    due: Duration,
    sequence: u64,
    token: CancellationToken,
    payload: T,
}

/// Queue of deferred payloads released once simulated time reaches them.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_sequence: u64,
    tasks: Vec<Task<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_sequence: 0,
            tasks: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    /// Creates an empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated time accumulated so far.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of tasks that are neither released nor cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks
            .iter()
            .filter(|task| !task.token.is_cancelled())
            .count()
    }

    /// Schedules `payload` after `delay` under a fresh token and returns it.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> CancellationToken {
        let token = CancellationToken::new();
        self.schedule_with(delay, payload, &token);
        token
    }

    /// Schedules `payload` after `delay`, cancelled together with `token`.
    pub fn schedule_with(&mut self, delay: Duration, payload: T, token: &CancellationToken) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.tasks.push(Task {
            due: self.now.saturating_add(delay),
            sequence,
            token: token.clone(),
            payload,
        });
    }

    /// Advances time by `dt` and appends due payloads in release order.
    ///
    /// Tasks due at the same instant are released in scheduling order.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<T>) {
        self.now = self.now.saturating_add(dt);
        let now = self.now;
        self.tasks.retain(|task| !task.token.is_cancelled());
        self.tasks
            .sort_by(|left, right| (left.due, left.sequence).cmp(&(right.due, right.sequence)));
        let ready = self.tasks.partition_point(|task| task.due <= now);
        out.extend(self.tasks.drain(..ready).map(|task| task.payload));
    }

    /// Drops every pending task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
