//! Time sources
//!
//! - `Scheduler`: per-round virtual time with cancelable delayed timers
//! - `WallClock`: real-world timestamps for badge awards

use std::cell::Cell;

/// Slack when comparing due times, absorbs f64 accumulation error
const DUE_EPSILON: f64 = 1e-9;

/// Handle returned by `Scheduler::schedule_after`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TimerId,
    due: f64,
    timer: T,
}

/// Virtual clock plus a queue of delayed timers.
///
/// Time only moves when the owner pops due timers or settles the clock, so
/// a round driven by the same inputs always sees the same firing order.
/// Timers fire in due-time order; ties keep scheduling order.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Seconds of virtual time since creation
    pub fn elapsed(&self) -> f64 {
        self.now
    }

    /// Schedule `timer` to fire `delay` seconds from now (negative delays fire immediately)
    pub fn schedule_after(&mut self, delay: f64, timer: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: self.now + delay.max(0.0),
            timer,
        });
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its due time.
    pub fn pop_due(&mut self, until: f64) -> Option<T> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= until + DUE_EPSILON)
            .min_by(|(_, a), (_, b)| {
                a.due
                    .partial_cmp(&b.due)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.0.cmp(&b.id.0))
            })
            .map(|(i, _)| i)?;

        let fired = self.pending.remove(idx);
        self.now = self.now.max(fired.due);
        Some(fired.timer)
    }

    /// Move the clock forward to `until` without firing anything
    pub fn settle(&mut self, until: f64) {
        self.now = self.now.max(until);
    }
}

/// Source of real-world timestamps (Unix epoch milliseconds)
pub trait WallClock {
    fn now_ms(&self) -> f64;
}

/// Host clock: `SystemTime` on native, `Date.now()` in the browser
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Manually set clock for tests and replays
#[derive(Debug, Default)]
pub struct FixedClock {
    ms: Cell<f64>,
}

impl FixedClock {
    pub fn new(ms: f64) -> Self {
        Self { ms: Cell::new(ms) }
    }

    pub fn set(&self, ms: f64) {
        self.ms.set(ms);
    }
}

impl WallClock for FixedClock {
    fn now_ms(&self) -> f64 {
        self.ms.get()
    }
}
