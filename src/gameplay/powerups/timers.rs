use std::time::Duration;

use bevy::time::{Timer, TimerMode};

use super::active::ActiveHandle;
use super::host::Scheduler;

struct PendingTask<T> {
    timer: Timer,
    payload: T,
}

/// Deferred one-shot task queue driven by elapsed deltas.
///
/// Each payload is handed back exactly once, from the first [`tick`](Self::tick)
/// that pushes its timer past the delay. Not ticking (paused host time) stalls
/// delivery indefinitely.
pub struct DeferredTasks<T> {
    pending: Vec<PendingTask<T>>,
    delivered: u64,
}

impl<T> Default for DeferredTasks<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            delivered: 0,
        }
    }
}

impl<T> DeferredTasks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delay: Duration, payload: T) {
        self.pending.push(PendingTask {
            timer: Timer::new(delay, TimerMode::Once),
            payload,
        });
    }

    /// Advance every pending timer by `delta` and drain the ones that finished,
    /// in scheduling order.
    pub fn tick(&mut self, delta: Duration) -> Vec<T> {
        for task in &mut self.pending {
            task.timer.tick(delta);
        }
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|t| t.timer.finished());
        self.pending = waiting;
        self.delivered += due.len() as u64;
        due.into_iter().map(|t| t.payload).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total payloads handed out since creation.
    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl Scheduler for DeferredTasks<ActiveHandle> {
    fn schedule_once(&mut self, delay_ms: u64, handle: ActiveHandle) {
        self.push(Duration::from_millis(delay_ms), handle);
    }
}
