//! Collaborator seams the lifecycle manager is driven through.
//!
//! The manager never touches the scene, timers or clock directly; callers hand
//! it implementations of these traits for the duration of each call.
use std::fmt::Debug;

use bevy::math::Vec2;
use bevy::time::Time;

use super::active::ActiveHandle;
use super::definition::PickupTag;

/// Rendering/physics side: owns the visual representation of uncollected pickups.
pub trait PickupScene<S> {
    type Handle: Copy + Eq + Debug;

    /// Create a representation at `position` carrying `tag`.
    fn spawn_representation(&mut self, tag: PickupTag<S>, position: Vec2) -> Self::Handle;

    /// Start reporting overlaps between the subject and `handle`.
    fn watch_overlap(&mut self, handle: Self::Handle);

    /// Read the tag off `handle` and hide/remove it. Returns `None` once consumed.
    fn take_representation(&mut self, handle: Self::Handle) -> Option<PickupTag<S>>;
}

/// One-shot deferred delivery of an [`ActiveHandle`] after `delay_ms`.
/// At-most-once; no cancellation is assumed.
pub trait Scheduler {
    fn schedule_once(&mut self, delay_ms: u64, handle: ActiveHandle);
}

/// Authoritative, monotonic non-decreasing time source in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<T: Default> Clock for Time<T> {
    fn now_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}

/// Hand-advanced clock for headless hosts and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ManualClock {
    now_ms: u64,
}

impl ManualClock {
    pub fn at(now_ms: u64) -> Self {
        Self { now_ms }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms = self.now_ms.saturating_add(ms);
    }

    /// Never moves backwards.
    pub fn set(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}
