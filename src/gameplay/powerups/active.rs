use std::fmt;
use std::sync::Arc;

use super::definition::PowerupEffect;

/// Stable address of one activation inside the [`ActiveSet`].
///
/// The generation is bumped every time a slot is vacated, so a handle held by a
/// pending timer after its entry was removed (or re-keyed) never matches again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveHandle {
    index: u32,
    generation: u32,
}

impl ActiveHandle {
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ActiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// One currently-in-effect powerup.
pub struct ActivePowerup<S> {
    pub kind: String,
    pub duration_ms: u64,
    pub effect: Arc<dyn PowerupEffect<S>>,
    pub activated_at_ms: u64,
    pub expires_at_ms: u64,
}

impl<S> ActivePowerup<S> {
    #[inline]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms <= now_ms
    }

    #[inline]
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at_ms.saturating_sub(now_ms)
    }
}

impl<S> fmt::Debug for ActivePowerup<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivePowerup")
            .field("kind", &self.kind)
            .field("duration_ms", &self.duration_ms)
            .field("activated_at_ms", &self.activated_at_ms)
            .field("expires_at_ms", &self.expires_at_ms)
            .finish_non_exhaustive()
    }
}

struct Slot<S> {
    generation: u32,
    entry: Option<ActivePowerup<S>>,
}

/// Index-addressed storage for active powerups (handle -> slot).
///
/// Removal is O(1) and idempotent: removing through a stale or already-used
/// handle returns `None` and touches nothing.
pub struct ActiveSet<S> {
    slots: Vec<Slot<S>>,
    free: Vec<u32>,
    len: usize,
}

impl<S> Default for ActiveSet<S> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<S> ActiveSet<S> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, entry: ActivePowerup<S>) -> ActiveHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return ActiveHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        ActiveHandle {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, handle: ActiveHandle) -> Option<&ActivePowerup<S>> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.entry.as_ref())
    }

    #[inline]
    pub fn contains(&self, handle: ActiveHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn remove(&mut self, handle: ActiveHandle) -> Option<ActivePowerup<S>> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActiveHandle, &ActivePowerup<S>)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.entry.as_ref().map(|e| {
                (
                    ActiveHandle {
                        index: i as u32,
                        generation: s.generation,
                    },
                    e,
                )
            })
        })
    }

    /// Handles of every entry with `expires_at_ms <= now_ms`.
    pub fn expired(&self, now_ms: u64) -> Vec<ActiveHandle> {
        self.iter()
            .filter(|(_, e)| e.is_expired(now_ms))
            .map(|(h, _)| h)
            .collect()
    }

    pub fn find_kind(&self, kind: &str) -> Option<ActiveHandle> {
        self.iter().find(|(_, e)| e.kind == kind).map(|(h, _)| h)
    }
}
