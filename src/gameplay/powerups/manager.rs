use bevy::log::{debug, info, warn};
use bevy::math::Vec2;
use serde::Deserialize;

use super::active::{ActiveHandle, ActivePowerup, ActiveSet};
use super::definition::DefinitionTable;
use super::host::{Clock, PickupScene, Scheduler};

/// What to do when a powerup is collected while one of the same kind is still active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum StackPolicy {
    /// Every collection adds an independent entry; effects compound.
    #[default]
    Stack,
    /// Re-key the live entry with a fresh expiration; the effect is not applied again.
    Refresh,
    /// Consume the pickup and do nothing else.
    Ignore,
}

/// Outcome of [`PowerupManager::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Activated(ActiveHandle),
    Refreshed(ActiveHandle),
    Ignored,
    /// The representation had already been taken.
    Consumed,
}

impl Activation {
    pub fn handle(&self) -> Option<ActiveHandle> {
        match self {
            Activation::Activated(h) | Activation::Refreshed(h) => Some(*h),
            Activation::Ignored | Activation::Consumed => None,
        }
    }
}

/// Tracks timed effects applied to a single subject and reverses each exactly once.
///
/// Reversal is triggered either by the deferred timer scheduled at activation or by
/// [`sweep`](Self::sweep); whichever runs second finds the handle gone and does nothing.
pub struct PowerupManager<S> {
    definitions: DefinitionTable<S>,
    active: ActiveSet<S>,
    policy: StackPolicy,
}

impl<S> PowerupManager<S> {
    pub fn new(definitions: DefinitionTable<S>) -> Self {
        Self::with_policy(definitions, StackPolicy::default())
    }

    pub fn with_policy(definitions: DefinitionTable<S>, policy: StackPolicy) -> Self {
        Self {
            definitions,
            active: ActiveSet::new(),
            policy,
        }
    }

    #[inline]
    pub fn policy(&self) -> StackPolicy {
        self.policy
    }

    #[inline]
    pub fn definitions(&self) -> &DefinitionTable<S> {
        &self.definitions
    }

    /// Best-effort: unknown kinds are logged and skipped.
    pub fn spawn<P: PickupScene<S>>(
        &self,
        scene: &mut P,
        kind: &str,
        position: Vec2,
    ) -> Option<P::Handle> {
        let Some(def) = self.definitions.get(kind) else {
            warn!(target: "powerups", "spawn: unknown powerup kind '{kind}', skipping");
            return None;
        };
        let handle = scene.spawn_representation(def.tag(), position);
        scene.watch_overlap(handle);
        debug!(target: "powerups", "spawned '{kind}' at ({:.1}, {:.1}) as {:?}", position.x, position.y, handle);
        Some(handle)
    }

    /// Collect `representation` for `subject`. Called by the overlap collaborator.
    pub fn activate<P, T, C>(
        &mut self,
        scene: &mut P,
        timers: &mut T,
        clock: &C,
        subject: &mut S,
        representation: P::Handle,
    ) -> Activation
    where
        P: PickupScene<S>,
        T: Scheduler + ?Sized,
        C: Clock + ?Sized,
    {
        let Some(tag) = scene.take_representation(representation) else {
            return Activation::Consumed;
        };
        let now = clock.now_ms();
        let existing = match self.policy {
            StackPolicy::Stack => None,
            StackPolicy::Refresh | StackPolicy::Ignore => self.active.find_kind(&tag.kind),
        };

        if let Some(live) = existing {
            if self.policy == StackPolicy::Ignore {
                debug!(target: "powerups", "'{}' already active ({live}); ignoring pickup", tag.kind);
                return Activation::Ignored;
            }
            // Re-keying invalidates the old handle so its pending timer becomes a no-op.
            let Some(mut entry) = self.active.remove(live) else {
                return Activation::Ignored;
            };
            entry.duration_ms = tag.duration_ms;
            entry.activated_at_ms = now;
            entry.expires_at_ms = now.saturating_add(tag.duration_ms);
            let expires = entry.expires_at_ms;
            let handle = self.active.insert(entry);
            timers.schedule_once(tag.duration_ms, handle);
            info!(target: "powerups", "refreshed '{}' ({live} -> {handle}), expires at {expires}ms", tag.kind);
            return Activation::Refreshed(handle);
        }

        let entry = ActivePowerup {
            kind: tag.kind,
            duration_ms: tag.duration_ms,
            effect: tag.effect,
            activated_at_ms: now,
            expires_at_ms: now.saturating_add(tag.duration_ms),
        };
        entry.effect.apply(subject, true);
        let duration = entry.duration_ms;
        info!(target: "powerups", "activated '{}' for {duration}ms", entry.kind);
        let handle = self.active.insert(entry);
        timers.schedule_once(duration, handle);
        Activation::Activated(handle)
    }

    /// Reverse and forget `handle`. Returns `false` if it was already gone.
    pub fn deactivate(&mut self, handle: ActiveHandle, subject: &mut S) -> bool {
        let Some(entry) = self.active.remove(handle) else {
            return false;
        };
        entry.effect.apply(subject, false);
        info!(target: "powerups", "deactivated '{}' ({handle})", entry.kind);
        true
    }

    /// Deactivate every entry with `expires_at_ms <= now_ms`. Returns the number reversed.
    pub fn sweep(&mut self, now_ms: u64, subject: &mut S) -> usize {
        self.sweep_with(now_ms, subject, |_, _| {})
    }

    /// [`sweep`](Self::sweep) that also reports each `(handle, kind)` it reversed.
    pub fn sweep_with(
        &mut self,
        now_ms: u64,
        subject: &mut S,
        mut on_expired: impl FnMut(ActiveHandle, &str),
    ) -> usize {
        let mut reversed = 0;
        for handle in self.active.expired(now_ms) {
            let kind = match self.active.get(handle) {
                Some(e) => e.kind.clone(),
                None => continue,
            };
            if self.deactivate(handle, subject) {
                on_expired(handle, &kind);
                reversed += 1;
            }
        }
        reversed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    #[inline]
    pub fn is_active(&self, handle: ActiveHandle) -> bool {
        self.active.contains(handle)
    }

    pub fn get(&self, handle: ActiveHandle) -> Option<&ActivePowerup<S>> {
        self.active.get(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActiveHandle, &ActivePowerup<S>)> {
        self.active.iter()
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.active.iter().filter(|(_, e)| e.kind == kind).count()
    }

    pub fn remaining_ms(&self, handle: ActiveHandle, now_ms: u64) -> Option<u64> {
        self.active.get(handle).map(|e| e.remaining_ms(now_ms))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::gameplay::powerups::definition::{PickupTag, PowerupDefinition};
    use crate::gameplay::powerups::host::ManualClock;

    #[derive(Default)]
    struct Subject {
        speed: i32,
        on: u32,
        off: u32,
    }

    #[derive(Default)]
    struct FakeScene {
        next: u32,
        live: HashMap<u32, (PickupTag<Subject>, Vec2)>,
        watched: Vec<u32>,
    }

    impl PickupScene<Subject> for FakeScene {
        type Handle = u32;
        fn spawn_representation(&mut self, tag: PickupTag<Subject>, position: Vec2) -> u32 {
            self.next += 1;
            self.live.insert(self.next, (tag, position));
            self.next
        }
        fn watch_overlap(&mut self, handle: u32) {
            self.watched.push(handle);
        }
        fn take_representation(&mut self, handle: u32) -> Option<PickupTag<Subject>> {
            self.live.remove(&handle).map(|(t, _)| t)
        }
    }

    #[derive(Default)]
    struct FakeTimers(Vec<(u64, ActiveHandle)>);

    impl Scheduler for FakeTimers {
        fn schedule_once(&mut self, delay_ms: u64, handle: ActiveHandle) {
            self.0.push((delay_ms, handle));
        }
    }

    fn speed_effect(s: &mut Subject, on: bool) {
        if on {
            s.speed += 10;
            s.on += 1;
        } else {
            s.speed -= 10;
            s.off += 1;
        }
    }

    fn manager(policy: StackPolicy) -> PowerupManager<Subject> {
        let defs = DefinitionTable::try_from_definitions([
            PowerupDefinition::new("speed", "speed.png", 1000, speed_effect),
            PowerupDefinition::new("shield", "shield.png", 400, |s: &mut Subject, on: bool| {
                if on {
                    s.on += 1
                } else {
                    s.off += 1
                }
            }),
        ])
        .unwrap();
        PowerupManager::with_policy(defs, policy)
    }

    #[test]
    fn spawn_unknown_kind_creates_nothing() {
        let mgr = manager(StackPolicy::Stack);
        let mut scene = FakeScene::default();
        assert!(mgr.spawn(&mut scene, "laser", Vec2::ZERO).is_none());
        assert!(scene.live.is_empty());
        assert!(scene.watched.is_empty());
    }

    #[test]
    fn spawn_tags_and_watches_representation() {
        let mgr = manager(StackPolicy::Stack);
        let mut scene = FakeScene::default();
        let h = mgr.spawn(&mut scene, "speed", Vec2::new(10.0, 10.0)).unwrap();
        let (tag, pos) = &scene.live[&h];
        assert_eq!(tag.kind, "speed");
        assert_eq!(tag.duration_ms, 1000);
        assert_eq!(*pos, Vec2::new(10.0, 10.0));
        assert_eq!(scene.watched, vec![h]);
    }

    #[test]
    fn activate_applies_schedules_and_consumes_once() {
        let mut mgr = manager(StackPolicy::Stack);
        let mut scene = FakeScene::default();
        let mut timers = FakeTimers::default();
        let clock = ManualClock::at(250);
        let mut subject = Subject::default();
        let rep = mgr.spawn(&mut scene, "speed", Vec2::ZERO).unwrap();

        let first = mgr.activate(&mut scene, &mut timers, &clock, &mut subject, rep);
        let Activation::Activated(handle) = first else {
            panic!("expected activation, got {first:?}");
        };
        assert_eq!(mgr.len(), 1);
        assert_eq!(subject.on, 1);
        assert_eq!(subject.speed, 10);
        assert_eq!(mgr.get(handle).unwrap().expires_at_ms, 1250);
        assert_eq!(timers.0, vec![(1000, handle)]);

        let again = mgr.activate(&mut scene, &mut timers, &clock, &mut subject, rep);
        assert_eq!(again, Activation::Consumed);
        assert_eq!(mgr.len(), 1);
        assert_eq!(subject.on, 1);
    }

    #[test]
    fn timer_then_sweep_reverses_once() {
        let mut mgr = manager(StackPolicy::Stack);
        let mut scene = FakeScene::default();
        let mut timers = FakeTimers::default();
        let mut subject = Subject::default();
        let rep = mgr.spawn(&mut scene, "speed", Vec2::ZERO).unwrap();
        let handle = mgr
            .activate(&mut scene, &mut timers, &ManualClock::at(0), &mut subject, rep)
            .handle()
            .unwrap();

        assert!(mgr.deactivate(handle, &mut subject));
        assert!(!mgr.deactivate(handle, &mut subject));
        assert_eq!(mgr.sweep(5_000, &mut subject), 0);
        assert_eq!(subject.off, 1);
        assert_eq!(subject.speed, 0);
    }

    #[test]
    fn stacking_same_kind_compounds_and_unwinds() {
        let mut mgr = manager(StackPolicy::Stack);
        let mut scene = FakeScene::default();
        let mut timers = FakeTimers::default();
        let mut subject = Subject::default();
        let a = mgr.spawn(&mut scene, "speed", Vec2::ZERO).unwrap();
        let b = mgr.spawn(&mut scene, "speed", Vec2::ONE).unwrap();
        mgr.activate(&mut scene, &mut timers, &ManualClock::at(0), &mut subject, a);
        mgr.activate(&mut scene, &mut timers, &ManualClock::at(300), &mut subject, b);
        assert_eq!(mgr.count_kind("speed"), 2);
        assert_eq!(subject.speed, 20);

        assert_eq!(mgr.sweep(1000, &mut subject), 1);
        assert_eq!(subject.speed, 10);
        assert_eq!(mgr.sweep(1300, &mut subject), 1);
        assert_eq!(subject.speed, 0);
    }

    #[test]
    fn refresh_rekeys_without_reapplying() {
        let mut mgr = manager(StackPolicy::Refresh);
        let mut scene = FakeScene::default();
        let mut timers = FakeTimers::default();
        let mut subject = Subject::default();
        let a = mgr.spawn(&mut scene, "speed", Vec2::ZERO).unwrap();
        let b = mgr.spawn(&mut scene, "speed", Vec2::ONE).unwrap();
        let first = mgr
            .activate(&mut scene, &mut timers, &ManualClock::at(0), &mut subject, a)
            .handle()
            .unwrap();
        let second = mgr.activate(&mut scene, &mut timers, &ManualClock::at(600), &mut subject, b);
        let Activation::Refreshed(renewed) = second else {
            panic!("expected refresh, got {second:?}");
        };
        assert_eq!(subject.on, 1);
        assert_eq!(mgr.len(), 1);
        let entry = mgr.get(renewed).unwrap();
        assert_eq!(entry.activated_at_ms, 600);
        assert_eq!(entry.expires_at_ms, 1600);
        assert_eq!(entry.expires_at_ms - entry.activated_at_ms, entry.duration_ms);

        // Old timer fires: stale handle, no reversal.
        assert!(!mgr.deactivate(first, &mut subject));
        assert_eq!(mgr.sweep(1000, &mut subject), 0);
        assert_eq!(subject.off, 0);
        assert_eq!(mgr.sweep(1600, &mut subject), 1);
        assert_eq!(subject.off, 1);
    }

    #[test]
    fn ignore_consumes_pickup_only() {
        let mut mgr = manager(StackPolicy::Ignore);
        let mut scene = FakeScene::default();
        let mut timers = FakeTimers::default();
        let mut subject = Subject::default();
        let a = mgr.spawn(&mut scene, "speed", Vec2::ZERO).unwrap();
        let b = mgr.spawn(&mut scene, "speed", Vec2::ONE).unwrap();
        mgr.activate(&mut scene, &mut timers, &ManualClock::at(0), &mut subject, a);
        let out = mgr.activate(&mut scene, &mut timers, &ManualClock::at(10), &mut subject, b);
        assert_eq!(out, Activation::Ignored);
        assert!(scene.live.is_empty());
        assert_eq!(timers.0.len(), 1);
        assert_eq!(subject.on, 1);
    }

    #[test]
    fn sweep_with_reports_kinds() {
        let mut mgr = manager(StackPolicy::Stack);
        let mut scene = FakeScene::default();
        let mut timers = FakeTimers::default();
        let mut subject = Subject::default();
        let clock = ManualClock::at(0);
        for kind in ["speed", "shield"] {
            let rep = mgr.spawn(&mut scene, kind, Vec2::ZERO).unwrap();
            mgr.activate(&mut scene, &mut timers, &clock, &mut subject, rep);
        }
        let mut seen = Vec::new();
        mgr.sweep_with(400, &mut subject, |_, kind| seen.push(kind.to_string()));
        assert_eq!(seen, vec!["shield".to_string()]);
        assert_eq!(mgr.remaining_ms(timers.0[0].1, 400), Some(600));
    }
}
