use std::collections::HashMap;
use std::time::Duration;

use bevy::math::Vec2;
use powerup_arena::gameplay::powerups::{
    Activation, ActiveHandle, DeferredTasks, DefinitionTable, ManualClock, PickupScene, PickupTag,
    PowerupDefinition, PowerupManager,
};

#[derive(Debug, Default)]
struct Runner {
    speed: f32,
    shielded: bool,
    reversals: Vec<&'static str>,
}

#[derive(Default)]
struct Field {
    next: u64,
    pickups: HashMap<u64, (String, Vec2)>,
    tags: HashMap<u64, PickupTag<Runner>>,
}

impl PickupScene<Runner> for Field {
    type Handle = u64;

    fn spawn_representation(&mut self, tag: PickupTag<Runner>, position: Vec2) -> u64 {
        self.next += 1;
        self.pickups.insert(self.next, (tag.kind.clone(), position));
        self.tags.insert(self.next, tag);
        self.next
    }

    fn watch_overlap(&mut self, _handle: u64) {}

    fn take_representation(&mut self, handle: u64) -> Option<PickupTag<Runner>> {
        self.pickups.remove(&handle)?;
        self.tags.remove(&handle)
    }
}

fn manager() -> PowerupManager<Runner> {
    let defs = DefinitionTable::new()
        .with(PowerupDefinition::new("speed", "speed.png", 1000, |r: &mut Runner, on: bool| {
            if on {
                r.speed += 5.0;
            } else {
                r.speed -= 5.0;
                r.reversals.push("speed");
            }
        }))
        .and_then(|t| {
            t.with(PowerupDefinition::new("shield", "shield.png", 400, |r: &mut Runner, on: bool| {
                r.shielded = on;
                if !on {
                    r.reversals.push("shield");
                }
            }))
        })
        .expect("distinct kinds");
    PowerupManager::new(defs)
}

fn collect(
    mgr: &mut PowerupManager<Runner>,
    field: &mut Field,
    timers: &mut DeferredTasks<ActiveHandle>,
    clock: &ManualClock,
    runner: &mut Runner,
    kind: &str,
    at: Vec2,
) -> ActiveHandle {
    let rep = mgr.spawn(field, kind, at).expect("known kind");
    match mgr.activate(field, timers, clock, runner, rep) {
        Activation::Activated(h) => h,
        other => panic!("expected activation, got {other:?}"),
    }
}

#[test]
fn speed_pickup_expires_exactly_once_via_sweep() {
    let t0 = 10_000;
    let mut mgr = manager();
    let mut field = Field::default();
    let mut timers = DeferredTasks::new();
    let clock = ManualClock::at(t0);
    let mut runner = Runner::default();

    let rep = mgr.spawn(&mut field, "speed", Vec2::new(10.0, 10.0)).unwrap();
    assert_eq!(field.pickups[&rep], ("speed".to_string(), Vec2::new(10.0, 10.0)));
    let handle = match mgr.activate(&mut field, &mut timers, &clock, &mut runner, rep) {
        Activation::Activated(h) => h,
        other => panic!("expected activation, got {other:?}"),
    };
    assert!(field.pickups.is_empty());
    assert_eq!(runner.speed, 5.0);
    assert_eq!(mgr.remaining_ms(handle, t0), Some(1000));

    assert_eq!(mgr.sweep(t0 + 500, &mut runner), 0);
    assert_eq!(mgr.len(), 1);

    assert_eq!(mgr.sweep(t0 + 1000, &mut runner), 1);
    assert!(mgr.is_empty());
    assert_eq!(runner.reversals, vec!["speed"]);

    assert_eq!(mgr.sweep(t0 + 2000, &mut runner), 0);

    // The deferred timer arrives late and finds nothing to do.
    let due = timers.tick(Duration::from_millis(1000));
    assert_eq!(due, vec![handle]);
    for h in due {
        assert!(!mgr.deactivate(h, &mut runner));
    }
    assert_eq!(runner.reversals, vec!["speed"]);
    assert_eq!(runner.speed, 0.0);
}

#[test]
fn timer_first_then_sweep_is_a_noop() {
    let mut mgr = manager();
    let mut field = Field::default();
    let mut timers = DeferredTasks::new();
    let mut clock = ManualClock::at(0);
    let mut runner = Runner::default();
    collect(&mut mgr, &mut field, &mut timers, &clock, &mut runner, "speed", Vec2::ZERO);

    assert!(timers.tick(Duration::from_millis(999)).is_empty());
    let due = timers.tick(Duration::from_millis(1));
    assert_eq!(due.len(), 1);
    assert!(mgr.deactivate(due[0], &mut runner));

    clock.advance(1000);
    assert_eq!(mgr.sweep(1000, &mut runner), 0);
    assert_eq!(runner.reversals, vec!["speed"]);
}

#[test]
fn different_kinds_expire_independently() {
    let mut mgr = manager();
    let mut field = Field::default();
    let mut timers = DeferredTasks::new();
    let clock = ManualClock::at(0);
    let mut runner = Runner::default();
    let speed = collect(&mut mgr, &mut field, &mut timers, &clock, &mut runner, "speed", Vec2::ZERO);
    let shield = collect(&mut mgr, &mut field, &mut timers, &clock, &mut runner, "shield", Vec2::ONE);
    assert_eq!(mgr.len(), 2);
    assert!(runner.shielded);

    assert_eq!(mgr.sweep(400, &mut runner), 1);
    assert!(!mgr.is_active(shield));
    assert!(mgr.is_active(speed));
    assert!(!runner.shielded);
    assert_eq!(runner.speed, 5.0);

    assert_eq!(mgr.sweep(1000, &mut runner), 1);
    assert!(mgr.is_empty());
    assert_eq!(runner.reversals, vec!["shield", "speed"]);
}

#[test]
fn unknown_kind_leaves_no_trace() {
    let mut mgr = manager();
    let mut field = Field::default();
    let mut runner = Runner::default();
    assert!(mgr.spawn(&mut field, "laser", Vec2::ZERO).is_none());
    assert!(field.pickups.is_empty());
    assert_eq!(mgr.sweep(u64::MAX, &mut runner), 0);
    assert!(mgr.is_empty());
}
