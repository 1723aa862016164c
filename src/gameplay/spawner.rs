use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::{PowerupConfig, SpawnRange};
use crate::core::system::system_order::PowerupSet;
use crate::gameplay::powerups::plugin::WatchedPickups;
use crate::gameplay::powerups::{EcsPickupScene, PowerupSpawned, PowerupStats, Powerups};

/// Places configured pickups at startup and drops random ones on an interval.
pub struct PickupSpawnerPlugin;

#[derive(Resource)]
pub struct PickupSpawner {
    pub timer: Timer,
    rng: StdRng,
}

impl PickupSpawner {
    pub fn new(interval_secs: f32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            timer: Timer::from_seconds(interval_secs.max(0.05), TimerMode::Repeating),
            rng,
        }
    }
}

impl Plugin for PickupSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PowerupConfig>();
        let spawner_cfg = app.world().resource::<PowerupConfig>().spawner.clone();
        app.insert_resource(PickupSpawner::new(spawner_cfg.interval_secs, spawner_cfg.seed))
            .add_systems(Startup, spawn_placements)
            .add_systems(Update, spawn_random_pickups.before(PowerupSet::Detect));
    }
}

fn sample(rng: &mut StdRng, r: &SpawnRange<f32>) -> f32 {
    if r.min < r.max {
        rng.gen_range(r.min..r.max)
    } else {
        r.min
    }
}

fn spawn_placements(
    mut commands: Commands,
    cfg: Res<PowerupConfig>,
    powerups: Res<Powerups>,
    pickups: WatchedPickups,
    mut stats: ResMut<PowerupStats>,
    mut ev_spawned: EventWriter<PowerupSpawned>,
) {
    let mut scene = EcsPickupScene::new(&mut commands, &pickups);
    for placement in &cfg.placements {
        let position = Vec2::new(placement.x, placement.y);
        if let Some(entity) = powerups.spawn(&mut scene, &placement.kind, position) {
            stats.spawned += 1;
            ev_spawned.write(PowerupSpawned {
                kind: placement.kind.clone(),
                entity,
            });
        }
    }
    if !cfg.placements.is_empty() {
        info!(target: "powerups", "placed {} of {} configured pickups", stats.spawned, cfg.placements.len());
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_random_pickups(
    mut commands: Commands,
    time: Res<Time>,
    cfg: Res<PowerupConfig>,
    mut spawner: ResMut<PickupSpawner>,
    powerups: Res<Powerups>,
    pickups: WatchedPickups,
    mut stats: ResMut<PowerupStats>,
    mut ev_spawned: EventWriter<PowerupSpawned>,
) {
    let sc = &cfg.spawner;
    if !sc.enabled {
        return;
    }
    spawner.timer.tick(time.delta());
    if !spawner.timer.just_finished() {
        return;
    }
    if pickups.iter().count() >= sc.max_live {
        return;
    }
    let kinds = powerups.definitions().kinds();
    if kinds.is_empty() {
        return;
    }
    let spawner = &mut *spawner;
    let kind = kinds[spawner.rng.gen_range(0..kinds.len())];
    let position = Vec2::new(sample(&mut spawner.rng, &sc.x_range), sample(&mut spawner.rng, &sc.y_range));

    let mut scene = EcsPickupScene::new(&mut commands, &pickups);
    if let Some(entity) = powerups.spawn(&mut scene, kind, position) {
        stats.spawned += 1;
        ev_spawned.write(PowerupSpawned {
            kind: kind.to_string(),
            entity,
        });
    }
}
