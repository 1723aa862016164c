use std::time::Duration;

use bevy::prelude::*;

use super::active::ActiveHandle;
use super::definition::{DefinitionTable, PickupTag};
use super::host::{Clock, PickupScene};
use super::manager::{Activation, PowerupManager};
use super::timers::DeferredTasks;
use crate::core::components::{OverlapWatch, PickupRadius, PlayerStats, PowerupPickup, PowerupSubject};
use crate::core::config::PowerupConfig;
use crate::core::system::system_order::{MovementSet, PowerupSet};

/// Radius of a spawned pickup for overlap tests; also half its fallback quad size.
pub const PICKUP_RADIUS: f32 = 14.0;

/// The lifecycle manager bound to the arena's subject type.
#[derive(Resource, Deref, DerefMut)]
pub struct Powerups(pub PowerupManager<PlayerStats>);

/// Deferred deactivations scheduled at activation time.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct ExpiryTimers(pub DeferredTasks<ActiveHandle>);

/// Running counters, mostly for logs and tests.
#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
pub struct PowerupStats {
    pub spawned: u64,
    pub activated: u64,
    pub refreshed: u64,
    pub ignored: u64,
    pub expired_by_timer: u64,
    pub expired_by_sweep: u64,
}

impl PowerupStats {
    pub fn expired(&self) -> u64 {
        self.expired_by_timer + self.expired_by_sweep
    }
}

#[derive(Event, Debug, Clone)]
pub struct PowerupSpawned {
    pub kind: String,
    pub entity: Entity,
}

#[derive(Event, Debug, Clone)]
pub struct PowerupActivated {
    pub kind: String,
    pub handle: ActiveHandle,
    pub expires_at_ms: u64,
    pub refreshed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryCause {
    Timer,
    Sweep,
}

#[derive(Event, Debug, Clone)]
pub struct PowerupExpired {
    pub kind: String,
    pub handle: ActiveHandle,
    pub cause: ExpiryCause,
}

pub type WatchedPickups<'w, 's> = Query<
    'w,
    's,
    (Entity, &'static Transform, &'static PickupRadius, &'static PowerupPickup),
    With<OverlapWatch>,
>;

/// [`PickupScene`] over ECS commands: representations are entities carrying [`PowerupPickup`].
pub struct EcsPickupScene<'a, 'w, 's, 'pw, 'ps> {
    commands: &'a mut Commands<'w, 's>,
    pickups: &'a WatchedPickups<'pw, 'ps>,
    // Despawns are deferred; remember what was taken during this system run.
    taken: Vec<Entity>,
}

impl<'a, 'w, 's, 'pw, 'ps> EcsPickupScene<'a, 'w, 's, 'pw, 'ps> {
    pub fn new(commands: &'a mut Commands<'w, 's>, pickups: &'a WatchedPickups<'pw, 'ps>) -> Self {
        Self {
            commands,
            pickups,
            taken: Vec::new(),
        }
    }
}

impl PickupScene<PlayerStats> for EcsPickupScene<'_, '_, '_, '_, '_> {
    type Handle = Entity;

    fn spawn_representation(&mut self, tag: PickupTag<PlayerStats>, position: Vec2) -> Entity {
        let name = Name::new(format!("Pickup({})", tag.kind));
        self.commands
            .spawn((
                name,
                PowerupPickup(tag),
                PickupRadius(PICKUP_RADIUS),
                Transform::from_translation(position.extend(1.0)),
                Visibility::default(),
            ))
            .id()
    }

    fn watch_overlap(&mut self, handle: Entity) {
        self.commands.entity(handle).insert(OverlapWatch);
    }

    fn take_representation(&mut self, handle: Entity) -> Option<PickupTag<PlayerStats>> {
        if self.taken.contains(&handle) {
            return None;
        }
        let (_, _, _, pickup) = self.pickups.get(handle).ok()?;
        self.taken.push(handle);
        self.commands.entity(handle).despawn();
        Some(pickup.0.clone())
    }
}

pub struct PowerupPlugin;

impl Plugin for PowerupPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PowerupConfig>();
        let cfg = app.world().resource::<PowerupConfig>().clone();
        let definitions = match cfg.definitions() {
            Ok(defs) => defs,
            Err(e) => {
                error!(target: "powerups", "invalid powerup definitions ({e}); no powerups available");
                DefinitionTable::new()
            }
        };
        info!(
            target: "powerups",
            "PowerupPlugin: {} kinds, stacking={:?}, sweep={}",
            definitions.len(),
            cfg.stacking,
            cfg.sweep.enabled
        );
        let sweep_enabled = cfg.sweep.enabled;

        app.insert_resource(Powerups(PowerupManager::with_policy(definitions, cfg.stacking)))
            .init_resource::<ExpiryTimers>()
            .init_resource::<PowerupStats>()
            .add_event::<PowerupSpawned>()
            .add_event::<PowerupActivated>()
            .add_event::<PowerupExpired>()
            .configure_sets(
                Update,
                (PowerupSet::Expire, PowerupSet::Detect, PowerupSet::Sweep)
                    .chain()
                    .after(MovementSet),
            )
            .add_systems(
                Update,
                (
                    attach_pickup_sprites
                        .after(PowerupSet::Expire)
                        .before(PowerupSet::Detect),
                    detect_pickup_overlaps.in_set(PowerupSet::Detect),
                    fire_expiry_timers.in_set(PowerupSet::Expire),
                    sweep_expired_powerups
                        .in_set(PowerupSet::Sweep)
                        .run_if(move || sweep_enabled),
                ),
            );
    }
}

fn attach_pickup_sprites(
    mut commands: Commands,
    asset_server: Option<Res<AssetServer>>,
    cfg: Option<Res<PowerupConfig>>,
    q: Query<(Entity, &PowerupPickup, &PickupRadius), Added<PowerupPickup>>,
) {
    for (entity, pickup, radius) in &q {
        let size = Vec2::splat(radius.0 * 2.0);
        let tint = cfg
            .as_ref()
            .and_then(|c| c.entry(&pickup.0.kind))
            .map(|p| Color::srgb(p.tint.0, p.tint.1, p.tint.2))
            .unwrap_or(Color::WHITE);
        let sprite = match asset_server.as_ref() {
            Some(server) if !pickup.0.sprite_key.is_empty() => Sprite {
                image: server.load(pickup.0.sprite_key.clone()),
                custom_size: Some(size),
                ..default()
            },
            _ => Sprite::from_color(tint, size),
        };
        commands.entity(entity).insert(sprite);
    }
}

#[allow(clippy::too_many_arguments)]
fn detect_pickup_overlaps(
    mut commands: Commands,
    time: Res<Time>,
    mut powerups: ResMut<Powerups>,
    mut timers: ResMut<ExpiryTimers>,
    mut stats: ResMut<PowerupStats>,
    mut subject_q: Query<(&Transform, &PickupRadius, &mut PlayerStats), With<PowerupSubject>>,
    pickups: WatchedPickups,
    mut ev_activated: EventWriter<PowerupActivated>,
) {
    let Ok((subject_tf, subject_radius, mut player)) = subject_q.single_mut() else {
        return;
    };
    let subject_pos = subject_tf.translation.truncate();
    let hits: Vec<Entity> = pickups
        .iter()
        .filter(|(_, tf, r, _)| {
            let reach = subject_radius.0 + r.0;
            tf.translation.truncate().distance_squared(subject_pos) <= reach * reach
        })
        .map(|(e, ..)| e)
        .collect();
    if hits.is_empty() {
        return;
    }

    let mut scene = EcsPickupScene::new(&mut commands, &pickups);
    for pickup in hits {
        let outcome = powerups.activate(&mut scene, &mut timers.0, &*time, &mut *player, pickup);
        match outcome {
            Activation::Activated(handle) | Activation::Refreshed(handle) => {
                let refreshed = matches!(outcome, Activation::Refreshed(_));
                if refreshed {
                    stats.refreshed += 1;
                } else {
                    stats.activated += 1;
                }
                if let Some(entry) = powerups.get(handle) {
                    ev_activated.write(PowerupActivated {
                        kind: entry.kind.clone(),
                        handle,
                        expires_at_ms: entry.expires_at_ms,
                        refreshed,
                    });
                }
            }
            Activation::Ignored => stats.ignored += 1,
            Activation::Consumed => {}
        }
    }
}

fn fire_expiry_timers(
    time: Res<Time>,
    mut timers: ResMut<ExpiryTimers>,
    mut powerups: ResMut<Powerups>,
    mut stats: ResMut<PowerupStats>,
    mut subject_q: Query<&mut PlayerStats, With<PowerupSubject>>,
    mut ev_expired: EventWriter<PowerupExpired>,
) {
    let due = timers.tick(time.delta());
    if due.is_empty() {
        return;
    }
    let Ok(mut player) = subject_q.single_mut() else {
        // Keep them due until a subject exists again.
        for handle in due {
            timers.push(Duration::ZERO, handle);
        }
        return;
    };
    for handle in due {
        let Some(kind) = powerups.get(handle).map(|e| e.kind.clone()) else {
            continue;
        };
        if powerups.deactivate(handle, &mut player) {
            stats.expired_by_timer += 1;
            ev_expired.write(PowerupExpired {
                kind,
                handle,
                cause: ExpiryCause::Timer,
            });
        }
    }
}

fn sweep_expired_powerups(
    time: Res<Time>,
    mut powerups: ResMut<Powerups>,
    mut stats: ResMut<PowerupStats>,
    mut subject_q: Query<&mut PlayerStats, With<PowerupSubject>>,
    mut ev_expired: EventWriter<PowerupExpired>,
) {
    let Ok(mut player) = subject_q.single_mut() else {
        return;
    };
    let now = time.now_ms();
    let swept = powerups.sweep_with(now, &mut player, |handle, kind| {
        ev_expired.write(PowerupExpired {
            kind: kind.to_string(),
            handle,
            cause: ExpiryCause::Sweep,
        });
    });
    if swept > 0 {
        stats.expired_by_sweep += swept as u64;
        debug!(target: "powerups", "sweep at {now}ms reversed {swept} powerup(s)");
    }
}
