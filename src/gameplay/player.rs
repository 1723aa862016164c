use bevy::prelude::*;

use crate::core::components::{PickupRadius, PlayerStats, PowerupSubject};
use crate::core::config::PowerupConfig;
use crate::core::system::system_order::{MovementSet, PowerupSet};
use crate::gameplay::powerups::PowerupActivated;

/// Points for collecting any pickup, before `score_multiplier`.
pub const PICKUP_POINTS: f32 = 10.0;

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Score(pub u64);

/// Spawns the subject and keeps its transform/visuals in step with [`PlayerStats`].
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PowerupConfig>()
            .init_resource::<Score>()
            .add_systems(Startup, spawn_player)
            .add_systems(Update, move_player.in_set(MovementSet))
            .add_systems(
                Update,
                (
                    award_pickup_score.after(PowerupSet::Detect),
                    apply_player_stats.after(PowerupSet::Sweep),
                ),
            );
    }
}

fn spawn_player(mut commands: Commands, cfg: Res<PowerupConfig>) {
    let p = &cfg.player;
    commands.spawn((
        Name::new("Player"),
        PowerupSubject,
        PlayerStats::default(),
        PickupRadius(p.pickup_radius),
        Sprite::from_color(Color::WHITE, Vec2::splat(p.size)),
        Transform::from_xyz(0.0, 0.0, 2.0),
    ));
}

fn move_player(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    time: Res<Time>,
    cfg: Res<PowerupConfig>,
    mut q: Query<(&mut Transform, &PlayerStats), With<PowerupSubject>>,
) {
    let Some(keys) = keys else {
        return;
    };
    let mut dir = Vec2::ZERO;
    if keys.any_pressed([KeyCode::ArrowLeft, KeyCode::KeyA]) {
        dir.x -= 1.0;
    }
    if keys.any_pressed([KeyCode::ArrowRight, KeyCode::KeyD]) {
        dir.x += 1.0;
    }
    if keys.any_pressed([KeyCode::ArrowDown, KeyCode::KeyS]) {
        dir.y -= 1.0;
    }
    if keys.any_pressed([KeyCode::ArrowUp, KeyCode::KeyW]) {
        dir.y += 1.0;
    }
    if dir == Vec2::ZERO {
        return;
    }
    let Ok((mut tf, stats)) = q.single_mut() else {
        return;
    };
    let step = dir.normalize() * cfg.player.speed * stats.speed_multiplier * time.delta_secs();
    let half = Vec2::new(cfg.window.width, cfg.window.height) * 0.5;
    let next = (tf.translation.truncate() + step).clamp(-half, half);
    tf.translation.x = next.x;
    tf.translation.y = next.y;
}

fn award_pickup_score(
    mut ev_activated: EventReader<PowerupActivated>,
    mut score: ResMut<Score>,
    q: Query<&PlayerStats, With<PowerupSubject>>,
) {
    let multiplier = q.single().map(|s| s.score_multiplier).unwrap_or(1.0);
    for _ in ev_activated.read() {
        score.0 += (PICKUP_POINTS * multiplier).round().max(0.0) as u64;
    }
}

fn apply_player_stats(
    cfg: Res<PowerupConfig>,
    mut q: Query<
        (&PlayerStats, &mut Transform, &mut PickupRadius, Option<&mut Sprite>),
        (With<PowerupSubject>, Changed<PlayerStats>),
    >,
) {
    for (stats, mut tf, mut radius, sprite) in &mut q {
        tf.scale = Vec3::splat(stats.size_scale);
        radius.0 = cfg.player.pickup_radius * stats.size_scale;
        if let Some(mut sprite) = sprite {
            sprite.color = if stats.shield_charges > 0 {
                Color::srgb(0.5, 1.0, 1.0)
            } else {
                Color::WHITE
            };
        }
    }
}
