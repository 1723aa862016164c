use bevy::prelude::*;

use crate::gameplay::powerups::definition::PickupTag;

/// Marker for the single entity powerup effects are applied to.
#[derive(Component)]
pub struct PowerupSubject;

/// Gameplay modifiers powerups act on. All multipliers start at 1.0.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub speed_multiplier: f32,
    pub score_multiplier: f32,
    pub size_scale: f32,
    pub shield_charges: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            score_multiplier: 1.0,
            size_scale: 1.0,
            shield_charges: 0,
        }
    }
}

impl PlayerStats {
    /// Equality tolerant of the float drift from multiply/divide pairs.
    pub fn approx_eq(&self, other: &Self) -> bool {
        const EPS: f32 = 1e-4;
        (self.speed_multiplier - other.speed_multiplier).abs() < EPS
            && (self.score_multiplier - other.score_multiplier).abs() < EPS
            && (self.size_scale - other.size_scale).abs() < EPS
            && self.shield_charges == other.shield_charges
    }
}

/// Collection radius used for circle overlap tests (world units).
#[derive(Component, Debug, Deref, DerefMut, Copy, Clone)]
pub struct PickupRadius(pub f32);

/// A spawned-but-not-collected powerup; carries the metadata read on activation.
#[derive(Component, Debug, Clone)]
pub struct PowerupPickup(pub PickupTag<PlayerStats>);

/// Present while the pickup participates in overlap detection with the subject.
#[derive(Component, Debug, Default, Copy, Clone)]
pub struct OverlapWatch;
