use serde::Deserialize;

use super::definition::PowerupEffect;
use crate::core::components::PlayerStats;

/// Data-driven effects configurable from RON. Each one is reversible on [`PlayerStats`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub enum EffectSpec {
    SpeedBoost { factor: f32 },
    Shield { charges: u32 },
    ScoreMultiplier { factor: f32 },
    Grow { scale: f32 },
}

impl EffectSpec {
    /// Multiplicative factors of zero (or negative) cannot be undone.
    pub fn is_reversible(&self) -> bool {
        match *self {
            EffectSpec::SpeedBoost { factor } | EffectSpec::ScoreMultiplier { factor } => {
                factor.is_finite() && factor > 0.0
            }
            EffectSpec::Grow { scale } => scale.is_finite() && scale > 0.0,
            EffectSpec::Shield { .. } => true,
        }
    }
}

impl PowerupEffect<PlayerStats> for EffectSpec {
    fn apply(&self, stats: &mut PlayerStats, activating: bool) {
        match *self {
            EffectSpec::SpeedBoost { factor } => {
                stats.speed_multiplier = scale(stats.speed_multiplier, factor, activating)
            }
            EffectSpec::ScoreMultiplier { factor } => {
                stats.score_multiplier = scale(stats.score_multiplier, factor, activating)
            }
            EffectSpec::Grow { scale: s } => {
                stats.size_scale = scale(stats.size_scale, s, activating)
            }
            EffectSpec::Shield { charges } => {
                if activating {
                    stats.shield_charges = stats.shield_charges.saturating_add(charges);
                } else {
                    stats.shield_charges = stats.shield_charges.saturating_sub(charges);
                }
            }
        }
    }
}

fn scale(value: f32, factor: f32, activating: bool) -> f32 {
    if !(factor.is_finite() && factor > 0.0) {
        return value;
    }
    if activating {
        value * factor
    } else {
        value / factor
    }
}
