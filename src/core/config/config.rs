use bevy::prelude::*;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};
use thiserror::Error;

use crate::core::components::PlayerStats;
use crate::gameplay::powerups::definition::{DefinitionError, DefinitionTable, PowerupDefinition};
use crate::gameplay::powerups::effects::EffectSpec;
use crate::gameplay::powerups::manager::StackPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse RON {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    /// Automatically close the app after this many seconds. 0.0 (or omitted) = run indefinitely.
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Powerup Arena".into(),
            auto_close: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Base movement speed (units/sec) before `speed_multiplier`.
    pub speed: f32,
    /// Edge length of the player quad before `size_scale`.
    pub size: f32,
    pub pickup_radius: f32,
}
impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 260.0,
            size: 28.0,
            pickup_radius: 26.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    /// Per-frame expiry sweep backing up the deferred timers.
    pub enabled: bool,
}
impl Default for SweepConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpawnRange<T> {
    pub min: T,
    pub max: T,
}
impl<T: Default> Default for SpawnRange<T> {
    fn default() -> Self {
        Self {
            min: Default::default(),
            max: Default::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpawnerConfig {
    pub enabled: bool,
    pub interval_secs: f32,
    /// Random spawning pauses while this many pickups are uncollected.
    pub max_live: usize,
    pub x_range: SpawnRange<f32>,
    pub y_range: SpawnRange<f32>,
    /// Fixed RNG seed for reproducible spawn sequences.
    pub seed: Option<u64>,
}
impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 2.5,
            max_live: 4,
            x_range: SpawnRange {
                min: -560.0,
                max: 560.0,
            },
            y_range: SpawnRange {
                min: -300.0,
                max: 300.0,
            },
            seed: None,
        }
    }
}

/// Fixed pickup location spawned at startup.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Placement {
    pub kind: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PowerupEntry {
    pub kind: String,
    #[serde(default)]
    pub sprite: String,
    pub duration_ms: u64,
    pub effect: EffectSpec,
    /// Fallback quad color when the sprite cannot be loaded.
    #[serde(default = "default_tint")]
    pub tint: (f32, f32, f32),
}

fn default_tint() -> (f32, f32, f32) {
    (1.0, 1.0, 1.0)
}

impl PowerupEntry {
    pub fn definition(&self) -> PowerupDefinition<PlayerStats> {
        PowerupDefinition::new(self.kind.clone(), self.sprite.clone(), self.duration_ms, self.effect)
    }
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct PowerupConfig {
    pub window: WindowConfig,
    pub player: PlayerConfig,
    pub stacking: StackPolicy,
    pub sweep: SweepConfig,
    pub spawner: SpawnerConfig,
    pub placements: Vec<Placement>,
    pub powerups: Vec<PowerupEntry>,
}
impl Default for PowerupConfig {
    fn default() -> Self {
        Self {
            window: Default::default(),
            player: Default::default(),
            stacking: StackPolicy::Stack,
            sweep: Default::default(),
            spawner: Default::default(),
            placements: Vec::new(),
            powerups: vec![
                PowerupEntry {
                    kind: "speed".into(),
                    sprite: String::new(),
                    duration_ms: 5_000,
                    effect: EffectSpec::SpeedBoost { factor: 1.6 },
                    tint: (0.2, 0.8, 1.0),
                },
                PowerupEntry {
                    kind: "shield".into(),
                    sprite: String::new(),
                    duration_ms: 8_000,
                    effect: EffectSpec::Shield { charges: 1 },
                    tint: (0.4, 1.0, 0.4),
                },
                PowerupEntry {
                    kind: "score".into(),
                    sprite: String::new(),
                    duration_ms: 6_000,
                    effect: EffectSpec::ScoreMultiplier { factor: 2.0 },
                    tint: (1.0, 0.85, 0.2),
                },
                PowerupEntry {
                    kind: "grow".into(),
                    sprite: String::new(),
                    duration_ms: 4_000,
                    effect: EffectSpec::Grow { scale: 1.5 },
                    tint: (1.0, 0.4, 0.7),
                },
            ],
        }
    }
}

/// `Option` fields may be written bare (`seed: 7`) instead of `Some(7)`.
fn ron_options() -> ron::Options {
    ron::Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

/// One file's worth of overrides for [`PowerupConfig::load_layered`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    window: Option<WindowConfig>,
    player: Option<PlayerConfig>,
    stacking: Option<StackPolicy>,
    sweep: Option<SweepConfig>,
    spawner: Option<SpawnerConfig>,
    placements: Option<Vec<Placement>>,
    powerups: Option<Vec<PowerupEntry>>,
}

impl ConfigLayer {
    fn apply_to(self, cfg: &mut PowerupConfig) {
        if let Some(v) = self.window {
            cfg.window = v;
        }
        if let Some(v) = self.player {
            cfg.player = v;
        }
        if let Some(v) = self.stacking {
            cfg.stacking = v;
        }
        if let Some(v) = self.sweep {
            cfg.sweep = v;
        }
        if let Some(v) = self.spawner {
            cfg.spawner = v;
        }
        if let Some(v) = self.placements {
            cfg.placements = v;
        }
        if let Some(v) = self.powerups {
            cfg.powerups = v;
        }
    }
}

impl PowerupConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron_options().from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e.to_string())),
        }
    }

    /// Apply several RON files in order; each top-level section present in a later file
    /// replaces the earlier one wholesale. Returns (config, files used, errors).
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        let mut cfg = Self::default();
        let mut used = Vec::new();
        let mut errors = Vec::new();
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron_options().from_str::<ConfigLayer>(&txt) {
                    Ok(layer) => {
                        layer.apply_to(&mut cfg);
                        used.push(path_ref.display().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        (cfg, used, errors)
    }

    pub fn definitions(&self) -> Result<DefinitionTable<PlayerStats>, DefinitionError> {
        DefinitionTable::try_from_definitions(self.powerups.iter().map(PowerupEntry::definition))
    }

    pub fn entry(&self, kind: &str) -> Option<&PowerupEntry> {
        self.powerups.iter().find(|p| p.kind == kind)
    }

    /// Human-readable warnings; never fatal.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.window.auto_close
            ));
        }
        if self.player.speed <= 0.0 {
            w.push(format!("player.speed {} must be > 0", self.player.speed));
        }
        if self.player.pickup_radius <= 0.0 {
            w.push("player.pickup_radius must be > 0; nothing can be collected".into());
        }
        if self.powerups.is_empty() {
            w.push("no powerups defined; spawner and placements will do nothing".into());
        }
        for p in &self.powerups {
            if p.duration_ms == 0 {
                w.push(format!(
                    "powerup '{}' has duration_ms 0; effect reverses on the next frame",
                    p.kind
                ));
            }
            if !p.effect.is_reversible() {
                w.push(format!(
                    "powerup '{}' effect {:?} cannot be reversed and will be inert",
                    p.kind, p.effect
                ));
            }
        }
        if let Err(e) = self.definitions() {
            w.push(format!("powerups: {e}"));
        }
        for pl in &self.placements {
            if self.entry(&pl.kind).is_none() {
                w.push(format!(
                    "placement at ({}, {}) references unknown kind '{}'",
                    pl.x, pl.y, pl.kind
                ));
            }
        }
        fn check_range_f32(w: &mut Vec<String>, label: &str, r: &SpawnRange<f32>) {
            if r.min > r.max {
                w.push(format!(
                    "{label} min ({}) greater than max ({})",
                    r.min, r.max
                ));
            }
        }
        if self.spawner.enabled {
            if self.spawner.interval_secs <= 0.0 {
                w.push(format!(
                    "spawner.interval_secs {} must be > 0",
                    self.spawner.interval_secs
                ));
            }
            if self.spawner.max_live == 0 {
                w.push("spawner.max_live is 0; random spawning never happens".into());
            }
            check_range_f32(&mut w, "spawner.x_range", &self.spawner.x_range);
            check_range_f32(&mut w, "spawner.y_range", &self.spawner.y_range);
        }
        if !self.sweep.enabled {
            w.push("sweep disabled; expirations rely solely on deferred timers".into());
        }
        w
    }
}
