pub mod config;

pub use config::{
    ConfigError, Placement, PlayerConfig, PowerupConfig, PowerupEntry, SpawnRange, SpawnerConfig,
    SweepConfig, WindowConfig,
};
