pub mod app;
pub mod core;
pub mod debug;
pub mod gameplay;
pub mod interaction;

// Curated re-exports
pub use core::config::{PowerupConfig, WindowConfig};
pub use core::components::{PickupRadius, PlayerStats, PowerupPickup, PowerupSubject};
pub use app::game::GamePlugin;
pub use gameplay::powerups::{
    Activation, ActiveHandle, PowerupDefinition, PowerupEffect, PowerupManager, PowerupPlugin,
    StackPolicy,
};
