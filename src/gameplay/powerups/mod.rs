//! Powerup lifecycle: timed effects applied to one subject and reversed exactly once.
//!
//! [`manager::PowerupManager`] is engine-agnostic and driven through the
//! collaborator traits in [`host`]. [`plugin::PowerupPlugin`] binds it to Bevy.
pub mod active;
pub mod definition;
pub mod effects;
pub mod host;
pub mod manager;
pub mod plugin;
pub mod timers;

pub use active::{ActiveHandle, ActivePowerup, ActiveSet};
pub use definition::{DefinitionError, DefinitionTable, PickupTag, PowerupDefinition, PowerupEffect};
pub use effects::EffectSpec;
pub use host::{Clock, ManualClock, PickupScene, Scheduler};
pub use manager::{Activation, PowerupManager, StackPolicy};
pub use plugin::{
    EcsPickupScene, ExpiryCause, ExpiryTimers, PowerupActivated, PowerupExpired, PowerupPlugin,
    PowerupSpawned, PowerupStats, Powerups,
};
pub use timers::DeferredTasks;
