pub mod player;
pub mod powerups;
pub mod spawner;
