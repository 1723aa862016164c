//! Central system ordering labels to make update sequence explicit.
//! Stages (high-level):
//! 1. Movement (player input moves the subject)
//! 2. Powerup Expire (deferred timers deliver deactivations)
//! 3. Powerup Detect (subject/pickup overlap -> activation)
//! 4. Powerup Sweep (backstop for anything the timers missed)
//!
//! Expire runs ahead of Detect so a timer scheduled this frame is first
//! ticked by the next frame's delta, never by time that elapsed before it.
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct MovementSet; // subject transform updates before overlap tests

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum PowerupSet {
    Expire,
    Detect,
    Sweep,
}
