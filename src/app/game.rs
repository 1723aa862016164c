// This file is part of Powerup Arena.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;

use crate::core::system::system_order::MovementSet;
use crate::debug::DebugPlugin;
use crate::gameplay::player::PlayerPlugin;
use crate::gameplay::powerups::PowerupPlugin;
use crate::gameplay::spawner::PickupSpawnerPlugin;
use crate::interaction::session::auto_close::AutoClosePlugin;

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb(0.06, 0.06, 0.09)))
            .configure_sets(Update, MovementSet)
            .add_systems(Startup, setup_camera)
            .add_plugins((
                PowerupPlugin,
                PickupSpawnerPlugin,
                PlayerPlugin,
                DebugPlugin,
                AutoClosePlugin,
            ));
    }
}

fn setup_camera(mut commands: Commands) {
    // Bevy 0.16+: spawn Camera2d component directly; Required Components supply defaults.
    commands.spawn(Camera2d);
}
