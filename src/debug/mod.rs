//! Debug module: feature gated periodic stats logging.
//! Built only when compiled with `--features debug`.

#[cfg(feature = "debug")]
mod stats;

#[cfg(feature = "debug")]
pub use stats::{DebugState, DebugStats};

#[cfg(feature = "debug")]
use bevy::prelude::*;
#[cfg(feature = "debug")]
use crate::core::system::system_order::PowerupSet;

#[cfg(feature = "debug")]
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct DebugReportSet;

#[cfg(feature = "debug")]
pub struct DebugPlugin;
#[cfg(feature = "debug")]
impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        use stats::{debug_stats_collect_system, debug_stats_report_system};

        app.init_resource::<DebugState>()
            .init_resource::<DebugStats>()
            .configure_sets(Update, DebugReportSet.after(PowerupSet::Sweep))
            .add_systems(
                Update,
                (debug_stats_collect_system, debug_stats_report_system)
                    .chain()
                    .in_set(DebugReportSet),
            );
    }
}

#[cfg(not(feature = "debug"))]
pub struct DebugPlugin;
#[cfg(not(feature = "debug"))]
impl bevy::prelude::Plugin for DebugPlugin {
    fn build(&self, _app: &mut bevy::prelude::App) {}
}
