#[cfg(feature = "debug")]
use bevy::prelude::*;
#[cfg(feature = "debug")]
use crate::core::components::PowerupPickup;
#[cfg(feature = "debug")]
use crate::gameplay::powerups::{ExpiryTimers, PowerupStats, Powerups};

#[cfg(feature = "debug")]
#[derive(Resource, Debug, Clone)]
pub struct DebugState {
    pub frame_counter: u64,
    pub time_accum: f32,
    /// Seconds between stats lines.
    pub log_interval: f32,
}
#[cfg(feature = "debug")]
impl Default for DebugState {
    fn default() -> Self {
        Self {
            frame_counter: 0,
            time_accum: 0.0,
            log_interval: 1.0,
        }
    }
}

#[cfg(feature = "debug")]
#[derive(Resource, Debug, Default, Clone)]
pub struct DebugStats {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub active: usize,
    pub pickups_live: usize,
    pub pending_timers: usize,
    pub totals: PowerupStats,
}

#[cfg(feature = "debug")]
pub fn debug_stats_collect_system(
    time: Res<Time>,
    mut state: ResMut<DebugState>,
    mut stats: ResMut<DebugStats>,
    powerups: Res<Powerups>,
    timers: Res<ExpiryTimers>,
    totals: Res<PowerupStats>,
    q_pickups: Query<(), With<PowerupPickup>>,
) {
    state.frame_counter += 1;
    let dt = time.delta_secs().max(1e-6);
    let inst_fps = 1.0 / dt;
    if stats.fps == 0.0 {
        stats.fps = inst_fps;
    } else {
        stats.fps = stats.fps * 0.9 + inst_fps * 0.1;
    }
    let inst_ms = dt * 1000.0;
    if stats.frame_time_ms == 0.0 {
        stats.frame_time_ms = inst_ms;
    } else {
        stats.frame_time_ms = stats.frame_time_ms * 0.9 + inst_ms * 0.1;
    }
    stats.active = powerups.len();
    stats.pickups_live = q_pickups.iter().count();
    stats.pending_timers = timers.len();
    if stats.totals != *totals {
        stats.totals = totals.clone();
    }
}

/// One line per `log_interval`: what is live now, then lifetime totals.
#[cfg(feature = "debug")]
pub fn debug_stats_report_system(time: Res<Time>, mut state: ResMut<DebugState>, stats: Res<DebugStats>) {
    state.time_accum += time.delta_secs();
    if state.time_accum < state.log_interval {
        return;
    }
    state.time_accum = 0.0;
    let t = &stats.totals;
    info!(
        target: "powerups",
        fps = stats.fps,
        frame = state.frame_counter,
        "live: active={} pickups={} timers={} | totals: spawned={} activated={} refreshed={} ignored={} expired={} (timer {}, sweep {})",
        stats.active,
        stats.pickups_live,
        stats.pending_timers,
        t.spawned,
        t.activated,
        t.refreshed,
        t.ignored,
        t.expired(),
        t.expired_by_timer,
        t.expired_by_sweep
    );
}
