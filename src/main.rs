use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bevy::prelude::*;
use clap::Parser;

use powerup_arena::core::config::PowerupConfig;
use powerup_arena::GamePlugin;

#[derive(Parser, Debug)]
#[command(about = "Collect timed powerups in a small arena", version)]
struct Args {
    /// RON config files applied in order; later files override earlier sections.
    #[arg(long = "config", default_value = "assets/config/powerups.ron")]
    configs: Vec<PathBuf>,
    /// Exit after this many seconds (overrides window.autoClose).
    #[arg(long)]
    auto_close: Option<f32>,
    /// Rely on deferred timers alone; skip the per-frame expiry sweep.
    #[arg(long)]
    no_sweep: bool,
    /// Load and validate the config, print the powerup kinds, then exit.
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (mut cfg, used, errors) = PowerupConfig::load_layered(&args.configs);
    if let Some(secs) = args.auto_close {
        cfg.window.auto_close = secs;
    }
    if args.no_sweep {
        cfg.sweep.enabled = false;
    }

    if args.check {
        for e in &errors {
            eprintln!("error: {e}");
        }
        for w in cfg.validate() {
            eprintln!("warning: {w}");
        }
        let defs = cfg.definitions().context("powerup definitions")?;
        println!("config: {}", used.join(", "));
        println!("stacking: {:?}, sweep: {}", cfg.stacking, cfg.sweep.enabled);
        for kind in defs.kinds() {
            if let Some(d) = defs.get(kind) {
                println!("  {kind}: {}ms", d.duration_ms);
            }
        }
        if !errors.is_empty() {
            bail!("{} config file(s) failed to load", errors.len());
        }
        return Ok(());
    }

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: cfg.window.title.clone(),
            resolution: (cfg.window.width, cfg.window.height).into(),
            resizable: true,
            ..default()
        }),
        ..default()
    }));

    // Logging is live once DefaultPlugins are built.
    if used.is_empty() {
        warn!(target: "powerups", "no config file loaded; using built-in defaults");
    } else {
        info!(target: "powerups", "config layers: {}", used.join(", "));
    }
    for e in &errors {
        error!(target: "powerups", "config: {e}");
    }
    for w in cfg.validate() {
        warn!(target: "powerups", "config: {w}");
    }

    app.insert_resource(cfg).add_plugins(GamePlugin).run();
    Ok(())
}
