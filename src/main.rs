//! Lausanne - Headless NPC scene runner
//!
//! Loads a scene, plays its scripted player session against the NPCs at a
//! fixed timestep and writes the resulting world state to disk.
//!
//! Usage:
//!   lausanne [settings.toml]
//!   lausanne --init-settings
//!   lausanne --inspect <save.json>

mod runner;
mod save;
mod scene;
mod settings;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use runner::SceneRunner;
use scene::SceneFile;
use settings::Settings;

/// Filter from `RUST_LOG`, or `level` when it is unset
fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn main() -> Result<()> {
    // Initialize logging
    let builder = FmtSubscriber::builder()
        .with_env_filter(log_filter("info"))
        .with_target(false)
        .with_filter_reloading();
    let filter_handle = builder.reload_handle();
    tracing::subscriber::set_global_default(builder.finish()).context("Failed to set subscriber")?;

    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("--init-settings") => return Settings::default().save(),
        Some("--inspect") => {
            let path = args.get(1).context("--inspect needs a save file")?;
            let data = save::load_snapshot(Path::new(path))?;
            println!("{}", serde_json::to_string_pretty(&data.world)?);
            return Ok(());
        }
        _ => {}
    }

    let settings = Settings::load(args.first().map(Path::new))?;
    filter_handle
        .reload(log_filter(&settings.logging.level))
        .context("Failed to apply log level")?;

    info!("Starting Lausanne scene runner...");

    let scene_path = &settings.simulation.scene;
    let scene = SceneFile::load(scene_path)?;
    let scene_name = scene_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("scene")
        .to_string();

    let mut runner = SceneRunner::new(scene, &settings.simulation)?;
    runner.run()?;

    let data = runner.snapshot(&scene_name);
    let path = save::save_snapshot(&data, settings.simulation.save_path.as_deref())?;
    info!(
        "Saved world after {} to {:?}",
        save::format_play_time(data.play_time_seconds),
        path
    );

    Ok(())
}
