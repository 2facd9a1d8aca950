//! World snapshots written at the end of a run
//!
//! Persists the shared world state (quest progress, brew score, notebook
//! tabs) and where every NPC ended up to JSON files.

use anyhow::{Context, Result};
use glam::Vec2;
use lausanne_npc::SessionState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// Top-level save data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version (for future migration)
    pub version: u32,
    /// Scene file the run was started from
    pub scene: String,
    /// Fixed steps simulated
    pub steps: u64,
    /// Total simulated time in seconds
    #[serde(default)]
    pub play_time_seconds: f64,
    /// Shared world state
    pub world: SessionState,
    /// Scene transitions requested by NPCs, in order
    #[serde(default)]
    pub scenes: Vec<String>,
    #[serde(default)]
    pub npcs: Vec<NpcSnapshot>,
}

/// Where an NPC stood and what it had become when the run ended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcSnapshot {
    pub name: String,
    pub role: String,
    pub position: Vec2,
    /// Pages of text the NPC displayed during the run
    pub pages_shown: usize,
}

/// Get the save directory path, creating it if it doesn't exist
fn save_dir() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lausanne")
        .join("saves");
    fs::create_dir_all(&dir).context("Failed to create save directory")?;
    Ok(dir)
}

/// Sanitize a scene name into a valid filename
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect::<String>()
        .to_lowercase()
}

/// Write the snapshot to `path`, or to the save directory under the scene name.
/// Returns where it was written.
pub fn save_snapshot(data: &SaveData, path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => save_dir()?.join(format!("{}.json", sanitize_filename(&data.scene))),
    };
    write_save(&path, data)?;
    Ok(path)
}

/// Load a snapshot written by a previous run
pub fn load_snapshot(path: &Path) -> Result<SaveData> {
    read_save(path)
}

// --- Internal helpers ---

fn write_save(path: &Path, data: &SaveData) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize save data")?;
    fs::write(path, json).context("Failed to write save file")?;
    Ok(())
}

fn read_save(path: &Path) -> Result<SaveData> {
    let json = fs::read_to_string(path).context("Failed to read save file")?;
    let data: SaveData = serde_json::from_str(&json).context("Failed to deserialize save data")?;
    Ok(data)
}

/// Format play time as "Xh Ym" or "Ym Zs"
pub fn format_play_time(seconds: f64) -> String {
    let total_secs = seconds as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, secs)
    }
}
