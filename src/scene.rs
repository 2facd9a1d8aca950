//! Scene files
//!
//! A scene bundles the NPCs of one map, the dialogue they can say, the
//! notebook solutions, the initial world state and a scripted player session.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec2;
use lausanne_npc::{AnswerSheet, DialogueLibrary, NpcConfig, QuestScript, SessionState, SolutionBook};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub world: SessionState,
    /// Where the player starts
    pub player: Vec2,
    pub dialogue: DialogueLibrary,
    pub solutions: SolutionBook,
    pub quest_script: QuestScript,
    #[serde(rename = "npc")]
    pub npcs: Vec<NpcEntry>,
    #[serde(rename = "step")]
    pub script: Vec<PlayerAction>,
}

/// One NPC placed in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcEntry {
    pub position: Vec2,
    /// Area the NPC may wander in, unbounded when absent
    #[serde(default)]
    pub pen: Option<Pen>,
    #[serde(default)]
    pub config: NpcConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pen {
    pub min: Vec2,
    pub max: Vec2,
}

/// What the scripted player does next
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Let the world run
    Wait { seconds: f32 },
    /// Walk up to an NPC, entering its hearing range
    Approach { npc: String },
    /// Walk away from an NPC
    Leave { npc: String },
    /// Press interact until the conversation is over
    Talk { npc: String },
    /// Show a notebook tab to a quest NPC and listen to the verdict
    Submit {
        npc: String,
        tab: usize,
        answers: AnswerSheet,
    },
    /// Finish the brewing minigame with a score
    Brew { score: f32 },
    /// Record a notebook tab as solved or not
    MarkTab { tab: usize, correct: bool },
}

impl SceneFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read scene {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse scene {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scene: SceneFile = toml::from_str(content)?;
        Ok(scene)
    }
}
