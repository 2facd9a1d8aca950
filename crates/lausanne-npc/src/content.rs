//! In-memory content and world state
//!
//! Plain data implementations of the content traits. Scene files deserialize
//! straight into these, and the world state round-trips through save files.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DialogueKind;
use crate::host::{DialogueContentProvider, QuestDirector, QuestSolutionProvider};
use crate::quest::AnswerSheet;
use crate::world::{objective, Language, Location, Quest, WorldContext};

#[derive(Debug, Clone)]
struct OpenDialogue {
    id: String,
    next_unit: usize,
}

/// Authored dialogue, keyed by id, plus whole scripts keyed by source and key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogueLibrary {
    #[serde(default)]
    pub dialogues: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub scripts: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    #[serde(skip)]
    open: Option<OpenDialogue>,
}

impl DialogueLibrary {
    pub fn insert_dialogue<I, S>(&mut self, id: &str, units: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dialogues
            .insert(id.to_string(), units.into_iter().map(Into::into).collect());
    }

    pub fn insert_script<I, S>(&mut self, source: &str, key: &str, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripts
            .entry(source.to_string())
            .or_default()
            .insert(key.to_string(), lines.into_iter().map(Into::into).collect());
    }

    /// Whether a dialogue is currently open
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

impl DialogueContentProvider for DialogueLibrary {
    fn query_dialogue(&self, key: &str, _mode: DialogueKind, source: &str) -> Option<Vec<String>> {
        self.scripts.get(source)?.get(key).cloned()
    }

    fn has_dialogue(&self, id: &str) -> bool {
        self.dialogues.get(id).is_some_and(|units| !units.is_empty())
    }

    fn start_dialogue(&mut self, id: &str, auto: bool) -> Option<String> {
        let first = self.dialogues.get(id)?.first()?.clone();
        debug!("Opened dialogue '{}' (auto: {})", id, auto);
        self.open = Some(OpenDialogue {
            id: id.to_string(),
            next_unit: 1,
        });
        Some(first)
    }

    fn next_dialogue(&mut self) -> Option<String> {
        let open = self.open.as_mut()?;
        let unit = self.dialogues.get(&open.id)?.get(open.next_unit)?.clone();
        open.next_unit += 1;
        Some(unit)
    }

    fn end_dialogue(&mut self) {
        self.open = None;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionEntry {
    pub tab: usize,
    pub language: Language,
    pub answers: AnswerSheet,
}

/// Canonical answers per notebook tab and language
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolutionBook {
    entries: Vec<SolutionEntry>,
}

impl SolutionBook {
    pub fn insert(&mut self, tab: usize, language: Language, answers: AnswerSheet) {
        self.entries.retain(|e| !(e.tab == tab && e.language == language));
        self.entries.push(SolutionEntry {
            tab,
            language,
            answers,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl QuestSolutionProvider for SolutionBook {
    fn query_solution(&self, tab: usize, language: Language) -> AnswerSheet {
        self.entries
            .iter()
            .find(|e| e.tab == tab && e.language == language)
            .map(|e| e.answers.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveLines {
    pub objective: u32,
    pub lines: Vec<String>,
}

/// Quest director that recites fixed lines for each objective id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestScript {
    stages: Vec<ObjectiveLines>,
    #[serde(skip)]
    cursor: usize,
}

impl QuestScript {
    pub fn insert<I, S>(&mut self, objective: u32, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages.retain(|s| s.objective != objective);
        self.stages.push(ObjectiveLines {
            objective,
            lines: lines.into_iter().map(Into::into).collect(),
        });
    }
}

impl QuestDirector for QuestScript {
    fn start_quest(&mut self, quest: Quest, world: &mut dyn WorldContext) {
        info!("Quest {:?} started", quest);
        world.set_current_quest(Some(quest));
        world.set_quest_objective_id(objective::INITIAL);
        self.cursor = 0;
    }

    fn quest_interaction(&mut self, world: &dyn WorldContext) -> Option<String> {
        world.current_quest()?;
        let id = world.quest_objective_id();
        let line = self
            .stages
            .iter()
            .find(|s| s.objective == id)
            .and_then(|s| s.lines.get(self.cursor))
            .cloned();
        match line {
            Some(line) => {
                self.cursor += 1;
                Some(line)
            }
            None => {
                self.cursor = 0;
                None
            }
        }
    }
}

fn default_location() -> Location {
    Location::Intro
}

/// Serializable world state shared by every NPC of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub brew_score: Option<f32>,
    #[serde(default = "default_location")]
    pub location: Location,
    #[serde(default)]
    pub quest: Option<Quest>,
    #[serde(default)]
    pub objective: u32,
    /// Correctness of each notebook tab
    #[serde(default)]
    pub tabs: Vec<bool>,
    #[serde(default)]
    pub current_tab: usize,
    #[serde(default)]
    pub brewer_return_position: Option<Vec2>,
    #[serde(default)]
    pub brew_cutscene_finished: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            brew_score: None,
            location: default_location(),
            quest: None,
            objective: objective::INITIAL,
            tabs: Vec::new(),
            current_tab: 0,
            brewer_return_position: None,
            brew_cutscene_finished: false,
        }
    }
}

impl SessionState {
    /// Fresh session with `count` unsolved notebook tabs
    pub fn with_tabs(count: usize) -> Self {
        Self {
            tabs: vec![false; count],
            ..Default::default()
        }
    }

    pub fn mark_tab(&mut self, tab: usize, correct: bool) {
        if let Some(slot) = self.tabs.get_mut(tab) {
            *slot = correct;
        }
    }
}

impl WorldContext for SessionState {
    fn brew_score(&self) -> Option<f32> {
        self.brew_score
    }

    fn current_location(&self) -> Location {
        self.location
    }

    fn current_quest(&self) -> Option<Quest> {
        self.quest
    }

    fn set_current_quest(&mut self, quest: Option<Quest>) {
        self.quest = quest;
    }

    fn quest_objective_id(&self) -> u32 {
        self.objective
    }

    fn set_quest_objective_id(&mut self, id: u32) {
        self.objective = id;
    }

    fn all_tabs_correct(&self) -> bool {
        !self.tabs.is_empty() && self.tabs.iter().all(|&t| t)
    }

    fn count_incorrect_tabs(&self) -> usize {
        self.tabs.iter().filter(|&&t| !t).count()
    }

    fn current_tab_index(&self) -> usize {
        self.current_tab
    }

    fn set_brewer_return_position(&mut self, position: Vec2) {
        self.brewer_return_position = Some(position);
    }

    fn end_brew_cutscene(&mut self) {
        self.brew_cutscene_finished = true;
    }
}
