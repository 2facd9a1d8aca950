//! Shared world context: quest progress, brew score and notebook state
//!
//! One context lives for the whole game session and is lent to every NPC
//! call. NPCs only go through this trait; they never cache its values across
//! ticks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Languages a notebook answer may be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    French,
    German,
    English,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::French, Language::German, Language::English];
}

/// Where the player currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Introductory area where the tutorial quest is handed out
    Intro,
    Town,
    Brewery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quest {
    Tutorial,
    Investigation,
}

/// Ordered tutorial milestones stored as the quest objective id
pub mod objective {
    pub const INITIAL: u32 = 0;
    pub const TALK_TO_QUEST_NPC: u32 = 1;
    pub const OPEN_NOTEBOOK: u32 = 2;
    pub const CONFIRM_OPEN_NOTEBOOK: u32 = 3;

    /// Objective reached after the player finishes talking to the quest NPC
    pub fn after_quest_talk(current: u32) -> u32 {
        if current < TALK_TO_QUEST_NPC {
            TALK_TO_QUEST_NPC
        } else if current == OPEN_NOTEBOOK {
            CONFIRM_OPEN_NOTEBOOK
        } else {
            current
        }
    }
}

/// Process-wide game state read and written by NPCs
pub trait WorldContext {
    /// Score of the last brewing minigame, `None` until it has been played
    fn brew_score(&self) -> Option<f32>;
    fn current_location(&self) -> Location;
    fn current_quest(&self) -> Option<Quest>;
    fn set_current_quest(&mut self, quest: Option<Quest>);
    fn quest_objective_id(&self) -> u32;
    fn set_quest_objective_id(&mut self, id: u32);
    fn all_tabs_correct(&self) -> bool;
    fn count_incorrect_tabs(&self) -> usize;
    fn current_tab_index(&self) -> usize;
    /// Where the brewer stood before the minigame scene took over
    fn set_brewer_return_position(&mut self, position: Vec2);
    fn end_brew_cutscene(&mut self);
}

#[cfg(test)]
mod tests {
    use super::objective::*;

    #[test]
    fn test_first_talk_reaches_talk_milestone() {
        assert_eq!(after_quest_talk(INITIAL), TALK_TO_QUEST_NPC);
    }

    #[test]
    fn test_open_notebook_is_confirmed() {
        assert_eq!(after_quest_talk(OPEN_NOTEBOOK), CONFIRM_OPEN_NOTEBOOK);
    }

    #[test]
    fn test_other_milestones_are_kept() {
        assert_eq!(after_quest_talk(TALK_TO_QUEST_NPC), TALK_TO_QUEST_NPC);
        assert_eq!(after_quest_talk(CONFIRM_OPEN_NOTEBOOK), CONFIRM_OPEN_NOTEBOOK);
        assert_eq!(after_quest_talk(42), 42);
    }
}
