//! Engine-facing collaborators
//!
//! The NPC core never touches rendering, physics or scene loading directly.
//! Everything it needs from the engine goes through these traits, bundled
//! per call in an [`NpcContext`].

use glam::Vec2;

use crate::error::DialogueKind;
use crate::quest::AnswerSheet;
use crate::world::{Language, Quest, WorldContext};

/// Unique identifier for an NPC instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NpcId(pub u64);

/// Looks up authored dialogue and walks through dialogue units
pub trait DialogueContentProvider {
    /// Fetch a whole script by key from a source file
    fn query_dialogue(&self, key: &str, mode: DialogueKind, source: &str) -> Option<Vec<String>>;
    /// Whether `id` names a dialogue this provider can start
    fn has_dialogue(&self, id: &str) -> bool;
    /// Open dialogue `id` and return its first unit
    fn start_dialogue(&mut self, id: &str, auto: bool) -> Option<String>;
    /// Next unit of the open dialogue, `None` once it is over
    fn next_dialogue(&mut self) -> Option<String>;
    fn end_dialogue(&mut self);
}

/// Canonical notebook answers
pub trait QuestSolutionProvider {
    fn query_solution(&self, tab: usize, language: Language) -> AnswerSheet;
}

/// External quest controller driving quest NPC lines
pub trait QuestDirector {
    fn start_quest(&mut self, quest: Quest, world: &mut dyn WorldContext);
    /// Next line for the current quest state, `None` when there is nothing left to say
    fn quest_interaction(&mut self, world: &dyn WorldContext) -> Option<String>;
}

/// Kinematic body of the NPC
pub trait MovementHost {
    fn position(&self) -> Vec2;
    /// Contact point of the last collision, if the body touched something
    fn last_collision(&self) -> Option<Vec2>;
    /// Move with `velocity` and return the velocity left after obstacle resolution
    fn move_and_slide(&mut self, velocity: Vec2) -> Vec2;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    Idle,
    Walk,
}

pub trait AnimationHost {
    fn set_active(&mut self, active: bool);
    fn travel(&mut self, animation: Animation);
    fn set_blend_direction(&mut self, direction: Vec2);
}

/// The NPC's text box
pub trait DisplayHost {
    fn show_text(&mut self, page: &str);
    fn show_continue_prompt(&mut self);
    fn hide_text(&mut self);
    fn hide_all(&mut self);
}

/// One-shot scene changes triggered by NPCs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    BrewMinigame,
    EndScreen,
}

pub trait SceneTransitionHost {
    fn go_to_scene(&mut self, scene: Scene);
}

/// The player an NPC is talking to
pub trait PlayerHost {
    fn position(&self) -> Vec2;
    fn begin_conversation(&mut self);
    fn end_conversation(&mut self);
    fn subscribe(&mut self, npc: NpcId);
    fn unsubscribe(&mut self, npc: NpcId);
}

/// Collaborators lent to an NPC for one tick or event
pub struct NpcContext<'a> {
    pub world: &'a mut dyn WorldContext,
    pub dialogue: &'a mut dyn DialogueContentProvider,
    pub solutions: &'a dyn QuestSolutionProvider,
    pub quests: &'a mut dyn QuestDirector,
    pub display: &'a mut dyn DisplayHost,
    pub body: &'a mut dyn MovementHost,
    pub animation: &'a mut dyn AnimationHost,
    pub scenes: &'a mut dyn SceneTransitionHost,
}
