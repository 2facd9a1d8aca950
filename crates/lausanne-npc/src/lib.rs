//! Lausanne NPC - Non-player characters for the Lausanne investigation game
//!
//! Provides wandering, paginated dialogue, the brewer's scripted encounter and
//! the quest NPC that judges the player's notebook. Engine services are reached
//! through the traits in [`host`]; [`sim`] implements them headlessly.

pub mod config;
pub mod content;
pub mod controller;
pub mod dialogue;
pub mod error;
pub mod host;
pub mod quest;
pub mod sim;
pub mod text;
pub mod wander;
pub mod world;

pub use config::{NpcConfig, NpcRole, ScriptedDialogue, TutorialDialogue};
pub use content::{DialogueLibrary, QuestScript, SessionState, SolutionBook};
pub use controller::NpcController;
pub use dialogue::{BrewScript, BrewThresholds, ConversationState, DialogueBuffer, DialogueSession};
pub use error::{DialogueKind, NpcError, NpcResult};
pub use host::{
    Animation, AnimationHost, DialogueContentProvider, DisplayHost, MovementHost, NpcContext, NpcId,
    PlayerHost, QuestDirector, QuestSolutionProvider, Scene, SceneTransitionHost,
};
pub use quest::{AnswerSheet, QuestComparisonResult, QuestEvaluator, QuestEvaluatorConfig, QuestResponse};
pub use text::{format_template, paginate, PageLayout, PAGE_BREAK};
pub use wander::{Locomotion, MotionConfig, WanderConfig, WanderController, WanderEvent};
pub use world::{Language, Location, Quest, WorldContext};
