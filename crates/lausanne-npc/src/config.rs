//! Per-NPC configuration, read from scene files

use lausanne_core::Direction;
use serde::{Deserialize, Serialize};

use crate::dialogue::BrewThresholds;
use crate::error::{NpcError, NpcResult};
use crate::quest::QuestEvaluatorConfig;
use crate::text::PageLayout;
use crate::wander::{MotionConfig, WanderConfig};

/// Demand dialogue override for a scripted character, keyed on the brew score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedDialogue {
    #[serde(default = "default_bad_threshold")]
    pub bad_threshold: f32,
    pub bad_dialogue: String,
    pub good_dialogue: String,
}

fn default_bad_threshold() -> f32 {
    BrewThresholds::default().bad
}

impl ScriptedDialogue {
    /// Dialogue to use once the brew minigame has a score
    pub fn for_score(&self, score: f32) -> &str {
        if score < self.bad_threshold {
            &self.bad_dialogue
        } else {
            &self.good_dialogue
        }
    }
}

/// What the NPC does when the player interacts with it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NpcRole {
    /// Plays its demand dialogue
    #[default]
    Generic,
    /// Talks through the quest director and evaluates notebook tabs
    QuestGiver,
    /// Plays a brew script, then sends the player to the brewing minigame
    Brewer(BrewThresholds),
    /// Generic, but its demand dialogue depends on the brew score
    SpecialScripted(ScriptedDialogue),
}

impl NpcRole {
    pub fn name(&self) -> &'static str {
        match self {
            NpcRole::Generic => "Generic",
            NpcRole::QuestGiver => "Quest Giver",
            NpcRole::Brewer(_) => "Brewer",
            NpcRole::SpecialScripted(_) => "Special Scripted",
        }
    }

    /// Whether interactions go through the regular demand dialogue provider
    pub fn uses_demand_dialogue(&self) -> bool {
        matches!(self, NpcRole::Generic | NpcRole::SpecialScripted(_))
    }
}

/// Demand dialogue used while the tutorial quest is active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialDialogue {
    pub before_notebook: String,
    pub after_notebook: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    pub name: String,
    pub initial_direction: Direction,
    /// Whether the NPC turns to face the player when a conversation starts
    pub can_turn: bool,
    pub wander: WanderConfig,
    pub motion: MotionConfig,
    /// Chance per tick (0 to 100) that the idle animation starts
    pub idle_start_probability: u32,
    pub auto_dialogue: Option<String>,
    pub demand_dialogue: Option<String>,
    pub has_auto_dialogue: bool,
    pub has_demand_dialogue: bool,
    pub role: NpcRole,
    pub tutorial: Option<TutorialDialogue>,
    pub layout: PageLayout,
    pub quest: QuestEvaluatorConfig,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            name: "npc".into(),
            initial_direction: Direction::Down,
            can_turn: true,
            wander: WanderConfig::default(),
            motion: MotionConfig::default(),
            idle_start_probability: 25,
            auto_dialogue: None,
            demand_dialogue: None,
            has_auto_dialogue: true,
            has_demand_dialogue: true,
            role: NpcRole::Generic,
            tutorial: None,
            layout: PageLayout::default(),
            quest: QuestEvaluatorConfig::default(),
        }
    }
}

impl NpcConfig {
    pub fn validate(&self) -> NpcResult<()> {
        let invalid = |msg: String| Err(NpcError::InvalidConfig(format!("{}: {}", self.name, msg)));

        if self.idle_start_probability > 100 {
            return invalid(format!(
                "idle start probability {} is above 100",
                self.idle_start_probability
            ));
        }
        if self.wander.cooldown < 0.0 || self.wander.distance < 0.0 {
            return invalid("wander cooldown and distance must not be negative".into());
        }
        let m = &self.motion;
        if m.walk_speed < 0.0 || m.acceleration < 0.0 || m.friction < 0.0 {
            return invalid("walk speed, acceleration and friction must not be negative".into());
        }
        if let NpcRole::Brewer(t) = &self.role {
            if t.bad > t.perfect {
                return invalid(format!(
                    "brew bad threshold {} is above perfect threshold {}",
                    t.bad, t.perfect
                ));
            }
        }
        self.layout
            .validate()
            .map_err(|e| NpcError::InvalidConfig(format!("{}: {}", self.name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_authoring_defaults() {
        let config = NpcConfig::default();
        assert_eq!(config.wander.weights.right, 2);
        assert!(!config.wander.enabled);
        assert_eq!(config.wander.cooldown, 5.0);
        assert_eq!(config.motion.walk_speed, 50.0);
        assert_eq!(config.idle_start_probability, 25);
        assert_eq!(config.initial_direction, Direction::Down);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_role_from_toml() {
        let config: NpcConfig = toml::from_str(
            r#"
            name = "brasseur"
            demand_dialogue = "demandBrewer"

            [role]
            kind = "brewer"
            bad = 30.0
            perfect = 80.0

            [wander]
            enabled = true
            weights = { right = 3, left = 1 }
            "#,
        )
        .unwrap();
        assert_eq!(
            config.role,
            NpcRole::Brewer(BrewThresholds {
                bad: 30.0,
                perfect: 80.0
            })
        );
        assert!(config.wander.enabled);
        assert_eq!(config.wander.weights.right, 3);
        assert_eq!(config.wander.weights.up, 2);
    }

    #[test]
    fn test_scripted_role_from_toml() {
        let config: NpcConfig = toml::from_str(
            r#"
            [role]
            kind = "special_scripted"
            bad_dialogue = "demandAngeliqueBad"
            good_dialogue = "demandAngeliqueGood"
            "#,
        )
        .unwrap();
        match config.role {
            NpcRole::SpecialScripted(s) => {
                assert_eq!(s.bad_threshold, 40.0);
                assert_eq!(s.for_score(10.0), "demandAngeliqueBad");
                assert_eq!(s.for_score(40.0), "demandAngeliqueGood");
            }
            other => panic!("unexpected role {:?}", other),
        }
    }

    #[test]
    fn test_validation_failures() {
        let mut config = NpcConfig {
            idle_start_probability: 101,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(NpcError::InvalidConfig(_))));

        config.idle_start_probability = 50;
        config.role = NpcRole::Brewer(BrewThresholds {
            bad: 95.0,
            perfect: 90.0,
        });
        assert!(config.validate().is_err());

        config.role = NpcRole::Generic;
        config.layout = PageLayout::new(0, 3);
        assert!(config.validate().is_err());

        config.layout = PageLayout::default();
        config.wander.distance = -1.0;
        assert!(config.validate().is_err());
    }
}
