//! Headless scene runner
//!
//! Drives every NPC of a scene at a fixed timestep while a scripted player
//! walks around, talks and hands in notebook tabs.

use anyhow::{bail, Context, Result};
use glam::Vec2;
use lausanne_core::{GameRng, SimClock};
use lausanne_npc::sim::{NpcStage, PenBody, Session};
use lausanne_npc::{AnswerSheet, ConversationState, NpcController, NpcId};
use tracing::{debug, info, warn};

use crate::save::{NpcSnapshot, SaveData, SAVE_VERSION};
use crate::scene::{PlayerAction, SceneFile};
use crate::settings::SimulationSettings;

/// Gap left between the player and an NPC it walks up to
const TALK_DISTANCE: f32 = 16.0;

/// Interactions allowed before a conversation is considered stuck
const MAX_EXCHANGES: usize = 64;

struct NpcSlot {
    controller: NpcController<GameRng>,
    stage: NpcStage,
}

pub struct SceneRunner {
    session: Session,
    npcs: Vec<NpcSlot>,
    clock: SimClock,
    script: Vec<PlayerAction>,
    idle_seconds: f32,
}

impl SceneRunner {
    pub fn new(scene: SceneFile, settings: &SimulationSettings) -> Result<Self> {
        let clock = SimClock::new(settings.tick.clone()).context("Invalid tick configuration")?;

        let mut session = Session {
            world: scene.world,
            dialogue: scene.dialogue,
            solutions: scene.solutions,
            quests: scene.quest_script,
            ..Default::default()
        };
        session.player.position = scene.player;

        let mut npcs = Vec::with_capacity(scene.npcs.len());
        for (index, entry) in scene.npcs.into_iter().enumerate() {
            let rng = match settings.seed {
                Some(seed) => GameRng::seeded(seed.wrapping_add(index as u64)),
                None => GameRng::from_entropy(),
            };
            let name = entry.config.name.clone();
            let step = clock.timestep();
            let body = match entry.pen {
                Some(pen) => PenBody::new(entry.position, pen.min, pen.max, step),
                None => PenBody::open(entry.position, step),
            };
            let mut controller = NpcController::new(NpcId(index as u64), entry.config, rng, &session.dialogue)
                .with_context(|| format!("Failed to set up NPC '{}'", name))?;
            let mut stage = NpcStage::new(name, body);
            controller.ready(&mut stage.animation);
            npcs.push(NpcSlot { controller, stage });
        }

        info!("Scene ready with {} NPCs", npcs.len());
        Ok(Self {
            session,
            npcs,
            clock,
            script: scene.script,
            idle_seconds: settings.idle_seconds(),
        })
    }

    /// Play the player script, then let the world idle
    pub fn run(&mut self) -> Result<()> {
        let script = std::mem::take(&mut self.script);
        for action in &script {
            self.perform(action)?;
        }
        self.wait(self.idle_seconds);
        info!(
            "Simulated {} steps ({:.1}s)",
            self.clock.step_count, self.clock.total_time
        );
        Ok(())
    }

    /// Advance the world by `seconds`, one fixed step at a time
    pub fn wait(&mut self, seconds: f32) {
        let step = self.clock.timestep();
        let mut remaining = seconds;
        while remaining > 0.0 {
            self.frame(step.min(remaining));
            remaining -= step;
        }
    }

    fn frame(&mut self, raw_delta: f32) {
        let steps = self.clock.advance(raw_delta);
        let delta = self.clock.timestep();
        for _ in 0..steps {
            for slot in &mut self.npcs {
                let (mut ctx, _) = self.session.enter(&mut slot.stage);
                slot.controller.tick(delta, &mut ctx);
            }
        }
    }

    fn perform(&mut self, action: &PlayerAction) -> Result<()> {
        debug!("Player step {:?}", action);
        match action {
            PlayerAction::Wait { seconds } => self.wait(*seconds),
            PlayerAction::Approach { npc } => self.approach(npc)?,
            PlayerAction::Leave { npc } => self.leave(npc)?,
            PlayerAction::Talk { npc } => self.talk(npc)?,
            PlayerAction::Submit { npc, tab, answers } => self.submit(npc, *tab, answers)?,
            PlayerAction::Brew { score } => {
                info!("Brewing minigame scored {}", score);
                self.session.world.brew_score = Some(*score);
            }
            PlayerAction::MarkTab { tab, correct } => {
                self.session.world.mark_tab(*tab, *correct);
                self.session.world.current_tab = *tab;
            }
        }
        Ok(())
    }

    fn approach(&mut self, name: &str) -> Result<()> {
        let index = self.find(name)?;
        let slot = &mut self.npcs[index];
        self.session.player.position = slot.stage.body.position + Vec2::new(0.0, TALK_DISTANCE);
        let (mut ctx, player) = self.session.enter(&mut slot.stage);
        slot.controller.on_player_entered(player);
        slot.controller.request_auto_dialogue(&mut ctx)?;
        Ok(())
    }

    fn leave(&mut self, name: &str) -> Result<()> {
        let index = self.find(name)?;
        let slot = &mut self.npcs[index];
        let (mut ctx, player) = self.session.enter(&mut slot.stage);
        slot.controller.on_player_exited(player, &mut ctx);
        Ok(())
    }

    fn talk(&mut self, name: &str) -> Result<()> {
        let index = self.find(name)?;
        for _ in 0..MAX_EXCHANGES {
            let slot = &mut self.npcs[index];
            let (mut ctx, player) = self.session.enter(&mut slot.stage);
            slot.controller.interact(player, &mut ctx)?;
            if slot.controller.conversation() == ConversationState::Idle {
                return Ok(());
            }
            self.frame(self.clock.timestep());
        }
        bail!("Conversation with '{}' did not end", name)
    }

    fn submit(&mut self, name: &str, tab: usize, answers: &AnswerSheet) -> Result<()> {
        let index = self.find(name)?;
        self.session.world.current_tab = tab;
        for _ in 0..MAX_EXCHANGES {
            let slot = &mut self.npcs[index];
            let (mut ctx, player) = self.session.enter(&mut slot.stage);
            let result = slot.controller.evaluate_quest(player, answers, tab, &mut ctx)?;
            if slot.controller.conversation() == ConversationState::Idle {
                if !result.is_correct() {
                    warn!("Tab {} rejected, wrong fields: {:?}", tab, result.outliers());
                }
                return Ok(());
            }
            self.frame(self.clock.timestep());
        }
        bail!("Evaluation by '{}' did not end", name)
    }

    fn find(&self, name: &str) -> Result<usize> {
        match self.npcs.iter().position(|slot| slot.controller.name() == name) {
            Some(index) => Ok(index),
            None => bail!("No NPC named '{}' in the scene", name),
        }
    }

    /// Everything worth keeping once the run is over
    pub fn snapshot(&self, scene: &str) -> SaveData {
        SaveData {
            version: SAVE_VERSION,
            scene: scene.to_string(),
            steps: self.clock.step_count,
            play_time_seconds: self.clock.total_time,
            world: self.session.world.clone(),
            scenes: self.session.scenes.requested.iter().map(|s| format!("{:?}", s)).collect(),
            npcs: self
                .npcs
                .iter()
                .map(|slot| NpcSnapshot {
                    name: slot.controller.name().to_string(),
                    role: slot.controller.role().name().to_string(),
                    position: slot.stage.body.position,
                    pages_shown: slot.stage.display.pages().len(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lausanne_npc::{NpcConfig, NpcRole, Scene};

    fn settings() -> SimulationSettings {
        SimulationSettings {
            seed: Some(11),
            ticks: 60,
            ..Default::default()
        }
    }

    fn scene() -> SceneFile {
        let mut scene = SceneFile::default();
        scene.world.tabs = vec![false];
        scene.dialogue.insert_dialogue("baker", ["Du pain?¢Il est tout chaud."]);
        scene.dialogue.insert_dialogue("baker_auto", ["Pain frais!"]);
        scene
            .dialogue
            .insert_script("dialogues/quest_npc", "questTextAllCorrect", ["Bravo."]);
        scene
            .solutions
            .insert(0, lausanne_npc::Language::French, AnswerSheet::new().with("suspect", "Rochat"));
        scene.npcs.push(crate::scene::NpcEntry {
            position: Vec2::new(10.0, 0.0),
            pen: None,
            config: NpcConfig {
                name: "Boulanger".into(),
                auto_dialogue: Some("baker_auto".into()),
                demand_dialogue: Some("baker".into()),
                ..Default::default()
            },
        });
        scene.npcs.push(crate::scene::NpcEntry {
            position: Vec2::new(60.0, 0.0),
            pen: None,
            config: NpcConfig {
                name: "Inspecteur".into(),
                has_auto_dialogue: false,
                role: NpcRole::QuestGiver,
                ..Default::default()
            },
        });
        scene
    }

    #[test]
    fn test_talk_reads_every_page() {
        let mut runner = SceneRunner::new(scene(), &settings()).unwrap();
        runner.perform(&PlayerAction::Approach { npc: "Boulanger".into() }).unwrap();
        runner.perform(&PlayerAction::Talk { npc: "Boulanger".into() }).unwrap();

        let pages = runner.npcs[0].stage.display.pages();
        assert_eq!(pages, vec!["Pain frais!", "Du pain?", "Il est tout chaud."]);
        assert_eq!(runner.session.player.position, Vec2::new(10.0, TALK_DISTANCE));
        assert!(!runner.session.player.in_conversation);
    }

    #[test]
    fn test_submit_finishes_the_game() {
        let mut runner = SceneRunner::new(scene(), &settings()).unwrap();
        runner
            .perform(&PlayerAction::MarkTab { tab: 0, correct: true })
            .unwrap();
        runner
            .perform(&PlayerAction::Submit {
                npc: "Inspecteur".into(),
                tab: 0,
                answers: AnswerSheet::new().with("suspect", "Rochat"),
            })
            .unwrap();
        assert_eq!(runner.session.scenes.requested, vec![Scene::EndScreen]);

        let save = runner.snapshot("test");
        assert_eq!(save.scenes, vec!["EndScreen"]);
        assert_eq!(save.npcs.len(), 2);
        assert_eq!(save.npcs[1].role, "Quest Giver");
    }

    #[test]
    fn test_unknown_npc_is_an_error() {
        let mut runner = SceneRunner::new(scene(), &settings()).unwrap();
        assert!(runner.perform(&PlayerAction::Talk { npc: "Fantôme".into() }).is_err());
    }

    #[test]
    fn test_missing_dialogue_fails_setup() {
        let mut scene = scene();
        scene.npcs[0].config.demand_dialogue = Some("nowhere".into());
        assert!(SceneRunner::new(scene, &settings()).is_err());
    }

    #[test]
    fn test_run_advances_clock() {
        let mut runner = SceneRunner::new(scene(), &settings()).unwrap();
        runner.run().unwrap();
        assert!(runner.clock.step_count >= 59);
    }
}
