//! NPC controller tying wandering, dialogue and quest evaluation together
//!
//! Engine callbacks arrive as method calls: `tick` once per frame, proximity
//! enter/exit, and player interactions. Wandering only runs while no
//! conversation is open.

use glam::Vec2;
use lausanne_core::{GameRng, RandomSource};
use tracing::{debug, info, warn};

use crate::config::{NpcConfig, NpcRole};
use crate::dialogue::{BrewScript, ConversationState, DialogueSession};
use crate::error::{DialogueKind, NpcError, NpcResult};
use crate::host::{Animation, AnimationHost, DialogueContentProvider, NpcContext, NpcId, PlayerHost, Scene};
use crate::quest::{AnswerSheet, QuestComparisonResult, QuestEvaluator};
use crate::wander::{Locomotion, WanderController, WanderEvent};
use crate::world::{objective, Location, Quest, WorldContext};

pub struct NpcController<R: RandomSource = GameRng> {
    id: NpcId,
    config: NpcConfig,
    role: NpcRole,
    rng: R,
    wander: WanderController,
    locomotion: Locomotion,
    session: DialogueSession,
    evaluator: QuestEvaluator,
    idle_animating: bool,
    player_in_range: bool,
}

impl<R: RandomSource> NpcController<R> {
    /// Build an NPC facing its initial direction, checking that every
    /// dialogue it claims to have exists
    pub fn new(
        id: NpcId,
        config: NpcConfig,
        rng: R,
        content: &dyn DialogueContentProvider,
    ) -> NpcResult<Self> {
        config.validate()?;

        if config.has_auto_dialogue {
            require_dialogue(DialogueKind::Auto, config.auto_dialogue.as_deref(), content)?;
        }
        if config.has_demand_dialogue && config.role.uses_demand_dialogue() {
            require_dialogue(DialogueKind::Demand, config.demand_dialogue.as_deref(), content)?;
        }

        let mut locomotion = Locomotion::new(config.motion.clone());
        locomotion.face(config.initial_direction.to_vec2());

        info!("NPC {} '{}' ready as {}", id.0, config.name, config.role.name());
        Ok(Self {
            id,
            role: config.role.clone(),
            rng,
            wander: WanderController::new(config.wander.clone()),
            locomotion,
            session: DialogueSession::new(config.layout.clone()),
            evaluator: QuestEvaluator::new(config.quest.clone()),
            idle_animating: false,
            player_in_range: false,
            config,
        })
    }

    pub fn id(&self) -> NpcId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &NpcConfig {
        &self.config
    }

    pub fn role(&self) -> &NpcRole {
        &self.role
    }

    pub fn conversation(&self) -> ConversationState {
        self.session.state()
    }

    pub fn wander(&self) -> &WanderController {
        &self.wander
    }

    pub fn velocity(&self) -> Vec2 {
        self.locomotion.velocity
    }

    pub fn intent(&self) -> Vec2 {
        self.locomotion.intent
    }

    pub fn facing(&self) -> Vec2 {
        self.locomotion.facing
    }

    pub fn is_idle_animating(&self) -> bool {
        self.idle_animating
    }

    pub fn player_in_range(&self) -> bool {
        self.player_in_range
    }

    /// Show the current facing on the animation host once it exists
    pub fn ready(&mut self, animation: &mut dyn AnimationHost) {
        if self.locomotion.facing != Vec2::ZERO {
            animation.set_blend_direction(self.locomotion.facing);
        }
    }

    /// Per-frame update
    pub fn tick(&mut self, delta: f32, ctx: &mut NpcContext<'_>) {
        if !self.idle_animating && self.rng.next_below(100) < self.config.idle_start_probability {
            ctx.animation.set_active(true);
            self.idle_animating = true;
        }

        if self.session.state().is_idle() && self.idle_animating && self.wander.config.enabled {
            let event = self.wander.tick(
                delta,
                &mut self.locomotion,
                ctx.body.position(),
                ctx.body.last_collision(),
                &mut self.rng,
            );
            match event {
                Some(WanderEvent::Started) => ctx.animation.travel(Animation::Walk),
                Some(WanderEvent::Stopped) => ctx.animation.travel(Animation::Idle),
                None => {}
            }
        }

        self.integrate(delta, ctx.animation);

        if self.locomotion.velocity == Vec2::ZERO {
            ctx.animation.travel(Animation::Idle);
        } else {
            self.locomotion.velocity = ctx.body.move_and_slide(self.locomotion.velocity);
            ctx.animation.travel(Animation::Walk);
        }
    }

    /// The player came within hearing range
    pub fn on_player_entered(&mut self, player: &mut dyn PlayerHost) {
        player.subscribe(self.id);
        self.player_in_range = true;
    }

    /// The player left hearing range; an auto dialogue cannot outlive this
    pub fn on_player_exited(&mut self, player: &mut dyn PlayerHost, ctx: &mut NpcContext<'_>) {
        player.unsubscribe(self.id);
        self.player_in_range = false;
        if self.config.has_auto_dialogue && self.session.state() == ConversationState::InAutoDialogue {
            ctx.dialogue.end_dialogue();
            self.session.reset();
        }
        ctx.display.hide_text();
    }

    /// Show the auto dialogue if there is one and nothing else is playing.
    /// Returns whether an auto dialogue is in progress.
    pub fn request_auto_dialogue(&mut self, ctx: &mut NpcContext<'_>) -> NpcResult<bool> {
        if self.config.has_auto_dialogue && self.session.state().is_idle() {
            let id = self.config.auto_dialogue.clone().unwrap_or_default();
            let line = self.session.begin(DialogueKind::Auto, &id, ctx.dialogue)?;
            self.wander.reset(&mut self.locomotion);
            ctx.display.show_text(&line);
        }
        Ok(self.session.state() == ConversationState::InAutoDialogue)
    }

    /// Close the auto dialogue. Returns whether one is still in progress.
    pub fn end_auto_dialogue(&mut self, ctx: &mut NpcContext<'_>) -> bool {
        if self.config.has_auto_dialogue && self.session.state() == ConversationState::InAutoDialogue {
            self.session.end(ctx.dialogue, ctx.display);
        }
        self.session.state() == ConversationState::InAutoDialogue
    }

    /// Hide the text box unless a conversation is still going on
    pub fn stop_talking(&mut self, ctx: &mut NpcContext<'_>) {
        if !self.session.state().is_engaged() {
            ctx.display.hide_text();
        }
    }

    /// The player pressed the interact key next to this NPC
    pub fn interact(&mut self, player: &mut dyn PlayerHost, ctx: &mut NpcContext<'_>) -> NpcResult<()> {
        match self.role {
            NpcRole::QuestGiver => self.notify_quest(player, ctx),
            _ => self.notify(player, ctx),
        }
    }

    /// Start or advance the demand dialogue (or the brewer's script)
    pub fn notify(&mut self, player: &mut dyn PlayerHost, ctx: &mut NpcContext<'_>) -> NpcResult<()> {
        ctx.display.hide_all();
        if !self.config.has_demand_dialogue {
            return Ok(());
        }

        let state = self.session.state();
        let line = if state == ConversationState::InDemandDialogue || state == ConversationState::InBrewDialogue {
            match self.session.advance(ctx.dialogue)? {
                Some(line) => line,
                None => {
                    self.finish_dialogue(player, ctx);
                    return Ok(());
                }
            }
        } else {
            self.begin_dialogue(player, ctx)?
        };

        ctx.display.show_text(&line);
        ctx.display.show_continue_prompt();
        Ok(())
    }

    /// Talk through the quest director, starting the tutorial when appropriate
    pub fn notify_quest(&mut self, player: &mut dyn PlayerHost, ctx: &mut NpcContext<'_>) -> NpcResult<()> {
        ctx.display.hide_all();

        let line = match self.evaluator.next_line() {
            Some(line) => line,
            None => {
                if !self.session.state().is_engaged() {
                    self.open_conversation(player, ctx);
                    self.session.begin_quest(ctx.dialogue);
                    if ctx.world.current_location() == Location::Intro && ctx.world.current_quest().is_none() {
                        ctx.quests.start_quest(Quest::Tutorial, &mut *ctx.world);
                    }
                }

                match ctx.quests.quest_interaction(&*ctx.world) {
                    Some(line) => line,
                    None => {
                        if ctx.world.current_quest() == Some(Quest::Tutorial) {
                            let current = ctx.world.quest_objective_id();
                            let next = objective::after_quest_talk(current);
                            if next != current {
                                info!("Tutorial objective {} -> {}", current, next);
                                ctx.world.set_quest_objective_id(next);
                            }
                        }
                        self.finish_dialogue(player, ctx);
                        return Ok(());
                    }
                }
            }
        };

        ctx.display.show_text(&line);
        ctx.display.show_continue_prompt();
        Ok(())
    }

    /// Judge a notebook tab against every language
    pub fn compare_solutions(
        &self,
        submission: &AnswerSheet,
        tab: usize,
        ctx: &NpcContext<'_>,
    ) -> QuestComparisonResult {
        self.evaluator.compare(submission, tab, ctx.solutions, &*ctx.world)
    }

    /// Judge a tab and play the matching response, one page per call.
    ///
    /// When the response ends and the whole notebook is correct, the game
    /// moves to the end screen.
    pub fn evaluate_quest(
        &mut self,
        player: &mut dyn PlayerHost,
        submission: &AnswerSheet,
        tab: usize,
        ctx: &mut NpcContext<'_>,
    ) -> NpcResult<QuestComparisonResult> {
        let result = self.compare_solutions(submission, tab, ctx);

        let line = match self.session.state() {
            ConversationState::Idle | ConversationState::InAutoDialogue => {
                let response = self.evaluator.select_response(&result, &*ctx.world);
                debug!("Quest response {:?}", response);
                let lines = self.evaluator.response_lines(&response, &*ctx.dialogue)?;
                self.evaluator.open(lines);
                self.open_conversation(player, ctx);
                self.session.begin_quest(ctx.dialogue);
                self.evaluator.next_line()
            }
            ConversationState::InQuestDialogue => self.evaluator.next_line(),
            other => {
                debug!("Evaluation ignored during {:?}", other);
                return Ok(result);
            }
        };

        match line {
            Some(line) => {
                ctx.display.show_text(&line);
                ctx.display.show_continue_prompt();
            }
            None => {
                ctx.display.hide_text();
                player.end_conversation();
                self.session.reset();
                if ctx.world.all_tabs_correct() {
                    info!("Notebook complete, going to the end screen");
                    ctx.scenes.go_to_scene(Scene::EndScreen);
                }
            }
        }
        Ok(result)
    }

    fn begin_dialogue(&mut self, player: &mut dyn PlayerHost, ctx: &mut NpcContext<'_>) -> NpcResult<String> {
        let line = match &self.role {
            NpcRole::Brewer(thresholds) => {
                let script = BrewScript::select(ctx.world.brew_score(), thresholds);
                let lines = ctx
                    .dialogue
                    .query_dialogue(script.key(), DialogueKind::Demand, &self.config.quest.source)
                    .ok_or_else(|| NpcError::MissingContent {
                        kind: DialogueKind::Demand,
                        id: script.key().to_string(),
                    })?;
                self.session.begin_brew(script, lines, ctx.dialogue)?
            }
            _ => {
                let id = self.demand_dialogue_id(&*ctx.world);
                self.session.begin(DialogueKind::Demand, &id, ctx.dialogue)?
            }
        };
        self.open_conversation(player, ctx);
        Ok(line)
    }

    /// Demand dialogue id after role and tutorial overrides
    fn demand_dialogue_id(&self, world: &dyn WorldContext) -> String {
        let mut id = self.config.demand_dialogue.clone().unwrap_or_default();
        if let (NpcRole::SpecialScripted(scripted), Some(score)) = (&self.role, world.brew_score()) {
            id = scripted.for_score(score).to_string();
        }
        if let Some(tutorial) = &self.config.tutorial {
            if world.current_quest() == Some(Quest::Tutorial) {
                id = if world.quest_objective_id() >= objective::CONFIRM_OPEN_NOTEBOOK {
                    tutorial.after_notebook.clone()
                } else {
                    tutorial.before_notebook.clone()
                };
            }
        }
        id
    }

    fn open_conversation(&mut self, player: &mut dyn PlayerHost, ctx: &mut NpcContext<'_>) {
        self.wander.reset(&mut self.locomotion);
        player.begin_conversation();
        self.turn_to(player.position() - ctx.body.position(), ctx.animation);
    }

    fn finish_dialogue(&mut self, player: &mut dyn PlayerHost, ctx: &mut NpcContext<'_>) {
        self.session.end(ctx.dialogue, ctx.display);
        self.evaluator.clear();
        player.end_conversation();

        if let NpcRole::Brewer(_) = self.role {
            if ctx.world.brew_score().is_none() {
                ctx.world.set_brewer_return_position(ctx.body.position());
                ctx.scenes.go_to_scene(Scene::BrewMinigame);
            } else {
                info!("Brewer '{}' is done brewing", self.config.name);
                self.role = NpcRole::Generic;
                ctx.world.end_brew_cutscene();
                if self.config.demand_dialogue.is_none() {
                    warn!("Brewer '{}' has no demand dialogue to fall back to", self.config.name);
                }
            }
        }

        if !self.wander.config.enabled {
            self.look_in_initial_direction(ctx.animation);
        }
    }

    fn turn_to(&mut self, offset: Vec2, animation: &mut dyn AnimationHost) {
        if self.config.can_turn {
            self.face(offset.normalize_or_zero(), animation);
        }
    }

    fn look_in_initial_direction(&mut self, animation: &mut dyn AnimationHost) {
        self.face(self.config.initial_direction.to_vec2(), animation);
    }

    fn face(&mut self, direction: Vec2, animation: &mut dyn AnimationHost) {
        self.locomotion.face(direction);
        if direction != Vec2::ZERO {
            animation.set_blend_direction(direction);
        }
    }

    fn integrate(&mut self, delta: f32, animation: &mut dyn AnimationHost) {
        self.locomotion.integrate(delta);
        if self.locomotion.intent != Vec2::ZERO {
            animation.set_blend_direction(self.locomotion.intent);
        }
    }
}

fn require_dialogue(kind: DialogueKind, id: Option<&str>, content: &dyn DialogueContentProvider) -> NpcResult<()> {
    match id {
        Some(id) if content.has_dialogue(id) => Ok(()),
        other => Err(NpcError::MissingContent {
            kind,
            id: other.unwrap_or_default().to_string(),
        }),
    }
}
