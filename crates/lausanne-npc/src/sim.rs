//! Headless engine hosts
//!
//! Stand-ins for the text box, kinematic body, animation tree, scene changer
//! and player used when NPCs run without an engine: scripted demos, replays
//! and tests. Every host records what it was asked to do.

use std::collections::BTreeSet;

use glam::Vec2;
use tracing::info;

use crate::content::{DialogueLibrary, QuestScript, SessionState, SolutionBook};
use crate::host::{
    Animation, AnimationHost, DisplayHost, MovementHost, NpcContext, NpcId, PlayerHost, Scene,
    SceneTransitionHost,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Text(String),
    ContinuePrompt,
    HideText,
    HideAll,
}

/// Text box that keeps a log of everything shown
#[derive(Debug, Clone, Default)]
pub struct TextLog {
    pub label: String,
    pub events: Vec<DisplayEvent>,
    text: Option<String>,
    prompt: bool,
}

impl TextLog {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Every page shown so far, in order
    pub fn pages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DisplayEvent::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn current_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_text_visible(&self) -> bool {
        self.text.is_some()
    }

    pub fn is_prompt_visible(&self) -> bool {
        self.prompt
    }
}

impl DisplayHost for TextLog {
    fn show_text(&mut self, page: &str) {
        info!("[{}] {}", self.label, page.replace('\n', " / "));
        self.text = Some(page.to_string());
        self.events.push(DisplayEvent::Text(page.to_string()));
    }

    fn show_continue_prompt(&mut self) {
        self.prompt = true;
        self.events.push(DisplayEvent::ContinuePrompt);
    }

    fn hide_text(&mut self) {
        self.text = None;
        self.events.push(DisplayEvent::HideText);
    }

    fn hide_all(&mut self) {
        self.text = None;
        self.prompt = false;
        self.events.push(DisplayEvent::HideAll);
    }
}

/// Kinematic body confined to an axis-aligned pen.
///
/// Each move advances by `velocity * step`. Hitting the pen wall stops the
/// blocked axis and reports the attempted point as the collision.
#[derive(Debug, Clone)]
pub struct PenBody {
    pub position: Vec2,
    pub min: Vec2,
    pub max: Vec2,
    pub step: f32,
    last_collision: Option<Vec2>,
}

impl PenBody {
    pub fn new(position: Vec2, min: Vec2, max: Vec2, step: f32) -> Self {
        Self {
            position,
            min,
            max,
            step,
            last_collision: None,
        }
    }

    /// Body that can walk anywhere
    pub fn open(position: Vec2, step: f32) -> Self {
        Self::new(position, Vec2::splat(f32::MIN), Vec2::splat(f32::MAX), step)
    }
}

impl MovementHost for PenBody {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn last_collision(&self) -> Option<Vec2> {
        self.last_collision
    }

    fn move_and_slide(&mut self, velocity: Vec2) -> Vec2 {
        let target = self.position + velocity * self.step;
        let clamped = target.clamp(self.min, self.max);
        let mut remaining = velocity;
        if clamped.x != target.x {
            remaining.x = 0.0;
        }
        if clamped.y != target.y {
            remaining.y = 0.0;
        }
        self.last_collision = (clamped != target).then_some(target);
        self.position = clamped;
        remaining
    }
}

/// Animation tree stand-in
#[derive(Debug, Clone, Default)]
pub struct AnimationLog {
    pub active: bool,
    pub current: Option<Animation>,
    pub blend_direction: Vec2,
    /// Number of times the walk animation was entered from another state
    pub walk_starts: usize,
}

impl AnimationHost for AnimationLog {
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn travel(&mut self, animation: Animation) {
        if animation == Animation::Walk && self.current != Some(Animation::Walk) {
            self.walk_starts += 1;
        }
        self.current = Some(animation);
    }

    fn set_blend_direction(&mut self, direction: Vec2) {
        self.blend_direction = direction;
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneLog {
    pub requested: Vec<Scene>,
}

impl SceneTransitionHost for SceneLog {
    fn go_to_scene(&mut self, scene: Scene) {
        info!("Scene transition to {:?}", scene);
        self.requested.push(scene);
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessPlayer {
    pub position: Vec2,
    pub in_conversation: bool,
    pub conversations: usize,
    pub subscriptions: BTreeSet<NpcId>,
}

impl PlayerHost for HeadlessPlayer {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn begin_conversation(&mut self) {
        self.in_conversation = true;
        self.conversations += 1;
    }

    fn end_conversation(&mut self) {
        self.in_conversation = false;
    }

    fn subscribe(&mut self, npc: NpcId) {
        self.subscriptions.insert(npc);
    }

    fn unsubscribe(&mut self, npc: NpcId) {
        self.subscriptions.remove(&npc);
    }
}

/// Hosts owned by a single NPC
#[derive(Debug, Clone)]
pub struct NpcStage {
    pub display: TextLog,
    pub body: PenBody,
    pub animation: AnimationLog,
}

impl NpcStage {
    pub fn new(label: impl Into<String>, body: PenBody) -> Self {
        Self {
            display: TextLog::new(label),
            body,
            animation: AnimationLog::default(),
        }
    }
}

/// State shared by every NPC of a headless session
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub world: SessionState,
    pub dialogue: DialogueLibrary,
    pub solutions: SolutionBook,
    pub quests: QuestScript,
    pub scenes: SceneLog,
    pub player: HeadlessPlayer,
}

impl Session {
    /// Lend the session and one NPC's stage out as an NPC context
    pub fn enter<'a>(&'a mut self, stage: &'a mut NpcStage) -> (NpcContext<'a>, &'a mut HeadlessPlayer) {
        let ctx = NpcContext {
            world: &mut self.world,
            dialogue: &mut self.dialogue,
            solutions: &self.solutions,
            quests: &mut self.quests,
            display: &mut stage.display,
            body: &mut stage.body,
            animation: &mut stage.animation,
            scenes: &mut self.scenes,
        };
        (ctx, &mut self.player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pen_body_moves_freely_inside() {
        let mut body = PenBody::new(Vec2::ZERO, Vec2::splat(-10.0), Vec2::splat(10.0), 0.5);
        let v = body.move_and_slide(Vec2::new(4.0, 0.0));
        assert_eq!(v, Vec2::new(4.0, 0.0));
        assert_eq!(body.position, Vec2::new(2.0, 0.0));
        assert_eq!(body.last_collision(), None);
    }

    #[test]
    fn test_pen_body_reports_wall_hits() {
        let mut body = PenBody::new(Vec2::new(9.0, 0.0), Vec2::splat(-10.0), Vec2::splat(10.0), 1.0);
        let v = body.move_and_slide(Vec2::new(4.0, 1.0));
        assert_eq!(v, Vec2::new(0.0, 1.0));
        assert_eq!(body.position, Vec2::new(10.0, 1.0));
        assert_eq!(body.last_collision(), Some(Vec2::new(13.0, 1.0)));
        let away = (body.position - Vec2::new(13.0, 1.0)).normalize();
        assert_eq!(away, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_text_log_tracks_visibility() {
        let mut log = TextLog::new("baker");
        log.show_text("Bonjour");
        log.show_continue_prompt();
        assert_eq!(log.current_text(), Some("Bonjour"));
        assert!(log.is_prompt_visible());
        log.hide_all();
        assert!(!log.is_text_visible());
        assert!(!log.is_prompt_visible());
        assert_eq!(log.pages(), vec!["Bonjour"]);
    }

    #[test]
    fn test_animation_counts_walk_starts() {
        let mut anim = AnimationLog::default();
        anim.travel(Animation::Walk);
        anim.travel(Animation::Walk);
        anim.travel(Animation::Idle);
        anim.travel(Animation::Walk);
        assert_eq!(anim.walk_starts, 2);
    }
}
