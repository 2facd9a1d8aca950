//! Wandering and velocity integration
//!
//! A wandering NPC alternates between idle cooldowns and short axis-aligned
//! walks. Walk directions are drawn from four per-direction weights; after a
//! collision the next walk heads away from the contact point.

use glam::Vec2;
use lausanne_core::{move_toward, RandomSource};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Timestep used when turning in place (face player, initial pose)
pub const TURN_STEP: f32 = 0.03;

/// Upper bounds of the per-direction draws. A larger bound means wider and
/// more often nonzero displacement in that direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionWeights {
    pub right: u32,
    pub left: u32,
    pub up: u32,
    pub down: u32,
}

impl Default for DirectionWeights {
    fn default() -> Self {
        Self {
            right: 2,
            left: 2,
            up: 2,
            down: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    pub enabled: bool,
    pub weights: DirectionWeights,
    /// Upper bound of the idle pause between walks, in seconds
    pub cooldown: f32,
    /// Upper bound of a single walk, in seconds
    pub distance: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            weights: DirectionWeights::default(),
            cooldown: 5.0,
            distance: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub walk_speed: f32,
    pub acceleration: f32,
    pub friction: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 50.0,
            acceleration: 950.0,
            friction: 1000.0,
        }
    }
}

/// Desired direction and current velocity of an NPC body
#[derive(Debug, Clone)]
pub struct Locomotion {
    pub config: MotionConfig,
    /// Movement intent for this tick, zero when standing still
    pub intent: Vec2,
    pub velocity: Vec2,
    /// Last nonzero intent, used to orient the sprite
    pub facing: Vec2,
}

impl Locomotion {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            intent: Vec2::ZERO,
            velocity: Vec2::ZERO,
            facing: Vec2::ZERO,
        }
    }

    /// Accelerate toward the intent, or brake with friction when there is none
    pub fn integrate(&mut self, delta: f32) {
        if self.intent == Vec2::ZERO {
            self.velocity = move_toward(self.velocity, Vec2::ZERO, self.config.friction * delta);
        } else {
            self.facing = self.intent;
            self.velocity = move_toward(
                self.velocity,
                self.intent * self.config.walk_speed,
                self.config.acceleration * delta,
            );
        }
    }

    /// Turn toward `direction` without walking off
    pub fn face(&mut self, direction: Vec2) {
        self.intent = direction;
        self.integrate(TURN_STEP);
        self.intent = Vec2::ZERO;
        self.integrate(TURN_STEP);
    }

    pub fn halt(&mut self) {
        self.intent = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
    }
}

/// Mutable wandering state of one NPC
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WanderState {
    pub is_wandering: bool,
    pub cooldown_remaining: f32,
    pub wander_time_remaining: f32,
    /// Direction away from the last collision, consumed by the next sample
    pub pending_rebound: Vec2,
}

/// Transition reported by [`WanderController::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WanderEvent {
    Started,
    Stopped,
}

pub struct WanderController {
    pub config: WanderConfig,
    state: WanderState,
}

impl WanderController {
    pub fn new(config: WanderConfig) -> Self {
        Self {
            config,
            state: WanderState::default(),
        }
    }

    pub fn state(&self) -> &WanderState {
        &self.state
    }

    pub fn is_wandering(&self) -> bool {
        self.state.is_wandering
    }

    /// Draw the next axis-aligned movement intent.
    ///
    /// A pending collision rebound replaces the weighted draw exactly once.
    pub fn sample_intent(&mut self, rng: &mut dyn RandomSource) -> Vec2 {
        let (horizontal, vertical) = if self.state.pending_rebound != Vec2::ZERO {
            let rebound = std::mem::take(&mut self.state.pending_rebound);
            (rebound.x, rebound.y)
        } else {
            let w = &self.config.weights;
            let horizontal = rng.next_below(w.right) as f32 - rng.next_below(w.left) as f32;
            let vertical = rng.next_below(w.down) as f32 - rng.next_below(w.up) as f32;
            (horizontal, vertical)
        };

        if (rng.coin_flip() || vertical == 0.0) && horizontal != 0.0 {
            Vec2::new(horizontal, 0.0)
        } else {
            Vec2::new(0.0, vertical)
        }
    }

    /// Advance wandering by `delta` seconds.
    ///
    /// `collision` is the contact point reported by the body since the last
    /// move, `position` the current body position.
    pub fn tick(
        &mut self,
        delta: f32,
        locomotion: &mut Locomotion,
        position: Vec2,
        collision: Option<Vec2>,
        rng: &mut dyn RandomSource,
    ) -> Option<WanderEvent> {
        if self.state.cooldown_remaining > 0.0 {
            self.state.cooldown_remaining -= delta;
            return None;
        }
        self.state.cooldown_remaining = 0.0;

        if !self.state.is_wandering {
            self.state.is_wandering = true;
            self.state.wander_time_remaining = rng.next_percent() * self.config.distance;
            locomotion.intent = self.sample_intent(rng);
            debug!(
                "Wander started for {:.2}s toward {:?}",
                self.state.wander_time_remaining, locomotion.intent
            );
            return Some(WanderEvent::Started);
        }

        self.state.wander_time_remaining -= delta;

        if self.state.pending_rebound == Vec2::ZERO {
            if let Some(point) = collision {
                self.state.pending_rebound = (position - point).normalize_or_zero();
                debug!("Collision at {:?}, next walk heads {:?}", point, self.state.pending_rebound);
            }
        }

        if self.state.wander_time_remaining <= 0.0 {
            self.stop(locomotion, rng);
            return Some(WanderEvent::Stopped);
        }
        None
    }

    /// End the current walk and start a random cooldown
    pub fn stop(&mut self, locomotion: &mut Locomotion, rng: &mut dyn RandomSource) {
        self.state.wander_time_remaining = 0.0;
        self.state.is_wandering = false;
        locomotion.halt();
        self.state.cooldown_remaining = rng.next_percent() * self.config.cooldown;
        debug!("Wander stopped, cooling down {:.2}s", self.state.cooldown_remaining);
    }

    /// Drop back to idle without touching the cooldown (a conversation started)
    pub fn reset(&mut self, locomotion: &mut Locomotion) {
        self.state.is_wandering = false;
        self.state.wander_time_remaining = 0.0;
        locomotion.intent = Vec2::ZERO;
    }
}
