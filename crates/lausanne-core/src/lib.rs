//! Lausanne Core - Shared types for the Lausanne NPC systems
//!
//! This crate provides the foundational pieces used by every NPC:
//! - 2D math primitives (re-exported from glam)
//! - Four-way facing directions and vector helpers
//! - A seedable random source so gameplay variance stays testable
//! - Fixed-timestep tick accounting

pub mod rng;
pub mod time;
pub mod types;

pub use glam::Vec2;
pub use rng::{GameRng, RandomSource, ScriptedRng};
pub use time::{CoreError, SimClock, TickConfig};
pub use types::{move_toward, Direction};
