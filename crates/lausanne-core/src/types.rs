//! Core types used throughout the NPC systems

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One of the four screen-space facing directions (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Right,
    Left,
    Up,
    #[default]
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit vector for this direction
    pub fn to_vec2(self) -> Vec2 {
        match self {
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
        }
    }
}

/// Move `from` toward `to` by at most `max_delta`, never overshooting
pub fn move_toward(from: Vec2, to: Vec2, max_delta: f32) -> Vec2 {
    let offset = to - from;
    let distance = offset.length();
    if distance <= max_delta || distance < f32::EPSILON {
        to
    } else {
        from + offset / distance * max_delta
    }
}
