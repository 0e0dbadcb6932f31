//! Shared physical state for everything that moves
//!
//! Player, enemies and items all carry a `Body` and expose it through the
//! `Actor` trait so the resolver can treat them uniformly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::boxes_overlap;

/// How an actor reacts when its horizontal motion is blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallResponse {
    /// Zero horizontal velocity (player)
    Stop,
    /// Flip horizontal velocity (patrolling enemies, walking items)
    Reverse,
}

/// Position, velocity and box of a moving thing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner
    pub pos: Vec2,
    /// Displacement per tick
    pub vel: Vec2,
    pub size: Vec2,
    pub alive: bool,
    /// Set by a downward collision this tick
    pub grounded: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            alive: true,
            grounded: false,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        boxes_overlap(self.pos, self.size, other.pos, other.size)
    }

    /// Add gravity, capped at terminal fall speed
    pub fn apply_gravity(&mut self, gravity: f32, max_fall: f32) {
        self.vel.y = (self.vel.y + gravity).min(max_fall);
    }
}

/// Anything the collision resolver can move
pub trait Actor {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn wall_response(&self) -> WallResponse {
        WallResponse::Reverse
    }

    fn is_alive(&self) -> bool {
        self.body().alive
    }

    fn kill(&mut self) {
        self.body_mut().alive = false;
    }

    /// True once the box has reached the kill line
    fn below_kill_line(&self, kill_line: f32) -> bool {
        self.body().bottom() >= kill_line
    }
}

impl Actor for Body {
    fn body(&self) -> &Body {
        self
    }

    fn body_mut(&mut self) -> &mut Body {
        self
    }
}
