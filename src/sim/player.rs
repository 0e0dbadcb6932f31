//! The player-controlled actor
//!
//! Owns run/jump handling, power tier, timers and the run tallies
//! (score, coins, lives).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, Body, WallResponse};
use super::tick::TickInput;
use crate::consts::*;
use crate::settings::Settings;

/// Size/ability rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum PowerTier {
    #[default]
    Small,
    Big,
    Fire,
}

impl PowerTier {
    /// One rank up, saturating at Fire
    pub fn escalate(self) -> Self {
        match self {
            PowerTier::Small => PowerTier::Big,
            PowerTier::Big | PowerTier::Fire => PowerTier::Fire,
        }
    }

    /// One rank down, None when already small (damage becomes a life loss)
    pub fn step_down(self) -> Option<Self> {
        match self {
            PowerTier::Small => None,
            PowerTier::Big => Some(PowerTier::Small),
            PowerTier::Fire => Some(PowerTier::Big),
        }
    }

    pub fn is_big(self) -> bool {
        self != PowerTier::Small
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Animation phase derived from physics state (sprite choice is up to the renderer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationPhase {
    Standing,
    Running { frame: u8 },
    Jumping,
}

/// Result of a damage event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Contact ignored (invulnerability window)
    Ignored,
    /// Lost one tier, now at the given tier
    Shrunk(PowerTier),
    /// Was small: costs a life
    Killed,
}

/// The player actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub facing: Facing,
    pub tier: PowerTier,
    /// Ticks left in which enemy contact is ignored
    pub invulnerable_ticks: u32,
    /// Ticks left of star power
    pub star_ticks: u32,
    pub score: u64,
    pub coins: u32,
    pub lives: u32,
    /// Reached the flag
    pub finished: bool,
    /// Ticks since reaching the flag
    pub finish_ticks: u32,
    /// Accumulated run distance driving the run cycle
    run_cycle: f32,
}

impl Actor for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn wall_response(&self) -> WallResponse {
        WallResponse::Stop
    }
}

impl Player {
    pub fn new(start: Vec2, lives: u32) -> Self {
        Self {
            body: Body::new(start, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            facing: Facing::Right,
            tier: PowerTier::Small,
            invulnerable_ticks: 0,
            star_ticks: 0,
            score: 0,
            coins: 0,
            lives,
            finished: false,
            finish_ticks: 0,
            run_cycle: 0.0,
        }
    }

    /// Put the player back at a start point for a level restart.
    /// Score, coins and lives carry over.
    pub fn respawn(&mut self, start: Vec2) {
        *self = Self {
            score: self.score,
            coins: self.coins,
            lives: self.lives,
            ..Self::new(start, self.lives)
        };
    }

    /// Count down invulnerability and star power
    pub fn tick_timers(&mut self) {
        self.invulnerable_ticks = self.invulnerable_ticks.saturating_sub(1);
        self.star_ticks = self.star_ticks.saturating_sub(1);
    }

    /// Update velocity from input: run/walk acceleration, friction, jump
    /// start, early-release jump cut and gravity.
    pub fn apply_input(&mut self, input: &TickInput, settings: &Settings) {
        let (accel, max_speed) = settings.horizontal_limits(input.run);
        let body = &mut self.body;

        if input.left {
            body.vel.x -= accel;
            self.facing = Facing::Left;
        } else if input.right {
            body.vel.x += accel;
            self.facing = Facing::Right;
        } else if body.grounded {
            body.vel.x *= settings.ground_friction;
        } else {
            body.vel.x *= settings.air_friction;
        }

        if body.vel.x.abs() < settings.stop_threshold {
            body.vel.x = 0.0;
        }
        body.vel.x = body.vel.x.clamp(-max_speed, max_speed);

        // Only a fresh press starts a jump; holding through landing doesn't rejump
        if input.jump_pressed() && body.grounded {
            body.vel.y = settings.jump_velocity;
            body.grounded = false;
        }
        if !input.jump && body.vel.y < settings.jump_cut_velocity {
            body.vel.y = settings.jump_cut_velocity;
        }

        body.apply_gravity(settings.gravity, settings.max_fall);

        if body.grounded {
            self.run_cycle += body.vel.x.abs() * 0.15;
        }
    }

    pub fn add_score(&mut self, amount: u32) {
        self.score += u64::from(amount);
    }

    /// Add a coin. Returns true when the coin total rolled over into a life.
    pub fn add_coin(&mut self) -> bool {
        self.coins += 1;
        if self.coins >= COINS_PER_LIFE {
            self.coins -= COINS_PER_LIFE;
            self.lives += 1;
            true
        } else {
            false
        }
    }

    /// Enemy contact without star power
    pub fn take_damage(&mut self, settings: &Settings) -> DamageOutcome {
        if self.invulnerable_ticks > 0 {
            return DamageOutcome::Ignored;
        }
        match self.tier.step_down() {
            Some(tier) => {
                self.tier = tier;
                self.invulnerable_ticks = settings.invulnerable_ticks;
                DamageOutcome::Shrunk(tier)
            }
            None => DamageOutcome::Killed,
        }
    }

    /// Mushroom or fire flower
    pub fn power_up(&mut self, fire: bool) -> PowerTier {
        self.tier = if fire {
            self.tier.escalate()
        } else {
            self.tier.max(PowerTier::Big)
        };
        self.tier
    }

    pub fn start_star(&mut self, settings: &Settings) {
        self.star_ticks = settings.star_ticks;
    }

    pub fn has_star(&self) -> bool {
        self.star_ticks > 0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ticks > 0
    }

    pub fn animation(&self) -> AnimationPhase {
        if !self.body.grounded {
            AnimationPhase::Jumping
        } else if self.body.vel.x.abs() > 0.2 * PIXEL_SCALE {
            AnimationPhase::Running {
                frame: (self.run_cycle as u32 % 3) as u8,
            }
        } else {
            AnimationPhase::Standing
        }
    }
}
