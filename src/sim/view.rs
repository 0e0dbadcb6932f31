//! Read-only frame snapshot for renderers and audio
//!
//! Derived entirely from `GameState`; nothing here feeds back into the
//! simulation.

use glam::Vec2;
use serde::Serialize;

use super::player::{AnimationPhase, Facing, PowerTier};
use super::roster::{Effect, EnemyKind, ItemKind};
use super::state::{GameEvent, GamePhase, GameState};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: Vec2,
    pub tier: PowerTier,
    pub facing: Facing,
    pub animation: AnimationPhase,
    pub invulnerable: bool,
    pub star: bool,
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActorKind {
    Enemy(EnemyKind),
    Item(ItemKind),
}

#[derive(Debug, Clone, Serialize)]
pub struct ActorView {
    pub id: u32,
    pub kind: ActorKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub stomped: bool,
    pub emerging: bool,
    /// Free-running animation counter
    pub anim: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameView<'a> {
    pub player: PlayerView,
    /// Live enemies then live items, each in id order
    pub actors: Vec<ActorView>,
    pub effects: &'a [Effect],
    pub score: u64,
    pub coins: u32,
    pub lives: u32,
    pub time_left: u32,
    pub camera_x: f32,
    pub phase: GamePhase,
    pub events: &'a [GameEvent],
}

impl GameState {
    /// Snapshot of everything a renderer needs for this tick
    pub fn view(&self) -> FrameView<'_> {
        let player = &self.player;
        let enemies = self.roster.live_enemies().map(|e| ActorView {
            id: e.id,
            kind: ActorKind::Enemy(e.kind),
            pos: e.body.pos,
            size: e.body.size,
            stomped: e.is_stomped(),
            emerging: false,
            anim: e.anim,
        });
        let items = self.roster.items.iter().filter(|i| i.body.alive).map(|i| ActorView {
            id: i.id,
            kind: ActorKind::Item(i.kind),
            pos: i.body.pos,
            size: i.body.size,
            stomped: false,
            emerging: i.is_emerging(),
            anim: i.anim,
        });

        FrameView {
            player: PlayerView {
                pos: player.body.pos,
                size: player.body.size,
                tier: player.tier,
                facing: player.facing,
                animation: player.animation(),
                invulnerable: player.is_invulnerable(),
                star: player.has_star(),
                finished: player.finished,
            },
            actors: enemies.chain(items).collect(),
            effects: &self.roster.effects,
            score: player.score,
            coins: player.coins,
            lives: player.lives,
            time_left: self.time_left,
            camera_x: self.camera_x,
            phase: self.phase,
            events: &self.events,
        }
    }
}
