//! Enemies, items and visual effects
//!
//! The roster owns every non-player actor. Each tick it steps them through
//! the resolver, then runs one contact pass against the player. Player and
//! roster members never hold references to each other.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, Body};
use super::collision::step_actor;
use super::player::{DamageOutcome, Player};
use super::state::GameEvent;
use super::tile::TileGrid;
use crate::consts::*;
use crate::settings::Settings;
use crate::{cell_to_world, world_to_cell};

pub const STOMP_SCORE: u32 = 100;
pub const STAR_KILL_SCORE: u32 = 100;
pub const POWER_UP_SCORE: u32 = 1000;

/// Hostile actor kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Patrols left/right, reverses at walls, dies when stomped
    Walker,
}

impl EnemyKind {
    pub fn size(self) -> Vec2 {
        match self {
            EnemyKind::Walker => Vec2::new(WALKER_WIDTH, WALKER_HEIGHT),
        }
    }

    pub fn speed(self) -> f32 {
        match self {
            EnemyKind::Walker => WALKER_SPEED,
        }
    }

    pub fn stompable(self) -> bool {
        match self {
            EnemyKind::Walker => true,
        }
    }
}

/// A hostile actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    /// Dormant until the camera gets close
    pub activated: bool,
    /// Despawn countdown once stomped
    pub stomp_ticks: Option<u32>,
    pub anim: f32,
}

impl Actor for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            body: Body::new(pos, kind.size()).with_velocity(Vec2::new(-kind.speed(), 0.0)),
            activated: false,
            stomp_ticks: None,
            anim: 0.0,
        }
    }

    pub fn is_stomped(&self) -> bool {
        self.stomp_ticks.is_some()
    }

    /// Flatten: halt and start the despawn countdown
    pub fn stomp(&mut self, despawn_ticks: u32) {
        self.body.vel = Vec2::ZERO;
        self.stomp_ticks = Some(despawn_ticks);
    }

    /// Activation look-ahead: one screen plus two tiles past the camera
    pub fn in_activation_range(&self, camera_x: f32) -> bool {
        self.body.pos.x < camera_x + SCREEN_WIDTH + 2.0 * TILE_SIZE
    }
}

/// Pickups released by blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Mushroom,
    /// Mushroom variant granting a life
    ExtraLife,
    FireFlower,
    Star,
}

impl ItemKind {
    /// Velocity once out of the block
    fn launch_velocity(self) -> Vec2 {
        match self {
            ItemKind::Mushroom | ItemKind::ExtraLife => Vec2::new(MUSHROOM_SPEED, 0.0),
            ItemKind::Star => Vec2::new(STAR_SPEED, -3.0 * PIXEL_SCALE),
            ItemKind::FireFlower => Vec2::ZERO,
        }
    }
}

/// A pickup actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub body: Body,
    /// Target y while rising out of its block
    pub emerge_to: Option<f32>,
    pub anim: f32,
}

impl Actor for Item {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Item {
    /// Spawn inside the block at (col, row); it rises one tile before moving
    pub fn emerge_from(id: u32, kind: ItemKind, col: i32, row: i32) -> Self {
        let pos = Vec2::new(cell_to_world(col), cell_to_world(row));
        Self {
            id,
            kind,
            body: Body::new(pos, Vec2::splat(TILE_SIZE)).with_velocity(kind.launch_velocity()),
            emerge_to: Some(pos.y - TILE_SIZE),
            anim: 0.0,
        }
    }

    pub fn is_emerging(&self) -> bool {
        self.emerge_to.is_some()
    }
}

/// Non-colliding visual effects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Coin flipping out of a block; gone once back at its start height
    CoinPopup { floor_y: f32 },
    /// Floating score text
    ScorePopup { amount: u32 },
    /// Brick debris
    BrickShard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: u32,
    pub alive: bool,
}

impl Effect {
    fn new(kind: EffectKind, pos: Vec2, vel: Vec2) -> Self {
        Self {
            kind,
            pos,
            vel,
            age: 0,
            alive: true,
        }
    }

    fn update(&mut self, settings: &Settings, kill_line: f32) {
        self.age += 1;
        match self.kind {
            EffectKind::CoinPopup { floor_y } => {
                self.pos += self.vel;
                self.vel.y += settings.gravity * 0.3;
                if self.pos.y > floor_y {
                    self.alive = false;
                }
            }
            EffectKind::ScorePopup { .. } => {
                self.pos.y -= PIXEL_SCALE;
                if self.age > settings.popup_ticks {
                    self.alive = false;
                }
            }
            EffectKind::BrickShard => {
                self.vel.y += settings.gravity * 0.5;
                self.pos += self.vel;
                if self.pos.y > kill_line {
                    self.alive = false;
                }
            }
        }
    }
}

/// Things the block rule and contact pass ask the roster to create
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spawn {
    Item { kind: ItemKind, col: i32, row: i32 },
    CoinPopup { col: i32, row: i32 },
    ScorePopup { at: Vec2, amount: u32 },
    BrickShards { col: i32, row: i32 },
}

/// Player fate after the contact pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Unharmed,
    Killed,
}

/// Owner of all enemies, items and effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorRoster {
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    /// Sorted by id
    pub items: Vec<Item>,
    pub effects: Vec<Effect>,
    next_id: u32,
}

impl ActorRoster {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, kind, pos));
        id
    }

    pub fn spawn(&mut self, spawn: Spawn, events: &mut Vec<GameEvent>) {
        match spawn {
            Spawn::Item { kind, col, row } => {
                let id = self.next_entity_id();
                log::debug!("Item {:?} emerging at ({}, {})", kind, col, row);
                self.items.push(Item::emerge_from(id, kind, col, row));
                events.push(GameEvent::ItemSpawned { kind });
            }
            Spawn::CoinPopup { col, row } => {
                let start = Vec2::new(cell_to_world(col), cell_to_world(row - 1));
                self.effects.push(Effect::new(
                    EffectKind::CoinPopup { floor_y: start.y },
                    start,
                    Vec2::new(0.0, -4.0 * PIXEL_SCALE),
                ));
            }
            Spawn::ScorePopup { at, amount } => {
                let popup = Effect::new(EffectKind::ScorePopup { amount }, at, Vec2::ZERO);
                self.effects.push(popup);
            }
            Spawn::BrickShards { col, row } => {
                let origin = Vec2::new(cell_to_world(col), cell_to_world(row));
                let half = TILE_SIZE / 2.0;
                for i in 0..4 {
                    let (sx, sy) = ((i % 2) as f32, (i / 2) as f32);
                    let pos = origin + Vec2::new(sx * half, sy * half);
                    // Left pair flies left, top pair flies higher
                    let vel = Vec2::new(
                        (sx * 2.0 - 1.0) * 2.0 * PIXEL_SCALE,
                        -(6.0 - 2.0 * sy) * PIXEL_SCALE,
                    );
                    self.effects.push(Effect::new(EffectKind::BrickShard, pos, vel));
                }
            }
        }
    }

    /// Credit score and float a popup at `at`
    pub fn award(
        &mut self,
        player: &mut Player,
        amount: u32,
        at: Vec2,
        events: &mut Vec<GameEvent>,
    ) {
        player.add_score(amount);
        events.push(GameEvent::ScoreAwarded { amount });
        self.spawn(Spawn::ScorePopup { at, amount }, events);
    }

    /// Step every live member one tick
    pub fn update(&mut self, grid: &TileGrid, camera_x: f32, kill_line: f32, settings: &Settings) {
        for enemy in &mut self.enemies {
            if !enemy.is_alive() {
                continue;
            }
            if !enemy.activated {
                if !enemy.in_activation_range(camera_x) {
                    continue;
                }
                enemy.activated = true;
            }
            if let Some(ticks) = enemy.stomp_ticks.as_mut() {
                *ticks = ticks.saturating_sub(1);
                if *ticks == 0 {
                    enemy.kill();
                }
                continue;
            }

            step_actor(enemy, grid, settings.gravity, settings.max_fall);
            enemy.anim += 0.15;
            if enemy.below_kill_line(kill_line) {
                enemy.kill();
            }
        }

        for item in &mut self.items {
            if !item.is_alive() {
                continue;
            }
            item.anim += 0.1;

            if let Some(target) = item.emerge_to {
                // Parked inside its block while the cell above is filled
                let col = world_to_cell(item.body.center().x);
                if grid.is_solid_at(col, world_to_cell(target)) {
                    continue;
                }
                item.body.pos.y -= EMERGE_SPEED;
                if item.body.pos.y <= target {
                    item.body.pos.y = target;
                    item.emerge_to = None;
                    if item.kind == ItemKind::Star {
                        item.body.vel.y = STAR_BOUNCE;
                    }
                }
                continue;
            }

            match item.kind {
                ItemKind::FireFlower => {}
                ItemKind::Mushroom | ItemKind::ExtraLife => {
                    step_actor(item, grid, settings.gravity, settings.max_fall);
                }
                ItemKind::Star => {
                    let result = step_actor(item, grid, settings.gravity, settings.max_fall);
                    if result.landed() {
                        item.body.vel.y = STAR_BOUNCE;
                    }
                }
            }
            if item.below_kill_line(kill_line) {
                item.kill();
            }
        }

        for effect in &mut self.effects {
            effect.update(settings, kill_line);
        }
    }

    /// Resolve player overlaps with enemies, then with items
    pub fn resolve_contacts(
        &mut self,
        player: &mut Player,
        settings: &Settings,
        events: &mut Vec<GameEvent>,
    ) -> ContactOutcome {
        let mut awards: Vec<(u32, Vec2)> = Vec::new();
        let mut outcome = ContactOutcome::Unharmed;
        // Classified by the motion this tick; the bounce lands after the pass
        let descending = player.body.vel.y > 0.0;
        let mut bounced = false;

        for enemy in &mut self.enemies {
            if !enemy.is_alive() || !enemy.activated || enemy.is_stomped() {
                continue;
            }
            if !player.body.overlaps(&enemy.body) {
                continue;
            }

            let from_above = player.body.bottom() <= enemy.body.top() + enemy.body.size.y * 0.5;

            if descending && from_above && enemy.kind.stompable() {
                log::debug!("Enemy {} stomped", enemy.id);
                enemy.stomp(settings.stomp_despawn_ticks);
                bounced = true;
                events.push(GameEvent::EnemyStomped { id: enemy.id });
                awards.push((STOMP_SCORE, enemy.body.pos));
            } else if player.has_star() {
                log::debug!("Enemy {} knocked out by star power", enemy.id);
                enemy.kill();
                events.push(GameEvent::EnemyDefeated { id: enemy.id });
                awards.push((STAR_KILL_SCORE, enemy.body.pos));
            } else {
                match player.take_damage(settings) {
                    DamageOutcome::Ignored => {}
                    DamageOutcome::Shrunk(tier) => {
                        log::debug!("Player hit by enemy {}, now {:?}", enemy.id, tier);
                        events.push(GameEvent::PlayerDamaged { tier });
                    }
                    DamageOutcome::Killed => {
                        outcome = ContactOutcome::Killed;
                        break;
                    }
                }
            }
        }

        if bounced {
            player.body.vel.y = settings.stomp_bounce;
        }
        for (amount, at) in awards {
            self.award(player, amount, at, events);
        }
        if outcome == ContactOutcome::Killed {
            return outcome;
        }

        let mut pickups: Vec<(ItemKind, Vec2)> = Vec::new();
        for item in &mut self.items {
            if !item.is_alive() || item.is_emerging() {
                continue;
            }
            if player.body.overlaps(&item.body) {
                item.kill();
                pickups.push((item.kind, item.body.pos));
            }
        }
        for (kind, at) in pickups {
            self.apply_pickup(player, kind, at, settings, events);
        }

        outcome
    }

    fn apply_pickup(
        &mut self,
        player: &mut Player,
        kind: ItemKind,
        at: Vec2,
        settings: &Settings,
        events: &mut Vec<GameEvent>,
    ) {
        log::debug!("Player picked up {:?}", kind);
        match kind {
            ItemKind::Mushroom | ItemKind::FireFlower => {
                let tier = player.power_up(kind == ItemKind::FireFlower);
                events.push(GameEvent::PoweredUp { tier });
                self.award(player, POWER_UP_SCORE, at, events);
            }
            ItemKind::Star => {
                player.start_star(settings);
                events.push(GameEvent::StarPowerStarted);
                self.award(player, POWER_UP_SCORE, at, events);
            }
            ItemKind::ExtraLife => {
                player.lives += 1;
                events.push(GameEvent::ExtraLife);
            }
        }
    }

    /// Drop everything flagged dead
    pub fn purge(&mut self) {
        self.enemies.retain(|e| e.body.alive);
        self.items.retain(|i| i.body.alive);
        self.effects.retain(|e| e.alive);
    }

    pub fn live_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.body.alive)
    }
}
