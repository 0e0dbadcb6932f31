//! Game state and render-facing notifications
//!
//! Everything one run needs lives here: the live grid, the player, the
//! roster, the camera and the level clock. The validated level is kept so a
//! life loss can rebuild the stage from scratch.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::{Player, PowerTier};
use super::roster::{ActorRoster, ItemKind};
use super::tile::TileGrid;
use crate::consts::*;
use crate::level::Level;
use crate::settings::Settings;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Normal play
    Playing,
    /// Player reached the flag, enemies keep moving
    LevelClear,
    /// No lives left, ticks do nothing
    GameOver,
}

/// Notifications for render/audio consumers, valid for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    CoinCollected,
    ScoreAwarded { amount: u32 },
    /// Small player knocked a brick
    BlockBumped { col: i32, row: i32 },
    /// Question block gave up its content
    BlockEmptied { col: i32, row: i32 },
    /// Brick shattered
    BlockDestroyed { col: i32, row: i32 },
    ItemSpawned { kind: ItemKind },
    EnemyStomped { id: u32 },
    EnemyDefeated { id: u32 },
    PoweredUp { tier: PowerTier },
    PlayerDamaged { tier: PowerTier },
    StarPowerStarted,
    ExtraLife,
    LifeLost,
    LevelRestarted,
    LevelFinished,
    GameOver,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub settings: Settings,
    /// Pristine copy used for restarts
    level: Level,
    /// Live grid, mutated by block strikes
    pub(crate) grid: TileGrid,
    pub player: Player,
    pub roster: ActorRoster,
    /// Left edge of the viewport
    pub camera_x: f32,
    /// Level clock units remaining
    pub time_left: u32,
    /// Ticks since the current attempt started
    pub level_ticks: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Events of the last tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Start a run on `level`
    pub fn new(level: Level, settings: Settings) -> Self {
        log::info!(
            "Starting level '{}' ({}x{} tiles, {} enemies)",
            level.name,
            level.grid.width(),
            level.grid.height(),
            level.enemies.len()
        );

        let mut state = Self {
            grid: level.grid.clone(),
            player: Player::new(level.player_start, settings.starting_lives),
            roster: ActorRoster::new(),
            camera_x: 0.0,
            time_left: settings.level_time,
            level_ticks: 0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            events: Vec::new(),
            settings,
            level,
        };
        state.populate();
        state
    }

    fn populate(&mut self) {
        for placement in &self.level.enemies {
            self.roster.spawn_enemy(placement.kind, placement.pos);
        }
    }

    /// Current grid contents
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn kill_line(&self) -> f32 {
        self.level.kill_line()
    }

    /// Follow the player's center, clamped to the level, never backward
    pub fn update_camera(&mut self) {
        let max_x = (self.level.width_px() - SCREEN_WIDTH).max(0.0);
        let target = (self.player.body.center().x - SCREEN_WIDTH * 0.5).clamp(0.0, max_x);
        if target > self.camera_x {
            self.camera_x = target;
        }
    }

    /// Rebuild the stage for another attempt. Score, coins and lives carry over.
    pub fn restart_level(&mut self) {
        log::info!("Restarting level '{}' with {} lives", self.level.name, self.player.lives);
        self.grid = self.level.grid.clone();
        self.roster = ActorRoster::new();
        self.populate();
        self.player.respawn(self.level.player_start);
        self.camera_x = 0.0;
        self.time_left = self.settings.level_time;
        self.level_ticks = 0;
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::LevelRestarted);
    }

    /// Spend a life; restart or end the run
    pub fn lose_life(&mut self) {
        self.player.lives = self.player.lives.saturating_sub(1);
        self.events.push(GameEvent::LifeLost);
        log::info!("Life lost, {} remaining", self.player.lives);

        if self.player.lives == 0 {
            log::info!("Game over with score {}", self.player.score);
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver);
        } else {
            self.restart_level();
        }
    }

    /// Mark the flag reached
    pub fn finish_level(&mut self) {
        if self.player.finished {
            return;
        }
        log::info!(
            "Level '{}' finished with score {} and {} time left",
            self.level.name,
            self.player.score,
            self.time_left
        );
        self.player.finished = true;
        self.player.body.vel = Vec2::ZERO;
        self.phase = GamePhase::LevelClear;
        self.events.push(GameEvent::LevelFinished);
    }

    /// Advance the level clock one tick. Returns true when time ran out.
    pub fn run_level_clock(&mut self) -> bool {
        self.level_ticks += 1;
        if self.level_ticks % TICKS_PER_TIME_UNIT == 0 && self.time_left > 0 {
            self.time_left -= 1;
            if self.time_left == 0 {
                log::info!("Time up");
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelData;

    fn first_stage() -> GameState {
        let level = LevelData::first_stage().parse().unwrap();
        GameState::new(level, Settings::default())
    }

    #[test]
    fn test_new_state() {
        let state = first_stage();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.lives, 3);
        assert_eq!(state.time_left, 400);
        assert_eq!(state.roster.enemies.len(), 14);
        assert!(state.roster.enemies.iter().all(|e| !e.activated));
        assert_eq!(state.grid(), &state.level().grid);
        assert_eq!(state.kill_line(), 15.0 * TILE_SIZE);
    }

    #[test]
    fn test_camera_follows_forward_only() {
        let mut state = first_stage();
        state.update_camera();
        assert_eq!(state.camera_x, 0.0);

        state.player.body.pos.x = 2000.0;
        state.update_camera();
        let expected = 2000.0 + PLAYER_WIDTH * 0.5 - SCREEN_WIDTH * 0.5;
        assert_eq!(state.camera_x, expected);

        state.player.body.pos.x = 1000.0;
        state.update_camera();
        assert_eq!(state.camera_x, expected);

        // Clamped at the level's right edge
        state.player.body.pos.x = 224.0 * TILE_SIZE - 10.0;
        state.update_camera();
        assert_eq!(state.camera_x, 224.0 * TILE_SIZE - SCREEN_WIDTH);
    }

    #[test]
    fn test_restart_keeps_tallies_and_resets_stage() {
        let mut state = first_stage();
        state.grid.set_kind(16, 9, crate::sim::tile::Tile::EmptyBlock);
        state.player.score = 500;
        state.player.coins = 3;
        state.player.body.pos.x = 3000.0;
        state.camera_x = 2000.0;
        state.time_left = 12;
        state.roster.enemies.clear();

        state.lose_life();
        assert_eq!(state.player.lives, 2);
        assert_eq!(state.player.score, 500);
        assert_eq!(state.player.coins, 3);
        assert_eq!(state.player.body.pos, state.level().player_start);
        assert_eq!(state.grid(), &state.level().grid);
        assert_eq!(state.roster.enemies.len(), 14);
        assert_eq!(state.camera_x, 0.0);
        assert_eq!(state.time_left, 400);
        assert_eq!(state.events, vec![GameEvent::LifeLost, GameEvent::LevelRestarted]);
    }

    #[test]
    fn test_last_life_ends_run() {
        let mut state = first_stage();
        state.player.lives = 1;
        state.lose_life();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.lives, 0);
        assert_eq!(state.events, vec![GameEvent::LifeLost, GameEvent::GameOver]);
    }

    #[test]
    fn test_level_clock() {
        let mut state = first_stage();
        state.time_left = 2;
        for _ in 0..TICKS_PER_TIME_UNIT {
            assert!(!state.run_level_clock());
        }
        assert_eq!(state.time_left, 1);
        for _ in 0..TICKS_PER_TIME_UNIT - 1 {
            assert!(!state.run_level_clock());
        }
        assert!(state.run_level_clock());
        assert_eq!(state.time_left, 0);
    }

    #[test]
    fn test_finish_fires_once() {
        let mut state = first_stage();
        state.finish_level();
        state.finish_level();
        assert!(state.player.finished);
        assert_eq!(state.phase, GamePhase::LevelClear);
        assert_eq!(state.events, vec![GameEvent::LevelFinished]);
    }
}
