//! Tile Dash - A side-scrolling platformer physics core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile grid, collisions, actors, game state)
//! - `level`: Level data provider (text layouts, built-in first stage)
//! - `settings`: Data-driven physics tuning

pub mod level;
pub mod settings;
pub mod sim;

pub use level::{Level, LevelData, LevelError};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICKS_PER_SECOND: u32 = 60;

    /// One source-art pixel in world pixels
    pub const PIXEL_SCALE: f32 = 3.0;
    /// Edge length of one grid cell
    pub const TILE_SIZE: f32 = 16.0 * PIXEL_SCALE;
    /// Visible viewport width
    pub const SCREEN_WIDTH: f32 = 256.0 * PIXEL_SCALE;

    /// Player box
    pub const PLAYER_WIDTH: f32 = 10.0 * PIXEL_SCALE;
    pub const PLAYER_HEIGHT: f32 = 14.0 * PIXEL_SCALE;

    /// Walker enemy box and patrol speed
    pub const WALKER_WIDTH: f32 = TILE_SIZE - 4.0 * PIXEL_SCALE;
    pub const WALKER_HEIGHT: f32 = TILE_SIZE;
    pub const WALKER_SPEED: f32 = 0.8 * PIXEL_SCALE;

    /// Spawned items
    pub const MUSHROOM_SPEED: f32 = 1.5 * PIXEL_SCALE;
    pub const STAR_SPEED: f32 = 2.0 * PIXEL_SCALE;
    pub const STAR_BOUNCE: f32 = -4.0 * PIXEL_SCALE;
    /// Rise per tick while an item climbs out of its block
    pub const EMERGE_SPEED: f32 = 0.5 * PIXEL_SCALE;

    /// Level timer units per tick divisor
    pub const TICKS_PER_TIME_UNIT: u32 = 24;
    /// Coins needed for a bonus life
    pub const COINS_PER_LIFE: u32 = 100;
}

/// Axis-aligned rectangle overlap test (strict, touching edges don't overlap)
#[inline]
pub fn boxes_overlap(a_min: Vec2, a_size: Vec2, b_min: Vec2, b_size: Vec2) -> bool {
    a_min.x < b_min.x + b_size.x
        && a_min.x + a_size.x > b_min.x
        && a_min.y < b_min.y + b_size.y
        && a_min.y + a_size.y > b_min.y
}

/// Convert a world coordinate to the grid index containing it
#[inline]
pub fn world_to_cell(v: f32) -> i32 {
    (v / consts::TILE_SIZE).floor() as i32
}

/// World coordinate of a cell's near edge
#[inline]
pub fn cell_to_world(cell: i32) -> f32 {
    cell as f32 * consts::TILE_SIZE
}
