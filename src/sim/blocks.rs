//! Block interaction rule
//!
//! Runs when the player's head strikes a tile from below. Mutates the grid
//! (question block -> emptied, brick -> air) and describes what to spawn and
//! award. Never called for sideways/downward contacts or for other actors.

use glam::Vec2;

use super::collision::TileHit;
use super::player::PowerTier;
use super::roster::{ItemKind, Spawn};
use super::tile::{Tile, TileGrid};
use crate::cell_to_world;

pub const COIN_BLOCK_SCORE: u32 = 200;
pub const BRICK_BREAK_SCORE: u32 = 50;
pub const BRICK_BUMP_SCORE: u32 = 10;

/// What the strike did to the block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEffect {
    /// Question block paid out a coin
    Coin,
    /// Question block released an item
    Item(ItemKind),
    /// Brick shattered
    Broken,
    /// Brick wobbled without breaking
    Bumped,
    /// Solid scenery, nothing happens
    Inert,
}

/// Grid change already applied plus awards for the caller to hand out
#[derive(Debug, Clone, PartialEq)]
pub struct BlockOutcome {
    pub effect: BlockEffect,
    pub score: u32,
    pub coins: u32,
    pub spawns: Vec<Spawn>,
}

impl BlockOutcome {
    fn inert() -> Self {
        Self {
            effect: BlockEffect::Inert,
            score: 0,
            coins: 0,
            spawns: Vec::new(),
        }
    }
}

/// Apply a head strike at `hit` for a player of the given tier
pub fn strike_block(grid: &mut TileGrid, hit: TileHit, tier: PowerTier) -> BlockOutcome {
    let (col, row) = (hit.col, hit.row);
    // Read the live cell so a second strike sees the emptied kind
    let tile = grid.kind_at(col, row);

    let release = |grid: &mut TileGrid, kind: ItemKind| {
        grid.set_kind(col, row, Tile::EmptyBlock);
        BlockOutcome {
            effect: BlockEffect::Item(kind),
            score: 0,
            coins: 0,
            spawns: vec![Spawn::Item { kind, col, row }],
        }
    };

    match tile {
        Tile::CoinBlock => {
            grid.set_kind(col, row, Tile::EmptyBlock);
            BlockOutcome {
                effect: BlockEffect::Coin,
                score: COIN_BLOCK_SCORE,
                coins: 1,
                spawns: vec![
                    Spawn::CoinPopup { col, row },
                    Spawn::ScorePopup {
                        at: Vec2::new(cell_to_world(col), cell_to_world(row - 1)),
                        amount: COIN_BLOCK_SCORE,
                    },
                ],
            }
        }
        Tile::MushroomBlock => {
            let kind = if tier.is_big() {
                ItemKind::FireFlower
            } else {
                ItemKind::Mushroom
            };
            release(grid, kind)
        }
        Tile::StarBlock => release(grid, ItemKind::Star),
        Tile::ExtraLifeBlock => release(grid, ItemKind::ExtraLife),
        Tile::Brick if tier.is_big() => {
            grid.set_kind(col, row, Tile::Air);
            BlockOutcome {
                effect: BlockEffect::Broken,
                score: BRICK_BREAK_SCORE,
                coins: 0,
                spawns: vec![Spawn::BrickShards { col, row }],
            }
        }
        Tile::Brick => BlockOutcome {
            effect: BlockEffect::Bumped,
            score: BRICK_BUMP_SCORE,
            coins: 0,
            spawns: Vec::new(),
        },
        Tile::Air
        | Tile::Ground
        | Tile::EmptyBlock
        | Tile::PipeTopLeft
        | Tile::PipeTopRight
        | Tile::PipeLeft
        | Tile::PipeRight
        | Tile::Stair
        | Tile::FlagPole
        | Tile::FlagTop
        | Tile::Castle
        | Tile::Coin => BlockOutcome::inert(),
    }
}
