//! Tile kinds and the level grid
//!
//! The grid never changes shape after construction. Only cell kinds mutate,
//! and solidity is always derived from the kind.

use serde::{Deserialize, Serialize};

/// Closed set of cell kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Air,
    Ground,
    Brick,
    /// Question block holding a coin
    CoinBlock,
    /// Question block holding a mushroom (fire flower when the player is big)
    MushroomBlock,
    StarBlock,
    ExtraLifeBlock,
    /// Question block after its content was released
    EmptyBlock,
    PipeTopLeft,
    PipeTopRight,
    PipeLeft,
    PipeRight,
    Stair,
    FlagPole,
    FlagTop,
    Castle,
    /// Background coin, no collision
    Coin,
}

impl Tile {
    /// Whether actors collide with this kind
    pub const fn is_solid(self) -> bool {
        match self {
            Tile::Ground
            | Tile::Brick
            | Tile::CoinBlock
            | Tile::MushroomBlock
            | Tile::StarBlock
            | Tile::ExtraLifeBlock
            | Tile::EmptyBlock
            | Tile::PipeTopLeft
            | Tile::PipeTopRight
            | Tile::PipeLeft
            | Tile::PipeRight
            | Tile::Stair => true,
            Tile::Air | Tile::FlagPole | Tile::FlagTop | Tile::Castle | Tile::Coin => false,
        }
    }

    /// Goal tiles that end the level on contact
    pub const fn is_goal(self) -> bool {
        matches!(self, Tile::FlagPole | Tile::FlagTop)
    }
}

/// Fixed-size grid of tiles, row-major, addressed by (column, row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    cells: Vec<Tile>,
}

impl TileGrid {
    /// Kind reported for side walls and the floor under the grid
    pub const BOUNDARY: Tile = Tile::Ground;

    /// Create a grid filled with air
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            cells: vec![Tile::Air; width * height],
        }
    }

    /// Build from rows of equal length (validated by the level loader)
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let cells: Vec<Tile> = rows.into_iter().flatten().collect();
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width: width as i32,
            height: height as i32,
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || col >= self.width || row < 0 || row >= self.height {
            None
        } else {
            Some((row * self.width + col) as usize)
        }
    }

    /// Kind at a cell. Columns outside the grid are walls, rows above are
    /// open air, rows below are the floor of the world.
    pub fn kind_at(&self, col: i32, row: i32) -> Tile {
        if col < 0 || col >= self.width {
            return Self::BOUNDARY;
        }
        if row < 0 {
            return Tile::Air;
        }
        if row >= self.height {
            return Self::BOUNDARY;
        }
        self.cells[(row * self.width + col) as usize]
    }

    /// Replace a cell's kind. Out-of-bounds writes are ignored.
    pub fn set_kind(&mut self, col: i32, row: i32, tile: Tile) {
        if let Some(i) = self.index(col, row) {
            self.cells[i] = tile;
        }
    }

    #[inline]
    pub fn is_solid_at(&self, col: i32, row: i32) -> bool {
        self.kind_at(col, row).is_solid()
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Count cells of a kind
    pub fn count(&self, tile: Tile) -> usize {
        self.cells.iter().filter(|&&t| t == tile).count()
    }
}
