//! Level data provider
//!
//! Levels are authored as text, one string per row and one glyph per tile.
//! Parsing validates the layout once; the simulation only ever sees a
//! `Level` that passed validation.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell_to_world;
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::sim::roster::EnemyKind;
use crate::sim::tile::{Tile, TileGrid};

/// Layout problems found while loading level data
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level layout has no rows")]
    Empty,
    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown glyph '{glyph}' at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
    #[error("level has no player start ('P')")]
    MissingPlayerStart,
    #[error("second player start at row {row}, column {col}")]
    DuplicatePlayerStart { row: usize, col: usize },
    #[error("invalid level json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized level layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    pub rows: Vec<String>,
}

/// Initial enemy placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyPlacement {
    pub kind: EnemyKind,
    pub pos: Vec2,
}

/// A validated level, ready to (re)start from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub grid: TileGrid,
    pub enemies: Vec<EnemyPlacement>,
    /// Top-left of the player box
    pub player_start: Vec2,
}

impl Level {
    /// Pixel width of the whole level
    pub fn width_px(&self) -> f32 {
        cell_to_world(self.grid.width())
    }

    /// Bottom edge of the grid; anything reaching it dies
    pub fn kill_line(&self) -> f32 {
        cell_to_world(self.grid.height())
    }
}

/// Tile for a layout glyph. Actor glyphs map to the air they stand in.
fn tile_for_glyph(glyph: char) -> Option<Tile> {
    let tile = match glyph {
        '.' | 'g' | 'P' => Tile::Air,
        '#' => Tile::Ground,
        'B' => Tile::Brick,
        '?' => Tile::CoinBlock,
        'M' => Tile::MushroomBlock,
        'S' => Tile::StarBlock,
        'U' => Tile::ExtraLifeBlock,
        'E' => Tile::EmptyBlock,
        '[' => Tile::PipeTopLeft,
        ']' => Tile::PipeTopRight,
        '{' => Tile::PipeLeft,
        '}' => Tile::PipeRight,
        '=' => Tile::Stair,
        '|' => Tile::FlagPole,
        '^' => Tile::FlagTop,
        'C' => Tile::Castle,
        'o' => Tile::Coin,
        _ => return None,
    };
    Some(tile)
}

/// Top-left for a box of `size` standing on the floor of cell (col, row)
fn standing_in_cell(col: usize, row: usize, size: Vec2) -> Vec2 {
    Vec2::new(
        cell_to_world(col as i32),
        cell_to_world(row as i32 + 1) - size.y,
    )
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the layout and split it into grid and actor placements
    pub fn parse(&self) -> Result<Level, LevelError> {
        let expected = self.rows.first().ok_or(LevelError::Empty)?.chars().count();
        if expected == 0 {
            return Err(LevelError::Empty);
        }

        let mut tiles = Vec::with_capacity(self.rows.len());
        let mut enemies = Vec::new();
        let mut player_start = None;

        for (row, line) in self.rows.iter().enumerate() {
            let found = line.chars().count();
            if found != expected {
                return Err(LevelError::RaggedRow {
                    row,
                    expected,
                    found,
                });
            }

            let mut cells = Vec::with_capacity(expected);
            for (col, glyph) in line.chars().enumerate() {
                let tile =
                    tile_for_glyph(glyph).ok_or(LevelError::UnknownGlyph { glyph, row, col })?;
                match glyph {
                    'g' => {
                        let kind = EnemyKind::Walker;
                        enemies.push(EnemyPlacement {
                            kind,
                            pos: standing_in_cell(col, row, kind.size()),
                        });
                    }
                    'P' => {
                        if player_start.is_some() {
                            return Err(LevelError::DuplicatePlayerStart { row, col });
                        }
                        player_start = Some(standing_in_cell(
                            col,
                            row,
                            Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
                        ));
                    }
                    _ => {}
                }
                cells.push(tile);
            }
            tiles.push(cells);
        }

        let player_start = player_start.ok_or(LevelError::MissingPlayerStart)?;
        log::debug!(
            "Parsed level '{}': {}x{} tiles, {} enemies",
            self.name,
            expected,
            tiles.len(),
            enemies.len()
        );

        Ok(Level {
            name: self.name.clone(),
            grid: TileGrid::from_rows(tiles),
            enemies,
            player_start,
        })
    }

    /// The built-in opening stage
    pub fn first_stage() -> Self {
        const WIDTH: usize = 224;
        const HEIGHT: usize = 15;
        const FLOOR: i32 = 13;

        let mut canvas = Canvas::new(WIDTH, HEIGHT);

        for (start, end) in [(0, 69), (71, 86), (89, 153), (155, WIDTH as i32)] {
            for col in start..end {
                canvas.set(col, FLOOR, '#');
                canvas.set(col, FLOOR + 1, '#');
            }
        }
        // Pit right after the second staircase
        canvas.set(152, FLOOR, '.');
        canvas.set(152, FLOOR + 1, '.');

        for (col, height) in [(28, 2), (38, 2), (46, 3), (57, 3), (163, 2)] {
            canvas.pipe(col, FLOOR - 1, height);
        }

        let blocks: &[(i32, i32, char)] = &[
            (16, 9, 'M'),
            (20, 9, 'B'),
            (21, 9, '?'),
            (22, 9, 'M'),
            (23, 9, '?'),
            (24, 9, 'B'),
            (22, 5, '?'),
            (77, 9, 'B'),
            (78, 9, 'U'),
            (79, 9, 'B'),
            (91, 9, '?'),
            (94, 9, 'B'),
            (100, 9, 'M'),
            (101, 9, '?'),
            (100, 5, 'o'),
            (101, 5, 'o'),
            (102, 5, 'o'),
            (106, 9, 'B'),
            (106, 5, 'B'),
            (107, 5, 'B'),
            (108, 5, 'B'),
            (109, 5, 'S'),
            (109, 9, 'B'),
            (110, 9, '?'),
            (111, 9, 'B'),
            (118, 5, 'B'),
            (119, 5, 'B'),
            (120, 5, 'B'),
            (121, 5, '?'),
            (122, 5, 'B'),
            (128, 9, 'B'),
            (129, 9, 'B'),
            (129, 5, 'B'),
            (130, 5, '?'),
            (131, 5, '?'),
            (168, 9, 'B'),
            (169, 9, 'B'),
            (170, 9, '?'),
            (171, 9, 'B'),
        ];
        for &(col, row, glyph) in blocks {
            canvas.set(col, row, glyph);
        }
        for col in 80..88 {
            canvas.set(col, 5, 'B');
        }

        // Staircases: ascending steps stand on the floor, descending ones
        // replace it
        for i in 0..4 {
            for j in 0..=i {
                canvas.set(134 + i, FLOOR - 1 - j, '=');
                canvas.set(148 + i, FLOOR - 1 - j, '=');
            }
            for j in 0..4 - i {
                canvas.set(140 + i, FLOOR - j, '=');
                canvas.set(155 + i, FLOOR - j, '=');
            }
        }
        for i in 0..8 {
            for j in 0..=i {
                canvas.set(181 + i, FLOOR - 1 - j, '=');
            }
        }
        for j in 0..8 {
            canvas.set(189, FLOOR - 1 - j, '=');
        }

        canvas.set(198, 4, '^');
        for row in 5..FLOOR {
            canvas.set(198, row, '|');
        }
        for col in 202..207 {
            for j in 0..4 {
                canvas.set(col, FLOOR - 1 - j, 'C');
            }
        }
        canvas.set(204, FLOOR - 5, 'C');

        for col in [22, 40, 51, 53, 80, 82, 97, 99, 114, 116, 124, 126, 128, 130] {
            canvas.set(col, FLOOR - 1, 'g');
        }
        canvas.set(3, FLOOR - 1, 'P');

        LevelData {
            name: "1-1".to_string(),
            rows: canvas.into_rows(),
        }
    }
}

/// Scratch glyph buffer used to author built-in layouts
struct Canvas {
    width: i32,
    height: i32,
    glyphs: Vec<Vec<char>>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            glyphs: vec![vec!['.'; width]; height],
        }
    }

    fn set(&mut self, col: i32, row: i32, glyph: char) {
        if (0..self.width).contains(&col) && (0..self.height).contains(&row) {
            self.glyphs[row as usize][col as usize] = glyph;
        }
    }

    /// Two-wide pipe whose body bottoms out at `base_row`
    fn pipe(&mut self, col: i32, base_row: i32, height: i32) {
        let top = base_row - height + 1;
        self.set(col, top, '[');
        self.set(col + 1, top, ']');
        for row in top + 1..=base_row {
            self.set(col, row, '{');
            self.set(col + 1, row, '}');
        }
    }

    fn into_rows(self) -> Vec<String> {
        self.glyphs
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect()
    }
}
