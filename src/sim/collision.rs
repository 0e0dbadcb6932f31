//! Collision detection and response against the tile grid
//!
//! The heart of the platformer: move a box by its per-tick displacement,
//! one axis at a time. Horizontal motion is applied and resolved fully before
//! vertical motion so corners never snag and landing is frame-stable.
//!
//! Multi-tile contacts: the nearest blocking tile along the direction of
//! travel wins. Equal distances go to the first cell scanned in row-major
//! order (top row first, then leftmost column).

use std::ops::RangeInclusive;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, Body, WallResponse};
use super::tile::{Tile, TileGrid};
use crate::consts::TILE_SIZE;
use crate::{cell_to_world, world_to_cell};

/// A solid cell the box ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileHit {
    pub col: i32,
    pub row: i32,
    pub tile: Tile,
}

/// Result of moving one actor for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionResult {
    /// Tile that stopped horizontal motion
    pub wall: Option<TileHit>,
    /// Tile landed on
    pub floor: Option<TileHit>,
    /// Tile struck from below
    pub ceiling: Option<TileHit>,
}

impl CollisionResult {
    pub fn landed(&self) -> bool {
        self.floor.is_some()
    }
}

/// Inclusive range of cells overlapped by the span [min, max).
/// A box flush against a cell face does not overlap that cell.
#[inline]
pub fn cell_span(min: f32, max: f32) -> RangeInclusive<i32> {
    let first = world_to_cell(min);
    let last = ((max / TILE_SIZE).ceil() as i32 - 1).max(first);
    first..=last
}

/// Scan the box footprint for solid cells and keep the nearest one.
/// `closer(candidate, best)` decides whether a candidate beats the current best.
fn nearest_solid(
    body: &Body,
    grid: &TileGrid,
    closer: impl Fn(&TileHit, &TileHit) -> bool,
) -> Option<TileHit> {
    let cols = cell_span(body.left(), body.right());
    let mut best: Option<TileHit> = None;

    for row in cell_span(body.top(), body.bottom()) {
        for col in cols.clone() {
            let tile = grid.kind_at(col, row);
            if !tile.is_solid() {
                continue;
            }
            let candidate = TileHit { col, row, tile };
            match best {
                // Strict comparison keeps the first cell scanned on ties
                Some(ref current) if !closer(&candidate, current) => {}
                _ => best = Some(candidate),
            }
        }
    }

    best
}

/// Move horizontally by `dx` and push back out of the nearest wall.
///
/// World side boundaries count as solid columns, so the same path clamps
/// actors at column 0 and at the right edge of the level.
pub fn resolve_horizontal(
    body: &mut Body,
    grid: &TileGrid,
    dx: f32,
    response: WallResponse,
) -> Option<TileHit> {
    if dx == 0.0 {
        return None;
    }
    body.pos.x += dx;

    let hit = if dx > 0.0 {
        nearest_solid(body, grid, |a, b| a.col < b.col)
    } else {
        nearest_solid(body, grid, |a, b| a.col > b.col)
    }?;

    body.pos.x = if dx > 0.0 {
        cell_to_world(hit.col) - body.size.x
    } else {
        cell_to_world(hit.col + 1)
    };
    match response {
        WallResponse::Stop => body.vel.x = 0.0,
        WallResponse::Reverse => body.vel.x = -body.vel.x,
    }

    Some(hit)
}

/// Vertical contact outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalHit {
    Landed(TileHit),
    Bumped(TileHit),
}

/// Move vertically by `dy` and push back out of the nearest floor or ceiling
pub fn resolve_vertical(body: &mut Body, grid: &TileGrid, dy: f32) -> Option<VerticalHit> {
    if dy == 0.0 {
        return None;
    }
    body.pos.y += dy;

    if dy > 0.0 {
        let hit = nearest_solid(body, grid, |a, b| a.row < b.row)?;
        body.pos.y = cell_to_world(hit.row) - body.size.y;
        body.vel.y = 0.0;
        body.grounded = true;
        Some(VerticalHit::Landed(hit))
    } else {
        let hit = nearest_solid(body, grid, |a, b| a.row > b.row)?;
        body.pos.y = cell_to_world(hit.row + 1);
        body.vel.y = 0.0;
        Some(VerticalHit::Bumped(hit))
    }
}

/// Move a body by `delta`, x axis first, then y.
///
/// Grounded is cleared up front and only set again by a landing, so it
/// reflects this tick alone.
pub fn move_and_collide(
    body: &mut Body,
    grid: &TileGrid,
    delta: Vec2,
    response: WallResponse,
) -> CollisionResult {
    let mut result = CollisionResult::default();
    body.grounded = false;

    result.wall = resolve_horizontal(body, grid, delta.x, response);

    match resolve_vertical(body, grid, delta.y) {
        Some(VerticalHit::Landed(hit)) => result.floor = Some(hit),
        Some(VerticalHit::Bumped(hit)) => result.ceiling = Some(hit),
        None => {}
    }

    result
}

/// Apply gravity and move an actor by its own velocity
pub fn step_actor<A: Actor + ?Sized>(
    actor: &mut A,
    grid: &TileGrid,
    gravity: f32,
    max_fall: f32,
) -> CollisionResult {
    let response = actor.wall_response();
    let body = actor.body_mut();
    body.apply_gravity(gravity, max_fall);
    let delta = body.vel;
    move_and_collide(body, grid, delta, response)
}

/// True if the box overlaps the interior of any solid cell
pub fn overlaps_solid(body: &Body, grid: &TileGrid) -> bool {
    let cols = cell_span(body.left(), body.right());
    cell_span(body.top(), body.bottom())
        .any(|row| cols.clone().any(|col| grid.is_solid_at(col, row)))
}
