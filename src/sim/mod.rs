//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (input scripts)
//! - Stable iteration order (by entity ID, row-major grid scans)
//! - No rendering or platform dependencies

pub mod actor;
pub mod blocks;
pub mod collision;
pub mod player;
pub mod roster;
pub mod script;
pub mod state;
pub mod tick;
pub mod tile;
pub mod view;

pub use actor::{Actor, Body, WallResponse};
pub use blocks::{BlockEffect, BlockOutcome, strike_block};
pub use collision::{CollisionResult, TileHit, move_and_collide, step_actor};
pub use player::{AnimationPhase, DamageOutcome, Facing, Player, PowerTier};
pub use roster::{ActorRoster, Effect, EffectKind, Enemy, EnemyKind, Item, ItemKind, Spawn};
pub use script::InputScript;
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use tile::{Tile, TileGrid};
pub use view::{ActorKind, ActorView, FrameView, PlayerView};
