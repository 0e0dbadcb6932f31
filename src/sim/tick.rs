//! Fixed timestep simulation tick
//!
//! One call advances the whole game by exactly one frame: player, camera,
//! roster, contacts, purge, then the death and clock checks.

use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::blocks::{BlockEffect, strike_block};
use super::collision::{TileHit, cell_span, move_and_collide};
use super::roster::ContactOutcome;
use super::state::{GameEvent, GamePhase, GameState};

/// Button snapshot for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub run: bool,
    /// Jump button is down
    pub jump: bool,
    /// Jump button was already down last tick
    pub jump_held: bool,
}

impl TickInput {
    /// Jump went down this tick
    pub fn jump_pressed(&self) -> bool {
        self.jump && !self.jump_held
    }

    /// Fill in the held flag from the previous tick's buttons
    pub fn from_buttons(prev: &TickInput, now: TickInput) -> Self {
        Self {
            jump_held: prev.jump,
            ..now
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.time_ticks += 1;

    if state.player.finished {
        state.player.finish_ticks += 1;
    } else {
        step_player(state, input);
    }

    state.update_camera();

    let kill_line = state.kill_line();
    state.roster.update(&state.grid, state.camera_x, kill_line, &state.settings);

    let mut died = false;
    if !state.player.finished {
        let outcome = state.roster.resolve_contacts(
            &mut state.player,
            &state.settings,
            &mut state.events,
        );
        died = outcome == ContactOutcome::Killed;
    }

    state.roster.purge();

    if state.player.finished {
        return;
    }
    if !died && state.player.below_kill_line(kill_line) {
        log::debug!("Player fell at x={:.1}", state.player.body.pos.x);
        died = true;
    }
    if !died && state.run_level_clock() {
        died = true;
    }
    if died {
        state.lose_life();
    }
}

/// Input, physics and head strikes for the player
fn step_player(state: &mut GameState, input: &TickInput) {
    let player = &mut state.player;
    player.tick_timers();
    player.apply_input(input, &state.settings);

    let response = player.wall_response();
    let delta = player.body.vel;
    let result = move_and_collide(&mut player.body, &state.grid, delta, response);

    if let Some(hit) = result.ceiling {
        strike_from_below(state, hit);
    }

    if touches_goal(state) {
        state.finish_level();
    }
}

/// Run the block rule for a head strike and hand out what it produced
fn strike_from_below(state: &mut GameState, hit: TileHit) {
    let outcome = strike_block(&mut state.grid, hit, state.player.tier);
    let (col, row) = (hit.col, hit.row);

    let event = match outcome.effect {
        BlockEffect::Coin | BlockEffect::Item(_) => GameEvent::BlockEmptied { col, row },
        BlockEffect::Broken => GameEvent::BlockDestroyed { col, row },
        BlockEffect::Bumped => GameEvent::BlockBumped { col, row },
        BlockEffect::Inert => return,
    };
    log::debug!("Struck {:?} at ({}, {}): {:?}", hit.tile, col, row, outcome.effect);
    state.events.push(event);

    for _ in 0..outcome.coins {
        state.events.push(GameEvent::CoinCollected);
        if state.player.add_coin() {
            state.events.push(GameEvent::ExtraLife);
        }
    }
    if outcome.score > 0 {
        state.player.add_score(outcome.score);
        state.events.push(GameEvent::ScoreAwarded {
            amount: outcome.score,
        });
    }
    for spawn in outcome.spawns {
        state.roster.spawn(spawn, &mut state.events);
    }
}

/// Player box overlaps the flagpole or flag top
fn touches_goal(state: &GameState) -> bool {
    let body = &state.player.body;
    let cols = cell_span(body.left(), body.right());
    cell_span(body.top(), body.bottom())
        .any(|row| cols.clone().any(|col| state.grid.kind_at(col, row).is_goal()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::level::LevelData;
    use crate::settings::Settings;
    use crate::sim::player::PowerTier;
    use crate::sim::roster::{Item, ItemKind};
    use crate::sim::script::InputScript;
    use crate::sim::tile::Tile;
    use glam::Vec2;
    use proptest::prelude::*;

    const T: f32 = TILE_SIZE;

    fn state_from(rows: &[&str], settings: Settings) -> GameState {
        let data = LevelData {
            name: "test".to_string(),
            rows: rows.iter().map(|r| r.to_string()).collect(),
        };
        GameState::new(data.parse().unwrap(), settings)
    }

    fn first_stage() -> GameState {
        GameState::new(LevelData::first_stage().parse().unwrap(), Settings::default())
    }

    /// Run a script, collecting every event emitted along the way
    fn run(state: &mut GameState, inputs: impl IntoIterator<Item = TickInput>) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for input in inputs {
            tick(state, &input);
            events.extend_from_slice(&state.events);
        }
        events
    }

    fn jump_then_hold(ticks: usize) -> Vec<TickInput> {
        let mut prev = TickInput::default();
        (0..ticks)
            .map(|_| {
                let now = TickInput::from_buttons(
                    &prev,
                    TickInput {
                        jump: true,
                        ..Default::default()
                    },
                );
                prev = now;
                now
            })
            .collect()
    }

    #[test]
    fn test_jump_edge_detection() {
        let idle = TickInput::default();
        let down = TickInput {
            jump: true,
            ..Default::default()
        };
        let first = TickInput::from_buttons(&idle, down);
        assert!(first.jump_pressed());
        let second = TickInput::from_buttons(&first, down);
        assert!(second.jump_held);
        assert!(!second.jump_pressed());
    }

    #[test]
    fn test_standing_player_stays_put() {
        let mut state = first_stage();
        let start = state.player.body.pos;
        run(&mut state, std::iter::repeat_n(TickInput::default(), 120));
        assert_eq!(state.player.body.pos, start);
        assert!(state.player.body.grounded);
        assert_eq!(state.time_ticks, 120);
        assert_eq!(state.time_left, 400 - 5);
    }

    #[test]
    fn test_head_strike_releases_mushroom() {
        let mut state = first_stage();
        // Just under the block at (16, 9), moving up
        state.player.body.pos = Vec2::new(16.0 * T + 9.0, 10.0 * T + 3.0);
        state.player.body.vel = Vec2::new(0.0, -8.0);

        tick(&mut state, &TickInput::default());

        assert_eq!(state.grid().kind_at(16, 9), Tile::EmptyBlock);
        assert_eq!(state.player.body.top(), 10.0 * T);
        assert_eq!(state.player.score, 0);
        assert!(state.events.contains(&GameEvent::BlockEmptied { col: 16, row: 9 }));
        assert!(state.events.contains(&GameEvent::ItemSpawned {
            kind: ItemKind::Mushroom
        }));

        let item = &state.roster.items[0];
        assert_eq!(item.kind, ItemKind::Mushroom);
        assert!(item.is_emerging());
        assert_eq!(item.body.pos.x, 16.0 * T);
        assert!((item.body.pos.y - 9.0 * T).abs() < T);
    }

    #[test]
    fn test_coin_block_pays_once_across_jumps() {
        let mut state = state_from(
            &[
                "..........",
                "....?.....",
                "..........",
                "..........",
                "....P.....",
                "##########",
            ],
            Settings::default(),
        );

        // Settle onto the floor before the first press
        let mut inputs = vec![TickInput::default()];
        inputs.extend(jump_then_hold(60));
        inputs.extend(std::iter::repeat_n(TickInput::default(), 5));
        inputs.extend(jump_then_hold(60));
        let events = run(&mut state, inputs);

        assert_eq!(state.grid().kind_at(4, 1), Tile::EmptyBlock);
        assert_eq!(state.player.coins, 1);
        assert_eq!(state.player.score, 200);
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == GameEvent::CoinCollected)
                .count(),
            1
        );
        assert!(events.contains(&GameEvent::BlockEmptied { col: 4, row: 1 }));
    }

    #[test]
    fn test_side_and_top_contact_leave_block_loaded() {
        let mut state = state_from(
            &[
                "..........",
                "..........",
                "..........",
                ".....?....",
                "..P..?....",
                "##########",
            ],
            Settings::default(),
        );
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let mut events = run(&mut state, std::iter::repeat_n(right, 40));
        assert!(state.player.body.right() <= 5.0 * T);

        // Put the player down on top of the stack
        state.player.body.pos = Vec2::new(5.0 * T + 9.0, 3.0 * T - PLAYER_HEIGHT - 20.0);
        state.player.body.vel = Vec2::ZERO;
        events.extend(run(&mut state, std::iter::repeat_n(TickInput::default(), 30)));
        assert!(state.player.body.grounded);
        assert_eq!(state.player.body.bottom(), 3.0 * T);

        assert_eq!(state.grid().kind_at(5, 3), Tile::CoinBlock);
        assert_eq!(state.grid().kind_at(5, 4), Tile::CoinBlock);
        assert_eq!(state.player.score, 0);
        assert_eq!(state.player.coins, 0);
        assert!(!events.contains(&GameEvent::CoinCollected));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::BlockEmptied { .. })));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::BlockBumped { .. })));
    }

    #[test]
    fn test_star_rising_into_block_leaves_it_loaded() {
        let mut state = state_from(
            &[
                "..........",
                "....?.....",
                "..........",
                "..........",
                "P.........",
                "##########",
            ],
            Settings::default(),
        );
        // Already out of its block, heading straight up under the `?`
        let mut star = Item::emerge_from(99, ItemKind::Star, 4, 2);
        star.emerge_to = None;
        star.body.vel = Vec2::new(0.0, STAR_BOUNCE);
        state.roster.items.push(star);

        let events = run(&mut state, std::iter::repeat_n(TickInput::default(), 10));
        let star = &state.roster.items[0];
        assert!(star.body.top() >= 2.0 * T);
        assert_eq!(state.grid().kind_at(4, 1), Tile::CoinBlock);
        assert_eq!(state.player.coins, 0);
        assert!(!events.contains(&GameEvent::CoinCollected));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::BlockEmptied { .. })));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ItemSpawned { .. })));
    }

    #[test]
    fn test_big_player_breaks_brick() {
        let mut state = state_from(
            &[
                "..........",
                "....B.....",
                "..........",
                "..........",
                "....P.....",
                "##########",
            ],
            Settings::default(),
        );
        state.player.tier = PowerTier::Big;
        tick(&mut state, &TickInput::default());

        let events = run(&mut state, jump_then_hold(40));
        assert_eq!(state.grid().kind_at(4, 1), Tile::Air);
        assert_eq!(state.player.score, 50);
        assert!(events.contains(&GameEvent::BlockDestroyed { col: 4, row: 1 }));
        assert!(events.contains(&GameEvent::ScoreAwarded { amount: 50 }));
    }

    #[test]
    fn test_stomp_through_tick() {
        let mut state = state_from(
            &[
                "....................",
                "....................",
                "....................",
                "....................",
                ".P........g.........",
                "####################",
            ],
            Settings::default(),
        );
        let walker = state.roster.enemies[0].body.clone();
        state.player.body.pos = Vec2::new(walker.left() + 3.0, walker.top() - 2.0 - PLAYER_HEIGHT);
        state.player.body.vel = Vec2::new(0.0, 4.0);

        tick(&mut state, &TickInput::default());
        let id = state.roster.enemies[0].id;
        assert!(state.events.contains(&GameEvent::EnemyStomped { id }));
        assert!(state.roster.enemies[0].is_stomped());
        assert_eq!(state.roster.enemies[0].body.vel.x, 0.0);
        assert_eq!(state.player.body.vel.y, state.settings.stomp_bounce);
        assert_eq!(state.player.score, 100);

        // Player drops back onto the flattened walker: no damage while it despawns
        let despawn = state.settings.stomp_despawn_ticks as usize;
        let events = run(&mut state, std::iter::repeat_n(TickInput::default(), despawn));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PlayerDamaged { .. })));
        assert!(!events.contains(&GameEvent::LifeLost));
        assert_eq!(state.player.lives, 3);
        assert!(state.roster.enemies.is_empty());
    }

    #[test]
    fn test_walking_into_walker_costs_life_when_small() {
        let mut state = state_from(
            &[
                "....................",
                "....................",
                ".P....g.............",
                "####################",
            ],
            Settings::default(),
        );
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let events = run(&mut state, std::iter::repeat_n(right, 60));
        assert!(events.contains(&GameEvent::LifeLost));
        assert!(events.contains(&GameEvent::LevelRestarted));
        assert_eq!(state.player.lives, 2);
    }

    #[test]
    fn test_fall_into_pit_restarts() {
        let mut state = state_from(&["..P.", "....", "#..#"], Settings::default());
        let events = run(&mut state, std::iter::repeat_n(TickInput::default(), 20));
        assert!(events.contains(&GameEvent::LifeLost));
        assert!(events.contains(&GameEvent::LevelRestarted));
        assert_eq!(state.player.lives, 2);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_game_over_freezes_simulation() {
        let settings = Settings {
            starting_lives: 1,
            ..Default::default()
        };
        let mut state = state_from(&["..P.", "....", "#..#"], settings);
        let events = run(&mut state, std::iter::repeat_n(TickInput::default(), 60));
        assert!(events.contains(&GameEvent::GameOver));
        assert_eq!(state.phase, GamePhase::GameOver);

        let frozen = state.player.body.pos;
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default());
        assert!(state.events.is_empty());
        assert_eq!(state.player.body.pos, frozen);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_time_up_costs_life() {
        let settings = Settings {
            level_time: 2,
            ..Default::default()
        };
        let mut state = state_from(&["....", ".P..", "####"], settings);
        let limit = 2 * TICKS_PER_TIME_UNIT as usize;
        let events = run(&mut state, std::iter::repeat_n(TickInput::default(), limit - 1));
        assert!(!events.contains(&GameEvent::LifeLost));

        tick(&mut state, &TickInput::default());
        assert!(state.events.contains(&GameEvent::LifeLost));
        assert_eq!(state.player.lives, 2);
        assert_eq!(state.time_left, 2);
    }

    #[test]
    fn test_reaching_flag_finishes_level() {
        let mut state = state_from(&["......", "..P|..", "######"], Settings::default());
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let events = run(&mut state, std::iter::repeat_n(right, 120));

        assert_eq!(
            events
                .iter()
                .filter(|e| **e == GameEvent::LevelFinished)
                .count(),
            1
        );
        assert!(state.player.finished);
        assert!(state.player.finish_ticks > 0);
        assert_eq!(state.phase, GamePhase::LevelClear);

        // Player and clock are frozen from here on
        let pos = state.player.body.pos;
        let time_left = state.time_left;
        run(&mut state, std::iter::repeat_n(right, 60));
        assert_eq!(state.player.body.pos, pos);
        assert_eq!(state.time_left, time_left);
    }

    #[test]
    fn test_scripted_run_makes_progress() {
        let mut state = first_stage();
        let start = state.player.body.pos.x;
        let script = InputScript::hold_right_and_hop(600, 45);

        // Furthest point reached on the first life
        let mut furthest = start;
        for input in script.iter() {
            tick(&mut state, input);
            if state.events.contains(&GameEvent::LifeLost) {
                break;
            }
            furthest = furthest.max(state.player.body.pos.x);
        }
        assert!(furthest > start + 10.0 * T, "only reached x={furthest}");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn identical_inputs_give_identical_runs(seed in any::<u64>()) {
            let script = InputScript::random(seed, 300);
            let mut a = first_stage();
            let mut b = first_stage();
            for input in script.iter() {
                tick(&mut a, input);
                tick(&mut b, input);
            }

            prop_assert_eq!(a.player.body.pos, b.player.body.pos);
            prop_assert_eq!(a.player.score, b.player.score);
            prop_assert_eq!(a.grid(), b.grid());
            let view_a = serde_json::to_string(&a.view()).unwrap();
            let view_b = serde_json::to_string(&b.view()).unwrap();
            prop_assert_eq!(view_a, view_b);
        }
    }
}
