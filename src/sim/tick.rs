//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::IVec2;
use rand::Rng;

use super::collision::{projectiles_overlap, ship_hit_by, ships_overlap};
use super::combat::{remove_npc, resolve_ramming, resolve_shot, spawn_explosion};
use super::contact::Contact;
use super::state::{
    GameEvent, GamePhase, GameState, Projectile, RemovalCause, RewardOffer, ShipId, WeaponKind,
};
use crate::bonus::{BonusSet, OwnerKind, Stat};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    /// Hold to fire lasers
    pub fire_laser: bool,
    /// Hold to fire a rocket when reloaded; wins over the laser
    pub fire_rocket: bool,
    /// Pause toggle
    pub pause: bool,
    /// Highlight a reward on the level-end screen
    pub select_reward: Option<usize>,
    /// Accept the highlighted reward and start the next level
    pub confirm_reward: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: u32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let dt = dt_ms as i32;

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.set_phase(GamePhase::Paused, &mut events);
                return events;
            }
            GamePhase::Paused => state.set_phase(GamePhase::Playing, &mut events),
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused => return events,
        GamePhase::GameOver => {
            advance_explosions(state, dt_ms);
            return events;
        }
        _ => {}
    }

    state.time_ticks += 1;
    update_entities(state, dt, dt_ms, &mut events);

    match state.phase {
        GamePhase::Starting => update_starting(state, &mut events),
        GamePhase::Playing => update_playing(state, input, dt, dt_ms, &mut events),
        GamePhase::LevelEnd => update_level_end(state, input, &mut events),
        GamePhase::Paused | GamePhase::GameOver => {}
    }

    events
}

/// Movement, weapon timers, hits and exits for everything in play
fn update_entities(state: &mut GameState, dt: i32, dt_ms: u32, events: &mut Vec<GameEvent>) {
    // --- PLAYER ---
    if let Some(id) = state.player {
        state.advance_ship(id, dt);
        check_shot(state, id, events);
    }

    // --- LANE SHIPS ---
    for lane in 0..state.lanes.len() {
        let Some(id) = state.lanes[lane] else {
            continue;
        };
        check_shot(state, id, events);
        // A rocket hit may have knocked it loose
        if state.lanes[lane] == Some(id) {
            update_npc(state, id, dt, events);
        }
    }

    // --- FLOATING SHIPS ---
    let floating: Vec<ShipId> = state.floating.iter().rev().copied().collect();
    for id in floating {
        if state.ship(id).is_none() {
            continue;
        }
        check_shot(state, id, events);
        update_npc(state, id, dt, events);
    }

    update_projectiles(state, events);
    advance_explosions(state, dt_ms);
}

/// Resolve the first projectile touching the ship, if any
fn check_shot(state: &mut GameState, id: ShipId, events: &mut Vec<GameEvent>) {
    let Some(ship) = state.ship(id) else {
        return;
    };
    let Some(idx) = state.projectiles.iter().position(|p| ship_hit_by(ship, p)) else {
        return;
    };
    let projectile = state.projectiles.remove(idx);
    resolve_shot(state, id, projectile, events);
}

/// Where an NPC at `pos` has left the arena, if it has
fn exit_cause(pos: IVec2, width: i32, height: i32) -> Option<RemovalCause> {
    if pos.x > width + SUCCESS_MARGIN {
        Some(RemovalCause::Success)
    } else if pos.x < -FLY_AWAY_MARGIN
        || pos.y < -FLY_AWAY_MARGIN
        || pos.y > height + FLY_AWAY_MARGIN
    {
        Some(RemovalCause::FlyAway)
    } else {
        None
    }
}

fn update_npc(state: &mut GameState, id: ShipId, dt: i32, events: &mut Vec<GameEvent>) {
    state.advance_ship(id, dt);
    let Some(pos) = state.ship(id).map(|s| s.pos) else {
        return;
    };
    if let Some(cause) = exit_cause(pos, state.width, state.height) {
        remove_npc(state, id, cause, events);
        return;
    }
    enemy_fire(state, id, dt);
}

/// Enemy weapon logic: lasers while the burst is on, the rocket replacing
/// one laser shot once its timer runs out
fn enemy_fire(state: &mut GameState, id: ShipId, dt: i32) {
    let Some((firing, cooldown, rocket_ready)) = state.ship(id).and_then(|s| {
        s.fire_control
            .as_ref()
            .map(|fc| (fc.laser_firing, s.weapon_cooldown_ms, fc.rocket_ready()))
    }) else {
        return;
    };
    if !firing {
        return;
    }
    if cooldown >= 0 {
        if let Some(ship) = state.ship_mut(id) {
            ship.weapon_cooldown_ms -= dt;
        }
        return;
    }

    let kind = if rocket_ready {
        WeaponKind::Rocket
    } else {
        WeaponKind::Laser
    };
    let Some(projectile) = state.ship(id).map(|s| Projectile::fire(s, kind)) else {
        return;
    };
    let level = state.level.max(1) as i32;
    let next_toggle = match kind {
        WeaponKind::Rocket => {
            let lo = 2500 / level;
            let hi = (5000 / level).max(lo + 1);
            state.rng().random_range(lo..hi)
        }
        WeaponKind::Laser => 0,
    };

    if let Some(ship) = state.ship_mut(id) {
        match kind {
            WeaponKind::Rocket => {
                if let Some(fc) = ship.fire_control.as_mut() {
                    fc.rocket_fire_in_ms = None;
                    fc.laser_firing = false;
                    fc.laser_toggle_in_ms = next_toggle;
                }
            }
            WeaponKind::Laser => ship.weapon_cooldown_ms = LASER_FIRE_INTERVAL_MS,
        }
    }
    state.projectiles.push(projectile);
}

/// Cull, move and cross-check projectiles
fn update_projectiles(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let (min_x, max_x) = (-PROJECTILE_MARGIN, state.width + PROJECTILE_MARGIN);
    state
        .projectiles
        .retain(|p| p.bounds.x >= min_x && p.bounds.x <= max_x);
    for projectile in &mut state.projectiles {
        projectile.advance();
    }

    // --- PROJECTILE COLLISIONS ---
    // Only pairs containing a rocket interact; each projectile pairs at most once
    let n = state.projectiles.len();
    let mut consumed = vec![false; n];
    let mut bursts = Vec::new();
    for i in 0..n {
        if consumed[i] {
            continue;
        }
        for j in (i + 1)..n {
            if consumed[j] {
                continue;
            }
            let pair = [&state.projectiles[i], &state.projectiles[j]];
            if pair.iter().all(|p| p.kind != WeaponKind::Rocket)
                || !projectiles_overlap(pair[0], pair[1])
            {
                continue;
            }
            let rockets: Vec<&Projectile> = pair
                .into_iter()
                .filter(|p| p.kind == WeaponKind::Rocket)
                .collect();
            let mut power = rockets.len() as f32;
            let mut center = IVec2::ZERO;
            for rocket in &rockets {
                power *= state.bonus_for(rocket.owner_faction)[Stat::RocketDamage];
                center = rocket.center();
            }
            bursts.push((center, power));
            consumed[i] = true;
            consumed[j] = true;
            break;
        }
    }

    if !bursts.is_empty() {
        let mut idx = 0;
        state.projectiles.retain(|_| {
            let keep = !consumed[idx];
            idx += 1;
            keep
        });
        for (center, power) in bursts {
            spawn_explosion(state, center, power, events);
        }
    }
}

fn advance_explosions(state: &mut GameState, dt_ms: u32) {
    for explosion in &mut state.explosions {
        explosion.advance(dt_ms);
    }
    state.explosions.retain(|e| !e.is_finished());
}

/// Player flies in from the right edge
fn update_starting(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let threshold = state.width - ENTRY_STOP_OFFSET;
    let arrived = match state.player_ship_mut() {
        Some(ship) if ship.pos.x <= threshold => {
            ship.velocity = IVec2::ZERO;
            true
        }
        _ => false,
    };
    if arrived {
        state.set_phase(GamePhase::Playing, events);
    }
}

fn update_playing(
    state: &mut GameState,
    input: &TickInput,
    dt: i32,
    dt_ms: u32,
    events: &mut Vec<GameEvent>,
) {
    // --- DEATHS ---
    if state.player_ship().is_none_or(|p| p.is_dead()) {
        game_over(state, events);
        return;
    }
    for lane in 0..state.lanes.len() {
        if let Some(id) = state.lanes[lane] {
            if state.ship(id).is_some_and(|s| s.is_dead()) {
                remove_npc(state, id, RemovalCause::Killed, events);
            }
        }
    }
    for i in (0..state.floating.len()).rev() {
        let Some(&id) = state.floating.get(i) else {
            continue;
        };
        if state.ship(id).is_some_and(|s| s.is_dead()) {
            remove_npc(state, id, RemovalCause::Killed, events);
        }
    }

    // --- SPAWNING / LEVEL END ---
    if state.level_time_ms < LEVEL_SPAWN_WINDOW_MS {
        for lane in 0..state.lanes.len() {
            if state.lanes[lane].is_some() {
                continue;
            }
            if state.lane_timers_ms[lane] <= 0 {
                if let Some(id) = state.spawn_npc(lane) {
                    if let Some(faction) = state.ship(id).map(|s| s.faction) {
                        events.push(GameEvent::ShipSpawned { id, faction, lane });
                    }
                }
            } else {
                state.lane_timers_ms[lane] -= dt;
            }
        }
    } else if state.npcs_cleared() {
        level_end(state, events);
        return;
    }
    state.level_time_ms += dt_ms;

    // --- PLAYER WEAPONS ---
    let mut fired = None;
    if let Some(player) = state.player_ship_mut() {
        player.weapon_cooldown_ms -= dt;
        if player.weapon_cooldown_ms < 0 {
            if input.fire_rocket && player.rocket_cooldown_ms <= 0 {
                fired = Some(WeaponKind::Rocket);
            } else if input.fire_laser {
                player.weapon_cooldown_ms = LASER_FIRE_INTERVAL_MS;
                fired = Some(WeaponKind::Laser);
            }
        }
    }
    if let Some(kind) = fired {
        if kind == WeaponKind::Rocket {
            let reload = (ROCKET_RELOAD_MS / state.player_bonus[Stat::RocketReloadSpeed]) as i32;
            if let Some(player) = state.player_ship_mut() {
                player.rocket_cooldown_ms = reload;
            }
        }
        if let Some(player) = state.player_ship() {
            let projectile = Projectile::fire(player, kind);
            state.projectiles.push(projectile);
        }
    }

    // --- RAMMING ---
    check_ramming(state, events);

    // --- PLAYER MOVEMENT ---
    let (width, height) = (state.width, state.height);
    if let Some(player) = state.player_ship_mut() {
        player.velocity = player_velocity(input, player.pos, width, height);
    }
}

/// Velocity from movement intents, refusing to approach an edge
pub fn player_velocity(input: &TickInput, pos: IVec2, width: i32, height: i32) -> IVec2 {
    let mut vel = IVec2::ZERO;
    if input.move_left && pos.x > PLAYER_EDGE_MARGIN {
        vel.x -= PLAYER_SPEED;
    }
    if input.move_right && pos.x + PLAYER_EDGE_MARGIN < width {
        vel.x += PLAYER_SPEED;
    }
    if input.move_up && pos.y > PLAYER_EDGE_MARGIN {
        vel.y -= PLAYER_SPEED;
    }
    if input.move_down && pos.y + PLAYER_EDGE_MARGIN < height {
        vel.y += PLAYER_SPEED;
    }
    if vel.x != 0 && vel.y != 0 {
        vel = IVec2::new(
            (vel.x as f32 * DIAGONAL_DAMPING) as i32,
            (vel.y as f32 * DIAGONAL_DAMPING) as i32,
        );
    }
    vel
}

/// Edge-triggered ramming across all ship pairs that can meet
fn check_ramming(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let Some(player) = state.player else {
        return;
    };
    for lane in 0..state.lanes.len() {
        let Some(id) = state.lanes[lane] else {
            continue;
        };
        ram_pair(state, id, player, events);
        let mut j = 0;
        while j < state.floating.len() && state.lanes[lane] == Some(id) {
            let other = state.floating[j];
            ram_pair(state, id, other, events);
            j += 1;
        }
    }

    let mut i = 0;
    while i < state.floating.len() {
        let a = state.floating[i];
        ram_pair(state, a, player, events);
        for j in (i + 1)..state.floating.len() {
            let b = state.floating[j];
            ram_pair(state, a, b, events);
        }
        i += 1;
    }
}

fn ram_pair(state: &mut GameState, a: ShipId, b: ShipId, events: &mut Vec<GameEvent>) {
    if a == b {
        return;
    }
    let overlapping = match (state.ship(a), state.ship(b)) {
        (Some(sa), Some(sb)) => ships_overlap(sa, sb),
        _ => return,
    };
    if state.contacts.check_and_latch(a, b, overlapping) == Contact::Began {
        resolve_ramming(state, a, b, events);
    }
}

/// Draw rewards and freeze the level for selection
fn level_end(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let enemy_draw = BonusSet::random(OwnerKind::Enemy, state.rng());
    match state.enemy_bonus.combine(&enemy_draw) {
        Ok(combined) => state.enemy_bonus = combined,
        Err(e) => log::warn!("Enemy reward skipped: {}", e),
    }

    let delta = state.level_score_delta();
    let choices = if delta > 0 {
        let factor = delta as f32 / REWARD_SCORE_SCALE;
        (0..2)
            .map(|_| BonusSet::random(OwnerKind::Player, state.rng()).scale(factor))
            .collect()
    } else {
        Vec::new()
    };

    if let Some(player) = state.player_ship_mut() {
        player.velocity = IVec2::new(LEVEL_END_DRIFT, 0);
    }
    log::info!(
        "Level {} cleared: score {} (+{}), {} reward choices",
        state.level,
        state.score,
        delta,
        choices.len()
    );
    state.reward = Some(RewardOffer {
        enemy_bonus: enemy_draw,
        choices,
        selected: 0,
    });
    events.push(GameEvent::LevelCleared {
        level: state.level,
        score: state.score,
    });
    state.set_phase(GamePhase::LevelEnd, events);
}

/// Reward selection and confirmation
fn update_level_end(state: &mut GameState, input: &TickInput, events: &mut Vec<GameEvent>) {
    if let (Some(i), Some(offer)) = (input.select_reward, state.reward.as_mut()) {
        if i < offer.choices.len() {
            offer.selected = i;
        }
    }
    if !input.confirm_reward {
        return;
    }

    if let Some(offer) = state.reward.take() {
        if let Some(chosen) = offer.choices.get(offer.selected) {
            match state.player_bonus.combine(chosen) {
                Ok(combined) => state.player_bonus = combined,
                Err(e) => log::warn!("Player reward skipped: {}", e),
            }
        }
    }
    state.level += 1;
    state.level_time_ms = 0;
    state.prev_level_score = state.score;
    state.reset_player_for_level();
    state.set_phase(GamePhase::Starting, events);
}

/// Destroy the player and end the run
fn game_over(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if let Some(pos) = state.player_ship().map(|p| p.pos) {
        spawn_explosion(state, pos, PLAYER_EXPLOSION_POWER, events);
    }
    if let Some(id) = state.player {
        state.remove_ship(id);
    }
    state.set_phase(GamePhase::GameOver, events);
    log::info!("Game over: score {} at level {}", state.score, state.level);
    events.push(GameEvent::GameOver {
        score: state.score,
        level: state.level,
    });
}
