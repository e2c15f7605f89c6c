//! Damage, score and knockback rules
//!
//! The pure formulas come first; the `resolve_*` functions apply them to a
//! `GameState`. All fractional results are truncated toward zero.

use glam::IVec2;

use super::state::{
    Explosion, Faction, GameEvent, GameState, Projectile, RemovalCause, ShipId, WeaponKind,
};
use crate::bonus::{BonusSet, Stat};
use crate::consts::*;

/// `base * attack / defence` with both overall multipliers applied
fn scaled_damage(
    base: f32,
    attacker: &BonusSet,
    damage_stat: Stat,
    defender: &BonusSet,
    protection_stat: Stat,
) -> f32 {
    base * attacker[damage_stat] * attacker[Stat::OverallDamage]
        / (defender[protection_stat] * defender[Stat::OverallProtection])
}

/// Laser damage dealt, or rocket explosion power
pub fn shot_damage(kind: WeaponKind, shooter: &BonusSet, target: &BonusSet) -> f32 {
    scaled_damage(
        kind.base_damage(),
        shooter,
        kind.damage_stat(),
        target,
        kind.protection_stat(),
    )
}

/// Score for landing a shot on a ship of `target` faction
pub fn shot_score(kind: WeaponKind, target: Faction, player: &BonusSet) -> i32 {
    let magnitude = (kind.base_score() * player[kind.score_stat()] * player[Stat::OverallScore]) as i32;
    target.harm_sign() * magnitude
}

/// Ramming damage taken by the defender
pub fn ramming_damage(attacker: &BonusSet, defender: &BonusSet) -> i32 {
    scaled_damage(
        RAMMING_DAMAGE,
        attacker,
        Stat::RammingDamage,
        defender,
        Stat::RammingProtection,
    ) as i32
}

/// Velocity a non-player ship receives from a collision with `other`
pub fn ramming_impulse(own_pos: IVec2, other_pos: IVec2, other_velocity: IVec2) -> IVec2 {
    (other_velocity * 4 + own_pos - other_pos) / 24
}

/// Score for a collision between ships of the two factions
pub fn ramming_score(a: Faction, b: Faction, player: &BonusSet) -> i32 {
    let unit = (RAMMING_SCORE * player[Stat::ScoreFromRamming] * player[Stat::OverallScore]) as i32;
    (a.harm_sign() + b.harm_sign()) * unit
}

/// Damage at Manhattan `distance` from an explosion's centre
pub fn explosion_damage(power: f32, distance: i32) -> i32 {
    if distance == 0 {
        EXPLOSION_POINT_BLANK_DAMAGE
    } else {
        (power * EXPLOSION_DAMAGE_SCALE / distance as f32) as i32
    }
}

/// Score for explosion damage dealt to a ship of `target` faction
pub fn explosion_score(target: Faction, damage: i32, player: &BonusSet) -> i32 {
    let capped = damage.min(EXPLOSION_POINT_BLANK_DAMAGE);
    match target {
        Faction::Enemy => (capped as f32 * 5.0 * player[Stat::ScoreFromRocketing]) as i32,
        Faction::Ally => -capped * 5,
        Faction::Player => 0,
    }
}

/// Push for a ship offset `delta` from an explosion's centre; `None` when
/// it is too far away or exactly at the centre
pub fn explosion_knockback(delta: IVec2) -> Option<IVec2> {
    if delta == IVec2::ZERO {
        return None;
    }
    // Quantize to 16 px cells
    let cells = IVec2::new(delta.x >> 4, delta.y >> 4);
    if cells.x.abs() >= 16 || cells.y.abs() >= 16 {
        return None;
    }
    let axis = |d: i32| {
        if d == 0 {
            0
        } else {
            d.signum() * (6 - (d / 3).abs())
        }
    };
    Some(IVec2::new(axis(cells.x), axis(cells.y)))
}

/// Score for an NPC leaving play
pub fn removal_score(cause: RemovalCause, faction: Faction, health: i32) -> i32 {
    // Allies are rewarded for reaching the goal, enemies for being stopped
    let ally_sign = match faction {
        Faction::Ally => 1,
        Faction::Enemy => -1,
        Faction::Player => 0,
    };
    match cause {
        RemovalCause::Success => {
            ally_sign * (SUCCESS_BASE_SCORE + SUCCESS_HEALTH_SCORE * health)
        }
        RemovalCause::FlyAway => {
            -ally_sign * (FLY_AWAY_BASE_SCORE - FLY_AWAY_HEALTH_SCORE * health)
        }
        RemovalCause::Killed => -ally_sign * KILL_SCORE,
    }
}

/// Apply a projectile hit on `target`; the projectile is consumed
pub fn resolve_shot(
    state: &mut GameState,
    target: ShipId,
    projectile: Projectile,
    events: &mut Vec<GameEvent>,
) {
    let Some((faction, pos)) = state.ship(target).map(|s| (s.faction, s.pos)) else {
        return;
    };
    let damage = shot_damage(
        projectile.kind,
        state.bonus_for(projectile.owner_faction),
        state.bonus_for(faction),
    );
    if faction != Faction::Player {
        state.score += shot_score(projectile.kind, faction, &state.player_bonus);
    }
    match projectile.kind {
        WeaponKind::Laser => {
            if let Some(ship) = state.ship_mut(target) {
                ship.health -= damage as i32;
            }
        }
        WeaponKind::Rocket => spawn_explosion(state, pos, damage, events),
    }
    events.push(GameEvent::ShotHit {
        target,
        kind: projectile.kind,
        damage,
    });
}

/// Apply a first-contact collision between two ships
pub fn resolve_ramming(state: &mut GameState, a: ShipId, b: ShipId, events: &mut Vec<GameEvent>) {
    let (Some(sa), Some(sb)) = (state.ship(a), state.ship(b)) else {
        return;
    };
    let (fa, pa, va) = (sa.faction, sa.pos, sa.velocity);
    let (fb, pb, vb) = (sb.faction, sb.pos, sb.velocity);

    let damage_to_a = ramming_damage(state.bonus_for(fb), state.bonus_for(fa));
    let damage_to_b = ramming_damage(state.bonus_for(fa), state.bonus_for(fb));
    state.score += ramming_score(fa, fb, &state.player_bonus);

    for (id, faction, impulse, damage) in [
        (a, fa, ramming_impulse(pa, pb, vb), damage_to_a),
        (b, fb, ramming_impulse(pb, pa, va), damage_to_b),
    ] {
        if let Some(ship) = state.ship_mut(id) {
            ship.health -= damage;
            if faction != Faction::Player {
                ship.velocity = impulse;
                ship.is_floating = true;
            }
        }
        if faction != Faction::Player {
            state.detach_from_lane(id);
        }
    }
    log::debug!("Ramming {:?} x {:?}", fa, fb);
    events.push(GameEvent::Rammed { a, b });
}

/// Apply explosion damage, score and knockback to one ship
pub fn resolve_explosion(state: &mut GameState, explosion: &Explosion, target: ShipId) {
    let Some(ship) = state.ship(target) else {
        return;
    };
    let faction = ship.faction;
    let delta = ship.visual_bounds().center() - explosion.center();
    let distance = delta.x.abs() + delta.y.abs();
    let damage = explosion_damage(explosion.power, distance);
    state.score += explosion_score(faction, damage, &state.player_bonus);

    let knock = if faction == Faction::Player {
        None
    } else {
        explosion_knockback(delta)
    };
    if let Some(ship) = state.ship_mut(target) {
        ship.health -= damage;
        if let Some(kick) = knock {
            ship.velocity += kick;
        }
    }
    if knock.is_some() {
        state.detach_from_lane(target);
    }
}

/// Create an explosion and apply it once to every ship it touches
pub fn spawn_explosion(
    state: &mut GameState,
    center: IVec2,
    power: f32,
    events: &mut Vec<GameEvent>,
) {
    let explosion = Explosion::new(center, power);
    // Targets are fixed before knockback moves ships between pools
    let targets: Vec<ShipId> = state
        .npc_ids()
        .into_iter()
        .chain(state.player)
        .filter(|&id| {
            state
                .ship(id)
                .is_some_and(|s| s.bounds().intersects(&explosion.bounds))
        })
        .collect();
    for id in targets {
        resolve_explosion(state, &explosion, id);
    }
    events.push(GameEvent::ExplosionSpawned { center, power });
    state.explosions.push(explosion);
}

/// Remove an NPC and apply its exit score; kills also explode
pub fn remove_npc(
    state: &mut GameState,
    id: ShipId,
    cause: RemovalCause,
    events: &mut Vec<GameEvent>,
) {
    let Some(ship) = state.remove_ship(id) else {
        return;
    };
    state.score += removal_score(cause, ship.faction, ship.health);
    log::debug!("{:?} removed: {:?} (score {})", ship.faction, cause, state.score);
    events.push(GameEvent::ShipRemoved {
        id,
        faction: ship.faction,
        cause,
    });
    if cause == RemovalCause::Killed {
        spawn_explosion(state, ship.pos, KILL_EXPLOSION_POWER, events);
    }
}
