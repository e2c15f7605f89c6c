//! Read-only view of a `GameState` for presentation
//!
//! Taken between ticks; nothing here mutates the simulation.

use serde::Serialize;

use super::mask::Rect;
use super::state::{Faction, GamePhase, GameState, RewardOffer, WeaponKind};

/// A ship as it should be drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipView {
    pub faction: Faction,
    /// Rectangle covered by the sprite
    pub bounds: Rect,
    pub rotation: f32,
    /// Hull color darkened by damage
    pub color: [u8; 3],
    /// Draw opacity; ships in play are fully opaque
    pub opacity: f32,
    pub health: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub kind: WeaponKind,
    pub bounds: Rect,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplosionView {
    pub bounds: Rect,
    pub frame: u32,
}

/// Heads-up display values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub score: i32,
    pub level: u32,
    /// Never below zero
    pub health: i32,
    /// Zero when a rocket is ready
    pub rocket_cooldown_ms: i32,
    pub phase: GamePhase,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub ships: Vec<ShipView>,
    pub projectiles: Vec<ProjectileView>,
    pub explosions: Vec<ExplosionView>,
    pub hud: Hud,
    pub reward: Option<RewardOffer>,
}

/// Capture drawables in draw order: NPCs, player, projectiles, explosions
pub fn snapshot(state: &GameState) -> Frame {
    let ships = state
        .npc_ids()
        .into_iter()
        .chain(state.player)
        .filter_map(|id| state.ship(id))
        .map(|ship| ShipView {
            faction: ship.faction,
            bounds: ship.visual_bounds(),
            rotation: ship.faction.rotation(),
            color: ship.tinted_color(),
            opacity: 1.0,
            health: ship.display_health(),
        })
        .collect();

    let projectiles = state
        .projectiles
        .iter()
        .map(|p| ProjectileView {
            kind: p.kind,
            bounds: p.bounds,
            color: p.color,
        })
        .collect();

    let explosions = state
        .explosions
        .iter()
        .map(|e| ExplosionView {
            bounds: e.bounds,
            frame: e.frame,
        })
        .collect();

    let player = state.player_ship();
    let hud = Hud {
        score: state.score,
        level: state.level,
        health: player.map_or(0, |p| p.display_health()),
        rocket_cooldown_ms: player.map_or(0, |p| p.rocket_cooldown_ms.max(0)),
        phase: state.phase,
    };

    Frame {
        ships,
        projectiles,
        explosions,
        hud,
        reward: state.reward.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_snapshot_orders_player_last() {
        let mut state = GameState::new(2);
        state.spawn_npc(0);
        state.spawn_npc(3);
        let frame = snapshot(&state);
        assert_eq!(frame.ships.len(), 3);
        let last = frame.ships.last().unwrap();
        assert_eq!(last.faction, Faction::Player);
        assert_eq!(last.rotation, -FRAC_PI_2);
        assert!(frame.ships[..2].iter().all(|s| s.rotation == FRAC_PI_2));
        assert!(frame.ships.iter().all(|s| s.opacity == 1.0));
    }

    #[test]
    fn test_hud_clamps_health() {
        let mut state = GameState::new(2);
        state.player_ship_mut().unwrap().health = -30;
        state.player_ship_mut().unwrap().rocket_cooldown_ms = -4;
        let frame = snapshot(&state);
        assert_eq!(frame.hud.health, 0);
        assert_eq!(frame.hud.rocket_cooldown_ms, 0);
        assert_eq!(frame.ships[0].color, [0, 0, 0]);
    }

    #[test]
    fn test_frame_serializes() {
        let state = GameState::new(8);
        let json = serde_json::to_string(&snapshot(&state)).unwrap();
        assert!(json.contains("\"hud\""));
        assert!(json.contains("\"Starting\""));
    }
}
