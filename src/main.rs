//! Space Rogues headless driver
//!
//! Runs a scripted autopilot through the simulation and prints the final
//! frame as JSON. Usage: `space-rogues [settings.json] [max_ticks]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::PathBuf;

    use space_rogues::Session;
    use space_rogues::settings::Settings;
    use space_rogues::sim::GameEvent;

    env_logger::init();
    log::info!("Space Rogues (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("settings.json"));
    let max_ticks: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 60 * 10);

    let settings = Settings::load(&settings_path);
    let mut session = Session::from_settings(&settings);

    let mut kills = 0usize;
    let mut levels = 0usize;
    for _ in 0..max_ticks {
        let input = autopilot::input(&session.state);
        for event in session.advance(&input) {
            match event {
                GameEvent::ShipRemoved {
                    cause: space_rogues::sim::RemovalCause::Killed,
                    ..
                } => kills += 1,
                GameEvent::LevelCleared { .. } => levels += 1,
                _ => {}
            }
        }
        if session.is_over() {
            break;
        }
    }

    log::info!(
        "Run finished: score {}, level {}, {} kills, {} levels cleared",
        session.state.score,
        session.state.level,
        kills,
        levels
    );
    if let Some(rank) = session.last_rank {
        log::info!("Ranked #{} by level", rank);
    }

    match serde_json::to_string_pretty(&session.frame()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not serialize frame: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library; there is no web entry point
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use space_rogues::sim::{Faction, GamePhase, GameState, TickInput};

    /// Chase the nearest enemy's row and keep firing
    pub fn input(state: &GameState) -> TickInput {
        if state.phase == GamePhase::LevelEnd {
            return TickInput {
                confirm_reward: true,
                ..Default::default()
            };
        }
        let Some(player) = state.player_ship() else {
            return TickInput::default();
        };
        let target_y = state
            .npc_ids()
            .into_iter()
            .filter_map(|id| state.ship(id))
            .filter(|s| s.faction == Faction::Enemy && s.pos.x < player.pos.x)
            .min_by_key(|s| (s.pos.y - player.pos.y).abs())
            .map(|s| s.pos.y);

        let mut input = TickInput {
            fire_laser: target_y.is_some(),
            fire_rocket: target_y.is_some(),
            ..Default::default()
        };
        if let Some(y) = target_y {
            input.move_up = y < player.pos.y - 4;
            input.move_down = y > player.pos.y + 4;
        }
        input
    }
}
