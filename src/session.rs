//! Outer driver for a run
//!
//! Owns the simulation together with the high score ledger and reacts to
//! the events each tick reports.

use std::path::PathBuf;

use crate::consts::TICK_MS;
use crate::highscores::HighScores;
use crate::settings::Settings;
use crate::sim::{Frame, GameEvent, GameState, TickInput, snapshot, tick};

pub struct Session {
    pub state: GameState,
    pub highscores: HighScores,
    pub player_name: String,
    /// Where the ledger is saved after each finished run
    ledger_path: Option<PathBuf>,
    /// Position of the last recorded run in the by-level view
    pub last_rank: Option<usize>,
}

impl Session {
    /// In-memory session; nothing touches the disk
    pub fn new(state: GameState, player_name: impl Into<String>) -> Self {
        Self {
            state,
            highscores: HighScores::new(),
            player_name: player_name.into(),
            ledger_path: None,
            last_rank: None,
        }
    }

    /// Session configured from settings, loading the ledger and player name
    pub fn from_settings(settings: &Settings) -> Self {
        let seed = settings.run_seed();
        log::info!("Starting run with seed {}", seed);
        let state = GameState::with_arena(seed, settings.arena_width, settings.arena_height);
        let highscores = match HighScores::load(&settings.highscore_path) {
            Ok(scores) => scores,
            Err(e) => {
                log::warn!("Could not load high scores: {}", e);
                HighScores::new()
            }
        };
        Self {
            state,
            highscores,
            player_name: crate::settings::load_player_name(&settings.player_name_path),
            ledger_path: Some(settings.highscore_path.clone()),
            last_rank: None,
        }
    }

    /// Run one fixed tick and handle its events
    pub fn advance(&mut self, input: &TickInput) -> Vec<GameEvent> {
        let events = tick(&mut self.state, input, TICK_MS);
        for event in &events {
            if let GameEvent::GameOver { score, level } = *event {
                self.record(score, level);
            }
        }
        events
    }

    fn record(&mut self, score: i32, level: u32) {
        self.last_rank = self.highscores.add(&self.player_name, score, level);
        if let Some(path) = &self.ledger_path {
            if let Err(e) = self.highscores.save(path) {
                log::warn!("Could not save high scores: {}", e);
            }
        }
    }

    pub fn frame(&self) -> Frame {
        snapshot(&self.state)
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == crate::sim::GamePhase::GameOver
    }
}
