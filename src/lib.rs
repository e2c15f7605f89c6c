//! Space Rogues - side-scrolling arcade space combat
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ships, projectiles, collisions, level flow)
//! - `bonus`: Multiplicative stat-modifier sets
//! - `highscores`: Ranked ledger with checksummed persistence
//! - `settings`: Runtime configuration and player name storage
//! - `session`: Driver that runs the simulation and records results

pub mod bonus;
pub mod error;
pub mod highscores;
pub mod session;
pub mod settings;
pub mod sim;

pub use bonus::{BonusSet, OwnerKind, Stat};
pub use error::{BonusError, LedgerError};
pub use highscores::HighScores;
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (~60 Hz)
    pub const TICK_MS: u32 = 16;

    /// Default play area
    pub const ARENA_WIDTH: i32 = 1280;
    pub const ARENA_HEIGHT: i32 = 720;

    /// Ship hull side length (sprite and opacity mask are square)
    pub const HULL_SIZE: i32 = 96;
    pub const MAX_HEALTH: i32 = 100;

    /// Player movement
    pub const PLAYER_SPEED: i32 = 5;
    pub const DIAGONAL_DAMPING: f32 = 0.75;
    /// Player keeps this far from every edge
    pub const PLAYER_EDGE_MARGIN: i32 = 48;

    /// Laser weapon
    pub const LASER_DAMAGE: f32 = 10.0;
    pub const LASER_FIRE_INTERVAL_MS: i32 = 100;
    pub const LASER_SPEED: i32 = 16;
    pub const LASER_SIZE: (i32, i32) = (10, 4);
    pub const LASER_SCORE: f32 = 100.0;

    /// Rocket weapon
    pub const ROCKET_POWER: f32 = 1.0;
    pub const ROCKET_SPEED: i32 = 8;
    pub const ROCKET_SIZE: (i32, i32) = (24, 12);
    pub const ROCKET_SCORE: f32 = 500.0;
    pub const ROCKET_RELOAD_MS: f32 = 30_000.0;

    /// Projectiles spawn this far ahead of the shooter
    pub const MUZZLE_OFFSET: i32 = 48;
    /// Projectiles are dropped this far past the side edges
    pub const PROJECTILE_MARGIN: i32 = 10;

    /// Ramming
    pub const RAMMING_DAMAGE: f32 = 10.0;
    pub const RAMMING_SCORE: f32 = 500.0;

    /// Explosions
    pub const EXPLOSION_HALF_EXTENT: f32 = 128.0;
    pub const EXPLOSION_DAMAGE_SCALE: f32 = 2000.0;
    pub const EXPLOSION_POINT_BLANK_DAMAGE: i32 = 100;
    pub const EXPLOSION_FRAMES: u32 = 17;
    pub const EXPLOSION_HOLD_MS: u32 = 300;
    pub const KILL_EXPLOSION_POWER: f32 = 1.5;
    pub const PLAYER_EXPLOSION_POWER: f32 = 1.0;

    /// Exit and kill scoring
    pub const KILL_SCORE: i32 = 1500;
    pub const SUCCESS_BASE_SCORE: i32 = 1000;
    pub const SUCCESS_HEALTH_SCORE: i32 = 10;
    pub const FLY_AWAY_BASE_SCORE: i32 = 500;
    pub const FLY_AWAY_HEALTH_SCORE: i32 = 5;
    /// NPC passing `width + SUCCESS_MARGIN` reached its goal
    pub const SUCCESS_MARGIN: i32 = 50;
    /// NPC this far outside the other edges flew away
    pub const FLY_AWAY_MARGIN: i32 = 200;

    /// Lanes
    pub const LANE_SPACING: i32 = 100;
    pub const LANE_TOP: i32 = 100;
    pub const LANE_RESERVED_HEIGHT: i32 = 150;
    pub const NPC_SPAWN_X: i32 = -48;

    /// Level flow
    pub const LEVEL_SPAWN_WINDOW_MS: u32 = 60_000;
    /// Player entry ends once it is this far from the right edge
    pub const ENTRY_STOP_OFFSET: i32 = 96;
    pub const LEVEL_END_DRIFT: i32 = -3;
    /// Score delta that maps to a full-strength player reward
    pub const REWARD_SCORE_SCALE: f32 = 50_000.0;
}

