//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (lanes, then floating ships, then the player)
//! - No rendering or platform dependencies

pub mod collision;
pub mod combat;
pub mod contact;
pub mod mask;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{projectiles_overlap, ship_hit_by, ships_overlap};
pub use contact::{Contact, ContactTracker};
pub use mask::{OpacityMask, Rect};
pub use snapshot::{Frame, snapshot};
pub use state::{
    Explosion, Faction, GameEvent, GamePhase, GameState, Projectile, RemovalCause, RewardOffer,
    Ship, ShipColor, ShipId, WeaponKind,
};
pub use tick::{TickInput, tick};
