//! Game state and core simulation types
//!
//! `GameState` owns every entity of a run. Ships live in a generational
//! slot map; lanes and the floating pool refer to them by `ShipId`, so a
//! freed slot can never be dereferenced through a stale handle.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use super::contact::ContactTracker;
use super::mask::{OpacityMask, Rect};
use crate::bonus::{BonusSet, OwnerKind, Stat};
use crate::consts::*;

new_key_type! {
    /// Stable, generation-checked ship handle
    pub struct ShipId;
}

/// Allegiance of a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Ally,
    Enemy,
}

impl Faction {
    /// Which bonus pool applies to ships of this faction
    pub fn bonus_owner(self) -> OwnerKind {
        match self {
            Faction::Enemy => OwnerKind::Enemy,
            Faction::Player | Faction::Ally => OwnerKind::Player,
        }
    }

    /// Horizontal direction projectiles travel when fired by this faction
    pub fn fire_direction(self) -> i32 {
        match self {
            Faction::Enemy => 1,
            Faction::Player | Faction::Ally => -1,
        }
    }

    /// Sign of the score change when a ship of this faction is harmed
    pub fn harm_sign(self) -> i32 {
        match self {
            Faction::Enemy => 1,
            Faction::Ally => -1,
            Faction::Player => 0,
        }
    }

    /// Sprite rotation (sprites are authored nose-up)
    pub fn rotation(self) -> f32 {
        match self {
            Faction::Player => -std::f32::consts::FRAC_PI_2,
            Faction::Ally | Faction::Enemy => std::f32::consts::FRAC_PI_2,
        }
    }
}

/// Hull colors; an NPC sharing the player's color is an ally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipColor {
    Red,
    Blue,
    Green,
    Yellow,
    White,
}

impl ShipColor {
    pub const ALL: [ShipColor; 5] = [
        ShipColor::Red,
        ShipColor::Blue,
        ShipColor::Green,
        ShipColor::Yellow,
        ShipColor::White,
    ];

    pub fn rgb(self) -> [u8; 3] {
        match self {
            ShipColor::Red => [255, 0, 0],
            ShipColor::Blue => [0, 0, 255],
            ShipColor::Green => [0, 128, 0],
            ShipColor::Yellow => [255, 255, 0],
            ShipColor::White => [255, 255, 255],
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Laser bolt color
pub const LASER_COLOR: [u8; 3] = [255, 99, 71];

/// Weapon types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Laser,
    Rocket,
}

impl WeaponKind {
    pub fn damage_stat(self) -> Stat {
        match self {
            WeaponKind::Laser => Stat::LaserDamage,
            WeaponKind::Rocket => Stat::RocketDamage,
        }
    }

    pub fn protection_stat(self) -> Stat {
        match self {
            WeaponKind::Laser => Stat::LaserProtection,
            WeaponKind::Rocket => Stat::RocketProtection,
        }
    }

    pub fn score_stat(self) -> Stat {
        match self {
            WeaponKind::Laser => Stat::ScoreFromLasering,
            WeaponKind::Rocket => Stat::ScoreFromRocketing,
        }
    }

    /// Laser damage, or rocket explosion power
    pub fn base_damage(self) -> f32 {
        match self {
            WeaponKind::Laser => LASER_DAMAGE,
            WeaponKind::Rocket => ROCKET_POWER,
        }
    }

    pub fn base_score(self) -> f32 {
        match self {
            WeaponKind::Laser => LASER_SCORE,
            WeaponKind::Rocket => ROCKET_SCORE,
        }
    }
}

/// Enemy firing pattern: laser bursts toggled on a timer, plus one rocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireControl {
    pub laser_firing: bool,
    pub laser_toggle_in_ms: i32,
    /// `None` once the rocket has been fired
    pub rocket_fire_in_ms: Option<i32>,
}

impl FireControl {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            laser_firing: false,
            laser_toggle_in_ms: rng.random_range(500..3000),
            rocket_fire_in_ms: Some(rng.random_range(500..5000)),
        }
    }

    pub fn rocket_ready(&self) -> bool {
        self.rocket_fire_in_ms.is_some_and(|t| t <= 0)
    }

    fn advance<R: Rng + ?Sized>(&mut self, dt_ms: i32, rng: &mut R) {
        if self.laser_toggle_in_ms > 0 {
            self.laser_toggle_in_ms -= dt_ms;
        } else {
            self.laser_toggle_in_ms = rng.random_range(500..3000);
            self.laser_firing = !self.laser_firing;
        }
        if let Some(t) = self.rocket_fire_in_ms.as_mut() {
            *t -= dt_ms;
        }
    }
}

/// A ship of any faction
#[derive(Debug, Clone)]
pub struct Ship {
    pub id: ShipId,
    pub faction: Faction,
    pub color: ShipColor,
    /// May go negative transiently; death is checked at phase evaluation
    pub health: i32,
    /// Anchor of the full bounds and centre of the rendered sprite
    pub pos: IVec2,
    pub velocity: IVec2,
    mask: OpacityMask,
    pub weapon_cooldown_ms: i32,
    /// Player only
    pub rocket_cooldown_ms: i32,
    /// Enemy only
    pub fire_control: Option<FireControl>,
    /// Knocked out of its lane slot
    pub is_floating: bool,
}

impl Ship {
    /// Build a ship from a left-facing hull template; NPC hulls are
    /// mirrored once here since they fly toward +x
    pub fn new(
        id: ShipId,
        faction: Faction,
        color: ShipColor,
        pos: IVec2,
        velocity: IVec2,
        hull: &OpacityMask,
    ) -> Self {
        let mask = match faction {
            Faction::Player => hull.clone(),
            Faction::Ally | Faction::Enemy => hull.mirrored(),
        };
        Self {
            id,
            faction,
            color,
            health: MAX_HEALTH,
            pos,
            velocity,
            mask,
            weapon_cooldown_ms: LASER_FIRE_INTERVAL_MS,
            rocket_cooldown_ms: 0,
            fire_control: None,
            is_floating: false,
        }
    }

    pub fn mask(&self) -> &OpacityMask {
        &self.mask
    }

    /// Full bounds, anchored at `pos`; used for ship-vs-ship and explosions
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.mask.width(), self.mask.height())
    }

    /// Rectangle covered by the rendered sprite
    pub fn visual_bounds(&self) -> Rect {
        Rect::centered(self.pos, self.mask.width(), self.mask.height())
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Health for display; never below zero
    pub fn display_health(&self) -> i32 {
        self.health.clamp(0, MAX_HEALTH)
    }

    /// Base color scaled linearly by remaining health
    pub fn tinted_color(&self) -> [u8; 3] {
        let f = self.display_health() as f32 / MAX_HEALTH as f32;
        self.color.rgb().map(|c| (c as f32 * f) as u8)
    }

    /// Move by velocity and run weapon timers
    pub fn advance<R: Rng + ?Sized>(&mut self, dt_ms: i32, rng: &mut R) {
        if self.faction == Faction::Player && self.rocket_cooldown_ms > 0 {
            self.rocket_cooldown_ms -= dt_ms;
        }
        if let Some(fc) = self.fire_control.as_mut() {
            fc.advance(dt_ms, rng);
        }
        self.pos += self.velocity;
    }
}

/// A laser bolt or rocket in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Firing ship; may no longer exist
    #[serde(skip)]
    pub owner: ShipId,
    pub owner_faction: Faction,
    pub kind: WeaponKind,
    pub bounds: Rect,
    /// Horizontal speed (px/tick)
    pub velocity: i32,
    pub color: [u8; 3],
}

impl Projectile {
    /// Fire `kind` from `ship`
    pub fn fire(ship: &Ship, kind: WeaponKind) -> Self {
        let dir = ship.faction.fire_direction();
        let x = ship.pos.x + dir * MUZZLE_OFFSET;
        let (bounds, velocity, color) = match kind {
            WeaponKind::Laser => {
                let (w, h) = LASER_SIZE;
                (
                    Rect::new(x, ship.pos.y - h / 2, w, h),
                    dir * LASER_SPEED,
                    LASER_COLOR,
                )
            }
            WeaponKind::Rocket => {
                let (w, h) = ROCKET_SIZE;
                (
                    Rect::new(x, ship.pos.y - h / 2, w, h),
                    dir * ROCKET_SPEED,
                    ship.color.rgb(),
                )
            }
        };
        Self {
            owner: ship.id,
            owner_faction: ship.faction,
            kind,
            bounds,
            velocity,
            color,
        }
    }

    pub fn center(&self) -> IVec2 {
        self.bounds.center()
    }

    pub fn advance(&mut self) {
        self.bounds.offset(IVec2::new(self.velocity, 0));
    }
}

/// Area damage burst with a short animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub bounds: Rect,
    pub power: f32,
    /// Animation frame, starting at 1
    pub frame: u32,
    age_ms: u32,
}

impl Explosion {
    pub fn new(center: IVec2, power: f32) -> Self {
        let half = (EXPLOSION_HALF_EXTENT * power) as i32;
        let side = (2.0 * EXPLOSION_HALF_EXTENT * power) as i32;
        Self {
            bounds: Rect::new(center.x - half, center.y - half, side, side),
            power,
            frame: 1,
            age_ms: 0,
        }
    }

    pub fn center(&self) -> IVec2 {
        self.bounds.center()
    }

    /// First frame holds, then one frame per tick
    pub fn advance(&mut self, dt_ms: u32) {
        self.age_ms += dt_ms;
        if self.age_ms >= EXPLOSION_HOLD_MS {
            self.frame += 1;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.frame > EXPLOSION_FRAMES
    }
}

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Player flies in from the right edge
    Starting,
    /// Active combat
    Playing,
    /// Reward selection
    LevelEnd,
    /// Simulation frozen
    Paused,
    /// Run ended
    GameOver,
}

/// Why an NPC left play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Health reached zero
    Killed,
    /// Crossed the right edge
    Success,
    /// Left through any other edge
    FlyAway,
}

/// Rewards presented at the end of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardOffer {
    /// Already applied to the enemy pool
    pub enemy_bonus: BonusSet,
    /// Player picks exactly one (empty when the level gained no score)
    pub choices: Vec<BonusSet>,
    pub selected: usize,
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    ShipSpawned { id: ShipId, faction: Faction, lane: usize },
    ShotHit { target: ShipId, kind: WeaponKind, damage: f32 },
    Rammed { a: ShipId, b: ShipId },
    ExplosionSpawned { center: IVec2, power: f32 },
    ShipRemoved { id: ShipId, faction: Faction, cause: RemovalCause },
    LevelCleared { level: u32, score: i32 },
    GameOver { score: i32, level: u32 },
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub width: i32,
    pub height: i32,
    pub level: u32,
    pub score: i32,
    /// Score when the current level started
    pub prev_level_score: i32,
    pub phase: GamePhase,
    /// Elapsed `Playing` time in this level
    pub level_time_ms: u32,
    pub time_ticks: u64,
    pub ships: SlotMap<ShipId, Ship>,
    pub player: Option<ShipId>,
    pub player_color: ShipColor,
    /// One NPC slot per lane
    pub lanes: Vec<Option<ShipId>>,
    /// Per-lane spawn countdown
    pub lane_timers_ms: Vec<i32>,
    /// NPCs knocked out of their lane
    pub floating: Vec<ShipId>,
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub contacts: ContactTracker,
    pub player_bonus: BonusSet,
    /// Shared by all enemies; accumulates across levels
    pub enemy_bonus: BonusSet,
    pub reward: Option<RewardOffer>,
    hulls: Vec<OpacityMask>,
}

impl GameState {
    /// New run on the default arena
    pub fn new(seed: u64) -> Self {
        Self::with_arena(seed, ARENA_WIDTH, ARENA_HEIGHT)
    }

    pub fn with_arena(seed: u64, width: i32, height: i32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let player_color = ShipColor::random(&mut rng);
        let player_bonus = BonusSet::random(OwnerKind::Player, &mut rng);

        let lane_count = ((height - LANE_RESERVED_HEIGHT) / LANE_SPACING).max(0) as usize;
        let lane_timers_ms = (0..lane_count)
            .map(|_| rng.random_range(500..5000))
            .collect();

        let mut state = Self {
            seed,
            rng,
            width,
            height,
            level: 1,
            score: 0,
            prev_level_score: 0,
            phase: GamePhase::Starting,
            level_time_ms: 0,
            time_ticks: 0,
            ships: SlotMap::with_key(),
            player: None,
            player_color,
            lanes: vec![None; lane_count],
            lane_timers_ms,
            floating: Vec::new(),
            projectiles: Vec::new(),
            explosions: Vec::new(),
            contacts: ContactTracker::new(),
            player_bonus,
            enemy_bonus: BonusSet::identity(OwnerKind::Enemy),
            reward: None,
            hulls: vec![OpacityMask::default()],
        };
        state.spawn_player();
        state
    }

    /// Replace the hull catalog (left-facing templates); the player keeps
    /// its current hull until respawned
    pub fn set_hulls(&mut self, hulls: Vec<OpacityMask>) {
        if !hulls.is_empty() {
            self.hulls = hulls;
        }
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(id)
    }

    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.get_mut(id)
    }

    /// Move a ship and run its timers
    pub fn advance_ship(&mut self, id: ShipId, dt_ms: i32) {
        if let Some(ship) = self.ships.get_mut(id) {
            ship.advance(dt_ms, &mut self.rng);
        }
    }

    pub fn player_ship(&self) -> Option<&Ship> {
        self.player.and_then(|id| self.ships.get(id))
    }

    pub fn player_ship_mut(&mut self) -> Option<&mut Ship> {
        self.player.and_then(|id| self.ships.get_mut(id))
    }

    /// Bonus pool for a faction
    pub fn bonus_for(&self, faction: Faction) -> &BonusSet {
        match faction.bonus_owner() {
            OwnerKind::Player => &self.player_bonus,
            OwnerKind::Enemy => &self.enemy_bonus,
        }
    }

    /// Player entry position, just past the right edge
    pub fn player_entry(&self) -> IVec2 {
        IVec2::new(self.width + HULL_SIZE / 2, self.height / 2)
    }

    fn spawn_player(&mut self) {
        let pos = self.player_entry();
        let color = self.player_color;
        let hull = self.hulls[0].clone();
        let id = self.ships.insert_with_key(|id| {
            Ship::new(id, Faction::Player, color, pos, IVec2::new(-1, 0), &hull)
        });
        self.player = Some(id);
    }

    pub fn lane_y(lane: usize) -> i32 {
        LANE_TOP + LANE_SPACING * lane as i32
    }

    /// Spawn an NPC into an empty lane; allies share the player's color
    pub fn spawn_npc(&mut self, lane: usize) -> Option<ShipId> {
        if self.lanes.get(lane).is_none_or(|slot| slot.is_some()) {
            return None;
        }
        let color = ShipColor::random(&mut self.rng);
        let faction = if color == self.player_color {
            Faction::Ally
        } else {
            Faction::Enemy
        };
        let min_speed = ((self.level / 2) as i32).clamp(2, 4);
        let speed = self.rng.random_range(min_speed..6);
        let hull_idx = self.rng.random_range(0..self.hulls.len());
        let hull = self.hulls[hull_idx].clone();
        let fire_control = (faction == Faction::Enemy).then(|| FireControl::new(&mut self.rng));

        let pos = IVec2::new(NPC_SPAWN_X, Self::lane_y(lane));
        let id = self.ships.insert_with_key(|id| {
            let mut ship = Ship::new(id, faction, color, pos, IVec2::new(speed, 0), &hull);
            ship.fire_control = fire_control;
            ship
        });
        self.lanes[lane] = Some(id);
        self.lane_timers_ms[lane] = self.rng.random_range(1000..30000) / self.level.max(1) as i32;
        log::debug!("Spawned {:?} in lane {} at speed {}", faction, lane, speed);
        Some(id)
    }

    /// Countdown after a lane ship is removed or knocked loose
    fn lane_refill_delay(&mut self) -> i32 {
        let level = self.level.max(1) as i32;
        let lo = 1000 / level;
        let hi = (30000 / level).max(lo + 1);
        self.rng.random_range(lo..hi)
    }

    pub fn lane_of(&self, id: ShipId) -> Option<usize> {
        self.lanes.iter().position(|slot| *slot == Some(id))
    }

    /// Move a lane ship into the floating pool; no-op for other ships
    pub fn detach_from_lane(&mut self, id: ShipId) -> bool {
        let Some(lane) = self.lane_of(id) else {
            return false;
        };
        self.lanes[lane] = None;
        self.lane_timers_ms[lane] = self.lane_refill_delay();
        self.floating.push(id);
        if let Some(ship) = self.ships.get_mut(id) {
            ship.is_floating = true;
        }
        true
    }

    /// Remove a ship from every collection and drop its contact latches
    pub fn remove_ship(&mut self, id: ShipId) -> Option<Ship> {
        if let Some(lane) = self.lane_of(id) {
            self.lanes[lane] = None;
            self.lane_timers_ms[lane] = self.lane_refill_delay();
        }
        self.floating.retain(|&f| f != id);
        if self.player == Some(id) {
            self.player = None;
        }
        self.contacts.forget(id);
        self.ships.remove(id)
    }

    /// Lane ships in lane order, then floating ships
    pub fn npc_ids(&self) -> Vec<ShipId> {
        self.lanes
            .iter()
            .flatten()
            .copied()
            .chain(self.floating.iter().copied())
            .collect()
    }

    /// No NPC left in play
    pub fn npcs_cleared(&self) -> bool {
        self.floating.is_empty() && self.lanes.iter().all(Option::is_none)
    }

    /// Score gained since the level started
    pub fn level_score_delta(&self) -> i32 {
        self.score - self.prev_level_score
    }

    pub fn set_phase(&mut self, to: GamePhase, events: &mut Vec<GameEvent>) {
        if self.phase != to {
            log::info!("Phase {:?} -> {:?} (level {})", self.phase, to, self.level);
            events.push(GameEvent::PhaseChanged {
                from: self.phase,
                to,
            });
            self.phase = to;
        }
    }

    /// Put the player back at the entry point for the next level
    pub fn reset_player_for_level(&mut self) {
        let entry = self.player_entry();
        if let Some(ship) = self.player_ship_mut() {
            ship.health = MAX_HEALTH;
            ship.pos = entry;
            ship.velocity = IVec2::new(-1, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run() {
        let state = GameState::new(42);
        assert_eq!(state.phase, GamePhase::Starting);
        assert_eq!(state.level, 1);
        assert_eq!(state.lanes.len(), ((ARENA_HEIGHT - 150) / 100) as usize);
        let player = state.player_ship().unwrap();
        assert_eq!(player.pos, IVec2::new(ARENA_WIDTH + 48, ARENA_HEIGHT / 2));
        assert_eq!(player.velocity, IVec2::new(-1, 0));
        assert_eq!(state.player_bonus.kind(), OwnerKind::Player);
        assert_eq!(state.enemy_bonus, BonusSet::identity(OwnerKind::Enemy));
    }

    #[test]
    fn test_fire_control_timers() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut fc = FireControl {
            laser_firing: false,
            laser_toggle_in_ms: 10,
            rocket_fire_in_ms: Some(20),
        };
        fc.advance(16, &mut rng);
        assert!(!fc.laser_firing);
        assert_eq!(fc.laser_toggle_in_ms, -6);
        assert_eq!(fc.rocket_fire_in_ms, Some(4));
        assert!(!fc.rocket_ready());

        // Expired toggle flips the burst and draws a new delay
        fc.advance(16, &mut rng);
        assert!(fc.laser_firing);
        assert!((500..3000).contains(&fc.laser_toggle_in_ms));
        assert!(fc.rocket_ready());

        // A fired rocket never counts down again
        fc.rocket_fire_in_ms = None;
        fc.advance(16, &mut rng);
        assert_eq!(fc.rocket_fire_in_ms, None);
        assert!(!fc.rocket_ready());
    }

    #[test]
    fn test_hull_catalog_from_sprites() {
        let mut state = GameState::new(61);
        #[rustfmt::skip]
        let alpha = [
            0, 255, 0,
            255, 255, 255,
            255, 0, 255,
        ];
        let hull = OpacityMask::from_sprite(3, 3, &alpha);
        state.set_hulls(vec![hull.clone()]);
        // An empty catalog is ignored
        state.set_hulls(Vec::new());

        let id = state.spawn_npc(0).unwrap();
        let npc = state.ship(id).unwrap();
        assert_eq!(npc.mask(), &hull.mirrored());
        assert!(npc.mask().is_opaque(1, 2));
        assert_eq!(npc.bounds().w, 3);
        // The player keeps the hull it spawned with
        assert_eq!(state.player_ship().unwrap().mask().width(), HULL_SIZE);
    }

    #[test]
    fn test_spawn_npc_faction_follows_color() {
        let mut state = GameState::new(3);
        for lane in 0..state.lanes.len() {
            let id = state.spawn_npc(lane).unwrap();
            let ship = state.ship(id).unwrap();
            assert_eq!(ship.pos, IVec2::new(NPC_SPAWN_X, GameState::lane_y(lane)));
            assert_eq!(
                ship.faction == Faction::Ally,
                ship.color == state.player_color
            );
            assert_eq!(ship.fire_control.is_some(), ship.faction == Faction::Enemy);
            assert!((2..6).contains(&ship.velocity.x));
        }
        // Occupied lane refuses a second ship
        assert!(state.spawn_npc(0).is_none());
        // Out of range lane is skipped
        assert!(state.spawn_npc(99).is_none());
    }

    #[test]
    fn test_detach_and_remove() {
        let mut state = GameState::new(5);
        let id = state.spawn_npc(1).unwrap();
        assert!(state.detach_from_lane(id));
        assert_eq!(state.lanes[1], None);
        assert_eq!(state.floating, vec![id]);
        assert!(state.ship(id).unwrap().is_floating);
        assert!(!state.detach_from_lane(id));

        state.remove_ship(id);
        assert!(state.floating.is_empty());
        assert!(state.ship(id).is_none());
        assert!(state.npcs_cleared());
    }

    #[test]
    fn test_npc_mask_is_mirrored() {
        let mut state = GameState::new(9);
        let id = state.spawn_npc(0).unwrap();
        let npc = state.ship(id).unwrap();
        let player = state.player_ship().unwrap();
        assert_eq!(npc.mask(), &player.mask().mirrored());
    }

    #[test]
    fn test_tinted_color_clamps() {
        let mut state = GameState::new(1);
        let ship = state.player_ship_mut().unwrap();
        ship.color = ShipColor::White;
        ship.health = 50;
        assert_eq!(ship.tinted_color(), [127, 127, 127]);
        ship.health = -20;
        assert_eq!(ship.display_health(), 0);
        assert_eq!(ship.tinted_color(), [0, 0, 0]);
    }

    #[test]
    fn test_projectile_fire_direction() {
        let mut state = GameState::new(11);
        let id = state.spawn_npc(0).unwrap();
        let npc = state.ship(id).unwrap().clone();
        let player = state.player_ship().unwrap();

        let laser = Projectile::fire(player, WeaponKind::Laser);
        assert!(laser.velocity < 0);
        assert_eq!(laser.bounds.x, player.pos.x - MUZZLE_OFFSET);

        let rocket = Projectile::fire(&npc, WeaponKind::Rocket);
        let expected = if npc.faction == Faction::Enemy { 1 } else { -1 };
        assert_eq!(rocket.velocity.signum(), expected);
        assert_eq!(rocket.color, npc.color.rgb());
    }

    #[test]
    fn test_explosion_lifecycle() {
        let mut e = Explosion::new(IVec2::new(100, 100), 1.0);
        assert_eq!(e.bounds, Rect::new(-28, -28, 256, 256));
        assert_eq!(e.center(), IVec2::new(100, 100));
        let mut ticks = 0;
        while !e.is_finished() {
            e.advance(TICK_MS);
            ticks += 1;
        }
        // Held for 300 ms, then one frame per tick
        assert_eq!(ticks, 300 / TICK_MS as usize + EXPLOSION_FRAMES as usize);
    }
}
