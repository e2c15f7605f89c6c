//! Multiplicative stat modifiers
//!
//! A `BonusSet` holds one multiplier per stat slot of its owner kind. The
//! identity value is `1.0`. Sets of the same kind combine by elementwise
//! product; `scale` pulls every modified entry toward `1.0`.

use std::ops::Index;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::BonusError;

/// Which pool a bonus set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerKind {
    Player,
    Enemy,
}

impl OwnerKind {
    /// Stat slots available to this kind, in slot order
    pub fn slots(self) -> &'static [Stat] {
        match self {
            OwnerKind::Player => &Stat::ALL,
            OwnerKind::Enemy => &Stat::ALL[..ENEMY_SLOT_COUNT],
        }
    }
}

/// Enemy sets only carry the combat stats
const ENEMY_SLOT_COUNT: usize = 8;

/// Raw increase ranges, indexed by `[high-impact, low-impact]`
const INCREASE_MIN: [f32; 2] = [0.1, 0.3];
const INCREASE_MAX: [f32; 2] = [0.4, 0.9];

/// High-impact stats weigh more when normalizing a random draw
const HIGH_IMPACT_WEIGHT: f32 = 2.5;
const LOW_IMPACT_WEIGHT: f32 = 1.0;

/// Number of stats modified by a random draw
const RANDOM_STAT_COUNT: usize = 2;

/// Normalized reward magnitude lands in `[TARGET_MIN, TARGET_MIN + TARGET_SPREAD)`
const TARGET_MIN: f32 = 0.75;
const TARGET_SPREAD: f32 = 0.3;

/// A named stat slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    OverallDamage,
    OverallProtection,
    RammingDamage,
    RammingProtection,
    LaserDamage,
    LaserProtection,
    RocketDamage,
    RocketProtection,
    // Player only
    RocketReloadSpeed,
    OverallScore,
    ScoreFromRamming,
    ScoreFromLasering,
    ScoreFromRocketing,
}

impl Stat {
    pub const ALL: [Stat; 13] = [
        Stat::OverallDamage,
        Stat::OverallProtection,
        Stat::RammingDamage,
        Stat::RammingProtection,
        Stat::LaserDamage,
        Stat::LaserProtection,
        Stat::RocketDamage,
        Stat::RocketProtection,
        Stat::RocketReloadSpeed,
        Stat::OverallScore,
        Stat::ScoreFromRamming,
        Stat::ScoreFromLasering,
        Stat::ScoreFromRocketing,
    ];

    /// Slot index
    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Identifier used in lookups and config files
    pub fn name(self) -> &'static str {
        match self {
            Stat::OverallDamage => "OverallDamage",
            Stat::OverallProtection => "OverallProtection",
            Stat::RammingDamage => "RammingDamage",
            Stat::RammingProtection => "RammingProtection",
            Stat::LaserDamage => "LaserDamage",
            Stat::LaserProtection => "LaserProtection",
            Stat::RocketDamage => "RocketDamage",
            Stat::RocketProtection => "RocketProtection",
            Stat::RocketReloadSpeed => "RocketReloadSpeed",
            Stat::OverallScore => "OverallScore",
            Stat::ScoreFromRamming => "ScoreFromRamming",
            Stat::ScoreFromLasering => "ScoreFromLasering",
            Stat::ScoreFromRocketing => "ScoreFromRocketing",
        }
    }

    /// Human readable label for reward screens
    pub fn label(self) -> &'static str {
        match self {
            Stat::OverallDamage => "Overall Damage",
            Stat::OverallProtection => "Overall Protection",
            Stat::RammingDamage => "Ramming Damage",
            Stat::RammingProtection => "Ramming Protection",
            Stat::LaserDamage => "Laser Damage",
            Stat::LaserProtection => "Laser Protection",
            Stat::RocketDamage => "Rocket Damage",
            Stat::RocketProtection => "Rocket Protection",
            Stat::RocketReloadSpeed => "Rocket Reload Speed",
            Stat::OverallScore => "Overall Score",
            Stat::ScoreFromRamming => "Score From Ramming",
            Stat::ScoreFromLasering => "Score From Lasering",
            Stat::ScoreFromRocketing => "Score From Rocketing",
        }
    }

    /// High-impact stats get a smaller increase range
    pub fn is_high_impact(self) -> bool {
        matches!(
            self,
            Stat::OverallDamage | Stat::OverallProtection | Stat::OverallScore
        )
    }

    pub fn from_name(name: &str) -> Result<Stat, BonusError> {
        Stat::ALL
            .iter()
            .copied()
            .find(|s| s.name() == name)
            .ok_or_else(|| BonusError::UnknownStat(name.to_string()))
    }
}

/// A set of multipliers owned by the player ship or the enemy faction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusSet {
    kind: OwnerKind,
    values: Vec<f32>,
}

impl BonusSet {
    /// All multipliers at `1.0`
    pub fn identity(kind: OwnerKind) -> Self {
        Self {
            kind,
            values: vec![1.0; kind.slots().len()],
        }
    }

    pub fn kind(&self) -> OwnerKind {
        self.kind
    }

    fn slot(&self, stat: Stat) -> Result<usize, BonusError> {
        let idx = stat.index();
        if idx < self.values.len() {
            Ok(idx)
        } else {
            Err(BonusError::UnknownStat(stat.name().to_string()))
        }
    }

    /// Multiplier for `stat`; fails if the stat is not a slot of this kind
    pub fn get(&self, stat: Stat) -> Result<f32, BonusError> {
        self.slot(stat).map(|i| self.values[i])
    }

    /// Multiplier by stat name
    pub fn lookup(&self, name: &str) -> Result<f32, BonusError> {
        let stat = Stat::from_name(name)?;
        self.get(stat)
    }

    pub fn set(&mut self, stat: Stat, value: f32) -> Result<(), BonusError> {
        let idx = self.slot(stat)?;
        self.values[idx] = value;
        Ok(())
    }

    /// Iterate `(stat, multiplier)` pairs in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Stat, f32)> + '_ {
        self.kind.slots().iter().copied().zip(self.values.iter().copied())
    }

    /// Elementwise product of two sets of the same kind
    pub fn combine(&self, other: &BonusSet) -> Result<BonusSet, BonusError> {
        if self.kind != other.kind {
            return Err(BonusError::IncompatibleOwnerKind {
                left: self.kind,
                right: other.kind,
            });
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a * b)
            .collect();
        Ok(BonusSet {
            kind: self.kind,
            values,
        })
    }

    /// Compress deviations from `1.0` by `f`; untouched entries stay exact
    pub fn scale(&self, f: f32) -> BonusSet {
        let values = self
            .values
            .iter()
            .map(|&v| if v != 1.0 { 1.0 + (v - 1.0) * f } else { v })
            .collect();
        BonusSet {
            kind: self.kind,
            values,
        }
    }

    /// Draw a reward: two distinct stats raised, then renormalized so the
    /// weighted deviation lands in `[0.75, 1.05)`
    pub fn random<R: Rng + ?Sized>(kind: OwnerKind, rng: &mut R) -> BonusSet {
        let mut set = BonusSet::identity(kind);
        let mut remaining: Vec<usize> = (0..set.values.len()).collect();
        let mut weighted_sum = 0.0;

        for _ in 0..RANDOM_STAT_COUNT {
            let pick = rng.random_range(0..remaining.len());
            let idx = remaining.remove(pick);
            let stat = kind.slots()[idx];

            let (category, weight) = if stat.is_high_impact() {
                (0, HIGH_IMPACT_WEIGHT)
            } else {
                (1, LOW_IMPACT_WEIGHT)
            };
            let increase = rng.random::<f32>() * (INCREASE_MAX[category] - INCREASE_MIN[category])
                + INCREASE_MIN[category];
            set.values[idx] += increase;
            weighted_sum += increase * weight;
        }

        let target = rng.random::<f32>() * TARGET_SPREAD + TARGET_MIN;
        set.scale(target / weighted_sum)
    }

    /// Weighted deviation from identity (reward "power")
    pub fn magnitude(&self) -> f32 {
        self.iter()
            .map(|(stat, v)| {
                let w = if stat.is_high_impact() {
                    HIGH_IMPACT_WEIGHT
                } else {
                    LOW_IMPACT_WEIGHT
                };
                (v - 1.0) * w
            })
            .sum()
    }

    /// One line per modified stat, e.g. `"Laser Damage +12%"`
    pub fn describe(&self) -> Vec<String> {
        self.iter()
            .filter(|&(_, v)| v != 1.0)
            .map(|(stat, v)| {
                let sign = if v > 1.0 { '+' } else { '-' };
                let pct = ((v - 1.0).abs() * 100.0).round() as i32;
                format!("{} {}{}%", stat.label(), sign, pct)
            })
            .collect()
    }
}

/// Indexing with a stat outside the set's kind is a programming error
impl Index<Stat> for BonusSet {
    type Output = f32;

    fn index(&self, stat: Stat) -> &f32 {
        match self.slot(stat) {
            Ok(i) => &self.values[i],
            Err(_) => panic!("{:?} bonus set has no {} slot", self.kind, stat.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn player_set(values: Vec<f32>) -> BonusSet {
        BonusSet {
            kind: OwnerKind::Player,
            values,
        }
    }

    fn values_strategy() -> impl Strategy<Value = Vec<f32>> {
        prop::collection::vec(0.5f32..2.0, Stat::ALL.len())
    }

    fn approx_eq(a: &BonusSet, b: &BonusSet) -> bool {
        a.kind == b.kind
            && a.values
                .iter()
                .zip(&b.values)
                .all(|(x, y)| (x - y).abs() < 1e-5)
    }

    proptest! {
        #[test]
        fn test_combine_commutative(a in values_strategy(), b in values_strategy()) {
            let (a, b) = (player_set(a), player_set(b));
            prop_assert_eq!(a.combine(&b).unwrap(), b.combine(&a).unwrap());
        }

        #[test]
        fn test_combine_associative(
            a in values_strategy(),
            b in values_strategy(),
            c in values_strategy(),
        ) {
            let (a, b, c) = (player_set(a), player_set(b), player_set(c));
            let left = a.combine(&b).unwrap().combine(&c).unwrap();
            let right = a.combine(&b.combine(&c).unwrap()).unwrap();
            prop_assert!(approx_eq(&left, &right));
        }

        #[test]
        fn test_combine_identity(a in values_strategy()) {
            let a = player_set(a);
            let id = BonusSet::identity(OwnerKind::Player);
            prop_assert_eq!(a.combine(&id).unwrap(), a.clone());
        }

        #[test]
        fn test_scale_bounds(a in values_strategy()) {
            let a = player_set(a);
            prop_assert!(a.scale(0.0).values.iter().all(|&v| v == 1.0));
            prop_assert!(approx_eq(&a.scale(1.0), &a));
        }
    }

    #[test]
    fn test_combine_rejects_mixed_kinds() {
        let player = BonusSet::identity(OwnerKind::Player);
        let enemy = BonusSet::identity(OwnerKind::Enemy);
        assert_eq!(
            player.combine(&enemy),
            Err(BonusError::IncompatibleOwnerKind {
                left: OwnerKind::Player,
                right: OwnerKind::Enemy,
            })
        );
    }

    #[test]
    fn test_scale_leaves_identity_entries_exact() {
        let mut set = BonusSet::identity(OwnerKind::Enemy);
        set.set(Stat::LaserDamage, 1.4).unwrap();
        let scaled = set.scale(0.5);
        assert!((scaled[Stat::LaserDamage] - 1.2).abs() < 1e-6);
        assert_eq!(scaled[Stat::RammingDamage], 1.0);
    }

    #[test]
    fn test_unknown_stat_lookup() {
        let enemy = BonusSet::identity(OwnerKind::Enemy);
        assert_eq!(enemy.lookup("LaserDamage"), Ok(1.0));
        assert!(matches!(
            enemy.lookup("Shields"),
            Err(BonusError::UnknownStat(name)) if name == "Shields"
        ));
        // Player-only slot is unknown to enemy sets
        assert!(matches!(
            enemy.get(Stat::OverallScore),
            Err(BonusError::UnknownStat(_))
        ));
    }

    #[test]
    #[should_panic]
    fn test_index_outside_kind_panics() {
        let enemy = BonusSet::identity(OwnerKind::Enemy);
        let _ = enemy[Stat::RocketReloadSpeed];
    }

    #[test]
    fn test_random_touches_two_stats_with_bounded_power() {
        let mut rng = Pcg32::seed_from_u64(7);
        for kind in [OwnerKind::Player, OwnerKind::Enemy] {
            for _ in 0..200 {
                let set = BonusSet::random(kind, &mut rng);
                let modified = set.iter().filter(|&(_, v)| v != 1.0).count();
                assert_eq!(modified, 2);
                assert!(set.iter().all(|(_, v)| v >= 1.0));
                let m = set.magnitude();
                assert!((0.75 - 1e-4..1.05 + 1e-4).contains(&m), "magnitude {m}");
            }
        }
    }

    #[test]
    fn test_describe() {
        let mut set = BonusSet::identity(OwnerKind::Player);
        set.set(Stat::LaserDamage, 1.12).unwrap();
        set.set(Stat::OverallScore, 0.9).unwrap();
        assert_eq!(
            set.describe(),
            vec!["Laser Damage +12%".to_string(), "Overall Score -10%".to_string()]
        );
    }
}
