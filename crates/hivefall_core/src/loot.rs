//! Loot rolls on enemy kills.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::inventory::WeaponId;
use crate::rng::RandomSource;
use crate::rules::HivefallRules;

/// One item awarded for a kill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Drop {
    /// A food unit.
    Food,
    /// A weapon (or one charge of a consumable weapon).
    Weapon(WeaponId),
}

impl Drop {
    /// Display label, using the weapon's display name when the rules know it.
    #[must_use]
    pub fn label(&self, rules: &HivefallRules) -> String {
        match self {
            Self::Food => "Food".to_string(),
            Self::Weapon(id) => rules
                .weapon(id)
                .map_or_else(|| id.to_string(), |w| w.name.clone()),
        }
    }
}

impl fmt::Display for Drop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Food => f.write_str("food"),
            Self::Weapon(id) => write!(f, "weapon:{id}"),
        }
    }
}

/// Pick a droppable weapon by relative drop weight.
///
/// Weapons with zero weight never drop. Returns `None` when nothing is
/// droppable.
pub fn pick_weapon_drop<R>(rules: &HivefallRules, rng: &mut R) -> Option<WeaponId>
where
    R: RandomSource + ?Sized,
{
    let total: u64 = rules.weapons.values().map(|w| u64::from(w.drop_weight)).sum();
    if total == 0 {
        return None;
    }

    let bound = u32::try_from(total).unwrap_or(u32::MAX);
    let mut roll = u64::from(rng.pick_below(bound));
    for (id, stats) in &rules.weapons {
        let weight = u64::from(stats.drop_weight);
        if roll < weight {
            return Some(id.clone());
        }
        roll -= weight;
    }
    None
}

/// Roll the drops for one kill.
///
/// Food and weapon draws are independent; food is drawn first so the order
/// of random draws is stable.
pub fn roll_loot<R>(rules: &HivefallRules, rng: &mut R) -> Vec<Drop>
where
    R: RandomSource + ?Sized,
{
    let mut drops = Vec::new();
    if rng.roll(rules.drops.food_chance) {
        drops.push(Drop::Food);
    }
    if rng.roll(rules.drops.weapon_chance) {
        if let Some(id) = pick_weapon_drop(rules, rng) {
            drops.push(Drop::Weapon(id));
        }
    }
    tracing::trace!(?drops, "Loot rolled");
    drops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;
    use crate::rules::WeaponStats;

    fn scripted(values: Vec<Fixed>) -> impl FnMut() -> Fixed {
        let mut values = values.into_iter();
        move || values.next().unwrap_or(Fixed::ZERO)
    }

    #[test]
    fn test_no_drops_on_high_rolls() {
        let rules = HivefallRules::default();
        let high = Fixed::from_num(0.99);
        let drops = roll_loot(&rules, &mut scripted(vec![high, high]));
        assert!(drops.is_empty());
    }

    #[test]
    fn test_food_and_weapon_drop() {
        let rules = HivefallRules::default();
        // Weights in id order: crowbar 4, fists 0, molotov 2, shotgun 1, taser 2 (total 9).
        // 0.5 * 9 = 4.5 -> index 4 lands on molotov.
        let drops = roll_loot(
            &rules,
            &mut scripted(vec![Fixed::ZERO, Fixed::ZERO, Fixed::from_num(0.5)]),
        );
        assert_eq!(drops, vec![Drop::Food, Drop::Weapon(WeaponId::from("molotov"))]);
    }

    #[test]
    fn test_zero_weight_never_drops() {
        let mut rules = HivefallRules::default();
        rules.weapons.clear();
        rules
            .weapons
            .insert(WeaponId::from("fists"), WeaponStats::named("Fists"));
        assert_eq!(pick_weapon_drop(&rules, &mut scripted(vec![])), None);
    }

    #[test]
    fn test_weighted_pick_boundaries() {
        let rules = HivefallRules::default();
        let first = pick_weapon_drop(&rules, &mut scripted(vec![Fixed::ZERO]));
        assert_eq!(first, Some(WeaponId::from("crowbar")));
        let last = pick_weapon_drop(&rules, &mut scripted(vec![Fixed::from_num(0.999)]));
        assert_eq!(last, Some(WeaponId::from("taser")));
    }

    #[test]
    fn test_weighted_pick_with_huge_weights() {
        let mut rules = HivefallRules::default();
        let crowbar = WeaponId::from("crowbar");
        rules.weapons.insert(
            crowbar.clone(),
            WeaponStats::named("Crowbar").with_damage(2).with_drop_weight(3_000_000_000),
        );
        rules.weapons.insert(
            WeaponId::from("shotgun"),
            WeaponStats::named("Shotgun").with_damage(5).with_drop_weight(u32::MAX),
        );
        let first = pick_weapon_drop(&rules, &mut scripted(vec![Fixed::ZERO]));
        assert_eq!(first, Some(crowbar.clone()));
        let middle = pick_weapon_drop(&rules, &mut scripted(vec![Fixed::from_num(0.5)]));
        assert_eq!(middle, Some(crowbar));
        let last = pick_weapon_drop(&rules, &mut scripted(vec![Fixed::from_num(0.999)]));
        assert!(last.is_some());
    }

    #[test]
    fn test_labels() {
        let rules = HivefallRules::default();
        assert_eq!(Drop::Food.label(&rules), "Food");
        assert_eq!(Drop::Weapon(WeaponId::from("taser")).label(&rules), "Taser");
        assert_eq!(Drop::Weapon(WeaponId::from("laser")).label(&rules), "laser");
    }
}
