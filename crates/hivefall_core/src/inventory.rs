//! Player inventory: weapons, consumable charges and food.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// String identifier of a weapon, as used in rules files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeaponId(String);

impl WeaponId {
    /// Create a weapon identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WeaponId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for WeaponId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Weapons, charges and food carried by the player.
///
/// Non-consumable weapons are owned at most once. Consumable weapons carry
/// a charge counter that grows on every grant and shrinks on every use; the
/// weapon leaves the inventory when its last charge is spent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// Owned weapons in the order they were first granted.
    weapons: Vec<WeaponId>,
    /// Remaining uses of consumable weapons.
    charges: BTreeMap<WeaponId, u32>,
    /// Food units.
    food: u32,
}

impl Inventory {
    /// Create an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Owned weapons in grant order.
    #[must_use]
    pub fn weapons(&self) -> &[WeaponId] {
        &self.weapons
    }

    /// Returns true if the weapon is owned.
    #[must_use]
    pub fn has_weapon(&self, id: &WeaponId) -> bool {
        self.weapons.contains(id)
    }

    /// Remaining charges of a consumable weapon (0 if none).
    #[must_use]
    pub fn charges(&self, id: &WeaponId) -> u32 {
        self.charges.get(id).copied().unwrap_or(0)
    }

    /// Food units carried.
    #[must_use]
    pub const fn food(&self) -> u32 {
        self.food
    }

    /// Grant a weapon.
    ///
    /// Returns `false` when nothing changed, which only happens for an
    /// already-owned non-consumable weapon.
    pub fn grant_weapon(&mut self, id: &WeaponId, consumable: bool) -> bool {
        let owned = self.has_weapon(id);
        if !consumable && owned {
            return false;
        }
        if !owned {
            self.weapons.push(id.clone());
        }
        if consumable {
            *self.charges.entry(id.clone()).or_insert(0) += 1;
        }
        true
    }

    /// Spend one charge of a consumable weapon.
    ///
    /// Returns `false` if there was no charge to spend.
    pub fn spend_charge(&mut self, id: &WeaponId) -> bool {
        let Some(count) = self.charges.get_mut(id) else {
            return false;
        };
        if *count == 0 {
            return false;
        }
        *count -= 1;
        if *count == 0 {
            self.charges.remove(id);
            self.weapons.retain(|w| w != id);
        }
        true
    }

    /// Add food units.
    pub fn add_food(&mut self, amount: u32) {
        self.food = self.food.saturating_add(amount);
    }

    /// Take one food unit. Returns `false` if there was none.
    pub fn take_food(&mut self) -> bool {
        if self.food == 0 {
            return false;
        }
        self.food -= 1;
        true
    }
}
