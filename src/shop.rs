use log::debug;
use thiserror::Error;

use crate::player::Player;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    Weapon,
    Armor,
}

/// One purchasable upgrade; `value` is damage for weapons, defense for armor.
#[derive(Clone, Debug, PartialEq)]
pub struct Tier {
    pub name: &'static str,
    pub value: f32,
    pub cost: u32,
}

const fn tier(name: &'static str, value: f32, cost: u32) -> Tier {
    Tier { name, value, cost }
}

const WEAPON_TIERS: [Tier; 5] = [
    tier("Rusty Sword", 10.0, 0),
    tier("Iron Sword", 15.0, 50),
    tier("Steel Sword", 22.0, 150),
    tier("Mithril Sword", 32.0, 400),
    tier("Dragon Blade", 45.0, 1000),
];

const ARMOR_TIERS: [Tier; 5] = [
    tier("Cloth Armor", 0.0, 0),
    tier("Leather Armor", 2.0, 40),
    tier("Chainmail", 5.0, 120),
    tier("Plate Armor", 10.0, 350),
    tier("Dragon Scale", 18.0, 900),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("no {kind:?} tier {index}")]
    UnknownTier { kind: UpgradeKind, index: usize },
    #[error("{kind:?} tier {index} is not beyond the current tier {current}")]
    AlreadyOwned {
        kind: UpgradeKind,
        index: usize,
        current: usize,
    },
    #[error("costs {cost} gold, only {gold} available")]
    InsufficientGold { cost: u32, gold: u32 },
}

#[derive(Clone, Debug)]
pub struct Shop {
    weapons: Vec<Tier>,
    armor: Vec<Tier>,
    current_weapon: usize,
    current_armor: usize,
}

impl Default for Shop {
    fn default() -> Self {
        Self::new()
    }
}

impl Shop {
    pub fn new() -> Self {
        Self {
            weapons: WEAPON_TIERS.to_vec(),
            armor: ARMOR_TIERS.to_vec(),
            current_weapon: 0,
            current_armor: 0,
        }
    }

    pub fn buy_weapon(&mut self, index: usize, player: &mut Player) -> Result<&Tier, PurchaseError> {
        self.buy(UpgradeKind::Weapon, index, player)
    }

    pub fn buy_armor(&mut self, index: usize, player: &mut Player) -> Result<&Tier, PurchaseError> {
        self.buy(UpgradeKind::Armor, index, player)
    }

    /// Succeeds only for a tier beyond the current one that the player can
    /// afford; a failed purchase changes nothing.
    pub fn buy(
        &mut self,
        kind: UpgradeKind,
        index: usize,
        player: &mut Player,
    ) -> Result<&Tier, PurchaseError> {
        let (tiers, current) = match kind {
            UpgradeKind::Weapon => (&self.weapons, &mut self.current_weapon),
            UpgradeKind::Armor => (&self.armor, &mut self.current_armor),
        };
        if index <= *current {
            return Err(PurchaseError::AlreadyOwned {
                kind,
                index,
                current: *current,
            });
        }
        let tier = tiers
            .get(index)
            .ok_or(PurchaseError::UnknownTier { kind, index })?;
        if player.gold < tier.cost {
            return Err(PurchaseError::InsufficientGold {
                cost: tier.cost,
                gold: player.gold,
            });
        }

        player.gold -= tier.cost;
        *current = index;
        match kind {
            UpgradeKind::Weapon => player.damage = tier.value,
            UpgradeKind::Armor => player.defense = tier.value,
        }
        debug!("bought {} for {} gold", tier.name, tier.cost);
        Ok(tier)
    }

    /// Sets the player's damage and defense from the owned tiers.
    pub fn apply_to(&self, player: &mut Player) {
        player.damage = self.current_weapon().value;
        player.defense = self.current_armor().value;
    }

    pub fn available_weapons(&self) -> impl Iterator<Item = (usize, &Tier)> {
        self.weapons.iter().enumerate().skip(self.current_weapon + 1)
    }

    pub fn available_armor(&self) -> impl Iterator<Item = (usize, &Tier)> {
        self.armor.iter().enumerate().skip(self.current_armor + 1)
    }

    pub fn current_weapon(&self) -> &Tier {
        &self.weapons[self.current_weapon]
    }

    pub fn current_armor(&self) -> &Tier {
        &self.armor[self.current_armor]
    }

    pub fn current_weapon_tier(&self) -> usize {
        self.current_weapon
    }

    pub fn current_armor_tier(&self) -> usize {
        self.current_armor
    }

    pub fn weapon_tiers(&self) -> &[Tier] {
        &self.weapons
    }

    pub fn armor_tiers(&self) -> &[Tier] {
        &self.armor
    }
}
