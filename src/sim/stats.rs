//! Effective combat stats
//!
//! A player's numbers in combat are never stored directly. They are resolved
//! every tick from base stats, the equipped cosmetic's ability, the equipped
//! weapon and the account's permanent weapon upgrades, so mid-room changes
//! (weapon swap, upgrade pickup) take effect on the very next tick.

use serde::{Deserialize, Serialize};

/// Stats a player carries between rooms (before ability and weapon bonuses)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub max_health: f32,
    pub speed: f32,
    pub damage: f32,
    pub defense: f32,
    /// Percent of max health healed per kill
    pub lifesteal: f32,
    /// Extra enemies a projectile may hit after its first
    pub piercing: u32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            speed: 6.0,
            damage: 0.0,
            defense: 0.0,
            lifesteal: 0.0,
            piercing: 0,
        }
    }
}

/// Bonus granted by an equipped cosmetic. Each cosmetic grants exactly one kind,
/// except `Ultimate` which grants every bonus at fixed values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CosmeticAbility {
    Speed(f32),
    Health(f32),
    Damage(f32),
    Defense(f32),
    Lifesteal(f32),
    Multishot(u32),
    /// Percent of contact damage reflected to the attacker
    Thorns(f32),
    /// Health restored per regen tick
    Regen(f32),
    Ultimate,
}

/// A weapon as defined by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: String,
    pub damage: f32,
    /// Attacks per second
    pub attack_speed: f32,
    pub range: f32,
    pub knockback: f32,
}

impl Weapon {
    /// Weapon every run starts with
    pub fn starter() -> Self {
        Self {
            id: "spoon".to_string(),
            damage: 10.0,
            attack_speed: 2.0,
            range: 150.0,
            knockback: 5.0,
        }
    }
}

/// Permanent upgrades bought in the shop, applied to whatever weapon is equipped
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeaponUpgrades {
    pub damage: f32,
    pub attack_speed: f32,
    pub range: f32,
    pub knockback: f32,
}

/// Slowest attack rate a weapon can resolve to (attacks per second)
const MIN_ATTACK_SPEED: f32 = 0.1;

/// Resolved stats used by the simulation for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveStats {
    pub max_health: f32,
    pub speed: f32,
    pub damage: f32,
    pub defense: f32,
    pub lifesteal: f32,
    pub piercing: u32,
    pub multishot: u32,
    pub thorns: f32,
    pub regen: f32,
    /// Damage carried by each projectile (weapon + upgrades + player damage)
    pub attack_damage: f32,
    pub attack_speed: f32,
    pub knockback: f32,
    pub range: f32,
}

impl EffectiveStats {
    /// Resolve effective stats from their sources
    pub fn resolve(
        base: &BaseStats,
        ability: Option<CosmeticAbility>,
        weapon: &Weapon,
        upgrades: &WeaponUpgrades,
    ) -> Self {
        let mut stats = Self {
            max_health: base.max_health,
            speed: base.speed,
            damage: base.damage,
            defense: base.defense,
            lifesteal: base.lifesteal,
            piercing: base.piercing,
            multishot: 1,
            thorns: 0.0,
            regen: 0.0,
            attack_damage: 0.0,
            attack_speed: weapon.attack_speed + upgrades.attack_speed,
            knockback: weapon.knockback + upgrades.knockback,
            range: weapon.range + upgrades.range,
        };

        match ability {
            None => {}
            Some(CosmeticAbility::Speed(v)) => stats.speed += v,
            Some(CosmeticAbility::Health(v)) => stats.max_health += v,
            Some(CosmeticAbility::Damage(v)) => stats.damage += v,
            Some(CosmeticAbility::Defense(v)) => stats.defense += v,
            Some(CosmeticAbility::Lifesteal(v)) => stats.lifesteal += v,
            Some(CosmeticAbility::Multishot(n)) => stats.multishot = n,
            Some(CosmeticAbility::Thorns(v)) => stats.thorns = v,
            Some(CosmeticAbility::Regen(v)) => stats.regen = v,
            Some(CosmeticAbility::Ultimate) => {
                stats.damage += 50.0;
                stats.max_health += 100.0;
                stats.defense += 5.0;
                stats.speed += 5.0;
                stats.multishot = 5;
                stats.lifesteal += 25.0;
                stats.regen = 5.0;
                stats.thorns = 100.0;
            }
        }

        stats.attack_damage = weapon.damage + upgrades.damage + stats.damage;
        stats.clamp_non_negative()
    }

    /// Milliseconds between auto-attacks
    pub fn attack_cooldown_ms(&self) -> f32 {
        1000.0 / self.attack_speed
    }

    fn clamp_non_negative(mut self) -> Self {
        self.max_health = self.max_health.max(1.0);
        self.speed = self.speed.max(0.0);
        self.damage = self.damage.max(0.0);
        self.defense = self.defense.max(0.0);
        self.lifesteal = self.lifesteal.max(0.0);
        self.multishot = self.multishot.max(1);
        self.thorns = self.thorns.max(0.0);
        self.regen = self.regen.max(0.0);
        self.attack_damage = self.attack_damage.max(0.0);
        self.attack_speed = self.attack_speed.max(MIN_ATTACK_SPEED);
        self.knockback = self.knockback.max(0.0);
        self.range = self.range.max(0.0);
        self
    }
}
