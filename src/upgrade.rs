//! Weapons and power-ups offered between rooms
//!
//! An `Upgrade` is either a weapon to equip or a power-up effect on the
//! player's base stats. In reverse mode upgrades are taken away again, so every
//! effect has an inverse with floors that keep stats legal.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::sim::state::Player;
use crate::sim::stats::Weapon;

/// Stat change granted by a power-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stat", content = "value", rename_all = "snake_case")]
pub enum PowerUpEffect {
    /// Immediate heal (never reverted)
    Health(f32),
    MaxHealth(f32),
    Speed(f32),
    Damage(f32),
    Defense(f32),
    Lifesteal(f32),
    Piercing(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: String,
    pub effect: PowerUpEffect,
}

/// Something a player can pick between rooms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Upgrade {
    Weapon(Weapon),
    PowerUp(PowerUp),
}

impl Upgrade {
    pub fn id(&self) -> &str {
        match self {
            Upgrade::Weapon(weapon) => &weapon.id,
            Upgrade::PowerUp(power_up) => &power_up.id,
        }
    }
}

/// Floors applied when an effect is taken away
const MIN_MAX_HEALTH: f32 = 1.0;
const MIN_SPEED: f32 = 1.0;

/// Apply an upgrade to a player
pub fn apply(player: &mut Player, upgrade: &Upgrade) {
    match upgrade {
        Upgrade::Weapon(weapon) => player.weapon = weapon.clone(),
        Upgrade::PowerUp(power_up) => {
            let stats = &mut player.stats;
            match power_up.effect {
                PowerUpEffect::Health(v) => {
                    let max = player.effective().max_health;
                    player.health = (player.health + v).clamp(0.0, max);
                }
                PowerUpEffect::MaxHealth(v) => {
                    stats.max_health += v;
                    player.health += v;
                }
                PowerUpEffect::Speed(v) => stats.speed += v,
                PowerUpEffect::Damage(v) => stats.damage += v,
                PowerUpEffect::Defense(v) => stats.defense += v,
                PowerUpEffect::Lifesteal(v) => stats.lifesteal += v,
                PowerUpEffect::Piercing(n) => stats.piercing += n,
            }
        }
    }
    clamp_health(player);
}

/// Take an upgrade away again.
///
/// `remaining` lists the upgrades the player still holds, oldest first; a lost
/// weapon falls back to the most recent remaining weapon, else the starter.
pub fn revert(player: &mut Player, upgrade: &Upgrade, remaining: &[Upgrade]) {
    match upgrade {
        Upgrade::Weapon(lost) => {
            if player.weapon.id == lost.id {
                player.weapon = remaining
                    .iter()
                    .rev()
                    .find_map(|u| match u {
                        Upgrade::Weapon(w) => Some(w.clone()),
                        Upgrade::PowerUp(_) => None,
                    })
                    .unwrap_or_else(Weapon::starter);
            }
        }
        Upgrade::PowerUp(power_up) => {
            let stats = &mut player.stats;
            match power_up.effect {
                PowerUpEffect::Health(_) => {}
                PowerUpEffect::MaxHealth(v) => {
                    stats.max_health = (stats.max_health - v).max(MIN_MAX_HEALTH);
                }
                PowerUpEffect::Speed(v) => stats.speed = (stats.speed - v).max(MIN_SPEED),
                PowerUpEffect::Damage(v) => stats.damage = (stats.damage - v).max(0.0),
                PowerUpEffect::Defense(v) => stats.defense = (stats.defense - v).max(0.0),
                PowerUpEffect::Lifesteal(v) => stats.lifesteal = (stats.lifesteal - v).max(0.0),
                PowerUpEffect::Piercing(n) => stats.piercing = stats.piercing.saturating_sub(n),
            }
        }
    }
    clamp_health(player);
}

fn clamp_health(player: &mut Player) {
    let max = player.effective().max_health;
    player.health = player.health.clamp(0.0, max);
}

/// Static upgrade catalog supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeCatalog {
    pub upgrades: Vec<Upgrade>,
}

impl UpgradeCatalog {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let catalog: Self = serde_json::from_str(json)?;
        log::info!("Loaded upgrade catalog ({} entries)", catalog.upgrades.len());
        Ok(catalog)
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    /// Up to `count` distinct upgrades in random order
    pub fn roll<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Upgrade> {
        let mut pool = self.upgrades.clone();
        pool.shuffle(rng);
        pool.truncate(count);
        pool
    }
}
