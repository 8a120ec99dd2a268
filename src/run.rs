//! Run orchestration
//!
//! A run strings room attempts together: it generates each room, drives the
//! `RoomController` until a terminal outcome, banks coins, revives downed
//! co-op players and hands out (or, in reverse mode, takes away) upgrades
//! between rooms. Achievements are evaluated against the lifetime stats as
//! events arrive. The save snapshot is written opportunistically after every
//! room; a failing store never interrupts play.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::achievements;
use crate::consts::FINAL_ROOM;
use crate::hooks::{Hooks, RoomController, RunEvent};
use crate::persistence::{Persistence, SaveData, load_or_default, save_or_warn};
use crate::sim::events::GameEvent;
use crate::sim::room_gen::{RoomRequest, generate_room};
use crate::sim::state::{Difficulty, Player, RoomOutcome, RoomSession};
use crate::sim::stats::{CosmeticAbility, Weapon};
use crate::sim::tick::TickInput;
use crate::tuning::Tuning;
use crate::upgrade::{self, Upgrade, UpgradeCatalog};

/// Upgrades offered after each cleared room
pub const UPGRADE_CHOICES: usize = 3;
/// Price of replacing the current offer
pub const REROLL_COST: u64 = 10;

/// Run progression modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Rooms 1 to 15, one upgrade gained per room
    #[default]
    Normal,
    /// No final room
    Endless,
    /// Rooms 15 down to 1, starting strong and giving up one upgrade per room
    Reverse,
}

/// Run setup chosen before the first room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub difficulty: Difficulty,
    pub mode: RunMode,
    /// 1 to 4 local players
    pub player_count: usize,
    pub cosmetic: String,
    pub ability: Option<CosmeticAbility>,
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            mode: RunMode::Normal,
            player_count: 1,
            cosmetic: "default".to_string(),
            ability: None,
            seed: 0,
        }
    }
}

/// Where the run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    InRoom,
    /// Between rooms: upgrades may be picked (or, in reverse mode, a
    /// downgrade must be chosen) before `begin_room`
    BetweenRooms,
    Victory,
    Defeat,
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, RunStatus::Victory | RunStatus::Defeat)
    }
}

/// Enemy count scaling for local co-op
pub fn coop_enemy_multiplier(players: usize) -> f32 {
    match players {
        0 | 1 => 1.0,
        2 => 2.0,
        3 => 2.5,
        _ => 3.0,
    }
}

/// A complete run across rooms
pub struct Run {
    config: RunConfig,
    status: RunStatus,
    room_number: u32,
    rooms_cleared: u32,
    /// Players between rooms (moved into the session while a room runs)
    players: Vec<Player>,
    /// Upgrades held by the team, oldest first; every player carries all of them
    held: Vec<Upgrade>,
    catalog: UpgradeCatalog,
    options: Vec<Upgrade>,
    /// Reverse mode: held upgrades offered for removal
    downgrades: Vec<Upgrade>,
    coins_this_run: u64,
    tuning: Tuning,
    rng: Pcg32,
    save: SaveData,
    store: Box<dyn Persistence>,
    hooks: Hooks,
    controller: Option<RoomController>,
}

impl Run {
    pub fn new(
        config: RunConfig,
        catalog: UpgradeCatalog,
        tuning: Tuning,
        hooks: Hooks,
        mut store: Box<dyn Persistence>,
    ) -> Self {
        let save = load_or_default(store.as_mut());
        let player_count = config.player_count.clamp(1, 4);
        let players: Vec<Player> = (0..player_count)
            .map(|slot| {
                let mut player = Player::new(slot, config.difficulty.starting_stats())
                    .with_cosmetic(&config.cosmetic, config.ability);
                player.weapon_upgrades = save.weapon_upgrades;
                player
            })
            .collect();

        let room_number = match config.mode {
            RunMode::Reverse => FINAL_ROOM,
            RunMode::Normal | RunMode::Endless => 1,
        };

        let mut run = Self {
            rng: Pcg32::seed_from_u64(config.seed),
            status: RunStatus::BetweenRooms,
            room_number,
            rooms_cleared: 0,
            held: Vec::new(),
            players,
            catalog,
            options: Vec::new(),
            downgrades: Vec::new(),
            coins_this_run: 0,
            tuning,
            save,
            store,
            hooks,
            controller: None,
            config,
        };

        if run.config.mode == RunMode::Reverse {
            run.grant_reverse_loadout();
        }

        log::info!(
            "Run started: {:?} on {} with {} player(s)",
            run.config.mode,
            run.config.difficulty.as_str(),
            run.players.len()
        );
        run.emit_run(RunEvent::GameStarted {
            difficulty: run.config.difficulty,
            players: run.players.len(),
        });
        run.emit_run(RunEvent::WeaponUsed {
            id: Weapon::starter().id,
        });
        run
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn room_number(&self) -> u32 {
        self.room_number
    }

    pub fn rooms_cleared(&self) -> u32 {
        self.rooms_cleared
    }

    /// Players as of the last room boundary
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn held_upgrades(&self) -> &[Upgrade] {
        &self.held
    }

    /// Wallet balance (persisted across runs)
    pub fn coins(&self) -> u64 {
        self.save.total_coins
    }

    pub fn coins_this_run(&self) -> u64 {
        self.coins_this_run
    }

    pub fn save_data(&self) -> &SaveData {
        &self.save
    }

    pub fn upgrade_options(&self) -> &[Upgrade] {
        &self.options
    }

    /// Reverse mode: the held upgrades one of which must go before the next room
    pub fn downgrade_options(&self) -> &[Upgrade] {
        &self.downgrades
    }

    /// Live room, if one is running
    pub fn session(&self) -> Option<&RoomSession> {
        self.controller.as_ref().map(RoomController::session)
    }

    pub fn last_events(&self) -> &[GameEvent] {
        self.controller
            .as_ref()
            .map(RoomController::last_events)
            .unwrap_or(&[])
    }

    /// Generate the current room and start its session at `now_ms`
    pub fn begin_room(&mut self, now_ms: u64) -> bool {
        if self.status != RunStatus::BetweenRooms {
            log::warn!("begin_room ignored while {:?}", self.status);
            return false;
        }
        if !self.downgrades.is_empty() {
            log::warn!("begin_room ignored until a downgrade is chosen");
            return false;
        }

        let request = RoomRequest {
            number: self.room_number,
            difficulty: self.config.difficulty,
            endless: self.config.mode == RunMode::Endless,
            enemy_multiplier: coop_enemy_multiplier(self.players.len()),
        };
        let room = generate_room(&request, &mut self.rng);
        let seed: u64 = self.rng.random();
        let session = RoomSession::new(
            room,
            std::mem::take(&mut self.players),
            self.config.difficulty,
            self.tuning.clone(),
            seed,
            now_ms,
        );

        self.options.clear();
        self.controller = Some(RoomController::new(session, std::mem::take(&mut self.hooks)));
        self.status = RunStatus::InRoom;
        true
    }

    /// Advance the live room by one tick.
    ///
    /// Returns the room outcome on the tick it latches; the run has already
    /// moved on to the next room (or finished) by then.
    pub fn tick(&mut self, input: &TickInput) -> Option<RoomOutcome> {
        let controller = self.controller.as_mut()?;
        let outcome = controller.tick(input);
        let events = controller.last_events().to_vec();
        for event in &events {
            self.save.stats.record(event);
        }
        if !events.is_empty() {
            self.check_achievements();
        }

        let outcome = outcome?;
        let controller = self.controller.take()?;
        let (session, hooks) = controller.into_parts();
        self.settle_room(session, hooks, outcome);
        Some(outcome)
    }

    /// Replace the current offer for `REROLL_COST` coins
    pub fn reroll(&mut self) -> bool {
        if self.status != RunStatus::BetweenRooms || self.options.is_empty() {
            return false;
        }
        if self.save.total_coins < REROLL_COST {
            log::debug!("Reroll refused: {} coins", self.save.total_coins);
            return false;
        }
        self.save.total_coins -= REROLL_COST;
        self.options = self.catalog.roll(UPGRADE_CHOICES, &mut self.rng);
        true
    }

    /// Take one of the offered upgrades; every player receives it
    pub fn choose_upgrade(&mut self, index: usize) -> bool {
        if self.status != RunStatus::BetweenRooms || index >= self.options.len() {
            return false;
        }
        let choice = self.options.swap_remove(index);
        self.options.clear();

        for player in &mut self.players {
            upgrade::apply(player, &choice);
        }
        self.held.push(choice.clone());
        log::info!("Upgrade taken: {}", choice.id());

        if let Upgrade::Weapon(weapon) = &choice {
            self.emit_run(RunEvent::WeaponUsed {
                id: weapon.id.clone(),
            });
        }
        self.emit_run(RunEvent::UpgradeApplied {
            id: choice.id().to_string(),
        });
        true
    }

    /// Drop the offer without picking anything
    pub fn skip_upgrade(&mut self) {
        self.options.clear();
    }

    /// Reverse mode: give up the offered upgrade `id`; every player loses it
    pub fn choose_downgrade(&mut self, id: &str) -> bool {
        if self.status != RunStatus::BetweenRooms {
            return false;
        }
        if !self.downgrades.iter().any(|u| u.id() == id) {
            log::debug!("Downgrade '{}' is not on offer", id);
            return false;
        }
        let Some(index) = self.held.iter().position(|u| u.id() == id) else {
            return false;
        };
        self.downgrades.clear();

        let lost = self.held.remove(index);
        for player in &mut self.players {
            upgrade::revert(player, &lost, &self.held);
        }
        log::info!("Upgrade given up: {}", lost.id());
        self.emit_run(RunEvent::UpgradeLost {
            id: lost.id().to_string(),
        });
        true
    }

    fn settle_room(&mut self, session: RoomSession, hooks: Hooks, outcome: RoomOutcome) {
        self.hooks = hooks;
        self.players = session.players;

        let coins = outcome.coins_earned();
        self.save.total_coins += coins;
        self.coins_this_run += coins;
        self.emit_run(RunEvent::CoinsEarned { amount: coins });

        match outcome {
            RoomOutcome::Cleared { .. } => {
                self.rooms_cleared += 1;
                self.revive_players();
                self.advance();
            }
            RoomOutcome::GameOver { .. } => {
                self.downgrades.clear();
                log::info!(
                    "Run lost in room {} ({} coins this run)",
                    self.room_number,
                    self.coins_this_run
                );
                self.status = RunStatus::Defeat;
                self.emit_run(RunEvent::RunEnded {
                    room: self.room_number,
                });
            }
        }

        self.check_achievements();
        save_or_warn(self.store.as_mut(), &self.save);
    }

    /// Downed players come back at half health; everyone returns to the centre
    fn revive_players(&mut self) {
        for player in &mut self.players {
            if !player.is_alive() {
                player.health = (player.effective().max_health / 2.0).floor();
                player.poison_stacks = 0.0;
                log::debug!("Player {} revived with {} hp", player.slot, player.health);
            }
            player.reset_for_room();
        }
    }

    fn advance(&mut self) {
        match self.config.mode {
            RunMode::Normal if self.room_number >= FINAL_ROOM => self.finish_victory(),
            RunMode::Normal | RunMode::Endless => {
                self.room_number += 1;
                self.options = self.catalog.roll(UPGRADE_CHOICES, &mut self.rng);
                self.status = RunStatus::BetweenRooms;
            }
            RunMode::Reverse if self.room_number <= 1 => self.finish_victory(),
            RunMode::Reverse => {
                self.room_number -= 1;
                self.downgrades = self.held.clone();
                self.downgrades.shuffle(&mut self.rng);
                self.downgrades.truncate(UPGRADE_CHOICES);
                self.status = RunStatus::BetweenRooms;
            }
        }
    }

    fn finish_victory(&mut self) {
        log::info!(
            "Run won after {} rooms ({} coins this run)",
            self.rooms_cleared,
            self.coins_this_run
        );
        self.status = RunStatus::Victory;
        for id in achievements::victory(
            self.config.difficulty,
            self.config.mode,
            self.players.len(),
        ) {
            self.unlock(id);
        }
        self.emit_run(RunEvent::GameCompleted {
            rooms_cleared: self.rooms_cleared,
        });
        self.emit_run(RunEvent::RunEnded {
            room: self.room_number,
        });
    }

    /// Reverse mode: the team starts with `FINAL_ROOM` distinct upgrades
    fn grant_reverse_loadout(&mut self) {
        self.held = self.catalog.roll(FINAL_ROOM as usize, &mut self.rng);
        for player in &mut self.players {
            for choice in &self.held {
                upgrade::apply(player, choice);
            }
        }
        log::info!("Reverse loadout: {} upgrades", self.held.len());
    }

    fn check_achievements(&mut self) {
        let earned: Vec<_> = achievements::earned(&self.save.stats).collect();
        for id in earned {
            self.unlock(id);
        }
    }

    fn unlock(&mut self, id: &str) -> bool {
        let unlocked = self.save.unlock_achievement(id);
        if unlocked {
            log::info!("Achievement unlocked: {}", id);
        }
        unlocked
    }

    fn emit_run(&mut self, event: RunEvent) {
        self.save.stats.record_run(&event);
        match self.controller.as_mut() {
            Some(controller) => controller.hooks_mut().emit_run(&event),
            None => self.hooks.emit_run(&event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::stats::Weapon;
    use crate::upgrade::{PowerUp, PowerUpEffect};

    fn catalog() -> UpgradeCatalog {
        UpgradeCatalog {
            upgrades: vec![
                Upgrade::Weapon(Weapon {
                    id: "fork".to_string(),
                    damage: 15.0,
                    attack_speed: 2.5,
                    range: 160.0,
                    knockback: 6.0,
                }),
                Upgrade::PowerUp(PowerUp {
                    id: "carton".to_string(),
                    effect: PowerUpEffect::MaxHealth(20.0),
                }),
                Upgrade::PowerUp(PowerUp {
                    id: "boots".to_string(),
                    effect: PowerUpEffect::Speed(1.0),
                }),
                Upgrade::PowerUp(PowerUp {
                    id: "needle".to_string(),
                    effect: PowerUpEffect::Piercing(1),
                }),
            ],
        }
    }

    /// Twenty distinct +1 max health upgrades
    fn wide_catalog() -> UpgradeCatalog {
        UpgradeCatalog {
            upgrades: (0..20)
                .map(|i| {
                    Upgrade::PowerUp(PowerUp {
                        id: format!("p{}", i),
                        effect: PowerUpEffect::MaxHealth(1.0),
                    })
                })
                .collect(),
        }
    }

    fn reverse_run(player_count: usize) -> Run {
        Run::new(
            RunConfig {
                mode: RunMode::Reverse,
                player_count,
                seed: 11,
                ..RunConfig::default()
            },
            wide_catalog(),
            Tuning::default(),
            Hooks::default(),
            Box::new(MemoryStore::new()),
        )
    }

    fn has_achievement(run: &Run, id: &str) -> bool {
        run.save_data().achievements.iter().any(|a| a == id)
    }

    fn run_with(config: RunConfig) -> Run {
        Run::new(
            config,
            catalog(),
            Tuning::default(),
            Hooks::default(),
            Box::new(MemoryStore::new()),
        )
    }

    /// Start the current room and settle it with `outcome`, optionally
    /// editing the session first
    fn settle(run: &mut Run, outcome: RoomOutcome, edit: impl FnOnce(&mut RoomSession)) {
        assert!(run.begin_room(0));
        let controller = run.controller.take().unwrap();
        let (mut session, hooks) = controller.into_parts();
        edit(&mut session);
        run.settle_room(session, hooks, outcome);
    }

    fn cleared(coins: u64) -> RoomOutcome {
        RoomOutcome::Cleared {
            coins_earned: coins,
            no_damage: false,
        }
    }

    #[test]
    fn test_new_run_uses_difficulty_and_cosmetic() {
        let run = run_with(RunConfig {
            difficulty: Difficulty::Hard,
            ability: Some(CosmeticAbility::Health(20.0)),
            cosmetic: "robot".to_string(),
            ..RunConfig::default()
        });
        assert_eq!(run.status(), RunStatus::BetweenRooms);
        assert_eq!(run.room_number(), 1);
        assert_eq!(run.players().len(), 1);
        assert_eq!(run.players()[0].health, 80.0);
        assert_eq!(run.players()[0].cosmetic, "robot");
        assert_eq!(run.save_data().stats.games_played, 1);
    }

    #[test]
    fn test_coop_multiplier() {
        assert_eq!(coop_enemy_multiplier(1), 1.0);
        assert_eq!(coop_enemy_multiplier(2), 2.0);
        assert_eq!(coop_enemy_multiplier(3), 2.5);
        assert_eq!(coop_enemy_multiplier(4), 3.0);
    }

    #[test]
    fn test_begin_room_only_between_rooms() {
        let mut run = run_with(RunConfig::default());
        assert!(run.begin_room(0));
        assert_eq!(run.status(), RunStatus::InRoom);
        assert!(run.session().is_some());
        assert!(run.players().is_empty());
        assert!(!run.begin_room(10));
    }

    #[test]
    fn test_clear_banks_coins_and_offers_upgrades() {
        let mut run = run_with(RunConfig::default());
        settle(&mut run, cleared(30), |_| {});
        assert_eq!(run.status(), RunStatus::BetweenRooms);
        assert_eq!(run.room_number(), 2);
        assert_eq!(run.rooms_cleared(), 1);
        assert_eq!(run.coins(), 30);
        assert_eq!(run.save_data().stats.coins_earned, 30);
        assert_eq!(run.upgrade_options().len(), UPGRADE_CHOICES);
        assert_eq!(run.players().len(), 1);
    }

    #[test]
    fn test_coop_revive_at_half_health() {
        let mut run = run_with(RunConfig {
            player_count: 2,
            difficulty: Difficulty::Easy,
            ..RunConfig::default()
        });
        settle(&mut run, cleared(10), |session| {
            session.players[1].health = 0.0;
            session.players[0].pos.x = 10.0;
        });
        assert_eq!(run.players()[1].health, 50.0);
        assert_eq!(run.players()[0].health, 100.0);
        assert_eq!(run.players()[0].pos, crate::arena_center());
    }

    #[test]
    fn test_game_over_ends_run() {
        let mut run = run_with(RunConfig::default());
        settle(&mut run, RoomOutcome::GameOver { coins_earned: 12 }, |_| {});
        assert_eq!(run.status(), RunStatus::Defeat);
        assert!(run.status().is_finished());
        assert_eq!(run.coins(), 12);
        assert!(!run.begin_room(0));
    }

    #[test]
    fn test_victory_after_final_room() {
        let mut run = run_with(RunConfig::default());
        run.room_number = FINAL_ROOM;
        settle(&mut run, cleared(50), |_| {});
        assert_eq!(run.status(), RunStatus::Victory);
        assert!(run.save_data().stats.has_won_once);
        assert!(has_achievement(&run, "milk-retrieved"));
        assert!(has_achievement(&run, "normal-victory"));
        assert!(!has_achievement(&run, "reverse-mode"));
        assert!(!has_achievement(&run, "local-coop-master"));
    }

    #[test]
    fn test_milestones_unlock_when_room_settles() {
        let mut run = run_with(RunConfig::default());
        assert!(run.save_data().stats.weapons_used.contains("spoon"));
        run.save.stats.coins_earned = 95;
        settle(&mut run, cleared(4), |_| {});
        assert!(!has_achievement(&run, "penny-pincher"));
        settle(&mut run, cleared(1), |_| {});
        assert!(has_achievement(&run, "penny-pincher"));
        assert!(!has_achievement(&run, "treasure-hunter"));
    }

    #[test]
    fn test_endless_continues_past_final_room() {
        let mut run = run_with(RunConfig {
            mode: RunMode::Endless,
            ..RunConfig::default()
        });
        run.room_number = FINAL_ROOM;
        settle(&mut run, cleared(50), |_| {});
        assert_eq!(run.status(), RunStatus::BetweenRooms);
        assert_eq!(run.room_number(), FINAL_ROOM + 1);
    }

    #[test]
    fn test_reverse_loadout_is_distinct_and_shared() {
        let run = reverse_run(2);
        assert_eq!(run.room_number(), FINAL_ROOM);
        let mut ids: Vec<_> = run.held_upgrades().iter().map(Upgrade::id).collect();
        assert_eq!(ids.len(), FINAL_ROOM as usize);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), FINAL_ROOM as usize);

        let expected = 80.0 + FINAL_ROOM as f32;
        for player in run.players() {
            assert_eq!(player.stats.max_health, expected);
        }
        assert_eq!(run.players()[0].stats, run.players()[1].stats);
    }

    #[test]
    fn test_reverse_mode_offers_a_downgrade_choice() {
        let mut run = reverse_run(2);
        settle(&mut run, cleared(5), |_| {});
        assert_eq!(run.status(), RunStatus::BetweenRooms);
        assert_eq!(run.room_number(), FINAL_ROOM - 1);
        // No offers in reverse mode
        assert!(run.upgrade_options().is_empty());
        assert_eq!(run.downgrade_options().len(), UPGRADE_CHOICES);
        assert_eq!(run.held_upgrades().len(), FINAL_ROOM as usize);
        for offered in run.downgrade_options() {
            assert!(run.held_upgrades().contains(offered));
        }

        // The next room waits for the choice
        assert!(!run.begin_room(0));
        assert!(!run.choose_downgrade("not-held"));

        let id = run.downgrade_options()[1].id().to_string();
        assert!(run.choose_downgrade(&id));
        assert!(run.downgrade_options().is_empty());
        assert_eq!(run.held_upgrades().len(), FINAL_ROOM as usize - 1);
        assert!(run.held_upgrades().iter().all(|u| u.id() != id));
        let expected = 80.0 + FINAL_ROOM as f32 - 1.0;
        for player in run.players() {
            assert_eq!(player.stats.max_health, expected);
        }
        assert!(!run.choose_downgrade(&id));
        assert!(run.begin_room(0));
    }

    #[test]
    fn test_reverse_final_clear_keeps_loadout() {
        let mut run = reverse_run(2);
        run.room_number = 1;
        settle(&mut run, cleared(5), |_| {});
        assert_eq!(run.status(), RunStatus::Victory);
        assert!(run.downgrade_options().is_empty());
        assert_eq!(run.held_upgrades().len(), FINAL_ROOM as usize);
        assert!(has_achievement(&run, "reverse-mode"));
        assert!(has_achievement(&run, "local-coop-master"));
    }

    #[test]
    fn test_choose_upgrade_applies_to_every_player() {
        let mut run = run_with(RunConfig {
            player_count: 2,
            ..RunConfig::default()
        });
        settle(&mut run, cleared(0), |_| {});
        let index = run
            .upgrade_options()
            .iter()
            .position(|u| u.id() == "carton")
            .unwrap_or(0);
        let id = run.upgrade_options()[index].id().to_string();
        assert!(run.choose_upgrade(index));
        assert!(run.upgrade_options().is_empty());
        assert_eq!(run.held_upgrades().len(), 1);
        assert_eq!(run.held_upgrades()[0].id(), id);
        assert_eq!(run.players()[0].stats, run.players()[1].stats);
        assert!(!run.choose_upgrade(0));
    }

    #[test]
    fn test_reroll_costs_coins() {
        let mut run = run_with(RunConfig::default());
        settle(&mut run, cleared(REROLL_COST + 5), |_| {});
        assert!(run.reroll());
        assert_eq!(run.coins(), 5);
        assert_eq!(run.upgrade_options().len(), UPGRADE_CHOICES);
        assert!(!run.reroll());
    }

    #[test]
    fn test_unavailable_store_does_not_interrupt() {
        let mut run = Run::new(
            RunConfig::default(),
            catalog(),
            Tuning::default(),
            Hooks::default(),
            Box::new(MemoryStore::offline()),
        );
        settle(&mut run, cleared(8), |_| {});
        assert_eq!(run.coins(), 8);
        assert_eq!(run.status(), RunStatus::BetweenRooms);
    }

    #[test]
    fn test_ticks_drive_room_to_outcome() {
        let mut run = run_with(RunConfig {
            difficulty: Difficulty::Easy,
            ability: Some(CosmeticAbility::Ultimate),
            ..RunConfig::default()
        });
        assert!(run.begin_room(0));
        let mut outcome = None;
        for i in 1..=20_000u64 {
            outcome = run.tick(&TickInput {
                now_ms: i * 16,
                players: Vec::new(),
            });
            if outcome.is_some() {
                break;
            }
        }
        let outcome = outcome.unwrap();
        assert!(run.session().is_none());
        assert_eq!(run.coins(), outcome.coins_earned());
        assert!(run.save_data().stats.enemies_killed > 0);
    }
}
