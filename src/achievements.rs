//! Achievement table
//!
//! Milestone achievements are thresholds over the lifetime `GameStats`;
//! completion achievements are granted by the run when it is won.

use crate::GameStats;
use crate::run::RunMode;
use crate::sim::state::Difficulty;

/// Consecutive undamaged rooms needed for "untouchable"
pub const UNTOUCHABLE_STREAK: u32 = 5;

/// Lifetime counter an achievement is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Kills,
    Bosses,
    Rooms,
    Coins,
    /// Distinct weapons ever equipped
    WeaponsUsed,
    /// Current run of rooms cleared without damage
    UntouchedStreak,
}

impl Metric {
    pub fn value(&self, stats: &GameStats) -> u64 {
        match self {
            Metric::Kills => stats.enemies_killed.into(),
            Metric::Bosses => stats.bosses_defeated.into(),
            Metric::Rooms => stats.rooms_cleared.into(),
            Metric::Coins => stats.coins_earned,
            Metric::WeaponsUsed => stats.weapons_used.len() as u64,
            Metric::UntouchedStreak => stats.no_damage_streak.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub id: &'static str,
    pub metric: Metric,
    pub target: u64,
}

const fn milestone(id: &'static str, metric: Metric, target: u64) -> Milestone {
    Milestone { id, metric, target }
}

pub const MILESTONES: &[Milestone] = &[
    milestone("first-blood", Metric::Kills, 1),
    milestone("mass-murderer", Metric::Kills, 100),
    milestone("genocide", Metric::Kills, 500),
    milestone("death-incarnate", Metric::Kills, 1000),
    milestone("boss-slayer", Metric::Bosses, 1),
    milestone("boss-master", Metric::Bosses, 10),
    milestone("boss-legend", Metric::Bosses, 25),
    milestone("explorer", Metric::Rooms, 10),
    milestone("adventurer", Metric::Rooms, 50),
    milestone("dungeon-master", Metric::Rooms, 100),
    milestone("endless-wanderer", Metric::Rooms, 250),
    milestone("penny-pincher", Metric::Coins, 100),
    milestone("treasure-hunter", Metric::Coins, 500),
    milestone("rich-beyond-dreams", Metric::Coins, 1000),
    milestone("coin-hoarder", Metric::Coins, 5000),
    milestone("weapon-novice", Metric::WeaponsUsed, 5),
    milestone("weapon-expert", Metric::WeaponsUsed, 15),
    milestone("arsenal-master", Metric::WeaponsUsed, 27),
    milestone(
        "untouchable",
        Metric::UntouchedStreak,
        UNTOUCHABLE_STREAK as u64,
    ),
];

/// Every milestone the stats currently satisfy
pub fn earned(stats: &GameStats) -> impl Iterator<Item = &'static str> + '_ {
    MILESTONES
        .iter()
        .filter(|m| m.metric.value(stats) >= m.target)
        .map(|m| m.id)
}

/// Achievements for winning a run
pub fn victory(difficulty: Difficulty, mode: RunMode, players: usize) -> Vec<&'static str> {
    let mut ids = vec!["milk-retrieved", victory_id(difficulty)];
    if mode == RunMode::Reverse {
        ids.push("reverse-mode");
    }
    if players > 1 {
        ids.push("local-coop-master");
    }
    ids
}

fn victory_id(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy-victory",
        Difficulty::Normal => "normal-victory",
        Difficulty::Hard => "hard-victory",
        Difficulty::Milk => "milk-victory",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_stats_earn_nothing() {
        assert_eq!(earned(&GameStats::new()).count(), 0);
    }

    #[test]
    fn test_kill_thresholds() {
        let mut stats = GameStats::new();
        stats.enemies_killed = 99;
        assert_eq!(earned(&stats).collect::<Vec<_>>(), vec!["first-blood"]);
        stats.enemies_killed = 100;
        assert_eq!(
            earned(&stats).collect::<Vec<_>>(),
            vec!["first-blood", "mass-murderer"]
        );
    }

    #[test]
    fn test_coin_and_room_thresholds() {
        let stats = GameStats {
            coins_earned: 1000,
            rooms_cleared: 50,
            ..GameStats::default()
        };
        let ids: Vec<_> = earned(&stats).collect();
        assert!(ids.contains(&"rich-beyond-dreams"));
        assert!(!ids.contains(&"coin-hoarder"));
        assert!(ids.contains(&"adventurer"));
        assert!(!ids.contains(&"dungeon-master"));
    }

    #[test]
    fn test_weapons_count_distinct_ids() {
        let mut stats = GameStats::new();
        for id in ["spoon", "fork", "fork", "ladle", "whisk"] {
            stats.weapons_used.insert(id.to_string());
        }
        assert!(!earned(&stats).any(|id| id == "weapon-novice"));
        stats.weapons_used.insert("spatula".to_string());
        assert!(earned(&stats).any(|id| id == "weapon-novice"));
    }

    #[test]
    fn test_untouchable_needs_streak() {
        let mut stats = GameStats::new();
        stats.untouched_rooms = 20;
        stats.no_damage_streak = UNTOUCHABLE_STREAK - 1;
        assert!(!earned(&stats).any(|id| id == "untouchable"));
        stats.no_damage_streak = UNTOUCHABLE_STREAK;
        assert!(earned(&stats).any(|id| id == "untouchable"));
    }

    #[test]
    fn test_victory_ids() {
        assert_eq!(
            victory(Difficulty::Hard, RunMode::Normal, 1),
            vec!["milk-retrieved", "hard-victory"]
        );
        assert_eq!(
            victory(Difficulty::Milk, RunMode::Reverse, 2),
            vec![
                "milk-retrieved",
                "milk-victory",
                "reverse-mode",
                "local-coop-master"
            ]
        );
    }
}
