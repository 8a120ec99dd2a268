//! Milk Heist headless driver
//!
//! Plays a complete run natively with a simple kiting policy and logs the
//! result. The browser build drives the same `Run` through `web::WebRun`.
//!
//! Usage: `milk-heist [seed] [difficulty] [mode] [players]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use milk_heist::consts::*;
    use milk_heist::hooks::{Hooks, LogAudio};
    use milk_heist::persistence::{JsonFileStore, MemoryStore, Persistence};
    use milk_heist::run::{Run, RunConfig, RunMode, RunStatus};
    use milk_heist::sim::state::{Difficulty, RoomSession};
    use milk_heist::sim::tick::{PlayerInput, TickInput};
    use milk_heist::tuning::Tuning;
    use milk_heist::upgrade::UpgradeCatalog;

    const DEMO_CATALOG: &str = r#"{
        "upgrades": [
            { "kind": "weapon", "id": "fork", "damage": 15.0, "attack_speed": 2.5, "range": 160.0, "knockback": 6.0 },
            { "kind": "weapon", "id": "ladle", "damage": 25.0, "attack_speed": 1.2, "range": 140.0, "knockback": 12.0 },
            { "kind": "weapon", "id": "whisk", "damage": 8.0, "attack_speed": 4.0, "range": 130.0, "knockback": 3.0 },
            { "kind": "powerup", "id": "milk_carton", "effect": { "stat": "max_health", "value": 20.0 } },
            { "kind": "powerup", "id": "cookie", "effect": { "stat": "health", "value": 30.0 } },
            { "kind": "powerup", "id": "sneakers", "effect": { "stat": "speed", "value": 1.0 } },
            { "kind": "powerup", "id": "sharp_spoon", "effect": { "stat": "damage", "value": 4.0 } },
            { "kind": "powerup", "id": "cereal_armor", "effect": { "stat": "defense", "value": 2.0 } },
            { "kind": "powerup", "id": "vampire_straw", "effect": { "stat": "lifesteal", "value": 5.0 } },
            { "kind": "powerup", "id": "needle", "effect": { "stat": "piercing", "value": 1 } }
        ]
    }"#;

    /// Stop an endless run eventually
    const MAX_ROOMS: u32 = 40;
    /// Give up on a room that never resolves (5 simulated minutes)
    const MAX_ROOM_MS: u64 = 300_000;
    /// Simulated frame times (ms) to exercise the accumulator
    const FRAME_TIMES_MS: [f32; 4] = [16.0, 17.0, 21.0, 12.5];

    const SAVE_FILE: &str = "milk_heist_save.json";

    struct Args {
        seed: u64,
        difficulty: Difficulty,
        mode: RunMode,
        players: usize,
    }

    fn parse_name<T: serde::de::DeserializeOwned>(arg: Option<String>, fallback: T) -> T {
        match arg {
            Some(name) => serde_json::from_value(serde_json::Value::String(name.clone()))
                .unwrap_or_else(|_| {
                    log::warn!("Unknown option '{}', using default", name);
                    fallback
                }),
            None => fallback,
        }
    }

    fn parse_args() -> Args {
        let mut args = std::env::args().skip(1);
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
        let difficulty = parse_name(args.next(), Difficulty::Normal);
        let mode = parse_name(args.next(), RunMode::Normal);
        let players = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
        Args {
            seed,
            difficulty,
            mode,
            players,
        }
    }

    /// Move away from the nearest enemy, drifting back toward the centre
    /// when close to a wall
    fn kite(session: &RoomSession) -> Vec<PlayerInput> {
        let center = milk_heist::arena_center();
        session
            .players
            .iter()
            .map(|player| {
                let threat = session
                    .enemies
                    .iter()
                    .min_by(|a, b| {
                        a.pos
                            .distance_squared(player.pos)
                            .total_cmp(&b.pos.distance_squared(player.pos))
                    })
                    .map(|enemy| player.pos - enemy.pos);

                let to_center = center - player.pos;
                let wall_pull = if player.pos.x < 100.0
                    || player.pos.x > ARENA_WIDTH - 100.0
                    || player.pos.y < 100.0
                    || player.pos.y > ARENA_HEIGHT - 100.0
                {
                    to_center.normalize_or_zero()
                } else {
                    Vec2::ZERO
                };

                let dir = match threat {
                    Some(away) if away.length() < 200.0 => away.normalize_or_zero() + wall_pull,
                    _ => to_center.normalize_or_zero() * 0.3,
                };
                PlayerInput::new(dir.x.clamp(-1.0, 1.0), dir.y.clamp(-1.0, 1.0))
            })
            .collect()
    }

    fn open_store() -> Box<dyn Persistence> {
        if std::env::var_os("MILK_HEIST_NO_SAVE").is_some() {
            log::info!("Saving disabled");
            Box::new(MemoryStore::new())
        } else {
            Box::new(JsonFileStore::new(std::env::temp_dir().join(SAVE_FILE)))
        }
    }

    pub fn run() {
        env_logger::init();
        let args = parse_args();
        log::info!("Milk Heist (headless) starting with seed {}", args.seed);

        let catalog = match UpgradeCatalog::from_json(DEMO_CATALOG) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Bad demo catalog: {}", e);
                UpgradeCatalog::default()
            }
        };

        let config = RunConfig {
            difficulty: args.difficulty,
            mode: args.mode,
            player_count: args.players,
            seed: args.seed,
            ..RunConfig::default()
        };
        let mut run = Run::new(
            config,
            catalog,
            Tuning::default(),
            Hooks::new(Box::new(LogAudio)),
            open_store(),
        );

        let mut now_ms: u64 = 0;
        let mut accumulator = 0.0f32;
        let mut frame = 0usize;
        let mut rooms_played = 0u32;

        while !run.status().is_finished() && rooms_played < MAX_ROOMS {
            if run.status() == RunStatus::BetweenRooms {
                if !run.upgrade_options().is_empty() {
                    run.choose_upgrade(0);
                }
                if let Some(id) = run.downgrade_options().first().map(|u| u.id().to_string()) {
                    run.choose_downgrade(&id);
                }
                run.begin_room(now_ms);
                rooms_played += 1;
            }
            let room_start = now_ms;

            while run.status() == RunStatus::InRoom {
                let frame_ms = FRAME_TIMES_MS[frame % FRAME_TIMES_MS.len()];
                frame += 1;
                accumulator += frame_ms / 1000.0;

                let mut substeps = 0;
                while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                    now_ms += (SIM_DT * 1000.0).round() as u64;
                    let players = run.session().map(kite).unwrap_or_default();
                    if let Some(outcome) = run.tick(&TickInput { now_ms, players }) {
                        log::info!("Room finished: {:?}", outcome);
                        accumulator = 0.0;
                        break;
                    }
                    accumulator -= SIM_DT;
                    substeps += 1;
                }

                if now_ms - room_start > MAX_ROOM_MS {
                    log::warn!("Room {} timed out, stopping", run.room_number());
                    return;
                }
            }
        }

        let stats = &run.save_data().stats;
        log::info!(
            "Run over: {:?} at room {} | {} rooms cleared, {} coins this run, {} total",
            run.status(),
            run.room_number(),
            run.rooms_cleared(),
            run.coins_this_run(),
            run.coins()
        );
        log::info!(
            "Lifetime: {} games, {} rooms, {} kills, {} bosses",
            stats.games_played,
            stats.rooms_cleared,
            stats.enemies_killed,
            stats.bosses_defeated
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is milk_heist::web::start, this is just to satisfy the compiler
}
