//! Browser bindings
//!
//! Thin wasm-bindgen wrapper around `Run`. The page owns rendering, input
//! polling and the animation-frame loop; it passes one flattened input vector
//! per frame and reads back a JSON view of the room.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::hooks::{Hooks, LogAudio};
use crate::persistence::LocalStorageStore;
use crate::run::{Run, RunConfig, RunMode, RunStatus};
use crate::sim::state::{Difficulty, Enemy, Obstacle, Particle, Player, Projectile};
use crate::sim::tick::{PlayerInput, TickInput};
use crate::tuning::Tuning;
use crate::upgrade::UpgradeCatalog;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::info!("Milk Heist starting...");
}

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

fn parse<T: serde::de::DeserializeOwned>(name: &str) -> Result<T, JsValue> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Everything the page needs to draw one frame
#[derive(Serialize)]
struct FrameView<'a> {
    room: u32,
    players: &'a [Player],
    enemies: &'a [Enemy],
    obstacles: &'a [Obstacle],
    projectiles: &'a [Projectile],
    particles: &'a [Particle],
}

#[wasm_bindgen]
pub struct WebRun {
    run: Run,
}

#[wasm_bindgen]
impl WebRun {
    #[wasm_bindgen(constructor)]
    pub fn new(
        difficulty: &str,
        mode: &str,
        players: usize,
        catalog_json: &str,
    ) -> Result<WebRun, JsValue> {
        let difficulty: Difficulty = parse(difficulty)?;
        let mode: RunMode = parse(mode)?;
        let catalog = UpgradeCatalog::from_json(catalog_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let config = RunConfig {
            difficulty,
            mode,
            player_count: players,
            seed: now_ms(),
            ..RunConfig::default()
        };
        let run = Run::new(
            config,
            catalog,
            Tuning::default(),
            Hooks::new(Box::new(LogAudio)),
            Box::new(LocalStorageStore),
        );
        Ok(Self { run })
    }

    pub fn begin_room(&mut self) -> bool {
        self.run.begin_room(now_ms())
    }

    /// `inputs` holds one x/y/attack triple per player slot; attack is 1.0
    /// on the frame the button went down.
    ///
    /// Returns true on the tick the room ends.
    pub fn tick(&mut self, inputs: &[f32]) -> bool {
        let players = inputs
            .chunks_exact(3)
            .map(|slot| PlayerInput::new(slot[0], slot[1]).with_attack(slot[2] > 0.5))
            .collect();
        self.run
            .tick(&TickInput {
                now_ms: now_ms(),
                players,
            })
            .is_some()
    }

    pub fn status(&self) -> String {
        match self.run.status() {
            RunStatus::InRoom => "in_room",
            RunStatus::BetweenRooms => "between_rooms",
            RunStatus::Victory => "victory",
            RunStatus::Defeat => "defeat",
        }
        .to_string()
    }

    pub fn room_number(&self) -> u32 {
        self.run.room_number()
    }

    pub fn coins(&self) -> f64 {
        self.run.coins() as f64
    }

    /// JSON array of the current upgrade offer
    pub fn upgrade_options(&self) -> String {
        serde_json::to_string(self.run.upgrade_options()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn choose_upgrade(&mut self, index: usize) -> bool {
        self.run.choose_upgrade(index)
    }

    /// JSON array of the held upgrades offered for removal (reverse mode)
    pub fn downgrade_options(&self) -> String {
        serde_json::to_string(self.run.downgrade_options()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn choose_downgrade(&mut self, id: &str) -> bool {
        self.run.choose_downgrade(id)
    }

    pub fn reroll(&mut self) -> bool {
        self.run.reroll()
    }

    /// JSON view of the live room, or `null` between rooms
    pub fn frame(&self) -> String {
        let Some(session) = self.run.session() else {
            return "null".to_string();
        };
        let view = FrameView {
            room: session.room_number,
            players: &session.players,
            enemies: &session.enemies,
            obstacles: &session.obstacles,
            projectiles: &session.projectiles,
            particles: &session.particles,
        };
        serde_json::to_string(&view).unwrap_or_else(|_| "null".to_string())
    }
}
