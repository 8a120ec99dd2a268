//! Collaborator interfaces
//!
//! The simulation never calls out on its own. `RoomController` wraps a
//! `RoomSession` together with injected sinks and forwards every event the
//! tick produces. Sinks are fire-and-forget: nothing they do can feed back
//! into the simulation.

use crate::sim::events::GameEvent;
use crate::sim::state::{Difficulty, RoomOutcome, RoomSession};
use crate::sim::tick::{TickInput, tick};

/// Run-level events that happen outside a room
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    GameStarted {
        difficulty: Difficulty,
        players: usize,
    },
    /// Coins banked at the end of a room attempt
    CoinsEarned { amount: u64 },
    /// A weapon was equipped (achievement "weapon used")
    WeaponUsed { id: String },
    UpgradeApplied { id: String },
    UpgradeLost { id: String },
    GameCompleted { rooms_cleared: u32 },
    RunEnded { room: u32 },
}

/// Achievement / analytics sink
pub trait TelemetrySink {
    fn on_event(&mut self, event: &GameEvent);

    fn on_run_event(&mut self, _event: &RunEvent) {}
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player volley released
    Attack,
    /// Player projectile landed
    Hit,
    PlayerHurt,
    PlayerDown,
    /// Regular enemy died
    Death,
    BossDeath,
    Summon,
    RoomClear,
    GameOver,
    PowerUp,
    Victory,
}

impl SoundEffect {
    /// Cue for an in-room event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::EnemySpawned { .. } => None,
            GameEvent::PlayerAttacked { .. } => Some(SoundEffect::Attack),
            GameEvent::EnemyHit { .. } => Some(SoundEffect::Hit),
            GameEvent::PlayerDamaged { .. } => Some(SoundEffect::PlayerHurt),
            GameEvent::PlayerDowned { .. } => Some(SoundEffect::PlayerDown),
            GameEvent::EnemyKilled { is_boss: true, .. } => Some(SoundEffect::BossDeath),
            GameEvent::EnemyKilled { .. } => Some(SoundEffect::Death),
            GameEvent::MinionsSummoned { .. } => Some(SoundEffect::Summon),
            GameEvent::RoomCleared { .. } => Some(SoundEffect::RoomClear),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
        }
    }

    pub fn for_run_event(event: &RunEvent) -> Option<Self> {
        match event {
            RunEvent::UpgradeApplied { .. } | RunEvent::WeaponUsed { .. } => Some(SoundEffect::PowerUp),
            RunEvent::GameCompleted { .. } => Some(SoundEffect::Victory),
            _ => None,
        }
    }
}

/// Audio/visual cue sink
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn on_event(&mut self, _event: &GameEvent) {}
}

impl AudioSink for NullSink {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Logs every cue at trace level (headless builds)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        log::trace!("sfx {:?}", effect);
    }
}

/// Injected collaborators
pub struct Hooks {
    pub telemetry: Vec<Box<dyn TelemetrySink>>,
    pub audio: Box<dyn AudioSink>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            telemetry: Vec::new(),
            audio: Box::new(NullSink),
        }
    }
}

impl Hooks {
    pub fn new(audio: Box<dyn AudioSink>) -> Self {
        Self {
            telemetry: Vec::new(),
            audio,
        }
    }

    pub fn with_telemetry(mut self, sink: Box<dyn TelemetrySink>) -> Self {
        self.telemetry.push(sink);
        self
    }

    pub fn emit(&mut self, event: &GameEvent) {
        for sink in self.telemetry.iter_mut() {
            sink.on_event(event);
        }
        if let Some(effect) = SoundEffect::for_event(event) {
            self.audio.play(effect);
        }
    }

    pub fn emit_run(&mut self, event: &RunEvent) {
        for sink in self.telemetry.iter_mut() {
            sink.on_run_event(event);
        }
        if let Some(effect) = SoundEffect::for_run_event(event) {
            self.audio.play(effect);
        }
    }
}

/// A room session with its collaborators injected
pub struct RoomController {
    session: RoomSession,
    hooks: Hooks,
    last_events: Vec<GameEvent>,
}

impl RoomController {
    pub fn new(session: RoomSession, hooks: Hooks) -> Self {
        Self {
            session,
            hooks,
            last_events: Vec::new(),
        }
    }

    /// Advance one tick and dispatch its events.
    ///
    /// Returns the outcome once the room attempt has ended.
    pub fn tick(&mut self, input: &TickInput) -> Option<RoomOutcome> {
        self.last_events = tick(&mut self.session, input);
        for event in &self.last_events {
            self.hooks.emit(event);
        }
        self.session.outcome
    }

    pub fn session(&self) -> &RoomSession {
        &self.session
    }

    /// Events produced by the most recent tick
    pub fn last_events(&self) -> &[GameEvent] {
        &self.last_events
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    pub fn into_parts(self) -> (RoomSession, Hooks) {
        (self.session, self.hooks)
    }
}
