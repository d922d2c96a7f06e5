//! Contracts for the collaborators the core calls out to, and the internal
//! event queue that carries their requests to a safe point in the tick.
//!
//! Audio, HUD widgets and on-screen messages are client concerns; the core
//! only names what should happen (fire-and-forget).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, Layer};

/// Named sounds the client may play. Purely advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    StartUp,
    PhotonSmall,
    PhotonBig,
    PhotonSpread,
    CollisionGeneral,
    InvincibleCollision,
    LowFuel,
    BaseRepair,
    PlayerDeath,
    SludgerMinePop,
    PowerupObtained,
}

/// Plain numeric HUD pushes; no feedback into the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HudUpdate {
    Score(u32),
    Lives(u32),
    /// Percentage of fuel remaining, 0..=100.
    FuelBar(f32),
    /// Percentage of spare parts remaining, 0..=100.
    SparePartsBar(f32),
}

/// External collaborator contract. Implementations must not call back into
/// the session.
pub trait GameServices {
    fn play_sound(&mut self, sound: Sound);
    fn hud(&mut self, update: HudUpdate);
    /// Show a message for the given number of ticks.
    fn display_message(&mut self, text: &str, ticks: u32);
}

/// Service sink that drops everything; used by tests and headless runs.
#[derive(Debug, Default)]
pub struct NullServices;

impl GameServices for NullServices {
    fn play_sound(&mut self, _sound: Sound) {}
    fn hud(&mut self, _update: HudUpdate) {}
    fn display_message(&mut self, _text: &str, _ticks: u32) {}
}

/// Requests raised while entity borrows are held, applied by the session
/// once the borrow ends.
#[derive(Debug)]
pub enum GameEvent {
    Sound(Sound),
    Hud(HudUpdate),
    Message(String, u32),
    /// Add a freshly fired projectile to the registry.
    SpawnProjectile {
        layer: Layer,
        position: Vec2,
        velocity: Vec2,
        damage: f32,
        size: f32,
    },
    /// Credit the ship with base points (the ship applies its multiplier).
    AwardPoints(u32),
    /// Remove an entity (a consumed powerup) once the current pass ends.
    RemoveObject(EntityId),
    /// Shift the world so the ship ends up at this world position.
    RelocateShip(Vec2),
    /// Victory: the ship leaves the world but the session keeps drawing.
    RemoveShip,
    /// Final death: remove the ship and stop the session.
    EndSession,
}

pub type EventQueue = Vec<GameEvent>;

/// Recording sink for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingServices {
    pub sounds: Vec<Sound>,
    pub hud: Vec<HudUpdate>,
    pub messages: Vec<String>,
}

#[cfg(test)]
impl GameServices for RecordingServices {
    fn play_sound(&mut self, sound: Sound) {
        self.sounds.push(sound);
    }

    fn hud(&mut self, update: HudUpdate) {
        self.hud.push(update);
    }

    fn display_message(&mut self, text: &str, _ticks: u32) {
        self.messages.push(text.to_string());
    }
}
