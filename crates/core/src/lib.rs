//! Fringe Core - Game Simulation
//!
//! This crate contains the fixed-timestep simulation core of Fringe, a
//! top-down arcade space shooter. Rendering, audio playback, HUD widgets
//! and keyboard polling live in the embedding client and are reached only
//! through the traits in [`services`] and the query helpers in [`render`].
//!
//! # Determinism Rules
//!
//! 1. No `rand::thread_rng()` - Use `SeededRandom` only
//! 2. No system time - The clock is fed wall-clock milliseconds by the caller
//! 3. Ordered iteration - `Vec` not `HashMap` for entities
//! 4. No async - Pure synchronous logic, one tick at a time

pub mod clock;
pub mod collision;
pub mod config;
pub mod entities;
pub mod input;
pub mod physics;
pub mod player;
pub mod powerup;
pub mod random;
pub mod registry;
pub mod render;
pub mod services;
pub mod session;
pub mod systems;

pub use clock::GameClock;
pub use config::GameConfig;
pub use entities::{EntityId, GameObject, Layer, ObjectKind};
pub use input::PlayerInput;
pub use physics::GameBounds;
pub use player::PlayerShip;
pub use powerup::PowerupKind;
pub use random::SeededRandom;
pub use registry::ObjectRegistry;
pub use services::{GameServices, HudUpdate, Sound};
pub use session::Session;
