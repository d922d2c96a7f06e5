//! Session configuration supplied by the embedding client.

use serde::{Deserialize, Serialize};

/// Tunable switches for a game session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Enables the single-step debug advance while paused.
    pub debug: bool,
    /// Turning this off hides powerup blips and makes scanning harder.
    pub show_powerups_on_radar: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            debug: false,
            show_powerups_on_radar: true,
        }
    }
}
