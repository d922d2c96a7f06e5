//! Logical key state for the simulation.
//!
//! The embedding client polls its keyboard once per real-time frame and
//! hands the simulation a snapshot of which logical keys are held. The
//! core never sees physical key codes.

use serde::{Deserialize, Serialize};

/// Bitflags for held logical keys.
/// Packed into a single u16 so a snapshot is trivially copyable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Raw bitfield of held inputs
    pub bits: u16,
}

impl PlayerInput {
    // Movement
    pub const THRUST: u16 = 1 << 0;
    pub const LEFT: u16 = 1 << 1;
    pub const RIGHT: u16 = 1 << 2;

    // Actions
    pub const FIRE: u16 = 1 << 3;
    /// First stored-powerup activation slot.
    pub const POWERUP_A: u16 = 1 << 4;
    /// Second stored-powerup activation slot.
    pub const POWERUP_B: u16 = 1 << 5;
    /// Self-destruct hotkey.
    pub const KILL: u16 = 1 << 6;

    // Loop control
    pub const PAUSE: u16 = 1 << 7;
    /// Debug single-step, only honored while paused.
    pub const STEP: u16 = 1 << 8;

    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self { bits }
    }

    #[inline]
    pub const fn is_held(&self, input: u16) -> bool {
        self.bits & input != 0
    }

    #[inline]
    pub fn set(&mut self, input: u16, held: bool) {
        if held {
            self.bits |= input;
        } else {
            self.bits &= !input;
        }
    }

    #[inline]
    pub const fn thrust(&self) -> bool {
        self.is_held(Self::THRUST)
    }

    #[inline]
    pub const fn left(&self) -> bool {
        self.is_held(Self::LEFT)
    }

    #[inline]
    pub const fn right(&self) -> bool {
        self.is_held(Self::RIGHT)
    }

    #[inline]
    pub const fn fire(&self) -> bool {
        self.is_held(Self::FIRE)
    }

    #[inline]
    pub const fn powerup_a(&self) -> bool {
        self.is_held(Self::POWERUP_A)
    }

    #[inline]
    pub const fn powerup_b(&self) -> bool {
        self.is_held(Self::POWERUP_B)
    }

    #[inline]
    pub const fn kill(&self) -> bool {
        self.is_held(Self::KILL)
    }

    #[inline]
    pub const fn pause(&self) -> bool {
        self.is_held(Self::PAUSE)
    }

    #[inline]
    pub const fn step(&self) -> bool {
        self.is_held(Self::STEP)
    }
}
