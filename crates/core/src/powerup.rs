//! Powerup catalog and the ship's powerup bookkeeping.
//!
//! Three classes of powerup: instant (applied on pickup), timed (active on
//! pickup with a remaining-duration counter) and stored (held in one of two
//! activation slots until the player triggers it). This module owns the
//! bookkeeping only; the effects themselves are applied by the player
//! controller, which owns the fields the effects touch.

use crate::entities::Layer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupKind {
    /// Large photons for a while.
    PhotonLarge,
    /// Three-way medium photons for a while.
    SpreadShot,
    /// Score multiplier x2 for a while.
    DoublePoints,
    ExtraFuel,
    ShipRepairs,
    SpareParts,
    /// Stored; slot A. Damage immunity while active.
    Invulnerability,
    /// Stored; slot B. Speed burst with bounce immunity (asteroids and the
    /// enemy base still bounce you).
    TurboThrust,
}

/// Activation slot for stored powerups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredSlot {
    A,
    B,
}

impl PowerupKind {
    pub fn layer(self) -> Layer {
        match self {
            PowerupKind::PhotonLarge => Layer::PhotonLargePowerup,
            PowerupKind::SpreadShot => Layer::SpreadShotPowerup,
            PowerupKind::DoublePoints => Layer::DoublePointsPowerup,
            PowerupKind::ExtraFuel => Layer::ExtraFuelPowerup,
            PowerupKind::ShipRepairs => Layer::ShipRepairsPowerup,
            PowerupKind::SpareParts => Layer::SparePartsPowerup,
            PowerupKind::Invulnerability => Layer::InvulnerabilityPowerup,
            PowerupKind::TurboThrust => Layer::TurboThrustPowerup,
        }
    }

    pub fn from_layer(layer: Layer) -> Option<Self> {
        match layer {
            Layer::PhotonLargePowerup => Some(PowerupKind::PhotonLarge),
            Layer::SpreadShotPowerup => Some(PowerupKind::SpreadShot),
            Layer::DoublePointsPowerup => Some(PowerupKind::DoublePoints),
            Layer::ExtraFuelPowerup => Some(PowerupKind::ExtraFuel),
            Layer::ShipRepairsPowerup => Some(PowerupKind::ShipRepairs),
            Layer::SparePartsPowerup => Some(PowerupKind::SpareParts),
            Layer::InvulnerabilityPowerup => Some(PowerupKind::Invulnerability),
            Layer::TurboThrustPowerup => Some(PowerupKind::TurboThrust),
            _ => None,
        }
    }

    /// Duration in ticks for timed effects; None for instant powerups.
    pub fn duration(self) -> Option<u32> {
        match self {
            PowerupKind::PhotonLarge => Some(1500),
            PowerupKind::SpreadShot => Some(1500),
            PowerupKind::DoublePoints => Some(900),
            PowerupKind::Invulnerability => Some(600),
            PowerupKind::TurboThrust => Some(120),
            PowerupKind::ExtraFuel | PowerupKind::ShipRepairs | PowerupKind::SpareParts => None,
        }
    }

    /// Stored powerups wait in a slot for manual activation.
    pub fn stored_slot(self) -> Option<StoredSlot> {
        match self {
            PowerupKind::Invulnerability => Some(StoredSlot::A),
            PowerupKind::TurboThrust => Some(StoredSlot::B),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivePowerup {
    pub kind: PowerupKind,
    pub ticks_remaining: u32,
}

/// Active-effect counters plus the two stored slots.
///
/// Pure storage: callers decide what picking up, expiring or activating a
/// powerup actually does to the ship.
#[derive(Debug, Clone, Default)]
pub struct PowerupState {
    active: Vec<ActivePowerup>,
    stored_a: Option<PowerupKind>,
    stored_b: Option<PowerupKind>,
}

impl PowerupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, kind: PowerupKind) -> bool {
        self.active.iter().any(|a| a.kind == kind)
    }

    /// Begin (or refresh) a timed effect.
    pub fn activate(&mut self, kind: PowerupKind, ticks: u32) {
        if let Some(existing) = self.active.iter_mut().find(|a| a.kind == kind) {
            existing.ticks_remaining = existing.ticks_remaining.max(ticks);
        } else {
            self.active.push(ActivePowerup {
                kind,
                ticks_remaining: ticks,
            });
        }
    }

    /// Put a stored powerup into its slot. A second pickup of the same slot
    /// simply replaces the previous one.
    pub fn store(&mut self, kind: PowerupKind, slot: StoredSlot) {
        match slot {
            StoredSlot::A => self.stored_a = Some(kind),
            StoredSlot::B => self.stored_b = Some(kind),
        }
    }

    pub fn stored(&self, slot: StoredSlot) -> Option<PowerupKind> {
        match slot {
            StoredSlot::A => self.stored_a,
            StoredSlot::B => self.stored_b,
        }
    }

    /// Remove and return the powerup waiting in a slot, if any.
    pub fn take_stored(&mut self, slot: StoredSlot) -> Option<PowerupKind> {
        match slot {
            StoredSlot::A => self.stored_a.take(),
            StoredSlot::B => self.stored_b.take(),
        }
    }

    /// Advance every remaining-duration counter by one tick and return the
    /// kinds whose duration has just elapsed.
    pub fn tick_durations(&mut self) -> Vec<PowerupKind> {
        let mut expired = Vec::new();
        for active in &mut self.active {
            if active.ticks_remaining > 0 {
                active.ticks_remaining -= 1;
            }
            if active.ticks_remaining == 0 {
                expired.push(active.kind);
            }
        }
        self.active.retain(|a| a.ticks_remaining > 0);
        expired
    }

    /// Drop every active effect (death). Stored powerups are preserved.
    pub fn deactivate_all(&mut self) -> Vec<PowerupKind> {
        self.active.drain(..).map(|a| a.kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_effect_expires_on_schedule() {
        let mut state = PowerupState::new();
        state.activate(PowerupKind::DoublePoints, 3);
        assert!(state.is_active(PowerupKind::DoublePoints));

        assert!(state.tick_durations().is_empty());
        assert!(state.tick_durations().is_empty());
        let expired = state.tick_durations();
        assert_eq!(expired, vec![PowerupKind::DoublePoints]);
        assert!(!state.is_active(PowerupKind::DoublePoints));
    }

    #[test]
    fn refreshing_extends_rather_than_stacking() {
        let mut state = PowerupState::new();
        state.activate(PowerupKind::SpreadShot, 5);
        state.activate(PowerupKind::SpreadShot, 10);
        for _ in 0..9 {
            assert!(state.tick_durations().is_empty());
        }
        assert_eq!(state.tick_durations(), vec![PowerupKind::SpreadShot]);
    }

    #[test]
    fn stored_slots_hold_one_each_and_survive_deactivate_all() {
        let mut state = PowerupState::new();
        state.store(PowerupKind::Invulnerability, StoredSlot::A);
        state.store(PowerupKind::TurboThrust, StoredSlot::B);
        state.activate(PowerupKind::PhotonLarge, 100);

        let dropped = state.deactivate_all();
        assert_eq!(dropped, vec![PowerupKind::PhotonLarge]);
        assert_eq!(state.stored(StoredSlot::A), Some(PowerupKind::Invulnerability));
        assert_eq!(state.stored(StoredSlot::B), Some(PowerupKind::TurboThrust));

        assert_eq!(
            state.take_stored(StoredSlot::A),
            Some(PowerupKind::Invulnerability)
        );
        assert_eq!(state.take_stored(StoredSlot::A), None);
    }
}
