//! Ship-systems degradation model.
//!
//! Four subsystems each run at an operating percentage in 0..=100. Damage
//! lands on random still-working subsystems in chunks; repair restores the
//! worst subsystem first. The malfunction rolls in the player controller
//! read these percentages every check period.

use crate::random::SeededRandom;

/// How much of one damage application lands on a single subsystem before
/// the remainder rolls over to another.
const DAMAGE_CHUNK: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Engines,
    TurnJets,
    Guns,
    Scanner,
}

const ALL_SUBSYSTEMS: [Subsystem; 4] = [
    Subsystem::Engines,
    Subsystem::TurnJets,
    Subsystem::Guns,
    Subsystem::Scanner,
];

/// Per-subsystem operating percentages.
#[derive(Debug, Clone)]
pub struct ShipSystems {
    engines: f32,
    turn_jets: f32,
    guns: f32,
    scanner: f32,
}

impl ShipSystems {
    pub fn new() -> Self {
        Self {
            engines: 100.0,
            turn_jets: 100.0,
            guns: 100.0,
            scanner: 100.0,
        }
    }

    pub fn operating_percentage(&self, subsystem: Subsystem) -> f32 {
        match subsystem {
            Subsystem::Engines => self.engines,
            Subsystem::TurnJets => self.turn_jets,
            Subsystem::Guns => self.guns,
            Subsystem::Scanner => self.scanner,
        }
    }

    fn condition_mut(&mut self, subsystem: Subsystem) -> &mut f32 {
        match subsystem {
            Subsystem::Engines => &mut self.engines,
            Subsystem::TurnJets => &mut self.turn_jets,
            Subsystem::Guns => &mut self.guns,
            Subsystem::Scanner => &mut self.scanner,
        }
    }

    /// Spread damage across random still-working subsystems in chunks.
    pub fn damage_systems(&mut self, amount: f32, rng: &mut SeededRandom) {
        let mut remaining = amount;
        while remaining > 0.0 && !self.is_destroyed() {
            let working: Vec<Subsystem> = ALL_SUBSYSTEMS
                .iter()
                .copied()
                .filter(|&s| self.operating_percentage(s) > 0.0)
                .collect();
            let target = working[rng.next_int(working.len() as u32) as usize];
            let condition = self.condition_mut(target);
            let applied = remaining.min(DAMAGE_CHUNK).min(*condition);
            *condition -= applied;
            remaining -= applied;
        }
    }

    /// Restore operating capacity, worst subsystem first.
    pub fn repair_systems(&mut self, amount: f32) {
        let mut remaining = amount;
        while remaining > 0.0 && !self.at_full_capacity() {
            let worst = ALL_SUBSYSTEMS
                .iter()
                .copied()
                .min_by(|a, b| {
                    self.operating_percentage(*a)
                        .total_cmp(&self.operating_percentage(*b))
                })
                .unwrap_or(Subsystem::Engines);
            let condition = self.condition_mut(worst);
            let applied = remaining.min(100.0 - *condition);
            *condition += applied;
            remaining -= applied;
        }
    }

    pub fn is_destroyed(&self) -> bool {
        ALL_SUBSYSTEMS
            .iter()
            .all(|&s| self.operating_percentage(s) <= 0.0)
    }

    pub fn at_full_capacity(&self) -> bool {
        ALL_SUBSYSTEMS
            .iter()
            .all(|&s| self.operating_percentage(s) >= 100.0)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ShipSystems {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_systems_are_at_full_capacity() {
        let systems = ShipSystems::new();
        assert!(systems.at_full_capacity());
        assert!(!systems.is_destroyed());
    }

    #[test]
    fn damage_never_drives_conditions_negative() {
        let mut systems = ShipSystems::new();
        let mut rng = SeededRandom::new(5);
        systems.damage_systems(1000.0, &mut rng);
        assert!(systems.is_destroyed());
        for s in ALL_SUBSYSTEMS {
            assert!(systems.operating_percentage(s) >= 0.0);
        }
    }

    #[test]
    fn repair_restores_worst_first_and_clamps_at_100() {
        let mut systems = ShipSystems::new();
        let mut rng = SeededRandom::new(5);
        systems.damage_systems(120.0, &mut rng);
        assert!(!systems.at_full_capacity());

        systems.repair_systems(10_000.0);
        assert!(systems.at_full_capacity());
        for s in ALL_SUBSYSTEMS {
            assert!(systems.operating_percentage(s) <= 100.0);
        }
    }

    #[test]
    fn total_damage_equals_total_condition_lost() {
        let mut systems = ShipSystems::new();
        let mut rng = SeededRandom::new(17);
        systems.damage_systems(55.0, &mut rng);
        let total: f32 = ALL_SUBSYSTEMS
            .iter()
            .map(|&s| systems.operating_percentage(s))
            .sum();
        assert!((total - 345.0).abs() < 1e-3);
    }
}
