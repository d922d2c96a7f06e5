//! Player ship controller.
//!
//! Input-to-action mapping, the subsystem degradation rolls, fuel/score/
//! lives bookkeeping, docking and repair at the home base, and the
//! death/respawn transition. The ship's spatial state lives in the shared
//! `Body` owned by the registry; everything else lives here.
//!
//! The ship's angle convention is opposite the other objects': forward is
//! `(-cos a, -sin a)`, matching the ship sprite's resting orientation.

use glam::Vec2;

use crate::collision::CollisionView;
use crate::entities::{Body, Layer};
use crate::input::PlayerInput;
use crate::physics::{elastic_bounce, normalize_angle, GameBounds};
use crate::powerup::{PowerupKind, PowerupState, StoredSlot};
use crate::random::SeededRandom;
use crate::services::{EventQueue, GameEvent, HudUpdate, Sound};
use crate::systems::{ShipSystems, Subsystem};

/// Which photon the fire key produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletState {
    Small,
    Spreadshot,
    Large,
}

/// Which way malfunctioning turn jets force the ship to rotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

/// Frames-since-event counters gating every periodic check. The key set is
/// fixed, so a plain struct beats a keyed map.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCounters {
    pub left: u32,
    pub right: u32,
    pub shooting: u32,
    pub repair: u32,
    pub death: u32,
    pub heal_from_spare_part: u32,
    pub taken_damage: u32,
    pub engine_check: u32,
    pub turn_jets_check: u32,
}

impl FrameCounters {
    /// Every counter advances once per tick, before any gating check reads it.
    pub fn tick_all(&mut self) {
        self.left += 1;
        self.right += 1;
        self.shooting += 1;
        self.repair += 1;
        self.death += 1;
        self.heal_from_spare_part += 1;
        self.taken_damage += 1;
        self.engine_check += 1;
        self.turn_jets_check += 1;
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
pub struct PlayerShip {
    pub fuel: f32,
    pub spare_parts: f32,
    pub lives: u32,
    pub score: u32,
    pub score_multiplier: u32,
    pub systems: ShipSystems,
    pub powerups: PowerupState,
    pub counters: FrameCounters,
    pub bullet_state: BulletState,
    /// Ticks between shots; powerups may lower it.
    pub bullet_shooting_speed: u32,
    pub engines_functioning: bool,
    pub turn_jets_functioning: bool,
    pub turn_jets_stuck_direction: TurnDirection,
    pub is_accelerating: bool,
    /// Set by the player-base collision handler, cleared at end of tick.
    pub at_base: bool,
    pub is_low_fuel: bool,
}

impl PlayerShip {
    pub const WIDTH: f32 = 42.0;
    pub const HEIGHT: f32 = 37.0;
    // A radius of 12 is a good balance between the wings sticking out and
    // the body taking up the whole circle.
    pub const COLLISION_RADIUS: f32 = 12.0;
    pub const MASS: f32 = 10.0;
    pub const MAX_SPEED: f32 = 12.0;
    pub const ACCELERATION: f32 = 0.1;
    /// Damage the ship deals to whatever it rams.
    pub const COLLISION_DAMAGE: f32 = 40.0;
    pub const MAX_FUEL: f32 = 1500.0;
    pub const LOW_FUEL_THRESHOLD: f32 = Self::MAX_FUEL / 5.0;
    pub const MAX_SPARE_PARTS: f32 = 100.0;
    /// One sprite-sheet frame of rotation.
    pub const ROTATION_AMOUNT: f32 = std::f32::consts::TAU / 32.0;
    pub const DEFAULT_SHOOTING_SPEED: u32 = 13;
    pub const PROJECTILE_SPEED: f32 = 10.0;
    /// Vertical offset so the ship centers on the base sprite when docked.
    pub const BASE_DOCKING_OFFSET: f32 = 3.0;
    pub const TURBO_THRUST_SPEED: f32 = 2.0 * Self::MAX_SPEED;
    /// A little drift is left over after the boost ends.
    pub const SPEED_AFTER_TURBO_THRUST: f32 = 1.0;
    pub const ENGINE_CHECK_PERIOD: u32 = 5;
    pub const TURN_JETS_CHECK_PERIOD: u32 = 60;
    pub const STARTING_LIVES: u32 = 3;

    pub fn new() -> Self {
        Self {
            fuel: Self::MAX_FUEL,
            spare_parts: Self::MAX_SPARE_PARTS,
            lives: Self::STARTING_LIVES,
            score: 0,
            score_multiplier: 1,
            systems: ShipSystems::new(),
            powerups: PowerupState::new(),
            counters: FrameCounters::default(),
            bullet_state: BulletState::Small,
            bullet_shooting_speed: Self::DEFAULT_SHOOTING_SPEED,
            engines_functioning: true,
            turn_jets_functioning: true,
            turn_jets_stuck_direction: TurnDirection::Left,
            is_accelerating: false,
            at_base: false,
            is_low_fuel: false,
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.powerups.is_active(PowerupKind::Invulnerability)
    }

    pub fn is_turbo_thrusting(&self) -> bool {
        self.powerups.is_active(PowerupKind::TurboThrust)
    }

    /// Forward direction; the ship's forces are opposite all other objects.
    fn forward(body: &Body) -> Vec2 {
        -body.heading()
    }

    fn projectile_velocity(body: &Body, angle_offset: f32) -> Vec2 {
        let a = body.angle + angle_offset;
        body.velocity + Vec2::new(-a.cos(), -a.sin()) * Self::PROJECTILE_SPEED
    }

    /// Per-tick input handling; runs before any entity movement so a bullet
    /// fired this tick can still collide this tick.
    #[allow(clippy::too_many_arguments)]
    pub fn process_input(
        &mut self,
        body: &mut Body,
        input: PlayerInput,
        bounds: &GameBounds,
        rng: &mut SeededRandom,
        events: &mut EventQueue,
    ) {
        self.is_accelerating = false;
        self.counters.tick_all();

        // Active effects run down, reverting when their duration elapses.
        for expired in self.powerups.tick_durations() {
            self.revert_powerup(expired, body);
        }

        if self.counters.engine_check > Self::ENGINE_CHECK_PERIOD {
            let engines = self.systems.operating_percentage(Subsystem::Engines);
            let failed = rng.next() < 0.95 * (100.0 - engines) / 100.0;
            self.engines_functioning = !failed;
            self.counters.engine_check = 0;
        }
        if input.thrust()
            && self.fuel > 0.0
            && !self.is_turbo_thrusting()
            && self.engines_functioning
        {
            self.is_accelerating = true;
            self.update_fuel(-1.0, events);
            let forward = Self::forward(body);
            body.accelerate(forward, Self::ACCELERATION, Self::MAX_SPEED);
        }

        if self.counters.turn_jets_check > Self::TURN_JETS_CHECK_PERIOD {
            let jets = self.systems.operating_percentage(Subsystem::TurnJets);
            let failed = rng.next() < 0.9 * (100.0 - jets) / 100.0;
            if failed && rng.next_bool(0.5) {
                // Re-randomize which way the stuck jets push (may match the
                // old direction, so roughly a 25% flip per failed check).
                self.turn_jets_stuck_direction = if rng.next_int(2) == 0 {
                    TurnDirection::Left
                } else {
                    TurnDirection::Right
                };
            }
            self.turn_jets_functioning = !failed;
            self.counters.turn_jets_check = 0;
        }

        let stuck_left = !self.turn_jets_functioning
            && self.turn_jets_stuck_direction == TurnDirection::Left;
        let should_turn_left = (self.turn_jets_functioning && input.left()) || stuck_left;
        if should_turn_left && self.counters.left >= 3 && !self.is_turbo_thrusting() {
            self.counters.left = 0;
            body.angle = normalize_angle(body.angle - Self::ROTATION_AMOUNT);
        }

        let stuck_right = !self.turn_jets_functioning
            && self.turn_jets_stuck_direction == TurnDirection::Right;
        let should_turn_right = (self.turn_jets_functioning && input.right()) || stuck_right;
        if should_turn_right && self.counters.right >= 3 && !self.is_turbo_thrusting() {
            self.counters.right = 0;
            body.angle = normalize_angle(body.angle + Self::ROTATION_AMOUNT);
        }

        if input.fire() && !self.at_base && !self.is_turbo_thrusting() {
            if self.counters.shooting >= self.bullet_shooting_speed {
                // Inoperable guns may refuse to fire, but the cadence counter
                // resets either way.
                let guns = self.systems.operating_percentage(Subsystem::Guns);
                let failed = rng.next() < 0.9 * (100.0 - guns) / 100.0;
                if !failed {
                    self.fire_photons(body, events);
                }
                self.counters.shooting = 0;
            }
        }

        if input.powerup_a() {
            self.activate_stored_powerup(StoredSlot::A, body, events);
        }
        if input.powerup_b() {
            self.activate_stored_powerup(StoredSlot::B, body, events);
        }

        // Self-destruct hotkey, at most once per second and never while docked.
        if input.kill() && self.counters.death > 60 && !self.at_base {
            self.die(body, bounds, rng, events);
        }
    }

    fn fire_photons(&mut self, body: &Body, events: &mut EventQueue) {
        let muzzle = body.position - body.heading() * body.collision_radius;
        let spawn = |events: &mut EventQueue, velocity: Vec2, damage: f32, size: f32| {
            events.push(GameEvent::SpawnProjectile {
                layer: Layer::PlayerProjectile,
                position: muzzle,
                velocity,
                damage,
                size,
            });
        };
        match self.bullet_state {
            BulletState::Small => {
                spawn(events, Self::projectile_velocity(body, 0.0), 10.0, 8.0);
                events.push(GameEvent::Sound(Sound::PhotonSmall));
            }
            BulletState::Large => {
                spawn(events, Self::projectile_velocity(body, 0.0), 25.0, 14.0);
                events.push(GameEvent::Sound(Sound::PhotonBig));
            }
            BulletState::Spreadshot => {
                let offset = std::f32::consts::PI / 16.0;
                spawn(events, Self::projectile_velocity(body, 0.0), 15.0, 10.0);
                spawn(events, Self::projectile_velocity(body, offset), 15.0, 10.0);
                spawn(events, Self::projectile_velocity(body, -offset), 15.0, 10.0);
                events.push(GameEvent::Sound(Sound::PhotonSpread));
            }
        }
    }

    /// Register a picked-up powerup: instants apply immediately, timed
    /// effects start their counters, stored kinds wait in their slot.
    pub fn obtain_powerup(&mut self, kind: PowerupKind, body: &mut Body, events: &mut EventQueue) {
        events.push(GameEvent::Sound(Sound::PowerupObtained));
        if let Some(slot) = kind.stored_slot() {
            self.powerups.store(kind, slot);
            return;
        }
        match kind {
            PowerupKind::ExtraFuel => self.update_fuel(500.0, events),
            PowerupKind::ShipRepairs => self.repair_ship(400.0),
            PowerupKind::SpareParts => self.update_spare_parts(20.0, events),
            timed => {
                if let Some(duration) = timed.duration() {
                    self.powerups.activate(timed, duration);
                    self.apply_powerup(timed, body);
                }
            }
        }
    }

    pub fn activate_stored_powerup(
        &mut self,
        slot: StoredSlot,
        body: &mut Body,
        _events: &mut EventQueue,
    ) {
        if let Some(kind) = self.powerups.take_stored(slot) {
            if let Some(duration) = kind.duration() {
                self.powerups.activate(kind, duration);
                self.apply_powerup(kind, body);
            }
        }
    }

    fn apply_powerup(&mut self, kind: PowerupKind, body: &mut Body) {
        match kind {
            PowerupKind::PhotonLarge => self.bullet_state = BulletState::Large,
            PowerupKind::SpreadShot => self.bullet_state = BulletState::Spreadshot,
            PowerupKind::DoublePoints => self.score_multiplier = 2,
            PowerupKind::TurboThrust => {
                body.velocity = Self::forward(body) * Self::TURBO_THRUST_SPEED;
            }
            // Invulnerability is queried straight off the active set.
            PowerupKind::Invulnerability
            | PowerupKind::ExtraFuel
            | PowerupKind::ShipRepairs
            | PowerupKind::SpareParts => {}
        }
    }

    fn revert_powerup(&mut self, kind: PowerupKind, body: &mut Body) {
        match kind {
            PowerupKind::PhotonLarge | PowerupKind::SpreadShot => {
                self.bullet_state = if self.powerups.is_active(PowerupKind::PhotonLarge) {
                    BulletState::Large
                } else if self.powerups.is_active(PowerupKind::SpreadShot) {
                    BulletState::Spreadshot
                } else {
                    BulletState::Small
                };
            }
            PowerupKind::DoublePoints => self.score_multiplier = 1,
            PowerupKind::TurboThrust => {
                // Leave a little drift after the boost.
                let speed = body.velocity.length();
                if speed > 0.0 {
                    body.velocity = body.velocity / speed * Self::SPEED_AFTER_TURBO_THRUST;
                }
            }
            PowerupKind::Invulnerability
            | PowerupKind::ExtraFuel
            | PowerupKind::ShipRepairs
            | PowerupKind::SpareParts => {}
        }
    }

    fn play_collision_sound(&self, other_layer: Layer, events: &mut EventQueue) {
        if other_layer == Layer::SludgerMine {
            // Mine hits make no collision sound; the pop covers it.
            return;
        }
        let sound = if self.is_invulnerable() {
            Sound::InvincibleCollision
        } else {
            Sound::CollisionGeneral
        };
        events.push(GameEvent::Sound(sound));
    }

    /// Gameplay reaction to a detected overlap. `other` is the frozen
    /// pre-collision view of the other party.
    pub fn handle_collision(
        &mut self,
        body: &mut Body,
        other: &CollisionView,
        bounds: &GameBounds,
        rng: &mut SeededRandom,
        events: &mut EventQueue,
    ) {
        if other.layer.is_enemy_projectile() {
            self.play_collision_sound(other.layer, events);
            if !self.is_invulnerable() {
                self.damage_ship(other.contact_damage, body, bounds, rng, events);
            }
        } else if other.layer == Layer::Asteroid || other.layer.is_enemy() {
            // Turbo thrust plows through enemies, but asteroids and the
            // enemy base still bounce you.
            if !self.is_turbo_thrusting()
                || other.layer == Layer::Asteroid
                || other.layer == Layer::EnemyBase
            {
                body.velocity = elastic_bounce(
                    body.position,
                    body.velocity,
                    body.mass,
                    other.position,
                    other.velocity,
                    other.mass,
                );
            }
            self.play_collision_sound(other.layer, events);
            if !self.is_invulnerable() {
                self.damage_ship(other.contact_damage, body, bounds, rng, events);
            }
        } else if other.layer == Layer::PlayerBase && !self.is_turbo_thrusting() {
            self.handle_base_contact(body, other, events);
        } else if let Some(kind) = PowerupKind::from_layer(other.layer) {
            events.push(GameEvent::RemoveObject(other.id));
            self.obtain_powerup(kind, body, events);
        }
    }

    fn handle_base_contact(&mut self, body: &mut Body, base: &CollisionView, events: &mut EventQueue) {
        self.at_base = true;
        let dock = Vec2::new(
            base.position.x,
            base.position.y - Self::BASE_DOCKING_OFFSET,
        );
        // Rounding error means "at the dock" is a threshold, not equality.
        let threshold = 0.5;
        let offset = dock - body.position;
        let at_dock = offset.x.abs() < threshold && offset.y.abs() < threshold;

        if body.velocity == Vec2::ZERO && at_dock {
            let needs_service = !self.systems.at_full_capacity() || self.fuel < Self::MAX_FUEL;
            if self.counters.repair >= 60 && needs_service {
                self.counters.repair = 0;
                events.push(GameEvent::Sound(Sound::BaseRepair));
                if !self.systems.at_full_capacity() {
                    self.repair_ship(12.0);
                }
                if self.fuel < Self::MAX_FUEL {
                    self.update_fuel(25.0, events);
                }
                if self.spare_parts < Self::MAX_SPARE_PARTS {
                    self.update_spare_parts(1.0, events);
                }
            }
        } else if !self.is_accelerating && !at_dock {
            // Pull the ship toward the dock point, damped harder the slower
            // it is already moving so it settles instead of oscillating.
            let mut correction = (body.velocity + offset) * 0.001;
            let minimum_correction = 0.08;
            let correction_mag = correction.length();
            if correction_mag < minimum_correction && correction_mag > 0.0 {
                correction *= minimum_correction / correction_mag;
            }

            let speed = body.velocity.length();
            let damping = if speed < 0.5 {
                0.90
            } else if speed < 0.6 {
                0.92
            } else if speed < 0.75 {
                0.94
            } else if speed < 1.0 {
                0.96
            } else if speed < 2.0 {
                0.98
            } else {
                0.99
            };

            body.velocity = (body.velocity + correction) * damping;
        } else if !self.is_accelerating && body.velocity != Vec2::ZERO {
            // Stationary-ish at the dock: decay residual velocity to zero.
            body.velocity /= 4.0;
            if body.velocity.length_squared() < 1e-10 {
                body.velocity = Vec2::ZERO;
            }
        }
    }

    pub fn add_to_score(&mut self, amount: u32, events: &mut EventQueue) {
        self.score += amount * self.score_multiplier;
        events.push(GameEvent::Hud(HudUpdate::Score(self.score)));
    }

    pub fn update_fuel(&mut self, change: f32, events: &mut EventQueue) {
        self.fuel = (self.fuel + change).clamp(0.0, Self::MAX_FUEL);
        events.push(GameEvent::Hud(HudUpdate::FuelBar(
            self.fuel / Self::MAX_FUEL * 100.0,
        )));
    }

    pub fn update_spare_parts(&mut self, change: f32, events: &mut EventQueue) {
        self.spare_parts = (self.spare_parts + change).clamp(0.0, Self::MAX_SPARE_PARTS);
        events.push(GameEvent::Hud(HudUpdate::SparePartsBar(
            self.spare_parts / Self::MAX_SPARE_PARTS * 100.0,
        )));
    }

    fn update_lives(&mut self, change: i32, events: &mut EventQueue) {
        self.lives = self.lives.saturating_add_signed(change);
        events.push(GameEvent::Hud(HudUpdate::Lives(self.lives)));
    }

    pub fn repair_ship(&mut self, amount: f32) {
        self.systems.repair_systems(amount);
    }

    pub fn damage_ship(
        &mut self,
        amount: f32,
        body: &mut Body,
        bounds: &GameBounds,
        rng: &mut SeededRandom,
        events: &mut EventQueue,
    ) {
        self.counters.taken_damage = 0;
        self.systems.damage_systems(amount, rng);
        if self.systems.is_destroyed() {
            self.die(body, bounds, rng, events);
        }
    }

    /// Death transition: reset spatial state, spend a life, and either end
    /// the session or respawn fully restored at a random spot.
    pub fn die(
        &mut self,
        body: &mut Body,
        bounds: &GameBounds,
        rng: &mut SeededRandom,
        events: &mut EventQueue,
    ) {
        events.push(GameEvent::Sound(Sound::PlayerDeath));
        body.velocity = Vec2::ZERO;
        body.angle = std::f32::consts::FRAC_PI_2;
        self.update_lives(-1, events);

        if self.lives == 0 {
            events.push(GameEvent::Message(
                format!(
                    "You scored {} points before the fringe took you",
                    self.score
                ),
                u32::MAX,
            ));
            events.push(GameEvent::EndSession);
            return;
        }

        let text = if self.lives == 1 {
            "1 life left".to_string()
        } else {
            format!("{} lives left", self.lives)
        };
        events.push(GameEvent::Message(text, 60 * 5));

        let respawn = Vec2::new(
            rng.next_range(bounds.left, bounds.right),
            rng.next_range(bounds.top, bounds.bottom),
        );
        events.push(GameEvent::RelocateShip(respawn));

        log::debug!("resetting ship to max operating percentages/fuel/spare parts");
        self.systems.reset();
        self.update_fuel(Self::MAX_FUEL, events);
        self.update_spare_parts(Self::MAX_SPARE_PARTS, events);

        // Active effects are lost on death; stored powerups are kept.
        for dropped in self.powerups.deactivate_all() {
            self.revert_powerup(dropped, body);
        }

        self.counters.reset_all();
        self.engines_functioning = true;
        self.turn_jets_functioning = true;
    }

    /// Per-tick state update, after movement and before collision detection.
    pub fn update_state(
        &mut self,
        body: &mut Body,
        enemies_remaining: u32,
        events: &mut EventQueue,
    ) {
        if enemies_remaining == 0 {
            events.push(GameEvent::Message(
                format!("You conquered the fringe with a score of {}", self.score),
                u32::MAX,
            ));
            body.velocity = Vec2::ZERO;
            events.push(GameEvent::RemoveShip);
            return;
        }

        // Low-fuel warning is edge triggered: once per threshold crossing.
        if self.fuel < Self::LOW_FUEL_THRESHOLD && !self.is_low_fuel {
            events.push(GameEvent::Sound(Sound::LowFuel));
            self.is_low_fuel = true;
        } else if self.fuel > Self::LOW_FUEL_THRESHOLD && self.is_low_fuel {
            self.is_low_fuel = false;
        }

        // Out in the field the crew patches the ship from spare parts, once
        // things have been calm for a couple of seconds.
        if !self.at_base
            && !self.systems.at_full_capacity()
            && self.spare_parts > 0.0
            && self.counters.heal_from_spare_part > 30
            && self.counters.taken_damage > 120
        {
            self.counters.heal_from_spare_part = 0;
            self.update_spare_parts(-1.0, events);
            self.repair_ship(2.0);
        }

        // Re-evaluated fresh by the base collision handler next tick.
        if self.at_base {
            self.at_base = false;
        }
    }
}

impl Default for PlayerShip {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityId;

    fn rig() -> (PlayerShip, Body, GameBounds, SeededRandom, EventQueue) {
        let body = Body::new(Vec2::ZERO, Vec2::ZERO, std::f32::consts::FRAC_PI_2)
            .with_size(PlayerShip::WIDTH, PlayerShip::HEIGHT, PlayerShip::COLLISION_RADIUS)
            .with_mass(PlayerShip::MASS);
        (
            PlayerShip::new(),
            body,
            GameBounds::default(),
            SeededRandom::new(42),
            EventQueue::new(),
        )
    }

    fn base_view() -> CollisionView {
        CollisionView {
            id: EntityId(99),
            layer: Layer::PlayerBase,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: 1000.0,
            collision_radius: 40.0,
            contact_damage: 0.0,
        }
    }

    fn spawn_count(events: &EventQueue) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::SpawnProjectile { .. }))
            .count()
    }

    #[test]
    fn thrust_drains_fuel_to_empty_and_caps_speed() {
        let (mut ship, mut body, bounds, mut rng, mut events) = rig();
        let input = PlayerInput::from_bits(PlayerInput::THRUST);
        for _ in 0..1600 {
            ship.process_input(&mut body, input, &bounds, &mut rng, &mut events);
        }
        // Full systems never fail their rolls, so exactly one unit per tick
        // until the tank runs dry at 1500.
        assert_eq!(ship.fuel, 0.0);
        assert!(!ship.is_accelerating);
        assert!(body.velocity.length() <= PlayerShip::MAX_SPEED + 1e-4);
        assert!(body.velocity.length() > 0.0);
    }

    #[test]
    fn kill_key_needs_a_full_second_of_cooldown() {
        let (mut ship, mut body, bounds, mut rng, mut events) = rig();
        let input = PlayerInput::from_bits(PlayerInput::KILL);
        for _ in 0..60 {
            ship.process_input(&mut body, input, &bounds, &mut rng, &mut events);
        }
        assert_eq!(ship.lives, PlayerShip::STARTING_LIVES);

        ship.process_input(&mut body, input, &bounds, &mut rng, &mut events);
        assert_eq!(ship.lives, PlayerShip::STARTING_LIVES - 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::RelocateShip(_))));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::Message(text, _) if text == "2 lives left")));
    }

    #[test]
    fn respawn_restores_everything_but_keeps_stored_powerups() {
        let (mut ship, mut body, bounds, mut rng, mut events) = rig();
        ship.powerups.store(PowerupKind::Invulnerability, StoredSlot::A);
        ship.powerups.activate(PowerupKind::DoublePoints, 500);
        ship.score_multiplier = 2;
        ship.fuel = 3.0;
        ship.systems.damage_systems(150.0, &mut rng);
        body.velocity = Vec2::new(5.0, -3.0);

        ship.die(&mut body, &bounds, &mut rng, &mut events);

        assert_eq!(ship.lives, 2);
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(body.angle, std::f32::consts::FRAC_PI_2);
        assert_eq!(ship.fuel, PlayerShip::MAX_FUEL);
        assert!(ship.systems.at_full_capacity());
        assert_eq!(ship.score_multiplier, 1);
        assert!(!ship.powerups.is_active(PowerupKind::DoublePoints));
        assert_eq!(
            ship.powerups.stored(StoredSlot::A),
            Some(PowerupKind::Invulnerability)
        );
        if let Some(GameEvent::RelocateShip(position)) = events
            .iter()
            .find(|e| matches!(e, GameEvent::RelocateShip(_)))
        {
            assert!(bounds.contains(*position));
        } else {
            panic!("no relocation queued");
        }
    }

    #[test]
    fn last_death_ends_the_session() {
        let (mut ship, mut body, bounds, mut rng, mut events) = rig();
        ship.lives = 1;
        ship.die(&mut body, &bounds, &mut rng, &mut events);
        assert_eq!(ship.lives, 0);
        assert!(events.iter().any(|e| matches!(e, GameEvent::EndSession)));
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::RelocateShip(_))));
    }

    #[test]
    fn fuel_and_spare_parts_are_clamped() {
        let (mut ship, _body, _bounds, _rng, mut events) = rig();
        ship.update_fuel(10_000.0, &mut events);
        assert_eq!(ship.fuel, PlayerShip::MAX_FUEL);
        ship.update_spare_parts(-10_000.0, &mut events);
        assert_eq!(ship.spare_parts, 0.0);
        ship.update_fuel(-10_000.0, &mut events);
        assert_eq!(ship.fuel, 0.0);
    }

    #[test]
    fn docked_ship_is_serviced_once_a_second() {
        let (mut ship, mut body, bounds, mut rng, mut events) = rig();
        ship.systems.damage_systems(30.0, &mut rng);
        ship.fuel = 1000.0;
        // Parked exactly at the dock point below the base center.
        body.position = Vec2::new(0.0, -PlayerShip::BASE_DOCKING_OFFSET);
        body.velocity = Vec2::ZERO;
        ship.counters.repair = 60;

        ship.handle_collision(&mut body, &base_view(), &bounds, &mut rng, &mut events);

        assert!(ship.at_base);
        assert_eq!(ship.counters.repair, 0);
        assert_eq!(ship.fuel, 1025.0);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::Sound(Sound::BaseRepair))));

        // Too soon for the next service pulse.
        events.clear();
        ship.handle_collision(&mut body, &base_view(), &bounds, &mut rng, &mut events);
        assert_eq!(ship.fuel, 1025.0);
        assert!(events.is_empty());
    }

    #[test]
    fn drifting_near_the_base_gets_damped_toward_the_dock() {
        let (mut ship, mut body, bounds, mut rng, mut events) = rig();
        body.position = Vec2::new(20.0, 10.0);
        body.velocity = Vec2::new(3.0, 0.0);
        let speed_before = body.velocity.length();

        ship.handle_collision(&mut body, &base_view(), &bounds, &mut rng, &mut events);

        assert!(ship.at_base);
        assert!(body.velocity.length() < speed_before);
    }

    #[test]
    fn spreadshot_fires_three_photons() {
        let (mut ship, mut body, bounds, mut rng, mut events) = rig();
        ship.bullet_state = BulletState::Spreadshot;
        ship.counters.shooting = PlayerShip::DEFAULT_SHOOTING_SPEED;
        let input = PlayerInput::from_bits(PlayerInput::FIRE);

        ship.process_input(&mut body, input, &bounds, &mut rng, &mut events);

        assert_eq!(spawn_count(&events), 3);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::Sound(Sound::PhotonSpread))));
        assert_eq!(ship.counters.shooting, 0);
    }

    #[test]
    fn turbo_thrust_locks_out_guns_and_turning() {
        let (mut ship, mut body, bounds, mut rng, mut events) = rig();
        ship.powerups.store(PowerupKind::TurboThrust, StoredSlot::B);
        ship.activate_stored_powerup(StoredSlot::B, &mut body, &mut events);
        assert!(ship.is_turbo_thrusting());
        assert!((body.velocity.length() - PlayerShip::TURBO_THRUST_SPEED).abs() < 1e-4);

        let angle_before = body.angle;
        ship.counters.shooting = PlayerShip::DEFAULT_SHOOTING_SPEED;
        ship.counters.left = 10;
        let input = PlayerInput::from_bits(PlayerInput::FIRE | PlayerInput::LEFT);
        ship.process_input(&mut body, input, &bounds, &mut rng, &mut events);

        assert_eq!(spawn_count(&events), 0);
        assert_eq!(body.angle, angle_before);
    }

    #[test]
    fn turbo_expiry_leaves_a_drift() {
        let (mut ship, mut body, bounds, mut rng, mut events) = rig();
        ship.powerups.store(PowerupKind::TurboThrust, StoredSlot::B);
        ship.activate_stored_powerup(StoredSlot::B, &mut body, &mut events);

        let input = PlayerInput::new();
        for _ in 0..PowerupKind::TurboThrust.duration().unwrap() {
            ship.process_input(&mut body, input, &bounds, &mut rng, &mut events);
        }
        assert!(!ship.is_turbo_thrusting());
        assert!((body.velocity.length() - PlayerShip::SPEED_AFTER_TURBO_THRUST).abs() < 1e-4);
    }

    #[test]
    fn low_fuel_warning_fires_once_per_crossing() {
        let (mut ship, mut body, _bounds, _rng, mut events) = rig();
        ship.fuel = PlayerShip::LOW_FUEL_THRESHOLD - 1.0;
        ship.update_state(&mut body, 5, &mut events);
        ship.update_state(&mut body, 5, &mut events);
        let warnings = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Sound(Sound::LowFuel)))
            .count();
        assert_eq!(warnings, 1);

        // Refueling re-arms the warning.
        ship.update_fuel(PlayerShip::MAX_FUEL, &mut events);
        ship.update_state(&mut body, 5, &mut events);
        assert!(!ship.is_low_fuel);
    }

    #[test]
    fn clearing_the_fringe_removes_the_ship() {
        let (mut ship, mut body, _bounds, _rng, mut events) = rig();
        ship.score = 1234;
        ship.update_state(&mut body, 0, &mut events);
        assert!(events.iter().any(|e| matches!(e, GameEvent::RemoveShip)));
        assert!(events.iter().any(
            |e| matches!(e, GameEvent::Message(text, _) if text.contains("conquered the fringe"))
        ));
    }

    #[test]
    fn crew_patches_systems_from_spare_parts_when_calm() {
        let (mut ship, mut body, _bounds, mut rng, mut events) = rig();
        ship.systems.damage_systems(10.0, &mut rng);
        ship.counters.heal_from_spare_part = 31;
        ship.counters.taken_damage = 121;

        ship.update_state(&mut body, 5, &mut events);

        assert_eq!(ship.spare_parts, PlayerShip::MAX_SPARE_PARTS - 1.0);
        assert_eq!(ship.counters.heal_from_spare_part, 0);
    }

    #[test]
    fn instant_powerups_apply_on_pickup() {
        let (mut ship, mut body, _bounds, _rng, mut events) = rig();
        ship.fuel = 100.0;
        ship.obtain_powerup(PowerupKind::ExtraFuel, &mut body, &mut events);
        assert_eq!(ship.fuel, 600.0);

        ship.spare_parts = 50.0;
        ship.obtain_powerup(PowerupKind::SpareParts, &mut body, &mut events);
        assert_eq!(ship.spare_parts, 70.0);
    }

    #[test]
    fn double_points_doubles_scoring_until_expiry() {
        let (mut ship, mut body, _bounds, _rng, mut events) = rig();
        ship.obtain_powerup(PowerupKind::DoublePoints, &mut body, &mut events);
        ship.add_to_score(10, &mut events);
        assert_eq!(ship.score, 20);

        for _ in 0..PowerupKind::DoublePoints.duration().unwrap() {
            ship.powerups.tick_durations().into_iter().for_each(|k| {
                ship.revert_powerup(k, &mut body);
            });
        }
        ship.add_to_score(10, &mut events);
        assert_eq!(ship.score, 30);
    }
}
