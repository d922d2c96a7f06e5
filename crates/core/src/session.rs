//! One playthrough of the fringe, from first tick to game over.
//!
//! The session owns every piece of simulation state (registry, RNG, clock,
//! config) so two sessions never share anything and a headless session is
//! just a session nobody renders. The camera convention keeps the ship's
//! world position fixed; everything else shifts past it by the ship's
//! velocity each tick.
//!
//! Cross-entity effects raised during a pass land in an event queue and are
//! applied at the end of the tick, once no entity borrows remain.

use glam::Vec2;

use crate::clock::GameClock;
use crate::collision::detect_collisions;
use crate::config::GameConfig;
use crate::entities::{EntityId, GameObject, Layer, ObjectKind, UpdateContext};
use crate::input::PlayerInput;
use crate::physics::GameBounds;
use crate::player::PlayerShip;
use crate::powerup::{PowerupKind, StoredSlot};
use crate::random::SeededRandom;
use crate::registry::ObjectRegistry;
use crate::services::{EventQueue, GameEvent, GameServices, HudUpdate, Sound};

const STAR_COUNT: usize = 600;
const SMALL_ASTEROID_COUNT: usize = 6;
const LARGE_ASTEROID_COUNT: usize = 3;
const SLUDGER_COUNT: usize = 4;
const PUFFER_COUNT: usize = 4;
const SLICER_COUNT: usize = 2;
const QUAD_BLASTER_COUNT: usize = 5;
const MINE_COUNT: usize = 3;

/// Keep hostiles and rocks from spawning on top of the home base.
const HOSTILE_CLEARANCE: f32 = 600.0;
const POWERUP_CLEARANCE: f32 = 300.0;

pub struct Session {
    config: GameConfig,
    bounds: GameBounds,
    registry: ObjectRegistry,
    rng: SeededRandom,
    clock: GameClock,
    events: EventQueue,
    ship_id: Option<EntityId>,
    step_key_was_down: bool,
    game_over: bool,
}

impl Session {
    pub fn new(config: GameConfig, seed: u32, now_ms: f64) -> Self {
        let bounds = GameBounds::default();
        let mut rng = SeededRandom::new(seed);
        let mut registry = ObjectRegistry::new();
        let mut events = EventQueue::new();

        for _ in 0..STAR_COUNT {
            let position = scatter(&mut rng, &bounds, 0.0);
            let id = registry.next_id();
            registry.add_object(GameObject::star(id, position, &mut rng), false);
        }

        let base_id = registry.next_id();
        registry.add_object(GameObject::player_base(base_id, Vec2::ZERO), true);

        // Half a world away from home on both axes, which on a torus is as
        // far as it gets.
        let enemy_base_position = Vec2::new(bounds.right, bounds.bottom);
        let enemy_base_id = registry.next_id();
        registry.add_object(GameObject::enemy_base(enemy_base_id, enemy_base_position), true);

        for _ in 0..SMALL_ASTEROID_COUNT {
            let position = scatter(&mut rng, &bounds, HOSTILE_CLEARANCE);
            let velocity = drift(&mut rng, 1.5);
            let id = registry.next_id();
            registry.add_object(GameObject::small_asteroid(id, position, velocity), true);
        }
        for _ in 0..LARGE_ASTEROID_COUNT {
            let position = scatter(&mut rng, &bounds, HOSTILE_CLEARANCE);
            let velocity = drift(&mut rng, 1.0);
            let id = registry.next_id();
            registry.add_object(GameObject::large_asteroid(id, position, velocity), true);
        }

        let roster = [
            (Layer::Sludger, SLUDGER_COUNT),
            (Layer::Puffer, PUFFER_COUNT),
            (Layer::Slicer, SLICER_COUNT),
            (Layer::QuadBlaster, QUAD_BLASTER_COUNT),
        ];
        for (layer, count) in roster {
            for _ in 0..count {
                let position = scatter(&mut rng, &bounds, HOSTILE_CLEARANCE);
                let velocity = drift(&mut rng, 1.0);
                let id = registry.next_id();
                registry.add_object(GameObject::enemy_ship(id, layer, position, velocity), true);
            }
        }
        for _ in 0..MINE_COUNT {
            let position = scatter(&mut rng, &bounds, HOSTILE_CLEARANCE);
            let id = registry.next_id();
            registry.add_object(GameObject::mine(id, position, Vec2::ZERO), true);
        }

        for kind in [
            PowerupKind::PhotonLarge,
            PowerupKind::SpreadShot,
            PowerupKind::DoublePoints,
            PowerupKind::ExtraFuel,
            PowerupKind::ShipRepairs,
            PowerupKind::SpareParts,
            PowerupKind::Invulnerability,
            PowerupKind::TurboThrust,
        ] {
            let position = scatter(&mut rng, &bounds, POWERUP_CLEARANCE);
            let id = registry.next_id();
            registry.add_object(GameObject::powerup(id, kind, position), true);
        }

        // The ship starts docked with one of each stored powerup on board,
        // and joins the registry last so it draws on top of everything.
        let mut ship = PlayerShip::new();
        ship.powerups.store(PowerupKind::Invulnerability, StoredSlot::A);
        ship.powerups.store(PowerupKind::TurboThrust, StoredSlot::B);
        let dock = Vec2::new(0.0, -PlayerShip::BASE_DOCKING_OFFSET);
        let ship_id = registry.next_id();
        registry.add_object(GameObject::player(ship_id, dock, Vec2::ZERO, ship), true);

        events.push(GameEvent::Sound(Sound::StartUp));
        events.push(GameEvent::Hud(HudUpdate::Score(0)));
        events.push(GameEvent::Hud(HudUpdate::Lives(PlayerShip::STARTING_LIVES)));
        events.push(GameEvent::Hud(HudUpdate::FuelBar(100.0)));
        events.push(GameEvent::Hud(HudUpdate::SparePartsBar(100.0)));

        Self {
            config,
            bounds,
            registry,
            rng,
            clock: GameClock::new(now_ms),
            events,
            ship_id: Some(ship_id),
            step_key_was_down: false,
            game_over: false,
        }
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }

    pub fn bounds(&self) -> &GameBounds {
        &self.bounds
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ship_id(&self) -> Option<EntityId> {
        self.ship_id
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn ship(&self) -> Option<&PlayerShip> {
        let object = self.registry.get(self.ship_id?)?;
        match &object.kind {
            ObjectKind::Player(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn ship_mut(&mut self) -> Option<&mut PlayerShip> {
        let object = self.registry.get_mut(self.ship_id?)?;
        match &mut object.kind {
            ObjectKind::Player(ship) => Some(ship),
            _ => None,
        }
    }

    /// Enemies left to clear, not counting their base (it cannot be
    /// destroyed, so it never blocks victory).
    pub fn enemies_remaining(&self) -> u32 {
        self.registry
            .iter()
            .filter(|o| o.layer.is_enemy() && o.layer != Layer::EnemyBase)
            .count() as u32
    }

    /// One real-time frame: pause handling plus however many fixed ticks
    /// are due. Returns whether anything changed (the client re-renders).
    pub fn frame(
        &mut self,
        now_ms: f64,
        input: PlayerInput,
        services: &mut impl GameServices,
    ) -> bool {
        self.clock.handle_pause_key(input.pause(), now_ms);

        if self.clock.is_paused() {
            let step_edge = input.step() && !self.step_key_was_down;
            self.step_key_was_down = input.step();
            if step_edge && self.config.debug {
                let mut clock = self.clock.clone();
                let stepped = clock.step_one(true, || self.tick(input, services));
                self.clock = clock;
                return stepped;
            }
            return false;
        }
        self.step_key_was_down = input.step();

        // tick() never touches the clock, so it is safe to advance a copy
        // and put it back.
        let mut clock = self.clock.clone();
        let ran = clock.advance(now_ms, || self.tick(input, services));
        self.clock = clock;
        if self.game_over {
            self.clock.stop();
        }
        ran > 0
    }

    /// One fixed simulation tick.
    pub fn tick(&mut self, input: PlayerInput, services: &mut impl GameServices) {
        if self.game_over {
            return;
        }

        // 1. Player input.
        let mut ship_velocity = Vec2::ZERO;
        let mut ship_position = None;
        if let Some(id) = self.ship_id {
            if let Some(object) = self.registry.get_mut(id) {
                if let ObjectKind::Player(ship) = &mut object.kind {
                    ship.process_input(
                        &mut object.body,
                        input,
                        &self.bounds,
                        &mut self.rng,
                        &mut self.events,
                    );
                }
                ship_velocity = object.body.velocity;
                ship_position = Some(object.body.position);
            }
        }

        // 2. Camera shift: the world moves opposite the ship.
        let snapshot = self.registry.id_snapshot();
        for &id in &snapshot {
            if Some(id) == self.ship_id {
                continue;
            }
            if let Some(object) = self.registry.get_mut(id) {
                object.body.position = self.bounds.wrap(object.body.position - ship_velocity);
            }
        }

        // 3. Per-entity state updates over an id snapshot, so handlers can
        // spawn or expire entities mid-pass.
        for &id in &snapshot {
            if Some(id) == self.ship_id {
                continue;
            }
            let Some(object) = self.registry.get_mut(id) else {
                continue;
            };
            let mut ctx = UpdateContext {
                bounds: &self.bounds,
                ship_position,
                rng: &mut self.rng,
                events: &mut self.events,
            };
            if !object.update_state(&mut ctx) {
                self.registry.remove_object(id);
            }
        }

        let enemies = self.enemies_remaining();
        if let Some(id) = self.ship_id {
            if let Some(object) = self.registry.get_mut(id) {
                if let ObjectKind::Player(ship) = &mut object.kind {
                    ship.update_state(&mut object.body, enemies, &mut self.events);
                }
            }
        }

        // Queued photons join the world before the collision pass, so a
        // bullet fired this tick can still collide this tick.
        self.flush_spawned_projectiles();

        // 4. Collisions, against frozen pre-collision views.
        detect_collisions(
            &mut self.registry,
            &self.bounds,
            &mut self.rng,
            &mut self.events,
        );

        // 5. Apply everything the passes queued up.
        self.apply_events(services);
    }

    fn apply_events(&mut self, services: &mut impl GameServices) {
        let queued = std::mem::take(&mut self.events);
        let mut followups = EventQueue::new();
        for event in queued {
            match event {
                GameEvent::Sound(sound) => services.play_sound(sound),
                GameEvent::Hud(update) => services.hud(update),
                GameEvent::Message(text, ticks) => services.display_message(&text, ticks),
                GameEvent::SpawnProjectile {
                    layer,
                    position,
                    velocity,
                    damage,
                    size,
                } => {
                    let id = self.registry.next_id();
                    let projectile =
                        GameObject::projectile(id, layer, position, velocity, damage, size);
                    self.registry.add_object(projectile, true);
                }
                GameEvent::AwardPoints(points) => {
                    if let Some(ship) = self.ship_mut() {
                        ship.add_to_score(points, &mut followups);
                    }
                }
                GameEvent::RemoveObject(id) => self.registry.remove_object(id),
                GameEvent::RelocateShip(target) => self.relocate_ship(target),
                GameEvent::RemoveShip => {
                    if let Some(id) = self.ship_id.take() {
                        self.registry.remove_object(id);
                    }
                }
                GameEvent::EndSession => self.end_session(),
            }
        }
        // Scoring raises only HUD pushes, so one extra level suffices.
        for event in followups {
            if let GameEvent::Hud(update) = event {
                services.hud(update);
            }
        }
    }

    /// Move queued `SpawnProjectile` events into the registry, leaving the
    /// rest of the queue for `apply_events`.
    fn flush_spawned_projectiles(&mut self) {
        let queued = std::mem::take(&mut self.events);
        for event in queued {
            match event {
                GameEvent::SpawnProjectile {
                    layer,
                    position,
                    velocity,
                    damage,
                    size,
                } => {
                    let id = self.registry.next_id();
                    let projectile =
                        GameObject::projectile(id, layer, position, velocity, damage, size);
                    self.registry.add_object(projectile, true);
                }
                other => self.events.push(other),
            }
        }
    }

    /// Terminal: remove the ship and stop ticking for good.
    pub fn end_session(&mut self) {
        if let Some(id) = self.ship_id.take() {
            self.registry.remove_object(id);
        }
        self.game_over = true;
        log::info!("session over");
    }

    /// Move the ship to a world position by shifting everything else the
    /// opposite way; the ship's own coordinates stay fixed.
    fn relocate_ship(&mut self, target: Vec2) {
        let Some(ship_id) = self.ship_id else {
            return;
        };
        let Some(ship_position) = self.registry.get(ship_id).map(|o| o.body.position) else {
            return;
        };
        let shift = ship_position - target;
        let snapshot = self.registry.id_snapshot();
        for id in snapshot {
            if id == ship_id {
                continue;
            }
            if let Some(object) = self.registry.get_mut(id) {
                object.body.position = self.bounds.wrap(object.body.position + shift);
            }
        }
    }
}

fn scatter(rng: &mut SeededRandom, bounds: &GameBounds, clearance: f32) -> Vec2 {
    loop {
        let position = Vec2::new(
            rng.next_range(bounds.left, bounds.right),
            rng.next_range(bounds.top, bounds.bottom),
        );
        if position.length() >= clearance {
            return position;
        }
    }
}

fn drift(rng: &mut SeededRandom, max_component: f32) -> Vec2 {
    Vec2::new(
        rng.next_range(-max_component, max_component),
        rng.next_range(-max_component, max_component),
    )
}
