//! Entity types for the simulation.
//!
//! A single `GameObject` struct carries the spatial state shared by every
//! entity; per-category behavior and data hang off the `ObjectKind` tagged
//! variant. Storage is array-based for deterministic iteration order.

use glam::Vec2;

use crate::physics::{normalize_angle, GameBounds};
use crate::player::PlayerShip;
use crate::powerup::PowerupKind;
use crate::random::SeededRandom;
use crate::services::{EventQueue, GameEvent};

/// Enemies hold their fire until the ship is this close.
const ENEMY_FIRING_RANGE: f32 = 900.0;

/// Unique identifier for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// Manages entity ID generation.
#[derive(Debug, Clone, Default)]
pub struct EntityIdGenerator {
    next_id: u32,
}

impl EntityIdGenerator {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn next(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Object category, the sole key for collision eligibility, enemy/powerup
/// aggregate queries and radar coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Player,
    PlayerProjectile,
    PlayerBase,
    EnemyBase,
    Asteroid,
    Sludger,
    SludgerMine,
    Puffer,
    PufferProjectile,
    Slicer,
    QuadBlaster,
    QuadBlasterProjectile,
    PhotonLargePowerup,
    SpreadShotPowerup,
    DoublePointsPowerup,
    ExtraFuelPowerup,
    ShipRepairsPowerup,
    SparePartsPowerup,
    InvulnerabilityPowerup,
    TurboThrustPowerup,
    Star,
}

impl Layer {
    /// Whether this layer counts as "enemy" for aggregate queries. Note the
    /// enemy base is an enemy layer; `Session::enemies_remaining` excludes
    /// it separately.
    pub fn is_enemy(self) -> bool {
        matches!(
            self,
            Layer::Sludger
                | Layer::SludgerMine
                | Layer::Puffer
                | Layer::Slicer
                | Layer::QuadBlaster
                | Layer::EnemyBase
        )
    }

    pub fn is_enemy_projectile(self) -> bool {
        matches!(self, Layer::PufferProjectile | Layer::QuadBlasterProjectile)
    }

    pub fn is_powerup(self) -> bool {
        matches!(
            self,
            Layer::PhotonLargePowerup
                | Layer::SpreadShotPowerup
                | Layer::DoublePointsPowerup
                | Layer::ExtraFuelPowerup
                | Layer::ShipRepairsPowerup
                | Layer::SparePartsPowerup
                | Layer::InvulnerabilityPowerup
                | Layer::TurboThrustPowerup
        )
    }
}

/// Spatial state shared by every entity.
#[derive(Debug, Clone)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Orientation in radians, kept in (-PI, PI].
    pub angle: f32,
    pub width: f32,
    pub height: f32,
    pub collision_radius: f32,
    pub mass: f32,
}

impl Body {
    pub fn new(position: Vec2, velocity: Vec2, angle: f32) -> Self {
        Self {
            position,
            velocity,
            angle,
            width: 0.0,
            height: 0.0,
            collision_radius: 0.0,
            mass: 1.0,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32, collision_radius: f32) -> Self {
        self.width = width;
        self.height = height;
        self.collision_radius = collision_radius;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Unit vector along the body's heading.
    pub fn heading(&self) -> Vec2 {
        Vec2::new(self.angle.cos(), self.angle.sin())
    }

    /// Accelerate along the heading, capping speed.
    pub fn accelerate(&mut self, direction: Vec2, amount: f32, max_speed: f32) {
        self.velocity += direction * amount;
        let speed_sq = self.velocity.length_squared();
        if speed_sq > max_speed * max_speed {
            self.velocity = self.velocity / speed_sq.sqrt() * max_speed;
        }
    }
}

/// Decorative star twinkle state (non-collidable background).
#[derive(Debug, Clone)]
pub struct StarState {
    pub color: (u8, u8, u8),
    pub lit: bool,
    pub ticks_until_toggle: u32,
}

impl StarState {
    pub const TWINKLE_MIN_TICKS: u32 = 12;
    pub const TWINKLE_MAX_TICKS: u32 = 60;

    pub fn twinkle_duration(rng: &mut SeededRandom) -> u32 {
        Self::TWINKLE_MIN_TICKS
            + rng.next_int(Self::TWINKLE_MAX_TICKS - Self::TWINKLE_MIN_TICKS + 1)
    }
}

/// A destructible enemy: plain drifters and the player-seeking mine both
/// carry health, a score value and contact damage.
#[derive(Debug, Clone)]
pub struct EnemyState {
    pub health: f32,
    pub points: u32,
    pub collision_damage: f32,
    /// Ticks between shots; 0 for enemies that never fire.
    pub fire_period: u32,
    pub fire_counter: u32,
}

/// Mine steering parameters.
#[derive(Debug, Clone)]
pub struct MineState {
    pub enemy: EnemyState,
    pub turn_ability: f32,
    pub max_speed: f32,
    pub acceleration: f32,
}

#[derive(Debug, Clone)]
pub struct ProjectileState {
    pub damage: f32,
    pub ticks_remaining: u32,
}

/// Per-category behavior and data.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Star(StarState),
    /// Indestructible drifting rock; contact damage scales with size.
    Asteroid { collision_damage: f32 },
    EnemyShip(EnemyState),
    Mine(MineState),
    Projectile(ProjectileState),
    Powerup(PowerupKind),
    PlayerBase,
    EnemyBase { collision_damage: f32 },
    Player(Box<PlayerShip>),
}

/// A world entity: shared spatial state plus category-specific behavior.
#[derive(Debug, Clone)]
pub struct GameObject {
    pub id: EntityId,
    pub layer: Layer,
    pub body: Body,
    pub kind: ObjectKind,
}

/// Everything a per-tick state update may consult or raise.
pub struct UpdateContext<'a> {
    pub bounds: &'a GameBounds,
    /// Player position, if the ship is still in the world (mines seek it,
    /// shooters aim at it).
    pub ship_position: Option<Vec2>,
    pub rng: &'a mut SeededRandom,
    pub events: &'a mut EventQueue,
}

impl GameObject {
    pub fn star(id: EntityId, position: Vec2, rng: &mut SeededRandom) -> Self {
        let color = (
            rng.next_int(256) as u8,
            rng.next_int(256) as u8,
            rng.next_int(256) as u8,
        );
        Self {
            id,
            layer: Layer::Star,
            body: Body::new(position, Vec2::ZERO, 0.0).with_size(1.0, 1.0, 0.0),
            kind: ObjectKind::Star(StarState {
                color,
                lit: true,
                ticks_until_toggle: StarState::twinkle_duration(rng),
            }),
        }
    }

    pub fn small_asteroid(id: EntityId, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            layer: Layer::Asteroid,
            body: Body::new(position, velocity, 0.0)
                .with_size(30.0, 30.0, 14.0)
                .with_mass(6.0),
            kind: ObjectKind::Asteroid {
                collision_damage: 20.0,
            },
        }
    }

    pub fn large_asteroid(id: EntityId, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            layer: Layer::Asteroid,
            body: Body::new(position, velocity, 0.0)
                .with_size(60.0, 60.0, 28.0)
                .with_mass(20.0),
            kind: ObjectKind::Asteroid {
                collision_damage: 40.0,
            },
        }
    }

    pub fn enemy_ship(id: EntityId, layer: Layer, position: Vec2, velocity: Vec2) -> Self {
        let (width, height, radius, mass, health, points, collision_damage, fire_period) =
            match layer {
                Layer::Sludger => (40.0, 34.0, 16.0, 8.0, 30.0, 10, 40.0, 0),
                Layer::Puffer => (48.0, 40.0, 18.0, 8.0, 40.0, 20, 30.0, 150),
                Layer::Slicer => (36.0, 30.0, 15.0, 6.0, 25.0, 30, 50.0, 0),
                Layer::QuadBlaster => (44.0, 44.0, 20.0, 9.0, 35.0, 15, 30.0, 110),
                other => {
                    // Unknown enemy layers degrade to a generic drifter.
                    log::error!("enemy_ship constructed with non-enemy layer {other:?}");
                    (40.0, 40.0, 16.0, 8.0, 30.0, 10, 30.0, 0)
                }
            };
        Self {
            id,
            layer,
            body: Body::new(position, velocity, 0.0)
                .with_size(width, height, radius)
                .with_mass(mass),
            kind: ObjectKind::EnemyShip(EnemyState {
                health,
                points,
                collision_damage,
                fire_period,
                fire_counter: 0,
            }),
        }
    }

    /// The player-seeking sludger mine.
    pub fn mine(id: EntityId, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            layer: Layer::SludgerMine,
            body: Body::new(position, velocity, 0.0)
                .with_size(24.0, 21.0, 11.0)
                .with_mass(4.0),
            kind: ObjectKind::Mine(MineState {
                enemy: EnemyState {
                    health: 20.0,
                    points: 2,
                    collision_damage: 20.0,
                    fire_period: 0,
                    fire_counter: 0,
                },
                turn_ability: 0.09,
                max_speed: 4.0,
                acceleration: 0.1,
            }),
        }
    }

    pub fn projectile(
        id: EntityId,
        layer: Layer,
        position: Vec2,
        velocity: Vec2,
        damage: f32,
        size: f32,
    ) -> Self {
        Self {
            id,
            layer,
            body: Body::new(position, velocity, 0.0)
                .with_size(size, size, size / 2.0)
                .with_mass(1.0),
            kind: ObjectKind::Projectile(ProjectileState {
                damage,
                ticks_remaining: 90,
            }),
        }
    }

    pub fn powerup(id: EntityId, kind: PowerupKind, position: Vec2) -> Self {
        Self {
            id,
            layer: kind.layer(),
            body: Body::new(position, Vec2::ZERO, 0.0)
                .with_size(28.0, 28.0, 12.0)
                .with_mass(2.0),
            kind: ObjectKind::Powerup(kind),
        }
    }

    pub fn player_base(id: EntityId, position: Vec2) -> Self {
        Self {
            id,
            layer: Layer::PlayerBase,
            body: Body::new(position, Vec2::ZERO, 0.0)
                .with_size(90.0, 90.0, 40.0)
                .with_mass(1000.0),
            kind: ObjectKind::PlayerBase,
        }
    }

    pub fn enemy_base(id: EntityId, position: Vec2) -> Self {
        Self {
            id,
            layer: Layer::EnemyBase,
            body: Body::new(position, Vec2::ZERO, 0.0)
                .with_size(90.0, 90.0, 40.0)
                .with_mass(1000.0),
            kind: ObjectKind::EnemyBase {
                collision_damage: 50.0,
            },
        }
    }

    pub fn player(id: EntityId, position: Vec2, velocity: Vec2, ship: PlayerShip) -> Self {
        Self {
            id,
            layer: Layer::Player,
            body: Body::new(position, velocity, std::f32::consts::FRAC_PI_2)
                .with_size(PlayerShip::WIDTH, PlayerShip::HEIGHT, PlayerShip::COLLISION_RADIUS)
                .with_mass(PlayerShip::MASS),
            kind: ObjectKind::Player(Box::new(ship)),
        }
    }

    /// Per-tick behavior hook. Self-propelled kinds integrate their own
    /// velocity here; the world-relative camera offset is applied separately
    /// by the movement pass. Returns false when the entity has expired.
    ///
    /// The player ship's update runs in `Session` instead, where the world
    /// aggregate queries it needs are available.
    pub fn update_state(&mut self, ctx: &mut UpdateContext) -> bool {
        match &mut self.kind {
            ObjectKind::Star(star) => {
                if star.ticks_until_toggle == 0 {
                    star.lit = !star.lit;
                    star.ticks_until_toggle = StarState::twinkle_duration(ctx.rng);
                } else {
                    star.ticks_until_toggle -= 1;
                }
                true
            }
            ObjectKind::Asteroid { .. } => {
                self.body.position = ctx.bounds.wrap(self.body.position + self.body.velocity);
                true
            }
            ObjectKind::EnemyShip(enemy) => {
                self.body.position = ctx.bounds.wrap(self.body.position + self.body.velocity);
                if enemy.fire_period > 0 {
                    if let Some(target) = ctx.ship_position {
                        enemy.fire_counter += 1;
                        let in_range = self.body.position.distance_squared(target)
                            < ENEMY_FIRING_RANGE * ENEMY_FIRING_RANGE;
                        if enemy.fire_counter >= enemy.fire_period && in_range {
                            enemy.fire_counter = 0;
                            fire_enemy_shots(self.layer, &self.body, target, ctx.events);
                        }
                    }
                }
                true
            }
            ObjectKind::Mine(mine) => {
                if let Some(target) = ctx.ship_position {
                    let to_target = target - self.body.position;
                    let desired = to_target.y.atan2(to_target.x);
                    let diff = crate::physics::angle_diff(self.body.angle, desired);
                    let turn = diff.clamp(-mine.turn_ability, mine.turn_ability);
                    self.body.angle = normalize_angle(self.body.angle + turn);
                    let heading = self.body.heading();
                    let accel = mine.acceleration;
                    let max = mine.max_speed;
                    self.body.accelerate(heading, accel, max);
                }
                self.body.position = ctx.bounds.wrap(self.body.position + self.body.velocity);
                true
            }
            ObjectKind::Projectile(projectile) => {
                self.body.position = ctx.bounds.wrap(self.body.position + self.body.velocity);
                if projectile.ticks_remaining == 0 {
                    return false;
                }
                projectile.ticks_remaining -= 1;
                true
            }
            ObjectKind::Powerup(_)
            | ObjectKind::PlayerBase
            | ObjectKind::EnemyBase { .. }
            | ObjectKind::Player(_) => true,
        }
    }
}

/// Puffers lob an aimed shot; quad blasters spray one photon down each
/// cardinal direction.
fn fire_enemy_shots(layer: Layer, body: &Body, target: Vec2, events: &mut EventQueue) {
    match layer {
        Layer::Puffer => {
            let direction = (target - body.position).normalize_or_zero();
            events.push(GameEvent::SpawnProjectile {
                layer: Layer::PufferProjectile,
                position: body.position,
                velocity: body.velocity + direction * 6.0,
                damage: 15.0,
                size: 10.0,
            });
        }
        Layer::QuadBlaster => {
            for direction in [Vec2::X, Vec2::NEG_X, Vec2::Y, Vec2::NEG_Y] {
                events.push(GameEvent::SpawnProjectile {
                    layer: Layer::QuadBlasterProjectile,
                    position: body.position,
                    velocity: body.velocity + direction * 5.0,
                    damage: 10.0,
                    size: 8.0,
                });
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(
        bounds: &'a GameBounds,
        rng: &'a mut SeededRandom,
        events: &'a mut EventQueue,
        ship: Option<Vec2>,
    ) -> UpdateContext<'a> {
        UpdateContext {
            bounds,
            ship_position: ship,
            rng,
            events,
        }
    }

    #[test]
    fn projectile_expires_after_lifetime() {
        let bounds = GameBounds::default();
        let mut rng = SeededRandom::new(1);
        let mut proj = GameObject::projectile(
            EntityId(1),
            Layer::PlayerProjectile,
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            10.0,
            8.0,
        );
        let mut events = EventQueue::new();
        let mut alive_ticks = 0;
        loop {
            let mut c = ctx(&bounds, &mut rng, &mut events, None);
            if !proj.update_state(&mut c) {
                break;
            }
            alive_ticks += 1;
            assert!(alive_ticks <= 91, "projectile never expired");
        }
        assert_eq!(alive_ticks, 90);
    }

    #[test]
    fn mine_turns_toward_player() {
        let bounds = GameBounds::default();
        let mut rng = SeededRandom::new(1);
        let mut mine = GameObject::mine(EntityId(1), Vec2::ZERO, Vec2::ZERO);
        // Target directly above (positive y): desired angle is PI/2.
        let target = Vec2::new(0.0, 500.0);
        let mut events = EventQueue::new();
        for _ in 0..40 {
            let mut c = ctx(&bounds, &mut rng, &mut events, Some(target));
            mine.update_state(&mut c);
        }
        // 0.09 rad/tick for 40 ticks is enough to face the target. The mine
        // drifts sideways while it turns (no drag), so judge its heading
        // against the live bearing rather than the starting one.
        let to_target = target - mine.body.position;
        let bearing = to_target.y.atan2(to_target.x);
        assert!(crate::physics::angle_diff(mine.body.angle, bearing).abs() < 0.1);
        // And it should have picked up speed toward the target.
        assert!(mine.body.velocity.y > 0.5);
    }

    #[test]
    fn puffer_fires_at_a_ship_in_range() {
        let bounds = GameBounds::default();
        let mut rng = SeededRandom::new(1);
        let mut events = EventQueue::new();
        let mut puffer =
            GameObject::enemy_ship(EntityId(1), Layer::Puffer, Vec2::ZERO, Vec2::ZERO);
        let target = Vec2::new(300.0, 0.0);
        for _ in 0..150 {
            let mut c = ctx(&bounds, &mut rng, &mut events, Some(target));
            puffer.update_state(&mut c);
        }
        let shots: Vec<_> = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::SpawnProjectile {
                        layer: Layer::PufferProjectile,
                        ..
                    }
                )
            })
            .collect();
        assert_eq!(shots.len(), 1);
        if let GameEvent::SpawnProjectile { velocity, .. } = shots[0] {
            // Aimed along +x toward the target.
            assert!(velocity.x > 0.0);
            assert!(velocity.y.abs() < 1e-4);
        }
    }

    #[test]
    fn distant_or_passive_enemies_hold_their_fire() {
        let bounds = GameBounds::default();
        let mut rng = SeededRandom::new(1);
        let mut events = EventQueue::new();
        // Out of range.
        let mut puffer =
            GameObject::enemy_ship(EntityId(1), Layer::Puffer, Vec2::ZERO, Vec2::ZERO);
        // Sludgers never fire at all.
        let mut sludger =
            GameObject::enemy_ship(EntityId(2), Layer::Sludger, Vec2::ZERO, Vec2::ZERO);
        let target = Vec2::new(2000.0, 0.0);
        for _ in 0..400 {
            let mut c = ctx(&bounds, &mut rng, &mut events, Some(target));
            puffer.update_state(&mut c);
            let mut c = ctx(&bounds, &mut rng, &mut events, Some(Vec2::new(10.0, 0.0)));
            sludger.update_state(&mut c);
        }
        assert!(events.is_empty());
    }

    #[test]
    fn quad_blaster_sprays_four_ways() {
        let bounds = GameBounds::default();
        let mut rng = SeededRandom::new(1);
        let mut events = EventQueue::new();
        let mut quad =
            GameObject::enemy_ship(EntityId(1), Layer::QuadBlaster, Vec2::ZERO, Vec2::ZERO);
        for _ in 0..110 {
            let mut c = ctx(&bounds, &mut rng, &mut events, Some(Vec2::new(100.0, 0.0)));
            quad.update_state(&mut c);
        }
        let shots = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::SpawnProjectile {
                        layer: Layer::QuadBlasterProjectile,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(shots, 4);
    }

    #[test]
    fn star_twinkles_between_bounds() {
        let bounds = GameBounds::default();
        let mut rng = SeededRandom::new(99);
        let mut star = GameObject::star(EntityId(1), Vec2::ZERO, &mut rng);
        let mut toggles = 0;
        let initial = match &star.kind {
            ObjectKind::Star(s) => s.lit,
            _ => unreachable!(),
        };
        let mut events = EventQueue::new();
        for _ in 0..(StarState::TWINKLE_MAX_TICKS * 4) {
            let mut c = ctx(&bounds, &mut rng, &mut events, None);
            star.update_state(&mut c);
            if let ObjectKind::Star(s) = &star.kind {
                if s.lit != initial && toggles == 0 {
                    toggles = 1;
                }
            }
        }
        assert_eq!(toggles, 1, "star never toggled within four max periods");
    }
}
