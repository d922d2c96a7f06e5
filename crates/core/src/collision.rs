//! Collision detection and resolution.
//!
//! One O(n^2) pass over the collidable view per tick, gated by a symmetric
//! layer table before any geometry runs. When two circles overlap, both
//! parties' spatial state is captured first and each side reacts against
//! the other's frozen pre-collision view, so resolution order cannot leak
//! one party's reaction into the other's inputs.

use glam::Vec2;

use crate::entities::{Body, EntityId, GameObject, Layer, ObjectKind};
use crate::physics::{circles_collide, elastic_bounce, GameBounds};
use crate::player::PlayerShip;
use crate::random::SeededRandom;
use crate::registry::ObjectRegistry;
use crate::services::{EventQueue, GameEvent, Sound};

/// Frozen pre-collision snapshot of one collision party.
#[derive(Debug, Clone)]
pub struct CollisionView {
    pub id: EntityId,
    pub layer: Layer,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    pub collision_radius: f32,
    /// Damage this party deals on contact.
    pub contact_damage: f32,
}

impl CollisionView {
    pub fn capture(object: &GameObject) -> Self {
        let contact_damage = match &object.kind {
            ObjectKind::Asteroid { collision_damage } => *collision_damage,
            ObjectKind::EnemyShip(enemy) => enemy.collision_damage,
            ObjectKind::Mine(mine) => mine.enemy.collision_damage,
            ObjectKind::Projectile(projectile) => projectile.damage,
            ObjectKind::EnemyBase { collision_damage } => *collision_damage,
            ObjectKind::Player(_) => PlayerShip::COLLISION_DAMAGE,
            ObjectKind::Star(_) | ObjectKind::Powerup(_) | ObjectKind::PlayerBase => 0.0,
        };
        Self {
            id: object.id,
            layer: object.layer,
            position: object.body.position,
            velocity: object.body.velocity,
            mass: object.body.mass,
            collision_radius: object.body.collision_radius,
            contact_damage,
        }
    }
}

fn collides_one_way(a: Layer, b: Layer) -> bool {
    match a {
        // The ship ignores only its own photons.
        Layer::Player => b != Layer::PlayerProjectile,
        Layer::PlayerProjectile => b == Layer::Asteroid || b.is_enemy(),
        Layer::PufferProjectile | Layer::QuadBlasterProjectile => {
            b == Layer::Player || b == Layer::Asteroid
        }
        _ => false,
    }
}

/// Symmetric layer gate: the cheap filter before any geometry.
pub fn layers_collide(a: Layer, b: Layer) -> bool {
    if a == b || a == Layer::Star || b == Layer::Star {
        return false;
    }
    // Powerups interact with the ship and nothing else.
    if a.is_powerup() {
        return b == Layer::Player;
    }
    if b.is_powerup() {
        return a == Layer::Player;
    }
    collides_one_way(a, b) || collides_one_way(b, a)
}

/// One collision pass over the collidable view.
///
/// The pass iterates an id snapshot; a reaction may remove entities, and a
/// removed party simply stops matching for the rest of the pass. Within a
/// pair, both sides are dispatched against the frozen views even when the
/// first reaction destroys the first party (a photon is absorbed, but its
/// hit still lands); dispatch on an already-removed entity is a no-op.
pub fn detect_collisions(
    registry: &mut ObjectRegistry,
    bounds: &GameBounds,
    rng: &mut SeededRandom,
    events: &mut EventQueue,
) {
    let ids = registry.collidable_snapshot();
    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            let (first, second) = (ids[i], ids[j]);
            let (Some(a), Some(b)) = (registry.get(first), registry.get(second)) else {
                continue;
            };
            if !layers_collide(a.layer, b.layer) {
                continue;
            }
            if !circles_collide(
                a.body.position,
                a.body.collision_radius,
                b.body.position,
                b.body.collision_radius,
            ) {
                continue;
            }

            let a_view = CollisionView::capture(a);
            let b_view = CollisionView::capture(b);
            dispatch(registry, first, &b_view, bounds, rng, events);
            dispatch(registry, second, &a_view, bounds, rng, events);
        }
    }
}

fn dispatch(
    registry: &mut ObjectRegistry,
    id: EntityId,
    other: &CollisionView,
    bounds: &GameBounds,
    rng: &mut SeededRandom,
    events: &mut EventQueue,
) {
    let Some(object) = registry.get_mut(id) else {
        return;
    };
    let body = &mut object.body;
    let mut destroyed = false;
    match &mut object.kind {
        ObjectKind::Player(ship) => {
            ship.handle_collision(body, other, bounds, rng, events);
        }
        // Photons are absorbed by whatever they hit.
        ObjectKind::Projectile(_) => destroyed = true,
        ObjectKind::Asteroid { .. } => {
            // Rocks are indestructible; photons vanish against them without
            // imparting momentum.
            if !is_projectile(other.layer) {
                bounce(body, other);
            }
        }
        ObjectKind::EnemyShip(enemy) => {
            if other.layer == Layer::Player {
                bounce(body, other);
            }
            enemy.health -= other.contact_damage;
            if enemy.health <= 0.0 {
                events.push(GameEvent::AwardPoints(enemy.points));
                destroyed = true;
            }
        }
        ObjectKind::Mine(mine) => {
            if other.layer == Layer::Player {
                bounce(body, other);
            }
            mine.enemy.health -= other.contact_damage;
            if mine.enemy.health <= 0.0 {
                events.push(GameEvent::Sound(Sound::SludgerMinePop));
                events.push(GameEvent::AwardPoints(mine.enemy.points));
                destroyed = true;
            }
        }
        // The bases shrug everything off. A touched powerup stays put here;
        // the ship's pickup handler queues its removal.
        ObjectKind::PlayerBase | ObjectKind::EnemyBase { .. } | ObjectKind::Powerup(_) => {}
        ObjectKind::Star(_) => {}
    }
    if destroyed {
        registry.remove_object(id);
    }
}

fn is_projectile(layer: Layer) -> bool {
    layer == Layer::PlayerProjectile || layer.is_enemy_projectile()
}

fn bounce(body: &mut Body, other: &CollisionView) {
    body.velocity = elastic_bounce(
        body.position,
        body.velocity,
        body.mass,
        other.position,
        other.velocity,
        other.mass,
    );
}
