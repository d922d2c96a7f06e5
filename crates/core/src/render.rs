//! Render support queries.
//!
//! The core never draws; it answers two questions for the client: which
//! objects fall inside the camera viewport, and what color a layer paints
//! on the radar. Visibility is a cheap bounding-box test, deliberately
//! looser than the collision circles.

use glam::Vec2;

use crate::config::GameConfig;
use crate::entities::{GameObject, Layer};
use crate::registry::ObjectRegistry;

/// Camera rectangle in world coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    /// Whether an object's bounding box intersects the viewport.
    pub fn can_see(&self, object: &GameObject) -> bool {
        let half = Vec2::new(
            (self.width + object.body.width) / 2.0,
            (self.height + object.body.height) / 2.0,
        );
        let offset = object.body.position - self.center;
        offset.x.abs() <= half.x && offset.y.abs() <= half.y
    }
}

/// Objects inside the viewport, in registry order so the ship (appended
/// last) draws on top.
pub fn visible_objects<'a>(
    registry: &'a ObjectRegistry,
    viewport: &Viewport,
) -> Vec<&'a GameObject> {
    registry.iter().filter(|o| viewport.can_see(o)).collect()
}

/// Radar blip colors, by threat category rather than per-layer palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadarColor {
    /// Enemies and enemy fire.
    Red,
    /// The player ship.
    LawnGreen,
    /// The home base and the ship's own photons.
    DeepSkyBlue,
    /// Asteroids.
    White,
    /// Powerups, when the scanner is configured to show them.
    Yellow,
}

/// Color for a layer's radar blip, or None for layers the radar ignores.
pub fn radar_color(layer: Layer, config: &GameConfig) -> Option<RadarColor> {
    match layer {
        Layer::Player => Some(RadarColor::LawnGreen),
        Layer::PlayerBase | Layer::PlayerProjectile => Some(RadarColor::DeepSkyBlue),
        Layer::Asteroid => Some(RadarColor::White),
        _ if layer.is_enemy() || layer.is_enemy_projectile() => Some(RadarColor::Red),
        _ if layer.is_powerup() => {
            if config.show_powerups_on_radar {
                Some(RadarColor::Yellow)
            } else {
                None
            }
        }
        Layer::Star => None,
        other => {
            log::error!("no radar color mapping for layer {other:?}");
            None
        }
    }
}
