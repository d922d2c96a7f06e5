//! Physics utilities for the simulation.
//!
//! Simple 2D physics on a toroidal plane - no external physics engine
//! needed for an arcade shooter.

use glam::Vec2;

/// Fixed rectangular extent of the wrap-around world.
///
/// Crossing an edge re-enters at the opposite edge offset by the overshoot
/// amount, so positions are never snapped to an edge.
#[derive(Debug, Clone, Copy)]
pub struct GameBounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Half the width/height of the default world.
pub const GAME_BOUND_SIZE: f32 = 2500.0;

impl GameBounds {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Wrap a point back into bounds, carrying the overshoot to the far edge.
    pub fn wrap(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            wrap_axis(point.x, self.left, self.right),
            wrap_axis(point.y, self.top, self.bottom),
        )
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.top
            && point.y <= self.bottom
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

impl Default for GameBounds {
    fn default() -> Self {
        Self::new(
            -GAME_BOUND_SIZE,
            -GAME_BOUND_SIZE,
            GAME_BOUND_SIZE,
            GAME_BOUND_SIZE,
        )
    }
}

/// One axis of toroidal wrap. In-bounds values pass through untouched;
/// anything else re-enters offset by the overshoot, however many spans out.
fn wrap_axis(value: f32, min: f32, max: f32) -> f32 {
    if value >= min && value <= max {
        return value;
    }
    min + (value - min).rem_euclid(max - min)
}

/// Circle-circle collision detection via squared distance (no sqrt).
#[inline]
pub fn circles_collide(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> bool {
    let distance_sq = pos_a.distance_squared(pos_b);
    let combined_radius = radius_a + radius_b;
    distance_sq <= combined_radius * combined_radius
}

/// Elastic velocity response along the collision normal.
///
/// Returns the new velocity for the `self` side of the pair. Both sides of a
/// collision call this against the other's pre-collision state, so the
/// outcome is independent of dispatch order.
pub fn elastic_bounce(
    self_pos: Vec2,
    self_vel: Vec2,
    self_mass: f32,
    other_pos: Vec2,
    other_vel: Vec2,
    other_mass: f32,
) -> Vec2 {
    let delta = self_pos - other_pos;
    let dist_sq = delta.length_squared();
    if dist_sq == 0.0 {
        // Perfectly coincident centers, no usable normal.
        return self_vel;
    }
    let mass_factor = (2.0 * other_mass) / (self_mass + other_mass);
    let relative = self_vel - other_vel;
    let projection = relative.dot(delta) / dist_sq;
    self_vel - delta * (mass_factor * projection)
}

/// Normalize an angle to (-PI, PI].
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Normalized difference between two angles, in (-PI, PI].
#[inline]
pub fn angle_diff(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn wrap_carries_overshoot() {
        let bounds = GameBounds::new(-100.0, -100.0, 100.0, 100.0);

        // Crossing the right edge by 5 re-enters 5 past the left edge.
        let p = bounds.wrap(Vec2::new(105.0, 0.0));
        assert_eq!(p, Vec2::new(-95.0, 0.0));

        // Crossing the left edge by 3.
        let p = bounds.wrap(Vec2::new(-103.0, 0.0));
        assert_eq!(p, Vec2::new(97.0, 0.0));

        // Both axes at once.
        let p = bounds.wrap(Vec2::new(110.0, -120.0));
        assert_eq!(p, Vec2::new(-90.0, 80.0));

        // More than a full span out still lands in bounds.
        let p = bounds.wrap(Vec2::new(0.0, -305.1));
        assert!((p.y - 94.9).abs() < 1e-3, "wrapped to {p:?}");
    }

    #[test]
    fn wrap_keeps_positions_in_bounds() {
        let bounds = GameBounds::new(-100.0, -100.0, 100.0, 100.0);
        for i in 0..50 {
            let raw = Vec2::new(-180.0 + i as f32 * 7.3, 150.0 - i as f32 * 11.1);
            let p = bounds.wrap(raw);
            assert!(bounds.contains(p), "wrapped {raw:?} to out-of-bounds {p:?}");
        }
    }

    #[test]
    fn wrap_is_identity_inside_bounds() {
        let bounds = GameBounds::default();
        let p = Vec2::new(123.0, -456.0);
        assert_eq!(bounds.wrap(p), p);
    }

    #[test]
    fn circle_collision() {
        assert!(circles_collide(
            Vec2::ZERO,
            10.0,
            Vec2::new(15.0, 0.0),
            10.0
        ));
        assert!(!circles_collide(
            Vec2::ZERO,
            10.0,
            Vec2::new(25.0, 0.0),
            10.0
        ));
    }

    #[test]
    fn bounce_reverses_head_on_equal_mass() {
        // Equal masses meeting head on swap velocities.
        let v = elastic_bounce(
            Vec2::new(-1.0, 0.0),
            Vec2::new(2.0, 0.0),
            5.0,
            Vec2::new(1.0, 0.0),
            Vec2::new(-2.0, 0.0),
            5.0,
        );
        assert!((v.x - (-2.0)).abs() < 1e-5);
        assert!(v.y.abs() < 1e-5);
    }

    #[test]
    fn bounce_heavy_object_barely_moves() {
        let v = elastic_bounce(
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            100.0,
            Vec2::new(1.0, 0.0),
            Vec2::ZERO,
            1.0,
        );
        // Light obstacle deflects the heavy mover only slightly.
        assert!(v.x > 0.9);
    }

    #[test]
    fn angle_normalization() {
        use std::f32::consts::FRAC_PI_2;
        assert!((normalize_angle(2.0 * PI + FRAC_PI_2) - FRAC_PI_2).abs() < 1e-5);
        assert!((normalize_angle(-2.0 * PI - FRAC_PI_2) + FRAC_PI_2).abs() < 1e-5);
        assert!((angle_diff(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-5);

        // Odd multiples of PI sit on the range boundary; f32 rounding may
        // land the result at either end, which is the same direction. Only
        // the interval and the direction are guaranteed.
        for angle in [3.0 * PI, -3.0 * PI, PI, -PI] {
            let n = normalize_angle(angle);
            assert!(n > -PI - 1e-4 && n <= PI + 1e-4, "{angle} -> {n}");
            assert!(n.cos() < -0.999, "{angle} -> {n}");
        }
    }
}
