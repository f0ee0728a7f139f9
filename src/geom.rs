//! Pure geometry helpers: hit-testing, distance, angle, velocity decomposition.
//!
//! Everything here is stateless and operates on sprite rectangles and points
//! in canvas space. [`velocity_towards`] normalizes by the L1 sum of the
//! absolute deltas rather than the Euclidean magnitude, which gives
//! joystick-style controls a diamond-shaped response instead of a circular
//! one.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::sprite::{Sprite, SpriteId};
use crate::viewport::Point;

/// Cardinal direction of a velocity vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A decomposed velocity: per-axis components plus the dominant direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
    pub direction: Direction,
}

/// Whether `point` lies inside the sprite's rectangle, inclusive on all four
/// edges.
#[must_use]
pub fn contains(sprite: &Sprite, point: Point) -> bool {
    sprite.x <= point.x
        && point.x <= sprite.x + sprite.w
        && sprite.y <= point.y
        && point.y <= sprite.y + sprite.h
}

/// First sprite in iteration order whose rectangle contains `point`.
pub fn first_containing<'a, I>(sprites: I, point: Point) -> Option<SpriteId>
where
    I: IntoIterator<Item = (SpriteId, &'a Sprite)>,
{
    sprites
        .into_iter()
        .find(|(_, sprite)| contains(sprite, point))
        .map(|(id, _)| id)
}

/// Whether two sprite rectangles overlap (strict, touching edges do not count).
#[must_use]
pub fn intersects(a: &Sprite, b: &Sprite) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// First sprite in iteration order overlapping `sprite`.
pub fn first_intersecting<'a, I>(sprites: I, sprite: &Sprite) -> Option<SpriteId>
where
    I: IntoIterator<Item = (SpriteId, &'a Sprite)>,
{
    sprites
        .into_iter()
        .find(|(_, other)| intersects(sprite, other))
        .map(|(id, _)| id)
}

/// Center point of a sprite's rectangle.
#[must_use]
pub fn center(sprite: &Sprite) -> Point {
    Point::new(sprite.x + sprite.w / 2.0, sprite.y + sprite.h / 2.0)
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Center-to-center distance minus the other sprite's mean half-extent, a
/// rough "surface distance" for round-ish sprites.
#[must_use]
pub fn distance_between(sprite: &Sprite, other: &Sprite) -> f64 {
    distance(center(sprite), center(other)) - (other.w + other.h) / 4.0
}

/// Angle in radians from `a` to `b`, via `atan2`.
#[must_use]
pub fn angle(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// Velocity components for movement from a sprite's center towards `target`
/// at `speed`, normalized by the L1 sum of the deltas.
///
/// Exact `|dx| == |dy|` ties pick the vertical branch. A target exactly on
/// the center yields a zero vector instead of a non-finite one.
#[must_use]
pub fn velocity_towards(sprite: &Sprite, target: Point, speed: f64) -> Velocity {
    let origin = center(sprite);
    let dx = target.x - origin.x;
    let dy = target.y - origin.y;
    let sum = dx.abs() + dy.abs();

    if sum == 0.0 {
        return Velocity { vx: 0.0, vy: 0.0, direction: Direction::Up };
    }

    let direction = if dx.abs() > dy.abs() {
        if dx > 0.0 { Direction::Right } else { Direction::Left }
    } else {
        if dy > 0.0 { Direction::Down } else { Direction::Up }
    };

    Velocity {
        vx: dx / sum * speed,
        vy: dy / sum * speed,
        direction,
    }
}
