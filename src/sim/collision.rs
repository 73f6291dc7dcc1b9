//! Hit and boundary tests
//!
//! The slash is a point at the held pointer; an enemy is hit when its center
//! is strictly within the hit radius of that point.

use glam::Vec2;

/// Check whether the pointer slashes a target
#[inline]
pub fn pointer_hits(target: Vec2, pointer: Vec2, radius: f32) -> bool {
    target.distance(pointer) < radius
}

/// Check whether an enemy has fallen past the bottom boundary
#[inline]
pub fn below_boundary(pos: Vec2, despawn_y: f32) -> bool {
    pos.y > despawn_y
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn hit_iff_within_radius(
            tx in 0.0f32..100.0, ty in -20.0f32..110.0,
            px in 0.0f32..100.0, py in 0.0f32..100.0,
            radius in 0.1f32..30.0,
        ) {
            let target = Vec2::new(tx, ty);
            let pointer = Vec2::new(px, py);
            let (dx, dy) = (tx - px, ty - py);
            let dist = (dx * dx + dy * dy).sqrt();
            prop_assert_eq!(pointer_hits(target, pointer, radius), dist < radius);
        }
    }
}
