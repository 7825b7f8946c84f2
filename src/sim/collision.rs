//! Projectile/task hit detection
//!
//! Everything is a circle: a projectile hits a task when the path it
//! travelled this frame passes within the hit radius of the task's center.
//! Testing the whole segment keeps long frames from stepping over a task.

use glam::Vec2;

use super::task::Task;

/// Whether a projectile at `projectile` overlaps a task at `task`
#[inline]
pub fn within_radius(projectile: Vec2, task: Vec2, radius: f32) -> bool {
    projectile.distance_squared(task) <= radius * radius
}

/// Point on the segment `from → to` closest to `point`
#[inline]
pub fn closest_on_segment(from: Vec2, to: Vec2, point: Vec2) -> Vec2 {
    let path = to - from;
    let length_sq = path.length_squared();
    if length_sq <= f32::EPSILON {
        return from;
    }
    let t = ((point - from).dot(path) / length_sq).clamp(0.0, 1.0);
    from + path * t
}

/// First live task (in slice order) within `radius` of the segment
/// `from → to`. Pass the same point twice for a stationary test.
pub fn first_hit(from: Vec2, to: Vec2, tasks: &[Task], radius: f32) -> Option<u32> {
    tasks
        .iter()
        .find(|t| !t.is_defeated() && within_radius(closest_on_segment(from, to, t.pos), t.pos, radius))
        .map(|t| t.id)
}

/// Whether `pos` is more than `margin` outside the `width × height` arena
pub fn outside_arena(pos: Vec2, width: f32, height: f32, margin: f32) -> bool {
    pos.x < -margin || pos.y < -margin || pos.x > width + margin || pos.y > height + margin
}
