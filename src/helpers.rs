use macroquad::prelude::*;

const NORMALIZE_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Unit vector along `v`, or zero when `v` has no usable direction.
pub fn normalize(v: Vec2) -> Vec2 {
    let len = v.length();
    if len <= NORMALIZE_EPSILON || !len.is_finite() {
        return Vec2::ZERO;
    }
    v / len
}

pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

pub fn direction_from_angle(angle: f32) -> Vec2 {
    vec2(angle.cos(), angle.sin())
}

pub fn aabb_intersect(a: Rect, b: Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

pub fn circle_rect_intersect(circle: Circle, rect: Rect) -> bool {
    let closest = vec2(
        circle.center.x.clamp(rect.x, rect.x + rect.w),
        circle.center.y.clamp(rect.y, rect.y + rect.h),
    );
    distance(circle.center, closest) < circle.radius
}

pub fn circle_circle_intersect(a: Circle, b: Circle) -> bool {
    distance(a.center, b.center) <= a.radius + b.radius
}

pub fn rect_center(rect: Rect) -> Vec2 {
    vec2(rect.x + rect.w * 0.5, rect.y + rect.h * 0.5)
}

pub fn centered_rect(center: Vec2, size: Vec2) -> Rect {
    Rect::new(
        center.x - size.x * 0.5,
        center.y - size.y * 0.5,
        size.x,
        size.y,
    )
}

/// Moves a box centered at `center` out of `obstacle` along the axis with the
/// smaller overlap. Returns the corrected center.
pub fn resolve_rect_overlap(center: Vec2, size: Vec2, obstacle: Rect) -> Vec2 {
    if !aabb_intersect(centered_rect(center, size), obstacle) {
        return center;
    }

    let obstacle_center = rect_center(obstacle);
    let dx = center.x - obstacle_center.x;
    let dy = center.y - obstacle_center.y;
    let overlap_x = (size.x * 0.5 + obstacle.w * 0.5) - dx.abs();
    let overlap_y = (size.y * 0.5 + obstacle.h * 0.5) - dy.abs();

    if overlap_x < overlap_y {
        let push = if dx > 0.0 { overlap_x } else { -overlap_x };
        vec2(center.x + push, center.y)
    } else {
        let push = if dy > 0.0 { overlap_y } else { -overlap_y };
        vec2(center.x, center.y + push)
    }
}

/// Pushes a point of clearance radius `radius` radially out of `circle`.
/// A point sitting exactly on the circle center has no direction and stays put.
pub fn push_out_of_circle(center: Vec2, radius: f32, circle: Circle) -> Vec2 {
    let offset = center - circle.center;
    let dist = offset.length();
    if dist <= 0.0 {
        return center;
    }
    let push = circle.radius + radius - dist;
    if push <= 0.0 {
        return center;
    }
    center + offset / dist * push
}

pub fn clamp_center_to_bounds(center: Vec2, half_extent: Vec2, bounds: Vec2) -> Vec2 {
    vec2(
        center.x.clamp(half_extent.x, (bounds.x - half_extent.x).max(half_extent.x)),
        center.y.clamp(half_extent.y, (bounds.y - half_extent.y).max(half_extent.y)),
    )
}

pub(crate) fn hash_u32(x: u32, y: u32, seed: u32) -> u32 {
    let mut v = x.wrapping_mul(0x9E3779B1) ^ y.wrapping_mul(0x85EBCA6B) ^ seed;
    v ^= v >> 16;
    v = v.wrapping_mul(0x7FEB352D);
    v ^= v >> 15;
    v
}

/// Deterministic value in `[0, 1)` derived from `hash_u32`.
pub(crate) fn hash_unit(x: u32, y: u32, seed: u32) -> f32 {
    (hash_u32(x, y, seed) >> 8) as f32 / (1u32 << 24) as f32
}

pub(crate) fn padded_rect(rect: Rect, pad: f32) -> Rect {
    Rect::new(
        rect.x - pad,
        rect.y - pad,
        rect.w + pad * 2.0,
        rect.h + pad * 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn normalize_zero_vector_is_zero() {
        assert_eq!(normalize(Vec2::ZERO), Vec2::ZERO);
        assert_eq!(normalize(vec2(1e-9, 0.0)), Vec2::ZERO);
        let n = normalize(vec2(3.0, 4.0));
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn angle_between_points() {
        assert_eq!(angle_between(vec2(0.0, 0.0), vec2(10.0, 0.0)), 0.0);
        assert!((angle_between(vec2(0.0, 0.0), vec2(0.0, 5.0)) - PI / 2.0).abs() < 1e-6);
        assert!((angle_between(vec2(1.0, 1.0), vec2(-1.0, 1.0)) - PI).abs() < 1e-6);
    }

    #[test]
    fn aabb_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(aabb_intersect(a, Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!aabb_intersect(a, Rect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn circle_rect_uses_clamped_point() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(circle_rect_intersect(Circle::new(vec2(5.0, 5.0), 1.0), rect));
        assert!(circle_rect_intersect(Circle::new(vec2(13.0, 5.0), 4.0), rect));
        assert!(!circle_rect_intersect(Circle::new(vec2(13.0, 13.0), 4.0), rect));
    }

    #[test]
    fn circle_circle_inclusive_at_touch() {
        let a = Circle::new(vec2(0.0, 0.0), 5.0);
        assert!(circle_circle_intersect(a, Circle::new(vec2(10.0, 0.0), 5.0)));
        assert!(!circle_circle_intersect(a, Circle::new(vec2(10.1, 0.0), 5.0)));
    }

    #[test]
    fn rect_overlap_resolves_on_shallow_axis() {
        let obstacle = Rect::new(100.0, 100.0, 50.0, 50.0);
        // 6 units into the left face, deep on y.
        let center = resolve_rect_overlap(vec2(90.0, 125.0), vec2(32.0, 32.0), obstacle);
        assert_eq!(center, vec2(84.0, 125.0));

        let center = resolve_rect_overlap(vec2(125.0, 160.0), vec2(32.0, 32.0), obstacle);
        assert_eq!(center, vec2(125.0, 166.0));
    }

    #[test]
    fn push_out_of_circle_moves_to_contact_distance() {
        let circle = Circle::new(vec2(0.0, 0.0), 10.0);
        let pushed = push_out_of_circle(vec2(20.0, 0.0), 16.0, circle);
        assert!((pushed.x - 26.0).abs() < 1e-5);
        assert_eq!(push_out_of_circle(circle.center, 16.0, circle), circle.center);
    }

    #[test]
    fn hash_unit_in_range() {
        for i in 0..256 {
            let v = hash_unit(i, i * 7, 1337);
            assert!((0.0..1.0).contains(&v));
        }
    }
}
