use glam::{Vec3, Vec4};

use crate::{BoundingBox, Vec3x4};

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: 1.0 / direction,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Slab test; returns the entry distance, or `f32::MAX` on a miss.
    pub fn hits_box_at(&self, bounds: &BoundingBox) -> f32 {
        let t0 = (bounds.min() - self.origin) * self.inv_direction;
        let t1 = (bounds.max() - self.origin) * self.inv_direction;

        let near = t0.min(t1).max_element();
        let far = t0.max(t1).min_element();

        if near <= far && far >= 0.0 {
            near.max(0.0)
        } else {
            f32::MAX
        }
    }
}

/// Four shadow rays traced as one query.
#[derive(Clone, Copy, Debug)]
pub struct RayPacket {
    pub origins: Vec3x4,
    pub directions: Vec3x4,
}

/// Per-lane result of a packet trace: nearest hit triangle (or -1) and its
/// distance (`f32::MAX` for lanes with no hit).
#[derive(Clone, Copy, Debug)]
pub struct PacketHit {
    pub ids: [i32; 4],
    pub distances: Vec4,
}

impl PacketHit {
    pub fn none() -> Self {
        Self {
            ids: [-1; 4],
            distances: Vec4::splat(f32::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;

    #[test]
    fn box_hit() {
        let bounds = BoundingBox::from_points([vec3(-1.0, -1.0, 1.0), vec3(1.0, 1.0, 2.0)]);

        let ray = Ray::new(Vec3::ZERO, vec3(0.0, 0.0, 1.0));
        assert_relative_eq!(ray.hits_box_at(&bounds), 1.0);

        // Starting inside the box
        let ray = Ray::new(vec3(0.0, 0.0, 1.5), vec3(0.0, 0.0, 1.0));
        assert_relative_eq!(ray.hits_box_at(&bounds), 0.0);
    }

    #[test]
    fn box_miss() {
        let bounds = BoundingBox::from_points([vec3(-1.0, -1.0, 1.0), vec3(1.0, 1.0, 2.0)]);

        let ray = Ray::new(Vec3::ZERO, vec3(0.0, 0.0, -1.0));
        assert_eq!(ray.hits_box_at(&bounds), f32::MAX);

        let ray = Ray::new(vec3(5.0, 0.0, 0.0), vec3(0.0, 0.0, 1.0));
        assert_eq!(ray.hits_box_at(&bounds), f32::MAX);
    }
}
