use glam::Vec3;

use crate::{BoundingBox, Ray};

/// A shadow-casting triangle.
///
/// The preview only needs occlusion, so the payload is three positions plus
/// the flat reflectance the host assigns to imported geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    positions: [Vec3; 3],
    reflectance: Vec3,
}

impl Triangle {
    pub fn new(positions: [Vec3; 3], reflectance: Vec3) -> Self {
        Self {
            positions,
            reflectance,
        }
    }

    pub fn positions(&self) -> [Vec3; 3] {
        self.positions
    }

    pub fn reflectance(&self) -> Vec3 {
        self.reflectance
    }

    pub fn center(&self) -> Vec3 {
        self.positions.into_iter().sum::<Vec3>() / 3.0
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.positions)
    }

    /// Möller–Trumbore intersection; returns the hit distance if the ray
    /// hits strictly between its origin and `max_distance`.
    pub fn hit(&self, ray: &Ray, max_distance: f32) -> Option<f32> {
        let v0v1 = self.positions[1] - self.positions[0];
        let v0v2 = self.positions[2] - self.positions[0];

        let pvec = ray.direction().cross(v0v2);
        let det = v0v1.dot(pvec);

        if det.abs() < f32::EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = ray.origin() - self.positions[0];
        let u = tvec.dot(pvec) * inv_det;
        let qvec = tvec.cross(v0v1);
        let v = ray.direction().dot(qvec) * inv_det;
        let distance = v0v2.dot(qvec) * inv_det;

        if (u < 0.0)
            | (u > 1.0)
            | (v < 0.0)
            | (u + v > 1.0)
            | (distance <= 0.0)
            | (distance >= max_distance)
        {
            return None;
        }

        Some(distance)
    }
}
