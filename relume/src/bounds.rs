use std::ops::{Add, AddAssign};

use glam::Vec3;

/// Axis-aligned bounding box.
///
/// Serves double duty: leaf and internal bounds inside the acceleration
/// structure, and the scene bounds (rendered pixels plus the eye) the
/// scheduler uses to boost lights that just appeared in view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    min: Vec3,
    max: Vec3,
}

impl BoundingBox {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(Self::default(), |mut bb, point| {
                bb.grow(point);
                bb
            })
    }

    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    /// Half of the surface area; the usual cost metric when comparing
    /// splitting planes, since the constant factor cancels out.
    pub fn half_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }

        let extent = self.extent();

        extent.x * extent.y + extent.y * extent.z + extent.z * extent.x
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec3::INFINITY,
            max: Vec3::NEG_INFINITY,
        }
    }
}

impl Add for BoundingBox {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self.min = self.min.min(rhs.min);
        self.max = self.max.max(rhs.max);
        self
    }
}

impl AddAssign for BoundingBox {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn grow_and_contains() {
        let mut target = BoundingBox::default();

        assert!(target.is_empty());
        assert!(!target.contains(Vec3::ZERO));

        target.grow(vec3(-1.0, 0.0, 0.0));
        target.grow(vec3(1.0, 2.0, 3.0));

        assert!(!target.is_empty());
        assert!(target.contains(vec3(0.0, 1.0, 1.5)));
        assert!(target.contains(vec3(-1.0, 0.0, 0.0)));
        assert!(!target.contains(vec3(0.0, 1.0, 3.5)));
    }

    #[test]
    fn union() {
        let a = BoundingBox::from_points([vec3(0.0, 0.0, 0.0), vec3(1.0, 1.0, 1.0)]);
        let b = BoundingBox::from_points([vec3(2.0, -1.0, 0.0)]);

        let union = a + b;

        assert_eq!(union.min(), vec3(0.0, -1.0, 0.0));
        assert_eq!(union.max(), vec3(2.0, 1.0, 1.0));
    }

    #[test]
    fn half_area() {
        let target = BoundingBox::from_points([Vec3::ZERO, vec3(2.0, 3.0, 4.0)]);

        assert_eq!(target.half_area(), 2.0 * 3.0 + 3.0 * 4.0 + 4.0 * 2.0);
        assert_eq!(BoundingBox::default().half_area(), 0.0);
    }
}
