use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use glam::{Vec3, Vec4};

/// Four world-space vectors (or RGB colors) in structure-of-arrays form, one
/// per lane.
///
/// This is the engine's unit of pixel work: the image matrices store their
/// pixels in horizontal groups of four and the shading kernel processes one
/// group per step, so per-component math vectorizes across the lanes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3x4 {
    pub x: Vec4,
    pub y: Vec4,
    pub z: Vec4,
}

impl Vec3x4 {
    pub const ZERO: Self = Self {
        x: Vec4::ZERO,
        y: Vec4::ZERO,
        z: Vec4::ZERO,
    };

    /// Replicates one vector across all four lanes.
    pub fn splat(v: Vec3) -> Self {
        Self {
            x: Vec4::splat(v.x),
            y: Vec4::splat(v.y),
            z: Vec4::splat(v.z),
        }
    }

    pub fn from_lanes(lanes: [Vec3; 4]) -> Self {
        Self {
            x: Vec4::new(lanes[0].x, lanes[1].x, lanes[2].x, lanes[3].x),
            y: Vec4::new(lanes[0].y, lanes[1].y, lanes[2].y, lanes[3].y),
            z: Vec4::new(lanes[0].z, lanes[1].z, lanes[2].z, lanes[3].z),
        }
    }

    pub fn lane(&self, lane: usize) -> Vec3 {
        Vec3::new(self.x[lane], self.y[lane], self.z[lane])
    }

    pub fn set_lane(&mut self, lane: usize, v: Vec3) {
        self.x[lane] = v.x;
        self.y[lane] = v.y;
        self.z[lane] = v.z;
    }

    pub fn zero_lane(&mut self, lane: usize) {
        self.set_lane(lane, Vec3::ZERO);
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Per-lane dot product.
    pub fn dot(&self, other: &Self) -> Vec4 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Per-lane Euclidean length.
    pub fn length(&self) -> Vec4 {
        let sq = self.dot(self);

        Vec4::new(sq.x.sqrt(), sq.y.sqrt(), sq.z.sqrt(), sq.w.sqrt())
    }

    /// Keeps components strictly above `threshold`, zeroing the rest.
    pub fn keep_above(self, threshold: Vec4) -> Self {
        Self {
            x: Vec4::select(self.x.cmpgt(threshold), self.x, Vec4::ZERO),
            y: Vec4::select(self.y.cmpgt(threshold), self.y, Vec4::ZERO),
            z: Vec4::select(self.z.cmpgt(threshold), self.z, Vec4::ZERO),
        }
    }
}

impl Add for Vec3x4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl AddAssign for Vec3x4 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3x4 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Neg for Vec3x4 {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Component-wise product, e.g. tinting a contribution by albedo.
impl Mul for Vec3x4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            x: self.x * rhs.x,
            y: self.y * rhs.y,
            z: self.z * rhs.z,
        }
    }
}

/// Per-lane scale, e.g. dividing directions by their per-lane lengths.
impl Mul<Vec4> for Vec3x4 {
    type Output = Self;

    fn mul(self, rhs: Vec4) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

impl Mul<f32> for Vec3x4 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self * Vec4::splat(rhs)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;

    #[test]
    fn lanes() {
        let mut target = Vec3x4::from_lanes([
            vec3(1.0, 2.0, 3.0),
            vec3(4.0, 5.0, 6.0),
            vec3(7.0, 8.0, 9.0),
            vec3(10.0, 11.0, 12.0),
        ]);

        assert_eq!(target.lane(0), vec3(1.0, 2.0, 3.0));
        assert_eq!(target.lane(3), vec3(10.0, 11.0, 12.0));

        target.zero_lane(1);

        assert_eq!(target.lane(1), Vec3::ZERO);
        assert_eq!(target.lane(2), vec3(7.0, 8.0, 9.0));
    }

    #[test]
    fn length() {
        let target = Vec3x4::from_lanes([
            vec3(3.0, 4.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            Vec3::ZERO,
            vec3(2.0, 3.0, 6.0),
        ]);

        let length = target.length();

        assert_relative_eq!(length.x, 5.0);
        assert_relative_eq!(length.y, 1.0);
        assert_relative_eq!(length.z, 0.0);
        assert_relative_eq!(length.w, 7.0);
    }

    #[test]
    fn keep_above() {
        let target = Vec3x4 {
            x: Vec4::new(0.0, 0.5, 1.0, 2.0),
            y: Vec4::splat(0.25),
            z: Vec4::splat(1.5),
        };

        let kept = target.keep_above(Vec4::splat(0.5));

        assert_eq!(kept.x, Vec4::new(0.0, 0.0, 1.0, 2.0));
        assert_eq!(kept.y, Vec4::ZERO);
        assert_eq!(kept.z, Vec4::splat(1.5));
    }

    #[test]
    fn zero_check() {
        assert!(Vec3x4::ZERO.is_zero());
        assert!(!Vec3x4::splat(vec3(0.0, 0.0, 1.0e-30)).is_zero());
    }
}
