use glam::Vec3;

/// Stable identifier the host assigns to a light source.
///
/// The engine keys its per-light bookkeeping on this id, so a light keeps its
/// partial results across light-list replacements as long as its id stays the
/// same.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightId(u32);

impl LightId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Distance falloff coefficients of a positional light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    /// No falloff, i.e. full brightness at any distance.
    pub const NONE: Self = Self {
        constant: 1.0,
        linear: 0.0,
        quadratic: 0.0,
    };

    /// Brightness factor at the given distance.
    pub fn factor(&self, distance: f32) -> f32 {
        let denom =
            self.constant + self.linear * distance + self.quadratic * distance * distance;

        1.0 / denom.max(f32::MIN_POSITIVE)
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::NONE
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    /// Parallel rays along `direction`; conceptually positioned at infinity.
    Directional { direction: Vec3 },

    /// Omnidirectional emitter at the light's position.
    Point { attenuation: Attenuation },

    /// Cone-limited emitter; `inner_cos` and `outer_cos` bound the cone,
    /// with a linear ramp between them.
    Spot {
        direction: Vec3,
        attenuation: Attenuation,
        inner_cos: f32,
        outer_cos: f32,
    },
}

/// Host-supplied description of a single light source.
///
/// `position` is meaningful for every kind: directional lights use it as the
/// point their shadow rays are aimed at, which the host puts far away along
/// the inverse light direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub id: LightId,
    pub kind: LightKind,
    pub position: Vec3,
    pub color: Vec3,
}

impl Light {
    pub fn directional(id: LightId, position: Vec3, direction: Vec3, color: Vec3) -> Self {
        Self {
            id,
            kind: LightKind::Directional { direction },
            position,
            color,
        }
    }

    pub fn point(id: LightId, position: Vec3, color: Vec3, attenuation: Attenuation) -> Self {
        Self {
            id,
            kind: LightKind::Point { attenuation },
            position,
            color,
        }
    }

    pub fn spot(
        id: LightId,
        position: Vec3,
        direction: Vec3,
        color: Vec3,
        attenuation: Attenuation,
        inner_cos: f32,
        outer_cos: f32,
    ) -> Self {
        Self {
            id,
            kind: LightKind::Spot {
                direction,
                attenuation,
                inner_cos,
                outer_cos,
            },
            position,
            color,
        }
    }

    pub fn is_directional(&self) -> bool {
        matches!(self.kind, LightKind::Directional { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attenuation_factor() {
        assert_eq!(Attenuation::NONE.factor(123.0), 1.0);

        let target = Attenuation {
            constant: 0.0,
            linear: 0.0,
            quadratic: 1.0,
        };

        assert_eq!(target.factor(2.0), 0.25);

        // Degenerate coefficients must not divide by zero
        let target = Attenuation {
            constant: 0.0,
            linear: 0.0,
            quadratic: 0.0,
        };

        assert!(target.factor(1.0).is_finite());
    }
}
