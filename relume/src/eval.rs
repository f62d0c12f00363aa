use glam::{Vec3, Vec4};

use crate::models::{Attenuation, Light, LightKind};
use crate::Vec3x4;

/// Evaluates `light` at four pixels, ignoring occlusion; the kernel applies
/// the shadow mask afterwards.
pub fn light_at(light: &Light, positions: &Vec3x4, normals: &Vec3x4) -> Vec3x4 {
    match light.kind {
        LightKind::Directional { direction } => {
            let towards = Vec3x4::splat(-direction.normalize_or_zero());
            let n_dot_l = normals.dot(&towards).max(Vec4::ZERO);

            tint(light.color, n_dot_l)
        }

        LightKind::Point { attenuation } => {
            let (l, distance) = towards_light(light.position, positions);
            let n_dot_l = normals.dot(&l).max(Vec4::ZERO);

            tint(light.color, n_dot_l * falloff(&attenuation, distance))
        }

        LightKind::Spot {
            direction,
            attenuation,
            inner_cos,
            outer_cos,
        } => {
            let (l, distance) = towards_light(light.position, positions);
            let n_dot_l = normals.dot(&l).max(Vec4::ZERO);

            // Cone ramp between the outer and inner cosines
            let axis = Vec3x4::splat(direction.normalize_or_zero());
            let cone_cos = axis.dot(&-l);

            let ramp = if inner_cos > outer_cos {
                ((cone_cos - Vec4::splat(outer_cos)) / (inner_cos - outer_cos))
                    .clamp(Vec4::ZERO, Vec4::ONE)
            } else {
                Vec4::select(cone_cos.cmpge(Vec4::splat(outer_cos)), Vec4::ONE, Vec4::ZERO)
            };

            tint(light.color, n_dot_l * falloff(&attenuation, distance) * ramp)
        }
    }
}

/// Per-lane unit direction from the pixels towards the light, plus the
/// per-lane distance.
fn towards_light(light_position: Vec3, positions: &Vec3x4) -> (Vec3x4, Vec4) {
    let to_light = Vec3x4::splat(light_position) - *positions;
    let distance = to_light.length().max(Vec4::splat(f32::MIN_POSITIVE));

    (to_light * distance.recip(), distance)
}

fn falloff(attenuation: &Attenuation, distance: Vec4) -> Vec4 {
    let denom = Vec4::splat(attenuation.constant)
        + Vec4::splat(attenuation.linear) * distance
        + Vec4::splat(attenuation.quadratic) * distance * distance;

    denom.max(Vec4::splat(f32::MIN_POSITIVE)).recip()
}

fn tint(color: Vec3, weight: Vec4) -> Vec3x4 {
    Vec3x4 {
        x: Vec4::splat(color.x) * weight,
        y: Vec4::splat(color.y) * weight,
        z: Vec4::splat(color.z) * weight,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;
    use crate::models::LightId;

    fn flat_ground() -> (Vec3x4, Vec3x4) {
        let positions = Vec3x4::from_lanes([
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(2.0, 0.0, 0.0),
            vec3(3.0, 0.0, 0.0),
        ]);

        let normals = Vec3x4::splat(vec3(0.0, 0.0, 1.0));

        (positions, normals)
    }

    #[test]
    fn directional_cosine() {
        let (positions, mut normals) = flat_ground();

        let light = Light::directional(
            LightId::new(0),
            vec3(0.0, 0.0, 1000.0),
            vec3(0.0, 0.0, -1.0),
            vec3(2.0, 1.0, 0.5),
        );

        // Head-on: full color
        let contribution = light_at(&light, &positions, &normals);

        assert_relative_eq!(contribution.x.x, 2.0);
        assert_relative_eq!(contribution.y.x, 1.0);
        assert_relative_eq!(contribution.z.x, 0.5);

        // Grazing from below: nothing
        normals = Vec3x4::splat(vec3(0.0, 0.0, -1.0));

        let contribution = light_at(&light, &positions, &normals);

        assert!(contribution.is_zero());
    }

    #[test]
    fn point_falloff() {
        let (positions, normals) = flat_ground();

        let attenuation = Attenuation {
            constant: 0.0,
            linear: 0.0,
            quadratic: 1.0,
        };

        let light = Light::point(
            LightId::new(0),
            vec3(0.0, 0.0, 2.0),
            Vec3::ONE,
            attenuation,
        );

        let contribution = light_at(&light, &positions, &normals);

        // Straight above lane 0 at distance 2: cos = 1, falloff = 1/4
        assert_relative_eq!(contribution.x.x, 0.25);

        // Farther lanes get both a worse cosine and a worse falloff
        assert!(contribution.x.y < contribution.x.x);
        assert!(contribution.x.z < contribution.x.y);
    }

    #[test]
    fn spot_cone() {
        let (positions, normals) = flat_ground();

        let light = Light::spot(
            LightId::new(0),
            vec3(0.0, 0.0, 2.0),
            vec3(0.0, 0.0, -1.0),
            Vec3::ONE,
            Attenuation::NONE,
            0.95,
            0.9,
        );

        let contribution = light_at(&light, &positions, &normals);

        // Lane 0 sits on the axis, lane 3 far outside the cone
        assert_relative_eq!(contribution.x.x, 1.0);
        assert_eq!(contribution.x.w, 0.0);
    }
}
