use std::collections::HashMap;

use glam::Vec3;

use crate::models::{Bitmap, Light, LightId};
use crate::{LightProgress, ProgressState, QuadImage, RefinementSchedule, Vec3x4, REFINEMENT_STEPS};

/// Seed added to every channel of the ambient accumulator, so the estimate
/// stays well-defined with no lights at all.
const AMBIENT_SEED: f32 = 1.0e-4;

/// Scale of the normalized ambient estimate.
const AMBIENT_SCALE: f32 = 0.05;

/// Cheap single-value stand-in for indirect light, derived from the direct
/// light gathered so far; it keeps unlit pixels from rendering pitch black
/// during early refinement.
pub fn estimated_unshot_ambient(
    lights: &[Light],
    arena: &HashMap<LightId, LightProgress>,
) -> Vec3 {
    let mut sum = Vec3::splat(AMBIENT_SEED);

    for light in lights {
        let Some(progress) = arena.get(&light.id) else { continue };

        if matches!(
            progress.state(),
            ProgressState::Partial | ProgressState::Full,
        ) {
            sum += progress.total_contribution() * light.color;
        }
    }

    sum.normalize_or_zero() * AMBIENT_SCALE
}

/// Combines the albedo-times-ambient base with every light's (possibly
/// partial) contribution into `result`.
///
/// Rows a light hasn't computed yet are filled by resampling the nearest
/// computed row within the same tile, so partially refined lights still
/// cover the whole image. Returns false when `result` can't be allocated.
pub fn compose(
    lights: &[Light],
    arena: &HashMap<LightId, LightProgress>,
    schedule: &RefinementSchedule,
    albedos: &QuadImage,
    result: &mut QuadImage,
) -> bool {
    if result
        .try_resize(albedos.width(), albedos.height())
        .is_err()
    {
        return false;
    }

    let ambient = Vec3x4::splat(estimated_unshot_ambient(lights, arena));

    for (slot, albedo) in result.as_mut_slice().iter_mut().zip(albedos.as_slice()) {
        *slot = *albedo * ambient;
    }

    for light in lights {
        let Some(progress) = arena.get(&light.id) else { continue };

        let displayable = matches!(
            progress.state(),
            ProgressState::Partial | ProgressState::Full,
        ) && progress.total_contribution() > 0.0;

        if !displayable || progress.contribution().is_empty() {
            continue;
        }

        for y in 0..result.height() {
            let tile_base = y - (y % REFINEMENT_STEPS);
            let src_y = tile_base + schedule.closest_line(progress.level(), y % REFINEMENT_STEPS);
            let src_y = src_y.min(result.height() - 1);

            for gx in 0..result.groups() {
                let shaded = *albedos.group(gx, y) * *progress.contribution().group(gx, src_y);

                *result.group_mut(gx, y) += shaded;
            }
        }
    }

    true
}

/// Tone maps `result` into an 8-bit BGRA bitmap.
pub fn to_bitmap(result: &QuadImage) -> Bitmap {
    let mut bitmap = Bitmap::new(result.width(), result.height());

    for y in 0..result.height() {
        for x in 0..result.width() {
            let color = result.pixel(x, y);

            bitmap.set_pixel(
                x,
                y,
                [
                    linear_to_gamma(color.z),
                    linear_to_gamma(color.y),
                    linear_to_gamma(color.x),
                    0,
                ],
            );
        }
    }

    bitmap
}

pub fn linear_to_gamma(value: f32) -> u8 {
    (255.0 * value.max(0.0).powf(1.0 / 2.2)).min(255.0) as u8
}
