use std::thread;

use glam::Vec4;

use crate::models::Light;
use crate::{eval, QuadImage, RayEnv, RayPacket, Vec3x4, REFINEMENT_STEPS};

/// Cooperating worker slots each kernel invocation fans out to; every slot
/// owns every fourth selected scanline.
pub const KERNEL_WORKERS: usize = 4;

/// Shadow-ray origin offset along the ray, to avoid self-intersection with
/// the surface the pixel sits on.
const RAY_BIAS: f32 = 0.02;

/// Per-channel floor below which a shaded value does not count towards a
/// light's total, so far, dim lights are not registered as interesting.
const BRIGHTNESS_THRESHOLD: f32 = 0.1 / 1024.0;

/// Max-t for shadow packets; lanes are re-checked against the actual ray
/// length afterwards.
const MAX_SHADOW_DISTANCE: f32 = 1.0e9;

/// Runs one refinement pass of `light` over the rows selected by
/// `calc_mask` (a bitmask over row-within-tile indices), writing the
/// unshadowed-times-mask contribution into `contribution` and returning the
/// pass's total light magnitude.
///
/// The selected rows are partitioned across `KERNEL_WORKERS` scoped threads
/// up front, so every worker gets disjoint `&mut` row slices; the worker
/// totals are summed in slot order to keep the result reproducible.
pub fn run(
    light: &Light,
    positions: &QuadImage,
    normals: &QuadImage,
    albedos: &QuadImage,
    env: &RayEnv,
    calc_mask: u32,
    contribution: &mut QuadImage,
) -> f32 {
    let mut buckets: [Vec<(usize, &mut [Vec3x4])>; KERNEL_WORKERS] = Default::default();
    let mut work_line = 0;

    for (y, row) in contribution.rows_mut().enumerate() {
        if calc_mask & (1 << (y % REFINEMENT_STEPS)) == 0 {
            continue;
        }

        buckets[work_line % KERNEL_WORKERS].push((y, row));
        work_line += 1;
    }

    let totals: Vec<f32> = thread::scope(|scope| {
        let workers: Vec<_> = buckets
            .into_iter()
            .map(|rows| {
                scope.spawn(move || shade_rows(light, positions, normals, albedos, env, rows))
            })
            .collect();

        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect()
    });

    totals.into_iter().sum()
}

fn shade_rows(
    light: &Light,
    positions: &QuadImage,
    normals: &QuadImage,
    albedos: &QuadImage,
    env: &RayEnv,
    rows: Vec<(usize, &mut [Vec3x4])>,
) -> f32 {
    let threshold = Vec4::splat(BRIGHTNESS_THRESHOLD);
    let mut total = Vec3x4::ZERO;

    for (y, row) in rows {
        let mut row_total = Vec3x4::ZERO;

        for (gx, slot) in row.iter_mut().enumerate() {
            let position = positions.group(gx, y);
            let normal = normals.group(gx, y);

            let mut contrib = eval::light_at(light, position, normal);

            if !contrib.is_zero() {
                let to_light = Vec3x4::splat(light.position) - *position;
                let length = to_light.length().max(Vec4::splat(f32::MIN_POSITIVE));
                let directions = to_light * length.recip();
                let origins = *position + directions * RAY_BIAS;

                let hit = env.trace_packet(
                    &RayPacket {
                        origins,
                        directions,
                    },
                    MAX_SHADOW_DISTANCE,
                );

                for lane in 0..4 {
                    if hit.ids[lane] >= 0 && hit.distances[lane] < length[lane] {
                        contrib.zero_lane(lane);
                    }
                }

                *slot = contrib;

                let shaded = (contrib * *albedos.group(gx, y)).keep_above(threshold);
                row_total += shaded;
            } else {
                *slot = contrib;
            }
        }

        total += row_total;
    }

    // Sum of the four lanes of the accumulated color's length
    total.length().element_sum()
}
