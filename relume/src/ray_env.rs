use std::time::Instant;

use glam::Vec3;

use crate::{Bvh, PacketHit, Ray, RayPacket, Triangle};

/// Triangle soup plus the acceleration structure behind shadow queries.
///
/// The structure is built lazily on the first trace request after geometry
/// arrives, because the host often streams geometry and G-buffers
/// back-to-back and only the version that survives until shading is worth
/// indexing. Once built it stays immutable until the geometry is replaced.
#[derive(Debug, Default)]
pub struct RayEnv {
    triangles: Vec<Triangle>,
    bvh: Option<Bvh>,
}

impl RayEnv {
    pub fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, reflectance: Vec3) {
        self.triangles.push(Triangle::new([a, b, c], reflectance));
        self.bvh = None;
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_built(&self) -> bool {
        self.bvh.is_some()
    }

    pub fn ensure_built(&mut self) {
        if self.bvh.is_some() || self.triangles.is_empty() {
            return;
        }

        let started = Instant::now();
        let bvh = Bvh::build(&self.triangles);

        log::debug!(
            "Acceleration structure built: {} triangles, {} nodes, {:.2?}",
            self.triangles.len(),
            bvh.node_count(),
            started.elapsed(),
        );

        self.bvh = Some(bvh);
    }

    /// Traces four shadow rays at once; lanes with no hit report an id of -1
    /// and a distance of `f32::MAX`.
    pub fn trace_packet(&self, packet: &RayPacket, max_distance: f32) -> PacketHit {
        let mut hit = PacketHit::none();

        let Some(bvh) = &self.bvh else { return hit };

        for lane in 0..4 {
            let ray = Ray::new(packet.origins.lane(lane), packet.directions.lane(lane));

            if let Some((id, distance)) = bvh.trace(&ray, &self.triangles, max_distance) {
                hit.ids[lane] = id as i32;
                hit.distances[lane] = distance;
            }
        }

        hit
    }
}
