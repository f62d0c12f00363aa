mod build;

use crate::{BoundingBox, Ray, Triangle};

/// Maximum traversal depth; the builder caps its recursion below this, so
/// the stack can live on the, well, stack.
const STACK_SIZE: usize = 64;

/// Bounding-volume hierarchy over the shadow triangles.
///
/// Nodes live in a flat arena; an internal node's children sit side by side,
/// so only the left index is stored. Leaves reference a range of
/// `triangle_ids`, the permutation produced while partitioning.
#[derive(Debug)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    triangle_ids: Vec<u32>,
}

#[derive(Clone, Copy, Debug)]
enum BvhNode {
    Internal {
        bounds: BoundingBox,
        left: u32,
    },

    Leaf {
        bounds: BoundingBox,
        first: u32,
        count: u32,
    },
}

impl BvhNode {
    fn bounds(&self) -> &BoundingBox {
        match self {
            Self::Internal { bounds, .. } => bounds,
            Self::Leaf { bounds, .. } => bounds,
        }
    }
}

impl Bvh {
    pub fn build(triangles: &[Triangle]) -> Self {
        let (nodes, triangle_ids) = build::run(triangles);

        Self {
            nodes,
            triangle_ids,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nearest hit of `ray` against the triangle set, as a triangle id and
    /// distance pair.
    ///
    /// Ordered descent: the closer child of an internal node is visited
    /// first, because it's the more likely one to contain the triangle that
    /// ends up being the nearest hit; the farther child goes on the stack
    /// and is skipped outright once the current best hit is closer than its
    /// entry point.
    pub fn trace(
        &self,
        ray: &Ray,
        triangles: &[Triangle],
        max_distance: f32,
    ) -> Option<(u32, f32)> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut nearest = None;
        let mut distance = max_distance;

        let mut stack = [0u32; STACK_SIZE];
        let mut stack_len = 0;
        let mut node_id = 0;

        loop {
            match self.nodes[node_id as usize] {
                BvhNode::Internal { left, .. } => {
                    let right = left + 1;

                    let left_dist = ray.hits_box_at(self.nodes[left as usize].bounds());
                    let right_dist = ray.hits_box_at(self.nodes[right as usize].bounds());

                    let (near, near_dist, far, far_dist) = if left_dist <= right_dist {
                        (left, left_dist, right, right_dist)
                    } else {
                        (right, right_dist, left, left_dist)
                    };

                    if near_dist < distance {
                        if far_dist < distance {
                            stack[stack_len] = far;
                            stack_len += 1;
                        }

                        node_id = near;
                        continue;
                    }
                }

                BvhNode::Leaf { first, count, .. } => {
                    for id in &self.triangle_ids[first as usize..(first + count) as usize] {
                        if let Some(hit) = triangles[*id as usize].hit(ray, distance) {
                            distance = hit;
                            nearest = Some((*id, hit));
                        }
                    }
                }
            }

            if stack_len > 0 {
                stack_len -= 1;
                node_id = stack[stack_len];
            } else {
                break;
            }
        }

        nearest
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec3, Vec3};

    use super::*;

    /// Grid of small triangles in the z = `z` plane, one per cell.
    fn grid(n: usize, z: f32) -> Vec<Triangle> {
        let mut triangles = Vec::new();

        for i in 0..n {
            for j in 0..n {
                let x = i as f32;
                let y = j as f32;

                triangles.push(Triangle::new(
                    [
                        vec3(x, y, z),
                        vec3(x + 0.9, y, z),
                        vec3(x, y + 0.9, z),
                    ],
                    Vec3::splat(0.5),
                ));
            }
        }

        triangles
    }

    #[test]
    fn trace_matches_brute_force() {
        let triangles = grid(8, 5.0);
        let bvh = Bvh::build(&triangles);

        for i in 0..8 {
            for j in 0..8 {
                let origin = vec3(i as f32 + 0.25, j as f32 + 0.25, 0.0);
                let ray = Ray::new(origin, vec3(0.0, 0.0, 1.0));

                let expected = triangles
                    .iter()
                    .enumerate()
                    .filter_map(|(id, triangle)| {
                        triangle.hit(&ray, f32::MAX).map(|dist| (id as u32, dist))
                    })
                    .min_by(|(_, a), (_, b)| a.total_cmp(b));

                assert_eq!(bvh.trace(&ray, &triangles, f32::MAX), expected);
            }
        }
    }

    #[test]
    fn trace_picks_nearest_of_stacked_planes() {
        let mut triangles = grid(4, 10.0);
        triangles.extend(grid(4, 3.0));
        triangles.extend(grid(4, 7.0));

        let bvh = Bvh::build(&triangles);
        let ray = Ray::new(vec3(0.25, 0.25, 0.0), vec3(0.0, 0.0, 1.0));

        let (_, distance) = bvh.trace(&ray, &triangles, f32::MAX).unwrap();

        assert_relative_eq!(distance, 3.0);
    }

    #[test]
    fn trace_respects_max_distance() {
        let triangles = grid(4, 5.0);
        let bvh = Bvh::build(&triangles);
        let ray = Ray::new(vec3(0.25, 0.25, 0.0), vec3(0.0, 0.0, 1.0));

        assert!(bvh.trace(&ray, &triangles, 4.0).is_none());
        assert!(bvh.trace(&ray, &triangles, 6.0).is_some());
    }

    #[test]
    fn single_triangle() {
        let triangles = grid(1, 1.0);
        let bvh = Bvh::build(&triangles);

        assert_eq!(bvh.node_count(), 1);

        let ray = Ray::new(vec3(0.25, 0.25, 0.0), vec3(0.0, 0.0, 1.0));

        assert!(bvh.trace(&ray, &triangles, f32::MAX).is_some());
    }
}
