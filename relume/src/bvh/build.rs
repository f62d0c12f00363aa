use std::ops::Index;

use glam::Vec3;

use super::BvhNode;
use crate::{BoundingBox, Triangle};

/// Number of candidate bins per axis when looking for the optimal splitting
/// plane¹.
///
/// ¹ see: binned SAH
const BINS: usize = 16;

/// Recursion cap, comfortably below the traversal stack size.
const MAX_DEPTH: usize = 48;

/// Constructs the node arena using a binned SAH algorithm.
///
/// Thanks to:
/// https://jacco.ompf2.com/2022/04/13/how-to-build-a-bvh-part-1-basics/.
pub(super) fn run(triangles: &[Triangle]) -> (Vec<BvhNode>, Vec<u32>) {
    if triangles.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut primitives: Vec<_> = triangles
        .iter()
        .enumerate()
        .map(|(id, triangle)| Primitive {
            bounds: triangle.bounding_box(),
            center: triangle.center(),
            id: id as u32,
        })
        .collect();

    let mut nodes = vec![BvhNode::Leaf {
        bounds: BoundingBox::default(),
        first: 0,
        count: 0,
    }];

    balance(&mut nodes, 0, &mut primitives, 0, 0);

    let ids = primitives.iter().map(|primitive| primitive.id).collect();

    (nodes, ids)
}

#[derive(Clone, Copy, Debug)]
struct Primitive {
    bounds: BoundingBox,
    center: Vec3,
    id: u32,
}

fn balance(
    nodes: &mut Vec<BvhNode>,
    node_id: usize,
    primitives: &mut [Primitive],
    offset: usize,
    depth: usize,
) {
    let bounds = primitives
        .iter()
        .fold(BoundingBox::default(), |bb, primitive| bb + primitive.bounds);

    let as_leaf = BvhNode::Leaf {
        bounds,
        first: offset as u32,
        count: primitives.len() as u32,
    };

    if primitives.len() <= 1 || depth >= MAX_DEPTH {
        nodes[node_id] = as_leaf;
        return;
    }

    let leaf_cost = (primitives.len() as f32) * bounds.half_area();

    let Some(plane) = find_splitting_plane(primitives) else {
        nodes[node_id] = as_leaf;
        return;
    };

    if plane.split_cost >= leaf_cost {
        nodes[node_id] = as_leaf;
        return;
    }

    // In-place partition around the plane
    let mut i = 0;
    let mut j = primitives.len();

    while i < j {
        if primitives[i].center[plane.split_by] < plane.split_at {
            i += 1;
        } else {
            j -= 1;
            primitives.swap(i, j);
        }
    }

    if i == 0 || i == primitives.len() {
        nodes[node_id] = as_leaf;
        return;
    }

    let (left_primitives, right_primitives) = primitives.split_at_mut(i);

    let left_id = nodes.len();

    nodes.push(as_leaf);
    nodes.push(as_leaf);

    nodes[node_id] = BvhNode::Internal {
        bounds,
        left: left_id as u32,
    };

    balance(nodes, left_id, left_primitives, offset, depth + 1);
    balance(nodes, left_id + 1, right_primitives, offset + i, depth + 1);
}

#[derive(Clone, Copy, Debug)]
struct SplittingPlane {
    split_by: Axis,
    split_at: f32,
    split_cost: f32,
}

#[derive(Clone, Copy, Default, Debug)]
struct Bin {
    bounds: BoundingBox,
    count: u32,
}

fn find_splitting_plane(primitives: &[Primitive]) -> Option<SplittingPlane> {
    if primitives.len() <= 1 {
        return None;
    }

    let centroid_bb =
        BoundingBox::from_points(primitives.iter().map(|primitive| primitive.center));

    let mut best: Option<SplittingPlane> = None;

    for split_by in Axis::all() {
        let extent = centroid_bb.extent()[split_by];

        if extent <= 0.0 {
            continue;
        }

        let mut bins = [Bin::default(); BINS];
        let scale = (BINS as f32) / extent;

        for primitive in primitives {
            let bin_idx = scale * (primitive.center[split_by] - centroid_bb.min()[split_by]);
            let bin_idx = (bin_idx as usize).min(BINS - 1);

            bins[bin_idx].bounds += primitive.bounds;
            bins[bin_idx].count += 1;
        }

        // Prefix / suffix sweeps over the bins
        let mut left_areas = [0.0; BINS - 1];
        let mut right_areas = [0.0; BINS - 1];
        let mut left_counts = [0; BINS - 1];
        let mut right_counts = [0; BINS - 1];
        let mut left_bb = BoundingBox::default();
        let mut right_bb = BoundingBox::default();
        let mut left_count = 0;
        let mut right_count = 0;

        for i in 0..(BINS - 1) {
            left_count += bins[i].count;
            left_counts[i] = left_count;

            left_bb += bins[i].bounds;
            left_areas[i] = left_bb.half_area();

            right_count += bins[BINS - 1 - i].count;
            right_counts[BINS - 2 - i] = right_count;

            right_bb += bins[BINS - 1 - i].bounds;
            right_areas[BINS - 2 - i] = right_bb.half_area();
        }

        let scale = extent / (BINS as f32);

        for i in 0..(BINS - 1) {
            let split_cost = (left_counts[i] as f32) * left_areas[i]
                + (right_counts[i] as f32) * right_areas[i];

            let is_better = best.map_or(true, |best| split_cost < best.split_cost);

            if is_better {
                let split_at = centroid_bb.min()[split_by] + scale * ((i + 1) as f32);

                best = Some(SplittingPlane {
                    split_by,
                    split_at,
                    split_cost,
                });
            }
        }
    }

    best
}

#[derive(Clone, Copy, Debug)]
enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn all() -> impl Iterator<Item = Self> {
        [Self::X, Self::Y, Self::Z].into_iter()
    }
}

impl Index<Axis> for Vec3 {
    type Output = f32;

    fn index(&self, index: Axis) -> &Self::Output {
        match index {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}
