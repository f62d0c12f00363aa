use glam::Vec3;

use crate::{Bitmap, Light, RgbaImage};

/// Messages the host sends to the preview worker.
///
/// Every input-altering request invalidates the results computed so far and
/// schedules a near-immediate frame, so the host sees the effect of its edit
/// quickly even while refinement is still catching up.
#[derive(Clone, Debug)]
pub enum Request {
    /// Terminates the worker.
    Exit,

    /// Replaces the light list wholesale.
    SetLights { lights: Vec<Light>, eye: Vec3 },

    /// Replaces the shadow-casting geometry; `triangles` holds three
    /// vertices per triangle. An empty list drops the geometry entirely.
    SetGeometry { triangles: Vec<Vec3> },

    /// Replaces the G-buffers. All three images must share the same
    /// dimensions; `generation` is echoed on every frame emitted until the
    /// next `SetGBuffers`, letting the host drop stale frames.
    SetGBuffers {
        albedo: RgbaImage,
        normal: RgbaImage,
        position: RgbaImage,
        eye: Vec3,
        generation: u32,
    },
}

/// Messages the preview worker sends back to the host.
#[derive(Clone, Debug)]
pub enum Reply {
    Frame { bitmap: Bitmap, generation: u32 },
}
