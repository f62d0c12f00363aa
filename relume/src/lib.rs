//! Incremental, progressive lighting preview engine.
//!
//! The engine runs on a background worker thread and talks to its host over
//! channels: the host streams in G-buffers, shadow geometry and a light
//! list, and gets back tone-mapped frames that improve over time. Each light
//! is refined independently over 32 bit-reversed scanline passes, with a
//! priority scheme that spends the compute budget on the lights that matter
//! most to the current view; rows that haven't been computed yet are filled
//! in at display time from the nearest row that has.
//!
//! ```no_run
//! use relume::models::{Light, LightId, Request};
//! use relume::Engine;
//! use glam::{vec3, Vec3};
//!
//! let handle = Engine::spawn()?;
//!
//! handle.requests().send(Request::SetLights {
//!     lights: vec![Light::directional(
//!         LightId::new(1),
//!         vec3(0.0, 0.0, 1.0e6),
//!         vec3(0.0, 0.0, -1.0),
//!         Vec3::ONE,
//!     )],
//!     eye: Vec3::ZERO,
//! })?;
//!
//! // ... send geometry and G-buffers, then drain frames from
//! // handle.replies() and blit the latest one
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

mod bounds;
mod bvh;
mod compositor;
mod engine;
mod eval;
mod kernel;
mod progress;
mod quad;
mod quad_image;
mod ray;
mod ray_env;
mod refinement;
mod triangle;

pub use relume_models as models;

pub use self::engine::*;
pub(crate) use self::bounds::*;
pub(crate) use self::bvh::*;
pub(crate) use self::progress::*;
pub(crate) use self::quad::*;
pub(crate) use self::quad_image::*;
pub(crate) use self::ray::*;
pub(crate) use self::ray_env::*;
pub(crate) use self::refinement::*;
pub(crate) use self::triangle::*;
