use std::collections::HashMap;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use glam::Vec3;

use crate::models::{Light, LightId, Reply, Request, RgbaImage};
use crate::{
    compositor, kernel, BoundingBox, LightProgress, ProgressState, QuadImage, RayEnv,
    RefinementSchedule, REFINEMENT_STEPS,
};

/// Minimum pause between two frames while useful work remains; once the work
/// runs out, the final frame goes out promptly regardless.
const SEND_INTERVAL: Duration = Duration::from_secs(10);

/// Initial value of the contribution counter. Starting high keeps the
/// recency comparison meaningful even against records stamped before the
/// first discard of a long session.
const CONTRIBUTION_TICK_SEED: u64 = 1_000_000;

/// Reflectance assigned to every imported shadow triangle.
const TRIANGLE_REFLECTANCE: Vec3 = Vec3::splat(0.5);

/// Host-side handle of a running preview worker.
///
/// Owns the request sender, the reply receiver and the worker thread;
/// dropping the handle disconnects the request channel, which ends the
/// worker loop just like an explicit `Request::Exit`.
pub struct EngineHandle {
    requests: Sender<Request>,
    replies: Receiver<Reply>,
    worker: JoinHandle<()>,
}

impl EngineHandle {
    pub fn requests(&self) -> &Sender<Request> {
        &self.requests
    }

    pub fn replies(&self) -> &Receiver<Reply> {
        &self.replies
    }

    /// Asks the worker to exit and waits for it.
    pub fn shutdown(self) {
        _ = self.requests.send(Request::Exit);
        _ = self.worker.join();
    }
}

/// The preview scheduler: owns all engine state and runs the message /
/// compute / emit loop on a dedicated worker thread.
pub struct Engine {
    requests: Receiver<Request>,
    replies: Sender<Reply>,

    lights: Vec<Light>,
    arena: HashMap<LightId, LightProgress>,
    schedule: RefinementSchedule,

    positions: QuadImage,
    normals: QuadImage,
    albedos: QuadImage,
    result: QuadImage,

    env: Option<RayEnv>,
    eye: Vec3,
    scene_bounds: BoundingBox,

    generation: u32,
    contribution_tick: u64,
    result_changed: bool,
    last_send: Option<Instant>,
}

impl Engine {
    /// Spawns the worker thread and returns the host's handle to it.
    pub fn spawn() -> io::Result<EngineHandle> {
        let (request_tx, request_rx) = channel::unbounded();
        let (reply_tx, reply_rx) = channel::unbounded();

        let worker = thread::Builder::new()
            .name("relume-preview".into())
            .spawn(move || Engine::new(request_rx, reply_tx).run())?;

        Ok(EngineHandle {
            requests: request_tx,
            replies: reply_rx,
            worker,
        })
    }

    fn new(requests: Receiver<Request>, replies: Sender<Reply>) -> Self {
        Self {
            requests,
            replies,
            lights: Vec::new(),
            arena: HashMap::new(),
            schedule: RefinementSchedule::new(),
            positions: QuadImage::default(),
            normals: QuadImage::default(),
            albedos: QuadImage::default(),
            result: QuadImage::default(),
            env: None,
            eye: Vec3::ZERO,
            scene_bounds: BoundingBox::default(),
            generation: 0,
            contribution_tick: CONTRIBUTION_TICK_SEED,
            result_changed: false,
            last_send: None,
        }
    }

    /// The main loop: drain requests, refine the best light, emit frames.
    ///
    /// Requests always take effect before more compute is spent, so an edit
    /// arriving mid-refinement invalidates stale work at the next pass
    /// boundary rather than after the light converges.
    fn run(mut self) {
        loop {
            while self.requests_pending() || !self.has_useful_work() {
                if !self.requests_pending() {
                    self.flush();
                }

                let Ok(request) = self.requests.recv() else {
                    // Host dropped its handle
                    return;
                };

                if self.handle(request) {
                    return;
                }
            }

            self.do_work();
            self.flush();
        }
    }

    fn requests_pending(&self) -> bool {
        !self.requests.is_empty()
    }

    /// Applies one request; returns true when the worker should exit.
    fn handle(&mut self, request: Request) -> bool {
        match request {
            Request::Exit => return true,

            Request::SetLights { lights, eye } => self.set_lights(lights, eye),
            Request::SetGeometry { triangles } => self.set_geometry(triangles),

            Request::SetGBuffers {
                albedo,
                normal,
                position,
                eye,
                generation,
            } => self.set_gbuffers(albedo, normal, position, eye, generation),
        }

        false
    }

    fn set_lights(&mut self, lights: Vec<Light>, eye: Vec3) {
        if lights.is_empty() && self.env.is_some() {
            log::warn!("Rejecting empty light list while shadow geometry is loaded");
            return;
        }

        let mut created = 0;

        for light in &lights {
            self.arena.entry(light.id).or_insert_with(|| {
                created += 1;
                LightProgress::default()
            });
        }

        log::debug!("Light list replaced: {} lights ({} new)", lights.len(), created);

        self.lights = lights;
        self.eye = eye;
        self.discard_results();
    }

    fn set_geometry(&mut self, triangles: Vec<Vec3>) {
        if triangles.len() % 3 != 0 {
            log::warn!(
                "Rejecting geometry: {} vertices is not a whole number of triangles",
                triangles.len(),
            );
            return;
        }

        if triangles.is_empty() {
            log::debug!("Geometry cleared");
            self.env = None;
        } else {
            let mut env = RayEnv::default();

            for triangle in triangles.chunks_exact(3) {
                env.add_triangle(triangle[0], triangle[1], triangle[2], TRIANGLE_REFLECTANCE);
            }

            log::debug!("Geometry replaced: {} triangles", env.triangle_count());
            self.env = Some(env);
        }

        self.discard_results();
    }

    fn set_gbuffers(
        &mut self,
        albedo: RgbaImage,
        normal: RgbaImage,
        position: RgbaImage,
        eye: Vec3,
        generation: u32,
    ) {
        let dims = (albedo.width(), albedo.height());

        if (normal.width(), normal.height()) != dims
            || (position.width(), position.height()) != dims
        {
            log::warn!(
                "Rejecting G-buffers: mismatched dimensions {}x{} / {}x{} / {}x{}",
                albedo.width(),
                albedo.height(),
                normal.width(),
                normal.height(),
                position.width(),
                position.height(),
            );
            return;
        }

        self.albedos = QuadImage::from_rgba(&albedo);
        self.normals = QuadImage::from_rgba(&normal);
        self.positions = QuadImage::from_rgba(&position);
        self.eye = eye;
        self.generation = generation;
        self.recompute_scene_bounds();

        log::debug!(
            "G-buffers replaced: {}x{}, generation {}",
            dims.0,
            dims.1,
            generation,
        );

        self.discard_results();
    }

    /// The bounding box of every rendered pixel plus the eye; lights inside
    /// it get the new-in-view priority boost.
    fn recompute_scene_bounds(&mut self) {
        let mut bounds = BoundingBox::default();

        bounds.grow(self.eye);

        for group in self.positions.as_slice() {
            for lane in 0..4 {
                bounds.grow(group.lane(lane));
            }
        }

        self.scene_bounds = bounds;
    }

    /// Invalidates every per-light result while keeping the brightness and
    /// recency hints, then schedules a near-immediate frame so the host sees
    /// the input change quickly.
    fn discard_results(&mut self) {
        for progress in self.arena.values_mut() {
            progress.discard();
        }

        self.contribution_tick += 1;

        for light in &self.lights {
            let Some(progress) = self.arena.get_mut(&light.id) else {
                continue;
            };

            let distance = if light.is_directional() {
                0.0
            } else {
                self.eye.distance(light.position)
            };

            progress.set_distance_to_eye(distance);
        }

        self.result_changed = true;
        self.last_send = None;
    }

    /// Useful work exists while some light still has passes left and there
    /// is geometry to trace shadows against.
    fn has_useful_work(&self) -> bool {
        self.env.is_some()
            && self.lights.iter().any(|light| {
                self.arena
                    .get(&light.id)
                    .is_some_and(LightProgress::has_work)
            })
    }

    /// The non-Full light every other non-Full light is lower priority than.
    fn pick_light(&self) -> Option<usize> {
        let mut best: Option<usize> = None;

        for (index, light) in self.lights.iter().enumerate() {
            let Some(progress) = self.arena.get(&light.id) else {
                continue;
            };

            if !progress.has_work() {
                continue;
            }

            best = match best {
                None => Some(index),

                Some(current) => {
                    let current_light = &self.lights[current];
                    let current_progress = &self.arena[&current_light.id];

                    if current_progress.lower_priority_than(
                        current_light,
                        progress,
                        light,
                        &self.scene_bounds,
                    ) {
                        Some(index)
                    } else {
                        Some(current)
                    }
                }
            };
        }

        best
    }

    /// One refinement pass of the highest-priority light.
    fn do_work(&mut self) {
        let Some(index) = self.pick_light() else { return };

        if let Some(env) = &mut self.env {
            env.ensure_built();
        }

        let Some(env) = &self.env else { return };

        let light = self.lights[index];
        let Some(progress) = self.arena.get_mut(&light.id) else {
            return;
        };

        let (previous_mask, level) = if progress.state() == ProgressState::Partial {
            (self.schedule.line_mask(progress.level()), progress.level() + 1)
        } else {
            (0, 0)
        };

        let calc_mask = self.schedule.line_mask(level) & !previous_mask;

        let height = self.albedos.height();
        let has_rows = (0..height).any(|y| calc_mask & (1 << (y % REFINEMENT_STEPS)) != 0);

        if !has_rows {
            // This pass's scanlines all fall beyond the image; count the
            // level as done without touching the results
            progress.advance_level(level);
            return;
        }

        if !progress.prepare_contribution(self.albedos.width(), height) {
            log::warn!(
                "Contribution matrix allocation failed; benching light {}",
                light.id.get(),
            );
            progress.fail_allocation();
            return;
        }

        let total = kernel::run(
            &light,
            &self.positions,
            &self.normals,
            &self.albedos,
            env,
            calc_mask,
            progress.contribution_mut(),
        );

        if total != 0.0 {
            self.contribution_tick += 1;
            self.result_changed = true;
        }

        progress.record_pass(level, total, self.contribution_tick);
    }

    /// Emits a frame if the result changed and the pacing allows it: at most
    /// one frame per `SEND_INTERVAL` while refinement is still running, and
    /// promptly once it isn't (or after a discard cleared `last_send`).
    fn flush(&mut self) {
        if !self.result_changed || self.albedos.is_empty() {
            return;
        }

        let due = self
            .last_send
            .map_or(true, |at| at.elapsed() > SEND_INTERVAL);

        if !due && self.has_useful_work() {
            return;
        }

        if !compositor::compose(
            &self.lights,
            &self.arena,
            &self.schedule,
            &self.albedos,
            &mut self.result,
        ) {
            log::warn!("Result image allocation failed; dropping this frame");
            return;
        }

        let bitmap = compositor::to_bitmap(&self.result);

        _ = self.replies.send(Reply::Frame {
            bitmap,
            generation: self.generation,
        });

        self.result_changed = false;
        self.last_send = Some(Instant::now());
    }
}
