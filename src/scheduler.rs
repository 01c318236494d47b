//! Per-frame update loop.
//!
//! [`FrameScheduler::run_frame`] is the single entry point the host calls once
//! per display refresh. The fixed order of work within a frame is:
//!
//! 1. Resize reconciliation (backing store, camera aspect, projection)
//! 2. Spin every rotating body
//! 3. Advance the rain field
//! 4. Lightning strike check, then pulse expiry
//! 5. Key light orbit from wall time
//! 6. Render submission
//!
//! Rescheduling is the host's side of the contract: [`FrameScheduler::run`]
//! is a flat loop that asks the host for the next timestamp until it stops
//! handing them out, so long sessions never grow the call stack.
//!
//! All frame-mutable state is owned here. The renderer gets shared borrows.

use serde::Serialize;

use crate::camera::PerspectiveCamera;
use crate::config::SceneConfig;
use crate::error::{ConfigError, FrameError, RenderError};
use crate::random::{SeededSource, UniformSource};
use crate::scene_graph::Scene;
use crate::viewport::ViewportMonitor;

// ============================================================================
// Collaborators
// ============================================================================

/// The drawable output surface.
pub trait OutputSurface {
    /// Current displayed size in pixels.
    fn client_size(&self) -> (u32, u32);

    /// Resize the drawing buffer. Only called after a detected change.
    fn resize_backing(&mut self, width: u32, height: u32);
}

/// Draws a frame from read-only scene data.
pub trait SceneRenderer {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError>;
}

/// Host refresh callback source.
pub trait FrameHost {
    /// Timestamp in milliseconds of the next frame slot, or `None` once the
    /// session is over.
    fn request_frame(&mut self) -> Option<f64>;

    fn surface(&mut self) -> &mut dyn OutputSurface;
}

// ============================================================================
// Reports
// ============================================================================

/// What happened during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub resized: bool,
    pub recycled: usize,
    pub lightning_fired: bool,
    pub lightning_expired: bool,
    /// False when render submission failed and the frame was dropped.
    pub rendered: bool,
}

/// Running totals across all frames.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameStats {
    pub frames: u64,
    pub rendered: u64,
    pub dropped: u64,
    pub resizes: u64,
    pub lightning_strikes: u64,
    pub particles_recycled: u64,
}

impl FrameStats {
    fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        if report.rendered {
            self.rendered += 1;
        } else {
            self.dropped += 1;
        }
        self.resizes += u64::from(report.resized);
        self.lightning_strikes += u64::from(report.lightning_fired);
        self.particles_recycled += report.recycled as u64;
    }
}

// ============================================================================
// Scheduler
// ============================================================================

pub struct FrameScheduler<R = SeededSource> {
    viewport: ViewportMonitor,
    scene: Option<Scene>,
    camera: Option<PerspectiveCamera>,
    rng: R,
    stats: FrameStats,
}

impl FrameScheduler<SeededSource> {
    /// Reference scene and camera, seeded from `config.seed`.
    pub fn from_config(config: &SceneConfig) -> Result<Self, ConfigError> {
        Self::with_reference_scene(config, SeededSource::new(config.seed))
    }
}

impl<R: UniformSource> FrameScheduler<R> {
    /// A scheduler with no scene or camera attached yet.
    pub fn new(rng: R) -> Self {
        Self {
            viewport: ViewportMonitor::new(),
            scene: None,
            camera: None,
            rng,
            stats: FrameStats::default(),
        }
    }

    /// Build the reference scene and camera from `config` and attach both.
    pub fn with_reference_scene(config: &SceneConfig, mut rng: R) -> Result<Self, ConfigError> {
        let scene = Scene::reference(config, &mut rng)?;
        // Aspect is provisional until the first frame's resize check.
        let camera = PerspectiveCamera::new(&config.camera, 1.0)?;

        let mut scheduler = Self::new(rng);
        scheduler.attach_scene(scene);
        scheduler.attach_camera(camera);
        Ok(scheduler)
    }

    pub fn attach_scene(&mut self, scene: Scene) {
        log::info!(
            "Scene attached: {} rotating bodies, {} particles",
            scene.bodies.len(),
            scene.rain.len()
        );
        self.scene = Some(scene);
    }

    pub fn attach_camera(&mut self, camera: PerspectiveCamera) {
        self.camera = Some(camera);
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.camera.as_ref()
    }

    pub fn viewport(&self) -> &ViewportMonitor {
        &self.viewport
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Run one frame at host time `now` (milliseconds).
    ///
    /// Fails without touching any state if `now` is not finite or the scene
    /// or camera is missing.
    /// A render failure drops the frame's visuals but keeps the simulation
    /// step that preceded it.
    pub fn run_frame(
        &mut self,
        now: f64,
        surface: &mut dyn OutputSurface,
        renderer: &mut dyn SceneRenderer,
    ) -> Result<FrameReport, FrameError> {
        if !now.is_finite() {
            return Err(FrameError::NonFiniteTimestamp(now));
        }
        let scene = self.scene.as_mut().ok_or(FrameError::MissingScene)?;
        let camera = self.camera.as_mut().ok_or(FrameError::MissingCamera)?;
        let mut report = FrameReport::default();

        let (width, height) = surface.client_size();
        if self.viewport.check_resize(width, height) {
            surface.resize_backing(width, height);
            if width > 0 && height > 0 {
                camera.aspect = width as f32 / height as f32;
                camera.update_projection_matrix();
                log::debug!("Viewport resized to {}x{}, aspect {:.3}", width, height, camera.aspect);
            } else {
                log::debug!("Viewport collapsed to {}x{}, projection kept", width, height);
            }
            report.resized = true;
        }

        for body in &mut scene.bodies {
            body.step();
        }

        report.recycled = scene.rain.advance(&mut self.rng);

        report.lightning_fired = scene.lightning.maybe_activate(&mut self.rng, now);
        report.lightning_expired = scene.lightning.tick(now);
        scene.lightning_light.intensity = scene.lightning.intensity();

        scene.key_light.update(now * 0.001);

        report.rendered = match renderer.render(scene, camera) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Dropped frame at {:.1}ms: {}", now, e);
                false
            }
        };

        self.stats.record(&report);
        log::trace!("Frame {} at {:.1}ms: {:?}", self.stats.frames, now, report);
        Ok(report)
    }

    /// Drive frames until the host stops scheduling them.
    pub fn run<H: FrameHost>(
        &mut self,
        host: &mut H,
        renderer: &mut dyn SceneRenderer,
    ) -> Result<FrameStats, FrameError> {
        while let Some(now) = host.request_frame() {
            self.run_frame(now, host.surface(), renderer)?;
        }
        log::info!(
            "Session ended after {} frames ({} dropped)",
            self.stats.frames,
            self.stats.dropped
        );
        Ok(self.stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RainConfig;
    use crate::particle::{Particle, ParticleField};
    use crate::random::ScriptedSource;

    struct FixedSurface {
        size: (u32, u32),
        backing: Option<(u32, u32)>,
        resizes: usize,
    }

    impl FixedSurface {
        fn new(width: u32, height: u32) -> Self {
            Self {
                size: (width, height),
                backing: None,
                resizes: 0,
            }
        }
    }

    impl OutputSurface for FixedSurface {
        fn client_size(&self) -> (u32, u32) {
            self.size
        }

        fn resize_backing(&mut self, width: u32, height: u32) {
            self.backing = Some((width, height));
            self.resizes += 1;
        }
    }

    /// Captures what the renderer saw, optionally failing.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(f32, f32)>,
        fail: bool,
    }

    impl SceneRenderer for Recorder {
        fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
            self.seen.push((scene.lightning_light.intensity, camera.aspect));
            if self.fail {
                Err(RenderError::new("device lost"))
            } else {
                Ok(())
            }
        }
    }

    fn small_config() -> SceneConfig {
        let mut config = SceneConfig::default();
        config.rain.particle_count = 20;
        config
    }

    #[test]
    fn test_missing_scene_is_an_error() {
        let mut scheduler = FrameScheduler::new(ScriptedSource::constant(0.5));
        let err = scheduler
            .run_frame(0.0, &mut FixedSurface::new(800, 600), &mut Recorder::default())
            .unwrap_err();
        assert_eq!(err, FrameError::MissingScene);
        assert_eq!(scheduler.stats().frames, 0);
    }

    #[test]
    fn test_missing_camera_is_an_error() {
        let config = small_config();
        let mut rng = ScriptedSource::constant(0.5);
        let scene = Scene::reference(&config, &mut rng).unwrap();
        let mut scheduler = FrameScheduler::new(rng);
        scheduler.attach_scene(scene.clone());

        let mut surface = FixedSurface::new(800, 600);
        let err = scheduler
            .run_frame(0.0, &mut surface, &mut Recorder::default())
            .unwrap_err();
        assert_eq!(err, FrameError::MissingCamera);
        // Nothing advanced, not even the resize check.
        assert_eq!(scheduler.scene(), Some(&scene));
        assert_eq!(surface.resizes, 0);
    }

    #[test]
    fn test_non_finite_timestamp_is_rejected() {
        let mut config = small_config();
        config.lightning.probability_per_frame = 1.0;
        let mut scheduler =
            FrameScheduler::with_reference_scene(&config, ScriptedSource::constant(0.5)).unwrap();
        let mut surface = FixedSurface::new(800, 600);
        let before = scheduler.scene().unwrap().clone();

        for now in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = scheduler
                .run_frame(now, &mut surface, &mut Recorder::default())
                .unwrap_err();
            assert!(matches!(err, FrameError::NonFiniteTimestamp(_)));
        }
        // A NaN deadline would never expire, so lightning must stay idle.
        assert_eq!(scheduler.scene(), Some(&before));
        assert!(!scheduler.scene().unwrap().lightning.is_armed());
        assert_eq!(scheduler.stats().frames, 0);
        assert_eq!(surface.resizes, 0);

        let report = scheduler.run_frame(0.0, &mut surface, &mut Recorder::default()).unwrap();
        assert!(report.lightning_fired);
        assert_eq!(scheduler.scene().unwrap().lightning.armed_until(), Some(50.0));
        assert_eq!(scheduler.stats().frames, 1);
    }

    #[test]
    fn test_projection_recomputed_only_on_resize() {
        let config = small_config();
        let mut scheduler =
            FrameScheduler::with_reference_scene(&config, ScriptedSource::constant(0.5)).unwrap();
        let mut surface = FixedSurface::new(800, 400);
        let mut renderer = Recorder::default();

        let first = scheduler.run_frame(0.0, &mut surface, &mut renderer).unwrap();
        assert!(first.resized);
        assert_eq!(surface.backing, Some((800, 400)));
        let updates = scheduler.camera().unwrap().projection_updates();

        for i in 1..10 {
            let report = scheduler.run_frame(i as f64 * 16.0, &mut surface, &mut renderer).unwrap();
            assert!(!report.resized);
        }
        assert_eq!(scheduler.camera().unwrap().projection_updates(), updates);
        assert_eq!(surface.resizes, 1);

        surface.size = (1000, 500);
        scheduler.run_frame(200.0, &mut surface, &mut renderer).unwrap();
        assert_eq!(scheduler.camera().unwrap().projection_updates(), updates + 1);
        assert_eq!(renderer.seen.last().unwrap().1, 2.0);
    }

    #[test]
    fn test_zero_height_keeps_projection() {
        let config = small_config();
        let mut scheduler =
            FrameScheduler::with_reference_scene(&config, ScriptedSource::constant(0.5)).unwrap();
        let mut surface = FixedSurface::new(0, 0);
        let report = scheduler
            .run_frame(0.0, &mut surface, &mut Recorder::default())
            .unwrap();

        assert!(report.resized);
        assert_eq!(surface.backing, Some((0, 0)));
        let camera = scheduler.camera().unwrap();
        assert_eq!(camera.aspect, 1.0);
        assert!(camera.projection().is_finite());
    }

    #[test]
    fn test_renderer_sees_updated_lightning() {
        let mut config = small_config();
        config.lightning.probability_per_frame = 1.0;
        let mut scheduler =
            FrameScheduler::with_reference_scene(&config, ScriptedSource::constant(0.5)).unwrap();
        let mut renderer = Recorder::default();
        let mut surface = FixedSurface::new(800, 600);

        let report = scheduler.run_frame(0.0, &mut surface, &mut renderer).unwrap();
        assert!(report.lightning_fired);
        assert!(!report.lightning_expired);
        assert_eq!(renderer.seen[0].0, 5.0);
    }

    #[test]
    fn test_render_failure_keeps_simulation_state() {
        let config = small_config();
        let mut scheduler =
            FrameScheduler::with_reference_scene(&config, ScriptedSource::constant(0.5)).unwrap();
        let mut surface = FixedSurface::new(800, 600);
        let mut failing = Recorder {
            fail: true,
            ..Recorder::default()
        };

        let before = scheduler.scene().unwrap().clone();
        let report = scheduler.run_frame(0.0, &mut surface, &mut failing).unwrap();
        assert!(!report.rendered);

        let after = scheduler.scene().unwrap();
        assert_ne!(after.rain, before.rain);
        assert!(after.body("cube").unwrap().transform.rotation.x > 0.0);
        assert_eq!(scheduler.stats().dropped, 1);

        // Next frame advances exactly once more, not twice.
        let cube_x = after.body("cube").unwrap().transform.rotation.x;
        scheduler.run_frame(16.0, &mut surface, &mut Recorder::default()).unwrap();
        let cube_x2 = scheduler.scene().unwrap().body("cube").unwrap().transform.rotation.x;
        assert!((cube_x2 - cube_x - 0.01).abs() < 1e-6);
        assert_eq!(scheduler.stats().rendered, 1);
    }

    #[test]
    fn test_particles_draw_before_lightning() {
        // One particle sitting on the floor: it recycles this frame and takes
        // the first sample; lightning takes the second.
        let mut config = small_config();
        config.lightning.probability_per_frame = 0.5;
        let rain = RainConfig {
            particle_count: 1,
            fall_step: 2.0,
            ..RainConfig::default()
        };
        let mut scene = Scene::reference(&config, &mut ScriptedSource::constant(0.5)).unwrap();
        scene.rain =
            ParticleField::from_particles(vec![Particle::new([0.0, -249.0, 0.0], 2.0)], &rain).unwrap();

        let mut scheduler = FrameScheduler::new(ScriptedSource::new(vec![0.9, 0.1]));
        scheduler.attach_scene(scene);
        scheduler.attach_camera(PerspectiveCamera::new(&config.camera, 1.0).unwrap());

        let report = scheduler
            .run_frame(0.0, &mut FixedSurface::new(10, 10), &mut Recorder::default())
            .unwrap();
        assert_eq!(report.recycled, 1);
        assert!(report.lightning_fired);
        let y = scheduler.scene().unwrap().rain.particles()[0].height();
        assert!((y - 450.0).abs() < 1e-3);
    }

    #[test]
    fn test_key_light_follows_wall_time() {
        let config = small_config();
        let mut scheduler =
            FrameScheduler::with_reference_scene(&config, ScriptedSource::constant(0.5)).unwrap();
        scheduler
            .run_frame(1000.0, &mut FixedSurface::new(800, 600), &mut Recorder::default())
            .unwrap();
        let light = &scheduler.scene().unwrap().key_light;
        assert!((light.position.x - 20.0 * 1.0_f32.cos()).abs() < 1e-4);
        assert!((light.position.y - 20.0 * 1.0_f32.sin()).abs() < 1e-4);
        assert_eq!(light.position.z, 30.0);
    }
}
