//! Headless host collaborators.
//!
//! Stand-ins for a windowing system and GPU renderer so the frame loop can be
//! driven offline: a fixed-rate frame clock with scripted surface resizes,
//! and a renderer that packs each frame's upload data without drawing it.

use glam::Mat4;

use crate::camera::PerspectiveCamera;
use crate::error::RenderError;
use crate::lighting::LightingUniforms;
use crate::scene_graph::Scene;
use crate::scheduler::{FrameHost, OutputSurface, SceneRenderer};

/// An in-memory output surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessSurface {
    client: (u32, u32),
    backing: (u32, u32),
}

impl HeadlessSurface {
    /// A surface whose backing store has not been sized yet.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            client: (width, height),
            backing: (0, 0),
        }
    }

    /// Change the displayed size, as a window resize would.
    pub fn set_client_size(&mut self, width: u32, height: u32) {
        self.client = (width, height);
    }

    pub fn backing_size(&self) -> (u32, u32) {
        self.backing
    }
}

impl OutputSurface for HeadlessSurface {
    fn client_size(&self) -> (u32, u32) {
        self.client
    }

    fn resize_backing(&mut self, width: u32, height: u32) {
        self.backing = (width, height);
    }
}

/// A surface size change applied when frame `frame` is handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledResize {
    pub frame: u64,
    pub width: u32,
    pub height: u32,
}

/// Fixed-rate frame clock over a [`HeadlessSurface`].
///
/// Frame `i` is stamped `i * 1000 / fps` milliseconds.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    surface: HeadlessSurface,
    fps: f64,
    total_frames: u64,
    next_frame: u64,
    resizes: Vec<ScheduledResize>,
}

impl HeadlessHost {
    pub fn new(surface: HeadlessSurface, fps: f64, total_frames: u64) -> Self {
        Self {
            surface,
            fps,
            total_frames,
            next_frame: 0,
            resizes: Vec::new(),
        }
    }

    pub fn with_resizes(mut self, mut resizes: Vec<ScheduledResize>) -> Self {
        resizes.sort_by_key(|r| r.frame);
        self.resizes = resizes;
        self
    }

    pub fn headless_surface(&self) -> &HeadlessSurface {
        &self.surface
    }

    /// Frames handed out so far.
    pub fn frames_issued(&self) -> u64 {
        self.next_frame
    }
}

impl FrameHost for HeadlessHost {
    fn request_frame(&mut self) -> Option<f64> {
        if self.next_frame >= self.total_frames {
            return None;
        }
        let frame = self.next_frame;
        for resize in self.resizes.iter().filter(|r| r.frame == frame) {
            self.surface.set_client_size(resize.width, resize.height);
        }
        self.next_frame += 1;
        Some(frame as f64 * 1000.0 / self.fps)
    }

    fn surface(&mut self) -> &mut dyn OutputSurface {
        &mut self.surface
    }
}

/// Packs upload data every frame and keeps the latest copy.
///
/// With `drop_every` set, every n-th submission fails, to exercise the
/// dropped frame path.
#[derive(Debug, Default)]
pub struct StatsRenderer {
    submissions: u64,
    drop_every: Option<u64>,
    instance_bytes: usize,
    lighting: Option<LightingUniforms>,
    view_projection: Option<Mat4>,
}

impl StatsRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dropping_every(n: u64) -> Self {
        Self {
            drop_every: Some(n).filter(|&n| n > 0),
            ..Self::default()
        }
    }

    pub fn submissions(&self) -> u64 {
        self.submissions
    }

    /// Size of the last particle instance upload.
    pub fn instance_bytes(&self) -> usize {
        self.instance_bytes
    }

    pub fn lighting(&self) -> Option<&LightingUniforms> {
        self.lighting.as_ref()
    }

    pub fn view_projection(&self) -> Option<Mat4> {
        self.view_projection
    }
}

impl SceneRenderer for StatsRenderer {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.submissions += 1;
        if let Some(n) = self.drop_every {
            if self.submissions % n == 0 {
                return Err(RenderError::new(format!(
                    "simulated surface loss on submission {}",
                    self.submissions
                )));
            }
        }

        self.instance_bytes = scene.rain.as_bytes().len();
        self.lighting = Some(LightingUniforms::from_scene(scene));
        self.view_projection = Some(camera.view_projection());
        Ok(())
    }
}
