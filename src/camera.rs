//! Perspective camera with lazily recomputed projection.
//!
//! The projection matrix is cached and only rebuilt through
//! [`PerspectiveCamera::update_projection_matrix`], which the scheduler calls
//! after a detected resize. Changing the aspect ratio alone does not touch it.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    projection: Mat4,
    projection_updates: u64,
}

impl PerspectiveCamera {
    /// Create a camera from config with an initial aspect ratio.
    pub fn new(config: &CameraConfig, aspect: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut camera = Self {
            fov: config.fov,
            aspect,
            near: config.near,
            far: config.far,
            position: Vec3::from_array(config.position),
            target: Vec3::ZERO,
            projection: Mat4::IDENTITY,
            projection_updates: 0,
        };
        camera.update_projection_matrix();
        Ok(camera)
    }

    /// Rebuild the cached projection from the current parameters.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
        self.projection_updates += 1;
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// How many times the projection has been rebuilt, construction included.
    pub fn projection_updates(&self) -> u64 {
        self.projection_updates
    }
}
