//! Scene configuration.
//!
//! Every tunable the frame loop reads lives here, loaded once at startup and
//! validated before the first frame. All fields have serde defaults matching
//! the reference rain scene, so a config file only needs the values it
//! overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_particle_count() -> usize {
    10_000
}

fn default_fall_step() -> f32 {
    2.0
}

fn default_lower_bound() -> f32 {
    -250.0
}

fn default_upper_bound() -> f32 {
    500.0
}

fn default_respawn_floor() -> f32 {
    0.0
}

fn default_horizontal_extent() -> [f32; 2] {
    [-200.0, 200.0]
}

fn default_probability() -> f64 {
    0.01
}

fn default_pulse_duration_ms() -> f64 {
    50.0
}

fn default_active_intensity() -> f32 {
    5.0
}

fn default_lightning_position() -> [f32; 3] {
    [0.0, 20.0, -30.0]
}

fn default_rotation_rate() -> f32 {
    0.01
}

fn default_orbit_radius() -> f32 {
    20.0
}

fn default_orbit_speed() -> f32 {
    1.0
}

fn default_key_light_base() -> [f32; 3] {
    [0.0, 30.0, 30.0]
}

fn default_fov() -> f32 {
    55.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    100.0
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 8.0, 30.0]
}

// ============================================================================
// Sections
// ============================================================================

/// Falling particle field parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainConfig {
    /// Number of particles, fixed for the lifetime of the field.
    #[serde(default = "default_particle_count")]
    pub particle_count: usize,

    /// Vertical distance each particle falls per frame. Not time-scaled.
    #[serde(default = "default_fall_step")]
    pub fall_step: f32,

    /// Particles falling below this height are recycled.
    #[serde(default = "default_lower_bound")]
    pub lower_bound: f32,

    /// Top of the spawn range.
    #[serde(default = "default_upper_bound")]
    pub upper_bound: f32,

    /// Bottom of the spawn range. Spawn heights are uniform over
    /// `[respawn_floor, upper_bound)`.
    #[serde(default = "default_respawn_floor")]
    pub respawn_floor: f32,

    /// `[min, max]` for both x and z, assigned once at construction.
    #[serde(default = "default_horizontal_extent")]
    pub horizontal_extent: [f32; 2],
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            particle_count: default_particle_count(),
            fall_step: default_fall_step(),
            lower_bound: default_lower_bound(),
            upper_bound: default_upper_bound(),
            respawn_floor: default_respawn_floor(),
            horizontal_extent: default_horizontal_extent(),
        }
    }
}

impl RainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lower, upper) = (self.lower_bound, self.upper_bound);
        finite("lowerBound", lower)?;
        finite("upperBound", upper)?;
        if upper <= lower {
            return Err(ConfigError::InvalidVerticalBounds { lower, upper });
        }

        let floor = self.respawn_floor;
        if !(lower..upper).contains(&floor) {
            return Err(ConfigError::InvalidRespawnFloor { floor, lower, upper });
        }

        let [min, max] = self.horizontal_extent;
        finite("horizontalExtent", min)?;
        finite("horizontalExtent", max)?;
        if max <= min {
            return Err(ConfigError::InvalidHorizontalExtent { min, max });
        }

        if !self.fall_step.is_finite() || self.fall_step < 0.0 {
            return Err(ConfigError::InvalidFallStep(self.fall_step));
        }
        Ok(())
    }
}

/// Lightning pulse parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightningConfig {
    /// Chance of a strike on any given frame.
    #[serde(default = "default_probability")]
    pub probability_per_frame: f64,

    /// How long a strike stays lit, in milliseconds.
    #[serde(default = "default_pulse_duration_ms")]
    pub pulse_duration_ms: f64,

    /// Light intensity while a pulse is in flight.
    #[serde(default = "default_active_intensity")]
    pub active_intensity: f32,

    /// World position of the lightning point light.
    #[serde(default = "default_lightning_position")]
    pub position: [f32; 3],
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            probability_per_frame: default_probability(),
            pulse_duration_ms: default_pulse_duration_ms(),
            active_intensity: default_active_intensity(),
            position: default_lightning_position(),
        }
    }
}

impl LightningConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.probability_per_frame;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbability(p));
        }
        let d = self.pulse_duration_ms;
        if !d.is_finite() || d <= 0.0 {
            return Err(ConfigError::InvalidPulseDuration(d));
        }
        let i = self.active_intensity;
        if !i.is_finite() || i <= 0.0 {
            return Err(ConfigError::InvalidIntensity(i));
        }
        for v in self.position {
            finite("lightning.position", v)?;
        }
        Ok(())
    }
}

/// Rigid-body spin and key light orbit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionConfig {
    /// Radians added per frame to each spinning axis.
    #[serde(default = "default_rotation_rate")]
    pub rotation_rate: f32,

    #[serde(default = "default_orbit_radius")]
    pub key_light_orbit_radius: f32,

    /// Radians per second of wall time.
    #[serde(default = "default_orbit_speed")]
    pub key_light_orbit_speed: f32,

    /// Key light rest position; the orbit replaces x and y.
    #[serde(default = "default_key_light_base")]
    pub key_light_base: [f32; 3],
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            rotation_rate: default_rotation_rate(),
            key_light_orbit_radius: default_orbit_radius(),
            key_light_orbit_speed: default_orbit_speed(),
            key_light_base: default_key_light_base(),
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("rotationRate", self.rotation_rate)?;
        finite("keyLightOrbitRadius", self.key_light_orbit_radius)?;
        finite("keyLightOrbitSpeed", self.key_light_orbit_speed)?;
        for v in self.key_light_base {
            finite("keyLightBase", v)?;
        }
        Ok(())
    }
}

/// Perspective camera parameters. Aspect ratio is derived from the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,

    #[serde(default = "default_near")]
    pub near: f32,

    #[serde(default = "default_far")]
    pub far: f32,

    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            position: default_camera_position(),
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(ConfigError::InvalidFieldOfView(self.fov));
        }
        let (near, far) = (self.near, self.far);
        if !near.is_finite() || !far.is_finite() || near <= 0.0 || far <= near {
            return Err(ConfigError::InvalidClipPlanes { near, far });
        }
        for v in self.position {
            finite("camera.position", v)?;
        }
        Ok(())
    }
}

// ============================================================================
// Scene Configuration
// ============================================================================

/// Complete configuration for the rain scene and its frame loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    #[serde(default)]
    pub rain: RainConfig,

    #[serde(default)]
    pub lightning: LightningConfig,

    #[serde(default)]
    pub motion: MotionConfig,

    #[serde(default)]
    pub camera: CameraConfig,

    /// Seed for the scene's random source.
    #[serde(default)]
    pub seed: u64,
}

impl SceneConfig {
    /// Load a JSON config file. The result is validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: SceneConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rain.validate()?;
        self.lightning.validate()?;
        self.motion.validate()?;
        self.camera.validate()
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}
