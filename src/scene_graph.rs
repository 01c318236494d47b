//! Frame-mutable scene data.
//!
//! The scene graph here holds only what the frame loop changes: spinning
//! bodies, the rain field, and the lights. Meshes, materials and textures
//! belong to the renderer, which reads this data once per frame and never
//! writes it.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::config::SceneConfig;
use crate::error::ConfigError;
use crate::lightning::LightningTrigger;
use crate::particle::ParticleField;
use crate::random::UniformSource;

/// Transform component for scene entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3, // Euler angles in radians
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// A body that spins by a fixed angle per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RotatingBody {
    pub name: String,
    pub transform: Transform,
    /// Radians added to each Euler axis per frame.
    pub spin: Vec3,
}

impl RotatingBody {
    pub fn new(name: impl Into<String>, transform: Transform, spin: Vec3) -> Self {
        Self {
            name: name.into(),
            transform,
            spin,
        }
    }

    /// Add one frame of spin. Angles stay in `[0, TAU)` so the increment
    /// never falls below f32 resolution in long sessions.
    #[inline]
    pub fn step(&mut self) {
        let r = self.transform.rotation + self.spin;
        self.transform.rotation = Vec3::new(r.x.rem_euclid(TAU), r.y.rem_euclid(TAU), r.z.rem_euclid(TAU));
    }
}

/// A light whose x/y orbit the origin as a function of wall time.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitingLight {
    pub base: Vec3,
    pub radius: f32,
    /// Radians per second.
    pub speed: f32,
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

impl OrbitingLight {
    /// Place the light for `elapsed_secs` of wall time. Pure in its input.
    ///
    /// The angle is reduced in f64 before narrowing, so late timestamps
    /// keep full per-frame resolution.
    pub fn update(&mut self, elapsed_secs: f64) {
        let angle = (elapsed_secs * f64::from(self.speed)).rem_euclid(std::f64::consts::TAU) as f32;
        self.position = Vec3::new(
            self.radius * angle.cos(),
            self.radius * angle.sin(),
            self.base.z,
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

/// Everything the scheduler updates per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub bodies: Vec<RotatingBody>,
    pub rain: ParticleField,
    pub key_light: OrbitingLight,
    pub ambient_intensity: f32,
    pub lightning: LightningTrigger,
    /// Intensity mirrors `lightning` after every frame.
    pub lightning_light: PointLight,
}

impl Scene {
    /// The stormy reference scene: a cube and a sphere spinning in the rain,
    /// an orbiting key light, and a lightning light behind them.
    pub fn reference(config: &SceneConfig, rng: &mut impl UniformSource) -> Result<Self, ConfigError> {
        config.validate()?;

        let rate = config.motion.rotation_rate;
        let cube_size = 5.0;
        let sphere_radius = 3.5;
        let bodies = vec![
            RotatingBody::new(
                "cube",
                Transform::at(Vec3::new(cube_size + 1.0, cube_size + 1.0, 0.0)),
                Vec3::splat(rate),
            ),
            RotatingBody::new(
                "sphere",
                Transform::at(Vec3::new(-sphere_radius - 1.0, sphere_radius + 2.0, 0.0)),
                Vec3::new(rate, rate, 0.0),
            ),
        ];

        let base = Vec3::from_array(config.motion.key_light_base);
        let key_light = OrbitingLight {
            base,
            radius: config.motion.key_light_orbit_radius,
            speed: config.motion.key_light_orbit_speed,
            color: Vec3::ONE,
            intensity: 0.7,
            position: base,
        };

        Ok(Self {
            bodies,
            rain: ParticleField::new(&config.rain, rng)?,
            key_light,
            ambient_intensity: 0.3,
            lightning: LightningTrigger::new(&config.lightning)?,
            lightning_light: PointLight {
                position: Vec3::from_array(config.lightning.position),
                color: Vec3::ONE,
                intensity: 0.0,
            },
        })
    }

    pub fn body(&self, name: &str) -> Option<&RotatingBody> {
        self.bodies.iter().find(|b| b.name == name)
    }
}
