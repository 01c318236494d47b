//! Falling particle field.
//!
//! A fixed-size pool of rain particles that fall a constant distance every
//! frame and are recycled to a fresh random height once they drop below the
//! floor. Nothing is allocated after construction: recycling repositions a
//! particle in place instead of destroying and respawning it.

use bytemuck::{Pod, Zeroable};

use crate::config::RainConfig;
use crate::error::ConfigError;
use crate::random::UniformSource;

/// A single rain particle.
///
/// Laid out for direct upload as a per-instance vertex buffer.
/// Total size: 16 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// World position (x, y, z).
    pub position: [f32; 3],
    /// Distance fallen per frame.
    pub fall_speed: f32,
}

impl Particle {
    pub fn new(position: [f32; 3], fall_speed: f32) -> Self {
        Self {
            position,
            fall_speed,
        }
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.position[1]
    }
}

/// Fixed-length collection of particles with wrap-around recycling.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
    lower_bound: f32,
    upper_bound: f32,
    respawn_floor: f32,
}

impl ParticleField {
    /// Scatter `config.particle_count` particles over the horizontal extent,
    /// with heights uniform over the spawn range.
    pub fn new(config: &RainConfig, rng: &mut impl UniformSource) -> Result<Self, ConfigError> {
        config.validate()?;

        let [min, max] = config.horizontal_extent;
        let particles = (0..config.particle_count)
            .map(|_| {
                let x = rng.range(min, max);
                let y = rng.range(config.respawn_floor, config.upper_bound);
                let z = rng.range(min, max);
                Particle::new([x, y, z], config.fall_step)
            })
            .collect();

        log::info!(
            "Particle field created: {} particles, bounds [{}, {}]",
            config.particle_count,
            config.lower_bound,
            config.upper_bound
        );

        Ok(Self::with_bounds(particles, config))
    }

    /// Build a field from explicit starting particles. Recycling still uses
    /// the bounds from `config`; `particle_count` and `fall_step` are ignored.
    pub fn from_particles(particles: Vec<Particle>, config: &RainConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_bounds(particles, config))
    }

    fn with_bounds(particles: Vec<Particle>, config: &RainConfig) -> Self {
        Self {
            particles,
            lower_bound: config.lower_bound,
            upper_bound: config.upper_bound,
            respawn_floor: config.respawn_floor,
        }
    }

    /// Advance every particle by one frame.
    ///
    /// The step is fixed per frame and does not depend on frame duration.
    /// Any particle that ends up below the lower bound is moved to a new
    /// random height in the spawn range; x and z never change.
    ///
    /// Returns the number of particles recycled this frame.
    pub fn advance(&mut self, rng: &mut impl UniformSource) -> usize {
        let mut recycled = 0;
        for particle in &mut self.particles {
            particle.position[1] -= particle.fall_speed;
            if particle.position[1] < self.lower_bound {
                particle.position[1] = rng.range(self.respawn_floor, self.upper_bound);
                recycled += 1;
            }
        }
        recycled
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn lower_bound(&self) -> f32 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f32 {
        self.upper_bound
    }

    /// Raw bytes for instance buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.particles)
    }

    /// Lowest and highest particle heights, or `None` for an empty field.
    pub fn height_range(&self) -> Option<(f32, f32)> {
        self.particles.iter().map(Particle::height).fold(None, |acc, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedSource, SeededSource};

    fn small_config() -> RainConfig {
        RainConfig {
            particle_count: 100,
            fall_step: 1.0,
            lower_bound: -10.0,
            upper_bound: 10.0,
            respawn_floor: 0.0,
            horizontal_extent: [-5.0, 5.0],
        }
    }

    #[test]
    fn test_particle_size() {
        assert_eq!(std::mem::size_of::<Particle>(), 16);
    }

    #[test]
    fn test_new_field_within_ranges() {
        let config = RainConfig::default();
        let field = ParticleField::new(&config, &mut SeededSource::new(1)).unwrap();
        assert_eq!(field.len(), 10_000);
        for p in field.particles() {
            assert!((-200.0..200.0).contains(&p.position[0]));
            assert!((0.0..500.0).contains(&p.position[1]));
            assert!((-200.0..200.0).contains(&p.position[2]));
            assert_eq!(p.fall_speed, 2.0);
        }
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut config = small_config();
        config.upper_bound = -20.0;
        assert!(ParticleField::new(&config, &mut SeededSource::new(1)).is_err());
    }

    #[test]
    fn test_empty_field_advance_is_noop() {
        let mut config = small_config();
        config.particle_count = 0;
        let mut rng = ScriptedSource::constant(0.5);
        let mut field = ParticleField::new(&config, &mut rng).unwrap();
        assert!(field.is_empty());
        assert_eq!(field.advance(&mut rng), 0);
        assert_eq!(field.height_range(), None);
    }

    #[test]
    fn test_step_is_constant() {
        let config = small_config();
        let mut field =
            ParticleField::from_particles(vec![Particle::new([0.0, 5.0, 0.0], 1.0)], &config).unwrap();
        let mut rng = ScriptedSource::constant(0.5);
        field.advance(&mut rng);
        field.advance(&mut rng);
        assert_eq!(field.particles()[0].height(), 3.0);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_recycle_only_below_lower_bound() {
        let config = small_config();
        let start = vec![Particle::new([1.0, -9.0, 2.0], 1.0)];
        let mut field = ParticleField::from_particles(start, &config).unwrap();
        let mut rng = ScriptedSource::constant(0.25);

        // Landing exactly on the bound is not below it.
        assert_eq!(field.advance(&mut rng), 0);
        assert_eq!(field.particles()[0].height(), -10.0);

        assert_eq!(field.advance(&mut rng), 1);
        let p = field.particles()[0];
        // 0.25 of the way through [0, 10)
        assert!((p.height() - 2.5).abs() < 1e-6);
        assert_eq!(p.position[0], 1.0);
        assert_eq!(p.position[2], 2.0);
    }

    #[test]
    fn test_horizontal_coordinates_invariant() {
        let config = small_config();
        let mut rng = SeededSource::new(9);
        let mut field = ParticleField::new(&config, &mut rng).unwrap();
        let before: Vec<_> = field.particles().iter().map(|p| (p.position[0], p.position[2])).collect();

        for _ in 0..500 {
            field.advance(&mut rng);
        }

        let after: Vec<_> = field.particles().iter().map(|p| (p.position[0], p.position[2])).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_heights_stay_in_bounds() {
        let config = small_config();
        let mut rng = SeededSource::new(3);
        let mut field = ParticleField::new(&config, &mut rng).unwrap();
        for _ in 0..1_000 {
            field.advance(&mut rng);
            for p in field.particles() {
                assert!(p.height() >= config.lower_bound && p.height() <= config.upper_bound);
            }
        }
    }

    #[test]
    fn test_advance_does_not_reallocate() {
        let config = small_config();
        let mut rng = SeededSource::new(5);
        let mut field = ParticleField::new(&config, &mut rng).unwrap();
        let ptr = field.particles().as_ptr();
        let len = field.len();

        for _ in 0..1_000 {
            field.advance(&mut rng);
        }

        assert_eq!(field.particles().as_ptr(), ptr);
        assert_eq!(field.len(), len);
    }

    #[test]
    fn test_as_bytes_matches_layout() {
        let config = small_config();
        let field = ParticleField::new(&config, &mut SeededSource::new(2)).unwrap();
        assert_eq!(field.as_bytes().len(), field.len() * 16);
    }
}
