//! Injectable randomness for the frame loop.
//!
//! Everything stochastic (particle respawn heights, lightning strikes) draws
//! from a [`UniformSource`] owned by the scheduler, never from a global
//! generator. Seeding the source makes a whole session replayable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform samples in `[0, 1)`.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f32;

    /// Uniform sample in `[min, max)`.
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_uniform() * (max - min)
    }
}

impl<T: UniformSource + ?Sized> UniformSource for &mut T {
    fn next_uniform(&mut self) -> f32 {
        (**self).next_uniform()
    }
}

/// Seeded generator used for live sessions.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl UniformSource for SeededSource {
    fn next_uniform(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

/// Replays a fixed list of samples, wrapping around at the end.
///
/// Useful for scripting exact strike/no-strike sequences in tests.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    samples: Vec<f32>,
    cursor: usize,
}

impl ScriptedSource {
    /// Build a source from `samples`. An empty list always yields `0.0`.
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples, cursor: 0 }
    }

    /// A source that always returns `value`.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of samples drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for ScriptedSource {
    fn next_uniform(&mut self) -> f32 {
        if self.samples.is_empty() {
            self.cursor += 1;
            return 0.0;
        }
        let value = self.samples[self.cursor % self.samples.len()];
        self.cursor += 1;
        value
    }
}
