//! Probabilistic lightning pulses.
//!
//! A two-state machine driving the intensity of a single point light:
//!
//! - **Idle**: intensity 0, no deadline.
//! - **Armed**: intensity at the active value until the deadline passes.
//!
//! Each frame the scheduler calls [`LightningTrigger::maybe_activate`] and
//! then [`LightningTrigger::tick`]. A strike while already armed re-arms the
//! deadline from the new strike time; pulses never stack.

use crate::config::LightningConfig;
use crate::error::ConfigError;
use crate::random::UniformSource;

/// Pulse state. Timestamps are host milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PulseState {
    Idle,
    Armed { until: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightningTrigger {
    state: PulseState,
    probability_per_frame: f64,
    pulse_duration_ms: f64,
    active_intensity: f32,
    strikes: u64,
}

impl LightningTrigger {
    pub fn new(config: &LightningConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: PulseState::Idle,
            probability_per_frame: config.probability_per_frame,
            pulse_duration_ms: config.pulse_duration_ms,
            active_intensity: config.active_intensity,
            strikes: 0,
        })
    }

    /// Draw one sample and strike if it falls below the configured
    /// per-frame probability.
    ///
    /// Returns whether a strike happened.
    pub fn maybe_activate(&mut self, rng: &mut impl UniformSource, now: f64) -> bool {
        self.maybe_activate_with(rng, self.probability_per_frame, now)
    }

    /// Like [`maybe_activate`](Self::maybe_activate), with the probability
    /// supplied by the caller for this frame only.
    ///
    /// Exactly one sample is drawn whatever the probability, so changing it
    /// never shifts later draws.
    pub fn maybe_activate_with(
        &mut self,
        rng: &mut impl UniformSource,
        probability_per_frame: f64,
        now: f64,
    ) -> bool {
        let sample = f64::from(rng.next_uniform());
        if sample < probability_per_frame {
            self.activate(now);
            true
        } else {
            false
        }
    }

    /// Strike unconditionally, arming the deadline at `now + pulse duration`.
    pub fn activate(&mut self, now: f64) {
        if let PulseState::Armed { until } = self.state {
            log::trace!("Lightning re-armed, previous deadline {:.1}ms discarded", until);
        }
        let until = now + self.pulse_duration_ms;
        self.state = PulseState::Armed { until };
        self.strikes += 1;
        log::debug!("Lightning strike at {:.1}ms, dark again at {:.1}ms", now, until);
    }

    /// Disarm once `now` reaches the deadline.
    ///
    /// Returns true only on the call that performed the reset; later calls
    /// are no-ops.
    pub fn tick(&mut self, now: f64) -> bool {
        match self.state {
            PulseState::Armed { until } if now >= until => {
                self.state = PulseState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Current light intensity.
    pub fn intensity(&self) -> f32 {
        match self.state {
            PulseState::Idle => 0.0,
            PulseState::Armed { .. } => self.active_intensity,
        }
    }

    pub fn state(&self) -> PulseState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, PulseState::Armed { .. })
    }

    /// Deadline of the pulse in flight, if any.
    pub fn armed_until(&self) -> Option<f64> {
        match self.state {
            PulseState::Armed { until } => Some(until),
            PulseState::Idle => None,
        }
    }

    pub fn probability_per_frame(&self) -> f64 {
        self.probability_per_frame
    }

    pub fn active_intensity(&self) -> f32 {
        self.active_intensity
    }

    /// Total strikes since creation.
    pub fn strikes(&self) -> u64 {
        self.strikes
    }
}
