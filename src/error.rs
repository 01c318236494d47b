//! Error types for scene configuration and the frame loop.

use thiserror::Error;

/// Invalid scene configuration, reported before any frame runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("upper bound {upper} must be greater than lower bound {lower}")]
    InvalidVerticalBounds { lower: f32, upper: f32 },

    #[error("respawn floor {floor} must lie in [{lower}, {upper})")]
    InvalidRespawnFloor { floor: f32, lower: f32, upper: f32 },

    #[error("horizontal extent [{min}, {max}] is empty")]
    InvalidHorizontalExtent { min: f32, max: f32 },

    #[error("fall step must be finite and non-negative, got {0}")]
    InvalidFallStep(f32),

    #[error("lightning probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("pulse duration must be finite and positive, got {0} ms")]
    InvalidPulseDuration(f64),

    #[error("lightning intensity must be finite and positive, got {0}")]
    InvalidIntensity(f32),

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },

    #[error("camera clip planes near={near} far={far} are invalid")]
    InvalidClipPlanes { near: f32, far: f32 },

    #[error("camera field of view must lie in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Integration errors surfaced by [`crate::scheduler::FrameScheduler::run_frame`].
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("no scene attached to the frame scheduler")]
    MissingScene,

    #[error("no camera attached to the frame scheduler")]
    MissingCamera,

    #[error("frame timestamp must be finite, got {0}")]
    NonFiniteTimestamp(f64),
}

/// A single frame failed to draw. Simulation state is unaffected.
#[derive(Debug, Error)]
#[error("render submission failed: {message}")]
pub struct RenderError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RenderError {
    /// Create a render error without an underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a render error wrapping the backend's error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
