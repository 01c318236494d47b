pub mod camera;
pub mod config;
pub mod error;
pub mod lighting;
pub mod lightning;
pub mod particle;
pub mod random;
pub mod scene_graph;
pub mod scheduler;
pub mod viewport;

// Offline driving
pub mod host;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

pub use config::SceneConfig;
pub use error::{ConfigError, FrameError, RenderError};
pub use scheduler::{FrameHost, FrameReport, FrameScheduler, FrameStats, OutputSurface, SceneRenderer};
