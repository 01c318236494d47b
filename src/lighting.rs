//! GPU-ready lighting snapshot.
//!
//! Flattens the scene's lights into one uniform block the renderer can
//! upload as-is each frame.

use bytemuck::{Pod, Zeroable};

use crate::scene_graph::Scene;

// ============================================================================
// GPU Uniforms
// ============================================================================

/// GPU-ready lighting uniforms.
///
/// This struct is laid out for direct upload to a uniform buffer.
/// Total size: 64 bytes (16-byte aligned).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LightingUniforms {
    /// Key light position (xyz), w = intensity.
    pub key_position: [f32; 4], // 16 bytes

    /// Key light color (rgb), a = 1.0.
    pub key_color: [f32; 4], // 16 bytes

    /// Lightning position (xyz), w = intensity.
    pub lightning_position: [f32; 4], // 16 bytes

    /// Ambient light intensity.
    pub ambient: f32, // 4 bytes

    /// Padding for alignment.
    pub _padding: [f32; 3], // 12 bytes
} // Total: 64 bytes

impl LightingUniforms {
    pub fn from_scene(scene: &Scene) -> Self {
        let key = &scene.key_light;
        let bolt = &scene.lightning_light;
        Self {
            key_position: key.position.extend(key.intensity).to_array(),
            key_color: key.color.extend(1.0).to_array(),
            lightning_position: bolt.position.extend(bolt.intensity).to_array(),
            ambient: scene.ambient_intensity,
            _padding: [0.0; 3],
        }
    }
}
