/// Shadow configuration shared by the scene renderer and the shadow passes.

use glam::Vec4;
use crate::engine_bail;
use crate::error::Result;
use crate::graphics_device::Color;

const SOURCE: &str = "umbra3d::ShadowSettings";

/// Shadow technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadowTechnique {
    /// No shadows
    #[default]
    None,
    /// Stencil volumes, shadowed areas darkened by a full-screen quad
    StencilModulative,
    /// Stencil volumes, lit passes masked per light
    StencilAdditive,
    /// Shadow textures projected over receivers
    TextureModulative,
    /// Shadow textures sampled by per-light passes
    TextureAdditive,
}

impl ShadowTechnique {
    pub fn is_stencil_based(self) -> bool {
        matches!(self, Self::StencilModulative | Self::StencilAdditive)
    }

    pub fn is_texture_based(self) -> bool {
        matches!(self, Self::TextureModulative | Self::TextureAdditive)
    }

    pub fn is_additive(self) -> bool {
        matches!(self, Self::StencilAdditive | Self::TextureAdditive)
    }

    pub fn is_modulative(self) -> bool {
        matches!(self, Self::StencilModulative | Self::TextureModulative)
    }
}

/// Scene-wide shadow settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowSettings {
    pub technique: ShadowTechnique,
    /// Colour modulated over shadowed areas
    pub color: Color,
    /// Extrusion distance for directional light volumes
    pub directional_light_extrusion_distance: f32,
    /// Casters farther than this from the camera are ignored (0 = unlimited)
    pub far_distance: f32,
    /// Switch stencil-shadowed cameras to an infinite far plane when supported
    pub use_infinite_far_plane: bool,
    /// Shadow texture edge in pixels
    pub texture_size: u32,
    /// Number of shadow textures (lights shadowed per frame)
    pub texture_count: usize,
    /// Fraction of the shadow distance the directional shadow camera is pushed forward
    pub texture_offset: f32,
    pub texture_fade_start: f32,
    pub texture_fade_end: f32,
    /// Casters also receive texture shadows
    pub self_shadow: bool,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            technique: ShadowTechnique::None,
            color: Vec4::new(0.25, 0.25, 0.25, 1.0),
            directional_light_extrusion_distance: 10000.0,
            far_distance: 0.0,
            use_infinite_far_plane: true,
            texture_size: 512,
            texture_count: 1,
            texture_offset: 0.6,
            texture_fade_start: 0.7,
            texture_fade_end: 0.9,
            self_shadow: false,
        }
    }
}

impl ShadowSettings {
    /// Settings for the given technique, defaults elsewhere.
    pub fn with_technique(technique: ShadowTechnique) -> Self {
        Self { technique, ..Self::default() }
    }

    /// Reject values no renderer can work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.directional_light_extrusion_distance > 0.0) {
            engine_bail!(SOURCE, Configuration,
                "Directional light extrusion distance must be positive (got {})",
                self.directional_light_extrusion_distance);
        }
        if !(self.far_distance >= 0.0) {
            engine_bail!(SOURCE, Configuration,
                "Shadow far distance must not be negative (got {})", self.far_distance);
        }
        if self.technique.is_texture_based() {
            if self.texture_size == 0 {
                engine_bail!(SOURCE, Configuration, "Shadow texture size must not be zero");
            }
            if self.texture_count == 0 {
                engine_bail!(SOURCE, Configuration, "Shadow texture count must not be zero");
            }
        }
        if !(0.0..=1.0).contains(&self.texture_offset) {
            engine_bail!(SOURCE, Configuration,
                "Shadow texture offset must lie in [0, 1] (got {})", self.texture_offset);
        }
        if self.texture_fade_start > self.texture_fade_end {
            engine_bail!(SOURCE, Configuration,
                "Shadow texture fade start {} is past fade end {}",
                self.texture_fade_start, self.texture_fade_end);
        }
        Ok(())
    }

    /// Far distance used to place shadow cameras: the configured far
    /// distance, or 300 times the camera near distance when unlimited.
    pub fn shadow_camera_distance(&self, camera_near: f32) -> f32 {
        if self.far_distance > 0.0 {
            self.far_distance
        } else {
            camera_near * 300.0
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
