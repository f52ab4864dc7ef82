//! Shadow module - settings, caster geometry and the shadow passes.
//!
//! Stencil shadows extrude caster silhouettes into volumes counted in the
//! stencil buffer. Texture shadows render casters from each light into a
//! texture sampled by receivers. The scene renderer decides which one runs.

mod caster_query;
mod edge_data;
mod settings;
mod shadow_caster;
mod shadow_volume;
mod stencil;
mod texture_shadows;

#[cfg(test)]
pub(crate) mod test_geometry;

pub use caster_query::{directional_caster_bounds, find_shadow_casters};
pub use edge_data::{Edge, EdgeData, EdgeGroup, EdgeListBuilder, ShadowMesh, SubMeshGeometry, Triangle};
pub use settings::{ShadowSettings, ShadowTechnique};
pub use shadow_caster::{
    extrude_bounds, extrude_vertices, generate_shadow_volume, LightCap, ShadowCaster,
    ShadowRenderable, ShadowRenderableFlags, ShadowVolumeParams,
};
pub use shadow_volume::{caster_flags, render_shadow_volumes_to_stencil, requires_zfail, ShadowVolumeStats};
pub use stencil::{
    lit_pass_stencil, modulation_stencil, ExtrusionMode, ShadowStrategies, StencilVolumeStrategy,
    TwoPassStencil, TwoSidedStencil,
};
pub use texture_shadows::{configure_shadow_camera, create_shadow_camera, ShadowTextureLayout};
