/// GraphicsDevice trait - the backend collaborator driven by the renderer.
///
/// The scene renderer only sets fixed-function state and submits draws;
/// resource creation and command recording stay inside the backend.

use std::sync::Arc;
use glam::{Mat4, Vec4};
use crate::error::Result;
use crate::render::IlluminationStage;
use crate::scene::{LightKey, LightType, ObjectKey};
use super::capabilities::DeviceCapabilities;
use super::projection::ProjectionBuilder;
use super::state::{Color, CompareOp, CullMode, Rect2D, StencilState, Viewport};

// ============================================================================
// Draw descriptors
// ============================================================================

/// Surface the following commands render into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// The camera's own target
    Main,
    /// Shadow texture by index (texture shadow techniques)
    ShadowTexture(usize),
}

/// Vertex program extruding shadow volumes on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtrusionProgram {
    pub light_type: LightType,
    /// Extrude by a finite distance instead of to infinity
    pub finite: bool,
}

/// One object pass submitted for drawing.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub object: ObjectKey,
    /// Index of the pass within the object's pass list
    pub pass: usize,
    pub world: Mat4,
    pub stage: IlluminationStage,
    /// Lights bound to the pass (empty for ambient and decal passes)
    pub lights: &'a [LightKey],
    /// Shadow texture sampled by the pass
    pub shadow_texture: Option<usize>,
}

/// One shadow volume (or separate light cap) submitted for stencil rendering.
#[derive(Debug, Clone, Copy)]
pub struct ShadowVolumeDraw<'a> {
    pub world: Mat4,
    /// Doubled position buffer: originals (w = 1) then extruded copies
    pub positions: &'a [Vec4],
    pub indices: &'a [u32],
    /// Vertices the index buffer may address
    pub vertex_count: usize,
    pub light_cap: bool,
    /// Object-space light position fed to the extrusion program
    pub light_position: Vec4,
    pub extrusion_distance: f32,
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Backend interface used by the scene and shadow renderers.
///
/// Every state setter is sticky until changed. Implementations report
/// backend failures as `Error::Backend`.
pub trait GraphicsDevice: Send {
    /// Hardware features, queried once per frame.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Projection conventions of the backend, handed to frusta.
    fn projection_builder(&self) -> Arc<dyn ProjectionBuilder + Send + Sync>;

    fn set_render_target(&mut self, target: RenderTarget) -> Result<()>;

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Clear the buffers whose value is `Some`.
    fn clear(&mut self, color: Option<Color>, depth: Option<f32>, stencil: Option<u32>) -> Result<()>;

    fn set_camera(&mut self, view: &Mat4, projection: &Mat4) -> Result<()>;

    fn set_color_writes(&mut self, enabled: bool) -> Result<()>;

    fn set_depth_writes(&mut self, enabled: bool) -> Result<()>;

    fn set_depth_compare(&mut self, op: CompareOp) -> Result<()>;

    fn set_cull_mode(&mut self, mode: CullMode) -> Result<()>;

    fn set_stencil_check_enabled(&mut self, enabled: bool) -> Result<()>;

    fn set_stencil_state(&mut self, state: &StencilState) -> Result<()>;

    /// `None` disables the scissor test.
    fn set_scissor(&mut self, rect: Option<Rect2D>) -> Result<()>;

    /// `None` returns to fixed-function transform.
    fn bind_extrusion_program(&mut self, program: Option<ExtrusionProgram>) -> Result<()>;

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<()>;

    fn draw_shadow_volume(&mut self, draw: &ShadowVolumeDraw<'_>) -> Result<()>;

    /// Full-screen quad in the given colour (modulative shadows).
    fn draw_modulation_quad(&mut self, color: Color) -> Result<()>;
}

/// Depth state the scene renderer returns to after a stencil pass.
pub(crate) fn reset_depth_state(device: &mut dyn GraphicsDevice) -> Result<()> {
    device.set_depth_writes(true)?;
    device.set_depth_compare(CompareOp::LessOrEqual)
}
