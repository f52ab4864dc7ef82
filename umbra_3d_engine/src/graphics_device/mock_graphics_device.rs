/// Mock graphics device for unit tests (no GPU required)
///
/// Records every call as a `DeviceCommand` so tests can assert pass
/// ordering and the exact stencil state sequence.

use std::sync::Arc;
use glam::Mat4;
use crate::engine_bail;
use crate::error::Result;
use crate::render::IlluminationStage;
use crate::scene::{LightKey, ObjectKey};
use super::capabilities::DeviceCapabilities;
use super::graphics_device::{DrawCall, ExtrusionProgram, GraphicsDevice, RenderTarget, ShadowVolumeDraw};
use super::projection::{DepthRange, ProjectionBuilder};
use super::state::{Color, CompareOp, CullMode, Rect2D, StencilState, Viewport};

/// A recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    SetRenderTarget(RenderTarget),
    SetViewport(Viewport),
    Clear { color: Option<Color>, depth: Option<f32>, stencil: Option<u32> },
    SetCamera { view: Mat4, projection: Mat4 },
    SetColorWrites(bool),
    SetDepthWrites(bool),
    SetDepthCompare(CompareOp),
    SetCullMode(CullMode),
    SetStencilCheck(bool),
    SetStencilState(StencilState),
    SetScissor(Option<Rect2D>),
    BindExtrusionProgram(Option<ExtrusionProgram>),
    Draw {
        object: ObjectKey,
        pass: usize,
        stage: IlluminationStage,
        lights: Vec<LightKey>,
        shadow_texture: Option<usize>,
    },
    DrawShadowVolume {
        index_count: usize,
        vertex_count: usize,
        light_cap: bool,
        extrusion_distance: f32,
    },
    DrawModulationQuad(Color),
}

pub struct MockGraphicsDevice {
    pub capabilities: DeviceCapabilities,
    pub depth_range: DepthRange,
    pub commands: Vec<DeviceCommand>,
    /// Make the next draw fail with a backend error
    pub fail_next_draw: bool,
}

impl MockGraphicsDevice {
    pub fn new(capabilities: DeviceCapabilities) -> Self {
        Self {
            capabilities,
            depth_range: DepthRange::MinusOneToOne,
            commands: Vec::new(),
            fail_next_draw: false,
        }
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Object draws only, in submission order.
    pub fn draws(&self) -> Vec<(ObjectKey, IlluminationStage)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::Draw { object, stage, .. } => Some((*object, *stage)),
                _ => None,
            })
            .collect()
    }

    pub fn shadow_volume_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DeviceCommand::DrawShadowVolume { light_cap: false, .. }))
            .count()
    }

    pub fn stencil_states(&self) -> Vec<StencilState> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::SetStencilState(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn position_of(&self, command: &DeviceCommand) -> Option<usize> {
        self.commands.iter().position(|c| c == command)
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn projection_builder(&self) -> Arc<dyn ProjectionBuilder + Send + Sync> {
        Arc::new(self.depth_range)
    }

    fn set_render_target(&mut self, target: RenderTarget) -> Result<()> {
        self.commands.push(DeviceCommand::SetRenderTarget(target));
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.commands.push(DeviceCommand::SetViewport(viewport));
        Ok(())
    }

    fn clear(&mut self, color: Option<Color>, depth: Option<f32>, stencil: Option<u32>) -> Result<()> {
        self.commands.push(DeviceCommand::Clear { color, depth, stencil });
        Ok(())
    }

    fn set_camera(&mut self, view: &Mat4, projection: &Mat4) -> Result<()> {
        self.commands.push(DeviceCommand::SetCamera { view: *view, projection: *projection });
        Ok(())
    }

    fn set_color_writes(&mut self, enabled: bool) -> Result<()> {
        self.commands.push(DeviceCommand::SetColorWrites(enabled));
        Ok(())
    }

    fn set_depth_writes(&mut self, enabled: bool) -> Result<()> {
        self.commands.push(DeviceCommand::SetDepthWrites(enabled));
        Ok(())
    }

    fn set_depth_compare(&mut self, op: CompareOp) -> Result<()> {
        self.commands.push(DeviceCommand::SetDepthCompare(op));
        Ok(())
    }

    fn set_cull_mode(&mut self, mode: CullMode) -> Result<()> {
        self.commands.push(DeviceCommand::SetCullMode(mode));
        Ok(())
    }

    fn set_stencil_check_enabled(&mut self, enabled: bool) -> Result<()> {
        self.commands.push(DeviceCommand::SetStencilCheck(enabled));
        Ok(())
    }

    fn set_stencil_state(&mut self, state: &StencilState) -> Result<()> {
        self.commands.push(DeviceCommand::SetStencilState(*state));
        Ok(())
    }

    fn set_scissor(&mut self, rect: Option<Rect2D>) -> Result<()> {
        self.commands.push(DeviceCommand::SetScissor(rect));
        Ok(())
    }

    fn bind_extrusion_program(&mut self, program: Option<ExtrusionProgram>) -> Result<()> {
        self.commands.push(DeviceCommand::BindExtrusionProgram(program));
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<()> {
        if self.fail_next_draw {
            self.fail_next_draw = false;
            engine_bail!("umbra3d::MockGraphicsDevice", Backend, "Draw rejected by mock");
        }
        self.commands.push(DeviceCommand::Draw {
            object: call.object,
            pass: call.pass,
            stage: call.stage,
            lights: call.lights.to_vec(),
            shadow_texture: call.shadow_texture,
        });
        Ok(())
    }

    fn draw_shadow_volume(&mut self, draw: &ShadowVolumeDraw<'_>) -> Result<()> {
        self.commands.push(DeviceCommand::DrawShadowVolume {
            index_count: draw.indices.len(),
            vertex_count: draw.vertex_count,
            light_cap: draw.light_cap,
            extrusion_distance: draw.extrusion_distance,
        });
        Ok(())
    }

    fn draw_modulation_quad(&mut self, color: Color) -> Result<()> {
        self.commands.push(DeviceCommand::DrawModulationQuad(color));
        Ok(())
    }
}
