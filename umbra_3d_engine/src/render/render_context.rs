/// Render context saved and restored around nested camera renders.
///
/// Rendering a shadow texture renders another camera from inside the main
/// render. Whatever the outer render was doing (its stage, its target, how
/// deep it is nested) lives here, so the nested render can overwrite it and
/// put it back on the way out.

use crate::graphics_device::RenderTarget;

/// What the renderer is currently drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IlluminationStage {
    /// Normal rendering, all passes lit
    #[default]
    None,
    /// Ambient passes only, no lights
    Ambient,
    /// One light at a time
    PerLight,
    /// Decal passes over the lit result
    Decal,
    /// Shadow casters into a shadow texture
    RenderToTexture,
    /// Shadow texture projected over receivers
    ReceiverPass,
}

/// State of the render in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub stage: IlluminationStage,
    pub target: RenderTarget,
    /// Camera renders currently in progress (0 when idle)
    pub depth: u32,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self { stage: IlluminationStage::None, target: RenderTarget::Main, depth: 0 }
    }
}

impl RenderContext {
    /// Enter a nested render. Returns the context to restore afterwards.
    pub fn enter(&mut self, stage: IlluminationStage, target: RenderTarget) -> RenderContext {
        let saved = *self;
        self.stage = stage;
        self.target = target;
        self.depth += 1;
        saved
    }

    /// Leave a nested render.
    pub fn restore(&mut self, saved: RenderContext) {
        *self = saved;
    }

    pub fn is_rendering_to_texture(&self) -> bool {
        self.stage == IlluminationStage::RenderToTexture
    }
}

#[cfg(test)]
#[path = "render_context_tests.rs"]
mod tests;
