/// Fixed-function state types set by the shadow and queue renderers.

use glam::Vec4;

// ===== VIEWPORT / SCISSOR =====

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-depth viewport at the origin.
    pub fn new(width: f32, height: f32) -> Self {
        Self { x: 0.0, y: 0.0, width, height, min_depth: 0.0, max_depth: 1.0 }
    }

    /// Width / height, or 1 for a degenerate viewport.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }
}

/// 2D rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

// ===== RASTERIZATION =====

/// Face culling mode (counter-clockwise front faces)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

// ===== DEPTH/STENCIL =====

/// Comparison operator for depth and stencil tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

/// Stencil operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilOp {
    /// Keep current value
    Keep,
    /// Set to zero
    Zero,
    /// Replace with reference value
    Replace,
    /// Increment and clamp to max
    IncrementAndClamp,
    /// Decrement and clamp to zero
    DecrementAndClamp,
    /// Bitwise invert
    Invert,
    /// Increment and wrap around
    IncrementAndWrap,
    /// Decrement and wrap around
    DecrementAndWrap,
}

impl StencilOp {
    /// Operation applied to back faces when a two-sided stencil mirrors the front.
    pub fn inverted(self) -> Self {
        match self {
            StencilOp::IncrementAndClamp => StencilOp::DecrementAndClamp,
            StencilOp::DecrementAndClamp => StencilOp::IncrementAndClamp,
            StencilOp::IncrementAndWrap => StencilOp::DecrementAndWrap,
            StencilOp::DecrementAndWrap => StencilOp::IncrementAndWrap,
            other => other,
        }
    }
}

/// Stencil operation state (per-face)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilOpState {
    /// Action on stencil test fail
    pub fail_op: StencilOp,
    /// Action on stencil pass + depth pass
    pub pass_op: StencilOp,
    /// Action on stencil pass + depth fail
    pub depth_fail_op: StencilOp,
    /// Comparison operator
    pub compare_op: CompareOp,
    /// Bits of stencil buffer read for compare
    pub compare_mask: u32,
    /// Bits of stencil buffer written
    pub write_mask: u32,
    /// Reference value for compare/replace
    pub reference: u32,
}

impl Default for StencilOpState {
    fn default() -> Self {
        Self {
            fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            compare_op: CompareOp::Always,
            compare_mask: 0xFFFF_FFFF,
            write_mask: 0xFFFF_FFFF,
            reference: 0,
        }
    }
}

impl StencilOpState {
    /// Same compare setup with increment/decrement swapped.
    pub fn inverted(&self) -> Self {
        Self {
            fail_op: self.fail_op.inverted(),
            pass_op: self.pass_op.inverted(),
            depth_fail_op: self.depth_fail_op.inverted(),
            ..*self
        }
    }
}

/// Full stencil configuration for both faces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilState {
    /// Stencil operations for front faces
    pub front: StencilOpState,
    /// Stencil operations for back faces
    pub back: StencilOpState,
}

impl StencilState {
    /// Identical ops for both faces.
    pub fn single(ops: StencilOpState) -> Self {
        Self { front: ops, back: ops }
    }

    /// Front ops as given, back ops mirrored.
    pub fn two_sided(front: StencilOpState) -> Self {
        Self { front, back: front.inverted() }
    }

    /// Pass where the stencil equals `reference`, write nothing.
    pub fn test_only(compare_op: CompareOp, reference: u32) -> Self {
        Self::single(StencilOpState {
            compare_op,
            reference,
            ..StencilOpState::default()
        })
    }
}

// ===== COLOR =====

/// RGBA color
pub type Color = Vec4;
