/// Stencil shadow strategies.
///
/// The way volumes are counted into the stencil buffer depends on the
/// hardware: with two-sided stencil and wrapping ops a volume is drawn
/// once with culling off, otherwise it is drawn twice with the culled face
/// and the increment/decrement ops swapped. Extrusion happens either in a
/// vertex program or on the CPU.
///
/// Both choices are made once per capability set by
/// `ShadowStrategies::select`, which also downgrades techniques the device
/// cannot run at all. Nothing in the per-draw path branches on
/// capabilities.

use std::fmt;
use crate::engine_warn;
use crate::error::Result;
use crate::graphics_device::{
    CompareOp, CullMode, DeviceCapabilities, GraphicsDevice, StencilOp, StencilOpState, StencilState,
};
use super::settings::ShadowTechnique;

const SOURCE: &str = "umbra3d::ShadowStrategies";

/// How shadow volumes are counted into the stencil buffer.
pub trait StencilVolumeStrategy: Send + Sync + fmt::Debug {
    /// Number of renders per volume
    fn pass_count(&self) -> usize;

    fn is_two_sided(&self) -> bool;

    /// Cull mode and stencil state for one render of a volume.
    fn volume_state(&self, second_pass: bool, zfail: bool) -> (CullMode, StencilState);
}

/// Face to cull and front-face ops for one volume render.
///
/// zpass counts front faces passing the depth test up and back faces
/// down; zfail counts depth failures instead, back faces up.
fn volume_ops(second_pass: bool, zfail: bool, wrap: bool) -> (CullMode, StencilOpState) {
    let (incr, decr) = if wrap {
        (StencilOp::IncrementAndWrap, StencilOp::DecrementAndWrap)
    } else {
        (StencilOp::IncrementAndClamp, StencilOp::DecrementAndClamp)
    };
    let base = StencilOpState {
        fail_op: StencilOp::Keep,
        compare_op: CompareOp::Always,
        reference: 0,
        ..StencilOpState::default()
    };

    if second_pass ^ zfail {
        let ops = StencilOpState {
            depth_fail_op: if zfail { incr } else { StencilOp::Keep },
            pass_op: if zfail { StencilOp::Keep } else { decr },
            ..base
        };
        (CullMode::Front, ops)
    } else {
        let ops = StencilOpState {
            depth_fail_op: if zfail { decr } else { StencilOp::Keep },
            pass_op: if zfail { StencilOp::Keep } else { incr },
            ..base
        };
        (CullMode::Back, ops)
    }
}

/// One render per volume, culling off, back faces get mirrored ops.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoSidedStencil;

impl StencilVolumeStrategy for TwoSidedStencil {
    fn pass_count(&self) -> usize {
        1
    }

    fn is_two_sided(&self) -> bool {
        true
    }

    fn volume_state(&self, second_pass: bool, zfail: bool) -> (CullMode, StencilState) {
        let (_, front) = volume_ops(second_pass, zfail, true);
        (CullMode::None, StencilState::two_sided(front))
    }
}

/// Two renders per volume, one per face orientation, clamping ops.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoPassStencil;

impl StencilVolumeStrategy for TwoPassStencil {
    fn pass_count(&self) -> usize {
        2
    }

    fn is_two_sided(&self) -> bool {
        false
    }

    fn volume_state(&self, second_pass: bool, zfail: bool) -> (CullMode, StencilState) {
        let (cull, ops) = volume_ops(second_pass, zfail, false);
        (cull, StencilState::single(ops))
    }
}

/// Where extruded volume vertices are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtrusionMode {
    /// Vertex program, extruded copies keep w = 0
    Hardware,
    /// CPU rewrite of the extruded copies for every light
    Software,
}

/// Stencil test for per-light lit passes (additive): lit where no volume counted.
pub fn lit_pass_stencil() -> StencilState {
    StencilState::test_only(CompareOp::Equal, 0)
}

/// Stencil test for the modulation quad: shadowed where any volume counted.
pub fn modulation_stencil() -> StencilState {
    StencilState::test_only(CompareOp::NotEqual, 0)
}

/// Strategies chosen for one capability set and requested technique.
#[derive(Debug)]
pub struct ShadowStrategies {
    capabilities: DeviceCapabilities,
    requested: ShadowTechnique,
    technique: ShadowTechnique,
    stencil: Box<dyn StencilVolumeStrategy>,
    extrusion: ExtrusionMode,
    downgrades: Vec<&'static str>,
}

impl ShadowStrategies {
    /// Pick strategies for `capabilities`.
    ///
    /// Anything the device cannot do is downgraded and reported in a single
    /// warning. Never fails.
    pub fn select(capabilities: DeviceCapabilities, requested: ShadowTechnique) -> Self {
        let mut technique = requested;
        let mut downgrades = Vec::new();

        if technique.is_stencil_based() && !capabilities.contains(DeviceCapabilities::STENCIL_BUFFER) {
            downgrades.push("no stencil buffer, stencil shadows disabled");
            technique = ShadowTechnique::None;
        }
        if technique.is_texture_based() && !capabilities.contains(DeviceCapabilities::RENDER_TO_TEXTURE) {
            downgrades.push("no render-to-texture support, texture shadows disabled");
            technique = ShadowTechnique::None;
        }

        let two_sided = capabilities
            .contains(DeviceCapabilities::TWO_SIDED_STENCIL | DeviceCapabilities::STENCIL_WRAP);
        let stencil: Box<dyn StencilVolumeStrategy> = if two_sided {
            Box::new(TwoSidedStencil)
        } else {
            Box::new(TwoPassStencil)
        };
        let extrusion = if capabilities.contains(DeviceCapabilities::VERTEX_PROGRAMS) {
            ExtrusionMode::Hardware
        } else {
            ExtrusionMode::Software
        };

        if technique.is_stencil_based() {
            if !two_sided {
                downgrades.push("two-sided stencil unavailable, shadow volumes rendered in two passes");
            }
            if extrusion == ExtrusionMode::Software {
                downgrades.push("no vertex programs, shadow volumes extruded on the CPU");
            }
        }

        if !downgrades.is_empty() {
            engine_warn!(SOURCE, "Shadow technique {:?} downgraded: {}", requested, downgrades.join("; "));
        }

        Self { capabilities, requested, technique, stencil, extrusion, downgrades }
    }

    /// Whether these strategies were selected for this exact input.
    pub fn matches(&self, capabilities: DeviceCapabilities, requested: ShadowTechnique) -> bool {
        self.capabilities == capabilities && self.requested == requested
    }

    pub fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    /// Technique actually rendered.
    pub fn technique(&self) -> ShadowTechnique {
        self.technique
    }

    pub fn stencil(&self) -> &dyn StencilVolumeStrategy {
        self.stencil.as_ref()
    }

    pub fn extrusion(&self) -> ExtrusionMode {
        self.extrusion
    }

    pub fn is_software_extrusion(&self) -> bool {
        self.extrusion == ExtrusionMode::Software
    }

    /// Reasons for every downgrade applied at selection.
    pub fn downgrades(&self) -> &[&'static str] {
        &self.downgrades
    }

    pub fn supports_infinite_far_plane(&self) -> bool {
        self.capabilities.contains(DeviceCapabilities::INFINITE_FAR_PLANE)
    }

    pub fn supports_scissor(&self) -> bool {
        self.capabilities.contains(DeviceCapabilities::SCISSOR_TEST)
    }

    /// Set cull mode and stencil ops for one render of a volume.
    pub(crate) fn apply_volume_state(
        &self,
        device: &mut dyn GraphicsDevice,
        second_pass: bool,
        zfail: bool,
    ) -> Result<()> {
        let (cull, state) = self.stencil.volume_state(second_pass, zfail);
        device.set_cull_mode(cull)?;
        device.set_stencil_state(&state)
    }
}

#[cfg(test)]
#[path = "stencil_tests.rs"]
mod tests;
