use crate::graphics_device::mock_graphics_device::{DeviceCommand, MockGraphicsDevice};
use super::*;

fn caps_without(missing: DeviceCapabilities) -> DeviceCapabilities {
    DeviceCapabilities::full() - missing
}

// ============================================================================
// Two-pass stencil
// ============================================================================

#[test]
fn test_two_pass_zpass_ops() {
    let strategy = TwoPassStencil;

    let (cull, first) = strategy.volume_state(false, false);
    assert_eq!(cull, CullMode::Back);
    assert_eq!(first.front.pass_op, StencilOp::IncrementAndClamp);
    assert_eq!(first.front.depth_fail_op, StencilOp::Keep);
    assert_eq!(first.front, first.back);

    let (cull, second) = strategy.volume_state(true, false);
    assert_eq!(cull, CullMode::Front);
    assert_eq!(second.front.pass_op, StencilOp::DecrementAndClamp);
    assert_eq!(second.front.depth_fail_op, StencilOp::Keep);
}

#[test]
fn test_two_pass_zfail_ops() {
    let strategy = TwoPassStencil;

    let (cull, first) = strategy.volume_state(false, true);
    assert_eq!(cull, CullMode::Front);
    assert_eq!(first.front.depth_fail_op, StencilOp::IncrementAndClamp);
    assert_eq!(first.front.pass_op, StencilOp::Keep);

    let (cull, second) = strategy.volume_state(true, true);
    assert_eq!(cull, CullMode::Back);
    assert_eq!(second.front.depth_fail_op, StencilOp::DecrementAndClamp);
    assert_eq!(second.front.pass_op, StencilOp::Keep);
}

#[test]
fn test_volume_ops_always_pass_stencil() {
    for second in [false, true] {
        for zfail in [false, true] {
            let (_, state) = TwoPassStencil.volume_state(second, zfail);
            assert_eq!(state.front.compare_op, CompareOp::Always);
            assert_eq!(state.front.fail_op, StencilOp::Keep);
            assert_eq!(state.front.reference, 0);
            assert_eq!(state.front.write_mask, 0xFFFF_FFFF);
        }
    }
    assert_eq!(TwoPassStencil.pass_count(), 2);
    assert!(!TwoPassStencil.is_two_sided());
}

// ============================================================================
// Two-sided stencil
// ============================================================================

#[test]
fn test_two_sided_zpass_ops() {
    let (cull, state) = TwoSidedStencil.volume_state(false, false);
    assert_eq!(cull, CullMode::None);
    assert_eq!(state.front.pass_op, StencilOp::IncrementAndWrap);
    assert_eq!(state.back.pass_op, StencilOp::DecrementAndWrap);
    assert_eq!(state.front.depth_fail_op, StencilOp::Keep);
    assert_eq!(state.back.depth_fail_op, StencilOp::Keep);
}

#[test]
fn test_two_sided_zfail_ops() {
    let (cull, state) = TwoSidedStencil.volume_state(false, true);
    assert_eq!(cull, CullMode::None);
    assert_eq!(state.front.depth_fail_op, StencilOp::IncrementAndWrap);
    assert_eq!(state.back.depth_fail_op, StencilOp::DecrementAndWrap);
    assert_eq!(state.front.pass_op, StencilOp::Keep);
    assert_eq!(TwoSidedStencil.pass_count(), 1);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_select_full_capabilities() {
    let strategies = ShadowStrategies::select(DeviceCapabilities::full(), ShadowTechnique::StencilAdditive);

    assert_eq!(strategies.technique(), ShadowTechnique::StencilAdditive);
    assert!(strategies.stencil().is_two_sided());
    assert_eq!(strategies.extrusion(), ExtrusionMode::Hardware);
    assert!(strategies.downgrades().is_empty());
    assert!(strategies.supports_infinite_far_plane());
    assert!(strategies.supports_scissor());
}

#[test]
fn test_select_without_stencil_buffer_disables_shadows() {
    let strategies = ShadowStrategies::select(
        caps_without(DeviceCapabilities::STENCIL_BUFFER),
        ShadowTechnique::StencilModulative,
    );

    assert_eq!(strategies.technique(), ShadowTechnique::None);
    assert_eq!(strategies.downgrades().len(), 1);
}

#[test]
fn test_select_without_two_sided_stencil_uses_two_passes() {
    let strategies = ShadowStrategies::select(
        caps_without(DeviceCapabilities::STENCIL_WRAP),
        ShadowTechnique::StencilAdditive,
    );

    assert_eq!(strategies.technique(), ShadowTechnique::StencilAdditive);
    assert!(!strategies.stencil().is_two_sided());
    assert_eq!(strategies.downgrades().len(), 1);
}

#[test]
fn test_select_without_vertex_programs_extrudes_on_cpu() {
    let strategies = ShadowStrategies::select(
        caps_without(DeviceCapabilities::VERTEX_PROGRAMS | DeviceCapabilities::TWO_SIDED_STENCIL),
        ShadowTechnique::StencilAdditive,
    );

    assert!(strategies.is_software_extrusion());
    assert!(!strategies.stencil().is_two_sided());
    assert_eq!(strategies.downgrades().len(), 2);
}

#[test]
fn test_select_texture_without_render_to_texture() {
    let strategies = ShadowStrategies::select(
        caps_without(DeviceCapabilities::RENDER_TO_TEXTURE),
        ShadowTechnique::TextureModulative,
    );
    assert_eq!(strategies.technique(), ShadowTechnique::None);
}

#[test]
fn test_select_no_shadows_never_downgrades() {
    let strategies = ShadowStrategies::select(DeviceCapabilities::empty(), ShadowTechnique::None);
    assert!(strategies.downgrades().is_empty());
    assert!(strategies.is_software_extrusion());
}

#[test]
fn test_matches() {
    let strategies = ShadowStrategies::select(DeviceCapabilities::full(), ShadowTechnique::StencilAdditive);

    assert!(strategies.matches(DeviceCapabilities::full(), ShadowTechnique::StencilAdditive));
    assert!(!strategies.matches(DeviceCapabilities::full(), ShadowTechnique::StencilModulative));
    assert!(!strategies.matches(DeviceCapabilities::empty(), ShadowTechnique::StencilAdditive));
}

// ============================================================================
// Device state
// ============================================================================

#[test]
fn test_lit_and_modulation_stencil_tests() {
    assert_eq!(lit_pass_stencil().front.compare_op, CompareOp::Equal);
    assert_eq!(modulation_stencil().front.compare_op, CompareOp::NotEqual);
    assert_eq!(lit_pass_stencil().front.pass_op, StencilOp::Keep);
}

#[test]
fn test_apply_volume_state() {
    let strategies = ShadowStrategies::select(
        caps_without(DeviceCapabilities::TWO_SIDED_STENCIL),
        ShadowTechnique::StencilAdditive,
    );
    let mut device = MockGraphicsDevice::new(DeviceCapabilities::full());

    strategies.apply_volume_state(&mut device, true, false).unwrap();

    let (cull, state) = TwoPassStencil.volume_state(true, false);
    assert_eq!(
        device.commands,
        vec![DeviceCommand::SetCullMode(cull), DeviceCommand::SetStencilState(state)]
    );
}
