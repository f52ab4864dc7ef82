/// Stencil shadow volume pass for one light.
///
/// Colour and depth writes are turned off, the volumes of every caster
/// are counted into the stencil buffer, then the device is returned to
/// its normal state. Whether zfail or zpass counting is used is decided
/// once for the light, before any volume is drawn: if a single caster
/// touches the volume between the near plane and the light, every caster
/// of that light uses zfail.

use crate::camera::Camera;
use crate::engine_trace;
use crate::error::Result;
use crate::graphics_device::{
    reset_depth_state, CompareOp, CullMode, ExtrusionProgram, GraphicsDevice, ShadowVolumeDraw,
};
use crate::scene::Light;
use super::settings::ShadowSettings;
use super::shadow_caster::{ShadowCaster, ShadowRenderableFlags, ShadowVolumeParams};
use super::stencil::ShadowStrategies;

const SOURCE: &str = "umbra3d::ShadowVolume";

/// What one light's volume pass drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShadowVolumeStats {
    /// Volume draws (one per renderable and stencil pass)
    pub volumes: usize,
    /// Separate light cap draws
    pub light_caps: usize,
    pub zfail: bool,
}

/// Whether any caster forces zfail counting for `light`.
pub fn requires_zfail(light: &Light, camera: &mut Camera, casters: &[&mut dyn ShadowCaster]) -> bool {
    let near_clip = light.near_clip_volume(camera.frustum_mut());
    casters.iter().any(|caster| near_clip.intersects_aabb(&caster.world_bounding_box()))
}

/// Volume parts to generate for one caster.
pub fn caster_flags(
    caster: &dyn ShadowCaster,
    light: &Light,
    camera: &mut Camera,
    zfail: bool,
    extrude_to_infinity: bool,
    extrusion_distance: f32,
) -> ShadowRenderableFlags {
    let frustum = camera.frustum_mut();
    let mut flags = ShadowRenderableFlags::empty();
    if extrude_to_infinity {
        flags |= ShadowRenderableFlags::EXTRUDE_TO_INFINITY;
    }
    // zpass volumes never need closing at the caster
    if zfail && frustum.is_aabb_visible(&caster.light_cap_bounds()) {
        flags |= ShadowRenderableFlags::INCLUDE_LIGHT_CAP;
    }
    // Directional volumes extruded to infinity meet at a point
    if !(extrude_to_infinity && light.is_directional())
        && frustum.is_aabb_visible(&caster.dark_cap_bounds(light, extrusion_distance))
    {
        flags |= ShadowRenderableFlags::INCLUDE_DARK_CAP;
    }
    flags
}

/// Count the shadow volumes of `casters` into the stencil buffer.
///
/// The device state is restored even when a draw fails.
pub fn render_shadow_volumes_to_stencil(
    device: &mut dyn GraphicsDevice,
    strategies: &ShadowStrategies,
    settings: &ShadowSettings,
    camera: &mut Camera,
    light: &Light,
    casters: &mut [&mut dyn ShadowCaster],
) -> Result<ShadowVolumeStats> {
    if casters.is_empty() {
        return Ok(ShadowVolumeStats::default());
    }

    // Point and spot volumes end at the light's range
    let mut scissored = false;
    if strategies.supports_scissor() {
        if let Some(sphere) = light.bounding_sphere() {
            if let Some(rect) = camera.sphere_scissor(&sphere) {
                device.set_scissor(Some(rect))?;
                scissored = true;
            }
        }
    }

    let software = strategies.is_software_extrusion();
    let finite_extrude = !settings.use_infinite_far_plane || !strategies.supports_infinite_far_plane();
    if !software {
        device.bind_extrusion_program(Some(ExtrusionProgram {
            light_type: light.light_type(),
            finite: finite_extrude,
        }))?;
    }

    let outcome = setup_and_draw(device, strategies, settings, camera, light, casters, software, finite_extrude);
    let restored = restore_state(device, software, scissored);
    let stats = outcome?;
    restored?;

    engine_trace!(SOURCE, "Light '{}': {} volume draws, {} light caps, zfail {}",
        light.name(), stats.volumes, stats.light_caps, stats.zfail);
    Ok(stats)
}

#[allow(clippy::too_many_arguments)]
fn setup_and_draw(
    device: &mut dyn GraphicsDevice,
    strategies: &ShadowStrategies,
    settings: &ShadowSettings,
    camera: &mut Camera,
    light: &Light,
    casters: &mut [&mut dyn ShadowCaster],
    software: bool,
    finite_extrude: bool,
) -> Result<ShadowVolumeStats> {
    device.set_color_writes(false)?;
    device.set_depth_writes(false)?;
    device.set_stencil_check_enabled(true)?;
    device.set_depth_compare(CompareOp::Less)?;

    let zfail = requires_zfail(light, camera, casters);
    let extrude_to_infinity = !software && !finite_extrude;
    let light_vector = light.as_4d_vector();
    let mut stats = ShadowVolumeStats { zfail, ..Default::default() };

    for caster in casters.iter_mut() {
        let extrusion_distance = if light.is_directional() {
            settings.directional_light_extrusion_distance
        } else {
            caster.point_extrusion_distance(light)
        };
        let flags = caster_flags(&**caster, light, camera, zfail, extrude_to_infinity, extrusion_distance);
        let params = ShadowVolumeParams { flags, software_extrusion: software, extrusion_distance };

        let world = caster.world_transform();
        let object_light = world.inverse() * light_vector;
        let renderables = caster.shadow_volume_renderables(light, &params)?;

        for pass in 0..strategies.stencil().pass_count() {
            let second_pass = pass == 1;
            for renderable in renderables.iter().filter(|r| r.is_visible()) {
                let volume = renderable.volume_draw(world, object_light, extrusion_distance);
                render_single_volume(device, strategies, &volume, zfail, second_pass)?;
                stats.volumes += 1;

                if !flags.contains(ShadowRenderableFlags::INCLUDE_LIGHT_CAP) {
                    continue;
                }
                if let Some(cap) = renderable.light_cap_draw(world, object_light, extrusion_distance) {
                    // The light cap must always fail the depth test
                    device.set_depth_compare(CompareOp::Never)?;
                    render_single_volume(device, strategies, &cap, zfail, second_pass)?;
                    device.set_depth_compare(CompareOp::Less)?;
                    stats.light_caps += 1;
                }
            }
        }
    }
    Ok(stats)
}

fn render_single_volume(
    device: &mut dyn GraphicsDevice,
    strategies: &ShadowStrategies,
    draw: &ShadowVolumeDraw<'_>,
    zfail: bool,
    second_pass: bool,
) -> Result<()> {
    strategies.apply_volume_state(device, second_pass, zfail)?;
    device.draw_shadow_volume(draw)
}

fn restore_state(device: &mut dyn GraphicsDevice, software: bool, scissored: bool) -> Result<()> {
    device.set_color_writes(true)?;
    reset_depth_state(device)?;
    device.set_stencil_check_enabled(false)?;
    device.set_cull_mode(CullMode::Back)?;
    if !software {
        device.bind_extrusion_program(None)?;
    }
    if scissored {
        device.set_scissor(None)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "shadow_volume_tests.rs"]
mod tests;
