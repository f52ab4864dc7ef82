/// Scene renderer - the per-frame driver.
///
/// One `render` call runs a whole frame for one camera:
///
/// 1. bump the scene frame counter (kills the per-frame light caches)
/// 2. pick shadow strategies for the device (cached per capability set)
/// 3. update the transform graph and the spatial index
/// 4. switch the camera to an infinite far plane if stencil shadows need it
/// 5. cull, find the lights reaching the frustum
/// 6. render shadow textures (texture techniques only, nested camera renders)
/// 7. queue the visible passes and dispatch them for the shadow technique
///
/// All scratch buffers live for one call. The only state kept between
/// frames is the selected strategies, the shadow cameras and the render
/// context (idle outside `render`).

use std::sync::Arc;
use glam::Vec4;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::camera::{Camera, RenderView};
use crate::error::Result;
use crate::graphics_device::{
    Color, DeviceCapabilities, DrawCall, GraphicsDevice, RenderTarget,
};
use crate::scene::{Light, LightKey, ObjectKey, PassKind, Scene};
use crate::shadow::{
    configure_shadow_camera, create_shadow_camera, find_shadow_casters, lit_pass_stencil,
    modulation_stencil, render_shadow_volumes_to_stencil, ShadowCaster, ShadowSettings,
    ShadowStrategies, ShadowTechnique, ShadowTextureLayout,
};
use crate::{engine_info, engine_trace};
use super::render_context::{IlluminationStage, RenderContext};
use super::render_queue::{QueuedPass, RenderQueue};

const SOURCE: &str = "umbra3d::SceneRenderer";

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Objects left after frustum culling
    pub visible_objects: usize,
    /// Lights reaching the camera frustum
    pub lights: usize,
    /// Shadow casters found, summed over lights
    pub shadow_casters: usize,
    /// Shadow volume and light cap draws
    pub shadow_volumes: usize,
    /// Object passes and modulation quads drawn, shadow textures included
    pub draw_calls: usize,
}

/// Shadow texture rendered this frame for a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShadowTextureSlot {
    light: LightKey,
    index: usize,
}

/// Renders scenes with the configured shadow technique.
pub struct SceneRenderer {
    settings: ShadowSettings,
    strategies: Option<Arc<ShadowStrategies>>,
    context: RenderContext,
    shadow_cameras: Vec<Camera>,
    clear_color: Color,
}

impl SceneRenderer {
    /// Create a renderer. Fails if the settings are invalid.
    pub fn new(settings: ShadowSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            strategies: None,
            context: RenderContext::default(),
            shadow_cameras: Vec::new(),
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        })
    }

    // ===== CONFIGURATION =====

    pub fn settings(&self) -> &ShadowSettings {
        &self.settings
    }

    /// Replace the shadow settings. Strategies are re-selected next frame.
    pub fn set_settings(&mut self, settings: ShadowSettings) -> Result<()> {
        settings.validate()?;
        self.shadow_cameras.truncate(settings.texture_count);
        if settings.technique != self.settings.technique {
            self.strategies = None;
        }
        self.settings = settings;
        Ok(())
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Strategies used by the last frame, if any.
    pub fn strategies(&self) -> Option<&ShadowStrategies> {
        self.strategies.as_deref()
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Camera of shadow texture `index`, once a frame has used it.
    pub fn shadow_camera(&self, index: usize) -> Option<&Camera> {
        self.shadow_cameras.get(index)
    }

    // ===== FRAME =====

    /// Render one frame of `scene` seen by `camera`.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        camera: &mut Camera,
        device: &mut dyn GraphicsDevice,
    ) -> Result<FrameStats> {
        let frame = scene.next_frame();
        let strategies = self.select_strategies(device.capabilities());
        scene.update()?;

        if strategies.technique().is_stencil_based() {
            self.use_infinite_far_plane(camera, &strategies)?;
        }

        let mut stats = FrameStats::default();
        let saved = self.context.enter(IlluminationStage::None, RenderTarget::Main);
        let result = self.render_camera(scene, camera, device, &strategies, &mut stats);
        self.context.restore(saved);
        result?;

        engine_trace!(SOURCE, "Frame {} ({}): {:?}", frame, camera.name(), stats);
        Ok(stats)
    }

    fn select_strategies(&mut self, capabilities: DeviceCapabilities) -> Arc<ShadowStrategies> {
        if let Some(strategies) = &self.strategies {
            if strategies.matches(capabilities, self.settings.technique) {
                return Arc::clone(strategies);
            }
        }
        let strategies = Arc::new(ShadowStrategies::select(capabilities, self.settings.technique));
        self.strategies = Some(Arc::clone(&strategies));
        strategies
    }

    /// A finite far plane clips shadow volumes and inverts the stencil
    /// count behind it, so stencil shadows need it gone when the device allows.
    fn use_infinite_far_plane(&self, camera: &mut Camera, strategies: &ShadowStrategies) -> Result<()> {
        let far = camera.frustum().far();
        if far == 0.0 || !self.settings.use_infinite_far_plane || !strategies.supports_infinite_far_plane() {
            return Ok(());
        }
        engine_info!(SOURCE, "Camera '{}': far plane {} replaced by an infinite far plane for stencil shadows",
            camera.name(), far);
        camera.frustum_mut().set_far(0.0)
    }

    /// Render one camera into the target of the current context.
    fn render_camera(
        &mut self,
        scene: &mut Scene,
        camera: &mut Camera,
        device: &mut dyn GraphicsDevice,
        strategies: &ShadowStrategies,
        stats: &mut FrameStats,
    ) -> Result<()> {
        let view = scene.frustum_cull(camera)?;
        if self.context.is_rendering_to_texture() {
            return self.render_caster_pass(scene, device, &view, stats);
        }

        let lights = scene.find_lights_affecting_frustum(view.planes()).to_vec();
        stats.visible_objects = view.visible_count();
        stats.lights = lights.len();

        let technique = strategies.technique();
        let shadow_textures = if technique.is_texture_based() {
            self.prepare_shadow_textures(scene, camera, device, strategies, &lights, stats)?
        } else {
            Vec::new()
        };

        let stencil = strategies
            .capabilities()
            .contains(DeviceCapabilities::STENCIL_BUFFER)
            .then_some(0);
        device.set_render_target(self.context.target)?;
        device.set_viewport(*view.viewport())?;
        device.set_camera(view.view_matrix(), view.projection_matrix())?;
        device.clear(Some(self.clear_color), Some(1.0), stencil)?;

        let queue = RenderQueue::build(scene, &view);
        let mut frame = Frame {
            scene,
            camera,
            device,
            strategies,
            settings: &self.settings,
            queue: &queue,
            lights: &lights,
            stats,
            casters: Vec::new(),
        };
        match technique {
            ShadowTechnique::None => frame.render_basic(),
            ShadowTechnique::StencilAdditive => frame.render_stencil_additive(),
            ShadowTechnique::StencilModulative => frame.render_stencil_modulative(),
            ShadowTechnique::TextureModulative => frame.render_texture_modulative(&shadow_textures),
            ShadowTechnique::TextureAdditive => frame.render_texture_additive(&shadow_textures),
        }
    }

    /// Render the shadow textures of up to `texture_count` shadow-casting lights.
    fn prepare_shadow_textures(
        &mut self,
        scene: &mut Scene,
        camera: &mut Camera,
        device: &mut dyn GraphicsDevice,
        strategies: &ShadowStrategies,
        lights: &[LightKey],
        stats: &mut FrameStats,
    ) -> Result<Vec<ShadowTextureSlot>> {
        let count = self.settings.texture_count;
        while self.shadow_cameras.len() < count {
            let index = self.shadow_cameras.len();
            let shadow_camera = create_shadow_camera(index, &self.settings, device.projection_builder())?;
            self.shadow_cameras.push(shadow_camera);
        }

        // Taken out so the nested renders can borrow the renderer
        let mut shadow_cameras = std::mem::take(&mut self.shadow_cameras);
        let result = self.render_shadow_textures(
            scene, camera, device, strategies, lights, &mut shadow_cameras, stats,
        );
        self.shadow_cameras = shadow_cameras;
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn render_shadow_textures(
        &mut self,
        scene: &mut Scene,
        camera: &mut Camera,
        device: &mut dyn GraphicsDevice,
        strategies: &ShadowStrategies,
        lights: &[LightKey],
        shadow_cameras: &mut [Camera],
        stats: &mut FrameStats,
    ) -> Result<Vec<ShadowTextureSlot>> {
        let layout = ShadowTextureLayout::new(&self.settings, camera.frustum().near());
        let mut slots = Vec::new();

        for &key in lights {
            if slots.len() >= shadow_cameras.len() {
                break;
            }
            let Some(light) = scene.light(key).filter(|l| l.casts_shadows()).cloned() else {
                continue;
            };

            let index = slots.len();
            let shadow_camera = &mut shadow_cameras[index];
            configure_shadow_camera(shadow_camera, camera, &light, &layout, &self.settings)?;

            let saved = self
                .context
                .enter(IlluminationStage::RenderToTexture, RenderTarget::ShadowTexture(index));
            let result = self.render_camera(scene, shadow_camera, device, strategies, stats);
            self.context.restore(saved);
            result?;

            slots.push(ShadowTextureSlot { light: key, index });
        }
        Ok(slots)
    }

    /// Shadow casters seen by a shadow camera, first pass only.
    fn render_caster_pass(
        &self,
        scene: &Scene,
        device: &mut dyn GraphicsDevice,
        view: &RenderView,
        stats: &mut FrameStats,
    ) -> Result<()> {
        device.set_render_target(self.context.target)?;
        device.set_viewport(*view.viewport())?;
        device.set_camera(view.view_matrix(), view.projection_matrix())?;
        // White is unshadowed
        device.clear(Some(Vec4::ONE), Some(1.0), None)?;

        for &key in view.visible_objects() {
            let Some(object) = scene.object(key) else {
                continue;
            };
            if !object.casts_shadows() || object.passes().is_empty() {
                continue;
            }
            device.draw(&DrawCall {
                object: key,
                pass: 0,
                world: object.world_transform(),
                stage: IlluminationStage::RenderToTexture,
                lights: &[],
                shadow_texture: None,
            })?;
            stats.draw_calls += 1;
        }
        Ok(())
    }
}

/// Submit one queued pass.
fn submit(
    device: &mut dyn GraphicsDevice,
    stats: &mut FrameStats,
    entry: &QueuedPass,
    stage: IlluminationStage,
    lights: &[LightKey],
    shadow_texture: Option<usize>,
) -> Result<()> {
    device.draw(&DrawCall {
        object: entry.object,
        pass: entry.pass,
        world: entry.world,
        stage,
        lights,
        shadow_texture,
    })?;
    stats.draw_calls += 1;
    Ok(())
}

/// Everything one main pass dispatch works with.
struct Frame<'a> {
    scene: &'a mut Scene,
    camera: &'a mut Camera,
    device: &'a mut dyn GraphicsDevice,
    strategies: &'a ShadowStrategies,
    settings: &'a ShadowSettings,
    queue: &'a RenderQueue,
    lights: &'a [LightKey],
    stats: &'a mut FrameStats,
    casters: Vec<ObjectKey>,
}

impl Frame<'_> {
    /// Draw a pass with every light reaching its object. Per-light passes
    /// of unlit objects are skipped.
    fn draw_lit(&mut self, entry: &QueuedPass) -> Result<()> {
        if entry.kind == PassKind::PerLight {
            let lights = self.scene.lights_for_object(entry.object)?;
            if lights.is_empty() {
                return Ok(());
            }
            return submit(self.device, self.stats, entry, IlluminationStage::None, lights, None);
        }
        submit(self.device, self.stats, entry, IlluminationStage::None, &[], None)
    }

    /// Per-light passes of shadow receivers reached by `light`.
    fn draw_receivers_for_light(&mut self, light: LightKey, shadow_texture: Option<usize>) -> Result<()> {
        let queue = self.queue;
        for entry in queue.solids_of_kind(PassKind::PerLight).filter(|e| e.receives_shadows) {
            if self.scene.lights_for_object(entry.object)?.contains(&light) {
                submit(
                    self.device,
                    self.stats,
                    entry,
                    IlluminationStage::PerLight,
                    std::slice::from_ref(&light),
                    shadow_texture,
                )?;
            }
        }
        Ok(())
    }

    fn draw_receivers(&mut self, kind: PassKind, stage: IlluminationStage) -> Result<()> {
        let queue = self.queue;
        for entry in queue.solids_of_kind(kind).filter(|e| e.receives_shadows) {
            submit(self.device, self.stats, entry, stage, &[], None)?;
        }
        Ok(())
    }

    fn draw_non_receivers(&mut self) -> Result<()> {
        let queue = self.queue;
        for entry in queue.solids().iter().filter(|e| !e.receives_shadows) {
            self.draw_lit(entry)?;
        }
        Ok(())
    }

    fn draw_transparents(&mut self) -> Result<()> {
        let queue = self.queue;
        for entry in queue.transparents() {
            self.draw_lit(entry)?;
        }
        Ok(())
    }

    /// Clear the stencil buffer and count the volumes of `light`'s casters into it.
    fn render_light_volumes(&mut self, light: &Light) -> Result<()> {
        self.device.clear(None, None, Some(0))?;

        find_shadow_casters(self.scene, light, self.camera, self.settings, &mut self.casters);
        self.stats.shadow_casters += self.casters.len();
        if self.casters.is_empty() {
            return Ok(());
        }

        let wanted: FxHashSet<ObjectKey> = self.casters.iter().copied().collect();
        let mut casters: Vec<&mut dyn ShadowCaster> = self
            .scene
            .objects_mut()
            .filter(|(key, _)| wanted.contains(key))
            .map(|(_, object)| object as &mut dyn ShadowCaster)
            .collect();

        let volumes = render_shadow_volumes_to_stencil(
            self.device,
            self.strategies,
            self.settings,
            self.camera,
            light,
            &mut casters,
        )?;
        self.stats.shadow_volumes += volumes.volumes + volumes.light_caps;
        Ok(())
    }

    fn shadow_casting_light(&self, key: LightKey) -> Option<Light> {
        self.scene.light(key).filter(|l| l.casts_shadows()).cloned()
    }

    // ===== TECHNIQUES =====

    fn render_basic(&mut self) -> Result<()> {
        let queue = self.queue;
        for entry in queue.solids() {
            self.draw_lit(entry)?;
        }
        self.draw_transparents()
    }

    fn render_stencil_additive(&mut self) -> Result<()> {
        self.draw_receivers(PassKind::Ambient, IlluminationStage::Ambient)?;
        self.draw_non_receivers()?;

        let lights = self.lights;
        for &key in lights {
            let Some(light) = self.shadow_casting_light(key) else {
                self.draw_receivers_for_light(key, None)?;
                continue;
            };
            self.render_light_volumes(&light)?;
            self.device.set_stencil_check_enabled(true)?;
            self.device.set_stencil_state(&lit_pass_stencil())?;
            self.draw_receivers_for_light(key, None)?;
            self.device.set_stencil_check_enabled(false)?;
        }

        self.draw_receivers(PassKind::Decal, IlluminationStage::Decal)?;
        self.draw_transparents()
    }

    fn render_stencil_modulative(&mut self) -> Result<()> {
        let queue = self.queue;
        for entry in queue.solids().iter().filter(|e| e.receives_shadows) {
            self.draw_lit(entry)?;
        }

        let lights = self.lights;
        for &key in lights {
            let Some(light) = self.shadow_casting_light(key) else {
                continue;
            };
            self.render_light_volumes(&light)?;
            self.device.set_stencil_check_enabled(true)?;
            self.device.set_stencil_state(&modulation_stencil())?;
            self.device.draw_modulation_quad(self.settings.color)?;
            self.stats.draw_calls += 1;
            self.device.set_stencil_check_enabled(false)?;
        }

        self.draw_non_receivers()?;
        self.draw_transparents()
    }

    fn render_texture_modulative(&mut self, shadow_textures: &[ShadowTextureSlot]) -> Result<()> {
        let queue = self.queue;
        for entry in queue.solids() {
            self.draw_lit(entry)?;
        }

        let self_shadow = self.settings.self_shadow;
        let receivers: Vec<&QueuedPass> = base_passes(queue)
            .into_iter()
            .filter(|e| e.receives_shadows && (self_shadow || !e.casts_shadows))
            .collect();
        for slot in shadow_textures {
            for &entry in &receivers {
                submit(self.device, self.stats, entry, IlluminationStage::ReceiverPass, &[], Some(slot.index))?;
            }
        }

        self.draw_transparents()
    }

    fn render_texture_additive(&mut self, shadow_textures: &[ShadowTextureSlot]) -> Result<()> {
        self.draw_receivers(PassKind::Ambient, IlluminationStage::Ambient)?;
        self.draw_non_receivers()?;

        let lights = self.lights;
        for &key in lights {
            let texture = shadow_textures.iter().find(|s| s.light == key).map(|s| s.index);
            self.draw_receivers_for_light(key, texture)?;
        }

        self.draw_receivers(PassKind::Decal, IlluminationStage::Decal)?;
        self.draw_transparents()
    }
}

/// First lit pass (ambient or per-light) of each queued solid object, in
/// queue order.
fn base_passes(queue: &RenderQueue) -> Vec<&QueuedPass> {
    let mut first: FxHashMap<ObjectKey, usize> = FxHashMap::default();
    for entry in queue.solids() {
        if matches!(entry.kind, PassKind::Ambient | PassKind::PerLight) {
            first
                .entry(entry.object)
                .and_modify(|pass| *pass = (*pass).min(entry.pass))
                .or_insert(entry.pass);
        }
    }
    queue
        .solids()
        .iter()
        .filter(|e| first.get(&e.object) == Some(&e.pass))
        .collect()
}

#[cfg(test)]
#[path = "scene_renderer_tests.rs"]
mod tests;
