/// Render queue - visible passes grouped for submission.
///
/// Solid passes are sorted by their sort key so state changes batch up;
/// passes with equal keys keep their submission order. Transparent objects
/// are kept whole and drawn back to front.

use glam::{Mat4, Vec3};
use rdst::{RadixKey, RadixSort};
use crate::camera::RenderView;
use crate::scene::{ObjectKey, PassKind, Scene};
use crate::shadow::ShadowCaster;

/// One object pass waiting to be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedPass {
    pub object: ObjectKey,
    /// Index into the object's pass list
    pub pass: usize,
    pub sort_key: u32,
    pub kind: PassKind,
    pub world: Mat4,
    pub casts_shadows: bool,
    pub receives_shadows: bool,
}

/// Radix sort item: sort key in the high half, queue position in the low half.
#[derive(Debug, Clone, Copy)]
struct SortItem {
    key: u64,
}

impl RadixKey for SortItem {
    const LEVELS: usize = 8;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        (self.key >> (level * 8)) as u8
    }
}

/// Passes of the visible objects of one camera.
#[derive(Debug, Default)]
pub struct RenderQueue {
    solids: Vec<QueuedPass>,
    /// Passes plus squared distance to the eye
    transparents: Vec<(f32, QueuedPass)>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every pass of every object visible in `view`, sorted.
    pub fn build(scene: &Scene, view: &RenderView) -> Self {
        let mut queue = Self::new();
        let eye = view.eye_position();
        for &key in view.visible_objects() {
            let Some(object) = scene.object(key) else {
                continue;
            };
            let world = object.world_transform();
            for (index, pass) in object.passes().iter().enumerate() {
                let entry = QueuedPass {
                    object: key,
                    pass: index,
                    sort_key: pass.sort_key,
                    kind: pass.kind,
                    world,
                    casts_shadows: object.casts_shadows(),
                    receives_shadows: object.receives_shadows(),
                };
                if object.is_transparent() {
                    queue.add_transparent(entry, eye);
                } else {
                    queue.add_solid(entry);
                }
            }
        }
        queue.sort();
        queue
    }

    pub fn add_solid(&mut self, entry: QueuedPass) {
        self.solids.push(entry);
    }

    pub fn add_transparent(&mut self, entry: QueuedPass, eye: Vec3) {
        let distance = entry.world.w_axis.truncate().distance_squared(eye);
        self.transparents.push((distance, entry));
    }

    pub fn clear(&mut self) {
        self.solids.clear();
        self.transparents.clear();
    }

    /// Solids by sort key, transparents back to front.
    pub fn sort(&mut self) {
        let mut items: Vec<SortItem> = self
            .solids
            .iter()
            .enumerate()
            .map(|(i, e)| SortItem { key: (u64::from(e.sort_key) << 32) | i as u64 })
            .collect();
        items.radix_sort_unstable();
        self.solids = items
            .iter()
            .map(|item| self.solids[(item.key & 0xFFFF_FFFF) as usize])
            .collect();

        // Stable: passes of one object stay in order
        self.transparents.sort_by(|a, b| b.0.total_cmp(&a.0));
    }

    pub fn solids(&self) -> &[QueuedPass] {
        &self.solids
    }

    /// Solid passes of one kind, in queue order.
    pub fn solids_of_kind(&self, kind: PassKind) -> impl Iterator<Item = &QueuedPass> + '_ {
        self.solids.iter().filter(move |e| e.kind == kind)
    }

    pub fn transparents(&self) -> impl Iterator<Item = &QueuedPass> + '_ {
        self.transparents.iter().map(|(_, e)| e)
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    pub fn transparent_count(&self) -> usize {
        self.transparents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty() && self.transparents.is_empty()
    }
}

#[cfg(test)]
#[path = "render_queue_tests.rs"]
mod tests;
