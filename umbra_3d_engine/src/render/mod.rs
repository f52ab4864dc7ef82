//! Render module - queue, render context and the frame driver.

mod render_context;
mod render_queue;
mod scene_renderer;

pub use render_context::{IlluminationStage, RenderContext};
pub use render_queue::{QueuedPass, RenderQueue};
pub use scene_renderer::{FrameStats, SceneRenderer};
