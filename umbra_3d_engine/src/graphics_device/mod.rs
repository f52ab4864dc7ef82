/// Graphics device module - the rendering backend collaborator.
///
/// The engine never talks to a GPU API directly. Everything it needs from
/// the backend (projection conventions, stencil/depth/cull state, scissor,
/// extrusion programs and draw submission) goes through the
/// `GraphicsDevice` trait.

pub mod capabilities;
pub mod graphics_device;
pub mod projection;
pub mod state;

pub use capabilities::*;
pub use graphics_device::*;
pub use projection::*;
pub use state::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
