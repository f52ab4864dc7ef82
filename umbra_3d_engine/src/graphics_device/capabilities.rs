/// Hardware capabilities reported by a graphics device.

use bitflags::bitflags;

bitflags! {
    /// Feature bits queried once per device and used to pick shadow strategies.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceCapabilities: u32 {
        /// A stencil buffer is attached to the main render target
        const STENCIL_BUFFER     = 1 << 0;
        /// Separate front/back stencil operations in one pass
        const TWO_SIDED_STENCIL  = 1 << 1;
        /// Increment/decrement with wrap-around
        const STENCIL_WRAP       = 1 << 2;
        /// Projection matrices with an infinite far plane are supported
        const INFINITE_FAR_PLANE = 1 << 3;
        /// Programmable vertex stage (hardware shadow extrusion)
        const VERTEX_PROGRAMS    = 1 << 4;
        /// Programmable fragment stage
        const FRAGMENT_PROGRAMS  = 1 << 5;
        /// Rendering into textures (texture shadows)
        const RENDER_TO_TEXTURE  = 1 << 6;
        /// Scissor test
        const SCISSOR_TEST       = 1 << 7;
    }
}

impl DeviceCapabilities {
    /// Capabilities of a typical modern desktop GPU.
    pub fn full() -> Self {
        Self::all()
    }
}
