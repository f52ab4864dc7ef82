/*!
# Umbra 3D Engine

Visibility and shadow core of a real-time 3D scene renderer.

The crate keeps a transform graph, derives camera frusta and their clip
planes, culls scene objects through a spatial index and drives stencil and
texture shadow rendering. GPU work is delegated to a `GraphicsDevice`
implementation supplied by the caller.

## Architecture

- **NodeGraph**: hierarchical transforms with lazy derived state
- **Frustum / Camera**: projection, view and clip planes, visibility tests
- **Scene**: objects, lights, spatial index, per-frame light caches
- **Shadow**: caster discovery, stencil volume strategies, shadow texture cameras
- **SceneRenderer**: per-frame driver ordering every pass of a shadow technique
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod math;
pub mod node;
pub mod graphics_device;
pub mod camera;
pub mod scene;
pub mod shadow;
pub mod render;

// Main umbra3d namespace module
pub mod umbra3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod math {
        pub use crate::math::*;
    }

    pub mod node {
        pub use crate::node::*;
    }

    pub mod graphics_device {
        pub use crate::graphics_device::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod shadow {
        pub use crate::shadow::*;
    }

    pub mod render {
        pub use crate::render::*;
    }
}

// Re-export math library at crate root
pub use glam;
