mod buffers;
mod directory;
#[allow(clippy::module_inception)]
mod registry;

pub use buffers::{AttributeBuffer, GeometryBuffers, MeshRecord};
pub use directory::{IdDirectory, MeshId};
pub use registry::MeshRegistry;
