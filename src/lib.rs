//! Packs many independently authored triangle meshes into a few shared
//! buffers and keeps a per-mesh instance table for transforms.

pub mod buffer;
pub mod error;
pub mod gpu;
pub mod instance;
pub mod mesh;
pub mod primitives;
pub mod registry;
pub mod settings;

pub use buffer::TypedBuffer;
pub use error::{CapacityError, PackError, ValidationError};
pub use instance::{table_size, InstanceTable, TableFormat, TableSize, TableUpload, UploadSink};
pub use mesh::{ElementList, IndexList, MeshDescriptor, VertexList};
pub use registry::{GeometryBuffers, MeshId, MeshRecord, MeshRegistry};
pub use settings::{AttributeChannel, PackerSettings, PackingMode};

pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
