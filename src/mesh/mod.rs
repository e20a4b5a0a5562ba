mod descriptor;
mod list;
pub mod normalize;
pub mod rebase;

pub use descriptor::{MeshCounts, MeshDescriptor, CELL_WIDTH, POSITION_WIDTH};
pub use list::{ElementList, IndexList, VertexList};
pub use normalize::{flatten_into, normalize};
pub use rebase::rebase;
