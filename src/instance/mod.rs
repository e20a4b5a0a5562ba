mod callbacks;
mod sizer;
mod table;
mod upload;

pub use callbacks::{TransformCallbacks, TransformFn};
pub use sizer::{table_size, TableSize};
pub use table::{InstanceTable, SLOT_FLOATS};
pub use upload::{TableFormat, TableUpload, UploadSink};
