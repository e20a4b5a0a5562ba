use thiserror::Error;

/// Malformed mesh input. Reported by `add` before any buffer is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("flat {channel} buffer has {len} elements, not a multiple of width {width}")]
    FlatLength {
        channel: String,
        len: usize,
        width: usize,
    },
    #[error("{channel} tuple {index} has {len} components, expected {width}")]
    TupleWidth {
        channel: String,
        index: usize,
        len: usize,
        width: usize,
    },
    #[error("component width must be non-zero")]
    ZeroWidth,
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
    #[error("index {index} at position {position} exceeds mesh vertex count {vertex_count}")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("attribute `{channel}` has {count} vertices, positions have {expected}")]
    AttributeCount {
        channel: String,
        count: usize,
        expected: usize,
    },
    #[error("mesh is missing declared attribute `{0}`")]
    MissingAttribute(String),
    #[error("attribute `{0}` is not declared on this registry")]
    UnknownAttribute(String),
    #[error("a mesh named `{0}` is already registered")]
    DuplicateName(String),
}

/// Growth could not be satisfied within the element type's limits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("requested {requested} elements of {element_size} bytes exceeds addressable memory")]
    Overflow {
        requested: usize,
        element_size: usize,
    },
    #[error("allocation of {requested} elements failed")]
    AllocationFailed { requested: usize },
    #[error("vertex count {0} does not fit in 32-bit indices")]
    IndexSpace(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error("registry has been packed; call reset() before adding more meshes")]
    AlreadyPacked,
}
